// src/listing/mod.rs
pub mod classify;
pub mod parser;
pub mod sort;

pub use classify::{ApacheClassifier, EntryClassifier, IconCategory, RowContext};
pub use parser::{ensure_markup, parse_listing, RawEntry};
pub use sort::{filter_entries, parse_size, sort_entries, SortKey, SortSpec};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    Directory,
    /// A page that is navigated in place instead of downloaded.
    WebDocument,
    File,
}

impl EntryKind {
    pub fn is_navigable(self) -> bool {
        !matches!(self, EntryKind::File)
    }

    pub fn label(self) -> &'static str {
        match self {
            EntryKind::Directory => "Directory",
            EntryKind::WebDocument => "Web",
            EntryKind::File => "File",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub name: String,
    pub href: String,
    pub kind: EntryKind,
    /// Size text as printed by the listing. Always empty unless `kind` is `File`.
    pub size: String,
    pub modified: String,
    pub icon: IconCategory,
}

impl Entry {
    /// Classifies a parsed candidate. Sizes are dropped for navigable kinds.
    pub fn from_raw(raw: RawEntry, classifier: &dyn EntryClassifier) -> Self {
        let kind = classifier.classify(&raw.href, &raw.name, &raw.row);
        let icon = IconCategory::for_entry(&raw.name, kind);
        let size = if kind == EntryKind::File { raw.size } else { String::new() };

        Entry { name: raw.name, href: raw.href, kind, size, modified: raw.modified, icon }
    }

    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }
}

/// Runs the parse and classify stages over a listing body, in document order.
pub fn ingest(body: &[u8], classifier: &dyn EntryClassifier) -> crate::Result<Vec<Entry>> {
    let raw = parse_listing(body)?;
    Ok(raw.into_iter().map(|r| Entry::from_raw(r, classifier)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directory_drops_size() {
        let raw = RawEntry {
            name: "docs/".to_string(),
            href: "docs/".to_string(),
            size: "-".to_string(),
            modified: "2024-01-01 10:00".to_string(),
            row: RowContext::default(),
        };
        let entry = Entry::from_raw(raw, &ApacheClassifier);
        assert_eq!(entry.kind, EntryKind::Directory);
        assert!(entry.size.is_empty());
        assert_eq!(entry.modified, "2024-01-01 10:00");
    }

    #[test]
    fn test_file_keeps_size() {
        let raw = RawEntry {
            name: "tool.iso".to_string(),
            href: "tool.iso".to_string(),
            size: "1.2G".to_string(),
            modified: String::new(),
            row: RowContext::default(),
        };
        let entry = Entry::from_raw(raw, &ApacheClassifier);
        assert!(entry.is_file());
        assert_eq!(entry.size, "1.2G");
        assert_eq!(entry.icon, IconCategory::DiskImage);
    }
}
