// src/listing/classify.rs
use super::EntryKind;

/// Extensions that render as pages and are browsed rather than downloaded.
pub const WEB_EXTENSIONS: [&str; 7] = ["html", "htm", "php", "asp", "aspx", "jsp", "cgi"];

const DIR_MARKER: &str = "[DIR]";

/// Flattened text of the table row an anchor was found in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowContext {
    markup: Option<String>,
}

impl RowContext {
    pub fn new(markup: String) -> Self {
        RowContext { markup: Some(markup) }
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.markup.as_deref().map(|m| m.contains(needle)).unwrap_or(false)
    }
}

pub trait EntryClassifier {
    fn classify(&self, href: &str, text: &str, row: &RowContext) -> EntryKind;
}

/// Heuristics for Apache `mod_autoindex` output.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApacheClassifier;

impl EntryClassifier for ApacheClassifier {
    fn classify(&self, href: &str, text: &str, row: &RowContext) -> EntryKind {
        if href_path(href).ends_with('/') || row.contains(DIR_MARKER) {
            EntryKind::Directory
        } else if is_web_navigable(text) || is_web_navigable(last_segment(href)) {
            EntryKind::WebDocument
        } else {
            EntryKind::File
        }
    }
}

pub fn is_web_navigable(name: &str) -> bool {
    extension(name)
        .map(|ext| WEB_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false)
}

pub fn is_text_file(name: &str) -> bool {
    const TEXT: [&str; 34] = [
        "txt", "py", "js", "html", "htm", "css", "json", "xml", "yaml", "yml", "md", "rst", "log",
        "cfg", "conf", "ini", "sh", "bash", "bat", "ps1", "c", "cpp", "h", "hpp", "java", "php",
        "rb", "go", "rs", "swift", "sql", "csv", "tsv", "rtf",
    ];
    extension(name).map(|ext| TEXT.contains(&ext.as_str())).unwrap_or(false)
}

/// Lowercased extension of the final path component.
pub fn extension(name: &str) -> Option<String> {
    let base = last_segment(name);
    let (stem, ext) = base.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

fn href_path(href: &str) -> &str {
    let end = href.find(|c: char| c == '?' || c == '#').unwrap_or(href.len());
    &href[..end]
}

fn last_segment(href: &str) -> &str {
    let path = href_path(href);
    path.rsplit('/').next().unwrap_or(path)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IconCategory {
    Folder,
    Web,
    Text,
    Code,
    Data,
    Image,
    Audio,
    Video,
    Document,
    Archive,
    DiskImage,
    Package,
    Key,
    Unknown,
}

impl IconCategory {
    pub fn for_entry(name: &str, kind: EntryKind) -> Self {
        match kind {
            EntryKind::Directory => IconCategory::Folder,
            EntryKind::WebDocument => IconCategory::Web,
            EntryKind::File => Self::for_file(name),
        }
    }

    pub fn for_file(name: &str) -> Self {
        let lower = name.to_ascii_lowercase();
        if lower.ends_with(".tar.gz") || lower.ends_with(".tar.xz") || lower.ends_with(".tar.lzma") {
            return IconCategory::Archive;
        }

        match extension(&lower).as_deref() {
            Some("txt" | "md" | "rst" | "log" | "nfo") => IconCategory::Text,
            Some("py" | "sh" | "bash" | "rs" | "c" | "cpp" | "h" | "java" | "js" | "go" | "rb") => {
                IconCategory::Code
            }
            Some("json" | "xml" | "yaml" | "yml" | "cfg" | "conf" | "ini" | "toml" | "csv") => {
                IconCategory::Data
            }
            Some("png" | "jpg" | "jpeg" | "gif" | "bmp" | "webp" | "svg" | "ico" | "tiff") => {
                IconCategory::Image
            }
            Some("mp3" | "ogg" | "flac" | "wav" | "m4a") => IconCategory::Audio,
            Some("mp4" | "mkv" | "webm" | "avi" | "mov") => IconCategory::Video,
            Some("pdf" | "doc" | "docx" | "odt" | "epub") => IconCategory::Document,
            Some("tar" | "gz" | "xz" | "7z" | "zip" | "bz2" | "zst" | "lzma" | "rar") => {
                IconCategory::Archive
            }
            Some("iso" | "img" | "vhd" | "vdi" | "qcow2" | "efi") => IconCategory::DiskImage,
            Some("deb" | "rpm" | "apk" | "appimage" | "snap" | "flatpak") => IconCategory::Package,
            Some("pgp" | "asc" | "gpg" | "sig" | "sha256" | "md5") => IconCategory::Key,
            _ => IconCategory::Unknown,
        }
    }

    pub fn glyph(self) -> &'static str {
        match self {
            IconCategory::Folder => "[D]",
            IconCategory::Web => "[W]",
            IconCategory::Text => "[T]",
            IconCategory::Code => "[C]",
            IconCategory::Data => "[=]",
            IconCategory::Image => "[I]",
            IconCategory::Audio => "[A]",
            IconCategory::Video => "[V]",
            IconCategory::Document => "[P]",
            IconCategory::Archive => "[Z]",
            IconCategory::DiskImage => "[O]",
            IconCategory::Package => "[K]",
            IconCategory::Key => "[#]",
            IconCategory::Unknown => "[?]",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(href: &str, text: &str, row: &RowContext) -> EntryKind {
        ApacheClassifier.classify(href, text, row)
    }

    #[test]
    fn test_trailing_slash_is_directory() {
        assert_eq!(classify("docs/", "docs/", &RowContext::default()), EntryKind::Directory);
        assert_eq!(classify("docs/?C=N;O=D", "docs", &RowContext::default()), EntryKind::Directory);
    }

    #[test]
    fn test_dir_marker_in_row() {
        let row = RowContext::new(" /icons/folder.gif [DIR] archive".to_string());
        assert_eq!(classify("archive", "archive", &row), EntryKind::Directory);
    }

    #[test]
    fn test_web_documents() {
        let none = RowContext::default();
        assert_eq!(classify("index.html", "index.html", &none), EntryKind::WebDocument);
        assert_eq!(classify("view.PHP", "view.PHP", &none), EntryKind::WebDocument);
        assert_eq!(classify("page.aspx?id=3", "Page", &none), EntryKind::WebDocument);
        assert_eq!(classify("readme.txt", "readme.txt", &none), EntryKind::File);
    }

    #[test]
    fn test_classifier_is_pure() {
        let row = RowContext::new("[TXT] a.txt".to_string());
        let first = classify("a.txt", "a.txt", &row);
        for _ in 0..3 {
            assert_eq!(classify("a.txt", "a.txt", &row), first);
        }
    }

    #[test]
    fn test_extension() {
        assert_eq!(extension("Archive.ZIP").as_deref(), Some("zip"));
        assert_eq!(extension(".bashrc"), None);
        assert_eq!(extension("noext"), None);
        assert_eq!(extension("dir.d/file"), None);
    }

    #[test]
    fn test_icon_categories() {
        assert_eq!(IconCategory::for_file("linux.tar.gz"), IconCategory::Archive);
        assert_eq!(IconCategory::for_file("glitch.iso"), IconCategory::DiskImage);
        assert_eq!(IconCategory::for_file("app.AppImage"), IconCategory::Package);
        assert_eq!(IconCategory::for_file("mystery"), IconCategory::Unknown);
        assert_eq!(IconCategory::for_entry("x", EntryKind::Directory), IconCategory::Folder);
    }
}
