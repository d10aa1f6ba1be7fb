// src/utils/formatter.rs
use url::Url;

use crate::listing::Entry;
use crate::net::DownloadEvent;

/// Lines shown in the info panel for the selected entry.
pub fn format_info(entry: &Entry, target: Option<&Url>) -> Vec<String> {
    let mut lines = vec![
        format!("Name: {}", entry.name),
        format!("Type: {}", entry.kind.label()),
    ];
    if !entry.size.is_empty() {
        lines.push(format!("Size: {}", entry.size));
    }
    if !entry.modified.is_empty() {
        lines.push(format!("Modified: {}", entry.modified));
    }
    match target {
        Some(url) => lines.push(format!("URL: {}", url)),
        None => lines.push(format!("URL: {}", entry.href)),
    }
    lines
}

/// Status-bar text for a download event.
pub fn format_download_event(event: &DownloadEvent) -> String {
    match event {
        DownloadEvent::Started { index, total, name } if *total > 1 => {
            format!("{}/{} files | {}", index + 1, total, name)
        }
        DownloadEvent::Started { name, .. } => format!("Downloading {}...", name),
        DownloadEvent::Progress { index, total, name, percent } if *total > 1 => {
            format!("{}/{} files | {} - {}%", index + 1, total, name, percent)
        }
        DownloadEvent::Progress { name, percent, .. } => format!("Downloading {} - {}%", name, percent),
        DownloadEvent::Finished { path, .. } => format!("Downloaded successfully to {}", path.display()),
        DownloadEvent::Failed { name, error, .. } => format!("Download of {} failed: {}", name, error),
        DownloadEvent::BatchDone { cancelled: true, completed, .. } => {
            format!("Download cancelled after {} file(s)", completed)
        }
        DownloadEvent::BatchDone { completed, failed: 0, .. } => {
            format!("Successfully downloaded {} file(s)", completed)
        }
        DownloadEvent::BatchDone { completed, failed, .. } => {
            format!("Downloaded {} file(s), {} failed", completed, failed)
        }
    }
}

/// Cuts `text` to `width` characters, marking the cut with `~`.
pub fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    if width == 0 {
        return String::new();
    }
    let mut cut: String = text.chars().take(width - 1).collect();
    cut.push('~');
    cut
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::{EntryKind, IconCategory};
    use std::path::PathBuf;

    #[test]
    fn test_format_info_skips_empty_fields() {
        let entry = Entry {
            name: "docs/".to_string(),
            href: "docs/".to_string(),
            kind: EntryKind::Directory,
            size: String::new(),
            modified: String::new(),
            icon: IconCategory::Folder,
        };
        let url = Url::parse("https://h.test/docs/").unwrap();
        assert_eq!(
            format_info(&entry, Some(&url)),
            vec!["Name: docs/", "Type: Directory", "URL: https://h.test/docs/"]
        );
    }

    #[test]
    fn test_format_download_event() {
        let single = DownloadEvent::Progress { index: 0, total: 1, name: "a.iso".into(), percent: 42 };
        assert_eq!(format_download_event(&single), "Downloading a.iso - 42%");

        let batch = DownloadEvent::Progress { index: 1, total: 3, name: "b.iso".into(), percent: 7 };
        assert_eq!(format_download_event(&batch), "2/3 files | b.iso - 7%");

        let done = DownloadEvent::BatchDone { completed: 3, failed: 0, cancelled: false };
        assert_eq!(format_download_event(&done), "Successfully downloaded 3 file(s)");

        let finished = DownloadEvent::Finished { index: 0, path: PathBuf::from("/tmp/a"), bytes: 1 };
        assert!(format_download_event(&finished).ends_with("/tmp/a"));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefgh", 5), "abcd~");
        assert_eq!(truncate("abc", 0), "");
    }
}
