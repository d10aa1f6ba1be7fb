// src/listing/sort.rs
use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::{Entry, EntryKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    #[default]
    Name,
    Size,
    Type,
    Modified,
}

impl SortKey {
    pub const ALL: [SortKey; 4] = [SortKey::Name, SortKey::Size, SortKey::Type, SortKey::Modified];

    pub fn label(self) -> &'static str {
        match self {
            SortKey::Name => "Name",
            SortKey::Size => "Size",
            SortKey::Type => "Type",
            SortKey::Modified => "Modified",
        }
    }

    pub fn next(self) -> Self {
        match self {
            SortKey::Name => SortKey::Size,
            SortKey::Size => SortKey::Type,
            SortKey::Type => SortKey::Modified,
            SortKey::Modified => SortKey::Name,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub key: SortKey,
    pub ascending: bool,
}

impl Default for SortSpec {
    fn default() -> Self {
        SortSpec { key: SortKey::Name, ascending: true }
    }
}

impl SortSpec {
    pub fn new(key: SortKey, ascending: bool) -> Self {
        SortSpec { key, ascending }
    }

    pub fn toggled(self) -> Self {
        SortSpec { ascending: !self.ascending, ..self }
    }

    pub fn arrow(self) -> &'static str {
        if self.ascending { "↑" } else { "↓" }
    }
}

/// Converts listing sizes like `345`, `4.2K` or `1.1G` to bytes.
/// Placeholders and anything unreadable count as zero.
pub fn parse_size(size: &str) -> f64 {
    let size = size.trim();
    if size.is_empty() || size == "-" {
        return 0.0;
    }

    let (number, multiplier) = match size.chars().last().map(|c| c.to_ascii_uppercase()) {
        Some('K') => (&size[..size.len() - 1], 1024f64),
        Some('M') => (&size[..size.len() - 1], 1024f64.powi(2)),
        Some('G') => (&size[..size.len() - 1], 1024f64.powi(3)),
        Some('T') => (&size[..size.len() - 1], 1024f64.powi(4)),
        _ => (size, 1.0),
    };

    match number.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => value * multiplier,
        _ => 0.0,
    }
}

fn compare(a: &Entry, b: &Entry, key: SortKey) -> Ordering {
    match key {
        SortKey::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
        SortKey::Size => parse_size(&a.size).total_cmp(&parse_size(&b.size)),
        SortKey::Type => {
            let group = |e: &Entry| e.kind == EntryKind::File;
            group(a)
                .cmp(&group(b))
                .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
        }
        // Raw text order; listings are not guaranteed to use a sortable date format.
        SortKey::Modified => a.modified.cmp(&b.modified),
    }
}

/// Stable sort. Descending is the exact reverse of the ascending order.
pub fn sort_entries(entries: &mut [Entry], spec: SortSpec) {
    entries.sort_by(|a, b| compare(a, b, spec.key));
    if !spec.ascending {
        entries.reverse();
    }
}

/// Indices of entries whose name contains `query`, ignoring case.
/// An empty query selects everything.
pub fn filter_entries(entries: &[Entry], query: &str) -> Vec<usize> {
    let needle = query.to_lowercase();
    entries
        .iter()
        .enumerate()
        .filter(|(_, entry)| needle.is_empty() || entry.name.to_lowercase().contains(&needle))
        .map(|(index, _)| index)
        .collect()
}
