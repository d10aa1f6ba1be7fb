// src/listing/parser.rs
use std::sync::OnceLock;

use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use log::debug;
use markup5ever_rcdom::{Handle, NodeData, RcDom};
use regex::Regex;

use super::classify::RowContext;
use crate::error::{CrawlError, Result};

/// An anchor that survived filtering, before classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEntry {
    pub name: String,
    pub href: String,
    pub size: String,
    pub modified: String,
    pub row: RowContext,
}

const PARENT_HREFS: [&str; 3] = ["/", "../", ".."];

/// Bytes inspected when deciding whether a body is text at all.
const SNIFF_LEN: usize = 8000;

fn sort_toggle() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\?C=[NMSD];O=[AD]$").expect("static pattern"))
}

/// Column-sort links and parent-directory links are chrome, not entries.
pub fn is_excluded(href: &str, text: &str) -> bool {
    PARENT_HREFS.contains(&href)
        || sort_toggle().is_match(href)
        || text.eq_ignore_ascii_case("parent directory")
}

/// Rejects bodies that are not markup: a NUL byte near the start means the
/// server handed back a binary file.
pub fn ensure_markup(body: &[u8]) -> Result<()> {
    let head = &body[..body.len().min(SNIFF_LEN)];
    match head.iter().position(|&b| b == 0) {
        Some(offset) => Err(CrawlError::Parse(format!(
            "binary content ({} bytes, NUL at offset {})",
            body.len(),
            offset
        ))),
        None => Ok(()),
    }
}

/// Parses an autoindex page into entry candidates in document order.
///
/// Broken markup is recovered by the HTML tokenizer; a binary body yields
/// `CrawlError::Parse`.
pub fn parse_listing(body: &[u8]) -> Result<Vec<RawEntry>> {
    ensure_markup(body)?;
    let dom = parse_document(RcDom::default(), Default::default())
        .from_utf8()
        .read_from(&mut &body[..])
        .map_err(|e| CrawlError::Parse(e.to_string()))?;

    let mut entries = Vec::new();
    walk(&dom.document, None, &mut entries);
    debug!("parsed {} entries from {} bytes", entries.len(), body.len());
    Ok(entries)
}

fn walk(handle: &Handle, row: Option<&Handle>, out: &mut Vec<RawEntry>) {
    if let NodeData::Element { name, .. } = &handle.data {
        match name.local.as_ref() {
            "tr" => {
                for child in handle.children.borrow().iter() {
                    walk(child, Some(handle), out);
                }
                return;
            }
            "a" => {
                if let Some(entry) = read_anchor(handle, row) {
                    out.push(entry);
                }
                return;
            }
            _ => {}
        }
    }

    for child in handle.children.borrow().iter() {
        walk(child, row, out);
    }
}

fn read_anchor(anchor: &Handle, row: Option<&Handle>) -> Option<RawEntry> {
    let href = attribute(anchor, "href")?;
    if href.is_empty() {
        return None;
    }

    let name = text_content(anchor).trim().to_string();
    if name.is_empty() || is_excluded(&href, &name) {
        return None;
    }

    let mut size = String::new();
    let mut modified = String::new();
    let mut context = RowContext::default();

    if let Some(row) = row {
        let cells = cells_of(row);
        if cells.len() >= 4 {
            modified = text_content(&cells[2]).trim().to_string();
            size = text_content(&cells[3]).trim().to_string();
        }
        let mut markup = String::new();
        collect_markup(row, &mut markup);
        context = RowContext::new(markup);
    }

    Some(RawEntry { name, href, size, modified, row: context })
}

fn attribute(handle: &Handle, wanted: &str) -> Option<String> {
    match &handle.data {
        NodeData::Element { attrs, .. } => attrs
            .borrow()
            .iter()
            .find(|attr| attr.name.local.as_ref() == wanted)
            .map(|attr| attr.value.trim().to_string()),
        _ => None,
    }
}

fn cells_of(row: &Handle) -> Vec<Handle> {
    row.children
        .borrow()
        .iter()
        .filter(|child| match &child.data {
            NodeData::Element { name, .. } => name.local.as_ref() == "td",
            _ => false,
        })
        .cloned()
        .collect()
}

fn text_content(handle: &Handle) -> String {
    let mut text = String::new();
    collect_text(handle, &mut text);
    text
}

fn collect_text(handle: &Handle, text: &mut String) {
    match &handle.data {
        NodeData::Text { contents } => text.push_str(&contents.borrow()),
        NodeData::Element { .. } | NodeData::Document => {
            for child in handle.children.borrow().iter() {
                collect_text(child, text);
            }
        }
        _ => {}
    }
}

// Row text plus attribute values, so markers like alt="[DIR]" are visible.
fn collect_markup(handle: &Handle, out: &mut String) {
    match &handle.data {
        NodeData::Text { contents } => out.push_str(&contents.borrow()),
        NodeData::Element { attrs, .. } => {
            for attr in attrs.borrow().iter() {
                out.push(' ');
                out.push_str(&attr.value);
            }
            for child in handle.children.borrow().iter() {
                collect_markup(child, out);
            }
        }
        _ => {}
    }
}
