// src/preview/page.rs
use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::{Handle, NodeData, RcDom};

use crate::error::{CrawlError, Result};
use crate::listing::ensure_markup;

/// Plain-text rendering of an HTML page, used by surf mode.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderedPage {
    pub title: Option<String>,
    pub lines: Vec<String>,
}

impl RenderedPage {
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }
}

const SKIPPED: [&str; 6] = ["script", "style", "noscript", "template", "head", "svg"];

const BLOCKS: [&str; 28] = [
    "address", "article", "aside", "blockquote", "dd", "div", "dl", "dt", "fieldset", "figure",
    "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "li", "main", "nav", "ol",
    "p", "section", "table", "ul",
];

pub fn render_page(body: &[u8]) -> Result<RenderedPage> {
    ensure_markup(body)?;
    let dom = parse_document(RcDom::default(), Default::default())
        .from_utf8()
        .read_from(&mut &body[..])
        .map_err(|e| CrawlError::Parse(e.to_string()))?;

    let mut renderer = Renderer::default();
    renderer.visit(&dom.document);
    renderer.break_line();

    let title = find_title(&dom.document).map(|t| collapse(&t)).filter(|t| !t.is_empty());
    Ok(RenderedPage { title, lines: renderer.lines })
}

#[derive(Default)]
struct Renderer {
    lines: Vec<String>,
    current: String,
    in_pre: usize,
}

impl Renderer {
    fn visit(&mut self, handle: &Handle) {
        match &handle.data {
            NodeData::Text { contents } => {
                let text = contents.borrow();
                if self.in_pre > 0 {
                    let mut pieces = text.split('\n');
                    if let Some(first) = pieces.next() {
                        self.current.push_str(first);
                    }
                    for piece in pieces {
                        self.flush();
                        self.current.push_str(piece);
                    }
                } else {
                    self.push_words(&text);
                }
            }
            NodeData::Element { name, .. } => {
                let tag = name.local.as_ref();
                if SKIPPED.contains(&tag) {
                    return;
                }
                match tag {
                    "br" => self.flush(),
                    "pre" => {
                        self.break_line();
                        self.in_pre += 1;
                        self.visit_children(handle);
                        self.in_pre -= 1;
                        self.break_line();
                    }
                    "tr" => {
                        self.break_line();
                        self.visit_children(handle);
                        self.break_line();
                    }
                    "td" | "th" => {
                        if !self.current.is_empty() {
                            self.current.push_str("  ");
                        }
                        self.visit_children(handle);
                    }
                    _ if BLOCKS.contains(&tag) => {
                        self.break_line();
                        if tag == "li" {
                            self.current.push_str("* ");
                        }
                        self.visit_children(handle);
                        self.break_line();
                    }
                    _ => self.visit_children(handle),
                }
            }
            NodeData::Document => self.visit_children(handle),
            _ => {}
        }
    }

    fn visit_children(&mut self, handle: &Handle) {
        for child in handle.children.borrow().iter() {
            self.visit(child);
        }
    }

    fn push_words(&mut self, text: &str) {
        let starts_with_space = text.starts_with(char::is_whitespace);
        let mut words = text.split_whitespace().peekable();
        if words.peek().is_none() {
            if !text.is_empty() && !self.current.is_empty() && !self.current.ends_with(' ') {
                self.current.push(' ');
            }
            return;
        }
        if starts_with_space && !self.current.is_empty() && !self.current.ends_with(' ') {
            self.current.push(' ');
        }
        let mut first = true;
        for word in words {
            if !first {
                self.current.push(' ');
            }
            self.current.push_str(word);
            first = false;
        }
        if text.ends_with(char::is_whitespace) {
            self.current.push(' ');
        }
    }

    fn flush(&mut self) {
        let line = std::mem::take(&mut self.current);
        self.lines.push(line.trim_end().to_string());
    }

    // Ends the current line unless it is already empty, and avoids stacking blank lines.
    fn break_line(&mut self) {
        if !self.current.trim().is_empty() {
            self.flush();
        } else {
            self.current.clear();
        }
    }
}

fn find_title(handle: &Handle) -> Option<String> {
    if let NodeData::Element { name, .. } = &handle.data {
        if name.local.as_ref() == "title" {
            let mut text = String::new();
            for child in handle.children.borrow().iter() {
                if let NodeData::Text { contents } = &child.data {
                    text.push_str(&contents.borrow());
                }
            }
            return Some(text);
        }
    }
    handle.children.borrow().iter().find_map(find_title)
}

fn collapse(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Case-insensitive occurrences of `query` as `(line, char column)` pairs.
pub fn find_matches(lines: &[String], query: &str) -> Vec<(usize, usize)> {
    let needle = query.to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }

    let mut matches = Vec::new();
    for (row, line) in lines.iter().enumerate() {
        let haystack = line.to_lowercase();
        let mut start = 0;
        while let Some(found) = haystack[start..].find(&needle) {
            let byte = start + found;
            matches.push((row, haystack[..byte].chars().count()));
            start = byte + needle.len();
        }
    }
    matches
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_page_blocks_and_title() {
        let html = r#"<html><head><title> Glitch  Linux </title><style>p{}</style></head>
            <body><h1>Welcome</h1><p>First   para
            continues.</p><script>alert(1)</script><ul><li>one</li><li>two</li></ul>
            line<br>break</body></html>"#;
        let page = render_page(html.as_bytes()).unwrap();
        assert_eq!(page.title.as_deref(), Some("Glitch Linux"));
        assert_eq!(
            page.lines,
            vec!["Welcome", "First para continues.", "* one", "* two", "line", "break"]
        );
    }

    #[test]
    fn test_render_page_keeps_pre_lines() {
        let page = render_page(b"<pre>a  b\nc</pre>").unwrap();
        assert_eq!(page.lines, vec!["a  b", "c"]);
    }

    #[test]
    fn test_render_page_rejects_binary() {
        assert!(matches!(render_page(b"\x7fELF\x02\x01\x00\x00"), Err(CrawlError::Parse(_))));
    }

    #[test]
    fn test_find_matches_ignores_case() {
        let lines = vec!["Zip zip".to_string(), "nothing".to_string(), "a ZIP".to_string()];
        assert_eq!(find_matches(&lines, "zip"), vec![(0, 0), (0, 4), (2, 2)]);
        assert!(find_matches(&lines, "").is_empty());
    }
}
