// src/navigator/location.rs
use percent_encoding::percent_decode_str;
use url::Url;

use crate::error::{CrawlError, Result};

/// Parses user input as an absolute location. A missing scheme means `https`.
pub fn parse_location(input: &str) -> Result<Url> {
    let input = input.trim();
    let candidate = if input.contains("://") {
        input.to_string()
    } else {
        format!("https://{}", input)
    };
    Url::parse(&candidate).map_err(|source| CrawlError::InvalidLocation {
        input: input.to_string(),
        source,
    })
}

pub fn resolve(base: &Url, href: &str) -> Result<Url> {
    base.join(href).map_err(|source| CrawlError::InvalidLocation {
        input: href.to_string(),
        source,
    })
}

/// Parent listing of `current`, or `None` when that would climb above `root`.
pub fn parent(current: &Url, root: &Url) -> Option<Url> {
    if current == root {
        return None;
    }
    let path = current.path();
    let trimmed = path.strip_suffix('/').unwrap_or(path);
    let cut = trimmed.rfind('/')?;

    let mut up = current.clone();
    up.set_path(&trimmed[..=cut]);
    up.set_query(None);
    up.set_fragment(None);

    let root_prefix = root.as_str().trim_end_matches('/');
    if up.as_str().starts_with(root_prefix) {
        Some(up)
    } else {
        None
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Crumb {
    pub label: String,
    pub location: Url,
}

/// Path components of `current` below `root`, starting with `root` itself.
pub fn breadcrumbs(current: &Url, root: &Url) -> Vec<Crumb> {
    let mut crumbs = vec![Crumb { label: "FILES".to_string(), location: root.clone() }];

    if current.origin() != root.origin() {
        return crumbs;
    }
    let Some(relative) = current.path().strip_prefix(root.path()) else {
        return crumbs;
    };

    let mut location = root.clone();
    let mut parts = relative.split('/').filter(|p| !p.is_empty()).peekable();
    while let Some(part) = parts.next() {
        let is_page = parts.peek().is_none() && !relative.ends_with('/');
        let href = if is_page { part.to_string() } else { format!("{}/", part) };
        let Ok(next) = location.join(&href) else {
            break;
        };
        location = next;
        crumbs.push(Crumb { label: decode(part), location: location.clone() });
    }
    crumbs
}

pub fn decode(text: &str) -> String {
    percent_decode_str(text).decode_utf8_lossy().into_owned()
}

/// Local file name for a download: the decoded last path segment.
pub fn file_name(location: &Url) -> Option<String> {
    let name = location.path_segments()?.filter(|s| !s.is_empty()).last()?;
    let name = decode(name);
    let name = name.replace(|c: char| c == '/' || c == '\\', "_");
    if name.is_empty() || name == "." || name == ".." {
        None
    } else {
        Some(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_parse_location_adds_scheme() {
        assert_eq!(parse_location("example.org/pub/").unwrap().as_str(), "https://example.org/pub/");
        assert_eq!(parse_location(" http://a.test/ ").unwrap().as_str(), "http://a.test/");
        assert!(parse_location("http://").is_err());
    }

    #[test]
    fn test_resolve_relative_and_absolute() {
        let base = url("https://h.test/FILES/iso/");
        assert_eq!(resolve(&base, "debian/").unwrap().as_str(), "https://h.test/FILES/iso/debian/");
        assert_eq!(resolve(&base, "/other/").unwrap().as_str(), "https://h.test/other/");
        assert_eq!(resolve(&base, "http://x.test/").unwrap().as_str(), "http://x.test/");
    }

    #[test]
    fn test_parent_stops_at_root() {
        let root = url("https://h.test/FILES/");
        assert_eq!(
            parent(&url("https://h.test/FILES/iso/debian/"), &root),
            Some(url("https://h.test/FILES/iso/"))
        );
        assert_eq!(parent(&url("https://h.test/FILES/iso/"), &root), Some(root.clone()));
        assert_eq!(parent(&root, &root), None);
        assert_eq!(parent(&url("https://h.test/elsewhere/x/"), &root), None);
        assert_eq!(
            parent(&url("https://h.test/FILES/iso/page.html"), &root),
            Some(url("https://h.test/FILES/iso/"))
        );
    }

    #[test]
    fn test_breadcrumbs() {
        let root = url("https://h.test/FILES/");
        let crumbs = breadcrumbs(&url("https://h.test/FILES/iso/live%20cd/"), &root);
        let labels: Vec<_> = crumbs.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, vec!["FILES", "iso", "live cd"]);
        assert_eq!(crumbs[2].location.as_str(), "https://h.test/FILES/iso/live%20cd/");

        let outside = breadcrumbs(&url("https://x.test/"), &root);
        assert_eq!(outside.len(), 1);
    }

    #[test]
    fn test_file_name() {
        assert_eq!(file_name(&url("https://h.test/a/My%20File.iso")).as_deref(), Some("My File.iso"));
        assert_eq!(file_name(&url("https://h.test/a/b/")).as_deref(), Some("b"));
        assert_eq!(file_name(&url("https://h.test/")), None);
    }
}
