// src/navigator/mod.rs
pub mod history;
pub mod location;

pub use history::History;
pub use location::{breadcrumbs, parse_location, resolve, Crumb};

use log::{info, warn};
use url::Url;

use crate::error::{CrawlError, Result};
use crate::listing::{self, filter_entries, sort_entries, ApacheClassifier, Entry, EntryClassifier, SortSpec};
use crate::net::PageFetcher;
use crate::preview::{render_page, RenderedPage};

/// What activating an entry led to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Activation {
    Navigated(Url),
    /// A plain file; nothing was loaded.
    Download(Url),
}

/// The listing pipeline bound to one location: fetch, parse, classify, sort.
pub struct Navigator {
    root: Url,
    location: Option<Url>,
    entries: Vec<Entry>,
    visible: Vec<usize>,
    page: Option<RenderedPage>,
    sort: SortSpec,
    filter: String,
    surf: bool,
    history: History,
    fetcher: Box<dyn PageFetcher>,
    classifier: Box<dyn EntryClassifier>,
}

impl Navigator {
    pub fn new(root: Url, fetcher: Box<dyn PageFetcher>) -> Self {
        Navigator {
            root,
            location: None,
            entries: Vec::new(),
            visible: Vec::new(),
            page: None,
            sort: SortSpec::default(),
            filter: String::new(),
            surf: false,
            history: History::new(),
            fetcher,
            classifier: Box::new(ApacheClassifier),
        }
    }

    pub fn with_classifier(mut self, classifier: Box<dyn EntryClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn root(&self) -> &Url {
        &self.root
    }

    pub fn location(&self) -> Option<&Url> {
        self.location.as_ref()
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn fetcher(&self) -> &dyn PageFetcher {
        self.fetcher.as_ref()
    }

    pub fn page(&self) -> Option<&RenderedPage> {
        self.page.as_ref()
    }

    pub fn sort_spec(&self) -> SortSpec {
        self.sort
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    pub fn is_surfing(&self) -> bool {
        self.surf
    }

    pub fn set_surf(&mut self, surf: bool) {
        self.surf = surf;
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Entries passing the filter, in sort order.
    pub fn visible(&self) -> impl Iterator<Item = &Entry> {
        self.visible.iter().map(move |&i| &self.entries[i])
    }

    pub fn visible_len(&self) -> usize {
        self.visible.len()
    }

    pub fn visible_entry(&self, index: usize) -> Option<&Entry> {
        self.visible.get(index).map(|&i| &self.entries[i])
    }

    pub fn resolve_entry(&self, entry: &Entry) -> Result<Url> {
        resolve(self.location.as_ref().unwrap_or(&self.root), &entry.href)
    }

    pub fn crumbs(&self) -> Vec<Crumb> {
        breadcrumbs(self.location.as_ref().unwrap_or(&self.root), &self.root)
    }

    pub fn set_sort(&mut self, spec: SortSpec) {
        self.sort = spec;
        self.apply_view();
    }

    pub fn set_filter(&mut self, query: &str) {
        self.filter = query.to_string();
        self.apply_view();
    }

    fn apply_view(&mut self) {
        sort_entries(&mut self.entries, self.sort);
        self.visible = filter_entries(&self.entries, &self.filter);
    }

    /// Fetches `location` and replaces the current content.
    /// Network failures leave the previous content in place.
    fn load(&mut self, location: Url) -> Result<usize> {
        let body = self.fetcher.fetch(&location)?;

        let outcome = if self.surf {
            render_page(&body).map(|page| {
                let lines = page.lines.len();
                self.page = Some(page);
                self.entries.clear();
                lines
            })
        } else {
            listing::ingest(&body, self.classifier.as_ref()).map(|entries| {
                self.entries = entries;
                self.page = None;
                self.entries.len()
            })
        };

        match outcome {
            Ok(count) => {
                info!("loaded {} ({} items)", location, count);
                self.location = Some(location);
                self.apply_view();
                Ok(count)
            }
            Err(err @ CrawlError::Parse(_)) => {
                warn!("unreadable body at {}: {}", location, err);
                self.entries.clear();
                self.page = None;
                self.location = Some(location);
                self.apply_view();
                Err(err)
            }
            Err(err) => Err(err),
        }
    }

    /// Loads `location` and records it in history. Only a load that moved
    /// the view (success or unreadable body) is recorded.
    pub fn navigate_to(&mut self, location: Url) -> Result<usize> {
        let result = self.load(location.clone());
        if matches!(result, Ok(_) | Err(CrawlError::Parse(_))) {
            self.history.visit(location);
        }
        result
    }

    pub fn navigate_str(&mut self, input: &str) -> Result<usize> {
        let location = parse_location(input)?;
        self.navigate_to(location)
    }

    /// Opens the visible entry at `index`: navigable kinds are loaded,
    /// plain files are only resolved.
    pub fn activate(&mut self, index: usize) -> Result<Option<Activation>> {
        let Some(entry) = self.visible_entry(index) else {
            return Ok(None);
        };
        let target = self.resolve_entry(entry)?;
        if entry.kind.is_navigable() {
            self.navigate_to(target.clone())?;
            Ok(Some(Activation::Navigated(target)))
        } else {
            Ok(Some(Activation::Download(target)))
        }
    }

    pub fn back(&mut self) -> Result<Option<Url>> {
        let Some(target) = self.history.back().cloned() else {
            return Ok(None);
        };
        match self.load(target.clone()) {
            Ok(_) => Ok(Some(target)),
            Err(err) => {
                if self.location.as_ref() != Some(&target) {
                    self.history.forward();
                }
                Err(err)
            }
        }
    }

    pub fn forward(&mut self) -> Result<Option<Url>> {
        let Some(target) = self.history.forward().cloned() else {
            return Ok(None);
        };
        match self.load(target.clone()) {
            Ok(_) => Ok(Some(target)),
            Err(err) => {
                if self.location.as_ref() != Some(&target) {
                    self.history.back();
                }
                Err(err)
            }
        }
    }

    /// Goes to the parent listing, never above the root.
    pub fn up(&mut self) -> Result<Option<Url>> {
        let current = self.location.as_ref().unwrap_or(&self.root);
        let Some(parent) = location::parent(current, &self.root) else {
            return Ok(None);
        };
        self.navigate_to(parent.clone())?;
        Ok(Some(parent))
    }

    /// Goes to the start page, or the root when none is set.
    pub fn home(&mut self, start_page: Option<&str>) -> Result<Option<Url>> {
        let target = match start_page {
            Some(page) => parse_location(page)?,
            None => self.root.clone(),
        };
        if self.location.as_ref() == Some(&target) {
            return Ok(None);
        }
        self.navigate_to(target.clone())?;
        Ok(Some(target))
    }

    pub fn refresh(&mut self) -> Result<usize> {
        let target = self.location.clone().unwrap_or_else(|| self.root.clone());
        if self.location.is_none() {
            return self.navigate_to(target);
        }
        self.load(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::{EntryKind, SortKey};
    use std::cell::Cell;
    use std::collections::HashMap;

    struct StaticFetcher(HashMap<String, &'static str>);

    impl PageFetcher for StaticFetcher {
        fn fetch(&self, location: &Url) -> Result<Vec<u8>> {
            self.0
                .get(location.as_str())
                .map(|body| body.as_bytes().to_vec())
                .ok_or_else(|| CrawlError::Status { url: location.to_string(), status: 404 })
        }
    }

    /// Serves one body, then answers 503 forever.
    struct FlakyFetcher {
        calls: Cell<usize>,
    }

    impl PageFetcher for FlakyFetcher {
        fn fetch(&self, location: &Url) -> Result<Vec<u8>> {
            self.calls.set(self.calls.get() + 1);
            if self.calls.get() == 1 {
                Ok(br#"<a href="a.txt">a.txt</a>"#.to_vec())
            } else {
                Err(CrawlError::Status { url: location.to_string(), status: 503 })
            }
        }
    }

    fn navigator() -> Navigator {
        let mut pages = HashMap::new();
        pages.insert(
            "https://h.test/FILES/".to_string(),
            r#"<a href="iso/">iso/</a><a href="b.txt">b.txt</a><a href="A.txt">A.txt</a><a href="gone/">gone/</a>"#,
        );
        pages.insert("https://h.test/FILES/iso/".to_string(), r#"<a href="x.iso">x.iso</a>"#);
        pages.insert("https://h.test/FILES/blob/".to_string(), "\x7fELF\0\0\0 not a listing");
        let root = Url::parse("https://h.test/FILES/").unwrap();
        Navigator::new(root, Box::new(StaticFetcher(pages)))
    }

    #[test]
    fn test_navigate_sorts_and_records_history() {
        let mut nav = navigator();
        assert_eq!(nav.navigate_str("https://h.test/FILES/").unwrap(), 4);
        let names: Vec<_> = nav.visible().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["A.txt", "b.txt", "gone/", "iso/"]);
        assert_eq!(nav.history().len(), 1);
    }

    #[test]
    fn test_failed_navigation_keeps_state() {
        let mut nav = navigator();
        nav.navigate_str("https://h.test/FILES/").unwrap();
        let err = nav.navigate_str("https://h.test/FILES/gone/").unwrap_err();
        assert!(err.is_network());
        assert_eq!(nav.location().unwrap().as_str(), "https://h.test/FILES/");
        assert_eq!(nav.visible_len(), 4);
        assert_eq!(nav.history().len(), 1);
    }

    #[test]
    fn test_failed_reload_of_current_page_adds_no_history() {
        let root = Url::parse("https://h.test/FILES/").unwrap();
        let mut nav = Navigator::new(root.clone(), Box::new(FlakyFetcher { calls: Cell::new(0) }));
        nav.navigate_to(root.clone()).unwrap();
        let err = nav.navigate_to(root).unwrap_err();
        assert!(err.is_network());
        assert_eq!(nav.history().len(), 1);
        assert!(!nav.history().can_go_back());
        assert_eq!(nav.visible_len(), 1);
    }

    #[test]
    fn test_unreadable_body_moves_to_empty_listing() {
        let mut nav = navigator();
        nav.navigate_str("https://h.test/FILES/").unwrap();
        let err = nav.navigate_str("https://h.test/FILES/blob/").unwrap_err();
        assert!(matches!(err, CrawlError::Parse(_)));
        assert_eq!(nav.location().unwrap().as_str(), "https://h.test/FILES/blob/");
        assert_eq!(nav.visible_len(), 0);
        assert_eq!(nav.history().len(), 2);
        assert!(nav.history().can_go_back());
    }

    #[test]
    fn test_activate_directory_and_file() {
        let mut nav = navigator();
        nav.navigate_str("https://h.test/FILES/").unwrap();
        nav.set_sort(SortSpec::new(SortKey::Type, true));
        assert_eq!(nav.visible_entry(1).unwrap().name, "iso/");

        let opened = nav.activate(1).unwrap();
        assert_eq!(opened, Some(Activation::Navigated(Url::parse("https://h.test/FILES/iso/").unwrap())));
        assert_eq!(nav.visible_entry(0).unwrap().kind, EntryKind::File);

        let file = nav.activate(0).unwrap();
        assert_eq!(file, Some(Activation::Download(Url::parse("https://h.test/FILES/iso/x.iso").unwrap())));
        assert_eq!(nav.location().unwrap().as_str(), "https://h.test/FILES/iso/");
        assert_eq!(nav.activate(9).unwrap(), None);
    }

    #[test]
    fn test_back_forward_up_home() {
        let mut nav = navigator();
        nav.navigate_str("https://h.test/FILES/").unwrap();
        nav.navigate_str("https://h.test/FILES/iso/").unwrap();

        assert_eq!(nav.back().unwrap().unwrap().as_str(), "https://h.test/FILES/");
        assert!(nav.history().can_go_forward());
        assert_eq!(nav.forward().unwrap().unwrap().as_str(), "https://h.test/FILES/iso/");
        assert_eq!(nav.forward().unwrap(), None);

        assert_eq!(nav.up().unwrap().unwrap().as_str(), "https://h.test/FILES/");
        assert_eq!(nav.up().unwrap(), None);
        assert_eq!(nav.home(None).unwrap(), None);
        assert_eq!(
            nav.home(Some("https://h.test/FILES/iso/")).unwrap().unwrap().as_str(),
            "https://h.test/FILES/iso/"
        );
    }

    #[test]
    fn test_filter_is_applied_in_sort_order() {
        let mut nav = navigator();
        nav.navigate_str("https://h.test/FILES/").unwrap();
        nav.set_filter("TXT");
        let names: Vec<_> = nav.visible().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["A.txt", "b.txt"]);
        nav.set_sort(SortSpec::new(SortKey::Name, false));
        let names: Vec<_> = nav.visible().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["b.txt", "A.txt"]);
        nav.set_filter("");
        assert_eq!(nav.visible_len(), 4);
    }

    #[test]
    fn test_surf_mode_renders_page() {
        let mut nav = navigator();
        nav.set_surf(true);
        nav.navigate_str("https://h.test/FILES/iso/").unwrap();
        assert_eq!(nav.page().unwrap().lines, vec!["x.iso"]);
        assert_eq!(nav.visible_len(), 0);
    }
}
