// src/preview/mod.rs
use url::Url;

use crate::error::Result;
use crate::net::PageFetcher;

pub mod page;
pub mod text;

pub use page::{find_matches, render_page, RenderedPage};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewContent {
    Text(String),
    Page(RenderedPage),
}

pub trait PreviewProvider {
    fn can_preview(&self, name: &str) -> bool;
    fn generate_preview(&self, fetcher: &dyn PageFetcher, location: &Url) -> Result<PreviewContent>;
}

pub struct PreviewManager {
    providers: Vec<Box<dyn PreviewProvider>>,
}

impl Default for PreviewManager {
    fn default() -> Self {
        Self::new()
    }
}

impl PreviewManager {
    pub fn new() -> Self {
        let mut manager = PreviewManager { providers: Vec::new() };
        manager.register(Box::new(text::TextPreview::new()));
        manager
    }

    pub fn register(&mut self, provider: Box<dyn PreviewProvider>) {
        self.providers.push(provider);
    }

    pub fn can_preview(&self, name: &str) -> bool {
        self.providers.iter().any(|p| p.can_preview(name))
    }

    /// First provider that accepts `name` wins. `None` when nobody does.
    pub fn get_preview(
        &self,
        fetcher: &dyn PageFetcher,
        name: &str,
        location: &Url,
    ) -> Option<Result<PreviewContent>> {
        self.providers
            .iter()
            .find(|provider| provider.can_preview(name))
            .map(|provider| provider.generate_preview(fetcher, location))
    }
}
