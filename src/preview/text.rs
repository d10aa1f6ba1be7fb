// src/preview/text.rs
use super::*;
use crate::listing::classify::is_text_file;

pub const TRUNCATION_NOTICE: &str = "\n\n[Preview truncated - file too large]";

pub struct TextPreview {
    max_chars: usize,
}

impl TextPreview {
    pub fn new() -> Self {
        TextPreview { max_chars: 100_000 }
    }

    pub fn with_limit(max_chars: usize) -> Self {
        TextPreview { max_chars }
    }

    /// Lossy UTF-8 decode, cut to `max_chars` with a notice when longer.
    pub fn clip(&self, body: &[u8]) -> String {
        let text = String::from_utf8_lossy(body);
        match text.char_indices().nth(self.max_chars) {
            Some((cut, _)) => format!("{}{}", &text[..cut], TRUNCATION_NOTICE),
            None => text.into_owned(),
        }
    }
}

impl Default for TextPreview {
    fn default() -> Self {
        Self::new()
    }
}

impl PreviewProvider for TextPreview {
    fn can_preview(&self, name: &str) -> bool {
        is_text_file(name)
    }

    fn generate_preview(&self, fetcher: &dyn PageFetcher, location: &Url) -> Result<PreviewContent> {
        // One extra char's worth of bytes so an over-long body is detectable.
        let body = fetcher.fetch_prefix(location, (self.max_chars + 1) * 4)?;
        Ok(PreviewContent::Text(self.clip(&body)))
    }
}
