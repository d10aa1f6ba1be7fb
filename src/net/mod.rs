// src/net/mod.rs
pub mod download;

pub use download::{spawn_batch, CancelFlag, DownloadEvent, DownloadHandle, DownloadJob};

use std::io::Read;
use std::time::Duration;

use log::{debug, info};
use reqwest::blocking::{Client, Response};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, USER_AGENT};
use url::Url;

use crate::error::{CrawlError, Result};

pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Source of listing and page bodies.
pub trait PageFetcher {
    fn fetch(&self, location: &Url) -> Result<Vec<u8>>;

    /// At most `limit` bytes of the body.
    fn fetch_prefix(&self, location: &Url, limit: usize) -> Result<Vec<u8>> {
        let mut body = self.fetch(location)?;
        body.truncate(limit);
        Ok(body)
    }
}

#[derive(Clone)]
pub struct HttpClient {
    client: Client,
}

fn browser_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));
    headers
}

impl HttpClient {
    /// Client for listings and pages; the whole exchange is bounded by `FETCH_TIMEOUT`.
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .default_headers(browser_headers())
            .timeout(FETCH_TIMEOUT)
            .build()?;
        Ok(HttpClient { client })
    }

    /// Client for downloads: bounded connect, unbounded transfer.
    pub fn for_downloads() -> Result<Self> {
        let client = Client::builder()
            .default_headers(browser_headers())
            .connect_timeout(FETCH_TIMEOUT)
            .timeout(None)
            .build()?;
        Ok(HttpClient { client })
    }

    /// Sends a GET and fails on any non-success status.
    pub fn open(&self, location: &Url) -> Result<Response> {
        debug!("GET {}", location);
        let response = self.client.get(location.clone()).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(CrawlError::Status { url: location.to_string(), status: status.as_u16() });
        }
        Ok(response)
    }
}

impl PageFetcher for HttpClient {
    fn fetch(&self, location: &Url) -> Result<Vec<u8>> {
        let body = self.open(location)?.bytes()?;
        info!("fetched {} ({} bytes)", location, body.len());
        Ok(body.to_vec())
    }

    fn fetch_prefix(&self, location: &Url, limit: usize) -> Result<Vec<u8>> {
        let response = self.open(location)?;
        let mut body = Vec::new();
        response
            .take(limit as u64)
            .read_to_end(&mut body)
            .map_err(|source| CrawlError::Interrupted { url: location.to_string(), source })?;
        Ok(body)
    }
}
