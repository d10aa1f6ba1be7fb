// src/config.rs
use std::fs;
use std::path::{Path, PathBuf};

use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::{CrawlError, Result};
use crate::listing::SortSpec;

const SETTINGS_ENV_PATH: &str = "INDEXCRAWLER_SETTINGS_PATH";
pub const DEFAULT_BASE_URL: &str = "https://glitchlinux.wtf/FILES/";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    Details,
    #[default]
    List,
    Icons,
}

impl ViewMode {
    pub fn label(self) -> &'static str {
        match self {
            ViewMode::Details => "Details",
            ViewMode::List => "List",
            ViewMode::Icons => "Icons",
        }
    }

    pub fn next(self) -> Self {
        match self {
            ViewMode::Details => ViewMode::List,
            ViewMode::List => ViewMode::Icons,
            ViewMode::Icons => ViewMode::Details,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bookmark {
    pub title: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub base_url: String,
    pub view_mode: ViewMode,
    pub sort: SortSpec,
    pub show_tree: bool,
    pub show_info: bool,
    pub show_statusbar: bool,
    pub show_text_preview: bool,
    pub surf_mode: bool,
    pub default_download_path: PathBuf,
    pub bookmarks: Vec<Bookmark>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            base_url: DEFAULT_BASE_URL.to_string(),
            view_mode: ViewMode::List,
            sort: SortSpec::default(),
            show_tree: true,
            show_info: true,
            show_statusbar: true,
            show_text_preview: false,
            surf_mode: false,
            default_download_path: default_download_dir(),
            bookmarks: Vec::new(),
        }
    }
}

pub fn default_download_dir() -> PathBuf {
    dirs::download_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join("Downloads")))
        .unwrap_or_else(|| PathBuf::from("Downloads"))
}

pub fn settings_file_path() -> PathBuf {
    if let Some(path) = std::env::var_os(SETTINGS_ENV_PATH) {
        let path = PathBuf::from(path);
        if !path.as_os_str().is_empty() {
            return path;
        }
    }

    match dirs::config_dir() {
        Some(dir) => dir.join("indexcrawler").join("settings.json"),
        None => std::env::temp_dir().join("indexcrawler.settings.json"),
    }
}

impl Settings {
    /// Reads settings, falling back to defaults when the file is missing or broken.
    pub fn load(path: &Path) -> Self {
        match Self::try_load(path) {
            Ok(settings) => settings,
            Err(e) => {
                warn!("ignoring settings at {}: {}", path.display(), e);
                Settings::default()
            }
        }
    }

    pub fn try_load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Settings::default());
        }
        let content = fs::read_to_string(path).map_err(|e| CrawlError::filesystem(path, e))?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| CrawlError::filesystem(parent, e))?;
            }
        }
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content).map_err(|e| CrawlError::filesystem(path, e))
    }

    /// The first bookmark doubles as the start page.
    pub fn start_page(&self) -> Option<&str> {
        self.bookmarks.first().map(|b| b.url.as_str())
    }

    /// Adds a bookmark, or renames the existing one for the same URL.
    /// Returns `true` when a new bookmark was created.
    pub fn add_bookmark(&mut self, title: &str, url: &str) -> bool {
        if let Some(existing) = self.bookmarks.iter_mut().find(|b| b.url == url) {
            existing.title = title.to_string();
            return false;
        }
        self.bookmarks.push(Bookmark { title: title.to_string(), url: url.to_string() });
        true
    }

    pub fn remove_bookmark(&mut self, index: usize) -> Option<Bookmark> {
        (index < self.bookmarks.len()).then(|| self.bookmarks.remove(index))
    }

    pub fn rename_bookmark(&mut self, index: usize, title: &str) -> bool {
        match self.bookmarks.get_mut(index) {
            Some(bookmark) if !title.is_empty() => {
                bookmark.title = title.to_string();
                true
            }
            _ => false,
        }
    }

    /// Swaps a bookmark with its upper neighbour. Returns its new index.
    pub fn move_bookmark_up(&mut self, index: usize) -> Option<usize> {
        if index == 0 || index >= self.bookmarks.len() {
            return None;
        }
        self.bookmarks.swap(index, index - 1);
        Some(index - 1)
    }

    pub fn move_bookmark_down(&mut self, index: usize) -> Option<usize> {
        if index + 1 >= self.bookmarks.len() {
            return None;
        }
        self.bookmarks.swap(index, index + 1);
        Some(index + 1)
    }
}
