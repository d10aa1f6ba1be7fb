// src/app/mod.rs
//! Terminal front end.
//!
//! All state lives in [`App`]. Key presses are translated into [`AppCommand`]s by
//! `input`, and every state change goes through [`App::dispatch`]. Download
//! workers report back over a channel drained by [`App::tick`].

mod input;
mod render;

pub use input::handle_key;
pub use render::draw;

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender};

use log::{error, info, warn};
use url::Url;

use crate::config::{Settings, ViewMode};
use crate::error::CrawlError;
use crate::listing::{Entry, SortKey, SortSpec};
use crate::navigator::location::file_name;
use crate::navigator::{parse_location, Activation, Navigator};
use crate::net::{spawn_batch, DownloadEvent, DownloadHandle, DownloadJob, HttpClient};
use crate::preview::{find_matches, PreviewContent, PreviewManager};
use crate::utils::{format_download_event, open_folder};

/// Live search kicks in from this many characters (or when cleared).
pub const MIN_SEARCH_CHARS: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Location(String),
    Search(String),
    SaveAs(String),
    BookmarkTitle(String),
    RenameBookmark(usize, String),
    Bookmarks(usize),
    Help,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    Quit,
    MoveSelection(isize),
    SelectFirst,
    SelectLast,
    Activate,
    Navigate(String),
    Back,
    Forward,
    Up,
    Home,
    Refresh,
    SetSortKey(SortKey),
    CycleSortKey,
    ToggleSortOrder,
    SetViewMode(ViewMode),
    CycleViewMode,
    Search(String),
    NextMatch,
    PrevMatch,
    ToggleMark,
    DownloadSelected,
    DownloadTo(PathBuf),
    CancelDownload,
    OpenDownloadFolder,
    ToggleSurf,
    ToggleTree,
    ToggleInfo,
    ToggleStatusbar,
    ToggleTextPreview,
    AddBookmark(String),
    OpenBookmark(usize),
    RemoveBookmark(usize),
    MoveBookmarkUp(usize),
    MoveBookmarkDown(usize),
    RenameBookmark(usize, String),
    ScrollPage(isize),
    DismissNotice,
}

pub struct App {
    navigator: Navigator,
    settings: Settings,
    settings_path: PathBuf,
    download_client: HttpClient,
    previews: PreviewManager,
    mode: InputMode,
    selected: usize,
    marked: HashSet<String>,
    status: String,
    notice: Option<String>,
    preview: Option<String>,
    page_scroll: usize,
    page_matches: Vec<(usize, usize)>,
    match_cursor: usize,
    download: Option<DownloadHandle>,
    download_progress: Option<u8>,
    events_tx: Sender<DownloadEvent>,
    events_rx: Receiver<DownloadEvent>,
    should_quit: bool,
}

impl App {
    pub fn new(
        mut navigator: Navigator,
        settings: Settings,
        settings_path: PathBuf,
        download_client: HttpClient,
    ) -> Self {
        navigator.set_surf(settings.surf_mode);
        navigator.set_sort(settings.sort);
        let (events_tx, events_rx) = mpsc::channel();

        App {
            navigator,
            settings,
            settings_path,
            download_client,
            previews: PreviewManager::new(),
            mode: InputMode::Normal,
            selected: 0,
            marked: HashSet::new(),
            status: String::from("Ready"),
            notice: None,
            preview: None,
            page_scroll: 0,
            page_matches: Vec::new(),
            match_cursor: 0,
            download: None,
            download_progress: None,
            events_tx,
            events_rx,
            should_quit: false,
        }
    }

    /// Loads `location`, else the start page, else the root.
    pub fn start(&mut self, location: Option<&str>) {
        let target = location
            .map(str::to_string)
            .or_else(|| self.settings.start_page().map(str::to_string))
            .unwrap_or_else(|| self.navigator.root().to_string());
        self.dispatch(AppCommand::Navigate(target));
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn mode(&self) -> &InputMode {
        &self.mode
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn preview(&self) -> Option<&str> {
        self.preview.as_deref()
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn selected_entry(&self) -> Option<&Entry> {
        self.navigator.visible_entry(self.selected)
    }

    pub fn is_marked(&self, entry: &Entry) -> bool {
        self.marked.contains(&entry.href)
    }

    pub fn is_downloading(&self) -> bool {
        self.download.is_some()
    }

    pub fn page_matches(&self) -> &[(usize, usize)] {
        &self.page_matches
    }

    pub fn dispatch(&mut self, command: AppCommand) {
        match command {
            AppCommand::Quit => {
                if let Some(download) = &self.download {
                    download.cancel();
                }
                self.persist();
                self.should_quit = true;
            }
            AppCommand::MoveSelection(delta) => self.move_selection(delta),
            AppCommand::SelectFirst => self.select(0),
            AppCommand::SelectLast => self.select(self.navigator.visible_len().saturating_sub(1)),
            AppCommand::Activate => self.activate(),
            AppCommand::Navigate(input) => {
                let result = parse_location(&input).and_then(|url| self.navigator.navigate_to(url));
                self.after_load(result);
            }
            AppCommand::Back => {
                let result = self.navigator.back().map(|moved| moved.map(|_| 0));
                self.after_move(result);
            }
            AppCommand::Forward => {
                let result = self.navigator.forward().map(|moved| moved.map(|_| 0));
                self.after_move(result);
            }
            AppCommand::Up => {
                let result = self.navigator.up().map(|moved| moved.map(|_| 0));
                self.after_move(result);
            }
            AppCommand::Home => {
                let start = self.settings.start_page().map(str::to_string);
                let result = self.navigator.home(start.as_deref()).map(|moved| moved.map(|_| 0));
                self.after_move(result);
            }
            AppCommand::Refresh => {
                let result = self.navigator.refresh();
                self.after_load(result);
            }
            AppCommand::SetSortKey(key) => self.apply_sort(SortSpec { key, ..self.settings.sort }),
            AppCommand::CycleSortKey => {
                self.apply_sort(SortSpec { key: self.settings.sort.key.next(), ..self.settings.sort })
            }
            AppCommand::ToggleSortOrder => self.apply_sort(self.settings.sort.toggled()),
            AppCommand::SetViewMode(mode) => self.set_view_mode(mode),
            AppCommand::CycleViewMode => self.set_view_mode(self.settings.view_mode.next()),
            AppCommand::Search(query) => self.search(&query),
            AppCommand::NextMatch => self.step_match(1),
            AppCommand::PrevMatch => self.step_match(-1),
            AppCommand::ToggleMark => self.toggle_mark(),
            AppCommand::DownloadSelected => self.download_selected(),
            AppCommand::DownloadTo(path) => self.download_to(path),
            AppCommand::CancelDownload => match &self.download {
                Some(download) => {
                    download.cancel();
                    self.status = String::from("Cancelling download...");
                }
                None => self.status = String::from("No download running"),
            },
            AppCommand::OpenDownloadFolder => {
                let path = self.settings.default_download_path.clone();
                self.status = match open_folder(&path) {
                    Ok(()) => format!("Opened {}", path.display()),
                    Err(e) => e,
                };
            }
            AppCommand::ToggleSurf => self.toggle_surf(),
            AppCommand::ToggleTree => {
                self.settings.show_tree = !self.settings.show_tree;
                self.persist();
            }
            AppCommand::ToggleInfo => {
                self.settings.show_info = !self.settings.show_info;
                self.persist();
            }
            AppCommand::ToggleStatusbar => {
                self.settings.show_statusbar = !self.settings.show_statusbar;
                self.persist();
            }
            AppCommand::ToggleTextPreview => {
                self.settings.show_text_preview = !self.settings.show_text_preview;
                self.persist();
                self.refresh_preview();
            }
            AppCommand::AddBookmark(title) => self.add_bookmark(&title),
            AppCommand::OpenBookmark(index) => {
                if let Some(bookmark) = self.settings.bookmarks.get(index) {
                    let url = bookmark.url.clone();
                    self.mode = InputMode::Normal;
                    self.dispatch(AppCommand::Navigate(url));
                }
            }
            AppCommand::RemoveBookmark(index) => {
                if let Some(removed) = self.settings.remove_bookmark(index) {
                    self.status = format!("Removed bookmark: {}", removed.title);
                    self.persist();
                }
            }
            AppCommand::MoveBookmarkUp(index) => {
                if let Some(moved) = self.settings.move_bookmark_up(index) {
                    self.mode = InputMode::Bookmarks(moved);
                    self.persist();
                }
            }
            AppCommand::MoveBookmarkDown(index) => {
                if let Some(moved) = self.settings.move_bookmark_down(index) {
                    self.mode = InputMode::Bookmarks(moved);
                    self.persist();
                }
            }
            AppCommand::RenameBookmark(index, title) => {
                if self.settings.rename_bookmark(index, &title) {
                    self.persist();
                }
            }
            AppCommand::ScrollPage(delta) => {
                let lines = self.navigator.page().map(|p| p.lines.len()).unwrap_or(0);
                self.page_scroll = offset(self.page_scroll, delta, lines);
            }
            AppCommand::DismissNotice => self.notice = None,
        }
    }

    /// Cancels a running download and waits for its worker, so no partial
    /// file outlives the process.
    pub fn shutdown(&mut self) {
        if let Some(download) = self.download.take() {
            download.cancel();
            download.join();
            info!("download worker stopped");
        }
        self.download_progress = None;
    }

    /// Drains progress messages from the download worker.
    pub fn tick(&mut self) {
        while let Ok(event) = self.events_rx.try_recv() {
            self.status = format_download_event(&event);
            match event {
                DownloadEvent::Started { .. } => self.download_progress = Some(0),
                DownloadEvent::Progress { percent, .. } => self.download_progress = Some(percent),
                DownloadEvent::Finished { .. } => self.download_progress = None,
                DownloadEvent::Failed { .. } => {
                    self.download_progress = None;
                    self.notice = Some(self.status.clone());
                }
                DownloadEvent::BatchDone { .. } => {
                    self.download_progress = None;
                    if let Some(download) = self.download.take() {
                        download.join();
                    }
                }
            }
        }
    }

    fn report(&mut self, err: CrawlError) {
        warn!("{}", err);
        match err {
            CrawlError::Parse(_) => self.status = format!("Error: {}", err),
            err if err.is_network() => {
                self.status = format!("Error: {}", err);
                self.notice = Some(format!("Failed to load:\n{}", err));
            }
            err => {
                self.status = format!("Error: {}", err);
                self.notice = Some(err.to_string());
            }
        }
    }

    fn after_load(&mut self, result: crate::Result<usize>) {
        match result {
            Ok(count) => {
                self.reset_view();
                self.status = if self.navigator.is_surfing() {
                    let title = self.navigator.page().and_then(|p| p.title.clone());
                    format!("Loaded page{}", title.map(|t| format!(": {}", t)).unwrap_or_default())
                } else {
                    format!("Loaded {} items", count)
                };
            }
            Err(err) => {
                if matches!(err, CrawlError::Parse(_)) {
                    self.reset_view();
                }
                self.report(err);
            }
        }
    }

    fn after_move(&mut self, result: crate::Result<Option<usize>>) {
        match result {
            Ok(Some(_)) => {
                let count = self.navigator.visible_len();
                self.after_load(Ok(count));
            }
            Ok(None) => {}
            Err(err) => self.after_load(Err(err)),
        }
    }

    fn reset_view(&mut self) {
        self.navigator.set_filter("");
        self.selected = 0;
        self.marked.clear();
        self.page_scroll = 0;
        self.page_matches.clear();
        self.match_cursor = 0;
        self.refresh_preview();
    }

    fn select(&mut self, index: usize) {
        let len = self.navigator.visible_len();
        let index = if len == 0 { 0 } else { index.min(len - 1) };
        if index != self.selected {
            self.selected = index;
            self.refresh_preview();
        }
    }

    fn move_selection(&mut self, delta: isize) {
        if self.navigator.is_surfing() {
            self.dispatch(AppCommand::ScrollPage(delta));
            return;
        }
        let len = self.navigator.visible_len();
        self.select(offset(self.selected, delta, len));
    }

    fn activate(&mut self) {
        if self.navigator.is_surfing() {
            return;
        }
        match self.navigator.activate(self.selected) {
            Ok(Some(Activation::Navigated(_))) => {
                let count = self.navigator.visible_len();
                self.after_load(Ok(count));
            }
            Ok(Some(Activation::Download(url))) => {
                let target = self.download_path(&url);
                self.mode = InputMode::SaveAs(target.display().to_string());
            }
            Ok(None) => {}
            Err(err) => self.after_load(Err(err)),
        }
    }

    fn apply_sort(&mut self, spec: SortSpec) {
        let current = self.selected_entry().map(|e| e.href.clone());
        self.settings.sort = spec;
        self.navigator.set_sort(spec);
        if let Some(href) = current {
            if let Some(index) = self.navigator.visible().position(|e| e.href == href) {
                self.selected = index;
            }
        }
        self.status = format!("Sorted by {} {}", spec.key.label(), spec.arrow());
        self.persist();
    }

    fn set_view_mode(&mut self, mode: ViewMode) {
        self.settings.view_mode = mode;
        self.navigator.set_sort(self.settings.sort);
        self.status = format!("{} view", mode.label());
        self.persist();
    }

    fn search(&mut self, query: &str) {
        if self.navigator.is_surfing() {
            let lines = self.navigator.page().map(|p| p.lines.as_slice()).unwrap_or(&[]);
            self.page_matches = find_matches(lines, query);
            self.match_cursor = 0;
            self.status = if query.is_empty() {
                String::new()
            } else if self.page_matches.is_empty() {
                String::from("No matches found")
            } else {
                format!("Found {} matches", self.page_matches.len())
            };
            if let Some(&(line, _)) = self.page_matches.first() {
                self.page_scroll = line;
            }
            return;
        }

        let query = query.trim();
        if !query.is_empty() && query.chars().count() < MIN_SEARCH_CHARS {
            return;
        }
        self.navigator.set_filter(query);
        self.selected = 0;
        self.refresh_preview();
        let found = self.navigator.visible_len();
        self.status = if query.is_empty() {
            format!("{} items", found)
        } else if found == 0 {
            String::from("No matching files found")
        } else {
            format!("Found {} matching files", found)
        };
    }

    fn step_match(&mut self, step: isize) {
        if self.navigator.is_surfing() {
            if self.page_matches.is_empty() {
                return;
            }
            let len = self.page_matches.len() as isize;
            self.match_cursor = (self.match_cursor as isize + step).rem_euclid(len) as usize;
            self.page_scroll = self.page_matches[self.match_cursor].0;
            self.status = format!("Match {}/{}", self.match_cursor + 1, len);
        } else {
            let len = self.navigator.visible_len() as isize;
            if len == 0 {
                return;
            }
            let next = (self.selected as isize + step).rem_euclid(len) as usize;
            self.select(next);
        }
    }

    fn toggle_mark(&mut self) {
        let Some(entry) = self.selected_entry() else {
            return;
        };
        if !entry.is_file() {
            self.status = String::from("Only files can be marked for download");
            return;
        }
        let href = entry.href.clone();
        if !self.marked.remove(&href) {
            self.marked.insert(href);
        }
        self.status = format!("{} file(s) marked", self.marked.len());
        self.move_selection(1);
    }

    /// Files to fetch: the marked ones, else the selected file.
    pub fn download_candidates(&self) -> Vec<&Entry> {
        let marked: Vec<&Entry> = self
            .navigator
            .visible()
            .filter(|e| e.is_file() && self.marked.contains(&e.href))
            .collect();
        if !marked.is_empty() {
            return marked;
        }
        self.selected_entry().filter(|e| e.is_file()).into_iter().collect()
    }

    /// Where a file lands by default. The name comes from the href, since
    /// listing text may be truncated.
    pub fn download_target(&self, entry: &Entry) -> crate::Result<(Url, PathBuf)> {
        let url = self.navigator.resolve_entry(entry)?;
        let path = self.download_path(&url);
        Ok((url, path))
    }

    fn download_path(&self, url: &Url) -> PathBuf {
        let name = file_name(url).unwrap_or_else(|| String::from("download"));
        self.settings.default_download_path.join(name)
    }

    fn download_selected(&mut self) {
        let mut jobs = Vec::new();
        for entry in self.download_candidates() {
            match self.download_target(entry) {
                Ok((url, path)) => jobs.push(DownloadJob::new(url, path)),
                Err(err) => error!("skipping {}: {}", entry.name, err),
            }
        }
        if jobs.is_empty() {
            self.status = String::from("No files selected");
            return;
        }
        self.start_jobs(jobs);
    }

    fn download_to(&mut self, path: PathBuf) {
        self.mode = InputMode::Normal;
        let Some(entry) = self.selected_entry().filter(|e| e.is_file()) else {
            self.status = String::from("Select a file to download");
            return;
        };
        match self.navigator.resolve_entry(entry) {
            Ok(url) => self.start_jobs(vec![DownloadJob::new(url, path)]),
            Err(err) => self.report(err),
        }
    }

    fn start_jobs(&mut self, jobs: Vec<DownloadJob>) {
        if self.download.is_some() {
            self.status = String::from("A download is already running");
            return;
        }
        self.status = format!("Queued {} download(s)", jobs.len());
        self.download_progress = Some(0);
        self.download = Some(spawn_batch(self.download_client.clone(), jobs, self.events_tx.clone()));
        self.marked.clear();
    }

    fn toggle_surf(&mut self) {
        let surf = !self.settings.surf_mode;
        self.settings.surf_mode = surf;
        self.navigator.set_surf(surf);
        self.persist();
        let result = self.navigator.refresh();
        self.after_load(result);
        let mode = if surf { "Web browser mode - text rendering" } else { "File manager mode" };
        self.status = format!("{} | {}", mode, self.status);
    }

    fn add_bookmark(&mut self, title: &str) {
        self.mode = InputMode::Normal;
        let Some(location) = self.navigator.location().map(Url::to_string) else {
            return;
        };
        let title = if title.trim().is_empty() { location.clone() } else { title.trim().to_string() };
        self.status = if self.settings.add_bookmark(&title, &location) {
            format!("Added bookmark: {}", title)
        } else {
            format!("Updated bookmark: {}", title)
        };
        self.persist();
    }

    /// Default title offered when bookmarking the current location.
    pub fn bookmark_title_hint(&self) -> String {
        self.navigator
            .page()
            .and_then(|p| p.title.clone())
            .or_else(|| self.navigator.location().map(Url::to_string))
            .unwrap_or_default()
    }

    fn refresh_preview(&mut self) {
        self.preview = None;
        if !self.settings.show_text_preview {
            return;
        }
        let Some(entry) = self.selected_entry().filter(|e| e.is_file()) else {
            return;
        };
        if !self.previews.can_preview(&entry.name) {
            return;
        }
        let name = entry.name.clone();
        let url = match self.navigator.resolve_entry(entry) {
            Ok(url) => url,
            Err(err) => {
                self.preview = Some(format!("Error loading text file: {}", err));
                return;
            }
        };
        self.preview = match self.previews.get_preview(self.navigator.fetcher(), &name, &url) {
            Some(Ok(PreviewContent::Text(text))) => Some(text),
            Some(Ok(PreviewContent::Page(page))) => Some(page.text()),
            Some(Err(err)) => Some(format!("Error loading text file: {}", err)),
            None => None,
        };
    }

    fn persist(&mut self) {
        if let Err(e) = self.settings.save(&self.settings_path) {
            warn!("could not save settings: {}", e);
            self.status = format!("Could not save settings: {}", e);
        }
    }
}

fn offset(current: usize, delta: isize, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    let next = current as isize + delta;
    next.clamp(0, len as isize - 1) as usize
}
