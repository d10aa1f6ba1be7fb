// tests/controller.rs
use std::collections::HashMap;
use std::path::PathBuf;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tempfile::TempDir;
use url::Url;

use indexcrawler::app::{handle_key, App, AppCommand, InputMode};
use indexcrawler::config::{Settings, ViewMode};
use indexcrawler::listing::SortKey;
use indexcrawler::navigator::Navigator;
use indexcrawler::net::{HttpClient, PageFetcher};
use indexcrawler::{CrawlError, Result};

const ROOT: &str = "https://h.test/FILES/";

struct FakeSite(HashMap<String, String>);

impl PageFetcher for FakeSite {
    fn fetch(&self, location: &Url) -> Result<Vec<u8>> {
        self.0
            .get(location.as_str())
            .map(|body| body.clone().into_bytes())
            .ok_or_else(|| CrawlError::Status { url: location.to_string(), status: 404 })
    }
}

fn site() -> FakeSite {
    let mut pages = HashMap::new();
    pages.insert(
        ROOT.to_string(),
        r#"<html><head><title>Index of /FILES</title></head><body>
        <a href="iso/">iso/</a> <a href="notes.txt">notes.txt</a> <a href="index.html">index.html</a>
        </body></html>"#
            .to_string(),
    );
    pages.insert(format!("{}iso/", ROOT), r#"<a href="x.iso">x.iso</a>"#.to_string());
    pages.insert(format!("{}notes.txt", ROOT), "hello notes".to_string());
    pages.insert(
        format!("{}long/", ROOT),
        r#"<a href="release-candidate-2024%20final.iso">release-candidate-20..&gt;</a>"#.to_string(),
    );
    pages.insert(format!("{}blob/", ROOT), "\x7fELF\0\0\0".to_string());
    FakeSite(pages)
}

fn app(dir: &TempDir) -> (App, PathBuf) {
    let settings_path = dir.path().join("settings.json");
    let settings = Settings {
        base_url: ROOT.to_string(),
        bookmarks: Vec::new(),
        default_download_path: dir.path().join("downloads"),
        ..Settings::default()
    };
    let navigator = Navigator::new(Url::parse(ROOT).unwrap(), Box::new(site()));
    let client = HttpClient::for_downloads().unwrap();
    (App::new(navigator, settings, settings_path.clone(), client), settings_path)
}

fn select(app: &mut App, name: &str) {
    app.dispatch(AppCommand::SelectFirst);
    for _ in 0..app.navigator().visible_len() {
        if app.selected_entry().map(|e| e.name.as_str()) == Some(name) {
            return;
        }
        app.dispatch(AppCommand::MoveSelection(1));
    }
    panic!("{} is not listed", name);
}

fn location(app: &App) -> &str {
    app.navigator().location().map(|u| u.as_str()).unwrap_or_default()
}

#[test]
fn test_start_activate_and_history() {
    let dir = TempDir::new().unwrap();
    let (mut app, _) = app(&dir);
    app.start(None);
    assert_eq!(location(&app), ROOT);
    assert_eq!(app.status(), "Loaded 3 items");

    select(&mut app, "iso/");
    app.dispatch(AppCommand::Activate);
    assert_eq!(location(&app), "https://h.test/FILES/iso/");
    assert_eq!(app.selected(), 0);

    app.dispatch(AppCommand::Back);
    assert_eq!(location(&app), ROOT);
    assert!(app.navigator().history().can_go_forward());
    app.dispatch(AppCommand::Forward);
    assert_eq!(location(&app), "https://h.test/FILES/iso/");
    app.dispatch(AppCommand::Up);
    assert_eq!(location(&app), ROOT);
}

#[test]
fn test_activating_a_file_prompts_for_destination() {
    let dir = TempDir::new().unwrap();
    let (mut app, _) = app(&dir);
    app.start(None);
    select(&mut app, "notes.txt");
    app.dispatch(AppCommand::Activate);
    let expected = dir.path().join("downloads").join("notes.txt");
    assert_eq!(app.mode(), &InputMode::SaveAs(expected.display().to_string()));
    assert_eq!(location(&app), ROOT);
}

#[test]
fn test_failed_navigation_keeps_listing_and_warns() {
    let dir = TempDir::new().unwrap();
    let (mut app, _) = app(&dir);
    app.start(None);
    app.dispatch(AppCommand::Navigate("https://h.test/FILES/missing/".into()));
    assert_eq!(location(&app), ROOT);
    assert_eq!(app.navigator().visible_len(), 3);
    assert!(app.notice().is_some());
    app.dispatch(AppCommand::DismissNotice);
    assert!(app.notice().is_none());
}

#[test]
fn test_live_search_needs_two_characters() {
    let dir = TempDir::new().unwrap();
    let (mut app, _) = app(&dir);
    app.start(None);

    app.dispatch(AppCommand::Search("n".into()));
    assert_eq!(app.navigator().visible_len(), 3);
    app.dispatch(AppCommand::Search("NO".into()));
    assert_eq!(app.navigator().visible_len(), 1);
    assert_eq!(app.selected_entry().unwrap().name, "notes.txt");
    app.dispatch(AppCommand::Search("zzz".into()));
    assert_eq!(app.status(), "No matching files found");
    app.dispatch(AppCommand::Search(String::new()));
    assert_eq!(app.navigator().visible_len(), 3);
}

#[test]
fn test_sort_and_view_changes_are_saved() {
    let dir = TempDir::new().unwrap();
    let (mut app, path) = app(&dir);
    app.start(None);

    select(&mut app, "notes.txt");
    app.dispatch(AppCommand::SetSortKey(SortKey::Type));
    assert_eq!(app.selected_entry().unwrap().name, "notes.txt");
    app.dispatch(AppCommand::ToggleSortOrder);
    app.dispatch(AppCommand::SetViewMode(ViewMode::Details));

    let saved = Settings::try_load(&path).unwrap();
    assert_eq!(saved.sort.key, SortKey::Type);
    assert!(!saved.sort.ascending);
    assert_eq!(saved.view_mode, ViewMode::Details);
    let names: Vec<_> = app.navigator().visible().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["notes.txt", "iso/", "index.html"]);
}

#[test]
fn test_bookmark_becomes_home() {
    let dir = TempDir::new().unwrap();
    let (mut app, path) = app(&dir);
    app.start(Some("https://h.test/FILES/iso/"));
    app.dispatch(AppCommand::AddBookmark("Images".into()));
    assert_eq!(app.settings().start_page(), Some("https://h.test/FILES/iso/"));

    app.dispatch(AppCommand::Navigate(ROOT.into()));
    app.dispatch(AppCommand::Home);
    assert_eq!(location(&app), "https://h.test/FILES/iso/");

    let saved = Settings::try_load(&path).unwrap();
    assert_eq!(saved.bookmarks.len(), 1);
    assert_eq!(saved.bookmarks[0].title, "Images");
}

#[test]
fn test_text_preview_and_surf_mode() {
    let dir = TempDir::new().unwrap();
    let (mut app, _) = app(&dir);
    app.start(None);

    select(&mut app, "notes.txt");
    assert!(app.preview().is_none());
    app.dispatch(AppCommand::ToggleTextPreview);
    assert_eq!(app.preview(), Some("hello notes"));

    app.dispatch(AppCommand::ToggleSurf);
    assert!(app.navigator().is_surfing());
    let page = app.navigator().page().unwrap();
    assert_eq!(page.title.as_deref(), Some("Index of /FILES"));
    app.dispatch(AppCommand::Search("notes".into()));
    assert_eq!(app.page_matches().len(), 1);
}

#[test]
fn test_download_without_selection_is_refused() {
    let dir = TempDir::new().unwrap();
    let (mut app, _) = app(&dir);
    app.start(None);
    select(&mut app, "iso/");
    app.dispatch(AppCommand::DownloadSelected);
    assert_eq!(app.status(), "No files selected");
    assert!(!app.is_downloading());

    app.dispatch(AppCommand::ToggleMark);
    assert_eq!(app.status(), "Only files can be marked for download");
}

#[test]
fn test_truncated_names_download_under_their_href() {
    let dir = TempDir::new().unwrap();
    let (mut app, _) = app(&dir);
    app.start(Some("https://h.test/FILES/long/"));
    select(&mut app, "release-candidate-20..>");
    let expected = dir.path().join("downloads").join("release-candidate-2024 final.iso");

    handle_key(&mut app, KeyEvent::new(KeyCode::Char('D'), KeyModifiers::NONE));
    assert_eq!(app.mode(), &InputMode::SaveAs(expected.display().to_string()));

    handle_key(&mut app, KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE));
    assert_eq!(app.mode(), &InputMode::Normal);
    app.dispatch(AppCommand::Activate);
    assert_eq!(app.mode(), &InputMode::SaveAs(expected.display().to_string()));

    let entry = app.selected_entry().unwrap().clone();
    let (url, path) = app.download_target(&entry).unwrap();
    assert_eq!(url.as_str(), "https://h.test/FILES/long/release-candidate-2024%20final.iso");
    assert_eq!(path, expected);
}

#[test]
fn test_binary_page_shows_empty_listing_with_error() {
    let dir = TempDir::new().unwrap();
    let (mut app, _) = app(&dir);
    app.start(None);
    app.dispatch(AppCommand::Navigate("https://h.test/FILES/blob/".into()));

    assert_eq!(location(&app), "https://h.test/FILES/blob/");
    assert_eq!(app.navigator().visible_len(), 0);
    assert!(app.status().starts_with("Error"));
    assert!(app.navigator().history().can_go_back());
    app.dispatch(AppCommand::Back);
    assert_eq!(location(&app), ROOT);
}
