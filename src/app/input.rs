// src/app/input.rs
use std::path::PathBuf;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use super::{App, AppCommand, InputMode};
use crate::listing::SortKey;

/// Routes a key press according to the current input mode.
pub fn handle_key(app: &mut App, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.dispatch(AppCommand::Quit);
        return;
    }
    if app.notice.is_some() {
        app.dispatch(AppCommand::DismissNotice);
        return;
    }

    let mode = std::mem::replace(&mut app.mode, InputMode::Normal);
    match mode {
        InputMode::Normal => {
            if let Some(command) = normal_command(app, key) {
                app.dispatch(command);
            }
        }
        InputMode::Help => {}
        InputMode::Bookmarks(index) => bookmarks_key(app, index, key),
        InputMode::Search(query) => {
            let live = matches!(key.code, KeyCode::Char(_) | KeyCode::Backspace);
            match edit_line(query, key) {
                LineEdit::Editing(query) => {
                    if live {
                        app.dispatch(AppCommand::Search(query.clone()));
                    }
                    app.mode = InputMode::Search(query);
                }
                LineEdit::Submitted(query) => app.dispatch(AppCommand::Search(query)),
                LineEdit::Cancelled => app.dispatch(AppCommand::Search(String::new())),
            }
        }
        InputMode::Location(text) => match edit_line(text, key) {
            LineEdit::Editing(text) => app.mode = InputMode::Location(text),
            LineEdit::Submitted(text) if !text.trim().is_empty() => app.dispatch(AppCommand::Navigate(text)),
            _ => {}
        },
        InputMode::SaveAs(text) => match edit_line(text, key) {
            LineEdit::Editing(text) => app.mode = InputMode::SaveAs(text),
            LineEdit::Submitted(text) if !text.trim().is_empty() => {
                app.dispatch(AppCommand::DownloadTo(PathBuf::from(text.trim())))
            }
            _ => app.status = String::from("Download cancelled"),
        },
        InputMode::BookmarkTitle(text) => match edit_line(text, key) {
            LineEdit::Editing(text) => app.mode = InputMode::BookmarkTitle(text),
            LineEdit::Submitted(text) => app.dispatch(AppCommand::AddBookmark(text)),
            LineEdit::Cancelled => {}
        },
        InputMode::RenameBookmark(index, text) => match edit_line(text, key) {
            LineEdit::Editing(text) => app.mode = InputMode::RenameBookmark(index, text),
            LineEdit::Submitted(text) => {
                app.dispatch(AppCommand::RenameBookmark(index, text));
                app.mode = InputMode::Bookmarks(index);
            }
            LineEdit::Cancelled => app.mode = InputMode::Bookmarks(index),
        },
    }
}

fn normal_command(app: &mut App, key: KeyEvent) -> Option<AppCommand> {
    let alt = key.modifiers.contains(KeyModifiers::ALT);
    let command = match key.code {
        KeyCode::Char('q') => AppCommand::Quit,
        KeyCode::Left if alt => AppCommand::Back,
        KeyCode::Right if alt => AppCommand::Forward,
        KeyCode::Up | KeyCode::Char('k') => AppCommand::MoveSelection(-1),
        KeyCode::Down | KeyCode::Char('j') => AppCommand::MoveSelection(1),
        KeyCode::PageUp => AppCommand::MoveSelection(-10),
        KeyCode::PageDown => AppCommand::MoveSelection(10),
        KeyCode::Home | KeyCode::Char('g') => AppCommand::SelectFirst,
        KeyCode::End | KeyCode::Char('G') => AppCommand::SelectLast,
        KeyCode::Enter | KeyCode::Right | KeyCode::Char('l') => AppCommand::Activate,
        KeyCode::Backspace | KeyCode::Char('b') => AppCommand::Back,
        KeyCode::Char('f') => AppCommand::Forward,
        KeyCode::Left | KeyCode::Char('h') | KeyCode::Char('u') => AppCommand::Up,
        KeyCode::Char('~') => AppCommand::Home,
        KeyCode::F(5) | KeyCode::Char('r') => AppCommand::Refresh,
        KeyCode::Char('1') => AppCommand::SetSortKey(SortKey::Name),
        KeyCode::Char('2') => AppCommand::SetSortKey(SortKey::Size),
        KeyCode::Char('3') => AppCommand::SetSortKey(SortKey::Type),
        KeyCode::Char('4') => AppCommand::SetSortKey(SortKey::Modified),
        KeyCode::Char('s') => AppCommand::CycleSortKey,
        KeyCode::Char('S') => AppCommand::ToggleSortOrder,
        KeyCode::Char('v') => AppCommand::CycleViewMode,
        KeyCode::Char('n') => AppCommand::NextMatch,
        KeyCode::Char('N') => AppCommand::PrevMatch,
        KeyCode::Char(' ') => AppCommand::ToggleMark,
        KeyCode::Char('d') => AppCommand::DownloadSelected,
        KeyCode::Char('x') => AppCommand::CancelDownload,
        KeyCode::Char('O') => AppCommand::OpenDownloadFolder,
        KeyCode::Char('w') => AppCommand::ToggleSurf,
        KeyCode::Char('t') => AppCommand::ToggleTree,
        KeyCode::Char('i') => AppCommand::ToggleInfo,
        KeyCode::Char('I') => AppCommand::ToggleStatusbar,
        KeyCode::Char('p') => AppCommand::ToggleTextPreview,
        KeyCode::Esc => AppCommand::Search(String::new()),
        KeyCode::Char('/') => {
            app.mode = InputMode::Search(app.navigator.filter().to_string());
            return None;
        }
        KeyCode::Char('o') | KeyCode::Char(':') => {
            let current = app.navigator.location().map(|u| u.to_string()).unwrap_or_default();
            app.mode = InputMode::Location(current);
            return None;
        }
        KeyCode::Char('D') => {
            let target = app.selected_entry().filter(|e| e.is_file()).map(|e| app.download_target(e));
            match target {
                Some(Ok((_, path))) => app.mode = InputMode::SaveAs(path.display().to_string()),
                Some(Err(err)) => app.report(err),
                None => app.status = String::from("Select a file to download"),
            }
            return None;
        }
        KeyCode::Char('m') => {
            app.mode = InputMode::BookmarkTitle(app.bookmark_title_hint());
            return None;
        }
        KeyCode::Char('B') => {
            app.mode = InputMode::Bookmarks(0);
            return None;
        }
        KeyCode::Char('?') => {
            app.mode = InputMode::Help;
            return None;
        }
        _ => return None,
    };
    Some(command)
}

fn bookmarks_key(app: &mut App, index: usize, key: KeyEvent) {
    let count = app.settings.bookmarks.len();
    let last = count.saturating_sub(1);
    app.mode = InputMode::Bookmarks(index.min(last));
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('B') => app.mode = InputMode::Normal,
        KeyCode::Up | KeyCode::Char('k') => app.mode = InputMode::Bookmarks(index.saturating_sub(1)),
        KeyCode::Down | KeyCode::Char('j') => app.mode = InputMode::Bookmarks((index + 1).min(last)),
        KeyCode::Enter if count > 0 => app.dispatch(AppCommand::OpenBookmark(index)),
        KeyCode::Char('d') | KeyCode::Delete if count > 0 => {
            app.dispatch(AppCommand::RemoveBookmark(index));
            app.mode = InputMode::Bookmarks(index.min(count.saturating_sub(2)));
        }
        KeyCode::Char('K') if count > 0 => app.dispatch(AppCommand::MoveBookmarkUp(index)),
        KeyCode::Char('J') if count > 0 => app.dispatch(AppCommand::MoveBookmarkDown(index)),
        KeyCode::Char('e') if count > 0 => {
            let title = app.settings.bookmarks[index.min(last)].title.clone();
            app.mode = InputMode::RenameBookmark(index.min(last), title);
        }
        _ => {}
    }
}

enum LineEdit {
    Editing(String),
    Submitted(String),
    Cancelled,
}

fn edit_line(mut text: String, key: KeyEvent) -> LineEdit {
    match key.code {
        KeyCode::Enter => LineEdit::Submitted(text),
        KeyCode::Esc => LineEdit::Cancelled,
        KeyCode::Backspace => {
            text.pop();
            LineEdit::Editing(text)
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => LineEdit::Editing(String::new()),
        KeyCode::Char(c) => {
            text.push(c);
            LineEdit::Editing(text)
        }
        _ => LineEdit::Editing(text),
    }
}
