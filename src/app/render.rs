// src/app/render.rs
use ratatui::{prelude::*, widgets::*};

use super::{App, InputMode};
use crate::config::ViewMode;
use crate::listing::{Entry, SortKey};
use crate::utils::{format_info, truncate};

const ICON_CELL_WIDTH: u16 = 18;

const HELP: &[(&str, &str)] = &[
    ("j/k, arrows", "move selection"),
    ("Enter / l", "open directory or page, save file"),
    ("Backspace / b, f", "back, forward"),
    ("h / u, ~", "parent directory, home"),
    ("o or :", "go to URL"),
    ("r / F5", "refresh"),
    ("/ , n, N", "search, next and previous match"),
    ("1-4, s, S", "sort by name/size/type/modified, cycle, reverse"),
    ("v", "cycle view mode"),
    ("space, d, D", "mark, download, save as"),
    ("x, O", "cancel download, open download folder"),
    ("w", "toggle web surf mode"),
    ("m, B", "bookmark page, bookmarks"),
    ("t, i, I, p", "toggle tree, info, status bar, text preview"),
    ("q", "quit"),
];

pub fn draw(frame: &mut Frame, app: &App) {
    let mut constraints = vec![Constraint::Length(3), Constraint::Min(3)];
    if app.settings.show_statusbar || app.download_progress.is_some() {
        constraints.push(Constraint::Length(1));
    }
    if app.prompt().is_some() {
        constraints.push(Constraint::Length(1));
    }
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(frame.size());

    draw_location(frame, app, rows[0]);
    draw_body(frame, app, rows[1]);

    let mut next = 2;
    if app.settings.show_statusbar || app.download_progress.is_some() {
        draw_status(frame, app, rows[next]);
        next += 1;
    }
    if let Some((label, text)) = app.prompt() {
        let line = Line::from(vec![
            Span::styled(label, Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
            Span::raw(text.to_string()),
            Span::styled("_", Style::default().add_modifier(Modifier::SLOW_BLINK)),
        ]);
        frame.render_widget(Paragraph::new(line), rows[next]);
    }

    match &app.mode {
        InputMode::Bookmarks(index) => draw_bookmarks(frame, app, *index),
        InputMode::Help => draw_help(frame),
        _ => {}
    }
    if let Some(notice) = app.notice() {
        draw_notice(frame, notice);
    }
}

impl App {
    fn prompt(&self) -> Option<(&'static str, &str)> {
        match &self.mode {
            InputMode::Location(text) => Some(("URL: ", text.as_str())),
            InputMode::Search(text) => Some(("Search: ", text.as_str())),
            InputMode::SaveAs(text) => Some(("Save as: ", text.as_str())),
            InputMode::BookmarkTitle(text) => Some(("Bookmark title: ", text.as_str())),
            InputMode::RenameBookmark(_, text) => Some(("Rename bookmark: ", text.as_str())),
            _ => None,
        }
    }
}

fn draw_location(frame: &mut Frame, app: &App, area: Rect) {
    let history = app.navigator.history();
    let enabled = |on: bool| if on { Style::default().fg(Color::Cyan) } else { Style::default().fg(Color::DarkGray) };

    let mut spans = vec![
        Span::styled("< ", enabled(history.can_go_back())),
        Span::styled("> ", enabled(history.can_go_forward())),
    ];
    let crumbs = app.navigator.crumbs();
    for (i, crumb) in crumbs.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" / ", Style::default().fg(Color::DarkGray)));
        }
        let style = if i + 1 == crumbs.len() {
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Blue)
        };
        spans.push(Span::styled(crumb.label.clone(), style));
    }

    let mode = if app.navigator.is_surfing() { "surf" } else { app.settings.view_mode.label() };
    let title = format!(" indexcrawler [{}] ", mode);
    let paragraph = Paragraph::new(Line::from(spans))
        .block(Block::default().borders(Borders::ALL).title(title));
    frame.render_widget(paragraph, area);
}

fn draw_body(frame: &mut Frame, app: &App, area: Rect) {
    let mut constraints = Vec::new();
    if app.settings.show_tree {
        constraints.push(Constraint::Length(26));
    }
    constraints.push(Constraint::Min(20));
    let side = app.settings.show_info || (app.settings.show_text_preview && app.preview.is_some());
    if side {
        constraints.push(Constraint::Percentage(35));
    }
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(constraints)
        .split(area);

    let mut column = 0;
    if app.settings.show_tree {
        draw_tree(frame, app, columns[column]);
        column += 1;
    }
    if app.navigator.is_surfing() {
        draw_page(frame, app, columns[column]);
    } else {
        match app.settings.view_mode {
            ViewMode::Details => draw_details(frame, app, columns[column]),
            ViewMode::List => draw_list(frame, app, columns[column]),
            ViewMode::Icons => draw_icons(frame, app, columns[column]),
        }
    }
    column += 1;
    if side {
        draw_side(frame, app, columns[column]);
    }
}

/// The path from the root down to the current location, one level per line.
fn draw_tree(frame: &mut Frame, app: &App, area: Rect) {
    let crumbs = app.navigator.crumbs();
    let items: Vec<ListItem> = crumbs
        .iter()
        .enumerate()
        .map(|(depth, crumb)| {
            let text = format!("{}{} {}", "  ".repeat(depth), if depth == 0 { "*" } else { "`-" }, crumb.label);
            ListItem::new(truncate(&text, area.width.saturating_sub(2) as usize))
        })
        .collect();
    let selected = crumbs.len().checked_sub(1);
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(" Tree "))
        .highlight_style(Style::default().fg(Color::Yellow));
    frame.render_stateful_widget(list, area, &mut ListState::default().with_selected(selected));
}

fn entry_style(app: &App, entry: &Entry) -> Style {
    let style = if entry.kind.is_navigable() {
        Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };
    if app.is_marked(entry) {
        style.fg(Color::Green)
    } else {
        style
    }
}

fn listing_title(app: &App) -> String {
    let spec = app.navigator.sort_spec();
    let filter = app.navigator.filter();
    if filter.is_empty() {
        format!(" {} items | {} {} ", app.navigator.visible_len(), spec.key.label(), spec.arrow())
    } else {
        format!(
            " {}/{} match \"{}\" | {} {} ",
            app.navigator.visible_len(),
            app.navigator.entries().len(),
            filter,
            spec.key.label(),
            spec.arrow()
        )
    }
}

fn highlight() -> Style {
    Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD)
}

fn draw_details(frame: &mut Frame, app: &App, area: Rect) {
    let spec = app.navigator.sort_spec();
    let heading = |key: SortKey| {
        if spec.key == key {
            format!("{} {}", key.label(), spec.arrow())
        } else {
            key.label().to_string()
        }
    };
    let header = Row::new(vec![heading(SortKey::Name), heading(SortKey::Size), heading(SortKey::Type), heading(SortKey::Modified)])
        .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));

    let rows: Vec<Row> = app
        .navigator
        .visible()
        .map(|entry| {
            let mark = if app.is_marked(entry) { "+" } else { " " };
            Row::new(vec![
                format!("{}{} {}", mark, entry.icon.glyph(), entry.name),
                entry.size.clone(),
                entry.kind.label().to_string(),
                entry.modified.clone(),
            ])
            .style(entry_style(app, entry))
        })
        .collect();

    let widths = [Constraint::Min(24), Constraint::Length(9), Constraint::Length(10), Constraint::Length(18)];
    let table = Table::new(rows, widths)
        .header(header)
        .block(Block::default().borders(Borders::ALL).title(listing_title(app)))
        .highlight_style(highlight());
    let mut state = TableState::default().with_selected(selected_index(app));
    frame.render_stateful_widget(table, area, &mut state);
}

fn draw_list(frame: &mut Frame, app: &App, area: Rect) {
    let items: Vec<ListItem> = app
        .navigator
        .visible()
        .map(|entry| {
            let mark = if app.is_marked(entry) { "+" } else { " " };
            ListItem::new(format!("{}{} {}", mark, entry.icon.glyph(), entry.name)).style(entry_style(app, entry))
        })
        .collect();
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(listing_title(app)))
        .highlight_style(highlight());
    let mut state = ListState::default().with_selected(selected_index(app));
    frame.render_stateful_widget(list, area, &mut state);
}

/// Fixed-width cells, row-major, scrolled so the selection stays visible.
fn draw_icons(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title(listing_title(app));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let per_row = (inner.width / ICON_CELL_WIDTH).max(1) as usize;
    let visible_rows = (inner.height / 2).max(1) as usize;
    let first_row = (app.selected / per_row).saturating_sub(visible_rows - 1);

    let entries: Vec<&Entry> = app.navigator.visible().collect();
    for (i, entry) in entries.iter().enumerate().skip(first_row * per_row).take(per_row * visible_rows) {
        let row = i / per_row - first_row;
        let col = i % per_row;
        let cell = Rect {
            x: inner.x + col as u16 * ICON_CELL_WIDTH,
            y: inner.y + row as u16 * 2,
            width: ICON_CELL_WIDTH.min(inner.width),
            height: 2,
        }
        .intersection(inner);
        let mut style = entry_style(app, entry);
        if i == app.selected {
            style = style.patch(highlight());
        }
        let width = ICON_CELL_WIDTH as usize - 1;
        let text = vec![
            Line::from(entry.icon.glyph()).alignment(Alignment::Center),
            Line::from(truncate(&entry.name, width)).alignment(Alignment::Center),
        ];
        frame.render_widget(Paragraph::new(text).style(style), cell);
    }
}

fn draw_page(frame: &mut Frame, app: &App, area: Rect) {
    let Some(page) = app.navigator.page() else {
        let empty = Paragraph::new("Nothing to display")
            .block(Block::default().borders(Borders::ALL).title(" Page "));
        frame.render_widget(empty, area);
        return;
    };

    let current = app.page_matches.get(app.match_cursor).map(|&(line, _)| line);
    let lines: Vec<Line> = page
        .lines
        .iter()
        .enumerate()
        .skip(app.page_scroll)
        .map(|(i, text)| {
            let style = if Some(i) == current {
                Style::default().bg(Color::Yellow).fg(Color::Black)
            } else if app.page_matches.iter().any(|&(line, _)| line == i) {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default()
            };
            Line::styled(text.clone(), style)
        })
        .collect();

    let title = page.title.clone().unwrap_or_else(|| String::from("Page"));
    let paragraph = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).title(format!(" {} ", title)));
    frame.render_widget(paragraph, area);
}

fn draw_side(frame: &mut Frame, app: &App, area: Rect) {
    let mut lines: Vec<Line> = Vec::new();
    if app.settings.show_info {
        match app.selected_entry() {
            Some(entry) => {
                let target = app.navigator.resolve_entry(entry).ok();
                lines.extend(format_info(entry, target.as_ref()).into_iter().map(Line::from));
            }
            None => lines.push(Line::from("No selection")),
        }
    }
    if let Some(preview) = app.preview.as_deref().filter(|_| app.settings.show_text_preview) {
        if !lines.is_empty() {
            lines.push(Line::from(""));
        }
        lines.push(Line::styled("Preview", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)));
        lines.extend(preview.lines().map(|l| Line::from(l.to_string())));
    }
    let paragraph = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).title(" Info "));
    frame.render_widget(paragraph, area);
}

fn draw_status(frame: &mut Frame, app: &App, area: Rect) {
    match app.download_progress {
        Some(percent) => {
            let gauge = Gauge::default()
                .gauge_style(Style::default().fg(Color::Green).bg(Color::Black))
                .percent(percent.min(100) as u16)
                .label(app.status.clone());
            frame.render_widget(gauge, area);
        }
        None => {
            let paragraph = Paragraph::new(app.status.clone()).style(Style::default().fg(Color::Black).bg(Color::Cyan));
            frame.render_widget(paragraph, area);
        }
    }
}

fn draw_bookmarks(frame: &mut Frame, app: &App, index: usize) {
    let area = centered(frame.size(), 60, 60);
    let items: Vec<ListItem> = app
        .settings
        .bookmarks
        .iter()
        .enumerate()
        .map(|(i, b)| {
            let home = if i == 0 { " (home)" } else { "" };
            ListItem::new(vec![
                Line::styled(format!("{}{}", b.title, home), Style::default().add_modifier(Modifier::BOLD)),
                Line::styled(b.url.clone(), Style::default().fg(Color::DarkGray)),
            ])
        })
        .collect();
    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Bookmarks: Enter open | d delete | e rename | K/J move "),
        )
        .highlight_style(highlight());
    let selected = (!app.settings.bookmarks.is_empty()).then_some(index);
    frame.render_widget(Clear, area);
    frame.render_stateful_widget(list, area, &mut ListState::default().with_selected(selected));
}

fn draw_help(frame: &mut Frame) {
    let area = centered(frame.size(), 70, 70);
    let rows: Vec<Row> = HELP.iter().map(|(keys, action)| Row::new(vec![*keys, *action])).collect();
    let table = Table::new(rows, [Constraint::Length(20), Constraint::Min(20)])
        .block(Block::default().borders(Borders::ALL).title(" Keys "));
    frame.render_widget(Clear, area);
    frame.render_widget(table, area);
}

fn draw_notice(frame: &mut Frame, notice: &str) {
    let area = centered(frame.size(), 60, 30);
    let paragraph = Paragraph::new(notice.to_string())
        .wrap(Wrap { trim: true })
        .style(Style::default().fg(Color::Red))
        .block(Block::default().borders(Borders::ALL).title(" Warning (any key) "));
    frame.render_widget(Clear, area);
    frame.render_widget(paragraph, area);
}

fn selected_index(app: &App) -> Option<usize> {
    (app.navigator.visible_len() > 0).then_some(app.selected)
}

fn centered(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_fits_inside() {
        let outer = Rect::new(0, 0, 100, 40);
        let inner = centered(outer, 60, 50);
        assert_eq!(inner.width, 60);
        assert_eq!(inner.height, 20);
        assert!(inner.x >= 20 && inner.y >= 10);
    }
}
