// src/main.rs
use std::fs::OpenOptions;
use std::io::{self, Stdout};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use env_logger::{Env, Target};
use log::info;
use ratatui::prelude::*;

use indexcrawler::app::{self, App};
use indexcrawler::cli::{run_get, run_ls, Args, Command};
use indexcrawler::config::{settings_file_path, Settings};
use indexcrawler::listing::SortSpec;
use indexcrawler::navigator::{parse_location, Navigator};
use indexcrawler::net::HttpClient;

const TICK: Duration = Duration::from_millis(100);

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.is_interactive());

    let settings_path = args.settings.clone().unwrap_or_else(settings_file_path);
    let settings = Settings::load(&settings_path);

    match &args.command {
        Some(Command::Ls { url, sort, desc, filter }) => {
            run_ls(url, SortSpec::new(*sort, !desc), filter.as_deref())
        }
        Some(Command::Get { urls, output }) => run_get(urls, output.clone(), &settings),
        _ => run_tui(args.browse_url(), settings, settings_path),
    }
}

/// The TUI owns the terminal, so its log goes to a file in the cache dir.
fn init_logging(interactive: bool) {
    let mut builder = env_logger::Builder::from_env(Env::default().default_filter_or("warn"));
    if interactive {
        let dir = dirs::cache_dir().unwrap_or_else(std::env::temp_dir).join("indexcrawler");
        let file = std::fs::create_dir_all(&dir)
            .and_then(|_| OpenOptions::new().create(true).append(true).open(dir.join("indexcrawler.log")));
        match file {
            Ok(file) => {
                builder.target(Target::Pipe(Box::new(file)));
            }
            Err(_) => {
                builder.filter_level(log::LevelFilter::Off);
            }
        }
    }
    builder.init();
}

fn run_tui(start: Option<&str>, settings: Settings, settings_path: PathBuf) -> Result<()> {
    let root = parse_location(&settings.base_url)
        .with_context(|| format!("invalid base_url in {}", settings_path.display()))?;
    let navigator = Navigator::new(root, Box::new(HttpClient::new()?));
    let mut app = App::new(navigator, settings, settings_path, HttpClient::for_downloads()?);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

    let result = event_loop(&mut terminal, &mut app, start);
    app.shutdown();

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    result
}

fn event_loop(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App, start: Option<&str>) -> Result<()> {
    terminal.draw(|f| app::draw(f, app))?;
    app.start(start);
    info!("started at {:?}", app.navigator().location().map(|u| u.as_str()));

    while !app.should_quit() {
        terminal.draw(|f| app::draw(f, app))?;
        if event::poll(TICK)? {
            if let Event::Key(key) = event::read()? {
                app::handle_key(app, key);
            }
        }
        app.tick();
    }
    Ok(())
}
