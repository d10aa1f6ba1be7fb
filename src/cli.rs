// src/cli.rs
use std::path::PathBuf;
use std::sync::mpsc;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;

use crate::config::Settings;
use crate::listing::{Entry, EntryKind, SortKey, SortSpec};
use crate::navigator::location::file_name;
use crate::navigator::{parse_location, Navigator};
use crate::net::{spawn_batch, DownloadEvent, DownloadJob, HttpClient};
use crate::utils::format_download_event;

#[derive(Parser, Debug)]
#[command(
    name = "indexcrawler",
    author,
    version,
    about = "Browse and download from web server directory listings",
    args_conflicts_with_subcommands = true
)]
pub struct Args {
    /// Listing to open in the browser (defaults to the home bookmark)
    pub url: Option<String>,

    #[arg(long, global = true, value_name = "FILE", help = "Settings file to use instead of the default")]
    pub settings: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Open the interactive browser
    Browse { url: Option<String> },
    /// Print a listing
    Ls {
        url: String,
        #[arg(long, default_value = "name", value_parser = parse_sort_key)]
        sort: SortKey,
        #[arg(long, help = "Sort descending")]
        desc: bool,
        #[arg(long, value_name = "QUERY", help = "Only entries whose name contains QUERY")]
        filter: Option<String>,
    },
    /// Download one or more files in order
    Get {
        #[arg(required = true)]
        urls: Vec<String>,
        #[arg(short, long, value_name = "DIR", value_hint = clap::ValueHint::DirPath)]
        output: Option<PathBuf>,
    },
}

impl Args {
    /// Start location for the browser, if one was given.
    pub fn browse_url(&self) -> Option<&str> {
        match &self.command {
            Some(Command::Browse { url }) => url.as_deref(),
            Some(_) => None,
            None => self.url.as_deref(),
        }
    }

    pub fn is_interactive(&self) -> bool {
        matches!(self.command, None | Some(Command::Browse { .. }))
    }
}

fn parse_sort_key(value: &str) -> std::result::Result<SortKey, String> {
    SortKey::ALL
        .into_iter()
        .find(|key| key.label().eq_ignore_ascii_case(value))
        .ok_or_else(|| format!("unknown sort key '{}' (name, size, type, modified)", value))
}

pub fn run_ls(url: &str, spec: SortSpec, filter: Option<&str>) -> Result<()> {
    let location = parse_location(url)?;
    let client = HttpClient::new()?;
    let mut navigator = Navigator::new(location.clone(), Box::new(client));
    navigator.set_sort(spec);
    navigator
        .navigate_to(location)
        .with_context(|| format!("could not list {}", url))?;
    if let Some(query) = filter {
        navigator.set_filter(query);
    }

    for entry in navigator.visible() {
        println!("{}", colorize(entry, &listing_line(entry)));
    }
    eprintln!(
        "{} of {} entries, by {} {}",
        navigator.visible_len(),
        navigator.entries().len(),
        spec.key.label(),
        spec.arrow()
    );
    Ok(())
}

/// One aligned row: size, modified, name.
fn listing_line(entry: &Entry) -> String {
    format!("{:>8}  {:<17}  {}", entry.size, entry.modified, entry.name)
}

fn colorize(entry: &Entry, line: &str) -> String {
    match entry.kind {
        EntryKind::Directory => line.blue().bold().to_string(),
        EntryKind::WebDocument => line.cyan().to_string(),
        EntryKind::File => line.to_string(),
    }
}

pub fn run_get(urls: &[String], output: Option<PathBuf>, settings: &Settings) -> Result<()> {
    let dir = output.unwrap_or_else(|| settings.default_download_path.clone());

    let mut jobs = Vec::new();
    for url in urls {
        let location = parse_location(url)?;
        let name = file_name(&location).ok_or_else(|| anyhow!("{} does not name a file", url))?;
        jobs.push(DownloadJob::new(location, dir.join(name)));
    }

    let (tx, rx) = mpsc::channel();
    let handle = spawn_batch(HttpClient::for_downloads()?, jobs, tx);
    let mut failed = 0;
    for event in rx {
        let line = format_download_event(&event);
        match event {
            DownloadEvent::Progress { .. } => eprint!("\r{}", line),
            DownloadEvent::Finished { .. } => eprintln!("\r{}", line.green()),
            DownloadEvent::Failed { .. } => eprintln!("\r{}", line.red()),
            DownloadEvent::BatchDone { failed: count, .. } => {
                failed = count;
                eprintln!("{}", line.bold());
            }
            DownloadEvent::Started { .. } => {}
        }
    }
    handle.join();

    if failed > 0 {
        return Err(anyhow!("{} download(s) failed", failed));
    }
    Ok(())
}
