// src/lib.rs
pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod listing;
pub mod navigator;
pub mod net;
pub mod preview;
pub mod utils;

pub use error::{CrawlError, Result};
