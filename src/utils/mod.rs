// src/utils/mod.rs
pub mod formatter;
pub mod opener;

pub use formatter::{format_download_event, format_info, truncate};
pub use opener::open_folder;
