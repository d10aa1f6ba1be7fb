// src/utils/opener.rs
use std::path::Path;
use std::process::{Command, Stdio};

/// Hands `path` to the desktop's file manager.
pub fn open_folder(path: &Path) -> Result<(), String> {
    let opener = ["xdg-open", "open", "explorer"]
        .into_iter()
        .find(|tool| which::which(tool).is_ok())
        .ok_or_else(|| "no folder opener found (install xdg-utils)".to_string())?;

    Command::new(opener)
        .arg(path)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map(|_| ())
        .map_err(|e| format!("{} failed: {}", opener, e))
}
