// src/net/download.rs
use std::fs::{self, File};
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use log::{info, warn};
use url::Url;

use super::HttpClient;
use crate::error::{CrawlError, Result};

pub const CHUNK_SIZE: usize = 8192;

#[derive(Clone, Default)]
pub struct CancelFlag {
    inner: Arc<AtomicBool>,
}

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.inner.store(true, AtomicOrdering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.load(AtomicOrdering::Relaxed)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadJob {
    pub url: Url,
    pub destination: PathBuf,
}

impl DownloadJob {
    pub fn new(url: Url, destination: impl Into<PathBuf>) -> Self {
        DownloadJob { url, destination: destination.into() }
    }

    pub fn name(&self) -> String {
        self.destination
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.url.to_string())
    }
}

/// Worker-to-UI progress message.
#[derive(Debug, Clone, PartialEq)]
pub enum DownloadEvent {
    Started { index: usize, total: usize, name: String },
    /// Only sent when the server announced a content length.
    Progress { index: usize, total: usize, name: String, percent: u8 },
    Finished { index: usize, path: PathBuf, bytes: u64 },
    Failed { index: usize, name: String, error: String },
    BatchDone { completed: usize, failed: usize, cancelled: bool },
}

pub struct DownloadHandle {
    cancel: CancelFlag,
    thread: JoinHandle<()>,
}

impl DownloadHandle {
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn join(self) {
        if self.thread.join().is_err() {
            warn!("download worker panicked");
        }
    }
}

/// Downloads `jobs` one after another on a worker thread, in order.
/// A failed file is reported and the batch moves on; cancellation stops it.
pub fn spawn_batch(client: HttpClient, jobs: Vec<DownloadJob>, events: Sender<DownloadEvent>) -> DownloadHandle {
    let cancel = CancelFlag::new();
    let worker_cancel = cancel.clone();
    let thread = thread::spawn(move || run_batch(&client, &jobs, &events, &worker_cancel));
    DownloadHandle { cancel, thread }
}

fn run_batch(client: &HttpClient, jobs: &[DownloadJob], events: &Sender<DownloadEvent>, cancel: &CancelFlag) {
    let total = jobs.len();
    let mut completed = 0;
    let mut failed = 0;
    let mut cancelled = false;

    for (index, job) in jobs.iter().enumerate() {
        if cancel.is_cancelled() {
            cancelled = true;
            break;
        }
        let name = job.name();
        let _ = events.send(DownloadEvent::Started { index, total, name: name.clone() });

        let result = download_one(client, job, cancel, |percent| {
            let _ = events.send(DownloadEvent::Progress { index, total, name: name.clone(), percent });
        });
        match result {
            Ok(bytes) => {
                info!("downloaded {} -> {} ({} bytes)", job.url, job.destination.display(), bytes);
                completed += 1;
                let _ = events.send(DownloadEvent::Finished { index, path: job.destination.clone(), bytes });
            }
            Err(CrawlError::Cancelled) => {
                cancelled = true;
                break;
            }
            Err(err) => {
                warn!("download of {} failed: {}", job.url, err);
                failed += 1;
                let _ = events.send(DownloadEvent::Failed { index, name, error: err.to_string() });
            }
        }
    }

    let _ = events.send(DownloadEvent::BatchDone { completed, failed, cancelled });
}

/// Streams one body to disk in `CHUNK_SIZE` pieces. Returns the byte count.
pub fn download_one(
    client: &HttpClient,
    job: &DownloadJob,
    cancel: &CancelFlag,
    mut on_progress: impl FnMut(u8),
) -> Result<u64> {
    let response = client.open(&job.url)?;
    let expected = response.content_length().filter(|len| *len > 0);

    if let Some(parent) = job.destination.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| CrawlError::filesystem(parent, e))?;
        }
    }
    let file = File::create(&job.destination).map_err(|e| CrawlError::filesystem(&job.destination, e))?;
    persist(response, BufWriter::new(file), job, cancel, expected, &mut on_progress)
}

/// Copies `reader` into `writer`; on any failure the destination is removed.
fn persist<R: Read, W: Write>(
    reader: R,
    writer: W,
    job: &DownloadJob,
    cancel: &CancelFlag,
    expected: Option<u64>,
    on_progress: &mut impl FnMut(u8),
) -> Result<u64> {
    let result = copy_chunks(reader, writer, job, cancel, expected, on_progress);
    if result.is_err() {
        discard_partial(&job.destination);
    }
    result
}

// Takes the writer by value so it is closed before any cleanup runs.
fn copy_chunks<R: Read, W: Write>(
    mut reader: R,
    mut writer: W,
    job: &DownloadJob,
    cancel: &CancelFlag,
    expected: Option<u64>,
    on_progress: &mut impl FnMut(u8),
) -> Result<u64> {
    let mut buf = [0u8; CHUNK_SIZE];
    let mut written: u64 = 0;
    let mut last_percent = None;

    loop {
        if cancel.is_cancelled() {
            return Err(CrawlError::Cancelled);
        }

        let read = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(source) => return Err(CrawlError::Interrupted { url: job.url.to_string(), source }),
        };

        writer
            .write_all(&buf[..read])
            .map_err(|e| CrawlError::filesystem(&job.destination, e))?;
        written += read as u64;

        if let Some(expected) = expected {
            let percent = ((written.min(expected) * 100) / expected) as u8;
            if last_percent != Some(percent) {
                last_percent = Some(percent);
                on_progress(percent);
            }
        }
    }

    writer.flush().map_err(|e| CrawlError::filesystem(&job.destination, e))?;
    Ok(written)
}

fn discard_partial(path: &Path) {
    if let Err(e) = fs::remove_file(path) {
        warn!("could not remove partial file {}: {}", path.display(), e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancel_flag_is_shared() {
        let flag = CancelFlag::new();
        let clone = flag.clone();
        assert!(!clone.is_cancelled());
        flag.cancel();
        assert!(clone.is_cancelled());
    }

    /// Accepts `room` bytes, then fails like a full disk.
    struct FullDisk {
        room: usize,
        fail_flush: bool,
    }

    impl Write for FullDisk {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            if self.room == 0 {
                return Err(std::io::Error::new(std::io::ErrorKind::Other, "no space left on device"));
            }
            let n = buf.len().min(self.room);
            self.room -= n;
            Ok(n)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            if self.fail_flush {
                return Err(std::io::Error::new(std::io::ErrorKind::Other, "no space left on device"));
            }
            Ok(())
        }
    }

    fn partial_job(dir: &tempfile::TempDir) -> DownloadJob {
        let destination = dir.path().join("big.bin");
        fs::write(&destination, b"first chunk").unwrap();
        DownloadJob::new(Url::parse("https://h.test/big.bin").unwrap(), destination)
    }

    #[test]
    fn test_write_failure_removes_partial_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let job = partial_job(&dir);
        let body = vec![7u8; CHUNK_SIZE * 3];
        let writer = FullDisk { room: CHUNK_SIZE, fail_flush: false };

        let result = persist(&body[..], writer, &job, &CancelFlag::new(), Some(body.len() as u64), &mut |_| {});
        assert!(matches!(result, Err(CrawlError::Filesystem { .. })));
        assert!(!job.destination.exists());
    }

    #[test]
    fn test_flush_failure_removes_partial_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let job = partial_job(&dir);
        let writer = FullDisk { room: usize::MAX, fail_flush: true };

        let result = persist(&b"tiny"[..], writer, &job, &CancelFlag::new(), None, &mut |_| {});
        assert!(matches!(result, Err(CrawlError::Filesystem { .. })));
        assert!(!job.destination.exists());
    }

    #[test]
    fn test_persist_keeps_complete_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let job = partial_job(&dir);
        let mut percents = Vec::new();
        let written = persist(
            &b"0123456789"[..],
            Vec::new(),
            &job,
            &CancelFlag::new(),
            Some(10),
            &mut |p| percents.push(p),
        )
        .unwrap();
        assert_eq!(written, 10);
        assert_eq!(percents, vec![100]);
        assert!(job.destination.exists());
    }

    #[test]
    fn test_job_name_from_destination() {
        let job = DownloadJob::new(Url::parse("https://h.test/a/x%20y.iso").unwrap(), "/tmp/dl/x y.iso");
        assert_eq!(job.name(), "x y.iso");
    }
}
