//! Rolling Logger
//!
//! File logger with size-based rotation and an in-memory circular buffer
//! holding the most recent lines.
//!
//! `init_logger` installs a `tracing` subscriber and bridges the `log`
//! facade, so both macro families end up in the same file:
//! - `<app>.log` is the active file
//! - `<app>.1.log` .. `<app>.N.log` are older generations

use std::collections::VecDeque;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};

use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::fmt::MakeWriter;

pub const DEFAULT_MAX_BYTES: u64 = 2 * 1024 * 1024;
pub const DEFAULT_MAX_FILES: usize = 3;
pub const DEFAULT_BUFFER_LINES: usize = 500;

/// Rotation and buffer limits
#[derive(Debug, Clone)]
pub struct LoggerOptions {
    /// Size at which the active file is rotated
    pub max_bytes: u64,
    /// Number of files kept on disk, including the active one
    pub max_files: usize,
    /// Number of lines kept in memory for `recent_lines`
    pub buffer_lines: usize,
}

impl Default for LoggerOptions {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_BYTES,
            max_files: DEFAULT_MAX_FILES,
            buffer_lines: DEFAULT_BUFFER_LINES,
        }
    }
}

struct RollingFile {
    dir: PathBuf,
    app_name: String,
    file: File,
    written: u64,
    options: LoggerOptions,
    recent: VecDeque<String>,
    partial: String,
}

impl RollingFile {
    fn open(dir: &Path, app_name: &str, options: LoggerOptions) -> io::Result<Self> {
        fs::create_dir_all(dir)?;
        let path = log_path(dir, app_name, 0);
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let written = file.metadata()?.len();

        Ok(Self {
            dir: dir.to_path_buf(),
            app_name: app_name.to_string(),
            file,
            written,
            options,
            recent: VecDeque::new(),
            partial: String::new(),
        })
    }

    fn rotate(&mut self) -> io::Result<()> {
        self.file.flush()?;
        let last = self.options.max_files.saturating_sub(1);

        if last == 0 {
            // Single-file mode: start over in place
            self.file = File::create(log_path(&self.dir, &self.app_name, 0))?;
            self.written = 0;
            return Ok(());
        }

        let oldest = log_path(&self.dir, &self.app_name, last);
        if oldest.exists() {
            fs::remove_file(&oldest)?;
        }
        for index in (0..last).rev() {
            let from = log_path(&self.dir, &self.app_name, index);
            if from.exists() {
                fs::rename(&from, log_path(&self.dir, &self.app_name, index + 1))?;
            }
        }

        self.file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path(&self.dir, &self.app_name, 0))?;
        self.written = 0;
        Ok(())
    }

    fn write_bytes(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.written > 0 && self.written + buf.len() as u64 > self.options.max_bytes {
            self.rotate()?;
        }
        self.file.write_all(buf)?;
        self.written += buf.len() as u64;
        self.remember(buf);
        Ok(buf.len())
    }

    fn remember(&mut self, buf: &[u8]) {
        self.partial.push_str(&String::from_utf8_lossy(buf));
        while let Some(pos) = self.partial.find('\n') {
            let line: String = self.partial.drain(..=pos).collect();
            self.recent.push_back(line.trim_end().to_string());
            while self.recent.len() > self.options.buffer_lines {
                self.recent.pop_front();
            }
        }
    }
}

fn log_path(dir: &Path, app_name: &str, index: usize) -> PathBuf {
    if index == 0 {
        dir.join(format!("{}.log", app_name))
    } else {
        dir.join(format!("{}.{}.log", app_name, index))
    }
}

fn lock_error() -> io::Error {
    io::Error::new(io::ErrorKind::Other, "log file lock poisoned")
}

/// Shared handle to the rolling file, usable as a `tracing` writer
#[derive(Clone)]
pub struct RollingWriter {
    inner: Arc<Mutex<RollingFile>>,
}

impl RollingWriter {
    pub fn new(dir: impl AsRef<Path>, app_name: &str, options: LoggerOptions) -> io::Result<Self> {
        let file = RollingFile::open(dir.as_ref(), app_name, options)?;
        Ok(Self {
            inner: Arc::new(Mutex::new(file)),
        })
    }

    /// Most recent complete lines, oldest first
    pub fn recent_lines(&self) -> Vec<String> {
        match self.inner.lock() {
            Ok(file) => file.recent.iter().cloned().collect(),
            Err(_) => Vec::new(),
        }
    }

    /// Path of the active log file
    pub fn current_path(&self) -> Option<PathBuf> {
        self.inner
            .lock()
            .ok()
            .map(|file| log_path(&file.dir, &file.app_name, 0))
    }
}

/// Per-event writer produced by `RollingWriter`
pub struct RollingHandle {
    inner: Arc<Mutex<RollingFile>>,
}

impl Write for RollingHandle {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut file = self.inner.lock().map_err(|_| lock_error())?;
        file.write_bytes(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut file = self.inner.lock().map_err(|_| lock_error())?;
        file.file.flush()
    }
}

impl<'a> MakeWriter<'a> for RollingWriter {
    type Writer = RollingHandle;

    fn make_writer(&'a self) -> Self::Writer {
        RollingHandle {
            inner: self.inner.clone(),
        }
    }
}

/// Local wall-clock timestamps, millisecond precision
struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        write!(w, "{}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"))
    }
}

static WRITER: OnceLock<RollingWriter> = OnceLock::new();

/// Initialize the global logger with default limits
pub fn init_logger(log_dir: impl AsRef<Path>, app_name: &str) -> Result<(), String> {
    init_logger_with(log_dir, app_name, LoggerOptions::default())
}

/// Initialize the global logger. Calling it again after success is a no-op.
pub fn init_logger_with(
    log_dir: impl AsRef<Path>,
    app_name: &str,
    options: LoggerOptions,
) -> Result<(), String> {
    if WRITER.get().is_some() {
        return Ok(());
    }

    let writer = RollingWriter::new(log_dir, app_name, options)
        .map_err(|e| format!("Failed to open log file: {}", e))?;

    tracing_subscriber::fmt()
        .with_writer(writer.clone())
        .with_timer(LocalTimer)
        .with_ansi(false)
        .with_target(true)
        .with_max_level(tracing::Level::DEBUG)
        .try_init()
        .map_err(|e| format!("Failed to install log subscriber: {}", e))?;

    let _ = WRITER.set(writer);
    Ok(())
}

/// Recent lines of the global logger (empty before init)
pub fn recent_lines() -> Vec<String> {
    WRITER.get().map(|w| w.recent_lines()).unwrap_or_default()
}

fn ensure_initialized() -> Result<(), String> {
    if WRITER.get().is_some() {
        Ok(())
    } else {
        Err("Logger not initialized".to_string())
    }
}

pub fn info(msg: &str) -> Result<(), String> {
    ensure_initialized()?;
    tracing::info!(target: "app", "{}", msg);
    Ok(())
}

pub fn warn(msg: &str) -> Result<(), String> {
    ensure_initialized()?;
    tracing::warn!(target: "app", "{}", msg);
    Ok(())
}

pub fn error(msg: &str) -> Result<(), String> {
    ensure_initialized()?;
    tracing::error!(target: "app", "{}", msg);
    Ok(())
}
