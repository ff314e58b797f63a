//! Rolling Logger
//!
//! `log` backend for the web front-end. Every record is written to the
//! browser console (stderr on native targets) and the most recent lines are
//! kept in a circular buffer so the app can show or copy them.

use std::collections::VecDeque;
use std::sync::{Mutex, OnceLock};

use log::{Level, LevelFilter, Log, Metadata, Record};
use thiserror::Error;

static LOGGER: OnceLock<RollingLogger> = OnceLock::new();

#[derive(Debug, Error)]
pub enum LoggerError {
    #[error("a logger is already installed")]
    AlreadyInstalled(#[from] log::SetLoggerError),
    #[error("buffer capacity must be at least 1")]
    ZeroCapacity,
}

/// Fixed-capacity line buffer; the oldest line is dropped first
#[derive(Debug)]
pub struct LineBuffer {
    lines: VecDeque<String>,
    capacity: usize,
}

impl LineBuffer {
    pub fn new(capacity: usize) -> Self {
        Self { lines: VecDeque::with_capacity(capacity), capacity }
    }

    pub fn push(&mut self, line: String) {
        if self.lines.len() == self.capacity {
            self.lines.pop_front();
        }
        self.lines.push_back(line);
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.iter().cloned().collect()
    }
}

pub struct RollingLogger {
    app_name: String,
    level: LevelFilter,
    buffer: Mutex<LineBuffer>,
}

impl RollingLogger {
    fn format_line(&self, record: &Record) -> String {
        format!(
            "[{}] {:<5} {} {}: {}",
            chrono::Local::now().format("%H:%M:%S%.3f"),
            record.level(),
            self.app_name,
            record.target(),
            record.args()
        )
    }
}

impl Log for RollingLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = self.format_line(record);
        emit(record.level(), &line);
        if let Ok(mut buffer) = self.buffer.lock() {
            buffer.push(line);
        }
    }

    fn flush(&self) {}
}

#[cfg(target_arch = "wasm32")]
fn emit(level: Level, line: &str) {
    let value = wasm_bindgen::JsValue::from_str(line);
    match level {
        Level::Error => web_sys::console::error_1(&value),
        Level::Warn => web_sys::console::warn_1(&value),
        Level::Info => web_sys::console::info_1(&value),
        Level::Debug | Level::Trace => web_sys::console::debug_1(&value),
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn emit(_level: Level, line: &str) {
    eprintln!("{}", line);
}

/// Install the logger for `app_name`, keeping the last `capacity` lines.
pub fn init_logger(app_name: &str, capacity: usize, level: LevelFilter) -> Result<(), LoggerError> {
    if capacity == 0 {
        return Err(LoggerError::ZeroCapacity);
    }
    let logger = LOGGER.get_or_init(|| RollingLogger {
        app_name: app_name.to_string(),
        level,
        buffer: Mutex::new(LineBuffer::new(capacity)),
    });
    log::set_logger(logger)?;
    log::set_max_level(level);
    Ok(())
}

/// Most recent log lines, oldest first. Empty before `init_logger`.
pub fn recent_lines() -> Vec<String> {
    LOGGER
        .get()
        .and_then(|logger| logger.buffer.lock().ok().map(|b| b.lines()))
        .unwrap_or_default()
}
