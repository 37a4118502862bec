use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
};

use chrono::Local;
use log::{Level, LevelFilter, Metadata, Record, SetLoggerError};
use serde::{Deserialize, Serialize};

pub static LOG: Mutex<Option<Arc<Mutex<dyn Repository>>>> = Mutex::new(None);

pub const MAX_ENTRIES: usize = 100;

#[allow(clippy::missing_errors_doc)]
pub trait Service {
    fn get_log_entries(&self) -> Result<VecDeque<Entry>, Error>;
    fn add_log_entry(&self, entry: Entry) -> Result<(), Error>;
}

#[allow(clippy::missing_errors_doc)]
pub trait Repository: Send + Sync + 'static {
    fn read_entries(&self) -> Result<VecDeque<Entry>, Error>;
    fn write_entry(&self, entry: Entry) -> Result<(), Error>;
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("{0}")]
    Unknown(String),
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub time: String,
    #[serde(with = "LevelDef")]
    pub level: Level,
    pub message: String,
}

#[derive(Serialize, Deserialize)]
#[serde(remote = "Level")]
pub enum LevelDef {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Add an entry in front of all older entries and drop everything beyond [`MAX_ENTRIES`].
pub fn prepend(entries: &mut VecDeque<Entry>, entry: Entry) {
    entries.push_front(entry);
    entries.truncate(MAX_ENTRIES);
}

static LOGGER: Logger = Logger;

/// # Errors
///
/// Returns an error if the logger has already been initialized.
pub fn init(storage: Arc<Mutex<dyn Repository>>) -> Result<(), SetLoggerError> {
    if let Ok(mut log) = LOG.lock() {
        *log = Some(storage);
    }
    log::set_logger(&LOGGER).map(|()| log::set_max_level(LevelFilter::Trace))
}

struct Logger;

impl log::Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= Level::Trace
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let message = record.args().to_string();
        write_console(record.level(), &message);

        let Ok(log) = LOG.lock() else {
            return;
        };
        if let Some(ref log) = *log {
            if let Ok(repository) = log.lock() {
                let _ = repository.write_entry(Entry {
                    time: Local::now().format("%b %d %H:%M:%S").to_string(),
                    level: record.level(),
                    message,
                });
            }
        }
    }

    fn flush(&self) {}
}

#[cfg(target_arch = "wasm32")]
fn write_console(level: Level, message: &str) {
    match level {
        Level::Error => gloo_console::error!(message),
        Level::Warn => gloo_console::warn!(message),
        Level::Info => gloo_console::info!(message),
        Level::Debug | Level::Trace => gloo_console::debug!(message),
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn write_console(level: Level, message: &str) {
    eprintln!("[{level}] {message}");
}
