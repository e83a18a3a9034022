//! JSON-lines logger behind the `log` facade.
//!
//! Every record becomes exactly one line of the form
//! `{"severity":"NORMAL","message":"..."}`. `ERROR` lines go to stderr,
//! everything else to stdout. Records are filtered with `RUST_LOG`-style
//! directives such as `info,sqlx=warn`.

use std::{
    io::{self, Write},
    sync::{Arc, Mutex, RwLock},
};

use env_filter::{Builder as FilterBuilder, Filter};
use log::{Level, Log, Metadata, Record, SetLoggerError};
use serde::Serialize;

type Sink = Arc<Mutex<Box<dyn Write + Send>>>;

// Filter used until configuration is known
const DEFAULT_DIRECTIVES: &str = "info";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Normal,
    Error,
}

impl From<Level> for Severity {
    fn from(level: Level) -> Self {
        match level {
            Level::Error | Level::Warn => Severity::Error,
            Level::Info | Level::Debug | Level::Trace => Severity::Normal,
        }
    }
}

#[derive(Serialize)]
struct LogLine<'a> {
    severity: Severity,
    message: &'a str,
}

pub struct JsonLogger {
    stdout: Sink,
    stderr: Sink,
    filter: RwLock<Filter>,
}

impl JsonLogger {
    /// Logger writing to the process' standard streams
    pub fn stdio() -> Self {
        Self::with_sinks(Box::new(io::stdout()), Box::new(io::stderr()))
    }

    pub fn with_sinks(stdout: Box<dyn Write + Send>, stderr: Box<dyn Write + Send>) -> Self {
        Self {
            stdout: Arc::new(Mutex::new(stdout)),
            stderr: Arc::new(Mutex::new(stderr)),
            filter: RwLock::new(build_filter(DEFAULT_DIRECTIVES)),
        }
    }

    /// Install as the global `log` backend.
    ///
    /// The logger lives for the rest of the process; the returned handle is
    /// used to swap the filter once configuration is loaded.
    pub fn install(self) -> Result<&'static JsonLogger, SetLoggerError> {
        let logger: &'static JsonLogger = Box::leak(Box::new(self));
        log::set_logger(logger)?;
        log::set_max_level(logger.max_level());
        Ok(logger)
    }

    /// Replace the filter with `RUST_LOG`-style directives and move the
    /// global max level with it
    pub fn set_filter(&self, directives: &str) {
        let filter = build_filter(directives);
        let max_level = filter.filter();
        match self.filter.write() {
            Ok(mut current) => *current = filter,
            Err(poisoned) => *poisoned.into_inner() = filter,
        }
        log::set_max_level(max_level);
    }

    fn max_level(&self) -> log::LevelFilter {
        match self.filter.read() {
            Ok(filter) => filter.filter(),
            Err(poisoned) => poisoned.into_inner().filter(),
        }
    }

    fn write_line(&self, severity: Severity, message: &str) {
        let line = match serde_json::to_string(&LogLine { severity, message }) {
            Ok(mut line) => {
                line.push('\n');
                line
            }
            Err(_) => return,
        };

        let sink = match severity {
            Severity::Normal => &self.stdout,
            Severity::Error => &self.stderr,
        };

        // One write per line under the lock keeps concurrent lines whole.
        if let Ok(mut writer) = sink.lock() {
            let _ = writer.write_all(line.as_bytes());
            let _ = writer.flush();
        }
    }
}

fn build_filter(directives: &str) -> Filter {
    FilterBuilder::new().parse(directives).build()
}

impl Log for JsonLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        match self.filter.read() {
            Ok(filter) => filter.enabled(metadata),
            Err(poisoned) => poisoned.into_inner().enabled(metadata),
        }
    }

    fn log(&self, record: &Record) {
        let matches = match self.filter.read() {
            Ok(filter) => filter.matches(record),
            Err(poisoned) => poisoned.into_inner().matches(record),
        };
        if !matches {
            return;
        }
        let message = record.args().to_string();
        self.write_line(Severity::from(record.level()), &message);
    }

    fn flush(&self) {
        for sink in [&self.stdout, &self.stderr] {
            if let Ok(mut writer) = sink.lock() {
                let _ = writer.flush();
            }
        }
    }
}
