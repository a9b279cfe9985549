//! A small colored logger for the `log` crate.
//!
//! [`ColorLogger`] prints one line per record: an optional local timestamp,
//! the level tag colored with a CSS named color, the target, and the
//! message. Lines are built with this crate's own [`Formatter`] and escape
//! emitter, so the logger doubles as a consumer of both.

use std::io::{self, Write};
use std::sync::{Mutex, MutexGuard, PoisonError};

use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use time::{OffsetDateTime, format_description::OwnedFormatItem};

use crate::ansi::{RESET, fg_css};
use crate::encoding::Narrow;
use crate::format::{Arg, FormatError, Formatter};
use crate::terminal;

type Sink = Box<dyn Write + Send>;

/// Logger for the `log` facade with true-color level tags.
///
/// Output goes to stderr unless another writer is supplied with
/// [`ColorLogger::with_writer`]. Writes are serialized by an internal
/// mutex; a poisoned mutex is recovered.
pub struct ColorLogger {
    level: LevelFilter,
    show_time: bool,
    show_target: bool,
    color: bool,
    time_format: OwnedFormatItem,
    sink: Mutex<Sink>,
}

impl Default for ColorLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl ColorLogger {
    /// Create a logger writing to stderr.
    ///
    /// Colors are on when [`terminal::stderr_wants_color`] says so.
    #[must_use]
    pub fn new() -> Self {
        let color = terminal::stderr_wants_color();
        Self::build(Box::new(io::stderr()), color)
    }

    /// Create a logger writing to `writer`, with colors off.
    #[must_use]
    pub fn with_writer<W: Write + Send + 'static>(writer: W) -> Self {
        Self::build(Box::new(writer), false)
    }

    fn build(sink: Sink, color: bool) -> Self {
        let time_format = time::format_description::parse_owned::<2>("[hour]:[minute]:[second]")
            .unwrap_or_else(|_| OwnedFormatItem::Literal(Vec::<u8>::new().into_boxed_slice()));
        Self {
            level: LevelFilter::Info,
            show_time: true,
            show_target: true,
            color,
            time_format,
            sink: Mutex::new(sink),
        }
    }

    /// Set the minimum log level.
    #[must_use]
    pub fn level(mut self, level: LevelFilter) -> Self {
        self.level = level;
        self
    }

    /// Enable or disable timestamps.
    #[must_use]
    pub fn show_time(mut self, show: bool) -> Self {
        self.show_time = show;
        self
    }

    /// Enable or disable the target column.
    #[must_use]
    pub fn show_target(mut self, show: bool) -> Self {
        self.show_target = show;
        self
    }

    /// Force colored level tags on or off.
    #[must_use]
    pub fn color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// Override the timestamp format (a `time` format description).
    ///
    /// An invalid description keeps the current format.
    #[must_use]
    pub fn time_format(mut self, format: &str) -> Self {
        if let Ok(parsed) = time::format_description::parse_owned::<2>(format) {
            self.time_format = parsed;
        }
        self
    }

    /// Install as the global logger.
    ///
    /// # Errors
    ///
    /// Fails if a global logger is already set.
    pub fn init(self) -> Result<(), SetLoggerError> {
        log::set_max_level(self.level);
        log::set_boxed_logger(Box::new(self))
    }

    fn format_time(&self) -> String {
        let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
        now.format(&self.time_format).unwrap_or_else(|_| now.to_string())
    }

    /// CSS color name used for a level tag.
    #[must_use]
    pub const fn level_color(level: Level) -> &'static str {
        match level {
            Level::Trace => "gray",
            Level::Debug => "steelblue",
            Level::Info => "mediumseagreen",
            Level::Warn => "gold",
            Level::Error => "crimson",
        }
    }

    fn format_record(&self, record: &Record<'_>) -> Result<String, FormatError> {
        let formatter = Formatter::<Narrow>::new();
        let time = if self.show_time {
            self.format_time() + " "
        } else {
            String::new()
        };
        let (open, close) = if self.color {
            (fg_css(Self::level_color(record.level())).to_string(), RESET)
        } else {
            (String::new(), "")
        };
        let target = if self.show_target {
            format!("{}: ", record.target())
        } else {
            String::new()
        };
        let message = record.args().to_string();
        formatter.format_to_string(
            Some(b"%s%s%-5s%s %s%s\n"),
            &[
                Arg::from(&time),
                Arg::from(&open),
                Arg::from(record.level().as_str()),
                Arg::from(close),
                Arg::from(&target),
                Arg::from(&message),
            ],
        )
    }

    fn sink(&self) -> MutexGuard<'_, Sink> {
        self.sink.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Log for ColorLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        // Formatted before locking: a rejection may log through this logger.
        let Ok(line) = self.format_record(record) else {
            return;
        };
        let _ = self.sink().write_all(line.as_bytes());
    }

    fn flush(&self) {
        let _ = self.sink().flush();
    }
}
