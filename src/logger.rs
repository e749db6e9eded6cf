//! The logging capability trait and the default logger
//!
//! [`Logger`] covers both ways of running: in [`OutputMode::Direct`] every
//! accepted message is stored in the ring buffer and printed immediately, in
//! [`OutputMode::Buffered`] it is only stored and shows up on the next dump.

use std::fmt;
use std::io::{self, Write};
use std::str::FromStr;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};

use crate::buffer::{RingBuffer, DEFAULT_CAPACITY, DEFAULT_SLACK};
use crate::config::LoggerConfig;
use crate::error::{BufferError, ConfigError};
use crate::level::{should_emit, LogLevel};
use crate::record::{LineStyle, LogRecord};

/// Anything that can act as the process-wide logger
pub trait Log: Send + Sync {
    /// Handle one message at `level`
    fn log(&self, level: LogLevel, msg: &str, file: &str, line: u32);

    /// Change the most verbose level that is let through
    fn set_log_level(&self, level: LogLevel);

    /// Current level threshold
    fn log_level(&self) -> LogLevel;

    /// Flush buffered lines to the console
    fn dump(&self);

    /// Adjust the number of buffered lines, for loggers that buffer
    fn set_max_buff(&self, _capacity: usize) -> Result<(), BufferError> {
        Ok(())
    }

    fn debug(&self, msg: &str, file: &str, line: u32) {
        self.log(LogLevel::Debug, msg, file, line);
    }

    fn info(&self, msg: &str, file: &str, line: u32) {
        self.log(LogLevel::Info, msg, file, line);
    }

    fn warn(&self, msg: &str, file: &str, line: u32) {
        self.log(LogLevel::Warn, msg, file, line);
    }

    fn error(&self, msg: &str, file: &str, line: u32) {
        self.log(LogLevel::Error, msg, file, line);
    }
}

/// Where accepted messages go
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// Store in the ring buffer and print right away
    #[default]
    Direct,
    /// Store in the ring buffer only; output happens on dump
    Buffered,
}

impl fmt::Display for OutputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputMode::Direct => f.write_str("direct"),
            OutputMode::Buffered => f.write_str("buffered"),
        }
    }
}

impl FromStr for OutputMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "direct" => Ok(OutputMode::Direct),
            "buffered" => Ok(OutputMode::Buffered),
            _ => Err(ConfigError::UnknownMode(s.to_string())),
        }
    }
}

/// Output streams a logger prints to
struct Console {
    out: Box<dyn Write + Send>,
    err: Box<dyn Write + Send>,
}

impl Console {
    fn stdio() -> Self {
        Self {
            out: Box::new(io::stdout()),
            err: Box::new(io::stderr()),
        }
    }
}

/// Level-gated logger backed by a ring buffer
pub struct Logger {
    level: AtomicU8,
    mode: OutputMode,
    line_style: LineStyle,
    buffer: RingBuffer,
    /// Held for the duration of a single console write
    console: Mutex<Console>,
}

impl Logger {
    /// Direct-print logger at `Info` with the default buffer size
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Direct-print logger that lets everything through
    pub fn verbose() -> Self {
        Self::builder().level(LogLevel::Debug).build()
    }

    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::default()
    }

    /// Build a logger from loaded configuration
    pub fn from_config(config: &LoggerConfig) -> Self {
        Self::builder()
            .level(config.level)
            .mode(config.mode)
            .capacity(config.capacity)
            .slack(config.slack)
            .color(config.color)
            .timestamps(config.timestamps)
            .build()
    }

    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    /// The ring buffer holding accepted lines
    pub fn buffer(&self) -> &RingBuffer {
        &self.buffer
    }

    /// Write buffered lines to `sink` and return how many were written
    pub fn dump_to<W: Write + ?Sized>(&self, sink: &mut W) -> io::Result<usize> {
        self.buffer.drain(sink)
    }

    fn emit(&self, record: &LogRecord) {
        let plain = record.format(self.line_style.uncolored());

        if self.mode == OutputMode::Direct {
            let console_line = if self.line_style.color {
                record.format(self.line_style)
            } else {
                plain.clone()
            };
            self.print(record.level(), console_line);
        }

        self.buffer.write(plain);
    }

    fn print(&self, level: LogLevel, mut line: String) {
        line.push('\n');
        let mut console = self.console.lock().unwrap_or_else(PoisonError::into_inner);
        let stream = if level == LogLevel::Error {
            &mut console.err
        } else {
            &mut console.out
        };
        let _ = stream.write_all(line.as_bytes());
        let _ = stream.flush();
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

impl Log for Logger {
    fn log(&self, level: LogLevel, msg: &str, file: &str, line: u32) {
        if !should_emit(self.log_level(), level) {
            return;
        }
        let record = if self.line_style.timestamps {
            LogRecord::new(level, msg, file, line)
        } else {
            LogRecord::unstamped(level, msg, file, line)
        };
        self.emit(&record);
    }

    fn set_log_level(&self, level: LogLevel) {
        self.level.store(level.ordinal(), Ordering::Relaxed);
    }

    fn log_level(&self) -> LogLevel {
        LogLevel::from_ordinal(self.level.load(Ordering::Relaxed)).unwrap_or_default()
    }

    fn dump(&self) {
        let mut console = self.console.lock().unwrap_or_else(PoisonError::into_inner);
        let _ = self.buffer.drain(&mut console.out);
    }

    fn set_max_buff(&self, capacity: usize) -> Result<(), BufferError> {
        self.buffer.configure_capacity(capacity)
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("level", &self.log_level())
            .field("mode", &self.mode)
            .field("line_style", &self.line_style)
            .field("buffer", &self.buffer)
            .finish()
    }
}

/// Step-by-step construction of a [`Logger`]
pub struct LoggerBuilder {
    level: LogLevel,
    mode: OutputMode,
    capacity: usize,
    slack: usize,
    line_style: LineStyle,
    console: Option<Console>,
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            mode: OutputMode::Direct,
            capacity: DEFAULT_CAPACITY,
            slack: DEFAULT_SLACK,
            line_style: LineStyle {
                color: true,
                timestamps: false,
            },
            console: None,
        }
    }
}

impl LoggerBuilder {
    pub fn level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    pub fn mode(mut self, mode: OutputMode) -> Self {
        self.mode = mode;
        self
    }

    /// Number of lines kept in the ring buffer (zero is raised to one)
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn slack(mut self, slack: usize) -> Self {
        self.slack = slack;
        self
    }

    /// Color the level tag on console lines
    pub fn color(mut self, color: bool) -> Self {
        self.line_style.color = color;
        self
    }

    pub fn timestamps(mut self, timestamps: bool) -> Self {
        self.line_style.timestamps = timestamps;
        self
    }

    /// Print to the given streams instead of stdout and stderr
    pub fn console<O, E>(mut self, out: O, err: E) -> Self
    where
        O: Write + Send + 'static,
        E: Write + Send + 'static,
    {
        self.console = Some(Console {
            out: Box::new(out),
            err: Box::new(err),
        });
        self
    }

    pub fn build(self) -> Logger {
        Logger {
            level: AtomicU8::new(self.level.ordinal()),
            mode: self.mode,
            line_style: self.line_style,
            buffer: RingBuffer::with_slack(self.capacity, self.slack),
            console: Mutex::new(self.console.unwrap_or_else(Console::stdio)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::SharedBuf;
    use std::sync::Arc;
    use std::thread;

    fn capture(mode: OutputMode, level: LogLevel) -> (Logger, SharedBuf, SharedBuf) {
        let out = SharedBuf::new();
        let err = SharedBuf::new();
        let logger = Logger::builder()
            .level(level)
            .mode(mode)
            .color(false)
            .console(out.clone(), err.clone())
            .build();
        (logger, out, err)
    }

    fn log_all_levels(logger: &Logger) {
        logger.debug("debug message", "test.rs", 1);
        logger.info("info message", "test.rs", 2);
        logger.warn("warn message", "test.rs", 3);
        logger.error("error message", "test.rs", 4);
    }

    #[test]
    fn test_default_levels() {
        assert_eq!(Logger::new().log_level(), LogLevel::Info);
        assert_eq!(Logger::verbose().log_level(), LogLevel::Debug);
        assert_eq!(Logger::new().mode(), OutputMode::Direct);
    }

    #[test]
    fn test_direct_error_level_emits_one_line() {
        let (logger, out, err) = capture(OutputMode::Direct, LogLevel::Debug);
        logger.set_log_level(LogLevel::Error);
        log_all_levels(&logger);

        assert!(out.contents().is_empty());
        assert_eq!(err.lines(), vec!["[ERROR] [test.rs:4] error message"]);
        assert_eq!(logger.buffer().len(), 1);
    }

    #[test]
    fn test_buffered_error_level_stores_one_line() {
        let (logger, out, err) = capture(OutputMode::Buffered, LogLevel::Error);
        log_all_levels(&logger);

        assert!(out.contents().is_empty());
        assert!(err.contents().is_empty());
        assert_eq!(logger.buffer().recent(), vec!["[ERROR] [test.rs:4] error message"]);
    }

    #[test]
    fn test_direct_routes_streams() {
        let (logger, out, err) = capture(OutputMode::Direct, LogLevel::Debug);
        log_all_levels(&logger);

        assert_eq!(
            out.lines(),
            vec![
                "[DEBUG] [test.rs:1] debug message",
                "[INFO ] [test.rs:2] info message",
                "[WARN ] [test.rs:3] warn message",
            ]
        );
        assert_eq!(err.lines(), vec!["[ERROR] [test.rs:4] error message"]);
    }

    #[test]
    fn test_filtered_messages_leave_no_trace() {
        let (logger, out, err) = capture(OutputMode::Direct, LogLevel::Warn);
        logger.debug("hidden", "a.rs", 1);
        logger.info("hidden", "a.rs", 2);

        assert!(out.contents().is_empty());
        assert!(err.contents().is_empty());
        assert!(logger.buffer().is_empty());
    }

    #[test]
    fn test_set_log_level_applies_to_later_calls() {
        let (logger, _out, _err) = capture(OutputMode::Buffered, LogLevel::Info);
        logger.debug("before", "a.rs", 1);
        logger.set_log_level(LogLevel::Debug);
        logger.debug("after", "a.rs", 2);

        assert_eq!(logger.buffer().recent(), vec!["[DEBUG] [a.rs:2] after"]);
    }

    #[test]
    fn test_dump_is_repeatable() {
        let (logger, out, _err) = capture(OutputMode::Buffered, LogLevel::Debug);
        logger.info("one", "a.rs", 1);
        logger.warn("two", "a.rs", 2);

        logger.dump();
        let first = out.contents();
        logger.dump();
        let both = out.contents();

        assert_eq!(first, "[INFO ] [a.rs:1] one\n[WARN ] [a.rs:2] two\n");
        assert_eq!(both, format!("{}{}", first, first));
    }

    #[test]
    fn test_dump_to_sink() {
        let (logger, _out, _err) = capture(OutputMode::Buffered, LogLevel::Info);
        logger.info("kept", "a.rs", 1);

        let mut sink = Vec::new();
        assert_eq!(logger.dump_to(&mut sink).unwrap(), 1);
        assert_eq!(String::from_utf8(sink).unwrap(), "[INFO ] [a.rs:1] kept\n");
    }

    #[test]
    fn test_buffer_stores_uncolored_lines() {
        let out = SharedBuf::new();
        let err = SharedBuf::new();
        let logger = Logger::builder()
            .color(true)
            .console(out.clone(), err.clone())
            .build();
        logger.info("colored", "c.rs", 5);

        assert_eq!(logger.buffer().recent(), vec!["[INFO ] [c.rs:5] colored"]);
        assert!(out.contents().contains("c.rs:5] colored"));
    }

    #[test]
    fn test_set_max_buff() {
        let logger = Logger::builder().capacity(2).mode(OutputMode::Buffered).build();
        assert!(logger.set_max_buff(4).is_ok());
        assert_eq!(logger.buffer().capacity(), 4);
        assert_eq!(
            logger.set_max_buff(1),
            Err(BufferError::Shrink {
                current: 4,
                requested: 1
            })
        );
    }

    #[test]
    fn test_from_config() {
        let config = LoggerConfig {
            level: LogLevel::Warn,
            mode: OutputMode::Buffered,
            capacity: 16,
            slack: 4,
            color: false,
            timestamps: false,
        };
        let logger = Logger::from_config(&config);
        assert_eq!(logger.log_level(), LogLevel::Warn);
        assert_eq!(logger.mode(), OutputMode::Buffered);
        assert_eq!(logger.buffer().capacity(), 16);
        assert_eq!(logger.buffer().backing_len(), 20);
    }

    #[test]
    fn test_timestamps_only_when_enabled() {
        let stamped = Logger::builder()
            .mode(OutputMode::Buffered)
            .color(false)
            .timestamps(true)
            .build();
        stamped.info("stamped", "t.rs", 1);
        let lines = stamped.buffer().recent();
        assert_eq!(lines.len(), 1);
        assert!(lines[0][..4].chars().all(|c| c.is_ascii_digit()));
        assert!(lines[0].ends_with(" [INFO ] [t.rs:1] stamped"));

        let plain = Logger::builder()
            .mode(OutputMode::Buffered)
            .color(false)
            .timestamps(false)
            .build();
        plain.info("plain", "t.rs", 2);
        assert_eq!(plain.buffer().recent(), vec!["[INFO ] [t.rs:2] plain"]);
    }

    #[test]
    fn test_parse_output_mode() {
        assert_eq!("Direct".parse::<OutputMode>().unwrap(), OutputMode::Direct);
        assert_eq!("buffered".parse::<OutputMode>().unwrap(), OutputMode::Buffered);
        assert!("async".parse::<OutputMode>().is_err());
    }

    #[test]
    fn test_concurrent_direct_lines_are_whole() {
        let (logger, out, _err) = capture(OutputMode::Direct, LogLevel::Debug);
        let logger = Arc::new(logger);

        let handles: Vec<_> = (0..8)
            .map(|t| {
                let logger = Arc::clone(&logger);
                thread::spawn(move || {
                    for m in 0..200 {
                        logger.info(&format!("thread {} message {}", t, m), "worker.rs", 10);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let mut lines = out.lines();
        lines.sort();
        let mut expected: Vec<String> = (0..8)
            .flat_map(|t| {
                (0..200).map(move |m| format!("[INFO ] [worker.rs:10] thread {} message {}", t, m))
            })
            .collect();
        expected.sort();
        assert_eq!(lines, expected);
    }

    #[test]
    fn test_concurrent_buffered_fills_to_capacity() {
        let (logger, _out, _err) = capture(OutputMode::Buffered, LogLevel::Debug);
        let logger = Arc::new(logger);
        logger.set_max_buff(1000).unwrap();

        let handles: Vec<_> = (0..4)
            .map(|t| {
                let logger = Arc::clone(&logger);
                thread::spawn(move || {
                    for m in 0..500 {
                        logger.debug(&format!("{} {}", t, m), "worker.rs", 1);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(logger.buffer().write_count(), 2000);
        assert_eq!(logger.buffer().len(), 1000);
    }
}
