//! Log records and line formatting

use std::fmt::Write as _;

use chrono::{DateTime, Local};
use crossterm::style::{style, Color, Stylize};

use crate::level::LogLevel;

/// Width the level tag is padded to, so messages line up
pub const LEVEL_TAG_WIDTH: usize = 5;

/// Timestamp layout used when timestamps are enabled
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// How a record is rendered into a line
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LineStyle {
    /// Wrap the level tag in ANSI color codes
    pub color: bool,
    /// Prefix the line with the local time the record was created
    pub timestamps: bool,
}

impl LineStyle {
    /// Plain text, no color and no timestamp
    pub const PLAIN: LineStyle = LineStyle {
        color: false,
        timestamps: false,
    };

    /// Same style with color turned off, used for buffered lines
    pub fn uncolored(self) -> Self {
        Self {
            color: false,
            ..self
        }
    }
}

/// A single accepted log message with its source location
#[derive(Debug, Clone)]
pub struct LogRecord {
    level: LogLevel,
    message: String,
    file: String,
    line: u32,
    timestamp: Option<DateTime<Local>>,
}

impl LogRecord {
    /// Create a record stamped with the current local time
    pub fn new(
        level: LogLevel,
        message: impl Into<String>,
        file: impl Into<String>,
        line: u32,
    ) -> Self {
        Self {
            level,
            message: message.into(),
            file: file.into(),
            line,
            timestamp: Some(Local::now()),
        }
    }

    /// Create a record without reading the clock
    ///
    /// Formatting such a record never prints a timestamp, even when the
    /// style asks for one.
    pub fn unstamped(
        level: LogLevel,
        message: impl Into<String>,
        file: impl Into<String>,
        line: u32,
    ) -> Self {
        Self {
            level,
            message: message.into(),
            file: file.into(),
            line,
            timestamp: None,
        }
    }

    pub fn level(&self) -> LogLevel {
        self.level
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn file(&self) -> &str {
        &self.file
    }

    pub fn line(&self) -> u32 {
        self.line
    }

    pub fn timestamp(&self) -> Option<DateTime<Local>> {
        self.timestamp
    }

    /// Render as `[LEVEL] [file:line] message`
    ///
    /// The level tag is left-aligned to [`LEVEL_TAG_WIDTH`] before any color
    /// codes are applied, so colored and plain lines have the same layout.
    pub fn format(&self, line_style: LineStyle) -> String {
        let mut out = String::with_capacity(self.message.len() + self.file.len() + 32);

        if let (true, Some(timestamp)) = (line_style.timestamps, self.timestamp) {
            let _ = write!(out, "{} ", timestamp.format(TIMESTAMP_FORMAT));
        }

        let tag = format!("{:<width$}", self.level.as_str(), width = LEVEL_TAG_WIDTH);
        if line_style.color {
            let colored = style(tag).with(level_color(self.level)).bold();
            let _ = write!(out, "[{}]", colored);
        } else {
            let _ = write!(out, "[{}]", tag);
        }

        let _ = write!(out, " [{}:{}] {}", self.file, self.line, self.message);
        out
    }
}

/// Console color for each level
pub fn level_color(level: LogLevel) -> Color {
    match level {
        LogLevel::Error => Color::Red,
        LogLevel::Warn => Color::Yellow,
        LogLevel::Info => Color::Blue,
        LogLevel::Debug => Color::Black,
    }
}
