//! ringlog - embeddable leveled logging with a bounded ring buffer
//!
//! Messages are filtered by level, formatted with their source location and
//! kept in a fixed-size ring buffer that can be dumped on demand. A logger can
//! also print every accepted message immediately. One logger may be installed
//! as the process-wide sink, reachable through the free functions in
//! [`registry`] and the `log_*!` macros.
//!
//! ```no_run
//! use ringlog::{log_info, registry, LogLevel, Logger, OutputMode};
//!
//! registry::init_logger(Logger::builder().mode(OutputMode::Buffered).build());
//! registry::set_log_level(LogLevel::Debug);
//! log_info!("listening on port {}", 8080);
//! registry::dump_log();
//! ```

pub mod bridge;
pub mod buffer;
pub mod config;
pub mod error;
pub mod level;
pub mod logger;
mod macros;
pub mod record;
pub mod registry;

#[cfg(test)]
mod test_support;

pub use bridge::RegistryLayer;
pub use buffer::RingBuffer;
pub use config::LoggerConfig;
pub use error::{BufferError, ConfigError};
pub use level::{should_emit, LogLevel};
pub use logger::{Log, Logger, LoggerBuilder, OutputMode};
pub use record::{LineStyle, LogRecord};

/// `tracing` target for the crate's own diagnostics
pub const INTERNAL_TARGET: &str = "ringlog::internal";
