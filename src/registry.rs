//! Process-wide logger slot
//!
//! Holds at most one active [`Log`] implementation so arbitrary call sites can
//! log without carrying a logger around. The slot starts empty; until a
//! logger is installed every free function here is a no-op.
//!
//! Install the logger during startup, before spawning threads that log. A
//! swap racing with logging calls is memory-safe, but which logger sees the
//! messages around the swap is unspecified.

use std::sync::{Arc, PoisonError, RwLock};

use crate::error::BufferError;
use crate::level::LogLevel;
use crate::logger::Log;
use crate::INTERNAL_TARGET;

static ACTIVE_LOGGER: RwLock<Option<Arc<dyn Log>>> = RwLock::new(None);

/// Install `logger` as the active logger, replacing any previous one
pub fn init_logger<L: Log + 'static>(logger: L) {
    init_shared_logger(Arc::new(logger));
}

/// Install an already shared logger as the active logger
///
/// Useful when the caller wants to keep its own handle, e.g. to inspect the
/// buffer of a concrete [`crate::Logger`].
pub fn init_shared_logger(logger: Arc<dyn Log>) {
    let previous = ACTIVE_LOGGER
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .replace(logger);
    if previous.is_some() {
        tracing::debug!(target: INTERNAL_TARGET, "replaced active logger");
    } else {
        tracing::debug!(target: INTERNAL_TARGET, "installed active logger");
    }
}

/// Remove the active logger and return it
pub fn take_logger() -> Option<Arc<dyn Log>> {
    ACTIVE_LOGGER
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .take()
}

/// Handle to the active logger, if any
pub fn active_logger() -> Option<Arc<dyn Log>> {
    ACTIVE_LOGGER
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}

/// Whether a logger is installed
pub fn is_initialized() -> bool {
    ACTIVE_LOGGER
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .is_some()
}

/// Forward a message at `level` to the active logger
pub fn log(level: LogLevel, msg: &str, file: &str, line: u32) {
    if let Some(logger) = active_logger() {
        logger.log(level, msg, file, line);
    }
}

pub fn debug(msg: &str, file: &str, line: u32) {
    if let Some(logger) = active_logger() {
        logger.debug(msg, file, line);
    }
}

pub fn info(msg: &str, file: &str, line: u32) {
    if let Some(logger) = active_logger() {
        logger.info(msg, file, line);
    }
}

pub fn warn(msg: &str, file: &str, line: u32) {
    if let Some(logger) = active_logger() {
        logger.warn(msg, file, line);
    }
}

pub fn error(msg: &str, file: &str, line: u32) {
    if let Some(logger) = active_logger() {
        logger.error(msg, file, line);
    }
}

/// Change the active logger's level threshold
pub fn set_log_level(level: LogLevel) {
    if let Some(logger) = active_logger() {
        logger.set_log_level(level);
    }
}

/// Flush the active logger's buffered lines to the console
pub fn dump_log() {
    if let Some(logger) = active_logger() {
        logger.dump();
    }
}

/// Adjust the active logger's buffer size
///
/// Succeeds without doing anything when no logger is installed.
pub fn set_max_log_buff(capacity: usize) -> Result<(), BufferError> {
    match active_logger() {
        Some(logger) => logger.set_max_buff(capacity),
        None => Ok(()),
    }
}
