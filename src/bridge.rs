//! `tracing` integration
//!
//! Provides a layer that forwards `tracing` events into the process-wide
//! logger, so code instrumented with `tracing` macros ends up in the same
//! ring buffer and console as direct calls.

use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{EnvFilter, Layer};

use crate::level::LogLevel;
use crate::registry;
use crate::INTERNAL_TARGET;

/// File reported for events that carry no source location
const UNKNOWN_FILE: &str = "<unknown>";

/// A `tracing` layer that hands every event to the active logger
#[derive(Debug, Default, Clone, Copy)]
pub struct RegistryLayer;

impl RegistryLayer {
    pub fn new() -> Self {
        Self
    }

    /// Install a subscriber made of this layer as the global default
    ///
    /// Events are pre-filtered with `RUST_LOG` when it is set, and pass
    /// through at every level otherwise; the installed logger still applies
    /// its own threshold.
    ///
    /// # Errors
    ///
    /// Fails if a global default subscriber was already set.
    pub fn install() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "trace".into());
        let subscriber = tracing_subscriber::registry()
            .with(env_filter)
            .with(RegistryLayer::new());
        tracing::subscriber::set_global_default(subscriber)?;
        Ok(())
    }
}

impl<S> Layer<S> for RegistryLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();

        // Our own diagnostics would otherwise feed back into the buffer.
        if metadata.target() == INTERNAL_TARGET {
            return;
        }

        let mut message = String::new();
        event.record(&mut MessageVisitor(&mut message));

        registry::log(
            LogLevel::from(*metadata.level()),
            &message,
            metadata.file().unwrap_or(UNKNOWN_FILE),
            metadata.line().unwrap_or(0),
        );
    }
}

/// Collects the `message` field first, then `name=value` pairs
struct MessageVisitor<'a>(&'a mut String);

impl MessageVisitor<'_> {
    fn push_message(&mut self, message: &str) {
        if self.0.is_empty() {
            self.0.push_str(message);
        } else {
            self.0.insert_str(0, &format!("{} ", message));
        }
    }

    fn push_field(&mut self, name: &str, value: &dyn std::fmt::Display) {
        if !self.0.is_empty() {
            self.0.push(' ');
        }
        self.0.push_str(&format!("{}={}", name, value));
    }
}

impl tracing::field::Visit for MessageVisitor<'_> {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        let rendered = format!("{:?}", value);
        if field.name() == "message" {
            self.push_message(&rendered);
        } else {
            self.push_field(field.name(), &rendered);
        }
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            self.push_message(value);
        } else {
            self.push_field(field.name(), &value);
        }
    }
}
