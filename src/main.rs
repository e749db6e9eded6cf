//! ringlog demo
//!
//! Loads the logger configuration, installs a logger as the process-wide
//! sink, logs at every level and dumps the ring buffer.
//!
//! Usage: ringlog-demo [config.toml] [--buffered] [--debug]

use anyhow::{Context, Result};

use ringlog::{
    log_debug, log_error, log_fn, log_info, log_warn, registry, LogLevel, Logger, LoggerConfig,
    OutputMode, RegistryLayer,
};

/// Command line switches layered on top of the loaded configuration
#[derive(Debug, Default, PartialEq, Eq)]
struct DemoArgs {
    config_path: Option<String>,
    buffered: bool,
    debug: bool,
}

impl DemoArgs {
    fn parse(args: impl IntoIterator<Item = String>) -> Self {
        let mut parsed = Self::default();
        for arg in args {
            match arg.as_str() {
                "--buffered" => parsed.buffered = true,
                "--debug" => parsed.debug = true,
                _ if !arg.starts_with("--") && parsed.config_path.is_none() => {
                    parsed.config_path = Some(arg)
                }
                _ => {}
            }
        }
        parsed
    }

    /// Only flags that were given change the configuration
    fn apply(&self, mut config: LoggerConfig) -> LoggerConfig {
        if self.buffered {
            config.mode = OutputMode::Buffered;
        }
        if self.debug {
            config.level = LogLevel::Debug;
        }
        config
    }
}

fn main() -> Result<()> {
    let args = DemoArgs::parse(std::env::args().skip(1));

    let config = match &args.config_path {
        Some(path) => LoggerConfig::load_from(path)?,
        None => LoggerConfig::load()?,
    };
    let config = config
        .apply_env()
        .context("Invalid logger environment override")?;
    let config = args.apply(config);

    // Install the logger BEFORE spawning anything that logs
    registry::init_logger(Logger::from_config(&config));

    if let Err(e) = RegistryLayer::install() {
        log_warn!("tracing bridge not installed: {}", e);
    }

    log_error!("hello logger! this is an error log");
    log_warn!("hello logger! this is a warn log");
    log_info!("hello logger! this is an info log");
    log_debug!("hello logger! this is a debug log");
    tracing::info!(mode = %config.mode, capacity = config.capacity, "hello from tracing");
    log_fn!(LogLevel::Info, "demo finished");

    if config.mode == OutputMode::Buffered {
        registry::dump_log();
    }

    Ok(())
}
