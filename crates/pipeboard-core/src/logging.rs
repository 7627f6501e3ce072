#![forbid(unsafe_code)]

//! Structured logging setup.
//!
//! The engine always emits `tracing` events; installing a subscriber is the
//! embedding application's choice. With the `tracing-json` feature this module
//! offers two ready-made subscribers:
//!
//! - [`init_json`]: one JSON object per line, for production log shipping.
//! - [`init_pretty`]: human-readable output for local runs.
//!
//! Both honour `PIPEBOARD_LOG` (an `EnvFilter` directive) and fall back to
//! the `default_filter` argument.
//!
//! # Event targets
//!
//! | Target | Level | Emitted when |
//! |--------|-------|--------------|
//! | `pipeboard::drag` | DEBUG | start / hover / skipped transitions |
//! | `pipeboard::drag` | INFO | a commit was dispatched |
//! | `pipeboard::drag` | WARN | a source or target could not be resolved |
//!
//! The harness crate adds `pipeboard::store` (mutations applied or rejected
//! by the in-memory store) and `pipeboard::replay` (replay summaries).

/// Tracing target used by the drag controller.
pub const DRAG_TARGET: &str = "pipeboard::drag";

/// Environment variable consulted for the filter directive.
pub const LOG_ENV: &str = "PIPEBOARD_LOG";

#[cfg(feature = "tracing-json")]
pub use init::{InitError, init_json, init_pretty};

#[cfg(feature = "tracing-json")]
mod init {
    use tracing_subscriber::EnvFilter;

    use super::LOG_ENV;

    /// Failure to install the global subscriber.
    pub type InitError = Box<dyn std::error::Error + Send + Sync + 'static>;

    fn filter(default_filter: &str) -> Result<EnvFilter, InitError> {
        match std::env::var(LOG_ENV) {
            Ok(directive) if !directive.trim().is_empty() => Ok(EnvFilter::try_new(directive)?),
            _ => Ok(EnvFilter::try_new(default_filter)?),
        }
    }

    /// Install a JSON-lines subscriber writing to stderr.
    pub fn init_json(default_filter: &str) -> Result<(), InitError> {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter(default_filter)?)
            .with_writer(std::io::stderr)
            .try_init()
    }

    /// Install a human-readable subscriber writing to stderr.
    pub fn init_pretty(default_filter: &str) -> Result<(), InitError> {
        tracing_subscriber::fmt()
            .with_env_filter(filter(default_filter)?)
            .with_writer(std::io::stderr)
            .try_init()
    }
}
