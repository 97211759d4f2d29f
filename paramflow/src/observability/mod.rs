//! Tracing setup and timing helpers.
//!
//! The engine logs through `tracing` and never installs a subscriber on its
//! own; binaries and tests call [`init_tracing`] (or bring their own).

mod timer;

pub use timer::SpanTimer;

use tracing_subscriber::EnvFilter;

/// Output format of the installed subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

fn env_filter(default_filter: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter))
}

/// Installs a global fmt subscriber.
///
/// `RUST_LOG` takes precedence over `default_filter`. Returns false if a
/// global subscriber was already installed.
pub fn init_tracing(default_filter: &str) -> bool {
    init_tracing_with(default_filter, LogFormat::Pretty)
}

/// Installs a global fmt subscriber with the given output format.
pub fn init_tracing_with(default_filter: &str, format: LogFormat) -> bool {
    let builder = tracing_subscriber::fmt().with_env_filter(env_filter(default_filter));
    let installed = match format {
        LogFormat::Pretty => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    installed.is_ok()
}
