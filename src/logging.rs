//! Tracing subscriber setup.
//!
//! Library code only emits `tracing` events; installing a subscriber is up
//! to the binary (or a test that wants to see the output).

use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::config::LoggingSettings;

/// Install the global subscriber.
///
/// `RUST_LOG` wins over the configured level. Output goes to stderr so
/// command output on stdout stays clean. Fails if a global subscriber is
/// already installed.
pub fn init_logging(settings: &LoggingSettings) -> Result<(), TryInitError> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.level));

    let fmt_layer = if settings.json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
}
