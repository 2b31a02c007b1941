//! Tracing subscriber setup.
//!
//! Structured JSON logging via the bunyan formatter, filtered through
//! `RUST_LOG` with a caller-supplied fallback directive.

use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{EnvFilter, Registry};

/// Install the global tracing subscriber.
///
/// Safe to call more than once; subsequent calls are ignored.
pub fn init_telemetry(name: &str, default_filter: &str) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    let formatting_layer = BunyanFormattingLayer::new(name.to_string(), std::io::stdout);
    let subscriber = Registry::default()
        .with(env_filter)
        .with(JsonStorageLayer)
        .with(formatting_layer);

    let _ = tracing::subscriber::set_global_default(subscriber);
}
