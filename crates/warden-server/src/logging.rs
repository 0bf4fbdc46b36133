//! Tracing subscriber setup.
//!
//! `LOG_FORMAT=json` selects JSON output for log aggregation; anything
//! else gives human-readable text. `RUST_LOG` controls filtering and
//! defaults to `warden=info`.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Matches every `warden_*` crate by target prefix.
const DEFAULT_FILTER: &str = "warden=info,tower_http=info";

pub fn init_logging() {
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_default();
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    if log_format.eq_ignore_ascii_case("json") {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_target(true)
                    .flatten_event(true),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_target(true))
            .init();
    }
}
