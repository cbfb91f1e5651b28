//! Unified logging for debug output.
//!
//! Provides timestamped, per-module configurable logging via `tracing`.
//! `RUST_LOG` overrides the configured level when set.

use std::sync::Once;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

static INIT: Once = Once::new();

/// Initialize logging with configuration. Safe to call multiple times;
/// only the first call takes effect.
pub fn init_with_config(config: &LoggingConfig) {
    INIT.call_once(|| {
        let filter = if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            let mut directive = config.default.clone();
            for (module, level) in &config.modules {
                directive.push_str(&format!(",{module}={level}"));
            }
            EnvFilter::try_new(directive).unwrap_or_else(|_| EnvFilter::new("warn"))
        };

        let fmt_layer = tracing_subscriber::fmt::layer().with_target(true);

        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .try_init();
    });
}
