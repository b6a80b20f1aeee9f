//! Tracing setup for hosts that do not install their own subscriber.
//!
//! Nothing is installed unless `BUNDLER_LOG` (or `RUST_LOG`) is set.
//! `BUNDLER_LOG_FORMAT=json` switches from plain text to one JSON object
//! per event. Output always goes to stderr.
//!
//! ```bash
//! BUNDLER_LOG=debug node build.js
//! BUNDLER_LOG="bundler_native::expand=trace" BUNDLER_LOG_FORMAT=json node build.js
//! ```

use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter, Registry};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl LogFormat {
    fn from_env() -> Self {
        match std::env::var("BUNDLER_LOG_FORMAT")
            .unwrap_or_default()
            .to_lowercase()
            .as_str()
        {
            "json" => Self::Json,
            _ => Self::Text,
        }
    }
}

/// `BUNDLER_LOG` wins over `RUST_LOG` when both are set.
fn build_filter() -> EnvFilter {
    if let Ok(val) = std::env::var("BUNDLER_LOG") {
        EnvFilter::builder().parse_lossy(val)
    } else {
        EnvFilter::from_default_env()
    }
}

/// Installs the global subscriber. Safe to call more than once; only the
/// first successful call has an effect.
pub fn init_tracing() {
    let requested = std::env::var("BUNDLER_LOG").is_ok() || std::env::var("RUST_LOG").is_ok();
    if !requested {
        return;
    }

    let filter = build_filter();
    let result = match LogFormat::from_env() {
        LogFormat::Text => Registry::default()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
            .try_init(),
        LogFormat::Json => Registry::default()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init(),
    };
    // Another subscriber is already installed; keep it.
    let _ = result;
}
