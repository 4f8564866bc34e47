//! Logging setup for Sift.
//!
//! Sift logs through `tracing`. Installing a subscriber is optional and
//! controlled by environment variables:
//!
//! - `SIFT_DEBUG=true|1|yes` - Enable debug logging
//! - `SIFT_LOG_LEVEL=trace|debug|info|warn|error` - Set a specific level
//! - `SIFT_LOG_FORMAT=json|pretty|compact` - Output format (default: json)
//!
//! ```rust,no_run
//! use sift_query::logging;
//!
//! // Call once at startup; later calls are no-ops.
//! logging::init();
//! ```
//!
//! The subscriber is only available with the `tracing-subscriber` feature.
//! Without it these functions do nothing and the application is free to
//! install its own subscriber.

use std::env;
use std::sync::Once;

use crate::config::LoggingConfig;

static INIT: Once = Once::new();

/// Check if debug logging is enabled via `SIFT_DEBUG`.
#[inline]
pub fn is_debug_enabled() -> bool {
    env::var("SIFT_DEBUG")
        .map(|v| matches!(v.to_lowercase().as_str(), "true" | "1" | "yes"))
        .unwrap_or(false)
}

fn normalize_level(level: &str) -> Option<&'static str> {
    match level.to_lowercase().as_str() {
        "trace" => Some("trace"),
        "debug" => Some("debug"),
        "info" => Some("info"),
        "warn" => Some("warn"),
        "error" => Some("error"),
        _ => None,
    }
}

fn normalize_format(format: &str) -> &'static str {
    match format.to_lowercase().as_str() {
        "pretty" => "pretty",
        "compact" => "compact",
        _ => "json",
    }
}

/// The log level from `SIFT_LOG_LEVEL`.
///
/// Defaults to "debug" if `SIFT_DEBUG` is enabled, otherwise "warn".
pub fn get_log_level() -> &'static str {
    env::var("SIFT_LOG_LEVEL")
        .ok()
        .and_then(|level| normalize_level(&level))
        .unwrap_or(if is_debug_enabled() { "debug" } else { "warn" })
}

/// The log format from `SIFT_LOG_FORMAT`. Defaults to "json".
pub fn get_log_format() -> &'static str {
    env::var("SIFT_LOG_FORMAT")
        .map(|f| normalize_format(&f))
        .unwrap_or("json")
}

/// Initialize logging from the environment.
///
/// Does nothing unless `SIFT_DEBUG` or `SIFT_LOG_LEVEL` is set.
pub fn init() {
    if !is_debug_enabled() && env::var("SIFT_LOG_LEVEL").is_err() {
        return;
    }
    install(get_log_level(), get_log_format());
}

/// Initialize logging from the `[logging]` section of a configuration.
///
/// `SIFT_LOG_LEVEL` and `SIFT_LOG_FORMAT` still take precedence.
pub fn init_from_config(config: &LoggingConfig) {
    let level = env::var("SIFT_LOG_LEVEL")
        .ok()
        .and_then(|level| normalize_level(&level))
        .or_else(|| normalize_level(&config.level))
        .unwrap_or("warn");
    let format = env::var("SIFT_LOG_FORMAT")
        .map(|f| normalize_format(&f))
        .unwrap_or_else(|_| normalize_format(&config.format));
    install(level, format);
}

/// Initialize logging at a specific level, using the environment's format.
pub fn init_with_level(level: &str) {
    install(normalize_level(level).unwrap_or("warn"), get_log_format());
}

#[cfg_attr(not(feature = "tracing-subscriber"), allow(unused_variables))]
fn install(level: &'static str, format: &'static str) {
    INIT.call_once(|| {
        #[cfg(feature = "tracing-subscriber")]
        {
            use tracing_subscriber::{EnvFilter, fmt, prelude::*};

            let filter = EnvFilter::try_new(format!(
                "sift={},sift_query={},sift_memory={}",
                level, level, level
            ))
            .unwrap_or_else(|_| EnvFilter::new("warn"));

            let registry = tracing_subscriber::registry().with(filter);
            let installed = match format {
                "json" => registry.with(fmt::layer().json()).try_init(),
                "compact" => registry.with(fmt::layer().compact()).try_init(),
                _ => registry.with(fmt::layer().pretty()).try_init(),
            };

            match installed {
                Ok(()) => tracing::info!(level, format, "Sift logging initialized"),
                Err(e) => eprintln!("sift: a global tracing subscriber is already set: {}", e),
            }
        }
    });
}
