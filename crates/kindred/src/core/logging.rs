//! Logging infrastructure for family organization
//!
//! The organizer and layout engine emit structured `tracing` spans and
//! events but never install a subscriber themselves. Applications call
//! [`init_logging`] once; library callers that want the same information
//! as data pass a [`Diagnostics`](crate::core::Diagnostics) collector instead.
//!
//! # Usage
//!
//! ```rust,no_run
//! use kindred::core::logging::init_logging;
//!
//! // Initialize with default settings
//! init_logging(None, None).ok();
//!
//! // Or with custom level and format
//! init_logging(Some("debug"), Some("pretty")).ok();
//! ```
//!
//! # Log Formats
//!
//! - `compact`: Single-line format, good for production
//! - `pretty`: Multi-line format with colors, good for development
//! - `json`: JSON format, good for log aggregation systems
//!
//! # Environment Variables
//!
//! - `KINDRED_LOG_LEVEL`: Set log level (trace|debug|info|warn|error)
//! - `RUST_LOG`: Alternative way to set log level (tracing-subscriber standard)
//! - `KINDRED_LOG_FORMAT`: Set log format (compact|pretty|json)
//!
//! # Filtering Logs
//!
//! ```bash
//! # Only resolver decisions
//! RUST_LOG="kindred::organizer::resolver=debug" kindred organize -i family.json
//!
//! # Everything at info, layout at trace
//! RUST_LOG="info,kindred::tree::layout=trace" kindred layout -i family.json
//! ```

use std::str::FromStr;

#[cfg(not(target_arch = "wasm32"))]
use tracing::Subscriber;
#[cfg(not(target_arch = "wasm32"))]
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    registry::LookupSpan,
    util::SubscriberInitExt,
    EnvFilter, Layer, Registry,
};

#[cfg(target_arch = "wasm32")]
use tracing_wasm::WASMLayerConfig;

/// Log format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Compact single-line format
    Compact,
    /// Pretty multi-line format with colors
    Pretty,
    /// JSON format for log aggregation
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "compact" => Ok(LogFormat::Compact),
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            _ => Err(format!("Unknown log format: {}", s)),
        }
    }
}

impl LogFormat {
    /// Get all valid format names
    pub fn variants() -> &'static [&'static str] {
        &["compact", "pretty", "json"]
    }
}

#[cfg(not(target_arch = "wasm32"))]
const LEVEL_ENV: &str = "KINDRED_LOG_LEVEL";
#[cfg(not(target_arch = "wasm32"))]
const FORMAT_ENV: &str = "KINDRED_LOG_FORMAT";
#[cfg(not(target_arch = "wasm32"))]
const DEFAULT_LEVEL: &str = "info";

/// Initialize the tracing subscriber with the given log level and format
///
/// An explicit `level` is a full filter directive (`debug`,
/// `warn,kindred::organizer=trace`, `off`). Without one, `KINDRED_LOG_LEVEL`
/// then `RUST_LOG` are consulted, falling back to `info`. Without a
/// `format`, `KINDRED_LOG_FORMAT` is consulted, falling back to `compact`.
///
/// Returns an error if the format is unknown or a global subscriber is
/// already installed.
pub fn init_logging(
    level: Option<&str>,
    format: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    #[cfg(target_arch = "wasm32")]
    {
        // tracing-wasm logs to the browser console and has no level filter
        let _ = (level, format);
        tracing_wasm::set_as_global_default_with_config(WASMLayerConfig::default());
        Ok(())
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        let requested = format
            .map(str::to_string)
            .or_else(|| std::env::var(FORMAT_ENV).ok());
        let format = match requested {
            Some(name) => {
                LogFormat::from_str(&name).map_err(|e| format!("Invalid log format: {}", e))?
            }
            None => LogFormat::Compact,
        };

        // Logs go to stderr so JSON on stdout stays clean
        Registry::default()
            .with(env_filter(level))
            .with(format_layer(format))
            .try_init()?;
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn env_filter(level: Option<&str>) -> EnvFilter {
    let directive = level
        .map(str::to_string)
        .or_else(|| std::env::var(LEVEL_ENV).ok())
        .or_else(|| std::env::var("RUST_LOG").ok())
        .unwrap_or_else(|| DEFAULT_LEVEL.to_string());
    EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LEVEL))
}

/// Stderr fmt layer for one output format. Compact stays terse for
/// terminals; pretty and json carry source locations and span activity.
#[cfg(not(target_arch = "wasm32"))]
fn format_layer<S>(format: LogFormat) -> Box<dyn Layer<S> + Send + Sync>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    let layer = fmt::layer().with_writer(std::io::stderr).with_level(true);
    match format {
        LogFormat::Compact => layer
            .compact()
            .with_target(false)
            .with_span_events(FmtSpan::NONE)
            .boxed(),
        LogFormat::Pretty => layer
            .pretty()
            .with_file(true)
            .with_line_number(true)
            .with_span_events(FmtSpan::ACTIVE)
            .boxed(),
        LogFormat::Json => layer
            .json()
            .with_file(true)
            .with_line_number(true)
            .with_current_span(true)
            .with_span_events(FmtSpan::ACTIVE)
            .boxed(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_parsing() {
        assert_eq!(LogFormat::from_str("compact").unwrap(), LogFormat::Compact);
        assert_eq!(LogFormat::from_str("pretty").unwrap(), LogFormat::Pretty);
        assert_eq!(LogFormat::from_str("json").unwrap(), LogFormat::Json);
        assert_eq!(LogFormat::from_str("JSON").unwrap(), LogFormat::Json);
        assert!(LogFormat::from_str("yaml").is_err());
    }

    #[test]
    fn test_explicit_level_is_used_as_directive() {
        let filter = env_filter(Some("warn,kindred::organizer=trace"));
        let rendered = filter.to_string();
        assert!(rendered.contains("kindred::organizer=trace"));
        assert!(rendered.contains("warn"));
    }

    #[test]
    fn test_every_format_builds_a_layer() {
        for name in LogFormat::variants() {
            let format = LogFormat::from_str(name).unwrap();
            let _layer = format_layer::<Registry>(format);
        }
    }

    #[test]
    fn test_log_format_variants() {
        let variants = LogFormat::variants();
        assert_eq!(variants.len(), 3);
        assert!(variants.contains(&"pretty"));
    }
}
