//! Subscriber setup
//!
//! A compact console layer is always installed. With
//! [`LoggingConfig::local_enabled`] a second layer writes flattened JSON
//! events to rolling files under [`LoggingConfig::local_path`].

use crate::config::LoggingConfig;
use crate::domain::{AegisError, Result};
use tracing::level_filters::LevelFilter;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// File name prefix of rotated log files
const LOG_FILE_PREFIX: &str = "aegis.log";

/// Keeps the non-blocking file writer alive; drop it last to flush
#[must_use = "dropping the guard stops file logging"]
pub struct LoggingGuard {
    _file_guard: Option<WorkerGuard>,
}

/// Install the global subscriber
///
/// `RUST_LOG` takes precedence over `level`.
///
/// # Errors
///
/// Returns [`AegisError::Configuration`] for an unknown level or rotation,
/// when the log directory cannot be created, or when a global subscriber is
/// already installed.
///
/// # Example
///
/// ```no_run
/// use aegis::config::LoggingConfig;
/// use aegis::logging::init_logging;
///
/// let _guard = init_logging("info", &LoggingConfig::default())?;
/// # Ok::<(), aegis::AegisError>(())
/// ```
pub fn init_logging(level: &str, config: &LoggingConfig) -> Result<LoggingGuard> {
    let console = tracing_subscriber::fmt::layer()
        .compact()
        .with_target(false)
        .with_filter(crate_filter(level)?);
    let mut layers = vec![console.boxed()];

    let mut file_guard = None;
    if config.local_enabled {
        let rotation = rotation(&config.local_rotation)?;
        std::fs::create_dir_all(&config.local_path).map_err(|e| {
            AegisError::Configuration(format!(
                "Failed to create log directory {}: {e}",
                config.local_path
            ))
        })?;

        let appender = RollingFileAppender::new(rotation, &config.local_path, LOG_FILE_PREFIX);
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let file = tracing_subscriber::fmt::layer()
            .json()
            .flatten_event(true)
            .with_current_span(false)
            .with_writer(writer)
            .with_filter(crate_filter(level)?);
        layers.push(file.boxed());
        file_guard = Some(guard);
    }

    tracing_subscriber::registry()
        .with(layers)
        .try_init()
        .map_err(|e| AegisError::Configuration(format!("Failed to install subscriber: {e}")))?;

    tracing::debug!(
        level,
        file_logging = config.local_enabled,
        "Logging initialized"
    );
    Ok(LoggingGuard {
        _file_guard: file_guard,
    })
}

/// `RUST_LOG` when set, else `aegis=<level>`
fn crate_filter(level: &str) -> Result<EnvFilter> {
    let level = match level.to_ascii_lowercase().as_str() {
        "trace" => LevelFilter::TRACE,
        "debug" => LevelFilter::DEBUG,
        "info" => LevelFilter::INFO,
        "warn" => LevelFilter::WARN,
        "error" => LevelFilter::ERROR,
        _ => {
            return Err(AegisError::Configuration(format!(
                "Invalid log level: {level}"
            )))
        }
    };
    Ok(EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("aegis={level}"))))
}

fn rotation(name: &str) -> Result<Rotation> {
    match name {
        "daily" => Ok(Rotation::DAILY),
        "hourly" => Ok(Rotation::HOURLY),
        other => Err(AegisError::Configuration(format!(
            "Invalid log rotation: {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levels_are_case_insensitive() {
        for level in ["trace", "DEBUG", "Info", "warn", "error"] {
            assert!(crate_filter(level).is_ok(), "{level}");
        }
    }

    #[test]
    fn test_unknown_level_is_rejected() {
        let err = crate_filter("verbose").unwrap_err();
        assert!(matches!(err, AegisError::Configuration(msg) if msg.contains("verbose")));
        assert!(crate_filter("").is_err());
    }

    #[test]
    fn test_rotation_names() {
        assert!(rotation("daily").is_ok());
        assert!(rotation("hourly").is_ok());
        assert!(rotation("weekly").is_err());
    }
}
