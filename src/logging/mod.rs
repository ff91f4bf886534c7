//! Structured diagnostics
//!
//! A compact console layer plus optional rolling JSON files, filtered to the
//! `aegis` target unless `RUST_LOG` says otherwise. The macros below give
//! run-level events a fixed set of field names.
//!
//! Raw entity values are never passed to any log call; only kinds, offsets
//! and techniques are.
//!
//! # Example
//!
//! ```no_run
//! use aegis::logging::init_logging;
//! use aegis::config::LoggingConfig;
//!
//! let _guard = init_logging("debug", &LoggingConfig::default())?;
//! tracing::debug!("subscriber ready");
//! # Ok::<(), aegis::AegisError>(())
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard};

/// Log the start of a processing run
///
/// # Example
///
/// ```no_run
/// use aegis::log_run_start;
/// use uuid::Uuid;
///
/// let run_id = Uuid::new_v4();
/// log_run_start!(run_id, 120);
/// ```
#[macro_export]
macro_rules! log_run_start {
    ($run_id:expr, $text_len:expr) => {
        tracing::info!(
            run_id = %$run_id,
            text_len = $text_len,
            "Starting processing run"
        );
    };
}

/// Log the completion of a processing run
///
/// # Example
///
/// ```no_run
/// use aegis::log_run_complete;
/// use aegis::anonymization::audit::RunSummary;
/// use aegis::anonymization::compliance::Regulation;
/// use std::time::Duration;
///
/// let summary = RunSummary::new(Regulation::Gdpr, true, 0, 3);
/// log_run_complete!(&summary, Duration::from_millis(12));
/// ```
#[macro_export]
macro_rules! log_run_complete {
    ($summary:expr, $duration:expr) => {
        tracing::info!(
            run_id = %$summary.run_id,
            primary_regulation = %$summary.primary_regulation,
            quality_passed = $summary.quality_passed,
            retry_count = $summary.retry_count,
            entity_count = $summary.entity_count,
            duration_ms = $duration.as_millis(),
            "Processing run completed"
        );
    };
}

/// Log an error together with the step that produced it
///
/// # Example
///
/// ```no_run
/// use aegis::log_error_with_context;
/// use aegis::domain::AegisError;
///
/// let error = AegisError::Io("audit directory is read-only".to_string());
/// log_error_with_context!(&error, "audit write");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Processing step failed"
        );
    };
}

/// Log a retry attempt
///
/// # Example
///
/// ```no_run
/// use aegis::log_retry_attempt;
///
/// log_retry_attempt!(1, 2, "2 quality issues");
/// ```
#[macro_export]
macro_rules! log_retry_attempt {
    ($attempt:expr, $max_attempts:expr, $reason:expr) => {
        tracing::warn!(
            attempt = $attempt,
            max_attempts = $max_attempts,
            reason = $reason,
            "Retrying anonymization"
        );
    };
}
