//! Configuration management for Aegis.
//!
//! This module provides TOML-based configuration loading, parsing, and
//! validation.
//!
//! # Overview
//!
//! Aegis uses TOML configuration files with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `AEGIS_<SECTION>_<KEY>` environment overrides
//! - Default values for every setting
//! - Validation on load
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use aegis::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("aegis.toml")?;
//!
//! println!("Max retries: {}", config.workflow.max_retries);
//! println!("Audit log: {}", config.audit.log_path.display());
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - Log level
//! - [`DetectionConfig`] - Pattern library, confidence threshold, contextual detection
//! - [`PlanningConfig`] - Planning rule set
//! - [`AnonymizationConfig`] - Truncation length and pseudonym prefix
//! - [`WorkflowConfig`] - Retry bound and collaborator timeout
//! - [`AuditConfig`] - Audit log destination and format
//! - [`LoggingConfig`] - Rolling file logs
//!
//! # Example Configuration
//!
//! ```toml
//! [application]
//! log_level = "info"
//!
//! [detection]
//! pattern_library = "patterns/pii_patterns.toml"
//! confidence_threshold = 0.7
//!
//! [workflow]
//! max_retries = 2
//! collaborator_timeout_ms = 10000
//!
//! [audit]
//! log_path = "${AEGIS_AUDIT_DIR}/anonymization.log"
//! ```

pub mod loader;
pub mod schema;

// Re-export commonly used types
pub use loader::{load_config, load_config_from_str};
pub use schema::{
    AegisConfig, AnonymizationConfig, ApplicationConfig, AuditConfig, DetectionConfig,
    LoggingConfig, PlanningConfig, WorkflowConfig, DEFAULT_COLLABORATOR_TIMEOUT_MS, MAX_RETRIES,
};
