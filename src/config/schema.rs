//! Configuration schema types
//!
//! This module defines the configuration structure for Aegis. Every section
//! is optional; an empty file yields [`AegisConfig::default`].

use crate::anonymization::anonymizer::{DEFAULT_PSEUDONYM_PREFIX, DEFAULT_TRUNCATE_KEEP_CHARS};
use crate::anonymization::detector::regex::DEFAULT_CONFIDENCE_THRESHOLD;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Upper bound on quality-gate retries per document
pub const MAX_RETRIES: u32 = 2;

/// Default timeout for every external collaborator call
pub const DEFAULT_COLLABORATOR_TIMEOUT_MS: u64 = 10_000;

/// Main Aegis configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AegisConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Pattern detection settings
    #[serde(default)]
    pub detection: DetectionConfig,

    /// Technique selection settings
    #[serde(default)]
    pub planning: PlanningConfig,

    /// Replacement generation settings
    #[serde(default)]
    pub anonymization: AnonymizationConfig,

    /// Orchestrator settings
    #[serde(default)]
    pub workflow: WorkflowConfig,

    /// Audit persistence settings
    #[serde(default)]
    pub audit: AuditConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AegisConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.detection.validate()?;
        self.planning.validate()?;
        self.anonymization.validate()?;
        self.workflow.validate()?;
        self.audit.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// Pattern detection configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionConfig {
    /// Pattern library replacing the embedded one
    #[serde(default)]
    pub pattern_library: Option<PathBuf>,

    /// Patterns below this confidence are skipped
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: f32,

    /// Call the contextual detector during ingestion
    #[serde(default = "default_true")]
    pub contextual_enabled: bool,
}

impl DetectionConfig {
    fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(format!(
                "detection.confidence_threshold must be between 0.0 and 1.0, got {}",
                self.confidence_threshold
            ));
        }
        if let Some(path) = &self.pattern_library {
            validate_toml_file("detection.pattern_library", path)?;
        }
        Ok(())
    }
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            pattern_library: None,
            confidence_threshold: default_confidence_threshold(),
            contextual_enabled: true,
        }
    }
}

/// Technique selection configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanningConfig {
    /// Planning rule set replacing the embedded one
    #[serde(default)]
    pub rules: Option<PathBuf>,
}

impl PlanningConfig {
    fn validate(&self) -> Result<(), String> {
        if let Some(path) = &self.rules {
            validate_toml_file("planning.rules", path)?;
        }
        Ok(())
    }
}

/// Replacement generation configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnonymizationConfig {
    /// Leading chars kept by truncation
    #[serde(default = "default_truncate_keep_chars")]
    pub truncate_keep_chars: usize,

    /// Pseudonym prefix for person kinds
    #[serde(default = "default_pseudonym_prefix")]
    pub pseudonym_prefix: String,
}

impl AnonymizationConfig {
    fn validate(&self) -> Result<(), String> {
        if self.truncate_keep_chars == 0 {
            return Err("anonymization.truncate_keep_chars must be >= 1".to_string());
        }
        if self.pseudonym_prefix.trim().is_empty() {
            return Err("anonymization.pseudonym_prefix cannot be empty".to_string());
        }
        Ok(())
    }
}

impl Default for AnonymizationConfig {
    fn default() -> Self {
        Self {
            truncate_keep_chars: default_truncate_keep_chars(),
            pseudonym_prefix: default_pseudonym_prefix(),
        }
    }
}

/// Orchestrator configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowConfig {
    /// Quality-gate retries per document
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Timeout applied to each collaborator call
    #[serde(default = "default_collaborator_timeout_ms")]
    pub collaborator_timeout_ms: u64,
}

impl WorkflowConfig {
    fn validate(&self) -> Result<(), String> {
        if self.max_retries > MAX_RETRIES {
            return Err(format!(
                "workflow.max_retries must be <= {MAX_RETRIES}, got {}",
                self.max_retries
            ));
        }
        if self.collaborator_timeout_ms == 0 {
            return Err("workflow.collaborator_timeout_ms must be > 0".to_string());
        }
        Ok(())
    }
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            collaborator_timeout_ms: default_collaborator_timeout_ms(),
        }
    }
}

/// Audit persistence configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Write audit records
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Audit log file
    #[serde(default = "default_audit_log_path")]
    pub log_path: PathBuf,

    /// One JSON line per run instead of a plain-text summary
    #[serde(default = "default_true")]
    pub json_format: bool,
}

impl AuditConfig {
    fn validate(&self) -> Result<(), String> {
        if self.enabled && self.log_path.as_os_str().is_empty() {
            return Err("audit.log_path cannot be empty when audit is enabled".to_string());
        }
        Ok(())
    }
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            log_path: default_audit_log_path(),
            json_format: true,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable local file logging
    #[serde(default)]
    pub local_enabled: bool,

    /// Local log directory
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation strategy
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }
        if self.local_enabled && self.local_path.trim().is_empty() {
            return Err("logging.local_path cannot be empty when local logging is enabled".to_string());
        }
        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

fn validate_toml_file(field: &str, path: &Path) -> Result<(), String> {
    if path.extension().and_then(|ext| ext.to_str()) != Some("toml") {
        return Err(format!("{field} must be a .toml file: {}", path.display()));
    }
    if !path.is_file() {
        return Err(format!("{field} not found: {}", path.display()));
    }
    Ok(())
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_confidence_threshold() -> f32 {
    DEFAULT_CONFIDENCE_THRESHOLD
}

fn default_truncate_keep_chars() -> usize {
    DEFAULT_TRUNCATE_KEEP_CHARS
}

fn default_pseudonym_prefix() -> String {
    DEFAULT_PSEUDONYM_PREFIX.to_string()
}

fn default_max_retries() -> u32 {
    MAX_RETRIES
}

fn default_collaborator_timeout_ms() -> u64 {
    DEFAULT_COLLABORATOR_TIMEOUT_MS
}

fn default_audit_log_path() -> PathBuf {
    PathBuf::from("./audit/anonymization.log")
}

fn default_local_path() -> String {
    "./logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config: AegisConfig = toml::from_str("").unwrap();
        assert_eq!(config, AegisConfig::default());
        assert_eq!(config.workflow.max_retries, 2);
        assert_eq!(config.workflow.collaborator_timeout_ms, 10_000);
        assert_eq!(config.anonymization.pseudonym_prefix, "Subject");
        assert!(config.detection.contextual_enabled);
        assert!(!config.logging.local_enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_application_config_validation() {
        let mut config = ApplicationConfig::default();
        assert!(config.validate().is_ok());

        config.log_level = "invalid".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_confidence_threshold_range() {
        let mut config = DetectionConfig::default();
        config.confidence_threshold = 1.5;
        assert!(config.validate().is_err());

        config.confidence_threshold = 0.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_override_file_must_exist_and_be_toml() {
        let dir = tempdir().unwrap();
        let yaml = dir.path().join("rules.yaml");
        std::fs::write(&yaml, "rules: []").unwrap();
        let missing = dir.path().join("missing.toml");
        let present = dir.path().join("rules.toml");
        std::fs::write(&present, "").unwrap();

        let mut config = PlanningConfig { rules: Some(yaml) };
        assert!(config.validate().unwrap_err().contains(".toml"));

        config.rules = Some(missing);
        assert!(config.validate().unwrap_err().contains("not found"));

        config.rules = Some(present);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_workflow_config_validation() {
        let mut config = WorkflowConfig::default();
        config.max_retries = MAX_RETRIES + 1;
        assert!(config.validate().is_err());

        config.max_retries = 0;
        assert!(config.validate().is_ok());

        config.collaborator_timeout_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_truncate_keep_chars_minimum() {
        let config = AnonymizationConfig {
            truncate_keep_chars: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_logging_rotation_validation() {
        let mut config = LoggingConfig::default();
        config.local_rotation = "hourly".to_string();
        assert!(config.validate().is_ok());

        config.local_rotation = "size".to_string();
        assert!(config.validate().is_err());
    }
}
