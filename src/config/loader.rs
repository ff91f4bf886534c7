//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::AegisConfig;
use crate::domain::errors::AegisError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into AegisConfig
/// 4. Applies environment variable overrides (AEGIS_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns [`AegisError::Configuration`] if:
/// - File cannot be read
/// - TOML parsing fails
/// - Environment variable substitution fails
/// - Configuration validation fails
///
/// # Examples
///
/// ```no_run
/// use aegis::config::loader::load_config;
///
/// let config = load_config("aegis.toml").expect("Failed to load config");
/// assert!(config.workflow.max_retries <= aegis::config::MAX_RETRIES);
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<AegisConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(AegisError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        AegisError::Configuration(format!(
            "Failed to read configuration file {}: {e}",
            path.display()
        ))
    })?;

    load_config_from_str(&contents)
}

/// Loads configuration from TOML text, with the same steps as [`load_config`]
pub fn load_config_from_str(contents: &str) -> Result<AegisConfig> {
    let contents = substitute_env_vars(contents)?;

    let mut config: AegisConfig = toml::from_str(&contents)
        .map_err(|e| AegisError::Configuration(format!("Failed to parse TOML: {e}")))?;

    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        AegisError::Configuration(format!("Configuration validation failed: {e}"))
    })?;

    tracing::debug!(
        max_retries = config.workflow.max_retries,
        contextual_enabled = config.detection.contextual_enabled,
        "Configuration loaded"
    );

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are copied untouched. Every missing variable is reported in
/// one error.
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| AegisError::Configuration(format!("Invalid substitution pattern: {e}")))?;
    let mut result = String::with_capacity(input.len());
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    processed_line = processed_line.replace(&cap[0], &value);
                }
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(AegisError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

/// Parse an override value, naming the variable on failure
fn parse_override<T>(name: &str, value: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e| {
        AegisError::Configuration(format!("Invalid value '{value}' for {name}: {e}"))
    })
}

/// Applies environment variable overrides using AEGIS_* prefix
///
/// Environment variables follow the pattern: AEGIS_<SECTION>_<KEY>
/// For example: AEGIS_WORKFLOW_MAX_RETRIES, AEGIS_AUDIT_LOG_PATH
fn apply_env_overrides(config: &mut AegisConfig) -> Result<()> {
    // Application overrides
    if let Ok(val) = std::env::var("AEGIS_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }

    // Detection overrides
    if let Ok(val) = std::env::var("AEGIS_DETECTION_PATTERN_LIBRARY") {
        config.detection.pattern_library = Some(val.into());
    }
    if let Ok(val) = std::env::var("AEGIS_DETECTION_CONFIDENCE_THRESHOLD") {
        config.detection.confidence_threshold =
            parse_override("AEGIS_DETECTION_CONFIDENCE_THRESHOLD", &val)?;
    }
    if let Ok(val) = std::env::var("AEGIS_DETECTION_CONTEXTUAL_ENABLED") {
        config.detection.contextual_enabled =
            parse_override("AEGIS_DETECTION_CONTEXTUAL_ENABLED", &val)?;
    }

    // Planning overrides
    if let Ok(val) = std::env::var("AEGIS_PLANNING_RULES") {
        config.planning.rules = Some(val.into());
    }

    // Anonymization overrides
    if let Ok(val) = std::env::var("AEGIS_ANONYMIZATION_TRUNCATE_KEEP_CHARS") {
        config.anonymization.truncate_keep_chars =
            parse_override("AEGIS_ANONYMIZATION_TRUNCATE_KEEP_CHARS", &val)?;
    }
    if let Ok(val) = std::env::var("AEGIS_ANONYMIZATION_PSEUDONYM_PREFIX") {
        config.anonymization.pseudonym_prefix = val;
    }

    // Workflow overrides
    if let Ok(val) = std::env::var("AEGIS_WORKFLOW_MAX_RETRIES") {
        config.workflow.max_retries = parse_override("AEGIS_WORKFLOW_MAX_RETRIES", &val)?;
    }
    if let Ok(val) = std::env::var("AEGIS_WORKFLOW_COLLABORATOR_TIMEOUT_MS") {
        config.workflow.collaborator_timeout_ms =
            parse_override("AEGIS_WORKFLOW_COLLABORATOR_TIMEOUT_MS", &val)?;
    }

    // Audit overrides
    if let Ok(val) = std::env::var("AEGIS_AUDIT_ENABLED") {
        config.audit.enabled = parse_override("AEGIS_AUDIT_ENABLED", &val)?;
    }
    if let Ok(val) = std::env::var("AEGIS_AUDIT_LOG_PATH") {
        config.audit.log_path = val.into();
    }
    if let Ok(val) = std::env::var("AEGIS_AUDIT_JSON_FORMAT") {
        config.audit.json_format = parse_override("AEGIS_AUDIT_JSON_FORMAT", &val)?;
    }

    // Logging overrides
    if let Ok(val) = std::env::var("AEGIS_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = parse_override("AEGIS_LOGGING_LOCAL_ENABLED", &val)?;
    }
    if let Ok(val) = std::env::var("AEGIS_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }
    if let Ok(val) = std::env::var("AEGIS_LOGGING_LOCAL_ROTATION") {
        config.logging.local_rotation = val;
    }

    Ok(())
}
