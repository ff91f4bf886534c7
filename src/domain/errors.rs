//! Domain error types
//!
//! This module defines the error hierarchy for Aegis. The four processing
//! errors mirror the failure taxonomy of the pipeline; the remaining
//! variants cover configuration and I/O around it. Third-party error types
//! are converted at the boundary and never exposed.

use crate::anonymization::compliance::Regulation;
use crate::anonymization::models::{EntityKind, Sensitivity};
use thiserror::Error;

/// Main Aegis error type
#[derive(Debug, Clone, Error)]
pub enum AegisError {
    /// A detector produced a zero-length, inverted or out-of-range span.
    ///
    /// Non-fatal: the span merger drops the candidate and records it.
    #[error("Malformed span [{start}, {end}) for text of length {text_len}")]
    MalformedSpan {
        start: usize,
        end: usize,
        text_len: usize,
    },

    /// The planner has no rule for a `(kind, sensitivity, regulation)` triple.
    ///
    /// Fatal: this is a defect in the planning rule set.
    #[error("No planning rule matches kind '{kind}' with sensitivity {sensitivity} under {regulation}")]
    UnresolvedEntity {
        kind: EntityKind,
        sensitivity: Sensitivity,
        regulation: Regulation,
    },

    /// A splice was requested outside the text buffer, or over a region
    /// already rewritten.
    ///
    /// Fatal: an upstream invariant was violated.
    #[error("Offset out of bounds: [{start}, {end}) for text of length {text_len}")]
    OffsetOutOfBounds {
        start: usize,
        end: usize,
        text_len: usize,
    },

    /// An external collaborator failed or timed out.
    #[error("Collaborator '{collaborator}' unavailable: {reason}")]
    CollaboratorUnavailable {
        collaborator: &'static str,
        reason: String,
    },

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl AegisError {
    /// Creates a collaborator failure
    pub fn unavailable(collaborator: &'static str, reason: impl Into<String>) -> Self {
        Self::CollaboratorUnavailable {
            collaborator,
            reason: reason.into(),
        }
    }

    /// Whether the pipeline must abort on this error
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            Self::MalformedSpan { .. } | Self::CollaboratorUnavailable { .. }
        )
    }
}

// Conversion from std::io::Error
impl From<std::io::Error> for AegisError {
    fn from(err: std::io::Error) -> Self {
        AegisError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for AegisError {
    fn from(err: serde_json::Error) -> Self {
        AegisError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for AegisError {
    fn from(err: toml::de::Error) -> Self {
        AegisError::Configuration(format!("TOML parse error: {err}"))
    }
}

// Pattern library and rule set loaders report through anyhow
impl From<anyhow::Error> for AegisError {
    fn from(err: anyhow::Error) -> Self {
        AegisError::Configuration(format!("{err:#}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_span_display() {
        let err = AegisError::MalformedSpan {
            start: 5,
            end: 5,
            text_len: 10,
        };
        assert_eq!(err.to_string(), "Malformed span [5, 5) for text of length 10");
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_errors_clone_with_their_context() {
        let err = AegisError::unavailable("contextual_detector", "timed out");
        let copy = err.clone();
        assert_eq!(copy.to_string(), err.to_string());
        assert!(!copy.is_fatal());
    }

    #[test]
    fn test_unresolved_entity_is_fatal() {
        let err = AegisError::UnresolvedEntity {
            kind: EntityKind::Email,
            sensitivity: Sensitivity::Medium,
            regulation: Regulation::Hipaa,
        };
        assert!(err.is_fatal());
        assert!(err.to_string().contains("email"));
        assert!(err.to_string().contains("HIPAA"));
    }

    #[test]
    fn test_collaborator_unavailable_is_not_fatal() {
        let err = AegisError::unavailable("detect_contextual", "timed out");
        assert!(!err.is_fatal());
        assert_eq!(
            err.to_string(),
            "Collaborator 'detect_contextual' unavailable: timed out"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let err: AegisError = io_err.into();
        assert!(matches!(err, AegisError::Io(_)));
    }

    #[test]
    fn test_toml_error_conversion() {
        let toml_err = toml::from_str::<toml::Value>("invalid = toml = syntax").unwrap_err();
        let err: AegisError = toml_err.into();
        assert!(matches!(err, AegisError::Configuration(_)));
        assert!(err.to_string().contains("TOML parse error"));
    }

    #[test]
    fn test_anyhow_error_conversion_keeps_context() {
        let inner = anyhow::anyhow!("bad regex").context("Invalid pattern 'email'");
        let err: AegisError = inner.into();
        assert!(matches!(err, AegisError::Configuration(_)));
        assert!(err.to_string().contains("Invalid pattern 'email'"));
        assert!(err.to_string().contains("bad regex"));
    }
}
