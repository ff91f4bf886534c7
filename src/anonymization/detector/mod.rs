//! Pattern detection module
//!
//! Provides the trait-based interface for deterministic detectors and the
//! regex implementation backed by the TOML pattern library. The same
//! detector runs at ingestion and again inside the quality gate.

pub mod patterns;
pub mod regex;

use crate::anonymization::models::Entity;
use crate::domain::Result;

pub use self::patterns::PatternRegistry;
pub use self::regex::RegexDetector;

/// Trait for deterministic pattern detectors
///
/// Implementations must be pure: the same text always yields the same
/// entities, with char offsets into that text.
pub trait PatternDetector: Send + Sync {
    /// Detect entities in `text`
    fn detect_patterns(&self, text: &str) -> Result<Vec<Entity>>;

    /// Get the confidence threshold for this detector
    fn confidence_threshold(&self) -> f32;
}
