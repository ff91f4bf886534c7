//! Anonymization module for Aegis
//!
//! This module provides sensitive-span detection, classification and
//! offset-safe anonymization of free text under GDPR, HIPAA and PCI DSS.
//!
//! # Architecture
//!
//! The pipeline consists of:
//! - **Detection**: Regex-based pattern detection from a TOML library
//! - **Merging**: One overlap-free span list from pattern and inferred candidates
//! - **Classification**: Sensitivity, regulation flags and the primary regulation
//! - **Planning**: One technique per entity from an ordered rule set
//! - **Anonymization**: Right-to-left splicing of generated replacements
//! - **Quality**: Re-scan of the output for residual sensitive data
//! - **Audit**: One record per applied action, never holding original values
//!
//! # Usage
//!
//! ```rust
//! use aegis::anonymization::detector::{PatternDetector, RegexDetector};
//! use aegis::anonymization::merger::SpanMerger;
//!
//! # fn example() -> aegis::Result<()> {
//! let text = "Reach me at jane@example.com";
//! let detector = RegexDetector::new()?;
//! let merged = SpanMerger::new().merge(text, detector.detect_patterns(text)?, Vec::new());
//! assert_eq!(merged.entities.len(), 1);
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

pub mod anonymizer;
pub mod audit;
pub mod classifier;
pub mod compliance;
pub mod detector;
pub mod engine;
pub mod merger;
pub mod models;
pub mod planner;
pub mod quality;
pub mod report;

// Re-export main types
pub use classifier::RegulationClassifier;
pub use compliance::{Regulation, RegulationDecision};
pub use engine::{AnonymizationEngine, AnonymizationOutput};
pub use merger::SpanMerger;
pub use models::{ClassifiedEntity, Entity, EntityKind, EntitySource, Sensitivity};
pub use planner::{Technique, TransformPlanner, TransformationPlan};
pub use quality::{QualityGate, QualityReport};
pub use report::ProcessingResult;
