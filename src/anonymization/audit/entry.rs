//! Audit records

use crate::anonymization::compliance::Regulation;
use crate::anonymization::models::{EntityKind, Sensitivity, Span};
use crate::anonymization::planner::Technique;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One applied transformation
///
/// Carries the span and the length of what replaced it, never the original
/// value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub entity_kind: EntityKind,
    pub sensitivity: Sensitivity,
    pub technique: Technique,
    /// Char span in the original text
    pub original_span: Span,
    /// Replacement length in chars
    pub replacement_length: usize,
    /// Regulation the technique was selected under
    pub regulation: Regulation,
}

/// Per-run summary row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub primary_regulation: Regulation,
    pub quality_passed: bool,
    pub retry_count: u32,
    pub entity_count: usize,
}

impl RunSummary {
    pub fn new(
        primary_regulation: Regulation,
        quality_passed: bool,
        retry_count: u32,
        entity_count: usize,
    ) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            primary_regulation,
            quality_passed,
            retry_count,
            entity_count,
        }
    }

    /// Use an id assigned at the start of the run
    pub fn with_run_id(mut self, run_id: Uuid) -> Self {
        self.run_id = run_id;
        self
    }
}
