//! Per-document workflow state

use super::routing::{Justification, RoutePath};
use crate::adapters::CitationText;
use crate::anonymization::compliance::{Regulation, RegulationDecision};
use crate::anonymization::engine::AnonymizationOutput;
use crate::anonymization::models::{ClassifiedEntity, Entity};
use crate::anonymization::planner::TransformationPlan;
use crate::anonymization::quality::QualityReport;
use std::collections::BTreeSet;
use std::fmt;

/// Orchestrator stages, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Ingest,
    Classify,
    Route,
    Justify,
    Anonymize,
    QualityCheck,
    /// Terminal
    Done,
}

impl Stage {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Ingest => "ingest",
            Self::Classify => "classify",
            Self::Route => "route",
            Self::Justify => "justify",
            Self::Anonymize => "anonymize",
            Self::QualityCheck => "quality_check",
            Self::Done => "done",
        };
        f.write_str(s)
    }
}

/// Everything one document's run accumulates
///
/// Owned by a single run and moved from stage to stage. Fields filled by a
/// later stage hold neutral values until that stage runs.
#[derive(Debug, Clone)]
pub struct WorkflowState {
    /// Original text; never mutated
    pub text: String,
    pub hint: Option<Regulation>,
    /// Merged, not yet classified
    pub candidates: Vec<Entity>,
    pub entities: Vec<ClassifiedEntity>,
    pub decision: RegulationDecision,
    pub route: RoutePath,
    pub plan: TransformationPlan,
    pub justifications: Vec<Justification>,
    pub citations: Vec<CitationText>,
    /// Latest engine output
    pub output: AnonymizationOutput,
    /// Latest gate verdict
    pub report: Option<QualityReport>,
    pub retry_count: u32,
    pub quality_passed: bool,
    /// Recoverable degradations met along the way
    pub notes: Vec<String>,
}

impl WorkflowState {
    pub fn new(text: impl Into<String>, hint: Option<Regulation>) -> Self {
        let text = text.into();
        let output = AnonymizationOutput {
            text: text.clone(),
            actions: Vec::new(),
            audit: Vec::new(),
            output_spans: Vec::new(),
        };
        Self {
            text,
            hint,
            candidates: Vec::new(),
            entities: Vec::new(),
            decision: RegulationDecision::new(Regulation::Gdpr, BTreeSet::new()),
            route: RoutePath::Escalation,
            plan: TransformationPlan::default(),
            justifications: Vec::new(),
            citations: Vec::new(),
            output,
            report: None,
            retry_count: 0,
            quality_passed: false,
            notes: Vec::new(),
        }
    }

    pub fn anonymized_text(&self) -> &str {
        &self.output.text
    }

    /// Record a note once
    pub fn note(&mut self, note: impl Into<String>) {
        let note = note.into();
        if !self.notes.contains(&note) {
            self.notes.push(note);
        }
    }
}
