//! Processing results
//!
//! [`ProcessingResult`] is what a caller gets back from one document run:
//! the anonymized text, the audit trail, the quality verdict and the
//! justification material, plus the summary row for an audit store.

use crate::adapters::CitationText;
use crate::anonymization::audit::{AuditEntry, RunSummary};
use crate::anonymization::compliance::Regulation;
use crate::anonymization::quality::QualityIssue;
use crate::workflow::{Justification, RoutePath};
use serde::{Deserialize, Serialize};

/// Outcome of processing one document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingResult {
    pub anonymized_text: String,

    /// One audit entry per applied action, in text order
    pub entities: Vec<AuditEntry>,

    pub primary_regulation: Regulation,

    pub quality_passed: bool,

    pub retry_count: u32,

    /// Issues from the last quality check; empty when it passed
    pub issues: Vec<QualityIssue>,

    pub route: RoutePath,

    pub justifications: Vec<Justification>,

    /// Regulation text fetched for the justifications, when available
    pub citations: Vec<CitationText>,

    /// Recoverable degradations, e.g. an unavailable collaborator
    pub notes: Vec<String>,

    pub summary: RunSummary,
}

impl ProcessingResult {
    /// Whether the caller should route this document to human review
    pub fn needs_review(&self) -> bool {
        !self.quality_passed
    }

    /// Format the result for console output
    ///
    /// Lists kinds, techniques and issue descriptions only; original values
    /// never appear.
    pub fn format_console(&self) -> String {
        let mut output = String::new();

        output.push('\n');
        output.push_str("═══════════════════════════════════════════════════════════════\n");
        output.push_str("                    ANONYMIZATION REPORT                       \n");
        output.push_str("═══════════════════════════════════════════════════════════════\n");
        output.push('\n');

        output.push_str("📊 SUMMARY\n");
        output.push_str("───────────────────────────────────────────────────────────────\n");
        output.push_str(&format!("  Run:                {}\n", self.summary.run_id));
        output.push_str(&format!("  Primary Regulation: {}\n", self.primary_regulation));
        output.push_str(&format!("  Route:              {}\n", self.route));
        output.push_str(&format!("  Entities:           {}\n", self.entities.len()));
        output.push_str(&format!("  Retries:            {}\n", self.retry_count));
        output.push_str(&format!(
            "  Quality:            {}\n",
            if self.quality_passed { "passed" } else { "failed" }
        ));
        output.push('\n');

        if !self.justifications.is_empty() {
            output.push_str("📝 TRANSFORMATIONS\n");
            output.push_str("───────────────────────────────────────────────────────────────\n");
            for justification in &self.justifications {
                output.push_str(&format!(
                    "  {:24} {:14} {}\n",
                    justification.entity_kind.as_str(),
                    justification.technique.as_str(),
                    justification.article
                ));
            }
            output.push('\n');
        }

        if !self.issues.is_empty() {
            output.push_str("⚠️  ISSUES\n");
            output.push_str("───────────────────────────────────────────────────────────────\n");
            for issue in &self.issues {
                output.push_str(&format!("  • [{}] {}\n", issue.category, issue.description));
            }
            output.push('\n');
        }

        if !self.notes.is_empty() {
            output.push_str("NOTES\n");
            output.push_str("───────────────────────────────────────────────────────────────\n");
            for note in &self.notes {
                output.push_str(&format!("  • {note}\n"));
            }
            output.push('\n');
        }

        output.push_str("═══════════════════════════════════════════════════════════════\n");
        output
    }

    /// Format the result as JSON
    pub fn format_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anonymization::models::{EntityKind, Sensitivity, Span};
    use crate::anonymization::planner::Technique;
    use crate::anonymization::quality::IssueCategory;

    fn result(quality_passed: bool) -> ProcessingResult {
        let entry = AuditEntry {
            entity_kind: EntityKind::CreditCard,
            sensitivity: Sensitivity::Critical,
            technique: Technique::Tokenize,
            original_span: Span::new(5, 21),
            replacement_length: 15,
            regulation: Regulation::PciDss,
        };
        ProcessingResult {
            anonymized_text: "Card <CREDIT_CARD_0>".to_string(),
            entities: vec![entry],
            primary_regulation: Regulation::PciDss,
            quality_passed,
            retry_count: if quality_passed { 0 } else { 2 },
            issues: if quality_passed {
                Vec::new()
            } else {
                vec![QualityIssue {
                    category: IssueCategory::VerbatimLeak,
                    entity_kind: Some(EntityKind::CreditCard),
                    action_index: Some(0),
                    description: "original credit_card value still present after tokenize"
                        .to_string(),
                }]
            },
            route: RoutePath::Pci,
            justifications: Vec::new(),
            citations: Vec::new(),
            notes: vec!["citations unavailable".to_string()],
            summary: RunSummary::new(Regulation::PciDss, quality_passed, 0, 1),
        }
    }

    #[test]
    fn test_format_console() {
        let console = result(false).format_console();
        assert!(console.contains("ANONYMIZATION REPORT"));
        assert!(console.contains("PCI_DSS"));
        assert!(console.contains("failed"));
        assert!(console.contains("verbatim_leak"));
        assert!(console.contains("citations unavailable"));
    }

    #[test]
    fn test_format_json() {
        let json = result(true).format_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["primary_regulation"], "PCI_DSS");
        assert_eq!(value["route"], "pci");
        assert_eq!(value["entities"][0]["technique"], "tokenize");
    }

    #[test]
    fn test_needs_review() {
        assert!(!result(true).needs_review());
        assert!(result(false).needs_review());
    }
}
