//! Quality gate
//!
//! Decides whether an anonymized text is acceptable. Three checks feed one
//! issue list:
//!
//! 1. the pattern detector re-run over the output, with the kinds planned as
//!    `keep` allowed through
//! 2. a verbatim search for the original value of every non-`keep` action
//! 3. findings of the residual-PII collaborator, when it answered
//!
//! [`QualityGate::check`] is pure; [`QualityGate::evaluate`] adds the
//! collaborator call around it.

use crate::adapters::{call_with_timeout, ResidualFinding, ResidualPiiChecker};
use crate::anonymization::detector::PatternDetector;
use crate::anonymization::engine::AnonymizationOutput;
use crate::anonymization::models::EntityKind;
use crate::anonymization::planner::Technique;
use crate::domain::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Which check raised an issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCategory {
    PatternLeak,
    VerbatimLeak,
    Residual,
}

impl fmt::Display for IssueCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PatternLeak => write!(f, "pattern_leak"),
            Self::VerbatimLeak => write!(f, "verbatim_leak"),
            Self::Residual => write!(f, "residual"),
        }
    }
}

/// One leak description; never carries the leaked value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityIssue {
    pub category: IssueCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_kind: Option<EntityKind>,
    /// Index of the responsible plan action, when one can be attributed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_index: Option<usize>,
    pub description: String,
}

/// Gate verdict
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityReport {
    pub passed: bool,
    pub issues: Vec<QualityIssue>,
    /// Whether the residual-PII collaborator answered
    pub residual_checked: bool,
}

impl QualityReport {
    fn from_issues(issues: Vec<QualityIssue>, residual_checked: bool) -> Self {
        Self {
            passed: issues.is_empty(),
            issues,
            residual_checked,
        }
    }

    /// Plan actions blamed by at least one issue
    pub fn offending_actions(&self) -> BTreeSet<usize> {
        self.issues.iter().filter_map(|i| i.action_index).collect()
    }
}

/// Post-anonymization validation
#[derive(Clone)]
pub struct QualityGate {
    detector: Arc<dyn PatternDetector>,
}

impl QualityGate {
    /// Gate re-scanning with `detector`, which should be the detector used at
    /// ingestion
    pub fn new(detector: Arc<dyn PatternDetector>) -> Self {
        Self { detector }
    }

    /// Run checks 1 and 2 and merge `residual` findings
    pub fn check(
        &self,
        output: &AnonymizationOutput,
        residual: Option<&[ResidualFinding]>,
    ) -> Result<QualityReport> {
        let mut issues = Vec::new();

        let allowed: BTreeSet<&EntityKind> = output
            .actions
            .iter()
            .filter(|a| a.technique == Technique::Keep)
            .map(|a| a.entity.kind())
            .collect();

        for finding in self.detector.detect_patterns(&output.text)? {
            if allowed.contains(&finding.kind) {
                continue;
            }
            let span = finding.span();
            let action_index = output
                .output_spans
                .iter()
                .position(|out| out.overlaps(&span) || (out.is_empty() && out.start == span.start));
            issues.push(QualityIssue {
                category: IssueCategory::PatternLeak,
                description: format!(
                    "{} pattern matches output chars {}..{}",
                    finding.kind, span.start, span.end
                ),
                entity_kind: Some(finding.kind),
                action_index,
            });
        }

        for (index, action) in output.actions.iter().enumerate() {
            if action.technique == Technique::Keep {
                continue;
            }
            let raw = action.entity.raw_value();
            if !raw.is_empty() && output.text.contains(raw) {
                issues.push(QualityIssue {
                    category: IssueCategory::VerbatimLeak,
                    entity_kind: Some(action.entity.kind().clone()),
                    action_index: Some(index),
                    description: format!(
                        "original {} value still present after {}",
                        action.entity.kind(),
                        action.technique
                    ),
                });
            }
        }

        for finding in residual.unwrap_or_default() {
            issues.push(QualityIssue {
                category: IssueCategory::Residual,
                entity_kind: finding.kind.clone(),
                action_index: None,
                description: finding.description.clone(),
            });
        }

        Ok(QualityReport::from_issues(issues, residual.is_some()))
    }

    /// Ask `checker` for residual findings, then [`check`](Self::check)
    ///
    /// An unavailable checker only clears [`QualityReport::residual_checked`].
    pub async fn evaluate(
        &self,
        output: &AnonymizationOutput,
        checker: &dyn ResidualPiiChecker,
        timeout: Duration,
    ) -> Result<QualityReport> {
        let residual = match call_with_timeout(
            "check_residual_pii",
            timeout,
            checker.check_residual_pii(&output.text),
        )
        .await
        {
            Ok(findings) => Some(findings),
            Err(err) => {
                tracing::warn!(error = %err, "Residual PII check skipped");
                None
            }
        };
        self.check(output, residual.as_deref())
    }
}

impl fmt::Debug for QualityGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QualityGate")
            .field("confidence_threshold", &self.detector.confidence_threshold())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::Unavailable;
    use crate::anonymization::compliance::Regulation;
    use crate::anonymization::detector::RegexDetector;
    use crate::anonymization::engine::AnonymizationEngine;
    use crate::anonymization::models::{
        ClassifiedEntity, Entity, EntitySource, Sensitivity, TextIndex,
    };
    use crate::anonymization::planner::{TransformAction, TransformationPlan};
    use async_trait::async_trait;

    fn gate() -> QualityGate {
        QualityGate::new(Arc::new(RegexDetector::new().unwrap()))
    }

    fn apply(text: &str, actions: &[(EntityKind, usize, usize, Technique)]) -> AnonymizationOutput {
        let index = TextIndex::new(text);
        let actions = actions
            .iter()
            .map(|(kind, start, end, technique)| {
                let entity =
                    Entity::from_text(kind.clone(), &index, *start, *end, EntitySource::Pattern)
                        .unwrap();
                TransformAction::new(
                    ClassifiedEntity::new(entity, Sensitivity::High, BTreeSet::new()),
                    *technique,
                )
            })
            .collect();
        AnonymizationEngine::default()
            .apply(text, &TransformationPlan::new(actions), Regulation::Gdpr)
            .unwrap()
    }

    struct Flagging;

    #[async_trait]
    impl ResidualPiiChecker for Flagging {
        async fn check_residual_pii(&self, _text: &str) -> Result<Vec<ResidualFinding>> {
            Ok(vec![ResidualFinding {
                kind: Some(EntityKind::PersonName),
                description: "possible name near start".to_string(),
            }])
        }
    }

    #[test]
    fn test_clean_output_passes() {
        let output = apply(
            "Card 4111111111111111 exp 12/25, email a@b.com",
            &[
                (EntityKind::CreditCard, 5, 21, Technique::Tokenize),
                (EntityKind::Date, 26, 31, Technique::Generalize),
                (EntityKind::Email, 39, 46, Technique::Mask),
            ],
        );
        let findings: Vec<ResidualFinding> = Vec::new();
        let report = gate().check(&output, Some(findings.as_slice())).unwrap();
        assert!(report.passed, "{:?}", report.issues);
        assert!(report.residual_checked);
    }

    #[test]
    fn test_pattern_leak_is_attributed() {
        let output = apply(
            "contact a@b.com",
            &[(EntityKind::Email, 8, 15, Technique::Truncate)],
        );
        let report = gate().check(&output, None).unwrap();
        assert!(report.passed);

        let output = apply(
            "mail a@b.com now",
            &[(EntityKind::PersonName, 13, 16, Technique::Pseudonymize)],
        );
        let report = gate().check(&output, None).unwrap();
        assert!(!report.passed);
        let issue = &report.issues[0];
        assert_eq!(issue.category, IssueCategory::PatternLeak);
        assert_eq!(issue.entity_kind, Some(EntityKind::Email));
        assert_eq!(issue.action_index, None);
        assert!(!issue.description.contains("a@b.com"));
    }

    #[test]
    fn test_keep_kinds_are_allowed() {
        let output = apply(
            "mail a@b.com",
            &[(EntityKind::Email, 5, 12, Technique::Keep)],
        );
        let report = gate().check(&output, None).unwrap();
        assert!(report.passed);
    }

    #[test]
    fn test_verbatim_leak() {
        let output = apply(
            "Jane Doe, Jane Doe",
            &[(EntityKind::PersonName, 0, 8, Technique::Pseudonymize)],
        );
        let report = gate().check(&output, None).unwrap();
        assert!(!report.passed);
        assert_eq!(report.issues[0].category, IssueCategory::VerbatimLeak);
        assert_eq!(report.offending_actions(), BTreeSet::from([0]));
        assert!(!report.issues[0].description.contains("Jane"));
    }

    #[tokio::test]
    async fn test_residual_findings_are_merged() {
        let output = apply(
            "mail a@b.com",
            &[(EntityKind::Email, 5, 12, Technique::Mask)],
        );
        let report = gate()
            .evaluate(&output, &Flagging, Duration::from_secs(1))
            .await
            .unwrap();
        assert!(!report.passed);
        assert_eq!(report.issues.len(), 1);
        assert_eq!(report.issues[0].category, IssueCategory::Residual);
        assert!(report.offending_actions().is_empty());
    }

    #[tokio::test]
    async fn test_unavailable_residual_check_is_skipped() {
        let output = apply(
            "mail a@b.com",
            &[(EntityKind::Email, 5, 12, Technique::Mask)],
        );
        let report = gate()
            .evaluate(&output, &Unavailable, Duration::from_secs(1))
            .await
            .unwrap();
        assert!(report.passed);
        assert!(!report.residual_checked);
    }
}
