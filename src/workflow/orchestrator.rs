//! Workflow orchestrator - the per-document state machine
//!
//! Drives one document through `Ingest → Classify → Route → Justify →
//! Anonymize → QualityCheck → Done`. Only the `Anonymize`/`QualityCheck`
//! cycle is retried, at most `max_retries` times, each retry escalating the
//! techniques of the actions the gate blamed.

use super::routing::{justify, RoutePath};
use super::state::{Stage, WorkflowState};
use crate::adapters::{call_with_timeout, Collaborators};
use crate::anonymization::anonymizer::ReplacementOptions;
use crate::anonymization::audit::RunSummary;
use crate::anonymization::classifier::RegulationClassifier;
use crate::anonymization::compliance::Regulation;
use crate::anonymization::detector::{PatternDetector, PatternRegistry, RegexDetector};
use crate::anonymization::engine::AnonymizationEngine;
use crate::anonymization::merger::SpanMerger;
use crate::anonymization::models::EntityKind;
use crate::anonymization::planner::{RuleSet, TransformPlanner};
use crate::anonymization::quality::QualityGate;
use crate::anonymization::report::ProcessingResult;
use crate::config::{AegisConfig, MAX_RETRIES};
use crate::domain::Result;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Runs documents through the anonymization pipeline
///
/// Holds configuration and shared, read-only components only. Every
/// [`process`](Self::process) call owns its own [`WorkflowState`], so one
/// orchestrator can serve concurrent documents behind an `Arc`.
pub struct WorkflowOrchestrator {
    detector: Arc<dyn PatternDetector>,
    merger: SpanMerger,
    classifier: RegulationClassifier,
    planner: TransformPlanner,
    engine: AnonymizationEngine,
    gate: QualityGate,
    collaborators: Collaborators,
    max_retries: u32,
    contextual_enabled: bool,
}

impl WorkflowOrchestrator {
    /// Create an orchestrator from its components
    ///
    /// The quality gate re-scans with the same `detector` used at ingestion.
    pub fn new(
        detector: Arc<dyn PatternDetector>,
        planner: TransformPlanner,
        engine: AnonymizationEngine,
        collaborators: Collaborators,
    ) -> Self {
        let classifier =
            RegulationClassifier::new(collaborators.classifier.clone(), collaborators.timeout);
        let gate = QualityGate::new(detector.clone());
        Self {
            detector,
            merger: SpanMerger::new(),
            classifier,
            planner,
            engine,
            gate,
            collaborators,
            max_retries: MAX_RETRIES,
            contextual_enabled: true,
        }
    }

    /// Orchestrator with the embedded pattern library and planning rules
    pub fn with_defaults(collaborators: Collaborators) -> Result<Self> {
        let detector: Arc<dyn PatternDetector> = Arc::new(RegexDetector::new()?);
        Ok(Self::new(
            detector,
            TransformPlanner::with_default_rules()?,
            AnonymizationEngine::default(),
            collaborators,
        ))
    }

    /// Build an orchestrator from a loaded configuration
    ///
    /// # Errors
    ///
    /// [`AegisError::Configuration`](crate::domain::AegisError::Configuration)
    /// when a configured pattern library or rule file cannot be loaded.
    pub fn from_config(config: &AegisConfig, collaborators: Collaborators) -> Result<Self> {
        let registry = match &config.detection.pattern_library {
            Some(path) => PatternRegistry::from_file(path)?,
            None => PatternRegistry::default_patterns()?,
        };
        let detector: Arc<dyn PatternDetector> = Arc::new(
            RegexDetector::with_registry(registry)
                .with_confidence_threshold(config.detection.confidence_threshold),
        );

        let rules = match &config.planning.rules {
            Some(path) => RuleSet::from_file(path)?,
            None => RuleSet::default_rules()?,
        };

        let engine = AnonymizationEngine::new(ReplacementOptions {
            truncate_keep_chars: config.anonymization.truncate_keep_chars,
            pseudonym_prefix: config.anonymization.pseudonym_prefix.clone(),
        });

        let collaborators = collaborators.with_timeout(Duration::from_millis(
            config.workflow.collaborator_timeout_ms,
        ));

        tracing::debug!(
            max_retries = config.workflow.max_retries,
            contextual_enabled = config.detection.contextual_enabled,
            rules = rules.rules.len(),
            "Orchestrator configured"
        );

        Ok(
            Self::new(detector, TransformPlanner::new(rules), engine, collaborators)
                .with_max_retries(config.workflow.max_retries)
                .with_contextual_detection(config.detection.contextual_enabled),
        )
    }

    /// Set the retry bound, capped at [`MAX_RETRIES`]
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries.min(MAX_RETRIES);
        self
    }

    /// Enable or disable the contextual detector during ingestion
    pub fn with_contextual_detection(mut self, enabled: bool) -> Self {
        self.contextual_enabled = enabled;
        self
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Process one document
    ///
    /// # Errors
    ///
    /// Only fatal errors surface here: [`UnresolvedEntity`] from planning and
    /// [`OffsetOutOfBounds`] from the engine. Collaborator failures are
    /// recorded in [`ProcessingResult::notes`], and a failed quality gate is
    /// reported through [`ProcessingResult::quality_passed`].
    ///
    /// [`UnresolvedEntity`]: crate::domain::AegisError::UnresolvedEntity
    /// [`OffsetOutOfBounds`]: crate::domain::AegisError::OffsetOutOfBounds
    pub async fn process(&self, text: &str, hint: Option<Regulation>) -> Result<ProcessingResult> {
        let run_id = Uuid::new_v4();
        let started = Instant::now();
        crate::log_run_start!(run_id, text.chars().count());

        let mut stage = Stage::Ingest;
        let mut state = WorkflowState::new(text, hint);
        while !stage.is_terminal() {
            (stage, state) = match self.advance(stage, state).await {
                Ok(next) => next,
                Err(err) => {
                    crate::log_error_with_context!(&err, "Processing run aborted");
                    return Err(err);
                }
            };
        }

        let result = Self::finish(run_id, state);
        crate::log_run_complete!(&result.summary, started.elapsed());
        Ok(result)
    }

    /// Run `stage` and return the next stage with the updated state
    pub async fn advance(
        &self,
        stage: Stage,
        mut state: WorkflowState,
    ) -> Result<(Stage, WorkflowState)> {
        tracing::debug!(stage = %stage, retry_count = state.retry_count, "Entering stage");

        let next = match stage {
            Stage::Ingest => {
                self.ingest(&mut state).await?;
                Stage::Classify
            }
            Stage::Classify => {
                self.classify(&mut state).await;
                Stage::Route
            }
            Stage::Route => {
                self.route(&mut state)?;
                Stage::Justify
            }
            Stage::Justify => {
                self.justify(&mut state).await;
                Stage::Anonymize
            }
            Stage::Anonymize => {
                state.output = self
                    .engine
                    .apply(&state.text, &state.plan, state.decision.primary)?;
                Stage::QualityCheck
            }
            Stage::QualityCheck => self.quality_check(&mut state).await?,
            Stage::Done => Stage::Done,
        };

        Ok((next, state))
    }

    async fn ingest(&self, state: &mut WorkflowState) -> Result<()> {
        let pattern = self.detector.detect_patterns(&state.text)?;

        let inferred = if self.contextual_enabled {
            let detected = call_with_timeout(
                "detect_contextual",
                self.collaborators.timeout,
                self.collaborators.contextual.detect_contextual(&state.text),
            )
            .await;
            match detected {
                Ok(entities) => entities,
                Err(err) => {
                    tracing::warn!(error = %err, "Continuing with pattern detection only");
                    state.note("contextual detection unavailable");
                    Vec::new()
                }
            }
        } else {
            Vec::new()
        };

        tracing::debug!(
            pattern = pattern.len(),
            inferred = inferred.len(),
            "Candidates detected"
        );

        let outcome = self.merger.merge(&state.text, pattern, inferred);
        for rejected in &outcome.rejected {
            tracing::warn!(error = %rejected, "Dropped malformed span");
        }
        if !outcome.rejected.is_empty() {
            state.note(format!("{} malformed span(s) dropped", outcome.rejected.len()));
        }
        if !outcome.conflicts.is_empty() {
            state.note(format!(
                "{} overlapping pattern detection(s) dropped",
                outcome.conflicts.len()
            ));
        }
        state.candidates = outcome.entities;
        Ok(())
    }

    async fn classify(&self, state: &mut WorkflowState) {
        let candidates = std::mem::take(&mut state.candidates);
        let classification = self.classifier.classify(candidates, state.hint).await;
        state.entities = classification.entities;
        state.decision = classification.decision;
        for note in classification.notes {
            state.note(note);
        }
    }

    fn route(&self, state: &mut WorkflowState) -> Result<()> {
        state.route = RoutePath::select(&state.decision);
        state.plan = self.planner.plan(&state.entities, &state.decision)?;
        tracing::info!(
            route = %state.route,
            primary = %state.decision.primary,
            actions = state.plan.len(),
            "Document routed"
        );
        Ok(())
    }

    async fn justify(&self, state: &mut WorkflowState) {
        state.justifications = justify(&state.plan, state.route);
        if state.plan.is_empty() {
            return;
        }

        let kinds: Vec<EntityKind> = state
            .plan
            .actions()
            .iter()
            .map(|action| action.entity.kind().clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let regulation = state.route.justification_regulation();
        let fetched = call_with_timeout(
            "fetch_citations",
            self.collaborators.timeout,
            self.collaborators.citations.fetch_citations(regulation, &kinds),
        )
        .await;

        match fetched {
            Ok(citations) => state.citations = citations,
            Err(err) => {
                tracing::warn!(error = %err, "Justifying without citations");
                state.note("citations unavailable");
            }
        }
    }

    async fn quality_check(&self, state: &mut WorkflowState) -> Result<Stage> {
        let report = self
            .gate
            .evaluate(
                &state.output,
                self.collaborators.residual.as_ref(),
                self.collaborators.timeout,
            )
            .await?;
        if !report.residual_checked {
            state.note("residual PII check unavailable");
        }

        let next = if report.passed {
            state.quality_passed = true;
            Stage::Done
        } else if state.retry_count < self.max_retries {
            state.retry_count += 1;
            let reason = format!("{} quality issue(s)", report.issues.len());
            crate::log_retry_attempt!(state.retry_count, self.max_retries, reason.as_str());
            state.plan = state.plan.escalated(&report.offending_actions());
            state.justifications = justify(&state.plan, state.route);
            Stage::Anonymize
        } else {
            state.quality_passed = false;
            tracing::warn!(
                retry_count = state.retry_count,
                issues = report.issues.len(),
                "Quality gate failed after final retry"
            );
            Stage::Done
        };

        state.report = Some(report);
        Ok(next)
    }

    fn finish(run_id: Uuid, state: WorkflowState) -> ProcessingResult {
        let summary = RunSummary::new(
            state.decision.primary,
            state.quality_passed,
            state.retry_count,
            state.output.audit.len(),
        )
        .with_run_id(run_id);

        ProcessingResult {
            anonymized_text: state.output.text,
            entities: state.output.audit,
            primary_regulation: state.decision.primary,
            quality_passed: state.quality_passed,
            retry_count: state.retry_count,
            issues: state.report.map(|report| report.issues).unwrap_or_default(),
            route: state.route,
            justifications: state.justifications,
            citations: state.citations,
            notes: state.notes,
            summary,
        }
    }
}

impl std::fmt::Debug for WorkflowOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkflowOrchestrator")
            .field("max_retries", &self.max_retries)
            .field("contextual_enabled", &self.contextual_enabled)
            .field("collaborators", &self.collaborators)
            .finish_non_exhaustive()
    }
}
