//! Transform planning
//!
//! Maps every classified entity to exactly one [`Technique`] through an
//! ordered, first-match rule list keyed on `(kind, sensitivity, primary
//! regulation)`. The default rules ship embedded; a replacement rule file can
//! be loaded from disk.

use crate::anonymization::compliance::{Regulation, RegulationDecision};
use crate::anonymization::models::{ClassifiedEntity, EntityKind, Sensitivity, Span};
use crate::domain::{AegisError, Result};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// Text transformation applied to one span
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Technique {
    Remove,
    Truncate,
    Tokenize,
    Pseudonymize,
    Mask,
    Generalize,
    Keep,
}

impl Technique {
    /// Next stronger technique, used when the quality gate rejects an output
    ///
    /// `Keep` is an explicit whitelist decision and never escalates.
    pub fn escalate(self) -> Self {
        match self {
            Self::Truncate | Self::Generalize => Self::Mask,
            Self::Pseudonymize => Self::Tokenize,
            Self::Mask | Self::Tokenize | Self::Remove => Self::Remove,
            Self::Keep => Self::Keep,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Remove => "remove",
            Self::Truncate => "truncate",
            Self::Tokenize => "tokenize",
            Self::Pseudonymize => "pseudonymize",
            Self::Mask => "mask",
            Self::Generalize => "generalize",
            Self::Keep => "keep",
        }
    }
}

impl fmt::Display for Technique {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One planning rule; an omitted list matches everything
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanningRule {
    pub technique: Technique,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kinds: Option<Vec<EntityKind>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sensitivities: Option<Vec<Sensitivity>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regulations: Option<Vec<Regulation>>,
}

impl PlanningRule {
    pub fn matches(&self, kind: &EntityKind, sensitivity: Sensitivity, regulation: Regulation) -> bool {
        self.kinds.as_ref().map_or(true, |k| k.contains(kind))
            && self
                .sensitivities
                .as_ref()
                .map_or(true, |s| s.contains(&sensitivity))
            && self
                .regulations
                .as_ref()
                .map_or(true, |r| r.contains(&regulation))
    }
}

/// Ordered rule list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleSet {
    pub rules: Vec<PlanningRule>,
}

impl RuleSet {
    /// Load a rule set from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).with_context(|| {
            format!("Failed to read planning rules: {}", path.as_ref().display())
        })?;
        Self::from_toml(&content)
    }

    /// Parse a rule set from TOML content
    pub fn from_toml(content: &str) -> Result<Self> {
        let rules: RuleSet =
            toml::from_str(content).context("Failed to parse planning rules TOML")?;
        if rules.rules.is_empty() {
            return Err(AegisError::Configuration(
                "Planning rule set contains no rules".to_string(),
            ));
        }
        Ok(rules)
    }

    /// The embedded default rule set
    pub fn default_rules() -> Result<Self> {
        Self::from_toml(include_str!("../../rules/planning_rules.toml"))
    }

    /// First rule matching the triple
    pub fn select(
        &self,
        kind: &EntityKind,
        sensitivity: Sensitivity,
        regulation: Regulation,
    ) -> Option<Technique> {
        self.rules
            .iter()
            .find(|rule| rule.matches(kind, sensitivity, regulation))
            .map(|rule| rule.technique)
    }
}

/// One planned transformation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformAction {
    pub entity: ClassifiedEntity,
    pub technique: Technique,
    /// Filled in by the engine at apply time
    #[serde(default)]
    pub replacement: String,
}

impl TransformAction {
    pub fn new(entity: ClassifiedEntity, technique: Technique) -> Self {
        Self {
            entity,
            technique,
            replacement: String::new(),
        }
    }

    pub fn span(&self) -> Span {
        self.entity.span()
    }
}

/// Actions sorted by `start` ascending
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransformationPlan {
    actions: Vec<TransformAction>,
}

impl TransformationPlan {
    pub fn new(mut actions: Vec<TransformAction>) -> Self {
        actions.sort_by_key(|a| (a.entity.entity.start, a.entity.entity.end));
        Self { actions }
    }

    pub fn actions(&self) -> &[TransformAction] {
        &self.actions
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Check that every action lies inside a text of `text_len` chars and
    /// that no two actions overlap
    pub fn validate(&self, text_len: usize) -> Result<()> {
        let mut previous_end = 0;
        for action in &self.actions {
            let span = action.span();
            if span.start >= span.end || span.end > text_len || span.start < previous_end {
                return Err(AegisError::OffsetOutOfBounds {
                    start: span.start,
                    end: span.end,
                    text_len,
                });
            }
            previous_end = span.end;
        }
        Ok(())
    }

    /// Copy of the plan with the actions at `offending` escalated one step
    pub fn escalated(&self, offending: &BTreeSet<usize>) -> Self {
        let actions = self
            .actions
            .iter()
            .enumerate()
            .map(|(i, action)| {
                let mut action = action.clone();
                if offending.contains(&i) {
                    let next = action.technique.escalate();
                    tracing::debug!(
                        kind = %action.entity.kind(),
                        from = %action.technique,
                        to = %next,
                        "Escalating technique"
                    );
                    action.technique = next;
                }
                action.replacement.clear();
                action
            })
            .collect();
        Self { actions }
    }
}

/// Maps classified entities to techniques
#[derive(Debug, Clone)]
pub struct TransformPlanner {
    rules: Arc<RuleSet>,
}

impl TransformPlanner {
    pub fn new(rules: RuleSet) -> Self {
        Self {
            rules: Arc::new(rules),
        }
    }

    /// Planner using the embedded default rules
    pub fn with_default_rules() -> Result<Self> {
        Ok(Self::new(RuleSet::default_rules()?))
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Build the plan for one document
    ///
    /// # Errors
    ///
    /// [`AegisError::UnresolvedEntity`] when no rule covers an entity's
    /// `(kind, sensitivity, primary regulation)` triple.
    pub fn plan(
        &self,
        entities: &[ClassifiedEntity],
        decision: &RegulationDecision,
    ) -> Result<TransformationPlan> {
        let actions = entities
            .iter()
            .map(|entity| {
                let technique = self
                    .rules
                    .select(entity.kind(), entity.sensitivity, decision.primary)
                    .ok_or_else(|| AegisError::UnresolvedEntity {
                        kind: entity.kind().clone(),
                        sensitivity: entity.sensitivity,
                        regulation: decision.primary,
                    })?;
                Ok(TransformAction::new(entity.clone(), technique))
            })
            .collect::<Result<Vec<_>>>()?;

        let plan = TransformationPlan::new(actions);
        tracing::debug!(
            actions = plan.len(),
            regulation = %decision.primary,
            "Transformation plan built"
        );
        Ok(plan)
    }
}
