//! Main anonymization engine
//!
//! This module provides the [`AnonymizationEngine`] that turns a
//! [`TransformationPlan`] into anonymized text and an audit trail.
//!
//! # Offset safety
//!
//! Actions are spliced strictly right to left. Every mutation so far lies to
//! the right of the next span, so the next span's offsets into the original
//! text are still valid in the partially rewritten buffer and are never
//! re-derived.
//!
//! # Examples
//!
//! ```
//! use aegis::anonymization::compliance::Regulation;
//! use aegis::anonymization::engine::AnonymizationEngine;
//! use aegis::anonymization::models::{ClassifiedEntity, Entity, EntityKind, EntitySource, Sensitivity};
//! use aegis::anonymization::planner::{Technique, TransformAction, TransformationPlan};
//! use std::collections::BTreeSet;
//!
//! # fn example() -> aegis::Result<()> {
//! let text = "mail a@b.com";
//! let entity = Entity::new(EntityKind::Email, 5, 12, "a@b.com", EntitySource::Pattern);
//! let classified = ClassifiedEntity::new(entity, Sensitivity::Medium, BTreeSet::new());
//! let plan = TransformationPlan::new(vec![TransformAction::new(classified, Technique::Mask)]);
//!
//! let output = AnonymizationEngine::default().apply(text, &plan, Regulation::Gdpr)?;
//! assert_eq!(output.text, "mail ****@b.com");
//! assert_eq!(output.audit.len(), 1);
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

use crate::anonymization::anonymizer::{ReplacementContext, ReplacementOptions};
use crate::anonymization::audit::AuditEntry;
use crate::anonymization::compliance::Regulation;
use crate::anonymization::models::{Span, TextIndex};
use crate::anonymization::planner::{TransformAction, TransformationPlan};
use crate::domain::{AegisError, Result};

/// Result of applying a plan
#[derive(Debug, Clone, PartialEq)]
pub struct AnonymizationOutput {
    /// Anonymized text
    pub text: String,
    /// Plan actions with their replacements filled in, in plan order
    pub actions: Vec<TransformAction>,
    /// One entry per action, in plan order
    pub audit: Vec<AuditEntry>,
    /// Char span each replacement occupies in [`Self::text`], in plan order
    pub output_spans: Vec<Span>,
}

/// Applies transformation plans
///
/// Holds configuration only. Each [`apply`](Self::apply) call builds its own
/// [`ReplacementContext`], so the engine can be shared across concurrent
/// documents and re-applying a plan always yields the same output.
#[derive(Debug, Clone, Default)]
pub struct AnonymizationEngine {
    options: ReplacementOptions,
}

impl AnonymizationEngine {
    pub fn new(options: ReplacementOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ReplacementOptions {
        &self.options
    }

    /// Apply `plan` to `text`
    ///
    /// # Errors
    ///
    /// [`AegisError::OffsetOutOfBounds`] when an action lies outside the text,
    /// overlaps another action, or does not fall on char boundaries. The text
    /// is never partially rewritten in that case.
    pub fn apply(
        &self,
        text: &str,
        plan: &TransformationPlan,
        regulation: Regulation,
    ) -> Result<AnonymizationOutput> {
        let index = TextIndex::new(text);
        let text_len = index.char_len();
        plan.validate(text_len)?;

        let mut context = ReplacementContext::new(self.options.clone());
        let mut actions = Vec::with_capacity(plan.len());
        let mut byte_ranges = Vec::with_capacity(plan.len());
        for action in plan.actions() {
            let span = action.span();
            let out_of_bounds = || AegisError::OffsetOutOfBounds {
                start: span.start,
                end: span.end,
                text_len,
            };
            let from = index.byte_offset(span.start).ok_or_else(out_of_bounds)?;
            let to = index.byte_offset(span.end).ok_or_else(out_of_bounds)?;
            let original = text.get(from..to).ok_or_else(out_of_bounds)?;

            let mut applied = action.clone();
            applied.replacement = context.replacement(action.technique, action.entity.kind(), original);
            actions.push(applied);
            byte_ranges.push(from..to);
        }

        let mut buffer = text.to_string();
        for (action, range) in actions.iter().zip(byte_ranges).rev() {
            if range.end > buffer.len()
                || !buffer.is_char_boundary(range.start)
                || !buffer.is_char_boundary(range.end)
            {
                let span = action.span();
                return Err(AegisError::OffsetOutOfBounds {
                    start: span.start,
                    end: span.end,
                    text_len,
                });
            }
            buffer.replace_range(range, &action.replacement);
            tracing::debug!(
                kind = %action.entity.kind(),
                start = action.entity.entity.start,
                end = action.entity.entity.end,
                technique = %action.technique,
                "Applied transformation"
            );
        }

        let mut shift: isize = 0;
        let mut output_spans = Vec::with_capacity(actions.len());
        let mut audit = Vec::with_capacity(actions.len());
        for action in &actions {
            let span = action.span();
            let replacement_length = action.replacement.chars().count();
            let start = span.start.saturating_add_signed(shift);
            output_spans.push(Span::new(start, start + replacement_length));
            shift += replacement_length as isize - span.len() as isize;

            audit.push(AuditEntry {
                entity_kind: action.entity.kind().clone(),
                sensitivity: action.entity.sensitivity,
                technique: action.technique,
                original_span: span,
                replacement_length,
                regulation,
            });
        }

        Ok(AnonymizationOutput {
            text: buffer,
            actions,
            audit,
            output_spans,
        })
    }
}
