//! Span merging
//!
//! Folds the pattern and contextual candidate lists into one overlap-free,
//! start-sorted entity list. Pattern detections win over inferred ones on
//! overlap. A pattern detection nested inside an earlier one of the same
//! kind is absorbed; any other overlap between pattern detections keeps the
//! earlier one and records the conflict.

use crate::anonymization::models::{Entity, EntitySource, TextIndex};
use crate::domain::AegisError;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Overlap between two pattern detections that could not be merged
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergeConflict {
    pub kept: Entity,
    pub dropped: Entity,
}

/// Result of a merge
#[derive(Debug, Clone, Default)]
pub struct MergeOutcome {
    /// Overlap-free, sorted by `start`
    pub entities: Vec<Entity>,
    /// Candidates with invalid offsets (`MalformedSpan`), dropped
    pub rejected: Vec<AegisError>,
    pub conflicts: Vec<MergeConflict>,
}

/// Combines candidate lists from independent detectors over one text
#[derive(Debug, Clone, Copy, Default)]
pub struct SpanMerger;

impl SpanMerger {
    pub fn new() -> Self {
        Self
    }

    /// Merge `pattern` and `inferred` candidates detected over `text`
    ///
    /// Every accepted entity's `raw_value` is re-sliced from `text`, so a
    /// detector reporting a stale value cannot leak it downstream.
    pub fn merge(&self, text: &str, pattern: Vec<Entity>, inferred: Vec<Entity>) -> MergeOutcome {
        let index = TextIndex::new(text);
        let text_len = index.char_len();
        let mut outcome = MergeOutcome::default();

        let mut candidates = Vec::with_capacity(pattern.len() + inferred.len());
        for mut entity in pattern.into_iter().chain(inferred) {
            match index.slice(entity.start, entity.end) {
                Some(raw) => {
                    entity.raw_value = raw.to_string();
                    candidates.push(entity);
                }
                None => {
                    let err = AegisError::MalformedSpan {
                        start: entity.start,
                        end: entity.end,
                        text_len,
                    };
                    tracing::warn!(
                        kind = %entity.kind,
                        start = entity.start,
                        end = entity.end,
                        "Dropping malformed span"
                    );
                    outcome.rejected.push(err);
                }
            }
        }

        candidates.sort_by(candidate_order);

        let mut accepted: Vec<Entity> = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            let Some(last) = accepted.last_mut() else {
                accepted.push(candidate);
                continue;
            };
            if !last.overlaps(&candidate) {
                accepted.push(candidate);
                continue;
            }

            match (last.source, candidate.source) {
                (EntitySource::Inferred, EntitySource::Pattern) => {
                    tracing::debug!(
                        evicted = %last.kind,
                        kind = %candidate.kind,
                        start = candidate.start,
                        "Pattern detection replaces inferred span"
                    );
                    accepted.pop();
                    accepted.push(candidate);
                }
                (EntitySource::Pattern, EntitySource::Pattern) => {
                    let nested = candidate.start >= last.start && candidate.end <= last.end;
                    if nested && last.kind == candidate.kind {
                        last.confidence = last.confidence.max(candidate.confidence);
                    } else {
                        tracing::debug!(
                            kept = %last.kind,
                            dropped = %candidate.kind,
                            start = candidate.start,
                            "Overlapping pattern detections"
                        );
                        outcome.conflicts.push(MergeConflict {
                            kept: last.clone(),
                            dropped: candidate,
                        });
                    }
                }
                (_, EntitySource::Inferred) => {
                    tracing::trace!(
                        kind = %candidate.kind,
                        start = candidate.start,
                        "Dropping overlapped inferred span"
                    );
                }
            }
        }

        outcome.entities = accepted;
        outcome
    }
}

/// `start` ascending, longer spans first, pattern before inferred, then kind
fn candidate_order(a: &Entity, b: &Entity) -> Ordering {
    a.start
        .cmp(&b.start)
        .then_with(|| b.end.cmp(&a.end))
        .then_with(|| a.source.cmp(&b.source))
        .then_with(|| a.kind.cmp(&b.kind))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anonymization::models::EntityKind;

    const TEXT: &str = "Jane Doe paid with 4111111111111111 on 12/25";

    fn pattern(kind: EntityKind, start: usize, end: usize) -> Entity {
        Entity::new(kind, start, end, "", EntitySource::Pattern)
    }

    fn inferred(kind: EntityKind, start: usize, end: usize) -> Entity {
        Entity::new(kind, start, end, "", EntitySource::Inferred)
    }

    #[test]
    fn test_disjoint_lists_are_interleaved() {
        let outcome = SpanMerger::new().merge(
            TEXT,
            vec![pattern(EntityKind::CreditCard, 19, 35)],
            vec![inferred(EntityKind::PersonName, 0, 8)],
        );
        let kinds: Vec<_> = outcome.entities.iter().map(|e| e.kind.clone()).collect();
        assert_eq!(kinds, vec![EntityKind::PersonName, EntityKind::CreditCard]);
        assert_eq!(outcome.entities[0].raw_value, "Jane Doe");
        assert_eq!(outcome.entities[1].raw_value, "4111111111111111");
    }

    #[test]
    fn test_pattern_evicts_inferred() {
        let outcome = SpanMerger::new().merge(
            TEXT,
            vec![pattern(EntityKind::CreditCard, 19, 35)],
            vec![inferred(EntityKind::AccountNumber, 14, 30)],
        );
        assert_eq!(outcome.entities.len(), 1);
        assert_eq!(outcome.entities[0].kind, EntityKind::CreditCard);
        assert!(outcome.conflicts.is_empty());
    }

    #[test]
    fn test_inferred_overlapping_pattern_is_dropped() {
        let outcome = SpanMerger::new().merge(
            TEXT,
            vec![pattern(EntityKind::CreditCard, 19, 35)],
            vec![inferred(EntityKind::AccountNumber, 25, 40)],
        );
        assert_eq!(outcome.entities.len(), 1);
        assert_eq!(outcome.entities[0].source, EntitySource::Pattern);
    }

    #[test]
    fn test_identical_pattern_spans_merge() {
        let outcome = SpanMerger::new().merge(
            TEXT,
            vec![
                pattern(EntityKind::Date, 39, 44).with_confidence(0.8),
                pattern(EntityKind::Date, 39, 44).with_confidence(0.9),
            ],
            vec![],
        );
        assert_eq!(outcome.entities.len(), 1);
        assert_eq!(outcome.entities[0].confidence, 0.9);
        assert!(outcome.conflicts.is_empty());
    }

    #[test]
    fn test_nested_same_kind_pattern_is_absorbed() {
        let outcome = SpanMerger::new().merge(
            TEXT,
            vec![
                pattern(EntityKind::Date, 3, 10).with_confidence(0.95),
                pattern(EntityKind::Date, 0, 10),
            ],
            Vec::new(),
        );
        assert_eq!(outcome.entities.len(), 1);
        assert_eq!((outcome.entities[0].start, outcome.entities[0].end), (0, 10));
        assert!(outcome.conflicts.is_empty());
    }

    #[test]
    fn test_overlapping_patterns_keep_earlier() {
        let outcome = SpanMerger::new().merge(
            TEXT,
            vec![
                pattern(EntityKind::Phone, 25, 38),
                pattern(EntityKind::CreditCard, 19, 35),
            ],
            vec![],
        );
        assert_eq!(outcome.entities.len(), 1);
        assert_eq!(outcome.entities[0].kind, EntityKind::CreditCard);
        assert_eq!(outcome.conflicts.len(), 1);
        assert_eq!(outcome.conflicts[0].dropped.kind, EntityKind::Phone);
    }

    #[test]
    fn test_malformed_spans_are_rejected() {
        let outcome = SpanMerger::new().merge(
            TEXT,
            vec![pattern(EntityKind::Email, 5, 5), pattern(EntityKind::Email, 40, 99)],
            vec![inferred(EntityKind::PersonName, 8, 2)],
        );
        assert!(outcome.entities.is_empty());
        assert_eq!(outcome.rejected.len(), 3);
        assert!(outcome
            .rejected
            .iter()
            .all(|e| matches!(e, AegisError::MalformedSpan { .. })));

        let copy = outcome.clone();
        assert_eq!(copy.rejected.len(), 3);
        assert_eq!(copy.rejected[0].to_string(), outcome.rejected[0].to_string());
    }

    #[test]
    fn test_pattern_evicts_chain_of_inferred() {
        let outcome = SpanMerger::new().merge(
            TEXT,
            vec![pattern(EntityKind::CreditCard, 19, 35)],
            vec![
                inferred(EntityKind::PersonName, 10, 20),
                inferred(EntityKind::AccountNumber, 19, 30),
            ],
        );
        assert_eq!(outcome.entities.len(), 1);
        assert_eq!(outcome.entities[0].kind, EntityKind::CreditCard);
    }
}
