//! Regex-based pattern detector

use super::{patterns::PatternRegistry, PatternDetector};
use crate::anonymization::models::{Entity, EntitySource, TextIndex};
use crate::domain::Result;
use std::collections::BTreeSet;
use std::sync::Arc;

/// Default minimum confidence for a pattern to be used
pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.7;

/// Regex-based pattern detector
#[derive(Debug, Clone)]
pub struct RegexDetector {
    pattern_registry: Arc<PatternRegistry>,
    confidence_threshold: f32,
}

impl RegexDetector {
    /// Create a new regex detector with default patterns
    pub fn new() -> Result<Self> {
        let registry = PatternRegistry::default_patterns()?;
        Ok(Self::with_registry(registry))
    }

    /// Create a new regex detector with custom pattern registry
    pub fn with_registry(registry: PatternRegistry) -> Self {
        Self {
            pattern_registry: Arc::new(registry),
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
        }
    }

    /// Set the confidence threshold
    pub fn with_confidence_threshold(mut self, threshold: f32) -> Self {
        self.confidence_threshold = threshold.clamp(0.0, 1.0);
        self
    }

    pub fn registry(&self) -> &PatternRegistry {
        &self.pattern_registry
    }

    /// Scan with the plain patterns
    fn detect_plain(&self, index: &TextIndex<'_>, entities: &mut Vec<Entity>) -> Result<()> {
        let text = index.text();
        for pattern in self.pattern_registry.all_patterns() {
            if pattern.confidence < self.confidence_threshold {
                continue;
            }

            for matched in pattern.regex.find_iter(text) {
                if matched.start() == matched.end() {
                    continue;
                }
                let (Some(start), Some(end)) = (
                    index.char_offset(matched.start()),
                    index.char_offset(matched.end()),
                ) else {
                    continue;
                };
                let entity = Entity::from_text(
                    pattern.kind.clone(),
                    index,
                    start,
                    end,
                    EntitySource::Pattern,
                )?
                .with_confidence(pattern.confidence);
                entities.push(entity);
            }
        }
        Ok(())
    }

    /// Scan for values anchored by a keyword, reporting every value inside
    /// the window that starts at each keyword occurrence
    fn detect_contextual(&self, index: &TextIndex<'_>, entities: &mut Vec<Entity>) -> Result<()> {
        let text = index.text();
        for pattern in self.pattern_registry.contextual_patterns() {
            if pattern.confidence < self.confidence_threshold {
                continue;
            }

            let mut seen = BTreeSet::new();
            for keyword in pattern.keyword.find_iter(text) {
                let Some(window_start) = index.char_offset(keyword.start()) else {
                    continue;
                };
                let window_end = (window_start + pattern.window).min(index.char_len());
                let Some(window_end_byte) = index.byte_offset(window_end) else {
                    continue;
                };

                let values = pattern
                    .value
                    .find_iter(text)
                    .skip_while(|m| m.start() < keyword.end())
                    .take_while(|m| m.end() <= window_end_byte)
                    .filter(|m| standalone_value(text, m.start(), m.end()));
                for value in values {
                    let (Some(start), Some(end)) =
                        (index.char_offset(value.start()), index.char_offset(value.end()))
                    else {
                        continue;
                    };
                    if start < end && seen.insert((start, end)) {
                        let entity = Entity::from_text(
                            pattern.kind.clone(),
                            index,
                            start,
                            end,
                            EntitySource::Pattern,
                        )?
                        .with_confidence(pattern.confidence);
                        entities.push(entity);
                    }
                }
            }
        }
        Ok(())
    }
}

/// Whether a keyword-anchored match is a value of its own
///
/// Rejects bare years (19xx, 20xx), digit runs glued to `-`, `_`, `*`, `/`
/// or a decimal point, and digit runs right after a group of mask
/// characters. Generated replacements take these shapes: a generalized
/// date, a `Subject-001` suffix, a `902**` ZIP prefix, the visible tail of
/// a mask such as `**** 5678`.
fn standalone_value(text: &str, start: usize, end: usize) -> bool {
    let value = &text[start..end];
    if value.len() == 4
        && value.chars().all(|c| c.is_ascii_digit())
        && (value.starts_with("19") || value.starts_with("20"))
    {
        return false;
    }

    let glued = |c: char| matches!(c, '-' | '_' | '*' | '/');
    let mut before = text[..start].chars().rev();
    let mut after = text[end..].chars();
    let decimal = |c: Option<char>, next: Option<char>| {
        c == Some('.') && next.is_some_and(|n| n.is_ascii_digit())
    };

    if text[..start].trim_end().ends_with('*') {
        return false;
    }

    match before.next() {
        Some(c) if glued(c) => return false,
        prev => {
            if decimal(prev, before.next()) {
                return false;
            }
        }
    }
    match after.next() {
        Some(c) if glued(c) => false,
        next => !decimal(next, after.next()),
    }
}

impl PatternDetector for RegexDetector {
    fn detect_patterns(&self, text: &str) -> Result<Vec<Entity>> {
        let index = TextIndex::new(text);
        let mut entities = Vec::new();
        self.detect_plain(&index, &mut entities)?;
        self.detect_contextual(&index, &mut entities)?;

        tracing::debug!(count = entities.len(), "Pattern detection complete");
        Ok(entities)
    }

    fn confidence_threshold(&self) -> f32 {
        self.confidence_threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anonymization::models::EntityKind;

    fn kinds(entities: &[Entity]) -> Vec<&EntityKind> {
        entities.iter().map(|e| &e.kind).collect()
    }

    #[test]
    fn test_detect_email() {
        let detector = RegexDetector::new().unwrap();
        let entities = detector
            .detect_patterns("Contact: john.doe@example.com")
            .unwrap();

        let email = entities
            .iter()
            .find(|e| e.kind == EntityKind::Email)
            .unwrap();
        assert_eq!(email.raw_value, "john.doe@example.com");
        assert_eq!((email.start, email.end), (9, 29));
    }

    #[test]
    fn test_detect_phone() {
        let detector = RegexDetector::new().unwrap();
        let entities = detector.detect_patterns("Call (555) 123-4567").unwrap();
        assert!(kinds(&entities).contains(&&EntityKind::Phone));
    }

    #[test]
    fn test_offsets_are_char_based() {
        let detector = RegexDetector::new().unwrap();
        let text = "Añadir teléfono: ana@ñandú.cl o ana@mail.cl";
        let entities = detector.detect_patterns(text).unwrap();

        let email = entities
            .iter()
            .find(|e| e.raw_value == "ana@mail.cl")
            .unwrap();
        let chars: Vec<char> = text.chars().collect();
        let sliced: String = chars[email.start..email.end].iter().collect();
        assert_eq!(sliced, "ana@mail.cl");
    }

    #[test]
    fn test_cvv_needs_keyword() {
        let detector = RegexDetector::new().unwrap();

        let entities = detector.detect_patterns("CVV: 123").unwrap();
        let cvv = entities
            .iter()
            .find(|e| e.kind == EntityKind::Cvv)
            .unwrap();
        assert_eq!(cvv.raw_value, "123");
        assert_eq!(cvv.confidence, 0.95);

        let entities = detector.detect_patterns("Room 123").unwrap();
        assert!(!kinds(&entities).contains(&&EntityKind::Cvv));
    }

    #[test]
    fn test_every_value_in_cvv_window_is_reported() {
        let detector = RegexDetector::new().unwrap();
        let entities = detector
            .detect_patterns("CVV 123. Order 4567 shipped")
            .unwrap();
        let values: Vec<&str> = entities
            .iter()
            .filter(|e| e.kind == EntityKind::Cvv)
            .map(|e| e.raw_value.as_str())
            .collect();
        assert_eq!(values, vec!["123", "4567"]);
    }

    #[test]
    fn test_generated_shapes_are_not_cvv_values() {
        let detector = RegexDetector::new().unwrap();
        for text in [
            "cvv <CVV_0> exp 2025",
            "cvv <CVV_0> holder Subject-001",
            "cvv <CVV_0> zip 902**",
            "cvv <CVV_0> card ************1111",
            "cvv <CVV_0> phone +** * **** 5678",
            "cvv <CVV_0> date 1987",
        ] {
            let entities = detector.detect_patterns(text).unwrap();
            assert!(!kinds(&entities).contains(&&EntityKind::Cvv), "{text}");
        }
    }

    #[test]
    fn test_standalone_value_edges() {
        let text = "123. 7.250 v-456 789";
        assert!(standalone_value(text, 0, 3));
        assert!(!standalone_value(text, 7, 10));
        assert!(!standalone_value(text, 13, 16));
        assert!(standalone_value(text, 17, 20));
    }

    #[test]
    fn test_cvv_outside_window_is_ignored() {
        let detector = RegexDetector::new().unwrap();
        let padding = "x".repeat(60);
        let text = format!("security code {padding} 456");
        let entities = detector.detect_patterns(&text).unwrap();
        assert!(!kinds(&entities).contains(&&EntityKind::Cvv));
    }

    #[test]
    fn test_threshold_skips_weak_patterns() {
        let detector = RegexDetector::new()
            .unwrap()
            .with_confidence_threshold(0.8);
        let entities = detector.detect_patterns("Zip 90210").unwrap();
        assert!(!kinds(&entities).contains(&&EntityKind::ZipCode));

        let detector = RegexDetector::new().unwrap();
        let entities = detector.detect_patterns("Zip 90210").unwrap();
        assert!(kinds(&entities).contains(&&EntityKind::ZipCode));
    }

    #[test]
    fn test_tokens_are_not_detected() {
        let detector = RegexDetector::new().unwrap();
        let entities = detector
            .detect_patterns("<CREDIT_CARD_0> <EMAIL_12> <CVV_3> Subject-001 ****@b.com")
            .unwrap();
        assert!(entities.iter().all(|e| e.kind != EntityKind::CreditCard));
        assert!(entities.iter().all(|e| e.kind != EntityKind::Cvv));
        assert!(entities.iter().all(|e| e.kind != EntityKind::Email));
    }
}
