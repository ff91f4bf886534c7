//! Pseudonymization strategy

use super::{value_key, DEFAULT_PSEUDONYM_PREFIX};
use crate::anonymization::models::EntityKind;
use std::collections::HashMap;

/// Pseudonymization strategy - stable `<Prefix>-NNN` replacements
///
/// The first occurrence of a `(kind, normalized value)` pair allocates the
/// next number for its prefix; every later occurrence gets the same string.
/// The registry lives for one run only.
#[derive(Debug)]
pub struct PseudonymStrategy {
    person_prefix: String,
    counters: HashMap<String, usize>,
    registry: HashMap<String, String>,
}

impl PseudonymStrategy {
    pub fn new(person_prefix: impl Into<String>) -> Self {
        Self {
            person_prefix: person_prefix.into(),
            counters: HashMap::new(),
            registry: HashMap::new(),
        }
    }

    pub fn pseudonym_for(&mut self, kind: &EntityKind, value: &str) -> String {
        let key = value_key(kind, value);
        if let Some(existing) = self.registry.get(&key) {
            return existing.clone();
        }

        let prefix = self.prefix_for(kind);
        let counter = self.counters.entry(prefix.clone()).or_insert(0);
        *counter += 1;
        let pseudonym = format!("{prefix}-{counter:03}");

        self.registry.insert(key, pseudonym.clone());
        pseudonym
    }

    fn prefix_for(&self, kind: &EntityKind) -> String {
        if kind.is_person() {
            return self.person_prefix.clone();
        }
        match kind {
            EntityKind::Organization => "Organization".to_string(),
            other => title_case(other.as_str()),
        }
    }
}

impl Default for PseudonymStrategy {
    fn default() -> Self {
        Self::new(DEFAULT_PSEUDONYM_PREFIX)
    }
}

/// `national_id` -> `NationalId`
fn title_case(name: &str) -> String {
    let title: String = name
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect();
    if title.is_empty() {
        "Entity".to_string()
    } else {
        title
    }
}
