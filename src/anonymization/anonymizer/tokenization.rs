//! Tokenization strategy

use super::value_key;
use crate::anonymization::models::EntityKind;
use std::collections::HashMap;

/// Tokenization strategy - replaces values with `<LABEL_n>` placeholders
///
/// `n` counts per kind from 0. A repeated `(kind, value)` pair gets its
/// first token back. The digits follow an underscore, so a token is never a
/// standalone number and never re-triggers a pattern.
#[derive(Debug, Default)]
pub struct TokenStrategy {
    /// Next counter per kind label
    counters: HashMap<String, usize>,
    /// Issued tokens by [`value_key`]
    vault: HashMap<String, String>,
}

impl TokenStrategy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn token_for(&mut self, kind: &EntityKind, value: &str) -> String {
        let key = value_key(kind, value);
        if let Some(token) = self.vault.get(&key) {
            return token.clone();
        }

        let label = kind.label();
        let counter = self.counters.entry(label.clone()).or_insert(0);
        let token = format!("<{label}_{counter}>");
        *counter += 1;

        self.vault.insert(key, token.clone());
        token
    }

    /// Number of distinct values tokenized
    pub fn len(&self) -> usize {
        self.vault.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vault.is_empty()
    }
}
