//! Replacement generation module
//!
//! Produces the replacement string for one span given its technique. The
//! stateful generators (tokens, pseudonyms) live in a [`ReplacementContext`]
//! that is created fresh for every engine pass and never shared between
//! documents.

pub mod generalization;
pub mod masking;
pub mod pseudonym;
pub mod redaction;
pub mod tokenization;

use crate::anonymization::models::EntityKind;
use crate::anonymization::planner::Technique;
use sha2::{Digest, Sha256};

pub use pseudonym::PseudonymStrategy;
pub use tokenization::TokenStrategy;

/// Default number of leading chars kept by truncation
pub const DEFAULT_TRUNCATE_KEEP_CHARS: usize = 4;

/// Default pseudonym prefix for person kinds
pub const DEFAULT_PSEUDONYM_PREFIX: &str = "Subject";

/// Tunables for replacement generation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplacementOptions {
    pub truncate_keep_chars: usize,
    pub pseudonym_prefix: String,
}

impl Default for ReplacementOptions {
    fn default() -> Self {
        Self {
            truncate_keep_chars: DEFAULT_TRUNCATE_KEEP_CHARS,
            pseudonym_prefix: DEFAULT_PSEUDONYM_PREFIX.to_string(),
        }
    }
}

/// Run-scoped replacement state
#[derive(Debug)]
pub struct ReplacementContext {
    options: ReplacementOptions,
    tokens: TokenStrategy,
    pseudonyms: PseudonymStrategy,
}

impl ReplacementContext {
    pub fn new(options: ReplacementOptions) -> Self {
        let pseudonyms = PseudonymStrategy::new(options.pseudonym_prefix.clone());
        Self {
            options,
            tokens: TokenStrategy::new(),
            pseudonyms,
        }
    }

    /// Replacement for `value` of `kind` under `technique`
    pub fn replacement(&mut self, technique: Technique, kind: &EntityKind, value: &str) -> String {
        match technique {
            Technique::Remove => redaction::remove(),
            Technique::Truncate => redaction::truncate(value, self.options.truncate_keep_chars),
            Technique::Tokenize => self.tokens.token_for(kind, value),
            Technique::Pseudonymize => self.pseudonyms.pseudonym_for(kind, value),
            Technique::Mask => masking::mask(kind, value),
            Technique::Generalize => generalization::generalize(kind, value),
            Technique::Keep => value.to_string(),
        }
    }
}

impl Default for ReplacementContext {
    fn default() -> Self {
        Self::new(ReplacementOptions::default())
    }
}

/// Trim, lowercase and collapse inner whitespace
pub fn normalize(value: &str) -> String {
    value
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Lookup key for a `(kind, value)` pair
///
/// A SHA-256 digest of the kind and normalized value, so run-scoped maps
/// never hold raw values.
pub fn value_key(kind: &EntityKind, value: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(kind.as_str().as_bytes());
    hasher.update([0u8]);
    hasher.update(normalize(value).as_bytes());
    format!("{:x}", hasher.finalize())
}
