//! Pattern library for entity detection

use crate::anonymization::models::EntityKind;
use anyhow::{Context, Result};
use regex::Regex;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Pattern definition from TOML
#[derive(Debug, Clone, Deserialize)]
pub struct PatternDefinition {
    /// Regex patterns for this kind
    pub patterns: Vec<String>,
    /// Confidence score (0.0 - 1.0)
    pub confidence: f32,
    /// Entity kind reported for matches
    pub kind: String,
}

/// Keyword-anchored pattern definition from TOML
#[derive(Debug, Clone, Deserialize)]
pub struct ContextualDefinition {
    pub keywords: Vec<String>,
    pub pattern: String,
    /// Chars after the keyword start that are searched
    pub window: usize,
    pub confidence: f32,
    pub kind: String,
}

/// Compiled pattern with metadata
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    pub regex: Regex,
    pub kind: EntityKind,
    pub confidence: f32,
}

/// Compiled keyword-anchored pattern
#[derive(Debug, Clone)]
pub struct ContextualPattern {
    /// Case-insensitive alternation of every keyword
    pub keyword: Regex,
    pub value: Regex,
    pub window: usize,
    pub kind: EntityKind,
    pub confidence: f32,
}

/// Pattern library container
#[derive(Debug, Deserialize)]
struct PatternLibrary {
    patterns: BTreeMap<String, PatternDefinition>,
    #[serde(default)]
    contextual: BTreeMap<String, ContextualDefinition>,
}

/// Pattern registry for entity detection
#[derive(Debug)]
pub struct PatternRegistry {
    patterns: Vec<CompiledPattern>,
    contextual: Vec<ContextualPattern>,
}

impl PatternRegistry {
    /// Create a new pattern registry from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).with_context(|| {
            format!(
                "Failed to read pattern library: {}",
                path.as_ref().display()
            )
        })?;

        Self::from_toml(&content)
    }

    /// Create a pattern registry from TOML content
    pub fn from_toml(content: &str) -> Result<Self> {
        let library: PatternLibrary =
            toml::from_str(content).context("Failed to parse pattern library TOML")?;

        let mut patterns = Vec::new();
        for (name, def) in library.patterns {
            let kind = EntityKind::from(def.kind.as_str());
            for pattern_str in &def.patterns {
                let regex = Regex::new(pattern_str)
                    .with_context(|| format!("Invalid regex in pattern '{name}': {pattern_str}"))?;
                patterns.push(CompiledPattern {
                    regex,
                    kind: kind.clone(),
                    confidence: def.confidence,
                });
            }
        }

        let mut contextual = Vec::new();
        for (name, def) in library.contextual {
            if def.keywords.is_empty() {
                anyhow::bail!("Contextual pattern '{name}' has no keywords");
            }
            let alternation = def
                .keywords
                .iter()
                .map(|k| regex::escape(k))
                .collect::<Vec<_>>()
                .join("|");
            let keyword = Regex::new(&format!(r"(?i)\b(?:{alternation})\b"))
                .with_context(|| format!("Invalid keywords in contextual pattern '{name}'"))?;
            let value = Regex::new(&def.pattern).with_context(|| {
                format!("Invalid regex in contextual pattern '{name}': {}", def.pattern)
            })?;
            contextual.push(ContextualPattern {
                keyword,
                value,
                window: def.window,
                kind: EntityKind::from(def.kind.as_str()),
                confidence: def.confidence,
            });
        }

        Ok(Self {
            patterns,
            contextual,
        })
    }

    /// Create a default pattern registry with built-in patterns
    pub fn default_patterns() -> Result<Self> {
        let default_toml = include_str!("../../../../patterns/pii_patterns.toml");
        Self::from_toml(default_toml)
    }

    /// Get all plain patterns
    pub fn all_patterns(&self) -> &[CompiledPattern] {
        &self.patterns
    }

    /// Get all keyword-anchored patterns
    pub fn contextual_patterns(&self) -> &[ContextualPattern] {
        &self.contextual
    }

    /// Get patterns reporting a specific kind
    pub fn patterns_for_kind(&self, kind: &EntityKind) -> Vec<&CompiledPattern> {
        self.patterns.iter().filter(|p| &p.kind == kind).collect()
    }
}
