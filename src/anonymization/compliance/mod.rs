//! Compliance module
//!
//! Provides the regulation regimes Aegis plans against and their citation
//! tables.
//!
//! # Regimes
//!
//! ## PCI DSS
//!
//! Payment card data: primary account numbers, security codes and
//! expiry dates. Requirement 3 governs what may be retained.
//!
//! ## HIPAA
//!
//! The Safe Harbor method (45 CFR §164.514(b)(2)) for de-identification of
//! protected health information.
//!
//! ## GDPR
//!
//! The universal baseline: applies to any personal data and is the fallback
//! when nothing more restrictive is present.
//!
//! # Priority
//!
//! The regimes form a fixed total order, `PCI_DSS > HIPAA > GDPR`, used to
//! derive one primary regulation per document:
//!
//! ```
//! use aegis::anonymization::compliance::Regulation;
//!
//! assert!(Regulation::PciDss.priority() > Regulation::Hipaa.priority());
//! assert_eq!(Regulation::Hipaa.to_string(), "HIPAA");
//! assert_eq!("pci dss".parse::<Regulation>().unwrap(), Regulation::PciDss);
//! ```

pub mod gdpr;
pub mod hipaa;
pub mod pci_dss;

use crate::anonymization::models::EntityKind;
use crate::anonymization::planner::Technique;
use crate::domain::AegisError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Data protection regulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Regulation {
    /// General Data Protection Regulation (European Union)
    #[serde(rename = "GDPR")]
    Gdpr,
    /// HIPAA Safe Harbor (United States)
    #[serde(rename = "HIPAA")]
    Hipaa,
    /// Payment Card Industry Data Security Standard
    #[serde(rename = "PCI_DSS")]
    PciDss,
}

impl Regulation {
    /// Rank in the fixed order `PCI_DSS > HIPAA > GDPR`
    pub fn priority(&self) -> u8 {
        match self {
            Self::Gdpr => 1,
            Self::Hipaa => 2,
            Self::PciDss => 3,
        }
    }

    /// Citation backing `technique` for `kind` under this regulation
    pub fn article_for(&self, kind: &EntityKind, technique: Technique) -> &'static str {
        match self {
            Self::Gdpr => gdpr::article_for(kind, technique),
            Self::Hipaa => hipaa::article_for(kind, technique),
            Self::PciDss => pci_dss::article_for(kind, technique),
        }
    }
}

impl fmt::Display for Regulation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gdpr => write!(f, "GDPR"),
            Self::Hipaa => write!(f, "HIPAA"),
            Self::PciDss => write!(f, "PCI_DSS"),
        }
    }
}

impl FromStr for Regulation {
    type Err = AegisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().replace([' ', '-'], "_").as_str() {
            "GDPR" => Ok(Self::Gdpr),
            "HIPAA" | "HIPAA_SAFE_HARBOR" => Ok(Self::Hipaa),
            "PCI_DSS" | "PCI" => Ok(Self::PciDss),
            _ => Err(AegisError::Configuration(format!("Unknown regulation: {s}"))),
        }
    }
}

/// Document-level regulation decision
///
/// Derived once per document and immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegulationDecision {
    /// The most restrictive regime governing technique selection
    pub primary: Regulation,
    /// Every regime any entity (or the caller's hint) brought in
    pub flags: BTreeSet<Regulation>,
}

impl RegulationDecision {
    pub fn new(primary: Regulation, flags: BTreeSet<Regulation>) -> Self {
        Self { primary, flags }
    }

    /// Fold a caller hint in: it is always flagged and raises, never lowers,
    /// the primary regulation
    pub fn with_hint(mut self, hint: Option<Regulation>) -> Self {
        if let Some(hint) = hint {
            self.flags.insert(hint);
            if hint.priority() > self.primary.priority() {
                self.primary = hint;
            }
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&Regulation::PciDss).unwrap();
        assert_eq!(json, "\"PCI_DSS\"");
        let reg: Regulation = serde_json::from_str("\"HIPAA\"").unwrap();
        assert_eq!(reg, Regulation::Hipaa);
    }

    #[test]
    fn test_parse_unknown() {
        assert!("CCPA".parse::<Regulation>().is_err());
    }

    #[test]
    fn test_hint_raises_primary() {
        let decision = RegulationDecision::new(Regulation::Gdpr, BTreeSet::from([Regulation::Gdpr]))
            .with_hint(Some(Regulation::Hipaa));
        assert_eq!(decision.primary, Regulation::Hipaa);
        assert!(decision.flags.contains(&Regulation::Hipaa));
    }

    #[test]
    fn test_hint_never_lowers_primary() {
        let decision =
            RegulationDecision::new(Regulation::PciDss, BTreeSet::from([Regulation::PciDss]))
                .with_hint(Some(Regulation::Gdpr));
        assert_eq!(decision.primary, Regulation::PciDss);
        assert_eq!(decision.flags.len(), 2);
    }
}
