//! Justification routing
//!
//! The Route stage picks one [`RoutePath`] per document. Each path names
//! the regulation whose article tables back the justification of every
//! planned action.

use crate::anonymization::compliance::{Regulation, RegulationDecision};
use crate::anonymization::models::EntityKind;
use crate::anonymization::planner::{Technique, TransformationPlan};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Justification path for a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoutePath {
    Pci,
    Hipaa,
    Gdpr,
    /// Payment data alongside general personal data
    PciGdpr,
    /// Nothing flagged
    Escalation,
}

impl RoutePath {
    /// Route for a classified document
    ///
    /// Dual PCI/GDPR applicability and documents without any flag take the
    /// GDPR-backed default paths.
    pub fn select(decision: &RegulationDecision) -> Self {
        if decision.flags.is_empty() {
            return Self::Escalation;
        }
        match decision.primary {
            Regulation::PciDss if decision.flags.contains(&Regulation::Gdpr) => Self::PciGdpr,
            Regulation::PciDss => Self::Pci,
            Regulation::Hipaa => Self::Hipaa,
            Regulation::Gdpr => Self::Gdpr,
        }
    }

    /// Regulation whose citations justify actions on this path
    pub fn justification_regulation(&self) -> Regulation {
        match self {
            Self::Pci => Regulation::PciDss,
            Self::Hipaa => Regulation::Hipaa,
            Self::Gdpr | Self::PciGdpr | Self::Escalation => Regulation::Gdpr,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pci => "pci",
            Self::Hipaa => "hipaa",
            Self::Gdpr => "gdpr",
            Self::PciGdpr => "pci_gdpr",
            Self::Escalation => "escalation",
        }
    }
}

impl fmt::Display for RoutePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why one action was planned the way it was
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Justification {
    pub entity_kind: EntityKind,
    pub technique: Technique,
    pub regulation: Regulation,
    pub article: String,
    pub rationale: String,
}

fn rationale(kind: &EntityKind, technique: Technique) -> String {
    match technique {
        Technique::Remove => format!("{kind} must not be retained and was removed"),
        Technique::Truncate => format!("{kind} truncated to a non-identifying prefix"),
        Technique::Tokenize => format!("{kind} replaced by a run-scoped token"),
        Technique::Pseudonymize => {
            format!("{kind} replaced by a pseudonym shared by every occurrence of the same value")
        }
        Technique::Mask => format!("{kind} masked with its structure preserved"),
        Technique::Generalize => format!("{kind} generalized to a coarser category"),
        Technique::Keep => format!("{kind} kept; it does not identify an individual on its own"),
    }
}

/// One justification per plan action, in plan order
pub fn justify(plan: &TransformationPlan, route: RoutePath) -> Vec<Justification> {
    let regulation = route.justification_regulation();
    plan.actions()
        .iter()
        .map(|action| {
            let kind = action.entity.kind();
            Justification {
                entity_kind: kind.clone(),
                technique: action.technique,
                regulation,
                article: regulation.article_for(kind, action.technique).to_string(),
                rationale: rationale(kind, action.technique),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anonymization::models::{ClassifiedEntity, Entity, EntitySource, Sensitivity};
    use crate::anonymization::planner::TransformAction;
    use std::collections::BTreeSet;
    use test_case::test_case;

    fn decision(primary: Regulation, flags: &[Regulation]) -> RegulationDecision {
        RegulationDecision::new(primary, flags.iter().copied().collect())
    }

    #[test_case(Regulation::PciDss, &[Regulation::PciDss], RoutePath::Pci)]
    #[test_case(Regulation::PciDss, &[Regulation::PciDss, Regulation::Gdpr], RoutePath::PciGdpr)]
    #[test_case(Regulation::Hipaa, &[Regulation::Hipaa, Regulation::Gdpr], RoutePath::Hipaa)]
    #[test_case(Regulation::Gdpr, &[Regulation::Gdpr], RoutePath::Gdpr)]
    #[test_case(Regulation::Gdpr, &[], RoutePath::Escalation)]
    fn test_select(primary: Regulation, flags: &[Regulation], expected: RoutePath) {
        assert_eq!(RoutePath::select(&decision(primary, flags)), expected);
    }

    #[test]
    fn test_default_paths_justify_under_gdpr() {
        assert_eq!(RoutePath::PciGdpr.justification_regulation(), Regulation::Gdpr);
        assert_eq!(RoutePath::Escalation.justification_regulation(), Regulation::Gdpr);
        assert_eq!(RoutePath::Pci.justification_regulation(), Regulation::PciDss);
    }

    #[test]
    fn test_justify_follows_plan_order() {
        let card = ClassifiedEntity::new(
            Entity::new(EntityKind::CreditCard, 0, 16, "4111111111111111", EntitySource::Pattern),
            Sensitivity::Critical,
            BTreeSet::from([Regulation::PciDss]),
        );
        let email = ClassifiedEntity::new(
            Entity::new(EntityKind::Email, 20, 27, "a@b.com", EntitySource::Pattern),
            Sensitivity::Medium,
            BTreeSet::from([Regulation::Gdpr]),
        );
        let plan = TransformationPlan::new(vec![
            TransformAction::new(email, Technique::Mask),
            TransformAction::new(card, Technique::Tokenize),
        ]);

        let justifications = justify(&plan, RoutePath::Pci);
        assert_eq!(justifications.len(), 2);
        assert_eq!(justifications[0].entity_kind, EntityKind::CreditCard);
        assert_eq!(justifications[0].regulation, Regulation::PciDss);
        assert!(justifications[0].article.starts_with("PCI DSS"));
        assert_eq!(justifications[1].technique, Technique::Mask);
        assert!(!justifications[1].rationale.contains("a@b.com"));
    }

    #[test]
    fn test_route_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&RoutePath::PciGdpr).unwrap(),
            "\"pci_gdpr\""
        );
    }
}
