//! Regulation classification
//!
//! Annotates merged entities with sensitivity and regulation flags and
//! derives the document's primary regulation. Known kinds come from a static
//! table; other kinds are classified once per run through the
//! [`KindClassifier`] collaborator.

use crate::adapters::{call_with_timeout, KindClassifier};
use crate::anonymization::compliance::{Regulation, RegulationDecision};
use crate::anonymization::models::{ClassifiedEntity, Entity, EntityKind, Sensitivity};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::time::Duration;

/// Classification used when an unknown kind cannot be classified
pub const UNKNOWN_KIND_FALLBACK: (Sensitivity, Regulation) = (Sensitivity::High, Regulation::Gdpr);

/// Static classification of a known kind
pub fn static_classification(kind: &EntityKind) -> Option<(Sensitivity, BTreeSet<Regulation>)> {
    use EntityKind as K;
    use Regulation::{Gdpr, Hipaa, PciDss};
    use Sensitivity::{Critical, High, Low, Medium};

    let (sensitivity, regulations) = match kind {
        K::CreditCard | K::Cvv => (Critical, vec![PciDss]),
        K::ExpiryDate => (High, vec![PciDss]),
        K::BiometricIdentifier => (Critical, vec![Gdpr]),
        K::PersonName | K::BirthDate | K::AccountNumber | K::Ssn | K::NationalId => {
            (High, vec![Gdpr])
        }
        K::PatientName | K::PhysicianName => (High, vec![Hipaa, Gdpr]),
        K::MedicalRecordNumber
        | K::HealthPlanNumber
        | K::MedicalDiagnosis
        | K::Medication
        | K::DeathDate => (High, vec![Hipaa]),
        K::AdmissionDate | K::DischargeDate => (Medium, vec![Hipaa]),
        K::Email
        | K::Phone
        | K::Address
        | K::ZipCode
        | K::Date
        | K::Organization
        | K::IpAddress
        | K::DeviceIdentifier
        | K::LicensePlate
        | K::CertificateNumber => (Medium, vec![Gdpr]),
        K::JobTitle | K::Url => (Low, vec![Gdpr]),
        K::Other(_) => return None,
    };
    Some((sensitivity, regulations.into_iter().collect()))
}

/// Primary regulation and flags for a classified document
///
/// `PCI_DSS` when payment card data is present, else `HIPAA` when any entity
/// is HIPAA-flagged, else `GDPR`. The hint is folded in last.
pub fn derive_decision(entities: &[ClassifiedEntity], hint: Option<Regulation>) -> RegulationDecision {
    let flags: BTreeSet<Regulation> = entities
        .iter()
        .flat_map(|e| e.regulations.iter().copied())
        .collect();

    let primary = if entities
        .iter()
        .any(|e| matches!(e.kind(), EntityKind::CreditCard | EntityKind::Cvv))
    {
        Regulation::PciDss
    } else if flags.contains(&Regulation::Hipaa) {
        Regulation::Hipaa
    } else {
        Regulation::Gdpr
    };

    RegulationDecision::new(primary, flags).with_hint(hint)
}

/// Output of one classification pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub entities: Vec<ClassifiedEntity>,
    pub decision: RegulationDecision,
    /// Fallbacks taken for unclassifiable kinds
    pub notes: Vec<String>,
}

/// Assigns sensitivity and regulations per entity
#[derive(Clone)]
pub struct RegulationClassifier {
    delegate: Arc<dyn KindClassifier>,
    timeout: Duration,
}

impl RegulationClassifier {
    pub fn new(delegate: Arc<dyn KindClassifier>, timeout: Duration) -> Self {
        Self { delegate, timeout }
    }

    /// Classify one document's merged entities
    ///
    /// The delegate is asked at most once per unknown kind; its answers (and
    /// fallbacks) are cached for the rest of the call only.
    pub async fn classify(&self, entities: Vec<Entity>, hint: Option<Regulation>) -> Classification {
        let mut cache: HashMap<EntityKind, (Sensitivity, BTreeSet<Regulation>)> = HashMap::new();
        let mut notes = Vec::new();
        let mut classified = Vec::with_capacity(entities.len());

        for entity in entities {
            let (sensitivity, regulations) = match static_classification(&entity.kind) {
                Some(known) => known,
                None => match cache.get(&entity.kind) {
                    Some(cached) => cached.clone(),
                    None => {
                        let resolved = self.classify_unknown(&entity.kind, &mut notes).await;
                        cache.insert(entity.kind.clone(), resolved.clone());
                        resolved
                    }
                },
            };
            classified.push(ClassifiedEntity::new(entity, sensitivity, regulations));
        }

        let decision = derive_decision(&classified, hint);
        tracing::debug!(
            entities = classified.len(),
            primary = %decision.primary,
            "Classification complete"
        );

        Classification {
            entities: classified,
            decision,
            notes,
        }
    }

    async fn classify_unknown(
        &self,
        kind: &EntityKind,
        notes: &mut Vec<String>,
    ) -> (Sensitivity, BTreeSet<Regulation>) {
        let call = self.delegate.classify_unknown(kind.as_str());
        match call_with_timeout("classify_unknown", self.timeout, call).await {
            Ok((sensitivity, regulations)) if regulations.is_empty() => {
                (sensitivity, BTreeSet::from([Regulation::Gdpr]))
            }
            Ok(classification) => classification,
            Err(err) => {
                tracing::warn!(kind = %kind, error = %err, "Falling back to default classification");
                let (sensitivity, regulation) = UNKNOWN_KIND_FALLBACK;
                notes.push(format!(
                    "classification unavailable for kind '{kind}'; defaulted to {sensitivity}/{regulation}"
                ));
                (sensitivity, BTreeSet::from([regulation]))
            }
        }
    }
}

impl std::fmt::Debug for RegulationClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegulationClassifier")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}
