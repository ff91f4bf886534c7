//! Entity data models

use crate::anonymization::compliance::Regulation;
use crate::anonymization::models::span::{Span, TextIndex};
use crate::domain::{AegisError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Kind of sensitive entity
///
/// Known kinds have a fixed classification and planning treatment. Kinds a
/// detector reports that are not known here are carried as [`EntityKind::Other`]
/// and classified through the external classification collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EntityKind {
    PersonName,
    PatientName,
    PhysicianName,
    Organization,
    JobTitle,
    Email,
    Phone,
    Address,
    ZipCode,
    Date,
    BirthDate,
    AdmissionDate,
    DischargeDate,
    DeathDate,
    ExpiryDate,
    CreditCard,
    Cvv,
    AccountNumber,
    Ssn,
    NationalId,
    MedicalRecordNumber,
    HealthPlanNumber,
    MedicalDiagnosis,
    Medication,
    IpAddress,
    Url,
    DeviceIdentifier,
    BiometricIdentifier,
    LicensePlate,
    CertificateNumber,
    /// Detector-specific kind without a static classification
    Other(String),
}

impl EntityKind {
    /// Canonical snake_case name
    pub fn as_str(&self) -> &str {
        match self {
            Self::PersonName => "person_name",
            Self::PatientName => "patient_name",
            Self::PhysicianName => "physician_name",
            Self::Organization => "organization",
            Self::JobTitle => "job_title",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::Address => "address",
            Self::ZipCode => "zip_code",
            Self::Date => "date",
            Self::BirthDate => "birth_date",
            Self::AdmissionDate => "admission_date",
            Self::DischargeDate => "discharge_date",
            Self::DeathDate => "death_date",
            Self::ExpiryDate => "expiry_date",
            Self::CreditCard => "credit_card",
            Self::Cvv => "cvv",
            Self::AccountNumber => "account_number",
            Self::Ssn => "ssn",
            Self::NationalId => "national_id",
            Self::MedicalRecordNumber => "medical_record_number",
            Self::HealthPlanNumber => "health_plan_number",
            Self::MedicalDiagnosis => "medical_diagnosis",
            Self::Medication => "medication",
            Self::IpAddress => "ip_address",
            Self::Url => "url",
            Self::DeviceIdentifier => "device_identifier",
            Self::BiometricIdentifier => "biometric_identifier",
            Self::LicensePlate => "license_plate",
            Self::CertificateNumber => "certificate_number",
            Self::Other(name) => name.as_str(),
        }
    }

    /// Upper-case label used in placeholders (`CREDIT_CARD`)
    ///
    /// Only `[A-Z0-9_]` survives, so labels of detector-specific kinds are
    /// safe to embed in generated tokens.
    pub fn label(&self) -> String {
        let label: String = self
            .as_str()
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() {
                    c.to_ascii_uppercase()
                } else {
                    '_'
                }
            })
            .collect();
        if label.is_empty() {
            "ENTITY".to_string()
        } else {
            label
        }
    }

    /// Names of natural persons
    pub fn is_person(&self) -> bool {
        matches!(
            self,
            Self::PersonName | Self::PatientName | Self::PhysicianName
        )
    }

    /// Calendar dates of any flavour
    pub fn is_date(&self) -> bool {
        matches!(
            self,
            Self::Date
                | Self::BirthDate
                | Self::AdmissionDate
                | Self::DischargeDate
                | Self::DeathDate
                | Self::ExpiryDate
        )
    }

    /// Whether the kind has a static classification
    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace([' ', '-'], "_");
        let kind = match normalized.as_str() {
            "person_name" | "name" | "person" => Self::PersonName,
            "patient_name" => Self::PatientName,
            "physician_name" => Self::PhysicianName,
            "organization" => Self::Organization,
            "job_title" | "occupation" => Self::JobTitle,
            "email" => Self::Email,
            "phone" | "phone_chile" | "phone_intl" => Self::Phone,
            "address" => Self::Address,
            "zip_code" | "zip" => Self::ZipCode,
            "date" | "date_dmy" | "date_ymd" => Self::Date,
            "birth_date" | "birthdate" => Self::BirthDate,
            "admission_date" => Self::AdmissionDate,
            "discharge_date" => Self::DischargeDate,
            "death_date" => Self::DeathDate,
            "expiry_date" => Self::ExpiryDate,
            "credit_card" => Self::CreditCard,
            "cvv" => Self::Cvv,
            "account_number" => Self::AccountNumber,
            "ssn" | "ssn_us" => Self::Ssn,
            "national_id" | "rut_chile" => Self::NationalId,
            "medical_record_number" | "mrn" => Self::MedicalRecordNumber,
            "health_plan_number" => Self::HealthPlanNumber,
            "medical_diagnosis" => Self::MedicalDiagnosis,
            "medication" => Self::Medication,
            "ip_address" => Self::IpAddress,
            "url" => Self::Url,
            "device_identifier" => Self::DeviceIdentifier,
            "biometric_identifier" => Self::BiometricIdentifier,
            "license_plate" => Self::LicensePlate,
            "certificate_number" => Self::CertificateNumber,
            _ => Self::Other(normalized),
        };
        Ok(kind)
    }
}

impl From<String> for EntityKind {
    fn from(value: String) -> Self {
        match value.parse() {
            Ok(kind) => kind,
            Err(never) => match never {},
        }
    }
}

impl From<&str> for EntityKind {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<EntityKind> for String {
    fn from(kind: EntityKind) -> Self {
        kind.as_str().to_string()
    }
}

/// Which detector produced an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntitySource {
    /// Deterministic pattern scan
    Pattern,
    /// Contextual inference service
    Inferred,
}

/// Sensitivity classification levels, ordered from least to most sensitive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sensitivity {
    Low,
    Medium,
    High,
    Critical,
}

impl fmt::Display for Sensitivity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        };
        f.write_str(s)
    }
}

/// A detected span of sensitive text
///
/// `start` and `end` are half-open char offsets into the original text and
/// are never re-derived from a rewritten copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub kind: EntityKind,
    pub start: usize,
    pub end: usize,
    /// Slice of the original text covered by `[start, end)`
    pub raw_value: String,
    pub source: EntitySource,
    /// Confidence score (0.0 - 1.0)
    pub confidence: f32,
}

impl Entity {
    /// Create a new entity with full confidence
    pub fn new(
        kind: EntityKind,
        start: usize,
        end: usize,
        raw_value: impl Into<String>,
        source: EntitySource,
    ) -> Self {
        Self {
            kind,
            start,
            end,
            raw_value: raw_value.into(),
            source,
            confidence: 1.0,
        }
    }

    /// Create an entity whose value is sliced from the indexed text
    ///
    /// # Errors
    ///
    /// Returns [`AegisError::MalformedSpan`] for zero-length, inverted or
    /// out-of-range offsets.
    pub fn from_text(
        kind: EntityKind,
        index: &TextIndex<'_>,
        start: usize,
        end: usize,
        source: EntitySource,
    ) -> Result<Self> {
        let raw = index.slice(start, end).ok_or(AegisError::MalformedSpan {
            start,
            end,
            text_len: index.char_len(),
        })?;
        Ok(Self::new(kind, start, end, raw, source))
    }

    /// Set the confidence score
    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = confidence.clamp(0.0, 1.0);
        self
    }

    /// The entity's span
    pub fn span(&self) -> Span {
        Span::new(self.start, self.end)
    }

    /// Check offsets against a text of `text_len` chars
    pub fn validate(&self, text_len: usize) -> Result<()> {
        if self.start >= self.end || self.end > text_len {
            return Err(AegisError::MalformedSpan {
                start: self.start,
                end: self.end,
                text_len,
            });
        }
        Ok(())
    }

    pub fn overlaps(&self, other: &Entity) -> bool {
        self.span().overlaps(&other.span())
    }
}

/// Entity annotated with sensitivity and applicable regulations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedEntity {
    #[serde(flatten)]
    pub entity: Entity,
    pub sensitivity: Sensitivity,
    /// Never empty
    pub regulations: BTreeSet<Regulation>,
}

impl ClassifiedEntity {
    /// Annotate an entity; an empty regulation set falls back to GDPR
    pub fn new(entity: Entity, sensitivity: Sensitivity, regulations: BTreeSet<Regulation>) -> Self {
        let regulations = if regulations.is_empty() {
            BTreeSet::from([Regulation::Gdpr])
        } else {
            regulations
        };
        Self {
            entity,
            sensitivity,
            regulations,
        }
    }

    pub fn kind(&self) -> &EntityKind {
        &self.entity.kind
    }

    pub fn span(&self) -> Span {
        self.entity.span()
    }

    pub fn raw_value(&self) -> &str {
        &self.entity.raw_value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("date_dmy", EntityKind::Date)]
    #[test_case("date_ymd", EntityKind::Date)]
    #[test_case("rut_chile", EntityKind::NationalId)]
    #[test_case("phone_intl", EntityKind::Phone)]
    #[test_case("Credit Card", EntityKind::CreditCard)]
    #[test_case("birthdate", EntityKind::BirthDate)]
    fn test_kind_aliases(input: &str, expected: EntityKind) {
        assert_eq!(EntityKind::from(input), expected);
    }

    #[test]
    fn test_unknown_kind_is_preserved() {
        let kind = EntityKind::from("Passport Number");
        assert_eq!(kind, EntityKind::Other("passport_number".to_string()));
        assert_eq!(kind.label(), "PASSPORT_NUMBER");
        assert!(!kind.is_known());
    }

    #[test]
    fn test_kind_serializes_as_snake_case() {
        let json = serde_json::to_string(&EntityKind::CreditCard).unwrap();
        assert_eq!(json, "\"credit_card\"");
        let kind: EntityKind = serde_json::from_str("\"medical_diagnosis\"").unwrap();
        assert_eq!(kind, EntityKind::MedicalDiagnosis);
    }

    #[test]
    fn test_sensitivity_ordering() {
        assert!(Sensitivity::Critical > Sensitivity::High);
        assert!(Sensitivity::High > Sensitivity::Medium);
        assert!(Sensitivity::Medium > Sensitivity::Low);
    }

    #[test]
    fn test_entity_validate() {
        let entity = Entity::new(EntityKind::Email, 3, 3, "", EntitySource::Pattern);
        assert!(matches!(
            entity.validate(10),
            Err(AegisError::MalformedSpan { .. })
        ));

        let entity = Entity::new(EntityKind::Email, 3, 11, "xxxxxxxx", EntitySource::Pattern);
        assert!(entity.validate(10).is_err());
        assert!(entity.validate(11).is_ok());
    }

    #[test]
    fn test_from_text_slices_by_char() {
        let text = "Señor Pérez paid";
        let index = TextIndex::new(text);
        let entity =
            Entity::from_text(EntityKind::PersonName, &index, 6, 11, EntitySource::Inferred)
                .unwrap();
        assert_eq!(entity.raw_value, "Pérez");
    }

    #[test]
    fn test_confidence_is_clamped() {
        let entity =
            Entity::new(EntityKind::Url, 0, 1, "x", EntitySource::Inferred).with_confidence(1.7);
        assert_eq!(entity.confidence, 1.0);
    }

    #[test]
    fn test_classified_entity_defaults_to_gdpr() {
        let entity = Entity::new(EntityKind::Url, 0, 1, "x", EntitySource::Pattern);
        let classified = ClassifiedEntity::new(entity, Sensitivity::Low, BTreeSet::new());
        assert_eq!(
            classified.regulations.iter().collect::<Vec<_>>(),
            vec![&Regulation::Gdpr]
        );
    }
}
