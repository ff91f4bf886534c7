//! HIPAA Safe Harbor citation table
//!
//! Each identifier category of 45 CFR §164.514(b)(2)(i) has its own
//! paragraph letter.

use crate::anonymization::models::EntityKind;
use crate::anonymization::planner::Technique;

/// Fallback citation for kinds without a specific entry
pub const DEFAULT_ARTICLE: &str = "HIPAA §164.514(b)(2)";

/// Article justifying `technique` for `kind`
pub fn article_for(kind: &EntityKind, technique: Technique) -> &'static str {
    if technique == Technique::Keep {
        return DEFAULT_ARTICLE;
    }
    match kind {
        EntityKind::PersonName | EntityKind::PatientName | EntityKind::PhysicianName => {
            "HIPAA §164.514(b)(2)(i)(A)"
        }
        EntityKind::Address | EntityKind::ZipCode => "HIPAA §164.514(b)(2)(i)(B)",
        EntityKind::Date
        | EntityKind::BirthDate
        | EntityKind::AdmissionDate
        | EntityKind::DischargeDate
        | EntityKind::DeathDate => "HIPAA §164.514(b)(2)(i)(C)",
        EntityKind::Phone => "HIPAA §164.514(b)(2)(i)(D)",
        EntityKind::Email => "HIPAA §164.514(b)(2)(i)(F)",
        EntityKind::Ssn | EntityKind::NationalId => "HIPAA §164.514(b)(2)(i)(G)",
        EntityKind::MedicalRecordNumber => "HIPAA §164.514(b)(2)(i)(H)",
        EntityKind::HealthPlanNumber => "HIPAA §164.514(b)(2)(i)(I)",
        EntityKind::AccountNumber | EntityKind::CreditCard => "HIPAA §164.514(b)(2)(i)(J)",
        EntityKind::CertificateNumber => "HIPAA §164.514(b)(2)(i)(K)",
        EntityKind::LicensePlate => "HIPAA §164.514(b)(2)(i)(L)",
        EntityKind::DeviceIdentifier => "HIPAA §164.514(b)(2)(i)(M)",
        EntityKind::Url => "HIPAA §164.514(b)(2)(i)(N)",
        EntityKind::IpAddress => "HIPAA §164.514(b)(2)(i)(O)",
        EntityKind::BiometricIdentifier => "HIPAA §164.514(b)(2)(i)(P)",
        _ => "HIPAA §164.514(b)(2)(i)(R)",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_are_identifier_a() {
        assert_eq!(
            article_for(&EntityKind::PatientName, Technique::Tokenize),
            "HIPAA §164.514(b)(2)(i)(A)"
        );
    }

    #[test]
    fn test_kept_clinical_data_cites_general_rule() {
        assert_eq!(
            article_for(&EntityKind::MedicalDiagnosis, Technique::Keep),
            DEFAULT_ARTICLE
        );
    }

    #[test]
    fn test_unknown_kind_is_catch_all() {
        assert_eq!(
            article_for(&EntityKind::from("passport"), Technique::Remove),
            "HIPAA §164.514(b)(2)(i)(R)"
        );
    }
}
