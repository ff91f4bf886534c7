//! GDPR citation table

use crate::anonymization::models::EntityKind;
use crate::anonymization::planner::Technique;

/// Fallback citation for kinds without a specific entry
pub const DEFAULT_ARTICLE: &str = "GDPR Art. 4(5)";

/// Article justifying `technique` for `kind`
pub fn article_for(kind: &EntityKind, technique: Technique) -> &'static str {
    match technique {
        Technique::Pseudonymize => "GDPR Art. 4(5)",
        Technique::Mask | Technique::Tokenize => "GDPR Art. 32(1)(a)",
        Technique::Generalize | Technique::Truncate => "GDPR Art. 5(1)(c)",
        Technique::Remove => "GDPR Art. 17",
        Technique::Keep if kind.is_date() => "GDPR Art. 5(1)(c)",
        Technique::Keep => "GDPR Art. 6(1)(f)",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pseudonymization_cites_article_4() {
        assert_eq!(
            article_for(&EntityKind::PersonName, Technique::Pseudonymize),
            DEFAULT_ARTICLE
        );
    }

    #[test]
    fn test_generalization_cites_data_minimisation() {
        assert_eq!(
            article_for(&EntityKind::Date, Technique::Generalize),
            "GDPR Art. 5(1)(c)"
        );
    }
}
