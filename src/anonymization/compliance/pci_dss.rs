//! PCI DSS citation table

use crate::anonymization::models::EntityKind;
use crate::anonymization::planner::Technique;

/// Fallback citation for kinds without a specific entry
pub const DEFAULT_ARTICLE: &str = "PCI DSS Req. 3.4";

/// Article justifying `technique` for `kind`
///
/// Cardholder contact data in a payment document falls back to the GDPR
/// articles, since PCI DSS itself does not govern it.
pub fn article_for(kind: &EntityKind, technique: Technique) -> &'static str {
    match kind {
        EntityKind::Cvv => "PCI DSS Req. 3.2",
        EntityKind::CreditCard => match technique {
            Technique::Truncate | Technique::Mask => "PCI DSS Req. 3.3",
            _ => DEFAULT_ARTICLE,
        },
        EntityKind::ExpiryDate | EntityKind::AccountNumber => DEFAULT_ARTICLE,
        _ if kind.is_person() => "GDPR Art. 4(5) + PCI DSS context",
        _ => super::gdpr::article_for(kind, technique),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pan_rendering_unreadable() {
        assert_eq!(
            article_for(&EntityKind::CreditCard, Technique::Tokenize),
            "PCI DSS Req. 3.4"
        );
        assert_eq!(
            article_for(&EntityKind::CreditCard, Technique::Truncate),
            "PCI DSS Req. 3.3"
        );
    }

    #[test]
    fn test_contact_data_uses_gdpr() {
        assert_eq!(
            article_for(&EntityKind::Email, Technique::Mask),
            "GDPR Art. 32(1)(a)"
        );
    }
}
