//! Structure-preserving masking

use crate::anonymization::models::EntityKind;

/// Mask character
pub const MASK_CHAR: char = '*';

/// Mask a value while keeping enough shape to stay readable
///
/// - email: local part becomes `****`, `@domain` is kept
/// - phone: every digit but the last four is masked, separators stay
/// - other: alphanumerics are masked, the last two survive when there are
///   more than four
pub fn mask(kind: &EntityKind, value: &str) -> String {
    match kind {
        EntityKind::Email => match value.rfind('@') {
            Some(at) => format!("****{}", &value[at..]),
            None => mask_alphanumerics(value, 2),
        },
        EntityKind::Phone => mask_digits(value, 4),
        _ => mask_alphanumerics(value, 2),
    }
}

/// Mask every digit except the last `keep`
fn mask_digits(value: &str, keep: usize) -> String {
    let total = value.chars().filter(char::is_ascii_digit).count();
    let mut seen = 0;
    value
        .chars()
        .map(|c| {
            if c.is_ascii_digit() {
                seen += 1;
                if seen + keep <= total {
                    return MASK_CHAR;
                }
            }
            c
        })
        .collect()
}

/// Mask alphanumerics, keeping the last `keep` when more than four exist
fn mask_alphanumerics(value: &str, keep: usize) -> String {
    let total = value.chars().filter(|c| c.is_alphanumeric()).count();
    let keep = if total > 4 { keep } else { 0 };
    let mut seen = 0;
    value
        .chars()
        .map(|c| {
            if c.is_alphanumeric() {
                seen += 1;
                if seen + keep <= total {
                    return MASK_CHAR;
                }
            }
            c
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(EntityKind::Email, "a@b.com", "****@b.com")]
    #[test_case(EntityKind::Email, "john.doe@example.com", "****@example.com")]
    #[test_case(EntityKind::Phone, "+56 9 1234 5678", "+** * **** 5678")]
    #[test_case(EntityKind::Phone, "(555) 123-4567", "(***) ***-4567")]
    #[test_case(EntityKind::IpAddress, "192.168.1.1", "***.***.1.1")]
    #[test_case(EntityKind::Date, "12/25", "**/**")]
    #[test_case(EntityKind::AccountNumber, "ACC 12345678", "*** ******78")]
    fn test_mask(kind: EntityKind, input: &str, expected: &str) {
        assert_eq!(mask(&kind, input), expected);
    }

    #[test]
    fn test_mask_keeps_length_in_chars() {
        let masked = mask(&EntityKind::Address, "Calle Ñandú 12");
        assert_eq!(masked.chars().count(), "Calle Ñandú 12".chars().count());
        assert!(masked.ends_with("12"));
    }
}
