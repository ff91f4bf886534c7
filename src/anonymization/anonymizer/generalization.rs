//! Generalization to coarser categories

use crate::anonymization::models::EntityKind;

/// Replace a value with the next-coarser category for its kind
///
/// Dates become their four-digit year, ZIP codes keep three digits, and
/// addresses keep only their trailing locality components. Kinds without a
/// coarser form become a bracketed category label.
pub fn generalize(kind: &EntityKind, value: &str) -> String {
    if kind.is_date() {
        return generalize_date(value).unwrap_or_else(|| "[DATE]".to_string());
    }
    match kind {
        EntityKind::ZipCode => {
            let digits: String = value.chars().filter(char::is_ascii_digit).take(3).collect();
            if digits.len() == 3 {
                format!("{digits}**")
            } else {
                "[ZIP_CODE]".to_string()
            }
        }
        EntityKind::Address => generalize_address(value),
        EntityKind::JobTitle => "[OCCUPATION]".to_string(),
        other => format!("[{}]", other.label()),
    }
}

/// First plausible four-digit year, else a two-digit `MM/YY` year
fn generalize_date(value: &str) -> Option<String> {
    let year = value
        .split(|c: char| !c.is_ascii_digit())
        .find(|run| {
            run.len() == 4
                && (run.starts_with("18") || run.starts_with("19") || run.starts_with('2'))
        });
    if let Some(year) = year {
        return Some(year.to_string());
    }

    let (month, year) = value.trim().split_once('/')?;
    let month: u8 = month.trim().parse().ok()?;
    let year = year.trim();
    if (1..=12).contains(&month) && year.len() == 2 && year.chars().all(|c| c.is_ascii_digit()) {
        Some(format!("20{year}"))
    } else {
        None
    }
}

/// Drop the first comma-separated component (street and number) and any
/// component token carrying digits
fn generalize_address(value: &str) -> String {
    let locality: Vec<String> = value
        .split(',')
        .skip(1)
        .map(|part| {
            part.split_whitespace()
                .filter(|token| !token.chars().any(|c| c.is_ascii_digit()))
                .collect::<Vec<_>>()
                .join(" ")
        })
        .filter(|part| !part.is_empty())
        .collect();

    if locality.is_empty() {
        "[LOCATION]".to_string()
    } else {
        locality.join(", ")
    }
}
