//! Removal and truncation strategies

/// Marker appended to truncated values
pub const TRUNCATION_MARKER: &str = "[...]";

/// Removal - the span disappears from the output
pub fn remove() -> String {
    String::new()
}

/// Truncation - keeps `min(keep, len / 2)` leading chars plus a marker
///
/// Never keeps more than half of the value, so short values cannot survive
/// verbatim.
pub fn truncate(value: &str, keep: usize) -> String {
    let len = value.chars().count();
    let kept: String = value.chars().take(keep.min(len / 2)).collect();
    format!("{kept}{TRUNCATION_MARKER}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remove() {
        assert_eq!(remove(), "");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("https://example.com/profile", 4), "http[...]");
        assert_eq!(truncate("abcdef", 4), "abc[...]");
        assert_eq!(truncate("a", 4), "[...]");
    }

    #[test]
    fn test_truncate_counts_chars() {
        assert_eq!(truncate("Ñuñoa Región", 3), "Ñuñ[...]");
    }
}
