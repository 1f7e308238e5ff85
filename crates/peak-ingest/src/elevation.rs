//! Cleanup of `ele` values that carry a unit suffix.

/// Strips trailing `m`, `.` and spaces, then surrounding whitespace.
///
/// Returns `None` if the value is already clean.
pub fn clean_elevation(raw: &str) -> Option<String> {
    let cleaned = raw
        .trim_end_matches(|ch| matches!(ch, 'm' | '.' | ' '))
        .trim();
    (cleaned != raw).then(|| cleaned.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_unit_suffixes() {
        assert_eq!(clean_elevation("812 m"), Some("812".to_string()));
        assert_eq!(clean_elevation("812m."), Some("812".to_string()));
        assert_eq!(clean_elevation(" 640.5 "), Some("640.5".to_string()));
        assert_eq!(clean_elevation("1200 moh"), None);
    }

    #[test]
    fn clean_values_are_untouched() {
        assert_eq!(clean_elevation("812"), None);
        assert_eq!(clean_elevation("812.5"), None);
    }
}
