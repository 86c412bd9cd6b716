//! Plate identifier normalization and plausibility checks
//!
//! Validation here is advisory. A plate that fails [`is_plausible`] is still
//! looked up and saved; callers surface the [`ValidationWarning`] and carry on.

use once_cell::sync::Lazy;
use regex::Regex;

/// Current format: two letters, two digits, three letters (e.g. `AB12CDE`)
#[allow(clippy::expect_used)]
static CURRENT_FORMAT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z]{2}[0-9]{2}[A-Z]{3}$").expect("valid current plate regex"));

/// Loose legacy shapes: 1-3 letters, 1-4 digits, up to 3 trailing letters
#[allow(clippy::expect_used)]
static LEGACY_FORMAT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Z]{1,3}[0-9]{1,4}[A-Z]{0,3}$").expect("valid legacy plate regex")
});

/// Canonicalize raw plate text: uppercase, keep only `A-Z` and `0-9`.
///
/// Total and idempotent. Non-ASCII letters are dropped even when their
/// uppercase form exists.
pub fn normalize(input: &str) -> String {
    input
        .chars()
        .flat_map(char::to_uppercase)
        .filter(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
        .collect()
}

/// Like [`normalize`], for input that may be absent.
pub fn normalize_opt(input: Option<&str>) -> String {
    input.map(normalize).unwrap_or_default()
}

/// Check whether the input looks like a plate in any accepted shape.
pub fn is_plausible(input: &str) -> bool {
    let plate = normalize(input);
    if plate.is_empty() {
        return false;
    }
    CURRENT_FORMAT_RE.is_match(&plate) || LEGACY_FORMAT_RE.is_match(&plate)
}

/// Like [`is_plausible`], for input that may be absent. Absent is never plausible.
pub fn is_plausible_opt(input: Option<&str>) -> bool {
    input.is_some_and(is_plausible)
}

/// Non-blocking notice that a plate does not match any accepted shape
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationWarning {
    /// Normalized form that failed the check
    pub plate: String,
}

impl std::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.plate.is_empty() {
            write!(f, "plate is empty")
        } else {
            write!(f, "plate {} looks invalid (basic check)", self.plate)
        }
    }
}

/// Normalized plate plus the outcome of the plausibility check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlateCheck {
    /// Canonical form
    pub plate: String,
    /// Present when the plate failed the plausibility check
    pub warning: Option<ValidationWarning>,
}

/// Normalize and check in one pass.
pub fn check(input: &str) -> PlateCheck {
    let plate = normalize(input);
    let warning = if is_plausible(&plate) {
        None
    } else {
        Some(ValidationWarning {
            plate: plate.clone(),
        })
    };
    PlateCheck { plate, warning }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_separators() {
        assert_eq!(normalize("ab12 cde"), "AB12CDE");
        assert_eq!(normalize(" a-b.1_2\tc "), "AB12C");
        assert_eq!(normalize(""), "");
        assert_eq!(normalize_opt(None), "");
    }

    #[test]
    fn test_normalize_drops_non_ascii() {
        assert_eq!(normalize("ßé12"), "SS12");
        assert_eq!(normalize("ÅB12"), "B12");
    }

    #[test]
    fn test_normalize_is_idempotent_and_canonical() {
        let inputs = ["", "ab12cde", "  ", "x-1-y", "ß", "日本12", "Ab 12 CdE!!"];
        for input in inputs {
            let once = normalize(input);
            assert_eq!(normalize(&once), once, "input {input:?}");
            assert!(once
                .chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
        }
    }

    #[test]
    fn test_plausibility() {
        assert!(is_plausible("AB12CDE"));
        assert!(is_plausible("ab12 cde"));
        assert!(is_plausible("A1"));
        assert!(is_plausible("ABC1234DEF"));
        assert!(!is_plausible(""));
        assert!(!is_plausible("---"));
        assert!(!is_plausible("1234"));
        assert!(!is_plausible("ABCD1"));
        assert!(!is_plausible_opt(None));
        assert!(is_plausible_opt(Some("A1")));
    }

    #[test]
    fn test_check_reports_warning() {
        let ok = check("ab12 cde");
        assert_eq!(ok.plate, "AB12CDE");
        assert!(ok.warning.is_none());

        let odd = check("12345");
        assert_eq!(odd.plate, "12345");
        assert_eq!(
            odd.warning.map(|w| w.to_string()).as_deref(),
            Some("plate 12345 looks invalid (basic check)")
        );
    }
}
