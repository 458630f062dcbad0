//! License plate normalization and validation.

use crate::limits::{MAX_PLATE_LEN, MIN_PLATE_LEN};

/// Uppercase the plate and drop whitespace and hyphens.
pub fn normalize_plate(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .flat_map(char::to_uppercase)
        .collect()
}

/// Accepts 2–10 ASCII letters or digits once normalized.
pub fn is_valid_plate(raw: &str) -> bool {
    let plate = normalize_plate(raw);
    (MIN_PLATE_LEN..=MAX_PLATE_LEN).contains(&plate.len())
        && plate.chars().all(|c| c.is_ascii_alphanumeric())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_separators() {
        assert_eq!(normalize_plate("ab-12 3"), "AB123");
        assert_eq!(normalize_plate("  xy\t9 "), "XY9");
        assert_eq!(normalize_plate("KA-01-HH-1234"), "KA01HH1234");
    }

    #[test]
    fn valid_plates() {
        assert!(is_valid_plate("AB"));
        assert!(is_valid_plate("abc-123"));
        assert!(is_valid_plate("KA 01 HH 1234"));
    }

    #[test]
    fn invalid_plates() {
        assert!(!is_valid_plate(""));
        assert!(!is_valid_plate("A"));
        assert!(!is_valid_plate("- -"));
        assert!(!is_valid_plate("ABCDEFGHIJK")); // 11 chars
        assert!(!is_valid_plate("AB_12"));
        assert!(!is_valid_plate("ÄB12"));
    }
}
