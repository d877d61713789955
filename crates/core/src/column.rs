//! Spreadsheet column coordinates.
//!
//! Columns are 1-based here: `A` is 1, `Z` is 26, `AA` is 27. The letter
//! form is a base-26 numeral with digits 1..=26 and no zero digit, so the
//! conversion back subtracts one before every division.

use crate::error::ColumnError;

/// Value a rejected column input is reset to.
pub const FALLBACK_COLUMN: &str = "A";

/// Convert column letters to a 1-based index. Lowercase is accepted.
pub fn index_from_letters(letters: &str) -> Result<u32, ColumnError> {
    if letters.is_empty() {
        return Err(ColumnError::InvalidColumnFormat(letters.to_string()));
    }

    let mut index: u32 = 0;
    for c in letters.chars() {
        let upper = c.to_ascii_uppercase();
        if !upper.is_ascii_uppercase() {
            return Err(ColumnError::InvalidColumnFormat(letters.to_string()));
        }
        let digit = u32::from(upper as u8 - b'A') + 1;
        index = index
            .checked_mul(26)
            .and_then(|v| v.checked_add(digit))
            .ok_or_else(|| ColumnError::InvalidColumnFormat(letters.to_string()))?;
    }
    Ok(index)
}

/// Convert a 1-based index to column letters (1 -> A, 27 -> AA).
pub fn letters_from_index(index: u32) -> Result<String, ColumnError> {
    if index < 1 {
        return Err(ColumnError::InvalidColumnIndex(index));
    }

    let mut result = String::new();
    let mut n = index;
    while n > 0 {
        n -= 1;
        result.insert(0, (b'A' + (n % 26) as u8) as char);
        n /= 26;
    }
    Ok(result)
}

/// Parse user input that is either a decimal index ("5") or letters ("E").
pub fn parse_column_input(raw: &str) -> Result<u32, ColumnError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ColumnError::InvalidColumnFormat(raw.to_string()));
    }

    if trimmed.bytes().all(|b| b.is_ascii_digit()) {
        let index: u32 = trimmed
            .parse()
            .map_err(|_| ColumnError::InvalidColumnFormat(raw.to_string()))?;
        if index < 1 {
            return Err(ColumnError::InvalidColumnIndex(index));
        }
        return Ok(index);
    }

    index_from_letters(trimmed)
}

/// Normalize input to uppercase letters without clamping ("6" -> "F", "ab" -> "AB").
pub fn normalize_column_input(raw: &str) -> Result<String, ColumnError> {
    letters_from_index(parse_column_input(raw)?)
}

/// Outcome of checking a column field on blur.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnCheck {
    /// Input is usable. `letters` is the normalized form to show in the field.
    Valid { index: u32, letters: String },
    /// Input was rejected. The caller warns and resets the field to `fallback`.
    Clamped {
        fallback: &'static str,
        reason: ClampReason,
    },
}

impl ColumnCheck {
    pub fn is_valid(&self) -> bool {
        matches!(self, ColumnCheck::Valid { .. })
    }

    /// Letters the field should hold after the check.
    pub fn letters(&self) -> &str {
        match self {
            ColumnCheck::Valid { letters, .. } => letters,
            ColumnCheck::Clamped { fallback, .. } => fallback,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClampReason {
    Unparseable(ColumnError),
    OutOfRange { index: u32, total_cols: u32 },
}

/// Parse `raw` and check it against the sheet width.
///
/// The width is only enforced when it is known (`Some`) and positive.
/// Anything rejected falls back to column `A`, never to the nearest bound.
pub fn validate_and_clamp(raw: &str, total_cols: Option<u32>) -> ColumnCheck {
    let index = match parse_column_input(raw) {
        Ok(index) => index,
        Err(err) => {
            return ColumnCheck::Clamped {
                fallback: FALLBACK_COLUMN,
                reason: ClampReason::Unparseable(err),
            }
        }
    };

    if let Some(total) = total_cols.filter(|&t| t > 0) {
        if index > total {
            return ColumnCheck::Clamped {
                fallback: FALLBACK_COLUMN,
                reason: ClampReason::OutOfRange { index, total_cols: total },
            };
        }
    }

    match letters_from_index(index) {
        Ok(letters) => ColumnCheck::Valid { index, letters },
        Err(err) => ColumnCheck::Clamped {
            fallback: FALLBACK_COLUMN,
            reason: ClampReason::Unparseable(err),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_index_from_letters() {
        assert_eq!(index_from_letters("A"), Ok(1));
        assert_eq!(index_from_letters("Z"), Ok(26));
        assert_eq!(index_from_letters("AA"), Ok(27));
        assert_eq!(index_from_letters("AZ"), Ok(52));
        assert_eq!(index_from_letters("ZZ"), Ok(702));
        assert_eq!(index_from_letters("AAA"), Ok(703));
    }

    #[test]
    fn test_lowercase_letters() {
        assert_eq!(index_from_letters("b"), Ok(2));
        assert_eq!(index_from_letters("aA"), Ok(27));
    }

    #[test]
    fn test_invalid_letters() {
        assert!(matches!(index_from_letters(""), Err(ColumnError::InvalidColumnFormat(_))));
        assert!(matches!(index_from_letters("A1"), Err(ColumnError::InvalidColumnFormat(_))));
        assert!(matches!(index_from_letters("É"), Err(ColumnError::InvalidColumnFormat(_))));
        assert!(matches!(index_from_letters(" A"), Err(ColumnError::InvalidColumnFormat(_))));
    }

    #[test]
    fn test_overflow_is_format_error() {
        let huge = "Z".repeat(20);
        assert!(matches!(index_from_letters(&huge), Err(ColumnError::InvalidColumnFormat(_))));
    }

    #[test]
    fn test_letters_from_index() {
        assert_eq!(letters_from_index(1).unwrap(), "A");
        assert_eq!(letters_from_index(26).unwrap(), "Z");
        assert_eq!(letters_from_index(27).unwrap(), "AA");
        assert_eq!(letters_from_index(28).unwrap(), "AB");
        assert_eq!(letters_from_index(702).unwrap(), "ZZ");
        assert_eq!(letters_from_index(703).unwrap(), "AAA");
        assert_eq!(letters_from_index(0), Err(ColumnError::InvalidColumnIndex(0)));
    }

    #[test]
    fn test_normalize_column_input() {
        assert_eq!(normalize_column_input("6").as_deref(), Ok("F"));
        assert_eq!(normalize_column_input(" ab ").as_deref(), Ok("AB"));
        assert!(matches!(normalize_column_input("A1"), Err(ColumnError::InvalidColumnFormat(_))));
        assert_eq!(normalize_column_input("0"), Err(ColumnError::InvalidColumnIndex(0)));
    }

    #[test]
    fn test_parse_column_input() {
        assert_eq!(parse_column_input("A"), Ok(1));
        assert_eq!(parse_column_input("5"), Ok(5));
        assert_eq!(parse_column_input("  c  "), Ok(3));
        assert_eq!(parse_column_input("0"), Err(ColumnError::InvalidColumnIndex(0)));
        assert!(matches!(parse_column_input(""), Err(ColumnError::InvalidColumnFormat(_))));
        assert!(matches!(parse_column_input("   "), Err(ColumnError::InvalidColumnFormat(_))));
        assert!(matches!(parse_column_input("3B"), Err(ColumnError::InvalidColumnFormat(_))));
        assert!(matches!(
            parse_column_input("99999999999999"),
            Err(ColumnError::InvalidColumnFormat(_))
        ));
    }

    #[test]
    fn test_clamp_out_of_range() {
        let check = validate_and_clamp("ZZZ", Some(20));
        assert!(!check.is_valid());
        assert_eq!(check.letters(), "A");
        assert_eq!(
            check,
            ColumnCheck::Clamped {
                fallback: "A",
                reason: ClampReason::OutOfRange { index: 18278, total_cols: 20 },
            }
        );
    }

    #[test]
    fn test_clamp_unparseable() {
        let check = validate_and_clamp("A-1", Some(20));
        assert!(matches!(
            check,
            ColumnCheck::Clamped { fallback: "A", reason: ClampReason::Unparseable(_) }
        ));
    }

    #[test]
    fn test_clamp_normalizes_valid_input() {
        assert_eq!(
            validate_and_clamp("5", Some(20)),
            ColumnCheck::Valid { index: 5, letters: "E".to_string() }
        );
        assert_eq!(
            validate_and_clamp("t", Some(20)),
            ColumnCheck::Valid { index: 20, letters: "T".to_string() }
        );
    }

    #[test]
    fn test_clamp_unknown_width() {
        // No known width: only parsing is checked
        assert!(validate_and_clamp("ZZZ", None).is_valid());
        assert!(validate_and_clamp("ZZZ", Some(0)).is_valid());
    }

    proptest! {
        #[test]
        fn prop_index_roundtrip(n in 1u32..=1_000_000) {
            let letters = letters_from_index(n).unwrap();
            prop_assert_eq!(index_from_letters(&letters).unwrap(), n);
        }

        #[test]
        fn prop_letters_roundtrip(s in "[A-Za-z]{1,5}") {
            let index = index_from_letters(&s).unwrap();
            prop_assert_eq!(letters_from_index(index).unwrap(), s.to_ascii_uppercase());
        }
    }
}
