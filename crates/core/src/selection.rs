//! The range a user picks inside a worksheet, and its wire form.

use serde::{Deserialize, Serialize};

use crate::column::{index_from_letters, FALLBACK_COLUMN};
use crate::error::{ColumnError, RangeError};

/// A tentative range. May be invalid until [`RangeSelection::validate`] says otherwise.
///
/// Serialized with camelCase keys; this is the shape kept in the selection store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeSelection {
    pub sheet_index: usize,
    /// 1-based first data row.
    pub start_row: u32,
    /// 1-based last data row; `None` runs to the last row of the sheet.
    pub end_row: Option<u32>,
    pub start_col: String,
    /// `None` runs to the last column of the sheet.
    pub end_col: Option<String>,
}

impl Default for RangeSelection {
    fn default() -> Self {
        Self {
            sheet_index: 0,
            start_row: 1,
            end_row: None,
            start_col: FALLBACK_COLUMN.to_string(),
            end_col: None,
        }
    }
}

/// Range in the shape the parse endpoint expects: numeric columns, open ends as null.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireRange {
    pub sheet_index: usize,
    pub start_row: u32,
    pub end_row: Option<u32>,
    pub start_col: u32,
    pub end_col: Option<u32>,
}

impl RangeSelection {
    /// Reset row and column bounds, keeping the sheet.
    pub fn reset_bounds(&mut self) {
        let sheet_index = self.sheet_index;
        *self = Self {
            sheet_index,
            ..Self::default()
        };
    }

    /// Check the range against the sheet extent. A total of 0 means the
    /// extent is unknown and that upper bound is not enforced.
    pub fn validate(&self, total_rows: u32, total_cols: u32) -> Result<(), RangeError> {
        self.validate_rows(total_rows)?;
        self.validate_cols(total_cols)
    }

    fn validate_rows(&self, total_rows: u32) -> Result<(), RangeError> {
        let out_of_range = |row: u32| RangeError::RowOutOfRange { row, total_rows };

        if self.start_row < 1 || (total_rows > 0 && self.start_row > total_rows) {
            return Err(out_of_range(self.start_row));
        }
        if let Some(end_row) = self.end_row {
            if end_row < 1 || (total_rows > 0 && end_row > total_rows) {
                return Err(out_of_range(end_row));
            }
            if end_row < self.start_row {
                return Err(RangeError::InvalidRowOrder {
                    start_row: self.start_row,
                    end_row,
                });
            }
        }
        Ok(())
    }

    fn validate_cols(&self, total_cols: u32) -> Result<(), RangeError> {
        let start = parse_bound(&self.start_col)?;
        let end = match &self.end_col {
            Some(end_col) => Some(parse_bound(end_col)?),
            None => None,
        };

        if total_cols > 0 {
            if start > total_cols {
                return Err(RangeError::ColumnOutOfRange {
                    column: self.start_col.clone(),
                    total_cols,
                });
            }
            if let (Some(end), Some(end_col)) = (end, &self.end_col) {
                if end > total_cols {
                    return Err(RangeError::ColumnOutOfRange {
                        column: end_col.clone(),
                        total_cols,
                    });
                }
            }
        }

        if let (Some(end), Some(end_col)) = (end, &self.end_col) {
            if end < start {
                return Err(RangeError::InvalidColumnOrder {
                    start_col: self.start_col.clone(),
                    end_col: end_col.clone(),
                });
            }
        }
        Ok(())
    }

    /// Convert to the numeric wire shape. Rows pass through unchanged.
    pub fn to_wire_range(&self) -> Result<WireRange, ColumnError> {
        Ok(WireRange {
            sheet_index: self.sheet_index,
            start_row: self.start_row,
            end_row: self.end_row,
            start_col: index_from_letters(&self.start_col)?,
            end_col: self.end_col.as_deref().map(index_from_letters).transpose()?,
        })
    }

    /// Number of rows covered, with an open end running to `total_rows`.
    pub fn row_count(&self, total_rows: u32) -> u32 {
        let end = self.end_row.unwrap_or(total_rows);
        span(self.start_row, end)
    }

    /// Number of columns covered, with an open end running to `total_cols`.
    /// Unreadable column letters count as an empty selection.
    pub fn col_count(&self, total_cols: u32) -> u32 {
        let Ok(start) = index_from_letters(&self.start_col) else {
            return 0;
        };
        let end = match self.end_col.as_deref().map(index_from_letters) {
            None => total_cols,
            Some(Ok(end)) => end,
            Some(Err(_)) => return 0,
        };
        span(start, end)
    }

    /// Whether the 0-based preview row falls inside the range.
    pub fn contains_row(&self, row_index: usize) -> bool {
        let row = row_index as u64 + 1;
        row >= u64::from(self.start_row) && self.end_row.map_or(true, |end| row <= u64::from(end))
    }

    /// Whether the 0-based preview column falls inside the range.
    pub fn contains_col(&self, col_index: usize) -> bool {
        let col = col_index as u64 + 1;
        let Ok(start) = index_from_letters(&self.start_col) else {
            return false;
        };
        if col < u64::from(start) {
            return false;
        }
        match self.end_col.as_deref().map(index_from_letters) {
            None => true,
            Some(Ok(end)) => col <= u64::from(end),
            Some(Err(_)) => false,
        }
    }
}

fn parse_bound(letters: &str) -> Result<u32, RangeError> {
    index_from_letters(letters).map_err(|source| RangeError::ColumnParseFailure {
        input: letters.to_string(),
        source,
    })
}

fn span(start: u32, end: u32) -> u32 {
    if end < start {
        0
    } else {
        end - start + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn range(start_row: u32, end_row: Option<u32>, start_col: &str, end_col: Option<&str>) -> RangeSelection {
        RangeSelection {
            sheet_index: 0,
            start_row,
            end_row,
            start_col: start_col.to_string(),
            end_col: end_col.map(str::to_string),
        }
    }

    #[test]
    fn test_default_is_whole_first_sheet() {
        let r = RangeSelection::default();
        assert_eq!(r, range(1, None, "A", None));
        assert_eq!(r.validate(100, 20), Ok(()));
    }

    #[test]
    fn test_invalid_row_order() {
        let r = range(10, Some(5), "A", None);
        assert_eq!(
            r.validate(100, 20),
            Err(RangeError::InvalidRowOrder { start_row: 10, end_row: 5 })
        );
    }

    #[test]
    fn test_end_row_past_sheet() {
        let r = range(1, Some(30), "A", None);
        assert_eq!(
            r.validate(20, 20),
            Err(RangeError::RowOutOfRange { row: 30, total_rows: 20 })
        );
    }

    #[test]
    fn test_start_row_zero_or_past_sheet() {
        assert_eq!(
            range(0, None, "A", None).validate(20, 20),
            Err(RangeError::RowOutOfRange { row: 0, total_rows: 20 })
        );
        assert_eq!(
            range(21, None, "A", None).validate(20, 20),
            Err(RangeError::RowOutOfRange { row: 21, total_rows: 20 })
        );
    }

    #[test]
    fn test_unknown_extent_skips_upper_bounds() {
        assert_eq!(range(500, Some(900), "A", Some("ZZ")).validate(0, 0), Ok(()));
    }

    #[test]
    fn test_column_errors() {
        assert!(matches!(
            range(1, None, "A1", None).validate(20, 20),
            Err(RangeError::ColumnParseFailure { .. })
        ));
        assert!(matches!(
            range(1, None, "A", Some("")).validate(20, 20),
            Err(RangeError::ColumnParseFailure { .. })
        ));
        assert_eq!(
            range(1, None, "A", Some("Z")).validate(20, 20),
            Err(RangeError::ColumnOutOfRange { column: "Z".into(), total_cols: 20 })
        );
        assert_eq!(
            range(1, None, "E", Some("B")).validate(20, 20),
            Err(RangeError::InvalidColumnOrder { start_col: "E".into(), end_col: "B".into() })
        );
    }

    #[test]
    fn test_rows_checked_before_columns() {
        let r = range(10, Some(5), "A1", None);
        assert!(matches!(r.validate(20, 20), Err(RangeError::InvalidRowOrder { .. })));
    }

    #[test]
    fn test_wire_range_converts_columns() {
        let r = RangeSelection {
            sheet_index: 1,
            ..range(2, Some(50), "B", Some("F"))
        };
        assert_eq!(
            r.to_wire_range().unwrap(),
            WireRange { sheet_index: 1, start_row: 2, end_row: Some(50), start_col: 2, end_col: Some(6) }
        );
    }

    #[test]
    fn test_wire_range_json_keeps_nulls() {
        let wire = RangeSelection::default().to_wire_range().unwrap();
        let json = serde_json::to_value(wire).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "sheet_index": 0,
                "start_row": 1,
                "end_row": null,
                "start_col": 1,
                "end_col": null
            })
        );
    }

    #[test]
    fn test_stored_shape_is_camel_case() {
        let json = serde_json::to_value(RangeSelection::default()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "sheetIndex": 0,
                "startRow": 1,
                "endRow": null,
                "startCol": "A",
                "endCol": null
            })
        );
    }

    #[test]
    fn test_counts() {
        assert_eq!(range(2, Some(10), "A", None).row_count(100), 9);
        assert_eq!(range(1, None, "A", None).row_count(100), 100);
        assert_eq!(range(1, None, "A", Some("E")).col_count(20), 5);
        assert_eq!(range(1, None, "A", None).col_count(20), 20);
        assert_eq!(range(10, Some(5), "?", None).row_count(100), 0);
        assert_eq!(range(1, None, "?", None).col_count(20), 0);
    }

    #[test]
    fn test_contains() {
        let r = range(2, Some(5), "B", Some("D"));
        assert!(!r.contains_row(0));
        assert!(r.contains_row(1));
        assert!(r.contains_row(4));
        assert!(!r.contains_row(5));

        assert!(!r.contains_col(0));
        assert!(r.contains_col(1));
        assert!(r.contains_col(3));
        assert!(!r.contains_col(4));

        let open = RangeSelection::default();
        assert!(open.contains_row(0));
        assert!(open.contains_row(50));
        assert!(open.contains_col(0));
        assert!(open.contains_col(10));
    }

    #[test]
    fn test_reset_bounds_keeps_sheet() {
        let mut r = RangeSelection {
            sheet_index: 2,
            ..range(4, Some(9), "C", Some("H"))
        };
        r.reset_bounds();
        assert_eq!(r, RangeSelection { sheet_index: 2, ..RangeSelection::default() });
    }
}
