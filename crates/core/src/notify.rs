//! User-facing signals. The core decides severity and message key;
//! rendering and translation belong to whoever implements [`crate::ports::Notifier`].

use crate::error::{PreviewError, RangeError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Error,
    Warning,
    Success,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKey {
    RowOutOfRange,
    InvalidRowOrder,
    ColumnParseFailure,
    ColumnOutOfRange,
    InvalidColumnOrder,
    SubmissionFailed,
    /// A column field was reset to `A` after bad input.
    ColumnCorrected,
    /// A saved selection was found and applied.
    SelectionRestored,
    RangeConfirmed,
    DefaultRangeConfirmed,
    PreviewFailed,
}

impl MessageKey {
    /// Stable identifier for translation tables.
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageKey::RowOutOfRange => "range.row_out_of_range",
            MessageKey::InvalidRowOrder => "range.invalid_row_order",
            MessageKey::ColumnParseFailure => "range.column_parse_failure",
            MessageKey::ColumnOutOfRange => "range.column_out_of_range",
            MessageKey::InvalidColumnOrder => "range.invalid_column_order",
            MessageKey::SubmissionFailed => "range.submission_failed",
            MessageKey::ColumnCorrected => "range.column_corrected",
            MessageKey::SelectionRestored => "range.restored",
            MessageKey::RangeConfirmed => "range.confirmed",
            MessageKey::DefaultRangeConfirmed => "range.default_confirmed",
            MessageKey::PreviewFailed => "preview.failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub severity: Severity,
    pub key: MessageKey,
    pub params: Vec<(&'static str, String)>,
}

impl Notification {
    pub fn new(severity: Severity, key: MessageKey) -> Self {
        Self { severity, key, params: Vec::new() }
    }

    pub fn error(key: MessageKey) -> Self {
        Self::new(Severity::Error, key)
    }

    pub fn warning(key: MessageKey) -> Self {
        Self::new(Severity::Warning, key)
    }

    pub fn success(key: MessageKey) -> Self {
        Self::new(Severity::Success, key)
    }

    pub fn with(mut self, name: &'static str, value: impl ToString) -> Self {
        self.params.push((name, value.to_string()));
        self
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v.as_str())
    }
}

impl From<&RangeError> for Notification {
    fn from(err: &RangeError) -> Self {
        match err {
            RangeError::RowOutOfRange { row, total_rows } => Notification::error(MessageKey::RowOutOfRange)
                .with("row", row)
                .with("total_rows", total_rows),
            RangeError::InvalidRowOrder { start_row, end_row } => Notification::error(MessageKey::InvalidRowOrder)
                .with("start_row", start_row)
                .with("end_row", end_row),
            RangeError::ColumnParseFailure { input, .. } => {
                Notification::error(MessageKey::ColumnParseFailure).with("column", input)
            }
            RangeError::ColumnOutOfRange { column, total_cols } => Notification::error(MessageKey::ColumnOutOfRange)
                .with("column", column)
                .with("total_cols", total_cols),
            RangeError::InvalidColumnOrder { start_col, end_col } => {
                Notification::error(MessageKey::InvalidColumnOrder)
                    .with("start_col", start_col)
                    .with("end_col", end_col)
            }
            RangeError::SubmissionFailed(message) => {
                Notification::error(MessageKey::SubmissionFailed).with("message", message)
            }
        }
    }
}

impl From<&PreviewError> for Notification {
    fn from(err: &PreviewError) -> Self {
        Notification::error(MessageKey::PreviewFailed).with("message", err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_error_maps_to_error_notification() {
        let n = Notification::from(&RangeError::RowOutOfRange { row: 30, total_rows: 20 });
        assert_eq!(n.severity, Severity::Error);
        assert_eq!(n.key, MessageKey::RowOutOfRange);
        assert_eq!(n.param("row"), Some("30"));
        assert_eq!(n.param("total_rows"), Some("20"));
        assert_eq!(n.param("missing"), None);
    }

    #[test]
    fn test_submission_failure_carries_message() {
        let n = Notification::from(&RangeError::SubmissionFailed("file not found".into()));
        assert_eq!(n.key.as_str(), "range.submission_failed");
        assert_eq!(n.param("message"), Some("file not found"));
    }
}
