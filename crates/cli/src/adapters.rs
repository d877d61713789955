// Command-line implementations of the core collaborator traits

use serde_json::json;
use sheetrange_core::{
    MessageKey, Notification, Notifier, RangeSubmitter, Severity, SubmitError, WireRange,
};

/// Submitter that accepts every range and echoes it back.
/// Stands in for the parse service when running offline.
pub struct DryRunSubmitter;

impl RangeSubmitter for DryRunSubmitter {
    fn submit(&self, range: &WireRange) -> Result<serde_json::Value, SubmitError> {
        log::debug!("dry run: not sending {:?}", range);
        Ok(json!({
            "success": true,
            "dry_run": true,
            "range": range,
        }))
    }
}

/// Prints warnings and successes to stderr. Errors are left to the
/// command's exit path so they are reported once.
pub struct StderrNotifier {
    pub quiet: bool,
}

impl Notifier for StderrNotifier {
    fn notify(&self, notification: Notification) {
        if self.quiet {
            return;
        }
        match notification.severity {
            Severity::Error => {}
            Severity::Warning => eprintln!("warning: {}", render(&notification)),
            Severity::Success => eprintln!("{}", render(&notification)),
        }
    }
}

/// English text for a notification.
pub fn render(n: &Notification) -> String {
    let p = |name: &str| n.param(name).unwrap_or("?");
    match n.key {
        MessageKey::RowOutOfRange => {
            format!("row {} is outside the sheet (1-{})", p("row"), p("total_rows"))
        }
        MessageKey::InvalidRowOrder => {
            format!("end row {} is before start row {}", p("end_row"), p("start_row"))
        }
        MessageKey::ColumnParseFailure => format!("column {} could not be read", p("column")),
        MessageKey::ColumnOutOfRange => {
            format!("column {} is outside the sheet ({} columns)", p("column"), p("total_cols"))
        }
        MessageKey::InvalidColumnOrder => {
            format!("end column {} is before start column {}", p("end_col"), p("start_col"))
        }
        MessageKey::SubmissionFailed => format!("parse failed: {}", p("message")),
        MessageKey::ColumnCorrected => {
            format!("column {:?} is not valid, reset to {}", p("input"), p("fallback"))
        }
        MessageKey::SelectionRestored => "restored the previous range selection".to_string(),
        MessageKey::RangeConfirmed => "range confirmed".to_string(),
        MessageKey::DefaultRangeConfirmed => "default range confirmed".to_string(),
        MessageKey::PreviewFailed => format!("preview failed: {}", p("message")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sheetrange_core::RangeError;

    #[test]
    fn test_render_uses_params() {
        let n = Notification::from(&RangeError::RowOutOfRange { row: 30, total_rows: 20 });
        assert_eq!(render(&n), "row 30 is outside the sheet (1-20)");

        let n = Notification::warning(MessageKey::ColumnCorrected)
            .with("input", "ZZZ")
            .with("fallback", "A");
        assert_eq!(render(&n), "column \"ZZZ\" is not valid, reset to A");
    }

    #[test]
    fn test_dry_run_echoes_range() {
        let range = WireRange { sheet_index: 0, start_row: 2, end_row: None, start_col: 2, end_col: Some(6) };
        let payload = DryRunSubmitter.submit(&range).unwrap();
        assert_eq!(payload["range"]["end_col"], 6);
        assert!(payload["range"]["end_row"].is_null());
    }
}
