use thiserror::Error;

/// Failure converting between column letters and indices.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColumnError {
    /// Empty input, a character outside A-Z, digits mixed with letters,
    /// or a value too large to represent.
    #[error("invalid column format: {0:?}")]
    InvalidColumnFormat(String),
    /// Numeric column index below 1.
    #[error("invalid column index: {0} (columns start at 1)")]
    InvalidColumnIndex(u32),
}

/// Why a range could not be confirmed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RangeError {
    #[error("row {row} is outside the sheet (1..={total_rows})")]
    RowOutOfRange { row: u32, total_rows: u32 },

    #[error("end row {end_row} is before start row {start_row}")]
    InvalidRowOrder { start_row: u32, end_row: u32 },

    #[error("column {input:?} could not be read: {source}")]
    ColumnParseFailure {
        input: String,
        #[source]
        source: ColumnError,
    },

    #[error("column {column} is outside the sheet ({total_cols} columns)")]
    ColumnOutOfRange { column: String, total_cols: u32 },

    #[error("end column {end_col} is before start column {start_col}")]
    InvalidColumnOrder { start_col: String, end_col: String },

    #[error("parse failed: {0}")]
    SubmissionFailed(String),
}

/// Error reported by a range submitter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    /// No response at all (connection refused, DNS, timeout in transport).
    #[error("network error: {0}")]
    Network(String),
    /// The backend answered with a non-success status.
    #[error("HTTP {status}")]
    Http {
        status: u16,
        /// `error_message` from the response body, if the backend sent one.
        message: Option<String>,
    },
    /// The backend accepted the request but reported a failure.
    #[error("{0}")]
    Rejected(String),
}

/// Error reported by the preview collaborator. Kept apart from
/// [`RangeError`] so a missing preview is never mistaken for a bad range.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PreviewError {
    #[error("preview unavailable for {file_key}: {message}")]
    Unavailable { file_key: String, message: String },
    #[error("sheet {0} not found")]
    SheetNotFound(usize),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("store encoding error: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("store lock poisoned")]
    Poisoned,
}

/// A persisted selection that could not be decoded. Always recovered
/// to defaults by the caller; never shown to the user.
#[derive(Debug, Error)]
#[error("stored range selection is corrupted: {0}")]
pub struct RestoreCorrupted(#[from] pub serde_json::Error);
