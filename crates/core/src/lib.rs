//! Range selection core.
//!
//! Column letter arithmetic, the tentative/debounced range selection state
//! for one uploaded workbook, and the collaborator traits it talks to
//! (preview, submit, store, notify). No transport, no UI.

pub mod column;
pub mod debounce;
pub mod error;
pub mod notify;
pub mod ports;
pub mod preview;
pub mod retry;
pub mod selection;
pub mod state;

pub use column::{
    index_from_letters, letters_from_index, normalize_column_input, parse_column_input,
    validate_and_clamp, ClampReason, ColumnCheck, FALLBACK_COLUMN,
};
pub use debounce::{Clock, Debounced, ManualClock, SystemClock, DEFAULT_DEBOUNCE};
pub use error::{ColumnError, PreviewError, RangeError, RestoreCorrupted, StoreError, SubmitError};
pub use notify::{MessageKey, Notification, Severity};
pub use ports::{KeyValueStore, MemoryStore, Notifier, NullNotifier, PreviewSource, RangeSubmitter};
pub use preview::{SheetInfo, SheetPreview};
pub use retry::{
    format_error_message, RetryPolicy, RetryingSubmitter, Sleeper, ThreadSleeper, RETRYABLE_STATUSES,
};
pub use selection::{RangeSelection, WireRange};
pub use state::{
    ColumnBound, Confirmed, RangeField, RangeSelectionState, RestoreOutcome, StateOptions,
    STORAGE_KEY_PREFIX,
};
