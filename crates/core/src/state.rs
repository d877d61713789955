//! Range selection state for one open file.
//!
//! Holds the tentative selection the user is editing, a debounced copy of it
//! used for highlighting, and the glue to the store, notifier, preview and
//! submit collaborators.
//!
//! Mutations never fail. Correctness is checked at two boundaries only:
//! column fields on blur ([`RangeSelectionState::commit_column_input`]) and
//! the whole range on [`RangeSelectionState::confirm`].

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Deserializer};

use crate::column::{letters_from_index, validate_and_clamp, ColumnCheck, FALLBACK_COLUMN};
use crate::debounce::{Clock, Debounced, SystemClock, DEFAULT_DEBOUNCE};
use crate::error::{ColumnError, PreviewError, RangeError, RestoreCorrupted, StoreError};
use crate::notify::{MessageKey, Notification};
use crate::ports::{KeyValueStore, Notifier, PreviewSource, RangeSubmitter};
use crate::preview::SheetPreview;
use crate::retry::format_error_message;
use crate::selection::{RangeSelection, WireRange};

/// Prefix of the store key; the file identifier follows it.
pub const STORAGE_KEY_PREFIX: &str = "excel_range_";

const SUBMIT_FAILED_FALLBACK: &str = "range could not be parsed";

/// One edit to the tentative selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RangeField {
    SheetIndex(usize),
    StartRow(u32),
    EndRow(Option<u32>),
    StartCol(String),
    EndCol(Option<String>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnBound {
    Start,
    End,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateOptions {
    pub debounce: Duration,
    pub key_prefix: String,
}

impl Default for StateOptions {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            key_prefix: STORAGE_KEY_PREFIX.to_string(),
        }
    }
}

/// What [`RangeSelectionState::restore`] found in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestoreOutcome {
    /// Nothing stored; defaults applied.
    Missing,
    /// Stored value could not be decoded; defaults applied silently.
    Corrupted,
    /// Some fields stored; the rest defaulted.
    Partial,
    /// A complete record was applied and the user was told.
    Restored,
}

/// Result of a successful confirmation.
#[derive(Debug, Clone, PartialEq)]
pub struct Confirmed {
    /// What was sent to the submitter.
    pub range: WireRange,
    /// Whatever the submitter returned.
    pub payload: serde_json::Value,
}

pub struct RangeSelectionState<C: Clock = SystemClock> {
    file_key: String,
    options: StateOptions,
    tentative: RangeSelection,
    projection: Debounced<RangeSelection>,
    clock: C,
    store: Arc<dyn KeyValueStore>,
    notifier: Arc<dyn Notifier>,
}

impl RangeSelectionState<SystemClock> {
    pub fn new(
        file_key: impl Into<String>,
        store: Arc<dyn KeyValueStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self::with_clock(file_key, store, notifier, SystemClock)
    }
}

impl<C: Clock> RangeSelectionState<C> {
    pub fn with_clock(
        file_key: impl Into<String>,
        store: Arc<dyn KeyValueStore>,
        notifier: Arc<dyn Notifier>,
        clock: C,
    ) -> Self {
        let options = StateOptions::default();
        Self {
            file_key: file_key.into(),
            projection: Debounced::new(RangeSelection::default(), options.debounce),
            options,
            tentative: RangeSelection::default(),
            clock,
            store,
            notifier,
        }
    }

    pub fn with_options(mut self, options: StateOptions) -> Self {
        self.projection.set_delay(options.debounce);
        self.options = options;
        self
    }

    pub fn file_key(&self) -> &str {
        &self.file_key
    }

    pub fn storage_key(&self) -> String {
        format!("{}{}", self.options.key_prefix, self.file_key)
    }

    /// The selection being edited.
    pub fn selection(&self) -> &RangeSelection {
        &self.tentative
    }

    /// The lagged copy used for highlighting. Call [`tick`](Self::tick) first
    /// to pick up an expired timer.
    pub fn debounced(&self) -> &RangeSelection {
        self.projection.get()
    }

    pub fn has_pending_update(&self) -> bool {
        self.projection.is_pending()
    }

    /// Apply the pending projection update if its quiet period has passed.
    pub fn tick(&mut self) -> bool {
        let changed = self.projection.poll(self.clock.now());
        if changed {
            log::debug!("highlight range for {} updated: {:?}", self.file_key, self.projection.get());
        }
        changed
    }

    // ------------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------------

    pub fn set_field(&mut self, field: RangeField) {
        match field {
            RangeField::SheetIndex(v) => self.tentative.sheet_index = v,
            RangeField::StartRow(v) => self.tentative.start_row = v,
            RangeField::EndRow(v) => self.tentative.end_row = v,
            RangeField::StartCol(v) => self.tentative.start_col = v,
            RangeField::EndCol(v) => self.tentative.end_col = v,
        }
        self.restart_timer();
    }

    /// Skip a header row: start at row 2, but only from the default start.
    pub fn skip_first_row(&mut self) {
        if self.tentative.start_row == 1 {
            self.set_field(RangeField::StartRow(2));
        }
    }

    /// Select columns `A` through the `n`th column.
    pub fn select_first_n_cols(&mut self, n: u32) -> Result<(), ColumnError> {
        let end = letters_from_index(n)?;
        self.tentative.start_col = FALLBACK_COLUMN.to_string();
        self.tentative.end_col = Some(end);
        self.restart_timer();
        Ok(())
    }

    /// Back to defaults. The highlight follows at once, without the quiet period.
    pub fn reset(&mut self) {
        self.tentative = RangeSelection::default();
        self.projection.settle(self.tentative.clone());
    }

    /// Switch sheets; row and column bounds go back to defaults.
    pub fn on_sheet_change(&mut self, sheet_index: usize) {
        self.tentative.sheet_index = sheet_index;
        self.tentative.reset_bounds();
        self.restart_timer();
    }

    /// Blur-time check of a column field.
    ///
    /// Valid input is stored in normalized letter form. Invalid or
    /// out-of-range input resets the field to `A` and raises a warning.
    /// A blank end bound clears it and returns `None`.
    pub fn commit_column_input(
        &mut self,
        bound: ColumnBound,
        raw: &str,
        total_cols: Option<u32>,
    ) -> Option<ColumnCheck> {
        if bound == ColumnBound::End && raw.trim().is_empty() {
            self.set_field(RangeField::EndCol(None));
            return None;
        }

        let check = validate_and_clamp(raw, total_cols);
        let letters = check.letters().to_string();
        match bound {
            ColumnBound::Start => self.set_field(RangeField::StartCol(letters)),
            ColumnBound::End => self.set_field(RangeField::EndCol(Some(letters))),
        }

        if let ColumnCheck::Clamped { fallback, reason } = &check {
            log::debug!("column input {:?} rejected ({:?}), reset to {}", raw, reason, fallback);
            self.notifier.notify(
                Notification::warning(MessageKey::ColumnCorrected)
                    .with("input", raw.trim())
                    .with("fallback", fallback),
            );
        }
        Some(check)
    }

    fn restart_timer(&mut self) {
        self.projection.schedule(self.tentative.clone(), self.clock.now());
    }

    // ------------------------------------------------------------------
    // Derived views
    // ------------------------------------------------------------------

    pub fn validate(&self, total_rows: u32, total_cols: u32) -> Result<(), RangeError> {
        self.tentative.validate(total_rows, total_cols)
    }

    pub fn to_wire_range(&self) -> Result<WireRange, ColumnError> {
        self.tentative.to_wire_range()
    }

    pub fn selected_row_count(&self, total_rows: u32) -> u32 {
        self.tentative.row_count(total_rows)
    }

    pub fn selected_col_count(&self, total_cols: u32) -> u32 {
        self.tentative.col_count(total_cols)
    }

    /// Whether a 0-based preview row is inside the debounced range.
    pub fn is_row_highlighted(&self, row_index: usize) -> bool {
        self.projection.get().contains_row(row_index)
    }

    /// Whether a 0-based preview column is inside the debounced range.
    pub fn is_col_highlighted(&self, col_index: usize) -> bool {
        self.projection.get().contains_col(col_index)
    }

    // ------------------------------------------------------------------
    // Preview
    // ------------------------------------------------------------------

    /// Fetch the preview for the current sheet. A single-sheet workbook
    /// has that sheet selected automatically.
    pub fn load_preview<P: PreviewSource + ?Sized>(
        &mut self,
        source: &P,
    ) -> Result<SheetPreview, PreviewError> {
        match source.preview(&self.file_key, self.tentative.sheet_index) {
            Ok(preview) => {
                if let Some(only) = preview.single_sheet() {
                    if only != self.tentative.sheet_index {
                        self.set_field(RangeField::SheetIndex(only));
                    }
                }
                Ok(preview)
            }
            Err(err) => {
                log::warn!("preview failed for {}: {}", self.file_key, err);
                self.notifier.notify(Notification::from(&err));
                Err(err)
            }
        }
    }

    pub fn select_sheet<P: PreviewSource + ?Sized>(
        &mut self,
        sheet_index: usize,
        source: &P,
    ) -> Result<SheetPreview, PreviewError> {
        self.on_sheet_change(sheet_index);
        self.load_preview(source)
    }

    // ------------------------------------------------------------------
    // Confirmation
    // ------------------------------------------------------------------

    /// Validate, submit once, and persist on success.
    ///
    /// Validation failures are reported without calling the submitter. A
    /// submitter failure becomes [`RangeError::SubmissionFailed`] and
    /// nothing is persisted.
    pub fn confirm<S: RangeSubmitter + ?Sized>(
        &mut self,
        total_rows: u32,
        total_cols: u32,
        submitter: &S,
    ) -> Result<Confirmed, RangeError> {
        let wire = self
            .tentative
            .validate(total_rows, total_cols)
            .and_then(|()| {
                self.tentative.to_wire_range().map_err(|source| RangeError::ColumnParseFailure {
                    input: self.tentative.start_col.clone(),
                    source,
                })
            });
        let wire = match wire {
            Ok(wire) => wire,
            Err(err) => {
                log::debug!("range for {} rejected: {}", self.file_key, err);
                self.notifier.notify(Notification::from(&err));
                return Err(err);
            }
        };

        let selection = self.tentative.clone();
        let confirmed = self.submit(wire, submitter)?;
        self.persist_selection(&selection);
        self.notifier.notify(Notification::success(MessageKey::RangeConfirmed));
        Ok(confirmed)
    }

    /// Parse with the default range (first sheet, every row and column),
    /// skipping the editor. On success the state and store hold the defaults.
    pub fn skip_range_selection<S: RangeSubmitter + ?Sized>(
        &mut self,
        submitter: &S,
    ) -> Result<Confirmed, RangeError> {
        let defaults = RangeSelection::default();
        let wire = WireRange {
            sheet_index: defaults.sheet_index,
            start_row: defaults.start_row,
            end_row: None,
            start_col: 1,
            end_col: None,
        };

        let confirmed = self.submit(wire, submitter)?;
        self.tentative = defaults.clone();
        self.projection.settle(defaults.clone());
        self.persist_selection(&defaults);
        self.notifier.notify(Notification::success(MessageKey::DefaultRangeConfirmed));
        Ok(confirmed)
    }

    fn submit<S: RangeSubmitter + ?Sized>(
        &self,
        wire: WireRange,
        submitter: &S,
    ) -> Result<Confirmed, RangeError> {
        log::info!("submitting range for {}: {:?}", self.file_key, wire);
        match submitter.submit(&wire) {
            Ok(payload) => Ok(Confirmed { range: wire, payload }),
            Err(err) => {
                log::warn!("range submission for {} failed: {}", self.file_key, err);
                let err = RangeError::SubmissionFailed(format_error_message(&err, SUBMIT_FAILED_FALLBACK));
                self.notifier.notify(Notification::from(&err));
                Err(err)
            }
        }
    }

    // ------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------

    /// Write the tentative selection to the store.
    pub fn persist(&self) -> Result<(), StoreError> {
        self.write_selection(&self.tentative)
    }

    fn write_selection(&self, selection: &RangeSelection) -> Result<(), StoreError> {
        let json = serde_json::to_string(selection)?;
        self.store.set(&self.storage_key(), &json)
    }

    /// The range was already accepted downstream; a failed write only costs
    /// the user their saved selection.
    fn persist_selection(&self, selection: &RangeSelection) {
        match self.write_selection(selection) {
            Ok(()) => log::info!("saved range selection under {}", self.storage_key()),
            Err(err) => log::warn!("could not save range selection for {}: {}", self.file_key, err),
        }
    }

    /// Load the saved selection for this file.
    ///
    /// Missing or corrupted data falls back to defaults without telling the
    /// user. Only a complete record produces a notification.
    pub fn restore(&mut self) -> RestoreOutcome {
        let (selection, outcome) = match self.store.get(&self.storage_key()) {
            None => (RangeSelection::default(), RestoreOutcome::Missing),
            Some(raw) => match decode_stored(&raw) {
                Ok(stored) => {
                    let outcome = if stored.is_complete() {
                        RestoreOutcome::Restored
                    } else {
                        RestoreOutcome::Partial
                    };
                    (stored.into_selection(), outcome)
                }
                Err(err) => {
                    log::debug!("{} for {}; using defaults", err, self.file_key);
                    (RangeSelection::default(), RestoreOutcome::Corrupted)
                }
            },
        };

        self.tentative = selection;
        self.projection.settle(self.tentative.clone());

        if outcome == RestoreOutcome::Restored {
            self.notifier.notify(Notification::success(MessageKey::SelectionRestored));
        }
        outcome
    }
}

/// Stored record where any field may be absent. `end_row`/`end_col` use a
/// nested option so an explicit `null` (open end) counts as present.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredSelection {
    #[serde(default)]
    sheet_index: Option<usize>,
    #[serde(default)]
    start_row: Option<u32>,
    #[serde(default, deserialize_with = "present")]
    end_row: Option<Option<u32>>,
    #[serde(default)]
    start_col: Option<String>,
    #[serde(default, deserialize_with = "present")]
    end_col: Option<Option<String>>,
}

fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

impl StoredSelection {
    fn is_complete(&self) -> bool {
        self.sheet_index.is_some()
            && self.start_row.is_some()
            && self.end_row.is_some()
            && self.start_col.is_some()
            && self.end_col.is_some()
    }

    fn into_selection(self) -> RangeSelection {
        let defaults = RangeSelection::default();
        RangeSelection {
            sheet_index: self.sheet_index.unwrap_or(defaults.sheet_index),
            start_row: self.start_row.unwrap_or(defaults.start_row),
            end_row: self.end_row.unwrap_or(defaults.end_row),
            start_col: self.start_col.unwrap_or(defaults.start_col),
            end_col: self.end_col.unwrap_or(defaults.end_col),
        }
    }
}

/// Only a JSON object is a stored selection; arrays and scalars are corrupt.
fn decode_stored(raw: &str) -> Result<StoredSelection, RestoreCorrupted> {
    let value: serde_json::Value = serde_json::from_str(raw)?;
    if !value.is_object() {
        return Err(RestoreCorrupted(serde::de::Error::custom(
            "stored selection is not a JSON object",
        )));
    }
    Ok(serde_json::from_value(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::debounce::ManualClock;
    use crate::ports::{MemoryStore, NullNotifier};

    fn state() -> (RangeSelectionState<ManualClock>, ManualClock) {
        let clock = ManualClock::new();
        let s = RangeSelectionState::with_clock(
            "f1",
            Arc::new(MemoryStore::new()),
            Arc::new(NullNotifier),
            clock.clone(),
        );
        (s, clock)
    }

    #[test]
    fn test_storage_key() {
        let (s, _) = state();
        assert_eq!(s.storage_key(), "excel_range_f1");

        let s = s.with_options(StateOptions {
            key_prefix: "range:".into(),
            ..StateOptions::default()
        });
        assert_eq!(s.storage_key(), "range:f1");
    }

    #[test]
    fn test_skip_first_row_is_idempotent() {
        let (mut s, _) = state();
        s.skip_first_row();
        assert_eq!(s.selection().start_row, 2);
        s.skip_first_row();
        assert_eq!(s.selection().start_row, 2);

        s.set_field(RangeField::StartRow(7));
        s.skip_first_row();
        assert_eq!(s.selection().start_row, 7);
    }

    #[test]
    fn test_select_first_n_cols() {
        let (mut s, _) = state();
        s.set_field(RangeField::StartCol("C".into()));
        s.select_first_n_cols(5).unwrap();
        assert_eq!(s.selection().start_col, "A");
        assert_eq!(s.selection().end_col.as_deref(), Some("E"));

        assert_eq!(s.select_first_n_cols(0), Err(ColumnError::InvalidColumnIndex(0)));
        assert_eq!(s.selection().end_col.as_deref(), Some("E"));
    }

    #[test]
    fn test_custom_debounce_delay() {
        let (s, clock) = state();
        let mut s = s.with_options(StateOptions {
            debounce: Duration::from_millis(100),
            ..StateOptions::default()
        });
        s.set_field(RangeField::StartRow(4));
        clock.advance(Duration::from_millis(100));
        assert!(s.tick());
        assert_eq!(s.debounced().start_row, 4);
    }

    #[test]
    fn test_decode_partial_and_null_ends() {
        let stored = decode_stored(r#"{"startRow": 5}"#).unwrap();
        assert!(!stored.is_complete());

        let stored = decode_stored(
            r#"{"sheetIndex":0,"startRow":1,"endRow":null,"startCol":"A","endCol":null}"#,
        )
        .unwrap();
        assert!(stored.is_complete());
        assert_eq!(stored.into_selection(), RangeSelection::default());

        assert!(decode_stored("not json").is_err());
        assert!(decode_stored("null").is_err());
        assert!(decode_stored(r#"{"startRow": "five"}"#).is_err());
    }

    #[test]
    fn test_decode_rejects_arrays_and_scalars() {
        assert!(decode_stored(r#"[1, 3, 20, "B", "F"]"#).is_err());
        assert!(decode_stored("[]").is_err());
        assert!(decode_stored("42").is_err());
        assert!(decode_stored(r#""excel""#).is_err());
        assert!(decode_stored("{}").is_ok());
    }
}
