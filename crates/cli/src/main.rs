// sheetrange CLI - column coordinates and saved range selections

mod adapters;
mod exit_codes;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use serde_json::json;
use sheetrange_config::{JsonFileStore, Settings};
use sheetrange_core::{
    normalize_column_input, validate_and_clamp, ClampReason, Clock, ColumnCheck, KeyValueStore,
    MemoryStore, RangeError, RangeField, RangeSelectionState, RestoreOutcome, RetryingSubmitter,
    StoreError,
};
use tracing_subscriber::EnvFilter;

use adapters::{DryRunSubmitter, StderrNotifier};
use exit_codes::{range_exit_code, EXIT_ERROR, EXIT_STORE_IO, EXIT_SUCCESS, EXIT_USAGE, EXIT_VALIDATION};

#[derive(Parser)]
#[command(name = "srange")]
#[command(about = "Check spreadsheet ranges and keep the last confirmed selection per file")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    /// Selection store file (default: selections.json in the config directory)
    #[arg(long, global = true, env = "SRANGE_STORE")]
    store: Option<PathBuf>,

    /// Settings file (default: settings.json in the config directory)
    #[arg(long, global = true, env = "SRANGE_CONFIG")]
    config: Option<PathBuf>,

    /// Suppress warnings and confirmations on stderr
    #[arg(long, short = 'q', global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a column between letters and its 1-based index
    #[command(after_help = "\
Examples:
  srange col F             # F\t6
  srange col 28            # AB\t28
  srange col ZZZ --total-cols 20")]
    Col {
        /// Column letters (AB) or a 1-based number (28)
        value: String,

        /// Sheet width; columns past it are rejected
        #[arg(long)]
        total_cols: Option<u32>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate a range against a sheet extent and print its wire form
    #[command(after_help = "\
Examples:
  srange check --rows 100 --cols 20 --start-row 2 --start-col B --end-col F
  srange check --rows 100 --cols 20 --start-row 10 --end-row 5")]
    Check {
        /// Rows in the sheet (0 = unknown)
        #[arg(long)]
        rows: u32,

        /// Columns in the sheet (0 = unknown)
        #[arg(long)]
        cols: u32,

        #[command(flatten)]
        range: RangeArgs,
    },

    /// Print the saved selection for a file
    Show {
        file_key: String,
    },

    /// Drop the saved selection for a file
    Forget {
        file_key: String,
    },

    /// Validate, submit (dry run) and save a selection for a file
    #[command(after_help = "\
Examples:
  srange confirm upload-42 --rows 100 --cols 20 --start-row 2 --end-col F
  srange confirm upload-42 --skip")]
    Confirm {
        file_key: String,

        /// Rows in the sheet (0 = unknown)
        #[arg(long, required_unless_present = "skip")]
        rows: Option<u32>,

        /// Columns in the sheet (0 = unknown)
        #[arg(long, required_unless_present = "skip")]
        cols: Option<u32>,

        #[command(flatten)]
        range: RangeArgs,

        /// Submit the default range (first sheet, everything) instead
        #[arg(long, conflicts_with_all = ["sheet", "start_row", "end_row", "start_col", "end_col"])]
        skip: bool,
    },

    /// Print the effective settings
    #[command(after_help = "\
Examples:
  srange config
  srange config --init     # write them to the settings file")]
    Config {
        /// Write the effective settings to the settings file
        #[arg(long)]
        init: bool,
    },
}

#[derive(Args)]
struct RangeArgs {
    /// 0-based sheet index
    #[arg(long, default_value_t = 0)]
    sheet: usize,

    #[arg(long, default_value_t = 1)]
    start_row: u32,

    /// Last row (default: to the end of the sheet)
    #[arg(long)]
    end_row: Option<u32>,

    /// Letters (B) or a 1-based number (2)
    #[arg(long, default_value = "A")]
    start_col: String,

    /// Last column (default: to the end of the sheet)
    #[arg(long)]
    end_col: Option<String>,
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (", env!("SRANGE_BUILD_COMMIT"), ")",
        "\nbuild:   ", env!("SRANGE_BUILD_PROFILE"),
    )
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("error"));
    // Fails only if a subscriber is already set
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = if e.use_stderr() { EXIT_USAGE } else { EXIT_SUCCESS };
            let _ = e.print();
            return ExitCode::from(code);
        }
    };
    init_logging();

    let settings = match &cli.config {
        Some(path) => Settings::load_from(path),
        None => Settings::load(),
    };
    log::debug!("settings: {:?}", settings);
    let ctx = Context { cli: &cli, settings };

    let result = match &cli.command {
        Commands::Col { value, total_cols, json } => cmd_col(value, *total_cols, *json),
        Commands::Check { rows, cols, range } => ctx.cmd_check(*rows, *cols, range),
        Commands::Show { file_key } => ctx.cmd_show(file_key),
        Commands::Forget { file_key } => ctx.cmd_forget(file_key),
        Commands::Confirm { file_key, rows, cols, range, skip } => {
            ctx.cmd_confirm(file_key, *rows, *cols, range, *skip)
        }
        Commands::Config { init } => ctx.cmd_config(*init),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn error(msg: impl Into<String>) -> Self {
        Self { code: EXIT_ERROR, message: msg.into(), hint: None }
    }

    pub fn range(err: RangeError) -> Self {
        let hint = match &err {
            RangeError::RowOutOfRange { .. } => Some("rows are numbered from 1".to_string()),
            RangeError::InvalidRowOrder { .. } => Some("swap --start-row and --end-row".to_string()),
            RangeError::InvalidColumnOrder { .. } => Some("swap --start-col and --end-col".to_string()),
            RangeError::ColumnOutOfRange { total_cols, .. } => {
                let last = sheetrange_core::letters_from_index(*total_cols).unwrap_or_default();
                Some(format!("the last column is {}", last))
            }
            RangeError::ColumnParseFailure { .. } => {
                Some("use column letters (B) or a 1-based number (2)".to_string())
            }
            RangeError::SubmissionFailed(_) => None,
        };
        Self { code: range_exit_code(&err), message: err.to_string(), hint }
    }

    pub fn store(err: StoreError) -> Self {
        Self { code: EXIT_STORE_IO, message: err.to_string(), hint: None }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

fn print_json(value: &impl Serialize) -> Result<(), CliError> {
    let json = serde_json::to_string_pretty(value).map_err(|e| CliError::error(e.to_string()))?;
    println!("{}", json);
    Ok(())
}

// ============================================================================
// col
// ============================================================================

fn cmd_col(value: &str, total_cols: Option<u32>, json: bool) -> Result<(), CliError> {
    let check = validate_and_clamp(value, total_cols);
    match &check {
        ColumnCheck::Valid { index, letters } => {
            if json {
                print_json(&json!({ "input": value, "valid": true, "letters": letters, "index": index }))
            } else {
                println!("{}\t{}", letters, index);
                Ok(())
            }
        }
        ColumnCheck::Clamped { fallback, reason } => {
            let reason = match reason {
                ClampReason::Unparseable(err) => err.to_string(),
                ClampReason::OutOfRange { index, total_cols } => {
                    format!("column {} is past the last column ({})", index, total_cols)
                }
            };
            if json {
                print_json(&json!({
                    "input": value,
                    "valid": false,
                    "letters": fallback,
                    "index": 1,
                    "reason": reason,
                }))?;
            } else {
                println!("{}\t1", fallback);
            }
            Err(CliError { code: EXIT_VALIDATION, message: reason, hint: None }
                .with_hint(format!("column fields reset to {}", fallback)))
        }
    }
}

// ============================================================================
// Commands that touch range state
// ============================================================================

struct Context<'a> {
    cli: &'a Cli,
    settings: Settings,
}

impl Context<'_> {
    fn settings_path(&self) -> PathBuf {
        self.cli.config.clone().unwrap_or_else(Settings::config_path)
    }

    fn store_path(&self) -> PathBuf {
        self.cli.store.clone().unwrap_or_else(|| self.settings.store_path())
    }

    fn state(&self, file_key: &str, store: Arc<dyn KeyValueStore>) -> RangeSelectionState {
        RangeSelectionState::new(file_key, store, Arc::new(StderrNotifier { quiet: self.cli.quiet }))
            .with_options(self.settings.state_options())
    }

    fn file_state(&self, file_key: &str) -> RangeSelectionState {
        let path = self.store_path();
        log::debug!("selection store: {}", path.display());
        self.state(file_key, Arc::new(JsonFileStore::new(path)))
    }

    fn cmd_check(&self, rows: u32, cols: u32, range: &RangeArgs) -> Result<(), CliError> {
        let mut state = self.state("check", Arc::new(MemoryStore::new()));
        apply_range(&mut state, range);

        state.validate(rows, cols).map_err(CliError::range)?;
        let wire = state.to_wire_range().map_err(|e| CliError::error(e.to_string()))?;

        if !self.cli.quiet {
            eprintln!(
                "selected {} rows x {} columns",
                state.selected_row_count(rows),
                state.selected_col_count(cols)
            );
        }
        print_json(&wire)
    }

    fn cmd_show(&self, file_key: &str) -> Result<(), CliError> {
        let mut state = self.file_state(file_key);
        let outcome = state.restore();
        let status = match outcome {
            RestoreOutcome::Missing => "missing",
            RestoreOutcome::Corrupted => "corrupted",
            RestoreOutcome::Partial => "partial",
            RestoreOutcome::Restored => "restored",
        };
        print_json(&json!({
            "fileKey": file_key,
            "storageKey": state.storage_key(),
            "status": status,
            "selection": state.selection(),
        }))
    }

    fn cmd_forget(&self, file_key: &str) -> Result<(), CliError> {
        let path = self.store_path();
        let store = JsonFileStore::new(&path);
        let key = self.state(file_key, Arc::new(MemoryStore::new())).storage_key();

        if store.get(&key).is_none() {
            return Err(CliError::error(format!("no saved selection for {}", file_key))
                .with_hint(format!("store: {}", path.display())));
        }
        store.remove(&key).map_err(CliError::store)?;
        if !self.cli.quiet {
            eprintln!("removed {}", key);
        }
        Ok(())
    }

    fn cmd_confirm(
        &self,
        file_key: &str,
        rows: Option<u32>,
        cols: Option<u32>,
        range: &RangeArgs,
        skip: bool,
    ) -> Result<(), CliError> {
        let mut state = self.file_state(file_key);
        let submitter = RetryingSubmitter::new(DryRunSubmitter, self.settings.retry_policy());

        let confirmed = if skip {
            state.skip_range_selection(&submitter)
        } else {
            apply_range(&mut state, range);
            state.confirm(rows.unwrap_or(0), cols.unwrap_or(0), &submitter)
        }
        .map_err(CliError::range)?;

        // The state only logs a failed save; surface it as an exit code here.
        state.persist().map_err(CliError::store)?;
        print_json(&confirmed.payload)
    }

    fn cmd_config(&self, init: bool) -> Result<(), CliError> {
        if init {
            let path = self.settings_path();
            self.settings.save_to(&path).map_err(CliError::store)?;
            if !self.cli.quiet {
                eprintln!("wrote {}", path.display());
            }
        }
        print_json(&self.settings)
    }
}

/// Fill the tentative selection from flags. Column flags are normalized to
/// letters but never clamped; text that is not a column is kept as typed so
/// validation reports it.
fn apply_range<C: Clock>(state: &mut RangeSelectionState<C>, range: &RangeArgs) {
    state.on_sheet_change(range.sheet);
    state.set_field(RangeField::StartRow(range.start_row));
    state.set_field(RangeField::EndRow(range.end_row));
    state.set_field(RangeField::StartCol(column_flag(&range.start_col)));
    let end_col = range.end_col.as_deref().filter(|c| !c.trim().is_empty());
    state.set_field(RangeField::EndCol(end_col.map(column_flag)));
}

fn column_flag(raw: &str) -> String {
    normalize_column_input(raw).unwrap_or_else(|_| raw.trim().to_string())
}
