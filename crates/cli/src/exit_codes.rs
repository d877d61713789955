//! CLI Exit Code Registry
//!
//! Single source of truth for `srange` exit codes. Scripts rely on them.
//!
//! | Code | Meaning                                         |
//! |------|-------------------------------------------------|
//! | 0    | Success                                         |
//! | 1    | General error (submission failed)               |
//! | 2    | Usage error (bad arguments)                     |
//! | 3    | Range failed validation                         |
//! | 4    | Selection store could not be read or written    |

use sheetrange_core::RangeError;

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing required options.
/// Matches clap's own exit code for argument errors.
pub const EXIT_USAGE: u8 = 2;

/// The range was rejected by validation before anything was submitted.
pub const EXIT_VALIDATION: u8 = 3;

/// The selection store could not be written.
pub const EXIT_STORE_IO: u8 = 4;

/// Map a range error to its exit code.
pub fn range_exit_code(err: &RangeError) -> u8 {
    match err {
        RangeError::SubmissionFailed(_) => EXIT_ERROR,
        _ => EXIT_VALIDATION,
    }
}
