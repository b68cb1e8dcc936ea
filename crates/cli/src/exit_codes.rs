//! CLI exit code registry.
//!
//! Exit codes are part of the shell contract — scripts rely on them.
//!
//! | Code | Meaning                                            |
//! |------|----------------------------------------------------|
//! | 0    | Success                                            |
//! | 1    | General error (unspecified)                        |
//! | 2    | Usage error (bad args, not a TTY)                  |
//! | 3    | I/O error (unreadable workbook, unwritable output) |
//! | 4    | malformed data (duplicate extraction key, bad CSV) |

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, interactive run without a terminal.
pub const EXIT_USAGE: u8 = 2;

/// I/O error - a file could not be read or written.
pub const EXIT_IO: u8 = 3;

/// Malformed data - duplicate cell in one extraction pass, or a catalog
/// CSV missing required columns.
pub const EXIT_DATA: u8 = 4;
