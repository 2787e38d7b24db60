//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract; scripts rely on them.
//!
//! # Exit Code Ranges
//!
//! | Range   | Domain           | Description                              |
//! |---------|------------------|------------------------------------------|
//! | 0       | Universal        | Success                                  |
//! | 2       | Universal        | CLI usage error (bad args, missing file) |
//! | 3-9     | files            | IO and settings codes                    |
//! | 10-19   | split            | Splitting and post-processing codes      |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant in the appropriate range
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into the relevant command's error handling

// =============================================================================
// Universal (0, 2)
// =============================================================================

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// Usage error - bad arguments, missing input file.
pub const EXIT_USAGE: u8 = 2;

// =============================================================================
// Files (3-9)
// =============================================================================

/// Reading or writing a file failed (including export copies).
pub const EXIT_IO: u8 = 3;

/// An explicitly given settings file could not be read or parsed.
pub const EXIT_CONFIG: u8 = 4;

// =============================================================================
// Split (10-19)
// =============================================================================

/// At least one input produced no outputs (no header, unreadable, strict policy).
pub const EXIT_SPLIT_FAILED: u8 = 10;

/// A standalone `titles` or `stamp` command reported failure.
pub const EXIT_STEP_FAILED: u8 = 11;

/// A required resource (the stamp image) is missing.
pub const EXIT_MISSING_RESOURCE: u8 = 12;
