//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract; scripts rely on them.
//!
//! # Exit Code Ranges
//!
//! | Range   | Domain           | Description                              |
//! |---------|------------------|------------------------------------------|
//! | 0       | Universal        | Success (Error rows do not change this)  |
//! | 1       | Universal        | General error (unspecified)              |
//! | 2       | Universal        | CLI usage error (bad args, bad extension)|
//! | 3-9     | run              | Input, output and settings failures      |
//! | 10-19   | ai               | AI provider codes                        |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant in the appropriate range
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into the relevant command's error handling

// =============================================================================
// Universal (0-2)
// =============================================================================

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, unsupported file extension.
pub const EXIT_USAGE: u8 = 2;

// =============================================================================
// Run (3-9)
// =============================================================================

/// Input file missing, unreadable, or the requested sheet does not exist.
pub const EXIT_INPUT: u8 = 3;

/// Output path cannot be written (permissions, read-only format).
pub const EXIT_OUTPUT: u8 = 4;

/// Settings file unreadable or invalid (bad column letter, overlapping columns).
pub const EXIT_CONFIG: u8 = 5;

// =============================================================================
// AI (10-19)
// =============================================================================

/// AI strategy selected but no API key in the environment.
/// Checked before the input file is opened.
pub const EXIT_AI_MISSING_KEY: u8 = 11;
