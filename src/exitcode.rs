//! Process exit codes

/// Successful termination
pub const OK: i32 = 0;

/// Any failure: missing file, parse error, nothing to copy, bad arguments
pub const FAILURE: i32 = 1;
