//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract; scripts rely on them.
//!
//! | Code | Meaning                                              |
//! |------|------------------------------------------------------|
//! | 0    | Every pair compared clean                            |
//! | 1    | At least one pair has unmatched or mismatched rows   |
//! | 2    | CLI usage error (bad args, missing config file)      |
//! | 3    | Driver config could not be parsed or is invalid      |
//! | 4    | At least one pair failed (acquisition, report, ...)  |
//!
//! A run with both failed and discrepant pairs exits 4.

/// Success - every pair reconciled without differences.
pub const EXIT_SUCCESS: u8 = 0;

/// Differences found. Like `diff(1)`, exit 1 means "inputs differ."
pub const EXIT_DISCREPANCIES: u8 = 1;

/// Usage error - bad arguments, missing required options or files.
pub const EXIT_USAGE: u8 = 2;

/// Driver config failed to parse or validate.
pub const EXIT_INVALID_CONFIG: u8 = 3;

/// A pair could not be compared or reported.
pub const EXIT_PAIR_FAILED: u8 = 4;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_distinct() {
        let codes = [
            EXIT_SUCCESS,
            EXIT_DISCREPANCIES,
            EXIT_USAGE,
            EXIT_INVALID_CONFIG,
            EXIT_PAIR_FAILED,
        ];
        for (i, a) in codes.iter().enumerate() {
            for b in &codes[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
