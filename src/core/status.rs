//! Status line reporting
//!
//! Results go to stdout; a one-line human status goes to stderr so that
//! piping results into another command stays clean.

use colored::Colorize;

/// Status for a search that matched at least one file
pub const DATA_FOUND: &str = "Data found!";
/// Status for a search that matched nothing
pub const DATA_NOT_FOUND: &str = "Data not found!";
/// Status when the extension or the search value is blank
pub const MISSING_INPUT: &str = "Please enter both a search value and a file extension.";

/// Writes status lines to stderr unless quiet
#[derive(Debug, Clone, Copy, Default)]
pub struct Status {
    quiet: bool,
}

impl Status {
    pub fn new(quiet: bool) -> Self {
        Self { quiet }
    }

    /// Report a completed action
    pub fn success(&self, message: &str) {
        if !self.quiet {
            eprintln!("{}", message.green().bold());
        }
    }

    /// Report an outcome the user should notice but that is not a failure
    pub fn notice(&self, message: &str) {
        if !self.quiet {
            eprintln!("{}", message.yellow());
        }
    }

    /// Report a failed action; shown even in quiet mode
    pub fn failure(&self, message: &str) {
        eprintln!("{}", message.red().bold());
    }
}
