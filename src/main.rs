//! datafinder - search spreadsheet files for a value and act on the results
//!
//! datafinder provides:
//! - Recursive search of CSV/TSV/XLSX files for an exact cell value
//! - Copy/move/delete/open of matched files, and folder creation
//! - Unified output format (jsonl/json/md/raw)

use anyhow::Result;
use clap::Parser;
use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode};

mod cli;
mod core;
mod fileops;
mod search;
mod table;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    let level = if cli.verbose {
        LevelFilter::Debug
    } else if cli.quiet {
        LevelFilter::Error
    } else {
        LevelFilter::Warn
    };
    let color = if cli.no_color {
        ColorChoice::Never
    } else {
        ColorChoice::Auto
    };
    // a second logger can't be installed; nothing to do if one already is
    let _ = TermLogger::init(level, Config::default(), TerminalMode::Stderr, color);

    cli::run(cli)
}
