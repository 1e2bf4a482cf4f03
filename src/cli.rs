//! CLI module - Command-line interface definitions and handlers

use anyhow::Result;
use clap::{Parser, Subcommand};
use log::warn;
use std::path::PathBuf;

use crate::core::paths::{absolute_root, resolve_under};
use crate::core::render::{OutputFormat, RenderConfig};
use crate::core::status::Status;
use crate::fileops::collect_paths;
use crate::search::request::SearchOptions;

/// datafinder - find spreadsheet files containing a value, then act on them.
#[derive(Parser, Debug)]
#[command(name = "datafinder")]
#[command(
    author,
    version,
    about,
    long_about = r#"datafinder walks a directory tree, opens every CSV/TSV/XLSX file whose
name ends with the given extension, and reports the files where some cell
renders exactly as the search value.

Each command prints a ResultSet in the selected format (default: jsonl).
A one-line status ("Data found!", "Data not found!", ...) goes to stderr.

Output formats:
- jsonl: one JSON object per line (best for piping into other commands)
- json: a single JSON array
- md: human-friendly Markdown
- raw: paths only, one per line

Examples:
    datafinder search .csv 42
    datafinder --root ~/reports search .xlsx "ACME Corp"
    datafinder search .csv 42 | datafinder copy - --dest ~/matches
    datafinder mkdir Archive
"#
)]
pub struct Cli {
    /// Root directory for all operations.
    #[arg(
        long,
        global = true,
        default_value = ".",
        env = "DATAFINDER_ROOT",
        value_name = "ROOT",
        long_help = "Root directory for all operations (defaults to the current directory).\n\n\
search walks this directory, mkdir creates folders inside it, and relative\n\
FILES arguments are interpreted relative to it."
    )]
    pub root: PathBuf,

    /// Output format (jsonl/json/md/raw).
    #[arg(
        long,
        global = true,
        default_value = "jsonl",
        env = "DATAFINDER_FORMAT",
        value_name = "FORMAT",
        long_help = "Select the output format for ResultSet.\n\n\
Supported values:\n\
- jsonl (default)\n\
- json\n\
- md (markdown)\n\
- raw\n\n\
Tip: jsonl output can be piped straight into copy/move/delete/open via `-`."
    )]
    pub format: String,

    /// Disable colored output (when applicable).
    #[arg(
        long,
        global = true,
        long_help = "Disable colored status lines and log output. This is useful when piping\n\
stderr to files or when your terminal does not support ANSI colors."
    )]
    pub no_color: bool,

    /// Quiet mode (minimal output).
    #[arg(
        short,
        long,
        global = true,
        conflicts_with = "verbose",
        long_help = "Suppress status lines and warnings. Failures are still reported, and\n\
machine-readable results are still printed to stdout."
    )]
    pub quiet: bool,

    /// Verbose mode (more diagnostics).
    #[arg(
        short,
        long,
        global = true,
        long_help = "Enable debug logging on stderr, including each file tested during a\n\
search and the reason a file was skipped."
    )]
    pub verbose: bool,

    /// Pretty-print JSON/JSONL output with indentation.
    #[arg(
        long,
        global = true,
        long_help = "Pretty-print JSON and JSONL output with indentation for human readability.\n\n\
Has no effect on md/raw formats. Pretty jsonl cannot be piped back into FILES."
    )]
    pub pretty: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Find files under ROOT with a cell equal to VALUE.
    #[command(
        long_about = "Walk ROOT recursively and test every file whose name ends with EXTENSION.\n\
A file matches when any data cell, rendered the way a spreadsheet export\n\
would render it, equals VALUE exactly. The header row is never searched.\n\n\
Supported formats are detected from the file name: .csv, .tsv and .xlsx\n\
(first sheet). Files that fail to parse are logged and skipped.\n\n\
Examples:\n\
  datafinder search .csv 42\n\
  datafinder search csv 3.5\n\
  datafinder search .xlsx True --max-depth 2\n"
    )]
    Search {
        /// File name suffix to select (e.g. ".csv").
        #[arg(
            value_name = "EXTENSION",
            long_help = "File name suffix to select, compared case-sensitively against the end of\n\
each file name. Both \".csv\" and \"csv\" select report.csv."
        )]
        extension: String,

        /// Value to look for.
        #[arg(
            value_name = "VALUE",
            long_help = "Value to look for. Compared as a string against each rendered cell:\n\
\"123\" matches the number 123, while \"123.0\" matches a float column."
        )]
        value: String,

        /// Maximum directory depth below ROOT.
        #[arg(
            long,
            value_name = "N",
            long_help = "Maximum directory depth below ROOT.\n\n\
If omitted, search traverses all depths."
        )]
        max_depth: Option<usize>,

        /// Treat the first row as data instead of a header.
        #[arg(
            long,
            long_help = "Treat the first row of each file as data so that it is searched too.\n\n\
By default the first row is a header and never matches."
        )]
        no_header: bool,
    },

    /// Copy files into a destination directory.
    #[command(long_about = "Copy each file into DIR, keeping its file name and overwriting any\n\
existing file of the same name.\n\n\
Examples:\n\
  datafinder copy 2024/a.csv 2024/b.csv --dest backup\n\
  datafinder search .csv 42 | datafinder copy - --dest matches\n")]
    Copy {
        /// Files to copy (`-` reads paths from stdin).
        #[arg(required = true, value_name = "FILES")]
        files: Vec<PathBuf>,

        /// Destination directory (must exist).
        #[arg(long, value_name = "DIR")]
        dest: PathBuf,

        /// Stop at the first failure.
        #[arg(long)]
        fail_fast: bool,
    },

    /// Move files into a destination directory.
    #[command(long_about = "Move each file into DIR, keeping its file name and overwriting any\n\
existing file of the same name. Moves across filesystems fall back to\n\
copy and delete.\n\n\
Examples:\n\
  datafinder move old.csv --dest archive\n\
  datafinder search .xlsx Closed | datafinder move - --dest archive\n")]
    Move {
        /// Files to move (`-` reads paths from stdin).
        #[arg(required = true, value_name = "FILES")]
        files: Vec<PathBuf>,

        /// Destination directory (must exist).
        #[arg(long, value_name = "DIR")]
        dest: PathBuf,

        /// Stop at the first failure.
        #[arg(long)]
        fail_fast: bool,
    },

    /// Delete files.
    #[command(long_about = "Delete each file in place. Directories are never removed.\n\n\
Examples:\n\
  datafinder delete tmp/a.csv\n\
  datafinder search .csv obsolete | datafinder delete -\n")]
    Delete {
        /// Files to delete (`-` reads paths from stdin).
        #[arg(required = true, value_name = "FILES")]
        files: Vec<PathBuf>,

        /// Stop at the first failure.
        #[arg(long)]
        fail_fast: bool,
    },

    /// Open files with the default application.
    #[command(long_about = "Open each file with the operating system's default application.\n\
The application is launched in the background; datafinder does not wait\n\
for it to exit.\n\n\
Examples:\n\
  datafinder open report.xlsx\n\
  datafinder search .xlsx 42 | datafinder open -\n")]
    Open {
        /// Files to open (`-` reads paths from stdin).
        #[arg(required = true, value_name = "FILES")]
        files: Vec<PathBuf>,

        /// Stop at the first failure.
        #[arg(long)]
        fail_fast: bool,
    },

    /// Create a folder under ROOT.
    #[command(long_about = "Create ROOT/NAME. Only the last component is created; the parent must\n\
already exist. Creating a folder that already exists is an error.\n\n\
Examples:\n\
  datafinder mkdir Archive\n\
  datafinder --root ~/reports mkdir 2025\n")]
    Mkdir {
        /// Folder name.
        #[arg(value_name = "NAME")]
        name: String,
    },
}

/// Run the CLI with parsed arguments
pub fn run(cli: Cli) -> Result<()> {
    if cli.no_color {
        colored::control::set_override(false);
    }

    let format: OutputFormat = cli.format.parse().unwrap_or_else(|e| {
        warn!("{}, falling back to jsonl", e);
        OutputFormat::default()
    });
    let render_config = RenderConfig::with_pretty(format, cli.pretty);
    let status = Status::new(cli.quiet);

    let root = absolute_root(&cli.root);

    match cli.command {
        Commands::Search {
            extension,
            value,
            max_depth,
            no_header,
        } => {
            let options = SearchOptions {
                has_header: !no_header,
                max_depth,
            };
            crate::search::scanner::run_search(
                &root,
                &extension,
                &value,
                options,
                render_config,
                status,
            )
        }

        Commands::Copy {
            files,
            dest,
            fail_fast,
        } => {
            let paths = collect_paths(&root, &files)?;
            let dest = resolve_under(&root, &dest);
            crate::fileops::transfer::run_copy(&paths, &dest, fail_fast, render_config, status)
        }

        Commands::Move {
            files,
            dest,
            fail_fast,
        } => {
            let paths = collect_paths(&root, &files)?;
            let dest = resolve_under(&root, &dest);
            crate::fileops::transfer::run_move(&paths, &dest, fail_fast, render_config, status)
        }

        Commands::Delete { files, fail_fast } => {
            let paths = collect_paths(&root, &files)?;
            crate::fileops::remove::run_delete(&paths, fail_fast, render_config, status)
        }

        Commands::Open { files, fail_fast } => {
            let paths = collect_paths(&root, &files)?;
            crate::fileops::open::run_open(&paths, fail_fast, render_config, status)
        }

        Commands::Mkdir { name } => {
            crate::fileops::folder::run_mkdir(&root, &name, render_config, status)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_search() {
        let cli = Cli::try_parse_from(["datafinder", "search", ".csv", "42", "--no-header"]).unwrap();
        match cli.command {
            Commands::Search {
                extension,
                value,
                no_header,
                max_depth,
            } => {
                assert_eq!(extension, ".csv");
                assert_eq!(value, "42");
                assert!(no_header);
                assert_eq!(max_depth, None);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "datafinder", "mkdir", "Archive", "--root", "/data", "--format", "md", "-q",
        ])
        .unwrap();
        assert_eq!(cli.root, PathBuf::from("/data"));
        assert_eq!(cli.format, "md");
        assert!(cli.quiet);
    }

    #[test]
    fn test_copy_requires_files_and_dest() {
        assert!(Cli::try_parse_from(["datafinder", "copy", "--dest", "out"]).is_err());
        assert!(Cli::try_parse_from(["datafinder", "copy", "a.csv"]).is_err());
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["datafinder", "-q", "-v", "mkdir", "x"]).is_err());
    }
}
