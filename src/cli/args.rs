//! Defines the command-line arguments and subcommands for the kisexp CLI.
//!
//! This module uses the `clap` crate with its "derive" feature to create a
//! declarative and type-safe argument parsing structure.

use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;

/// The main CLI argument structure.
#[derive(Debug, Parser)]
#[command(
    name = "kisexp",
    version,
    about = "Read, query, introspect and rewrite KiCad s-expression files."
)]
pub struct KisexpArgs {
    /// Raise log verbosity (-v debug, -vv trace). `RUST_LOG` overrides.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Layout profile selection shared by the printing commands.
#[derive(Debug, Args)]
pub struct LayoutArgs {
    /// YAML or JSON layout profile; defaults to the symbol library layout.
    #[arg(long, value_name = "FILE")]
    pub layout: Option<PathBuf>,

    /// Print on a single line with natural floats.
    #[arg(long, conflicts_with = "layout")]
    pub flat: bool,
}

/// An enumeration of all available CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print every node path, with its atoms indented below it.
    Dump {
        #[arg(required = true)]
        file: PathBuf,
    },
    /// Print the sorted set of distinct node paths.
    Paths {
        #[arg(required = true)]
        file: PathBuf,
    },
    /// Aggregate files or directories into a schema and print it.
    Schema {
        /// Files, or directories searched recursively.
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// File extensions picked up inside directories.
        #[arg(long = "ext", default_values = ["kicad_sch", "kicad_sym"])]
        extensions: Vec<String>,

        /// Emit the registry as JSON instead of the indented summary.
        #[arg(long)]
        json: bool,
    },
    /// Print the nodes matching a path pattern (`/abs/path` or `rel/path`).
    Find {
        #[arg(required = true)]
        file: PathBuf,

        #[arg(required = true)]
        pattern: String,

        #[command(flatten)]
        layout: LayoutArgs,
    },
    /// Re-serialize a file with a layout profile.
    Format {
        #[arg(required = true)]
        file: PathBuf,

        /// Output file; stdout when absent.
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        layout: LayoutArgs,
    },
    /// Check that parsing then printing reproduces the file, showing a diff.
    Check {
        #[arg(required = true)]
        file: PathBuf,

        #[command(flatten)]
        layout: LayoutArgs,
    },
}
