//! The kisexp command-line interface.
//!
//! This module is the entry point for all CLI commands. Each handler reads
//! its input, calls into the library and hands results to [`output`].

use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::prelude::*;
use walkdir::WalkDir;

use crate::cli::args::{Command, KisexpArgs, LayoutArgs};
use crate::cli::output::{print_check_failed, print_check_ok, print_error, print_match};
use crate::config::LayoutConfig;
use crate::printer::pretty;
use crate::schema::SchemaRegistry;
use crate::syntax::parse;
use crate::tree::Document;
use crate::{err_msg, SexpError, SourceContext};

pub mod args;
pub mod output;

// ============================================================================
// MAIN ENTRY POINT
// ============================================================================

/// The main entry point for the CLI.
pub fn run() {
    let args = KisexpArgs::parse();
    init_logging(args.verbose);

    let result = match args.command {
        Command::Dump { file } => handle_dump(&file),
        Command::Paths { file } => handle_paths(&file),
        Command::Schema {
            paths,
            extensions,
            json,
        } => handle_schema(&paths, &extensions, json),
        Command::Find {
            file,
            pattern,
            layout,
        } => handle_find(&file, &pattern, &layout),
        Command::Format {
            file,
            output,
            layout,
        } => handle_format(&file, output.as_deref(), &layout),
        Command::Check { file, layout } => handle_check(&file, &layout),
    };

    match result {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            print_error(e);
            process::exit(1);
        }
    }
}

/// Logs go to stderr so stdout stays machine-readable. `RUST_LOG` wins over `-v`.
fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "kisexp=warn",
        1 => "kisexp=debug",
        _ => "kisexp=trace",
    };
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

// ============================================================================
// COMMAND HANDLERS
// ============================================================================
//
// Handlers return Ok(false) when the command ran but the outcome is a failure
// the user should see in the exit status.

fn handle_dump(file: &Path) -> Result<bool, SexpError> {
    let (_, document) = load_document(file)?;
    print!("{}", document.dump());
    Ok(true)
}

fn handle_paths(file: &Path) -> Result<bool, SexpError> {
    let (_, document) = load_document(file)?;
    for path in document.paths() {
        println!("{}", path);
    }
    Ok(true)
}

fn handle_schema(paths: &[PathBuf], extensions: &[String], json: bool) -> Result<bool, SexpError> {
    let files = collect_files(paths, extensions)?;
    let mut registry = SchemaRegistry::new();
    for file in &files {
        let (_, document) = load_document(file)?;
        registry.aggregate_tree(document.root());
    }
    info!(files = files.len(), entries = registry.len(), "aggregated schema");

    if json {
        let text = serde_json::to_string_pretty(&registry).map_err(|e| {
            err_msg!(UnsupportedValue, "could not encode schema as JSON: {}", e).caused_by(e)
        })?;
        println!("{}", text);
    } else {
        print!("{}", registry.render());
    }
    Ok(true)
}

fn handle_find(file: &Path, pattern: &str, layout: &LayoutArgs) -> Result<bool, SexpError> {
    let config = resolve_layout(layout)?;
    let (_, document) = load_document(file)?;
    let matches = document.find(pattern);
    debug!(pattern, count = matches.len(), "query finished");
    for node in matches {
        print_match(&node.path_str(), pretty(node, &config)?.trim());
    }
    Ok(true)
}

fn handle_format(file: &Path, output: Option<&Path>, layout: &LayoutArgs) -> Result<bool, SexpError> {
    let config = resolve_layout(layout)?;
    let (_, document) = load_document(file)?;
    let text = pretty(&document, &config)?;
    match output {
        Some(path) => {
            fs::write(path, text)
                .map_err(|e| err_msg!(Io, "cannot write {}: {}", path.display(), e).caused_by(e))?;
            info!(path = %path.display(), "wrote formatted output");
        }
        None => print!("{}", text),
    }
    Ok(true)
}

fn handle_check(file: &Path, layout: &LayoutArgs) -> Result<bool, SexpError> {
    let config = resolve_layout(layout)?;
    let (original, document) = load_document(file)?;
    let printed = pretty(&document, &config)?;
    let name = file.display().to_string();
    if printed == original {
        print_check_ok(&name);
        Ok(true)
    } else {
        print_check_failed(&name, &original, &printed);
        Ok(false)
    }
}

// ============================================================================
// PRIVATE HELPERS
// ============================================================================

/// Reads, parses and builds a file, keeping the source text for diffs.
fn load_document(path: &Path) -> Result<(String, Document), SexpError> {
    let text = fs::read_to_string(path)
        .map_err(|e| err_msg!(Io, "cannot read {}: {}", path.display(), e).caused_by(e))?;
    let source = SourceContext::from_file(path.display().to_string(), text.as_str());
    let value = parse(&text, &source)?;
    let document = Document::from_value(&value)?;
    debug!(path = %path.display(), "loaded document");
    Ok((text, document))
}

fn resolve_layout(layout: &LayoutArgs) -> Result<LayoutConfig, SexpError> {
    if layout.flat {
        return Ok(LayoutConfig::flat());
    }
    match &layout.layout {
        Some(path) => LayoutConfig::load(path),
        None => Ok(LayoutConfig::default()),
    }
}

/// Expands directories into the matching files beneath them, sorted by name.
fn collect_files(paths: &[PathBuf], extensions: &[String]) -> Result<Vec<PathBuf>, SexpError> {
    let mut files = Vec::new();
    for path in paths {
        if !path.is_dir() {
            files.push(path.clone());
            continue;
        }
        for entry in WalkDir::new(path).sort_by_file_name() {
            let entry = entry.map_err(|e| {
                err_msg!(Io, "cannot walk {}: {}", path.display(), e).caused_by(e)
            })?;
            let matches = entry.file_type().is_file()
                && entry
                    .path()
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| extensions.iter().any(|want| want == ext));
            if matches {
                files.push(entry.into_path());
            }
        }
    }
    Ok(files)
}
