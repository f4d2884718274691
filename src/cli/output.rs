//! Handles all user-facing output for the CLI.
//!
//! Colored headings, diffs and error reports live here so every command
//! prints the same way.

use difference::{Changeset, Difference};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::SexpError;

// ============================================================================
// CORE OUTPUT FUNCTIONS
// ============================================================================

/// Renders an error through miette, with source snippet and help when known.
pub fn print_error(error: SexpError) {
    let report = miette::Report::new(error);
    eprintln!("{report:?}");
}

/// Prints a query match: its path in bold yellow, then its text.
pub fn print_match(path: &str, text: &str) {
    let mut stdout = StandardStream::stdout(ColorChoice::Auto);
    let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Yellow)).set_bold(true));
    print!("{}", path);
    let _ = stdout.reset();
    println!();
    println!("{}", text);
}

/// Reports a successful round trip.
pub fn print_check_ok(name: &str) {
    let mut stdout = StandardStream::stdout(ColorChoice::Auto);
    let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Green)).set_bold(true));
    println!("{}: round trip ok", name);
    let _ = stdout.reset();
}

/// Shows a line diff between the original text and the reprinted text.
pub fn print_check_failed(name: &str, original: &str, printed: &str) {
    let mut stdout = StandardStream::stdout(ColorChoice::Auto);
    let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true));
    println!("{}: round trip differs", name);
    let _ = stdout.reset();

    let changeset = Changeset::new(original, printed, "\n");
    print_diff(&mut stdout, &changeset.diffs);
    let _ = stdout.reset();
}

// ============================================================================
// PRIVATE HELPERS
// ============================================================================

fn print_diff(stdout: &mut StandardStream, diffs: &[Difference]) {
    for diff in diffs {
        match diff {
            Difference::Same(ref x) => {
                let _ = stdout.reset();
                for line in x.split('\n') {
                    println!(" {}", line);
                }
            }
            Difference::Add(ref x) => {
                let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Green)));
                for line in x.split('\n') {
                    println!("+{}", line);
                }
            }
            Difference::Rem(ref x) => {
                let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Red)));
                for line in x.split('\n') {
                    println!("-{}", line);
                }
            }
        }
    }
}
