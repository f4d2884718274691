//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::path::PathBuf;

use kisexp::syntax::parse_str;
use kisexp::tree::Document;

/// A small symbol library written with the default layout profile.
pub const RESISTOR: &str = include_str!("../fixtures/resistor.kicad_sym");

pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

pub fn document(text: &str) -> Document {
    Document::from_value(&parse_str(text).expect("fixture parses")).expect("fixture builds")
}
