//! Layout profiles for the printer.
//!
//! A [`LayoutConfig`] names the tags that break lines, the tags whose floats
//! are written with two decimals, and the inline exceptions. The default
//! profile reproduces KiCad symbol library files; other profiles can be
//! loaded from YAML or JSON.
//!
//! ```yaml
//! indent: "  "
//! openers: [effects, fill, name, number, pin, property, rectangle, stroke, symbol]
//! closers: [kicad_symbol_lib, pin, property, rectangle, symbol]
//! prefix: [kicad_symbol_lib]
//! round2: [at]
//! inline:
//!   - { tag: effects, parent: name }
//!   - { tag: effects, parent: number }
//! ```

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{err_msg, SexpError};

/// `tag` directly inside `parent` never gets an opener break.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InlineRule {
    pub tag: String,
    pub parent: String,
}

impl InlineRule {
    pub fn new(tag: impl Into<String>, parent: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            parent: parent.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Indentation added per opener level.
    pub indent: String,
    /// Tags that start on a new line and indent their contents.
    pub openers: BTreeSet<String>,
    /// Tags whose closing parenthesis goes on its own line.
    pub closers: BTreeSet<String>,
    /// Tags followed by a newline after their closing parenthesis.
    pub prefix: BTreeSet<String>,
    /// Tags whose float arguments are written with two decimals.
    pub round2: BTreeSet<String>,
    pub inline: Vec<InlineRule>,
}

fn tags(names: &[&str]) -> BTreeSet<String> {
    names.iter().map(|s| s.to_string()).collect()
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self::symbol_library()
    }
}

impl LayoutConfig {
    /// KiCad symbol library layout (`.kicad_sym`).
    pub fn symbol_library() -> Self {
        Self {
            indent: "  ".to_string(),
            openers: tags(&[
                "effects",
                "fill",
                "name",
                "number",
                "pin",
                "property",
                "rectangle",
                "stroke",
                "symbol",
            ]),
            closers: tags(&["kicad_symbol_lib", "pin", "property", "rectangle", "symbol"]),
            prefix: tags(&["kicad_symbol_lib"]),
            round2: tags(&["at"]),
            inline: vec![
                InlineRule::new("effects", "name"),
                InlineRule::new("effects", "number"),
            ],
        }
    }

    /// No breaks, no rounding: single-line output.
    pub fn flat() -> Self {
        Self {
            indent: String::new(),
            openers: BTreeSet::new(),
            closers: BTreeSet::new(),
            prefix: BTreeSet::new(),
            round2: BTreeSet::new(),
            inline: Vec::new(),
        }
    }

    pub fn is_opener(&self, tag: &str) -> bool {
        self.openers.contains(tag)
    }

    pub fn is_closer(&self, tag: &str) -> bool {
        self.closers.contains(tag)
    }

    pub fn is_prefix(&self, tag: &str) -> bool {
        self.prefix.contains(tag)
    }

    pub fn rounds_to_2(&self, tag: &str) -> bool {
        self.round2.contains(tag)
    }

    /// Whether `tag` stays inline when nested directly under `parent`.
    pub fn keeps_inline(&self, parent: Option<&str>, tag: &str) -> bool {
        match parent {
            Some(parent) => self
                .inline
                .iter()
                .any(|rule| rule.tag == tag && rule.parent == parent),
            None => false,
        }
    }

    /// Loads a profile, YAML unless the extension is `.json`.
    pub fn load(path: &Path) -> Result<Self, SexpError> {
        let text = fs::read_to_string(path)?;
        let name = path.display().to_string();
        let config = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json(&text).map_err(|e| e.with_help(format!("in {}", name)))?,
            _ => Self::from_yaml(&text).map_err(|e| e.with_help(format!("in {}", name)))?,
        };
        info!(path = %name, "loaded layout profile");
        Ok(config)
    }

    pub fn from_yaml(text: &str) -> Result<Self, SexpError> {
        serde_yaml::from_str(text)
            .map_err(|e| err_msg!(Config, "invalid YAML layout: {}", e).caused_by(e))
    }

    pub fn from_json(text: &str) -> Result<Self, SexpError> {
        serde_json::from_str(text)
            .map_err(|e| err_msg!(Config, "invalid JSON layout: {}", e).caused_by(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_symbol_library() {
        let config = LayoutConfig::default();
        assert!(config.is_opener("symbol"));
        assert!(config.is_closer("kicad_symbol_lib"));
        assert!(!config.is_opener("kicad_symbol_lib"));
        assert!(config.is_prefix("kicad_symbol_lib"));
        assert!(config.rounds_to_2("at"));
        assert!(config.keeps_inline(Some("name"), "effects"));
        assert!(config.keeps_inline(Some("number"), "effects"));
        assert!(!config.keeps_inline(Some("property"), "effects"));
        assert!(!config.keeps_inline(None, "effects"));
    }

    #[test]
    fn yaml_profile_fills_missing_fields_from_default() {
        let config = LayoutConfig::from_yaml("round2: [at, xy]\nprefix: [kicad_sch]\n").unwrap();
        assert!(config.rounds_to_2("xy"));
        assert!(config.is_prefix("kicad_sch"));
        assert!(!config.is_prefix("kicad_symbol_lib"));
        assert!(config.is_opener("property"));
        assert_eq!(config.indent, "  ");
    }

    #[test]
    fn json_profile() {
        let config = LayoutConfig::from_json(
            r#"{"openers": ["wire"], "inline": [{"tag": "pts", "parent": "wire"}]}"#,
        )
        .unwrap();
        assert!(config.is_opener("wire"));
        assert!(!config.is_opener("symbol"));
        assert!(config.keeps_inline(Some("wire"), "pts"));
    }

    #[test]
    fn malformed_profile_is_a_config_error() {
        let err = LayoutConfig::from_yaml("openers: 12").unwrap_err();
        assert_eq!(err.error_type(), crate::ErrorType::Config);
    }

    #[test]
    fn load_picks_format_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("layout.json");
        fs::write(&path, r#"{"round2": ["xy"]}"#).unwrap();
        let config = LayoutConfig::load(&path).unwrap();
        assert!(config.rounds_to_2("xy"));
        assert!(!config.rounds_to_2("at"));
    }
}
