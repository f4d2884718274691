//! The s-expression codec.
//!
//! `parse` turns text into a [`Value`](crate::value::Value); the `emit_*`
//! helpers are the codec's default atom writers. The printer layers its
//! context-sensitive overrides on top of these.

pub mod parser;

pub use parser::{parse, parse_str};

use crate::err_msg;
use crate::value::Atom;
use crate::SexpError;

/// Default text for an atom, floats in their natural form.
pub fn emit_atom(atom: &Atom) -> Result<String, SexpError> {
    match atom {
        Atom::String(s) => Ok(emit_string(s)),
        Atom::Integer(n) => Ok(n.to_string()),
        Atom::Float(x) => format_float(*x),
        Atom::Symbol(s) => emit_symbol(s),
    }
}

/// Quote a string, escaping what the parser unescapes.
pub fn emit_string(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for ch in text.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            other => out.push(other),
        }
    }
    out.push('"');
    out
}

/// Bare symbols are written verbatim; text the parser would not read back
/// as the same symbol is rejected.
pub fn emit_symbol(text: &str) -> Result<String, SexpError> {
    if text.is_empty() {
        return Err(err_msg!(UnsupportedValue, "empty symbol cannot be written"));
    }
    if let Some(bad) = text
        .chars()
        .find(|c| c.is_whitespace() || matches!(c, '(' | ')' | '"'))
    {
        return Err(err_msg!(
            UnsupportedValue,
            "symbol {:?} contains {:?} and cannot be written bare",
            text,
            bad
        ));
    }
    Ok(text.to_string())
}

/// Shortest decimal that reads back to the same value, always with a
/// fractional part: `1.0`, `0.254`, `-2.54`.
///
/// # Examples
///
/// ```rust
/// use kisexp::syntax::format_float;
/// assert_eq!(format_float(1.0).unwrap(), "1.0");
/// assert_eq!(format_float(0.254).unwrap(), "0.254");
/// assert!(format_float(f64::NAN).is_err());
/// ```
pub fn format_float(value: f64) -> Result<String, SexpError> {
    ensure_finite(value)?;
    let mut text = value.to_string();
    if !text.contains('.') {
        text.push_str(".0");
    }
    Ok(text)
}

/// Fixed two-decimal form used for coordinates: `1.00`, `-2.54`.
pub fn format_float_2(value: f64) -> Result<String, SexpError> {
    ensure_finite(value)?;
    Ok(format!("{:.2}", value))
}

fn ensure_finite(value: f64) -> Result<(), SexpError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(err_msg!(
            UnsupportedValue,
            "float {} has no s-expression representation",
            value
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strings_round_trip_through_the_parser() {
        let original = "tab\there \"quoted\" back\\slash\nnext";
        let emitted = emit_string(original);
        let reparsed = parse_str(&format!("(s {})", emitted)).unwrap();
        assert_eq!(reparsed.as_list().unwrap()[1], crate::value::Value::string(original));
    }

    #[test]
    fn natural_floats() {
        assert_eq!(format_float(-2.54).unwrap(), "-2.54");
        assert_eq!(format_float(1e-5).unwrap(), "0.00001");
        assert_eq!(format_float(100.0).unwrap(), "100.0");
    }

    #[test]
    fn two_decimal_floats() {
        assert_eq!(format_float_2(1.0).unwrap(), "1.00");
        assert_eq!(format_float_2(2.03).unwrap(), "2.03");
        assert_eq!(format_float_2(-0.5).unwrap(), "-0.50");
        assert!(format_float_2(f64::INFINITY).is_err());
    }

    #[test]
    fn symbols_must_stay_bare() {
        assert_eq!(emit_symbol("hide").unwrap(), "hide");
        assert!(emit_symbol("two words").is_err());
        assert!(emit_symbol("").is_err());
    }
}
