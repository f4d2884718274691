//! kisexp Parser - pest front end of the codec.
//!
//! Converts KiCad s-expression text into a nested [`Value`]. The parser is
//! purely syntactic: it knows atoms and lists, nothing about tags or paths.

use pest::{error::Error, iterators::Pair, Parser};
use pest_derive::Parser;
use tracing::debug;

use crate::diagnostics::{SourceArc, SourceContext, Span};
use crate::err_ctx;
use crate::value::{Atom, Value};
use crate::SexpError;

#[derive(Parser)]
#[grammar = "syntax/grammar.pest"]
struct SexpParser;

// ============================================================================
// PUBLIC API
// ============================================================================

/// Parse one s-expression document.
///
/// # Examples
///
/// ```rust
/// use kisexp::syntax::parse;
/// use kisexp::value::{Atom, Value};
/// use kisexp::SourceContext;
/// let text = "(at 1.5 -2 0)";
/// let value = parse(text, &SourceContext::anonymous(text)).unwrap();
/// assert_eq!(value.head(), Some(&Atom::symbol("at")));
/// assert_eq!(value.as_list().unwrap()[2], Value::from(-2i64));
/// ```
pub fn parse(source_text: &str, source: &SourceContext) -> Result<Value, SexpError> {
    let named = source.to_named_source();
    let mut pairs = SexpParser::parse(Rule::document, source_text)
        .map_err(|e| convert_parse_error(e, &named, source_text))?;

    let document = pairs.next().ok_or_else(|| {
        err_ctx!(Parse, "Empty document", &named, Span::default())
    })?;

    let expr = document
        .into_inner()
        .find(|p| p.as_rule() != Rule::EOI)
        .ok_or_else(|| err_ctx!(Parse, "Empty document", &named, Span::default()))?;

    let value = build_value(expr, &named)?;
    debug!(source = %source.name, bytes = source_text.len(), "parsed document");
    Ok(value)
}

/// Parse text that has no file behind it.
pub fn parse_str(source_text: &str) -> Result<Value, SexpError> {
    parse(source_text, &SourceContext::anonymous(source_text))
}

// ============================================================================
// VALUE BUILDERS
// ============================================================================

fn build_value(pair: Pair<Rule>, source: &SourceArc) -> Result<Value, SexpError> {
    let span = get_span(&pair);

    match pair.as_rule() {
        Rule::list => {
            let items: Result<Vec<_>, _> = pair
                .into_inner()
                .map(|p| build_value(p, source))
                .collect();
            Ok(Value::List(items?))
        }

        Rule::string => {
            let inner = pair.into_inner().next().map(|p| p.as_str()).unwrap_or("");
            Ok(Value::Atom(Atom::String(unescape_string(inner))))
        }

        Rule::integer => {
            let text = pair.as_str();
            // Out of range for i64: keep the digits as a symbol rather than lose them.
            let atom = match text.parse::<i64>() {
                Ok(n) => Atom::Integer(n),
                Err(_) => Atom::Symbol(text.to_string()),
            };
            Ok(Value::Atom(atom))
        }

        Rule::float => {
            let text = pair.as_str();
            let value = text.parse::<f64>().map_err(|e| {
                err_ctx!(Parse, format!("Invalid float literal '{}'", text), source, span)
                    .caused_by(e)
            })?;
            Ok(Value::Atom(Atom::Float(value)))
        }

        Rule::symbol => Ok(Value::Atom(Atom::Symbol(pair.as_str().to_string()))),

        rule => Err(err_ctx!(
            Parse,
            format!("unsupported rule: {:?}", rule),
            source,
            span
        )),
    }
}

// ============================================================================
// UTILITIES
// ============================================================================

fn get_span(pair: &Pair<Rule>) -> Span {
    Span {
        start: pair.as_span().start(),
        end: pair.as_span().end(),
    }
}

/// Decode the body of a quoted string (quotes already removed).
pub(crate) fn unescape_string(inner: &str) -> String {
    let mut result = String::with_capacity(inner.len());
    let mut chars = inner.chars();

    while let Some(ch) = chars.next() {
        if ch == '\\' {
            match chars.next() {
                Some('n') => result.push('\n'),
                Some('t') => result.push('\t'),
                Some('r') => result.push('\r'),
                Some('\\') => result.push('\\'),
                Some('"') => result.push('"'),
                Some(other) => {
                    result.push('\\');
                    result.push(other);
                }
                None => result.push('\\'),
            }
        } else {
            result.push(ch);
        }
    }

    result
}

// ============================================================================
// ERROR HANDLING
// ============================================================================

fn convert_parse_error(error: Error<Rule>, source: &SourceArc, text: &str) -> SexpError {
    let span = match error.location {
        pest::error::InputLocation::Pos(pos) => Span {
            start: pos,
            end: pos,
        },
        pest::error::InputLocation::Span((start, end)) => Span { start, end },
    };

    let rendered = error.to_string();
    let message = if rendered.contains("expected EOI") {
        "Unexpected content after the document"
    } else if text.matches('(').count() > text.matches(')').count() {
        "Missing closing parenthesis"
    } else if rendered.contains("string_inner") {
        "Missing closing quote"
    } else {
        "Syntax error"
    };

    err_ctx!(
        Parse,
        message,
        source,
        span,
        "a KiCad document is a single parenthesised form"
    )
    .caused_by(error)
}
