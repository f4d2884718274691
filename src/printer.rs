//! Context-sensitive serializer.
//!
//! The printer walks a value the way the codec's default writer does
//! (`(` + children joined by a space + `)`), but hands two decisions to an
//! [`Emitter`]:
//!
//! - how a float is written, given the enclosing tags;
//! - how a list's already-written children are framed, given its tag and the
//!   tags enclosing it.
//!
//! The enclosing tags live in a [`TagStack`] threaded through the recursion:
//! a list headed by a symbol pushes its tag before its children are written
//! and pops it afterwards.
//!
//! [`LayoutEmitter`] implements the KiCad layout rules from a
//! [`LayoutConfig`]. Given the profile a file was written with, printing the
//! parsed file reproduces it byte for byte, modulo float normalisation.
//!
//! Anything that can be viewed as an atom or a headed list implements
//! [`Sexp`], so codec values and document trees print identically.

use crate::config::LayoutConfig;
use crate::syntax::{emit_atom, format_float, format_float_2};
use crate::tree::{Document, Element, Node};
use crate::value::{Atom, Value};
use crate::SexpError;

// ============================================================================
// PRINTABLE SHAPES
// ============================================================================

/// A value seen as either an atom or a list.
pub enum Form<'a, C> {
    Atom(&'a Atom),
    /// `head` is the first element when it is an atom; `rest` is everything
    /// after it (or every element when there is no atom head).
    List { head: Option<&'a Atom>, rest: &'a [C] },
}

/// Something the printer can walk.
pub trait Sexp {
    type Child: Sexp;

    fn form(&self) -> Form<'_, Self::Child>;
}

impl Sexp for Value {
    type Child = Value;

    fn form(&self) -> Form<'_, Value> {
        match self {
            Value::Atom(atom) => Form::Atom(atom),
            Value::List(items) => match items.split_first() {
                Some((Value::Atom(head), rest)) => Form::List {
                    head: Some(head),
                    rest,
                },
                _ => Form::List {
                    head: None,
                    rest: items,
                },
            },
        }
    }
}

impl Sexp for Node {
    type Child = Element;

    fn form(&self) -> Form<'_, Element> {
        Form::List {
            head: Some(self.head()),
            rest: self.children(),
        }
    }
}

impl Sexp for Element {
    type Child = Element;

    fn form(&self) -> Form<'_, Element> {
        match self {
            Element::Atom(atom) => Form::Atom(atom),
            Element::Node(node) => node.form(),
        }
    }
}

impl Sexp for Document {
    type Child = Element;

    fn form(&self) -> Form<'_, Element> {
        self.root().form()
    }
}

// ============================================================================
// TAG STACK
// ============================================================================

/// Tags of the symbol-headed lists enclosing the current position.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TagStack<'a> {
    tags: Vec<&'a str>,
}

impl<'a> TagStack<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, tag: &'a str) {
        self.tags.push(tag);
    }

    pub fn pop(&mut self) -> Option<&'a str> {
        self.tags.pop()
    }

    /// Innermost enclosing tag.
    pub fn top(&self) -> Option<&'a str> {
        self.tags.last().copied()
    }

    pub fn depth(&self) -> usize {
        self.tags.len()
    }

    pub fn as_slice(&self) -> &[&'a str] {
        &self.tags
    }
}

impl<'a> FromIterator<&'a str> for TagStack<'a> {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        Self {
            tags: iter.into_iter().collect(),
        }
    }
}

// ============================================================================
// EMITTERS
// ============================================================================

/// Override hooks for the printer. The provided methods are the codec's
/// default behaviour.
pub trait Emitter {
    /// Writes a float; `stack.top()` is the tag of the innermost list.
    fn emit_float(&self, value: f64, _stack: &TagStack<'_>) -> Result<String, SexpError> {
        format_float(value)
    }

    /// Frames the written children of a list. `tag` is the list's symbol
    /// head, if any; `parents` are the tags enclosing the list itself.
    fn emit_list(&self, _tag: Option<&str>, children: &[String], _parents: &TagStack<'_>) -> String {
        format!("({})", children.join(" "))
    }

    fn emit_atom(&self, atom: &Atom, stack: &TagStack<'_>) -> Result<String, SexpError> {
        match atom {
            Atom::Float(x) => self.emit_float(*x, stack),
            other => emit_atom(other),
        }
    }
}

/// Single-line output, natural floats.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultEmitter;

impl Emitter for DefaultEmitter {}

/// Tag-driven line breaks and coordinate rounding.
#[derive(Debug, Default, Clone)]
pub struct LayoutEmitter {
    config: LayoutConfig,
}

impl LayoutEmitter {
    pub fn new(config: LayoutConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }
}

impl Emitter for LayoutEmitter {
    fn emit_float(&self, value: f64, stack: &TagStack<'_>) -> Result<String, SexpError> {
        match stack.top() {
            Some(tag) if self.config.rounds_to_2(tag) => format_float_2(value),
            _ => format_float(value),
        }
    }

    fn emit_list(&self, tag: Option<&str>, children: &[String], parents: &TagStack<'_>) -> String {
        let mut indent = "";
        let mut opener = String::new();
        let mut closer = String::new();
        let mut suffix = "";

        if let Some(tag) = tag {
            if self.config.is_opener(tag) && !self.config.keeps_inline(parents.top(), tag) {
                indent = self.config.indent.as_str();
                opener = format!("\n{}", indent);
            }
            if self.config.is_closer(tag) {
                closer = format!("\n{}", indent);
            }
            if self.config.is_prefix(tag) {
                suffix = "\n";
            }
        }

        let body = reindent(&children.join(" "), indent);
        format!("{}({}{}){}", opener, body, closer, suffix)
    }
}

/// Prefixes every line after the first with `indent` and right-trims every
/// line. Relative indentation produced by nested lists is preserved.
pub fn reindent(text: &str, indent: &str) -> String {
    let joined = text
        .lines()
        .map(|line| format!("{}{}", indent, line.trim_end()))
        .collect::<Vec<_>>()
        .join("\n");
    match joined.strip_prefix(indent) {
        Some(rest) => rest.to_string(),
        None => joined,
    }
}

// ============================================================================
// PUBLIC API
// ============================================================================

/// Serializes `value` through `emitter`.
///
/// # Examples
///
/// ```rust
/// use kisexp::printer::{serialize, DefaultEmitter};
/// use kisexp::syntax::parse_str;
/// let value = parse_str("(at 1.0 2 \"x\")").unwrap();
/// assert_eq!(serialize(&value, &DefaultEmitter).unwrap(), "(at 1.0 2 \"x\")");
/// ```
pub fn serialize<S: Sexp, E: Emitter + ?Sized>(value: &S, emitter: &E) -> Result<String, SexpError> {
    let mut stack = TagStack::new();
    emit(value, emitter, &mut stack)
}

/// Serializes `value` with the layout rules of `config`.
pub fn pretty<S: Sexp>(value: &S, config: &LayoutConfig) -> Result<String, SexpError> {
    serialize(value, &LayoutEmitter::new(config.clone()))
}

fn emit<'a, S: Sexp, E: Emitter + ?Sized>(
    value: &'a S,
    emitter: &E,
    stack: &mut TagStack<'a>,
) -> Result<String, SexpError> {
    match value.form() {
        Form::Atom(atom) => emitter.emit_atom(atom, stack),
        Form::List { head, rest } => {
            let tag = match head {
                Some(Atom::Symbol(tag)) => Some(tag.as_str()),
                _ => None,
            };
            if let Some(tag) = tag {
                stack.push(tag);
            }
            let children = emit_children(head, rest, emitter, stack);
            if tag.is_some() {
                stack.pop();
            }
            Ok(emitter.emit_list(tag, &children?, stack))
        }
    }
}

fn emit_children<'a, C: Sexp, E: Emitter + ?Sized>(
    head: Option<&'a Atom>,
    rest: &'a [C],
    emitter: &E,
    stack: &mut TagStack<'a>,
) -> Result<Vec<String>, SexpError> {
    let mut children = Vec::with_capacity(rest.len() + 1);
    if let Some(head) = head {
        children.push(emitter.emit_atom(head, stack)?);
    }
    for child in rest {
        children.push(emit(child, emitter, stack)?);
    }
    Ok(children)
}
