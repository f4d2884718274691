//! Nested values exchanged with the codec.
//!
//! A [`Value`] is either an [`Atom`] or an ordered list of values. This is the
//! shape `syntax::parse` produces and the shape higher-level builders hand to
//! the printer; the document tree converts to and from it losslessly.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An indivisible leaf value.
///
/// # Examples
///
/// ```rust
/// use kisexp::value::Atom;
/// let a = Atom::symbol("at");
/// assert_eq!(a.type_name(), "Symbol");
/// assert_eq!(a.text(), Some("at"));
/// assert_eq!(Atom::Integer(3).text(), None);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Atom {
    String(String),
    Integer(i64),
    Float(f64),
    /// An unquoted identifier such as `yes`, `hide` or a tag name.
    Symbol(String),
}

impl Atom {
    pub fn symbol(text: impl Into<String>) -> Self {
        Atom::Symbol(text.into())
    }

    pub fn string(text: impl Into<String>) -> Self {
        Atom::String(text.into())
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Atom::String(_) => "String",
            Atom::Integer(_) => "Integer",
            Atom::Float(_) => "Float",
            Atom::Symbol(_) => "Symbol",
        }
    }

    /// The textual payload of a string or symbol atom.
    pub fn text(&self) -> Option<&str> {
        match self {
            Atom::String(s) | Atom::Symbol(s) => Some(s),
            Atom::Integer(_) | Atom::Float(_) => None,
        }
    }

    pub fn is_symbol(&self) -> bool {
        matches!(self, Atom::Symbol(_))
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Atom::String(s) => write!(f, "{:?}", s),
            Atom::Integer(n) => write!(f, "{}", n),
            Atom::Float(x) => write!(f, "{}", x),
            Atom::Symbol(s) => write!(f, "{}", s),
        }
    }
}

/// A codec value: an atom or an ordered list of values.
///
/// # Examples
///
/// ```rust
/// use kisexp::value::{Atom, Value};
/// let v = Value::list(vec![Value::symbol("at"), Value::from(1.5), Value::from(2i64)]);
/// assert_eq!(v.head().and_then(|a| a.text()), Some("at"));
/// assert_eq!(v.as_list().map(|items| items.len()), Some(3));
/// assert!(Value::Atom(Atom::Integer(1)).as_list().is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Atom(Atom),
    List(Vec<Value>),
}

impl Value {
    pub fn list(items: Vec<Value>) -> Self {
        Value::List(items)
    }

    pub fn symbol(text: impl Into<String>) -> Self {
        Value::Atom(Atom::symbol(text))
    }

    pub fn string(text: impl Into<String>) -> Self {
        Value::Atom(Atom::string(text))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Atom(atom) => atom.type_name(),
            Value::List(_) => "List",
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            Value::Atom(_) => None,
        }
    }

    pub fn as_atom(&self) -> Option<&Atom> {
        match self {
            Value::Atom(atom) => Some(atom),
            Value::List(_) => None,
        }
    }

    /// First element of a list, when that element is an atom.
    pub fn head(&self) -> Option<&Atom> {
        self.as_list()?.first()?.as_atom()
    }
}

impl From<Atom> for Value {
    fn from(atom: Atom) -> Self {
        Value::Atom(atom)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Atom(Atom::Integer(n))
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Atom(Atom::Float(x))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::string(s)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Atom(atom) => write!(f, "{}", atom),
            Value::List(items) => {
                write!(f, "(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, ")")
            }
        }
    }
}
