//! Document tree: path-addressed nodes built from a codec [`Value`].
//!
//! Each list `(tag child...)` becomes a [`Node`] whose `path` is the sequence
//! of tags from the document root down to, and including, itself. Children
//! keep source order and are either atoms or nested nodes ([`Element`]).
//!
//! # Invariants
//! - `node.path == parent.path + [node.tag]`, a top-level node has a
//!   single-element path.
//! - Paths are not unique among siblings; traversal order disambiguates.
//! - Every node carries a process-unique [`NodeId`], so other structures
//!   (the schema registry) can refer to nodes without owning them.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::err_msg;
use crate::value::{Atom, Value};
use crate::SexpError;

// ============================================================================
// CORE DATA STRUCTURES
// ============================================================================

/// Handle to a node, unique within the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u64);

static NEXT_NODE_ID: AtomicU64 = AtomicU64::new(1);

impl NodeId {
    fn fresh() -> Self {
        NodeId(NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One child of a node.
#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    Atom(Atom),
    Node(Node),
}

impl Element {
    pub fn as_node(&self) -> Option<&Node> {
        match self {
            Element::Node(node) => Some(node),
            Element::Atom(_) => None,
        }
    }

    pub fn as_atom(&self) -> Option<&Atom> {
        match self {
            Element::Atom(atom) => Some(atom),
            Element::Node(_) => None,
        }
    }

    /// Type name used in schema shape signatures.
    pub fn type_name(&self) -> &'static str {
        match self {
            Element::Atom(atom) => atom.type_name(),
            Element::Node(_) => "Node",
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            Element::Atom(atom) => Value::Atom(atom.clone()),
            Element::Node(node) => node.to_value(),
        }
    }
}

/// A list form `(tag child...)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    id: NodeId,
    head: Atom,
    path: Vec<String>,
    children: Vec<Element>,
}

impl Node {
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// The list head as written: a symbol, or a string for quoted heads.
    pub fn head(&self) -> &Atom {
        &self.head
    }

    /// Last path segment.
    pub fn name(&self) -> &str {
        self.path.last().map(String::as_str).unwrap_or("")
    }

    pub fn path(&self) -> &[String] {
        &self.path
    }

    pub fn path_str(&self) -> String {
        self.path.join("/")
    }

    /// Path string of the parent, `/` for a top-level node.
    pub fn parent_str(&self) -> String {
        match self.path.split_last() {
            Some((_, parent)) if !parent.is_empty() => parent.join("/"),
            _ => "/".to_string(),
        }
    }

    pub fn children(&self) -> &[Element] {
        &self.children
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn first_child(&self) -> Option<&Element> {
        self.children.first()
    }

    /// Nested nodes only, in order.
    pub fn child_nodes(&self) -> impl Iterator<Item = &Node> {
        self.children.iter().filter_map(Element::as_node)
    }

    /// Child type names joined by `/`, e.g. `Symbol/Node/Node`.
    pub fn child_signature(&self) -> String {
        self.children
            .iter()
            .map(Element::type_name)
            .collect::<Vec<_>>()
            .join("/")
    }

    pub fn to_value(&self) -> Value {
        let mut items = Vec::with_capacity(self.children.len() + 1);
        items.push(Value::Atom(self.head.clone()));
        items.extend(self.children.iter().map(Element::to_value));
        Value::List(items)
    }

    /// Finds the node with `id` in this subtree.
    pub fn find_id(&self, id: NodeId) -> Option<&Node> {
        if self.id == id {
            return Some(self);
        }
        self.child_nodes().find_map(|child| child.find_id(id))
    }

    /// Nodes matching a slash-separated tag pattern; see [`crate::query`].
    pub fn xpath(&self, pattern: &str) -> Vec<&Node> {
        crate::query::find(self, pattern)
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: [", self.path_str())?;
        for (i, child) in self.children.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            match child {
                Element::Atom(atom) => write!(f, "{}", atom)?,
                Element::Node(node) => write!(f, "{}", node)?,
            }
        }
        write!(f, "]")
    }
}

/// A built document, owning its root node.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    root: Node,
}

impl Document {
    /// Build a document whose root is the top-level list of `value`.
    pub fn from_value(value: &Value) -> Result<Self, SexpError> {
        match build(value, &[])? {
            Element::Node(root) => {
                debug!(root = %root.name(), "built document tree");
                Ok(Self { root })
            }
            Element::Atom(atom) => Err(err_msg!(
                UnsupportedValue,
                "document root must be a list, found {}",
                atom.type_name()
            )),
        }
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn into_root(self) -> Node {
        self.root
    }

    /// Resolves a node handle, `None` if it belongs to another document.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.root.find_id(id)
    }

    pub fn find(&self, pattern: &str) -> Vec<&Node> {
        crate::query::find(&self.root, pattern)
    }

    /// Every node path followed by its atoms, one per line.
    pub fn dump(&self) -> String {
        let mut dumper = Dumper::default();
        walk(&self.root, &mut dumper);
        dumper.out
    }

    /// Distinct node paths, sorted.
    pub fn paths(&self) -> BTreeSet<String> {
        let mut collector = PathCollector::default();
        walk(&self.root, &mut collector);
        collector.paths
    }
}

// ============================================================================
// TREE BUILDER
// ============================================================================

/// Converts a codec value into a tree element.
///
/// Atoms map to themselves; a list maps to a [`Node`] whose path extends
/// `parent_path` with the list head's text. Symbol and string heads are both
/// accepted; an empty list or any other head is an `UnsupportedValue`.
///
/// # Examples
///
/// ```rust
/// use kisexp::syntax::parse_str;
/// use kisexp::tree::{build, Element};
/// let value = parse_str("(a (b 1) (c))").unwrap();
/// let Element::Node(root) = build(&value, &[]).unwrap() else { panic!() };
/// let b = root.child_nodes().next().unwrap();
/// assert_eq!(b.path(), ["a".to_string(), "b".to_string()]);
/// ```
pub fn build(value: &Value, parent_path: &[String]) -> Result<Element, SexpError> {
    match value {
        Value::Atom(atom) => Ok(Element::Atom(atom.clone())),
        Value::List(items) => {
            let (head, rest) = items
                .split_first()
                .ok_or_else(|| err_msg!(UnsupportedValue, "empty list has no tag"))?;
            let head = match head {
                Value::Atom(atom @ (Atom::Symbol(_) | Atom::String(_))) => atom.clone(),
                other => {
                    return Err(err_msg!(
                        UnsupportedValue,
                        "list head must be a symbol or string, found {}",
                        other.type_name()
                    ))
                }
            };
            let tag = head.text().unwrap_or_default().to_string();

            let mut path = Vec::with_capacity(parent_path.len() + 1);
            path.extend_from_slice(parent_path);
            path.push(tag);

            let children = rest
                .iter()
                .map(|item| build(item, &path))
                .collect::<Result<Vec<_>, _>>()?;

            Ok(Element::Node(Node {
                id: NodeId::fresh(),
                head,
                path,
                children,
            }))
        }
    }
}

// ============================================================================
// DEPTH-FIRST TRAVERSAL
// ============================================================================

/// What the walker does after visiting a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Walk {
    Descend,
    Skip,
}

/// Callbacks for [`walk`]. `on_leave` runs only for nodes that descended.
pub trait Visitor<'a> {
    fn on_node(&mut self, _node: &'a Node) -> Walk {
        Walk::Descend
    }

    fn on_leaf(&mut self, _atom: &'a Atom) {}

    fn on_leave(&mut self, _node: &'a Node) {}
}

/// Pre-order, left-to-right depth-first walk.
pub fn walk<'a, V: Visitor<'a> + ?Sized>(node: &'a Node, visitor: &mut V) {
    if visitor.on_node(node) == Walk::Skip {
        return;
    }
    for child in &node.children {
        match child {
            Element::Node(child) => walk(child, visitor),
            Element::Atom(atom) => visitor.on_leaf(atom),
        }
    }
    visitor.on_leave(node);
}

#[derive(Default)]
struct Dumper {
    out: String,
}

impl<'a> Visitor<'a> for Dumper {
    fn on_node(&mut self, node: &'a Node) -> Walk {
        self.out.push_str(&node.path_str());
        self.out.push('\n');
        Walk::Descend
    }

    fn on_leaf(&mut self, atom: &'a Atom) {
        self.out.push_str("    ");
        self.out.push_str(&atom.to_string());
        self.out.push('\n');
    }
}

#[derive(Default)]
struct PathCollector {
    paths: BTreeSet<String>,
}

impl<'a> Visitor<'a> for PathCollector {
    fn on_node(&mut self, node: &'a Node) -> Walk {
        self.paths.insert(node.path_str());
        Walk::Descend
    }
}
