//! Path queries over a document tree.
//!
//! A pattern is a `/`-separated tag sequence.
//!
//! - **Absolute** (`/kicad_sch/symbol`): the node the search starts from is
//!   compared against the first segment.
//! - **Relative** (`symbol/property`): the start node is accepted without a
//!   comparison, and its children are compared against the first segment.
//!   A child that does not match prunes its branch, so a relative pattern
//!   starts one level below the start node rather than at any depth.
//!
//! Matching is a pre-order walk with a single cursor into the pattern. A
//! node matching the last segment is recorded and not descended into, so
//! matches never nest. Empty patterns and empty segments (`a//b`) match
//! nothing; they are not reported as errors.

use tracing::debug;

use crate::tree::{walk, Node, Visitor, Walk};

/// Returns the nodes under `node` matching `pattern`, in document order.
///
/// # Examples
///
/// ```rust
/// use kisexp::syntax::parse_str;
/// use kisexp::tree::Document;
/// use kisexp::query::find;
/// let doc = Document::from_value(&parse_str("(a (b (c)) (d))").unwrap()).unwrap();
/// assert_eq!(find(doc.root(), "/a/b").len(), 1);
/// assert_eq!(find(doc.root(), "b").len(), 1);
/// assert!(find(doc.root(), "/a/z").is_empty());
/// ```
pub fn find<'a>(node: &'a Node, pattern: &str) -> Vec<&'a Node> {
    let mut cursor = QueryCursor::new(pattern);
    // A quoted empty head would otherwise match an empty segment.
    if cursor.segments.iter().any(String::is_empty) {
        debug!(pattern, "pattern has an empty segment");
        return Vec::new();
    }
    walk(node, &mut cursor);
    debug!(
        pattern,
        start = %node.path_str(),
        matches = cursor.results.len(),
        "path query"
    );
    cursor.results
}

/// Match state for one query: the pattern, the segment index and the hits.
///
/// `index == -1` means "seeking": the next node entered is accepted without
/// comparison. Every descended node decrements the index on leave, which
/// restores the parent's state before the next sibling is tried.
#[derive(Debug)]
pub struct QueryCursor<'a> {
    segments: Vec<String>,
    index: isize,
    results: Vec<&'a Node>,
}

impl<'a> QueryCursor<'a> {
    pub fn new(pattern: &str) -> Self {
        let (body, index) = match pattern.strip_prefix('/') {
            Some(rest) => (rest, 0),
            None => (pattern, -1),
        };
        Self {
            segments: body.split('/').map(str::to_string).collect(),
            index,
            results: Vec::new(),
        }
    }

    fn last_index(&self) -> isize {
        self.segments.len() as isize - 1
    }

    pub fn results(&self) -> &[&'a Node] {
        &self.results
    }

    pub fn into_results(self) -> Vec<&'a Node> {
        self.results
    }
}

impl<'a> Visitor<'a> for QueryCursor<'a> {
    fn on_node(&mut self, node: &'a Node) -> Walk {
        if self.index == -1 {
            self.index = 0;
            return Walk::Descend;
        }
        let segment = &self.segments[self.index as usize];
        if node.name() != segment.as_str() {
            return Walk::Skip;
        }
        if self.index == self.last_index() {
            self.results.push(node);
            return Walk::Skip;
        }
        self.index += 1;
        Walk::Descend
    }

    fn on_leave(&mut self, _node: &'a Node) {
        self.index -= 1;
    }
}
