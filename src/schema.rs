//! Schema aggregation: which tag paths occur, and how often.
//!
//! A [`SchemaRegistry`] keeps exactly one [`SchemaNode`] per distinct path.
//! Paths are keyed segment by segment, so a quoted tag such as `"a/b"` is one
//! segment and never shares an entry with the nested path `a/b`. Aggregating a document node looks its path up, creates any missing
//! entries up to the `/` root, and records a back-link to the instance.
//!
//! Registry Invariant: the registry only ever grows within a session. It is
//! constructed by the caller and passed by `&mut` to every aggregation call;
//! [`SchemaRegistry::reset`] is the only way to shrink it.
//!
//! A [`SchemaId`] remembers which registry issued it; [`SchemaRegistry::get_node`]
//! returns `None` for handles from another registry or from before a reset.
//!
//! # Back-links
//! Instances are recorded as [`NodeId`] handles, never as references, so
//! dropping a document leaves the registry intact. The child-type signature
//! of each instance is captured at link time, which lets [`describe`]
//! summarise instances whose documents are gone.
//!
//! # Thread Safety
//! Not thread-safe. To aggregate from several threads, wrap the registry in
//! a `std::sync::Mutex`; each `aggregate` call is then one atomic
//! lookup-or-insert-and-link.
//!
//! [`describe`]: SchemaRegistry::describe

use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Serialize, Serializer};
use tracing::debug;

use crate::tree::{walk, Node, NodeId, Visitor, Walk};

/// Key of the implicit root entry.
pub const ROOT_PATH: &str = "/";

static NEXT_REGISTRY: AtomicU64 = AtomicU64::new(1);

/// Handle to a schema node. Only valid for the registry that issued it;
/// [`SchemaRegistry::reset`] invalidates every handle issued before.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SchemaId {
    registry: u64,
    index: usize,
}

impl Serialize for SchemaId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(self.index as u64)
    }
}

/// One linked document node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Instance {
    pub node: NodeId,
    /// Child type names joined by `/`, as seen when the node was linked.
    pub signature: String,
}

/// One path shape observed across one or more document nodes.
#[derive(Debug, Clone, Serialize)]
pub struct SchemaNode {
    name: String,
    children: Vec<SchemaId>,
    instances: Vec<Instance>,
}

impl SchemaNode {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            children: Vec::new(),
            instances: Vec::new(),
        }
    }

    /// Last tag of the path, `/` for the root.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn children(&self) -> &[SchemaId] {
        &self.children
    }

    pub fn instances(&self) -> &[Instance] {
        &self.instances
    }

    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }

    /// Distinct collapsed signatures across all instances, sorted.
    pub fn shapes(&self) -> BTreeSet<String> {
        self.instances
            .iter()
            .map(|instance| collapse_runs(&instance.signature))
            .collect()
    }
}

/// Path-keyed, deduplicated schema tree.
#[derive(Debug, Clone, Serialize)]
pub struct SchemaRegistry {
    #[serde(skip)]
    tag: u64,
    nodes: Vec<SchemaNode>,
    /// Keyed by segments, so a tag containing `/` never aliases a nested path.
    #[serde(skip)]
    index: HashMap<Vec<String>, SchemaId>,
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaRegistry {
    /// Creates a registry holding only the `/` root.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use kisexp::schema::SchemaRegistry;
    /// let registry = SchemaRegistry::new();
    /// assert_eq!(registry.len(), 1);
    /// assert_eq!(registry.node(registry.root()).name(), "/");
    /// ```
    pub fn new() -> Self {
        let tag = NEXT_REGISTRY.fetch_add(1, Ordering::Relaxed);
        let mut index = HashMap::new();
        index.insert(Vec::new(), SchemaId { registry: tag, index: 0 });
        Self {
            tag,
            nodes: vec![SchemaNode::new(ROOT_PATH)],
            index,
        }
    }

    /// Drops every entry except a fresh root.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub fn root(&self) -> SchemaId {
        self.id(0)
    }

    fn id(&self, index: usize) -> SchemaId {
        SchemaId {
            registry: self.tag,
            index,
        }
    }

    /// Number of entries, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    /// # Panics
    ///
    /// Panics if `id` was issued by another registry, or before a `reset`.
    /// Use [`get_node`](Self::get_node) for handles of unknown origin.
    pub fn node(&self, id: SchemaId) -> &SchemaNode {
        match self.get_node(id) {
            Some(node) => node,
            None => panic!("schema id {:?} does not belong to this registry", id),
        }
    }

    /// The node behind `id`, `None` for a foreign or stale handle.
    pub fn get_node(&self, id: SchemaId) -> Option<&SchemaNode> {
        if id.registry != self.tag {
            return None;
        }
        self.nodes.get(id.index)
    }

    /// Looks up a `/`-joined path string; `/` is the root. Tags that
    /// themselves contain `/` are only reachable through [`get_path`](Self::get_path).
    pub fn get(&self, path_str: &str) -> Option<SchemaId> {
        if path_str == ROOT_PATH {
            return Some(self.root());
        }
        let path: Vec<String> = path_str.split('/').map(str::to_string).collect();
        self.get_path(&path)
    }

    /// Looks up a path given as segments; the empty path is the root.
    pub fn get_path(&self, path: &[String]) -> Option<SchemaId> {
        self.index.get(path).copied()
    }

    /// Links `node` to the entry for its path, creating entries as needed.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use kisexp::schema::SchemaRegistry;
    /// use kisexp::syntax::parse_str;
    /// use kisexp::tree::Document;
    /// let doc = Document::from_value(&parse_str("(a (b) (b))").unwrap()).unwrap();
    /// let mut registry = SchemaRegistry::new();
    /// let ids: Vec<_> = doc.find("/a/b").into_iter().map(|b| registry.aggregate(b)).collect();
    /// assert_eq!(ids[0], ids[1]);
    /// assert_eq!(registry.node(ids[0]).instance_count(), 2);
    /// ```
    pub fn aggregate(&mut self, node: &Node) -> SchemaId {
        let id = self.ensure_path(node.path());
        self.nodes[id.index].instances.push(Instance {
            node: node.id(),
            signature: node.child_signature(),
        });
        id
    }

    /// Aggregates every node of the subtree rooted at `node`, in pre-order.
    pub fn aggregate_tree(&mut self, node: &Node) {
        let before = self.nodes.len();
        walk(node, &mut Aggregator { registry: self });
        debug!(
            root = %node.path_str(),
            new_entries = self.nodes.len() - before,
            "aggregated schema"
        );
    }

    fn ensure_path(&mut self, path: &[String]) -> SchemaId {
        if let Some(id) = self.index.get(path) {
            return *id;
        }
        // The empty path is always indexed, so `path` has a last segment here.
        let (name, parent_path) = match path.split_last() {
            Some(split) => split,
            None => return self.root(),
        };
        let parent = self.ensure_path(parent_path);
        let id = self.id(self.nodes.len());
        self.nodes.push(SchemaNode::new(name.as_str()));
        self.nodes[parent.index].children.push(id);
        debug!(path = %path.join("/"), "new schema entry");
        self.index.insert(path.to_vec(), id);
        id
    }

    /// One-line summary: `name #count {shape, ...}`.
    ///
    /// Runs of three or more identical child types collapse to
    /// `First/.../Last`; an instance without children shows as `(empty)`.
    ///
    /// # Panics
    ///
    /// Panics on a foreign handle, like [`node`](Self::node).
    pub fn describe(&self, id: SchemaId) -> String {
        let node = self.node(id);
        let shapes: Vec<String> = node.shapes().into_iter().collect();
        format!(
            "{} #{} {{{}}}",
            node.name,
            node.instance_count(),
            shapes.join(", ")
        )
    }

    /// The whole schema tree, one `describe` line per entry, indented by depth.
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.render_into(self.root(), 0, &mut out);
        out
    }

    fn render_into(&self, id: SchemaId, depth: usize, out: &mut String) {
        out.push_str(&"  ".repeat(depth));
        out.push_str(&self.describe(id));
        out.push('\n');
        for child in &self.node(id).children {
            self.render_into(*child, depth + 1, out);
        }
    }
}

struct Aggregator<'r> {
    registry: &'r mut SchemaRegistry,
}

impl<'a, 'r> Visitor<'a> for Aggregator<'r> {
    fn on_node(&mut self, node: &'a Node) -> Walk {
        self.registry.aggregate(node);
        Walk::Descend
    }
}

/// Collapses every run of three or more identical `/`-separated segments to
/// `First/.../Last`.
///
/// # Examples
///
/// ```rust
/// use kisexp::schema::collapse_runs;
/// assert_eq!(collapse_runs("Symbol/Node/Node/Node/Node"), "Symbol/Node/.../Node");
/// assert_eq!(collapse_runs("Node/Node"), "Node/Node");
/// assert_eq!(collapse_runs(""), "(empty)");
/// ```
pub fn collapse_runs(signature: &str) -> String {
    if signature.is_empty() {
        return "(empty)".to_string();
    }
    let segments: Vec<&str> = signature.split('/').collect();
    let mut out: Vec<&str> = Vec::with_capacity(segments.len());
    let mut start = 0;
    while start < segments.len() {
        let mut end = start;
        while end + 1 < segments.len() && segments[end + 1] == segments[start] {
            end += 1;
        }
        let run = end - start + 1;
        if run >= 3 {
            out.extend([segments[start], "...", segments[end]]);
        } else {
            out.extend(&segments[start..=end]);
        }
        start = end + 1;
    }
    out.join("/")
}
