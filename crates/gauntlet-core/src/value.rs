//! Typed in-memory values mirroring the descriptor kinds.

use std::collections::{HashMap, HashSet, VecDeque};

use serde_json::Value as Json;

/// A binary-tree node. Children are exclusively owned by their parent
/// slot, so trees are acyclic by construction.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeNode {
    pub value: Value,
    pub left: Option<Box<TreeNode>>,
    pub right: Option<Box<TreeNode>>,
}

impl TreeNode {
    #[must_use]
    pub fn leaf(value: Value) -> Self {
        Self {
            value,
            left: None,
            right: None,
        }
    }
}

/// A singly linked list node; the terminal node's successor is absent.
#[derive(Debug, Clone, PartialEq)]
pub struct ListNode {
    pub value: Value,
    pub next: Option<Box<ListNode>>,
}

/// A node in the graph arena. Neighbor links are indices into the arena,
/// never owning pointers, so cyclic adjacency cannot form ownership cycles.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphNode {
    pub value: Value,
    pub neighbors: Vec<usize>,
}

/// Identity-indexed node arena plus adjacency.
///
/// Node identity is the canonical text of the node value: two occurrences
/// of the same scalar are the same node. Insertion order is preserved and
/// is what edge export walks.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphValue {
    nodes: Vec<GraphNode>,
    index: HashMap<String, usize>,
    directed: bool,
}

impl GraphValue {
    #[must_use]
    pub fn new(directed: bool) -> Self {
        Self {
            nodes: Vec::new(),
            index: HashMap::new(),
            directed,
        }
    }

    #[must_use]
    pub fn directed(&self) -> bool {
        self.directed
    }

    /// Arena nodes in insertion order.
    #[must_use]
    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    /// Return the arena index for `key`, inserting a node holding `value`
    /// on first occurrence.
    pub fn intern(&mut self, key: String, value: Value) -> usize {
        if let Some(&index) = self.index.get(&key) {
            return index;
        }
        let index = self.nodes.len();
        self.nodes.push(GraphNode {
            value,
            neighbors: Vec::new(),
        });
        self.index.insert(key, index);
        index
    }

    /// Install the neighbor relation for one raw edge. Undirected graphs
    /// get the reverse link as well; a self-loop therefore records two
    /// entries and still exports once.
    pub fn add_edge(&mut self, from: usize, to: usize) {
        self.nodes[from].neighbors.push(to);
        if !self.directed {
            self.nodes[to].neighbors.push(from);
        }
    }

    /// Canonical edge sequence: one entry per raw edge, in arena order,
    /// with an undirected edge suppressed when its reverse was already
    /// emitted. The seen-set doubles as the visited tracking that bounds
    /// the walk on cyclic adjacency.
    #[must_use]
    pub fn edge_pairs(&self) -> Vec<(usize, usize)> {
        let mut seen: HashSet<(usize, usize)> = HashSet::new();
        let mut edges = Vec::new();
        for (from, node) in self.nodes.iter().enumerate() {
            for &to in &node.neighbors {
                if seen.contains(&(to, from)) {
                    continue;
                }
                edges.push((from, to));
                if !self.directed {
                    seen.insert((from, to));
                }
            }
        }
        edges
    }
}

/// Tagged union mirroring the descriptor kinds.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
    Sequence(Vec<Value>),
    Matrix(Vec<Vec<Value>>),
    Tree(Option<Box<TreeNode>>),
    List(Option<Box<ListNode>>),
    Graph(GraphValue),
}

impl Value {
    /// Human-readable kind tag used in fault messages.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "integer",
            Value::Float(_) => "double",
            Value::Str(_) => "string",
            Value::Bool(_) => "boolean",
            Value::Sequence(_) => "sequence",
            Value::Matrix(_) => "matrix",
            Value::Tree(_) => "binary tree",
            Value::List(_) => "linked list",
            Value::Graph(_) => "graph",
        }
    }
}

/// Level-order slots of a tree, with trailing absence markers trimmed.
/// This is the canonical tree serialization order.
#[must_use]
pub fn level_order(root: Option<&TreeNode>) -> Vec<Option<&Value>> {
    let mut out: Vec<Option<&Value>> = Vec::new();
    let mut queue: VecDeque<Option<&TreeNode>> = VecDeque::new();
    if root.is_some() {
        queue.push_back(root);
    }
    while let Some(slot) = queue.pop_front() {
        match slot {
            Some(node) => {
                out.push(Some(&node.value));
                queue.push_back(node.left.as_deref());
                queue.push_back(node.right.as_deref());
            }
            None => out.push(None),
        }
    }
    while matches!(out.last(), Some(None)) {
        out.pop();
    }
    out
}

/// Values of a list chain, front to back.
#[must_use]
pub fn list_values(head: Option<&ListNode>) -> Vec<&Value> {
    let mut out = Vec::new();
    let mut current = head;
    while let Some(node) = current {
        out.push(&node.value);
        current = node.next.as_deref();
    }
    out
}

/// Render a value to its canonical JSON fragment without a descriptor.
///
/// This is the identity text used to intern graph nodes and to compare
/// graphs. `None` when no canonical form exists (a non-finite double, or a
/// graph nested inside another value; graph node payloads are barred from
/// being graphs at marshal time).
#[must_use]
pub fn canonical_fragment(value: &Value) -> Option<Json> {
    match value {
        Value::Int(i) => Some(Json::from(*i)),
        Value::Float(f) => serde_json::Number::from_f64(*f).map(Json::Number),
        Value::Str(s) => Some(Json::String(s.clone())),
        Value::Bool(b) => Some(Json::Bool(*b)),
        Value::Sequence(items) => items
            .iter()
            .map(canonical_fragment)
            .collect::<Option<Vec<_>>>()
            .map(Json::Array),
        Value::Matrix(rows) => rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(canonical_fragment)
                    .collect::<Option<Vec<_>>>()
                    .map(Json::Array)
            })
            .collect::<Option<Vec<_>>>()
            .map(Json::Array),
        Value::Tree(root) => level_order(root.as_deref())
            .into_iter()
            .map(|slot| match slot {
                Some(value) => canonical_fragment(value),
                None => Some(Json::Null),
            })
            .collect::<Option<Vec<_>>>()
            .map(Json::Array),
        Value::List(head) => list_values(head.as_deref())
            .into_iter()
            .map(canonical_fragment)
            .collect::<Option<Vec<_>>>()
            .map(Json::Array),
        Value::Graph(_) => None,
    }
}
