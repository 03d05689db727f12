//! Deep structural equality over typed values.

use crate::value::{GraphValue, ListNode, TreeNode, Value, canonical_fragment};

/// Deep, cycle-safe structural equality.
///
/// Scalars compare within their own tag only. Sequences and matrices are
/// element-wise and order-sensitive. Trees compare shape and value; lists
/// walk in lockstep and lengths must match. Graphs compare their canonical
/// edge sequences, which makes equality sensitive to edge-insertion order
/// producing different canonical orderings, a known limitation of the
/// edge-list canonical form. Cross-kind comparisons are always false:
/// a tree never equals a same-content sequence.
#[must_use]
pub fn structural_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => x == y,
        (Value::Float(x), Value::Float(y)) => x == y,
        (Value::Str(x), Value::Str(y)) => x == y,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Sequence(x), Value::Sequence(y)) => seq_eq(x, y),
        (Value::Matrix(x), Value::Matrix(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(r, s)| seq_eq(r, s))
        }
        (Value::Tree(x), Value::Tree(y)) => tree_eq(x.as_deref(), y.as_deref()),
        (Value::List(x), Value::List(y)) => list_eq(x.as_deref(), y.as_deref()),
        (Value::Graph(x), Value::Graph(y)) => graph_eq(x, y),
        _ => false,
    }
}

fn seq_eq(a: &[Value], b: &[Value]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| structural_eq(x, y))
}

fn tree_eq(a: Option<&TreeNode>, b: Option<&TreeNode>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(x), Some(y)) => {
            structural_eq(&x.value, &y.value)
                && tree_eq(x.left.as_deref(), y.left.as_deref())
                && tree_eq(x.right.as_deref(), y.right.as_deref())
        }
        _ => false,
    }
}

fn list_eq(mut a: Option<&ListNode>, mut b: Option<&ListNode>) -> bool {
    loop {
        match (a, b) {
            (None, None) => return true,
            (Some(x), Some(y)) => {
                if !structural_eq(&x.value, &y.value) {
                    return false;
                }
                a = x.next.as_deref();
                b = y.next.as_deref();
            }
            _ => return false,
        }
    }
}

// Graph comparison walks the finite arena through edge_pairs, whose
// seen-set bounds the traversal on cyclic adjacency.
fn graph_eq(a: &GraphValue, b: &GraphValue) -> bool {
    if a.directed() != b.directed() {
        return false;
    }
    match (canonical_edges(a), canonical_edges(b)) {
        (Some(x), Some(y)) => x == y,
        _ => false,
    }
}

fn canonical_edges(graph: &GraphValue) -> Option<Vec<(String, String)>> {
    let nodes = graph.nodes();
    graph
        .edge_pairs()
        .into_iter()
        .map(|(from, to)| {
            Some((
                canonical_fragment(&nodes[from].value)?.to_string(),
                canonical_fragment(&nodes[to].value)?.to_string(),
            ))
        })
        .collect()
}
