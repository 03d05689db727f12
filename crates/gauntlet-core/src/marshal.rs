//! Raw text ⇄ typed value conversion, directed by a descriptor.
//!
//! Raw test-case text is JSON: flat literals for scalars, nested arrays
//! for sequences and matrices, level-order arrays with `null` absence
//! markers for binary trees, and 2-element endpoint pairs for graph edge
//! lists. Composite node payloads (a tree whose node values are arrays,
//! say) re-derive by marshaling each slot fragment with the child
//! descriptor.

use std::collections::VecDeque;

use serde_json::Value as Json;
use thiserror::Error;

use crate::descriptor::{Descriptor, ScalarKind};
use crate::value::{GraphValue, ListNode, TreeNode, Value, canonical_fragment, level_order, list_values};

/// Faults raised while converting raw text to or from typed values.
#[derive(Debug, Error)]
pub enum MarshalError {
    /// The raw text is not well-formed JSON.
    #[error("failed to parse input {input}: {detail}")]
    Parse { input: String, detail: String },
    /// The raw shape cannot satisfy the descriptor.
    #[error("type mismatch: {0}")]
    TypeMismatch(String),
}

/// Convert raw text into a typed value under `descriptor`.
pub fn marshal(raw: &str, descriptor: &Descriptor) -> Result<Value, MarshalError> {
    let json: Json = serde_json::from_str(raw).map_err(|e| MarshalError::Parse {
        input: raw.to_string(),
        detail: e.to_string(),
    })?;
    marshal_fragment(&json, descriptor)
}

/// Convert a parsed JSON fragment under `descriptor`.
pub fn marshal_fragment(json: &Json, descriptor: &Descriptor) -> Result<Value, MarshalError> {
    match descriptor {
        Descriptor::Scalar(kind) => marshal_scalar(json, *kind),
        Descriptor::Array(child) => {
            let items = expect_array(json, "Array")?;
            let elements = items
                .iter()
                .map(|item| marshal_fragment(item, child))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Value::Sequence(elements))
        }
        Descriptor::Matrix(child) => {
            let rows = expect_array(json, "Matrix")?;
            let mut out = Vec::with_capacity(rows.len());
            for row in rows {
                let cells = expect_array(row, "Matrix row")?;
                out.push(
                    cells
                        .iter()
                        .map(|cell| marshal_fragment(cell, child))
                        .collect::<Result<Vec<_>, _>>()?,
                );
            }
            Ok(Value::Matrix(out))
        }
        Descriptor::BinaryTree(child) => marshal_tree(json, child),
        Descriptor::LinkedList(child) => {
            let items = expect_array(json, "ListNode")?;
            let mut head: Option<Box<ListNode>> = None;
            for item in items.iter().rev() {
                let value = marshal_fragment(item, child)?;
                head = Some(Box::new(ListNode { value, next: head }));
            }
            Ok(Value::List(head))
        }
        Descriptor::Graph { node, directed } => marshal_graph(json, node, *directed),
    }
}

fn marshal_scalar(json: &Json, kind: ScalarKind) -> Result<Value, MarshalError> {
    match kind {
        ScalarKind::Integer => json
            .as_i64()
            .map(Value::Int)
            .ok_or_else(|| mismatch("Integer", json)),
        ScalarKind::Double => json
            .as_f64()
            .map(Value::Float)
            .ok_or_else(|| mismatch("Double", json)),
        ScalarKind::String => json
            .as_str()
            .map(|s| Value::Str(s.to_string()))
            .ok_or_else(|| mismatch("String", json)),
        ScalarKind::Boolean => json
            .as_bool()
            .map(Value::Bool)
            .ok_or_else(|| mismatch("Boolean", json)),
    }
}

// Breadth-first placement: the first slot is the root; a queue of nodes
// still missing children consumes two slots per dequeued node, and a null
// slot advances the cursor without creating a child. Links are recorded as
// arena indices first, then assembled into exclusively owned boxes.
fn marshal_tree(json: &Json, child: &Descriptor) -> Result<Value, MarshalError> {
    let slots = expect_array(json, "TreeNode")?;
    if slots.is_empty() {
        return Ok(Value::Tree(None));
    }
    if slots[0].is_null() {
        return Err(MarshalError::TypeMismatch(
            "tree root slot is an absence marker; encode an empty tree as []".to_string(),
        ));
    }

    struct Slot {
        value: Value,
        left: Option<usize>,
        right: Option<usize>,
    }

    let mut created: Vec<Option<Slot>> = vec![Some(Slot {
        value: marshal_fragment(&slots[0], child)?,
        left: None,
        right: None,
    })];
    let mut queue: VecDeque<usize> = VecDeque::from([0]);
    let mut cursor = 1;

    while let Some(parent) = queue.pop_front() {
        if cursor >= slots.len() {
            break;
        }
        if !slots[cursor].is_null() {
            let index = created.len();
            created.push(Some(Slot {
                value: marshal_fragment(&slots[cursor], child)?,
                left: None,
                right: None,
            }));
            if let Some(slot) = &mut created[parent] {
                slot.left = Some(index);
            }
            queue.push_back(index);
        }
        cursor += 1;
        if cursor < slots.len() {
            if !slots[cursor].is_null() {
                let index = created.len();
                created.push(Some(Slot {
                    value: marshal_fragment(&slots[cursor], child)?,
                    left: None,
                    right: None,
                }));
                if let Some(slot) = &mut created[parent] {
                    slot.right = Some(index);
                }
                queue.push_back(index);
            }
            cursor += 1;
        }
    }

    fn assemble(created: &mut [Option<Slot>], index: usize) -> Option<Box<TreeNode>> {
        let slot = created.get_mut(index)?.take()?;
        let left = slot.left.and_then(|i| assemble(created, i));
        let right = slot.right.and_then(|i| assemble(created, i));
        Some(Box::new(TreeNode {
            value: slot.value,
            left,
            right,
        }))
    }

    let root = assemble(&mut created, 0);
    Ok(Value::Tree(root))
}

fn marshal_graph(json: &Json, child: &Descriptor, directed: bool) -> Result<Value, MarshalError> {
    if matches!(child, Descriptor::Graph { .. }) {
        return Err(MarshalError::TypeMismatch(
            "graph node values may not themselves be graphs".to_string(),
        ));
    }
    let edges = expect_array(json, "GraphNode")?;
    let mut graph = GraphValue::new(directed);
    for edge in edges {
        let pair = expect_array(edge, "graph edge")?;
        if pair.len() != 2 {
            return Err(MarshalError::TypeMismatch(format!(
                "graph edge must have exactly 2 endpoints, found {}",
                pair.len()
            )));
        }
        let from = intern_endpoint(&mut graph, &pair[0], child)?;
        let to = intern_endpoint(&mut graph, &pair[1], child)?;
        graph.add_edge(from, to);
    }
    Ok(Value::Graph(graph))
}

fn intern_endpoint(
    graph: &mut GraphValue,
    json: &Json,
    child: &Descriptor,
) -> Result<usize, MarshalError> {
    let value = marshal_fragment(json, child)?;
    let key = canonical_fragment(&value)
        .map(|fragment| fragment.to_string())
        .ok_or_else(|| {
            MarshalError::TypeMismatch("graph node value has no canonical form".to_string())
        })?;
    Ok(graph.intern(key, value))
}

/// Serialize a typed value back to its canonical raw text under
/// `descriptor`. The inverse of [`marshal`] up to canonicalization:
/// trailing tree absence markers are trimmed, and an undirected graph edge
/// is emitted once even when its reverse was also marshaled.
pub fn export(value: &Value, descriptor: &Descriptor) -> Result<String, MarshalError> {
    Ok(export_fragment(value, descriptor)?.to_string())
}

/// Serialize to a JSON fragment (the inverse of [`marshal_fragment`]).
pub fn export_fragment(value: &Value, descriptor: &Descriptor) -> Result<Json, MarshalError> {
    match (descriptor, value) {
        (Descriptor::Scalar(kind), _) => export_scalar(value, *kind),
        (Descriptor::Array(child), Value::Sequence(items)) => {
            let out = items
                .iter()
                .map(|item| export_fragment(item, child))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Json::Array(out))
        }
        (Descriptor::Matrix(child), Value::Matrix(rows)) => {
            let mut out = Vec::with_capacity(rows.len());
            for row in rows {
                let cells = row
                    .iter()
                    .map(|cell| export_fragment(cell, child))
                    .collect::<Result<Vec<_>, _>>()?;
                out.push(Json::Array(cells));
            }
            Ok(Json::Array(out))
        }
        (Descriptor::BinaryTree(child), Value::Tree(root)) => {
            let mut out = Vec::new();
            for slot in level_order(root.as_deref()) {
                match slot {
                    Some(value) => out.push(export_fragment(value, child)?),
                    None => out.push(Json::Null),
                }
            }
            Ok(Json::Array(out))
        }
        (Descriptor::LinkedList(child), Value::List(head)) => {
            let out = list_values(head.as_deref())
                .into_iter()
                .map(|value| export_fragment(value, child))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Json::Array(out))
        }
        (Descriptor::Graph { node: child, .. }, Value::Graph(graph)) => {
            let nodes = graph.nodes();
            let mut out = Vec::new();
            for (from, to) in graph.edge_pairs() {
                out.push(Json::Array(vec![
                    export_fragment(&nodes[from].value, child)?,
                    export_fragment(&nodes[to].value, child)?,
                ]));
            }
            Ok(Json::Array(out))
        }
        (descriptor, value) => Err(MarshalError::TypeMismatch(format!(
            "cannot export {} as {}",
            value.kind_name(),
            descriptor.kind_name()
        ))),
    }
}

fn export_scalar(value: &Value, kind: ScalarKind) -> Result<Json, MarshalError> {
    match (kind, value) {
        (ScalarKind::Integer, Value::Int(i)) => Ok(Json::from(*i)),
        (ScalarKind::Double, Value::Float(f)) => serde_json::Number::from_f64(*f)
            .map(Json::Number)
            .ok_or_else(|| {
                MarshalError::TypeMismatch("non-finite double has no raw form".to_string())
            }),
        (ScalarKind::String, Value::Str(s)) => Ok(Json::String(s.clone())),
        (ScalarKind::Boolean, Value::Bool(b)) => Ok(Json::Bool(*b)),
        (kind, value) => Err(MarshalError::TypeMismatch(format!(
            "cannot export {} as {}",
            value.kind_name(),
            kind.name()
        ))),
    }
}

fn mismatch(expected: &str, found: &Json) -> MarshalError {
    MarshalError::TypeMismatch(format!("expected {expected}, found {found}"))
}

fn expect_array<'a>(json: &'a Json, what: &str) -> Result<&'a Vec<Json>, MarshalError> {
    json.as_array().ok_or_else(|| mismatch(what, json))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{Descriptor, ScalarKind};

    fn int() -> Descriptor {
        Descriptor::Scalar(ScalarKind::Integer)
    }

    #[test]
    fn scalar_literals_marshal_by_kind() {
        assert_eq!(marshal("5", &int()).unwrap(), Value::Int(5));
        assert_eq!(
            marshal("2.5", &Descriptor::Scalar(ScalarKind::Double)).unwrap(),
            Value::Float(2.5)
        );
        assert_eq!(
            marshal(r#""hi""#, &Descriptor::Scalar(ScalarKind::String)).unwrap(),
            Value::Str("hi".to_string())
        );
        assert_eq!(
            marshal("true", &Descriptor::Scalar(ScalarKind::Boolean)).unwrap(),
            Value::Bool(true)
        );
    }

    #[test]
    fn integer_rejects_fractional_numbers() {
        let err = marshal("2.5", &int()).unwrap_err();
        assert!(matches!(err, MarshalError::TypeMismatch(_)));
    }

    #[test]
    fn malformed_text_is_a_parse_error() {
        let err = marshal("not json", &int()).unwrap_err();
        assert!(matches!(err, MarshalError::Parse { .. }));
    }

    #[test]
    fn scalar_where_sequence_expected_is_a_mismatch() {
        let err = marshal("5", &Descriptor::array(int())).unwrap_err();
        assert!(matches!(err, MarshalError::TypeMismatch(_)));
    }

    #[test]
    fn array_round_trips_exactly() {
        let descriptor = Descriptor::array(int());
        let value = marshal("[1,2,3]", &descriptor).unwrap();
        assert_eq!(
            value,
            Value::Sequence(vec![Value::Int(1), Value::Int(2), Value::Int(3)])
        );
        assert_eq!(export(&value, &descriptor).unwrap(), "[1,2,3]");
    }

    #[test]
    fn matrix_rows_must_be_arrays() {
        let descriptor = Descriptor::matrix(int());
        let value = marshal("[[1,2],[3,4]]", &descriptor).unwrap();
        assert_eq!(export(&value, &descriptor).unwrap(), "[[1,2],[3,4]]");
        assert!(matches!(
            marshal("[1,2]", &descriptor).unwrap_err(),
            MarshalError::TypeMismatch(_)
        ));
    }

    #[test]
    fn tree_level_order_placement_skips_absent_slots() {
        let descriptor = Descriptor::binary_tree(int());
        let Value::Tree(Some(root)) = marshal("[1,2,3,null,4]", &descriptor).unwrap() else {
            panic!("expected a rooted tree");
        };
        assert_eq!(root.value, Value::Int(1));
        let left = root.left.as_deref().expect("left child");
        let right = root.right.as_deref().expect("right child");
        assert_eq!(left.value, Value::Int(2));
        assert_eq!(right.value, Value::Int(3));
        assert!(left.left.is_none());
        assert_eq!(
            left.right.as_deref().map(|n| &n.value),
            Some(&Value::Int(4))
        );
    }

    #[test]
    fn tree_export_trims_only_trailing_markers() {
        let descriptor = Descriptor::binary_tree(int());
        let gapped = marshal("[1,2,3,null,4]", &descriptor).unwrap();
        assert_eq!(export(&gapped, &descriptor).unwrap(), "[1,2,3,null,4]");

        let trailing = marshal("[1,2,null]", &descriptor).unwrap();
        assert_eq!(export(&trailing, &descriptor).unwrap(), "[1,2]");
    }

    #[test]
    fn empty_tree_round_trips() {
        let descriptor = Descriptor::binary_tree(int());
        let value = marshal("[]", &descriptor).unwrap();
        assert_eq!(value, Value::Tree(None));
        assert_eq!(export(&value, &descriptor).unwrap(), "[]");
    }

    #[test]
    fn tree_root_marker_is_rejected() {
        let descriptor = Descriptor::binary_tree(int());
        assert!(matches!(
            marshal("[null,1]", &descriptor).unwrap_err(),
            MarshalError::TypeMismatch(_)
        ));
    }

    #[test]
    fn linked_list_chains_in_order() {
        let descriptor = Descriptor::linked_list(int());
        let Value::List(Some(head)) = marshal("[1,2,3]", &descriptor).unwrap() else {
            panic!("expected a non-empty list");
        };
        assert_eq!(head.value, Value::Int(1));
        let second = head.next.as_deref().expect("second node");
        assert_eq!(second.value, Value::Int(2));
        let third = second.next.as_deref().expect("third node");
        assert_eq!(third.value, Value::Int(3));
        assert!(third.next.is_none());
    }

    #[test]
    fn undirected_graph_suppresses_reverse_edges() {
        let descriptor = Descriptor::graph(int(), false);
        let value = marshal("[[1,2],[2,3]]", &descriptor).unwrap();
        assert_eq!(export(&value, &descriptor).unwrap(), "[[1,2],[2,3]]");
    }

    #[test]
    fn directed_graph_keeps_one_way_edges() {
        let descriptor = Descriptor::graph(int(), true);
        let value = marshal("[[1,2],[2,1]]", &descriptor).unwrap();
        let Value::Graph(graph) = &value else {
            panic!("expected a graph");
        };
        assert!(graph.directed());
        assert_eq!(export(&value, &descriptor).unwrap(), "[[1,2],[2,1]]");
    }

    #[test]
    fn graph_interns_nodes_by_scalar_identity() {
        let descriptor = Descriptor::graph(int(), false);
        let Value::Graph(graph) = marshal("[[1,2],[2,3],[3,1]]", &descriptor).unwrap() else {
            panic!("expected a graph");
        };
        assert_eq!(graph.nodes().len(), 3);
    }

    #[test]
    fn graph_edges_must_be_pairs() {
        let descriptor = Descriptor::graph(int(), false);
        assert!(matches!(
            marshal("[[1,2,3]]", &descriptor).unwrap_err(),
            MarshalError::TypeMismatch(_)
        ));
    }

    #[test]
    fn graph_of_graph_payloads_are_rejected() {
        let descriptor = Descriptor::graph(Descriptor::graph(int(), false), false);
        let err = marshal("[[[],[]]]", &descriptor).unwrap_err();
        assert!(err.to_string().contains("may not themselves be graphs"));
    }

    #[test]
    fn tree_of_arrays_re_derives_node_payloads() {
        let descriptor = Descriptor::binary_tree(Descriptor::array(int()));
        let value = marshal("[[1,2],[3],null]", &descriptor).unwrap();
        let Value::Tree(Some(root)) = &value else {
            panic!("expected a rooted tree");
        };
        assert_eq!(
            root.value,
            Value::Sequence(vec![Value::Int(1), Value::Int(2)])
        );
        assert_eq!(export(&value, &descriptor).unwrap(), "[[1,2],[3]]");
    }

    #[test]
    fn export_rejects_kind_mismatch() {
        let err = export(&Value::Int(1), &Descriptor::array(int())).unwrap_err();
        assert!(err.to_string().contains("cannot export"));
    }
}
