//! Pre-run shape validation of raw test-case text.
//!
//! A front end calls this to reject malformed question data before
//! anything executes. A successful marshal is the shape proof; String
//! scalars additionally may not contain the listy metacharacters, whose
//! flattened encoding would be ambiguous.

use crate::descriptor::Descriptor;
use crate::marshal::{MarshalError, marshal};
use crate::value::{ListNode, TreeNode, Value};

const LISTY_METACHARS: [char; 3] = ['[', ']', ','];

/// Check that raw text satisfies `descriptor` without keeping the value.
pub fn validate_raw(raw: &str, descriptor: &Descriptor) -> Result<(), MarshalError> {
    let value = marshal(raw, descriptor)?;
    check_strings(&value)
}

fn check_strings(value: &Value) -> Result<(), MarshalError> {
    match value {
        Value::Str(s) => {
            if s.chars().any(|c| LISTY_METACHARS.contains(&c)) {
                return Err(MarshalError::TypeMismatch(format!(
                    "string {s:?} contains listy metacharacters"
                )));
            }
            Ok(())
        }
        Value::Int(_) | Value::Float(_) | Value::Bool(_) => Ok(()),
        Value::Sequence(items) => items.iter().try_for_each(check_strings),
        Value::Matrix(rows) => rows.iter().flatten().try_for_each(check_strings),
        Value::Tree(root) => check_tree(root.as_deref()),
        Value::List(head) => check_list(head.as_deref()),
        Value::Graph(graph) => graph
            .nodes()
            .iter()
            .try_for_each(|node| check_strings(&node.value)),
    }
}

fn check_tree(node: Option<&TreeNode>) -> Result<(), MarshalError> {
    let Some(node) = node else {
        return Ok(());
    };
    check_strings(&node.value)?;
    check_tree(node.left.as_deref())?;
    check_tree(node.right.as_deref())
}

fn check_list(mut node: Option<&ListNode>) -> Result<(), MarshalError> {
    while let Some(current) = node {
        check_strings(&current.value)?;
        node = current.next.as_deref();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{Descriptor, ScalarKind};

    #[test]
    fn well_shaped_raw_text_passes() {
        assert!(validate_raw("5", &Descriptor::Scalar(ScalarKind::Integer)).is_ok());
        assert!(
            validate_raw(
                "[[1,2],[2,3]]",
                &Descriptor::graph(Descriptor::Scalar(ScalarKind::Integer), false)
            )
            .is_ok()
        );
    }

    #[test]
    fn malformed_raw_text_fails() {
        assert!(validate_raw("5", &Descriptor::array(Descriptor::Scalar(ScalarKind::Integer))).is_err());
        assert!(validate_raw("nope", &Descriptor::Scalar(ScalarKind::Integer)).is_err());
    }

    #[test]
    fn strings_reject_listy_metacharacters() {
        let string = Descriptor::Scalar(ScalarKind::String);
        assert!(validate_raw(r#""plain""#, &string).is_ok());
        assert!(validate_raw(r#""a,b""#, &string).is_err());
        assert!(validate_raw(r#""a[0]""#, &string).is_err());
    }

    #[test]
    fn nested_strings_are_checked() {
        let descriptor = Descriptor::array(Descriptor::Scalar(ScalarKind::String));
        assert!(validate_raw(r#"["ok","a,b"]"#, &descriptor).is_err());
    }
}
