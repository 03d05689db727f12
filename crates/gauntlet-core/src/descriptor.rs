//! Recursive type descriptors and their wire form.
//!
//! A descriptor declares the shape of a value: a scalar kind, or a
//! composite kind carrying exactly one child descriptor. The wire form is
//! the `{"type": ..., "type_children": ...}` contract the front end speaks,
//! with `GraphNode` carrying an additional `directed` flag.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Scalar leaf kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    Integer,
    Double,
    String,
    Boolean,
}

impl ScalarKind {
    /// Wire name of this kind.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            ScalarKind::Integer => "Integer",
            ScalarKind::Double => "Double",
            ScalarKind::String => "String",
            ScalarKind::Boolean => "Boolean",
        }
    }
}

/// Recursive shape declaration for marshaled values.
///
/// Every composite kind carries exactly one child descriptor; `Scalar`
/// carries none. Both invariants are enforced when decoding the wire form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "WireType", into = "WireType")]
pub enum Descriptor {
    Scalar(ScalarKind),
    Array(Box<Descriptor>),
    Matrix(Box<Descriptor>),
    BinaryTree(Box<Descriptor>),
    LinkedList(Box<Descriptor>),
    Graph { node: Box<Descriptor>, directed: bool },
}

impl Descriptor {
    #[must_use]
    pub fn array(child: Descriptor) -> Self {
        Descriptor::Array(Box::new(child))
    }

    #[must_use]
    pub fn matrix(child: Descriptor) -> Self {
        Descriptor::Matrix(Box::new(child))
    }

    #[must_use]
    pub fn binary_tree(child: Descriptor) -> Self {
        Descriptor::BinaryTree(Box::new(child))
    }

    #[must_use]
    pub fn linked_list(child: Descriptor) -> Self {
        Descriptor::LinkedList(Box::new(child))
    }

    #[must_use]
    pub fn graph(node: Descriptor, directed: bool) -> Self {
        Descriptor::Graph {
            node: Box::new(node),
            directed,
        }
    }

    /// Child descriptor of a composite kind, `None` for scalars.
    #[must_use]
    pub fn child(&self) -> Option<&Descriptor> {
        match self {
            Descriptor::Scalar(_) => None,
            Descriptor::Array(child)
            | Descriptor::Matrix(child)
            | Descriptor::BinaryTree(child)
            | Descriptor::LinkedList(child)
            | Descriptor::Graph { node: child, .. } => Some(child),
        }
    }

    /// Wire name of this kind.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Descriptor::Scalar(kind) => kind.name(),
            Descriptor::Array(_) => "Array",
            Descriptor::Matrix(_) => "Matrix",
            Descriptor::BinaryTree(_) => "TreeNode",
            Descriptor::LinkedList(_) => "ListNode",
            Descriptor::Graph { .. } => "GraphNode",
        }
    }
}

/// Shape faults raised while decoding a wire descriptor.
#[derive(Debug, Error)]
pub enum DescriptorError {
    #[error("unknown type name: {0}")]
    UnknownType(String),
    #[error("{0} requires a type_children entry")]
    MissingChild(&'static str),
    #[error("{0} does not take type_children")]
    UnexpectedChild(&'static str),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct WireType {
    #[serde(rename = "type")]
    type_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    type_children: Option<Box<WireType>>,
    #[serde(default, skip_serializing_if = "is_false")]
    directed: bool,
}

fn is_false(flag: &bool) -> bool {
    !*flag
}

impl TryFrom<WireType> for Descriptor {
    type Error = DescriptorError;

    fn try_from(wire: WireType) -> Result<Self, Self::Error> {
        let WireType {
            type_name,
            type_children,
            directed,
        } = wire;

        let has_child = type_children.is_some();
        let scalar = move |kind: ScalarKind| {
            if has_child {
                return Err(DescriptorError::UnexpectedChild(kind.name()));
            }
            Ok(Descriptor::Scalar(kind))
        };

        match type_name.as_str() {
            "Integer" => scalar(ScalarKind::Integer),
            "Double" => scalar(ScalarKind::Double),
            "String" => scalar(ScalarKind::String),
            "Boolean" => scalar(ScalarKind::Boolean),
            "Array" => Ok(Descriptor::array(child_of(type_children, "Array")?)),
            "Matrix" => Ok(Descriptor::matrix(child_of(type_children, "Matrix")?)),
            "TreeNode" => Ok(Descriptor::binary_tree(child_of(type_children, "TreeNode")?)),
            "ListNode" => Ok(Descriptor::linked_list(child_of(type_children, "ListNode")?)),
            "GraphNode" => Ok(Descriptor::graph(
                child_of(type_children, "GraphNode")?,
                directed,
            )),
            other => Err(DescriptorError::UnknownType(other.to_string())),
        }
    }
}

fn child_of(
    child: Option<Box<WireType>>,
    kind: &'static str,
) -> Result<Descriptor, DescriptorError> {
    let child = child.ok_or(DescriptorError::MissingChild(kind))?;
    Descriptor::try_from(*child)
}

impl From<Descriptor> for WireType {
    fn from(descriptor: Descriptor) -> Self {
        let kind = descriptor.kind_name();
        match descriptor {
            Descriptor::Scalar(_) => WireType {
                type_name: kind.to_string(),
                type_children: None,
                directed: false,
            },
            Descriptor::Array(child)
            | Descriptor::Matrix(child)
            | Descriptor::BinaryTree(child)
            | Descriptor::LinkedList(child) => WireType {
                type_name: kind.to_string(),
                type_children: Some(Box::new(WireType::from(*child))),
                directed: false,
            },
            Descriptor::Graph { node, directed } => WireType {
                type_name: kind.to_string(),
                type_children: Some(Box::new(WireType::from(*node))),
                directed,
            },
        }
    }
}
