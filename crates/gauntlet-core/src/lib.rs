//! Type-directed marshaling core.
//!
//! Converts raw listy text into typed in-memory structures (scalars,
//! sequences, matrices, binary trees, linked lists, graphs) according to a
//! recursive type descriptor, serializes them back to their canonical raw
//! form, and compares them structurally. The harness crate orchestrates
//! runs on top of this surface; the sandbox crate exposes exactly this
//! surface to candidate implementations.

pub mod contract;
pub mod descriptor;
pub mod equality;
pub mod marshal;
pub mod validate;
pub mod value;

pub use contract::{Contract, Parameter};
pub use descriptor::{Descriptor, DescriptorError, ScalarKind};
pub use equality::structural_eq;
pub use marshal::{MarshalError, export, marshal};
pub use validate::validate_raw;
pub use value::{GraphNode, GraphValue, ListNode, TreeNode, Value};
