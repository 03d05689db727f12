//! Function contract: the declared signature a run is checked against.

use serde::{Deserialize, Serialize};

use crate::descriptor::Descriptor;

/// A named, typed function parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub param_type: Descriptor,
}

/// The function signature a candidate is evaluated against: name, ordered
/// parameter descriptors, one return descriptor. Supplied once per
/// invocation and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contract {
    pub name: String,
    pub parameters: Vec<Parameter>,
    pub return_type: Descriptor,
}

impl Contract {
    /// Number of declared parameters.
    #[must_use]
    pub fn arity(&self) -> usize {
        self.parameters.len()
    }
}
