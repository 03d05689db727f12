//! Submission loading across the trust boundary.

use std::sync::Arc;

use serde::Deserialize;
use thiserror::Error;

use gauntlet_core::Contract;

use crate::Candidate;
use crate::registry::Registry;

/// Faults raised while loading a submission. Both abort the run before any
/// case executes.
#[derive(Debug, Error)]
pub enum SandboxError {
    /// The submission unit cannot be turned into a loadable form.
    #[error("compilation failed: {0}")]
    Compilation(String),
    /// The loaded unit does not satisfy the contract.
    #[error("contract violation: {0}")]
    Contract(String),
}

/// The unit a front end submits in place of source text: the
/// implementation language is fixed at build time, so the unit names a
/// registered entry symbol.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmissionUnit {
    pub entry: String,
    #[serde(default = "default_language")]
    pub language: String,
}

fn default_language() -> String {
    "rust".to_string()
}

/// A candidate resolved and checked against a contract.
pub struct Loaded {
    pub symbol: String,
    pub candidate: Arc<dyn Candidate>,
}

/// Resolve `unit_text` against `registry` and check the result against
/// `contract`.
pub fn load(registry: &Registry, unit_text: &str, contract: &Contract) -> Result<Loaded, SandboxError> {
    let unit: SubmissionUnit = serde_json::from_str(unit_text)
        .map_err(|e| SandboxError::Compilation(format!("malformed submission unit: {e}")))?;
    if !unit.language.eq_ignore_ascii_case("rust") {
        return Err(SandboxError::Compilation(format!(
            "unsupported language: {}",
            unit.language
        )));
    }
    if unit.entry != contract.name {
        return Err(SandboxError::Contract(format!(
            "submission entry {} does not match contract function {}",
            unit.entry, contract.name
        )));
    }
    let candidate = registry.resolve(&unit.entry).ok_or_else(|| {
        SandboxError::Contract(format!("{} is not defined or not invocable", unit.entry))
    })?;
    if candidate.arity() != contract.arity() {
        return Err(SandboxError::Contract(format!(
            "{} takes {} parameters, contract declares {}",
            unit.entry,
            candidate.arity(),
            contract.arity()
        )));
    }
    Ok(Loaded {
        symbol: unit.entry,
        candidate,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FnCandidate;
    use gauntlet_core::{Descriptor, Parameter, ScalarKind, Value};

    fn contract() -> Contract {
        Contract {
            name: "double_it".to_string(),
            parameters: vec![Parameter {
                name: "n".to_string(),
                param_type: Descriptor::Scalar(ScalarKind::Integer),
            }],
            return_type: Descriptor::Scalar(ScalarKind::Integer),
        }
    }

    fn registry_with_double() -> Registry {
        let registry = Registry::new();
        registry
            .register(
                "double_it",
                Arc::new(FnCandidate::new(1, |args| match args.as_slice() {
                    [Value::Int(n)] => Ok(Value::Int(n * 2)),
                    _ => Err(crate::CandidateFault::Runtime("expected one integer".to_string())),
                })),
            )
            .expect("registration");
        registry
    }

    #[test]
    fn loads_a_matching_submission() {
        let registry = registry_with_double();
        let loaded = load(&registry, r#"{"entry":"double_it"}"#, &contract()).expect("loadable");
        assert_eq!(loaded.symbol, "double_it");
        assert_eq!(loaded.candidate.arity(), 1);
    }

    #[test]
    fn malformed_unit_is_a_compilation_fault() {
        let registry = registry_with_double();
        let err = load(&registry, "{entry:", &contract()).expect_err("malformed");
        assert!(matches!(err, SandboxError::Compilation(_)));
    }

    #[test]
    fn foreign_language_is_a_compilation_fault() {
        let registry = registry_with_double();
        let err = load(
            &registry,
            r#"{"entry":"double_it","language":"python"}"#,
            &contract(),
        )
        .expect_err("foreign language");
        assert!(matches!(err, SandboxError::Compilation(_)));
    }

    #[test]
    fn missing_symbol_is_a_contract_fault() {
        let registry = Registry::new();
        let err = load(&registry, r#"{"entry":"double_it"}"#, &contract()).expect_err("missing");
        assert!(matches!(err, SandboxError::Contract(_)));
        assert!(err.to_string().contains("not defined or not invocable"));
    }

    #[test]
    fn entry_must_match_the_contract_function() {
        let registry = registry_with_double();
        let err = load(&registry, r#"{"entry":"triple_it"}"#, &contract()).expect_err("mismatch");
        assert!(matches!(err, SandboxError::Contract(_)));
    }

    #[test]
    fn arity_mismatch_is_a_contract_fault() {
        let registry = Registry::new();
        registry
            .register(
                "double_it",
                Arc::new(FnCandidate::new(2, |_| Ok(Value::Int(0)))),
            )
            .expect("registration");
        let err = load(&registry, r#"{"entry":"double_it"}"#, &contract()).expect_err("arity");
        assert!(matches!(err, SandboxError::Contract(_)));
    }
}
