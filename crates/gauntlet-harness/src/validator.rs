//! Final-response schema validation.

use jsonschema::JSONSchema;
use serde_json::Value as Json;
use thiserror::Error;

/// Faults raised while validating the outgoing response.
#[derive(Debug, Error)]
pub enum ValidateError {
    /// The externally supplied schema itself does not compile.
    #[error("invalid response schema: {0}")]
    Schema(String),
    /// The response violates the schema; the payload joins every violated
    /// path and message.
    #[error("schema validation failed: {0}")]
    Violation(String),
}

/// Validate `response` against the externally supplied `schema`.
///
/// The schema is compiled per invocation, so its evolution needs no
/// rebuild of this component.
pub fn validate_response(response: &Json, schema: &Json) -> Result<(), ValidateError> {
    let compiled = JSONSchema::compile(schema).map_err(|e| ValidateError::Schema(e.to_string()))?;
    if let Err(errors) = compiled.validate(response) {
        let joined = errors
            .map(|e| format!("{} {}", e.instance_path, e))
            .collect::<Vec<_>>()
            .join(", ");
        return Err(ValidateError::Violation(joined));
    }
    Ok(())
}
