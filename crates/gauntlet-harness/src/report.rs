//! Report wire model: the response shape the schema contract covers.

use serde::{Deserialize, Serialize};

/// Overall run status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Success,
    Fail,
}

/// Per-case status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseStatus {
    Pass,
    Fail,
}

/// Error category vocabulary fixed by the response contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    #[serde(rename = "compilation")]
    Compilation,
    #[serde(rename = "fail tests")]
    FailTests,
    #[serde(rename = "internal server error")]
    Internal,
}

/// Outcome of a single test case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseResult {
    pub status: CaseStatus,
    /// Raw parameter texts, echoed from the test case.
    pub parameters: Vec<String>,
    pub expected_output: String,
    pub actual_output: String,
}

/// The response handed to the validator and then to the caller.
///
/// `error` and `details` serialize as explicit nulls; the response schema
/// requires the fields on every path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feedback {
    pub status: RunStatus,
    pub results: Vec<CaseResult>,
    pub error: Option<ErrorKind>,
    pub details: Option<String>,
}

impl Feedback {
    /// Aggregate case results: success iff every case passed.
    #[must_use]
    pub fn from_results(results: Vec<CaseResult>) -> Self {
        let all_passed = results.iter().all(|r| r.status == CaseStatus::Pass);
        if all_passed {
            Self {
                status: RunStatus::Success,
                results,
                error: None,
                details: None,
            }
        } else {
            Self {
                status: RunStatus::Fail,
                results,
                error: Some(ErrorKind::FailTests),
                details: Some("Some test cases failed.".to_string()),
            }
        }
    }

    /// Abort response emitted before any case executes.
    #[must_use]
    pub fn aborted(error: ErrorKind, details: impl Into<String>) -> Self {
        Self {
            status: RunStatus::Fail,
            results: Vec::new(),
            error: Some(error),
            details: Some(details.into()),
        }
    }

    /// The fixed internal-error replacement response.
    #[must_use]
    pub fn internal(details: impl Into<String>) -> Self {
        Self::aborted(ErrorKind::Internal, details)
    }

    /// Render as a JSON value for schema validation.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}
