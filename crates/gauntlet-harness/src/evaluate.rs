//! Per-invocation evaluation entry point.

use serde_json::Value as Json;

use gauntlet_core::Contract;
use gauntlet_sandbox::{Registry, load};

use crate::envelope::run_fingerprint;
use crate::report::{ErrorKind, Feedback};
use crate::runner::{Runner, RunnerConfig, TestCase};
use crate::structured_log::{LogEmitter, LogEntry, LogLevel};
use crate::validator::{ValidateError, validate_response};

/// Everything one invocation evaluates: the submission unit, the contract,
/// and the ordered test list. Pure inputs; no state crosses invocations,
/// so a caller may retry an invocation freely.
#[derive(Debug, Clone)]
pub struct EvaluationRequest {
    pub unit: String,
    pub contract: Contract,
    pub cases: Vec<TestCase>,
}

/// Evaluates one candidate against one ordered test list per call.
pub struct Evaluator<'a> {
    registry: &'a Registry,
    config: RunnerConfig,
    emitter: LogEmitter,
}

impl<'a> Evaluator<'a> {
    #[must_use]
    pub fn new(registry: &'a Registry) -> Self {
        Self {
            registry,
            config: RunnerConfig::default(),
            emitter: LogEmitter::disabled(),
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: RunnerConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn with_emitter(mut self, emitter: LogEmitter) -> Self {
        self.emitter = emitter;
        self
    }

    /// Load → run → validate. Every path ends at the response validator,
    /// including the abort path; a validation failure replaces the
    /// response with the fixed internal-error shape instead of
    /// propagating.
    pub fn evaluate(&self, request: &EvaluationRequest, schema: &Json) -> Feedback {
        let trace_id = run_fingerprint(&request.unit, &request.contract);
        self.emitter.emit(
            &LogEntry::new(&trace_id, LogLevel::Info, "run_started").with_details(
                serde_json::json!({
                    "function": request.contract.name,
                    "cases": request.cases.len(),
                }),
            ),
        );

        let feedback = match load(self.registry, &request.unit, &request.contract) {
            Ok(loaded) => Runner::new(loaded.candidate, &request.contract, &self.config).run(
                &request.cases,
                &self.emitter,
                &trace_id,
            ),
            Err(error) => {
                self.emitter.emit(
                    &LogEntry::new(&trace_id, LogLevel::Error, "load_rejected")
                        .with_details(serde_json::json!({"reason": error.to_string()})),
                );
                Feedback::aborted(ErrorKind::Compilation, error.to_string())
            }
        };

        self.emitter.emit(
            &LogEntry::new(&trace_id, LogLevel::Info, "run_completed")
                .with_details(serde_json::json!({"status": feedback.status})),
        );

        match validate_response(&feedback.to_json(), schema) {
            Ok(()) => feedback,
            Err(error) => {
                self.emitter.emit(
                    &LogEntry::new(&trace_id, LogLevel::Error, "response_rejected")
                        .with_details(serde_json::json!({"reason": error.to_string()})),
                );
                match error {
                    ValidateError::Violation(paths) => {
                        Feedback::internal(format!("Schema validation failed: {paths}"))
                    }
                    ValidateError::Schema(detail) => {
                        Feedback::internal(format!("Error initializing validator: {detail}"))
                    }
                }
            }
        }
    }
}
