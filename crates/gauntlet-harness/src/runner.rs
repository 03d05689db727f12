//! Test execution engine: marshal → invoke → compare over a bounded pool.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{RecvTimeoutError, bounded, unbounded};
use serde::{Deserialize, Serialize};

use gauntlet_core::{Contract, Value, export, marshal, structural_eq};
use gauntlet_sandbox::Candidate;

use crate::report::{CaseResult, CaseStatus, Feedback};
use crate::structured_log::{LogEmitter, LogEntry, LogLevel, Outcome};

/// One test case: ordered raw parameter texts plus one raw expected-output
/// text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestCase {
    pub parameters: Vec<String>,
    pub expected_output: String,
}

/// Per-run execution knobs. Explicit and immutable; one value per
/// invocation.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Upper bound on concurrently executing cases.
    pub workers: usize,
    /// Wall-clock bound for a single candidate invocation.
    pub case_timeout: Duration,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            workers: 4,
            case_timeout: Duration::from_secs(5),
        }
    }
}

/// Runs an ordered test list against one loaded candidate.
///
/// Cases share no mutable state, so they execute on a bounded worker pool;
/// results are reassembled in input order afterward. A fault in one case
/// degrades only that case.
pub struct Runner<'a> {
    candidate: Arc<dyn Candidate>,
    contract: &'a Contract,
    config: &'a RunnerConfig,
}

enum InvocationFault {
    Fault(String),
    Timeout,
}

impl<'a> Runner<'a> {
    #[must_use]
    pub fn new(
        candidate: Arc<dyn Candidate>,
        contract: &'a Contract,
        config: &'a RunnerConfig,
    ) -> Self {
        Self {
            candidate,
            contract,
            config,
        }
    }

    /// Execute every case and aggregate.
    pub fn run(&self, cases: &[TestCase], emitter: &LogEmitter, trace_id: &str) -> Feedback {
        if cases.is_empty() {
            return Feedback::from_results(Vec::new());
        }

        let workers = self.config.workers.clamp(1, cases.len());
        let (job_tx, job_rx) = unbounded::<(usize, &TestCase)>();
        let (result_tx, result_rx) = unbounded::<(usize, CaseResult, Outcome, u64)>();
        for job in cases.iter().enumerate() {
            let _ = job_tx.send(job);
        }
        drop(job_tx);

        thread::scope(|scope| {
            for _ in 0..workers {
                let job_rx = job_rx.clone();
                let result_tx = result_tx.clone();
                scope.spawn(move || {
                    while let Ok((index, case)) = job_rx.recv() {
                        let started = Instant::now();
                        let (result, outcome) = self.execute_case(case);
                        let elapsed = started.elapsed().as_millis() as u64;
                        let _ = result_tx.send((index, result, outcome, elapsed));
                    }
                });
            }
        });
        drop(result_tx);

        let mut slots: Vec<Option<CaseResult>> = vec![None; cases.len()];
        while let Ok((index, result, outcome, elapsed)) = result_rx.recv() {
            emitter.emit(
                &LogEntry::new(trace_id, LogLevel::Info, "case_completed")
                    .with_case(index)
                    .with_outcome(outcome)
                    .with_duration_ms(elapsed),
            );
            slots[index] = Some(result);
        }

        let results = cases
            .iter()
            .zip(slots)
            .map(|(case, slot)| {
                slot.unwrap_or_else(|| {
                    degraded(case, "case executor terminated before reporting").0
                })
            })
            .collect();
        Feedback::from_results(results)
    }

    fn execute_case(&self, case: &TestCase) -> (CaseResult, Outcome) {
        let declared = self.contract.arity();
        if case.parameters.len() != declared {
            return degraded(
                case,
                &format!(
                    "expected {declared} parameters, got {}",
                    case.parameters.len()
                ),
            );
        }

        let mut args = Vec::with_capacity(declared);
        for (raw, parameter) in case.parameters.iter().zip(&self.contract.parameters) {
            match marshal(raw, &parameter.param_type) {
                Ok(value) => args.push(value),
                Err(e) => return degraded(case, &e.to_string()),
            }
        }
        let expected = match marshal(&case.expected_output, &self.contract.return_type) {
            Ok(value) => value,
            Err(e) => return degraded(case, &e.to_string()),
        };

        let actual = match self.invoke_bounded(args) {
            Ok(value) => value,
            Err(InvocationFault::Fault(message)) => return degraded(case, &message),
            Err(InvocationFault::Timeout) => {
                let message = format!(
                    "invocation exceeded the {}ms case time bound",
                    self.config.case_timeout.as_millis()
                );
                return (degraded(case, &message).0, Outcome::Timeout);
            }
        };

        let expected_text = match export(&expected, &self.contract.return_type) {
            Ok(text) => text,
            Err(e) => return degraded(case, &e.to_string()),
        };
        let actual_text = match export(&actual, &self.contract.return_type) {
            Ok(text) => text,
            Err(e) => return degraded(case, &e.to_string()),
        };

        let passed = structural_eq(&actual, &expected);
        let result = CaseResult {
            status: if passed {
                CaseStatus::Pass
            } else {
                CaseStatus::Fail
            },
            parameters: case.parameters.clone(),
            expected_output: expected_text,
            actual_output: actual_text,
        };
        let outcome = if passed { Outcome::Pass } else { Outcome::Fail };
        (result, outcome)
    }

    // The invocation runs on a sacrificial thread so a hang converts into a
    // timeout verdict instead of stalling the run. Safe Rust cannot kill the
    // thread; on expiry it is abandoned with only its own argument data, and
    // hard resource kills stay with the outer isolation layer.
    fn invoke_bounded(&self, args: Vec<Value>) -> Result<Value, InvocationFault> {
        let (tx, rx) = bounded(1);
        let candidate = Arc::clone(&self.candidate);
        let spawned = thread::Builder::new()
            .name("gauntlet-case".to_string())
            .spawn(move || {
                let outcome = panic::catch_unwind(AssertUnwindSafe(|| candidate.invoke(args)));
                let _ = tx.send(outcome);
            });
        if spawned.is_err() {
            return Err(InvocationFault::Fault(
                "case worker could not be spawned".to_string(),
            ));
        }
        match rx.recv_timeout(self.config.case_timeout) {
            Ok(Ok(Ok(value))) => Ok(value),
            Ok(Ok(Err(fault))) => Err(InvocationFault::Fault(fault.to_string())),
            Ok(Err(payload)) => Err(InvocationFault::Fault(panic_message(payload.as_ref()))),
            Err(RecvTimeoutError::Timeout) => Err(InvocationFault::Timeout),
            Err(RecvTimeoutError::Disconnected) => Err(InvocationFault::Fault(
                "candidate terminated without producing a value".to_string(),
            )),
        }
    }
}

fn degraded(case: &TestCase, message: &str) -> (CaseResult, Outcome) {
    (
        CaseResult {
            status: CaseStatus::Fail,
            parameters: case.parameters.clone(),
            expected_output: case.expected_output.clone(),
            actual_output: format!("Error: {message}"),
        },
        Outcome::Error,
    )
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "candidate panicked".to_string()
    }
}
