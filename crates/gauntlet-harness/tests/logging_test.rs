//! Integration test: the JSONL stream emitted across one invocation.

use std::io::Write;
use std::sync::Arc;

use parking_lot::Mutex;

use gauntlet_core::{Contract, Descriptor, Parameter, ScalarKind, Value};
use gauntlet_sandbox::{Candidate, CandidateFault, FnCandidate, Registry};
use gauntlet_harness::structured_log::LogEmitter;
use gauntlet_harness::{EvaluationRequest, Evaluator, TestCase};

#[derive(Clone, Default)]
struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[test]
fn one_invocation_shares_one_trace_id_across_events() {
    let registry = Registry::new();
    let negate: Arc<dyn Candidate> = Arc::new(FnCandidate::new(1, |args| match args.as_slice() {
        [Value::Int(n)] => Ok(Value::Int(-n)),
        _ => Err(CandidateFault::Runtime("expected one integer".to_string())),
    }));
    registry.register("negate", negate).expect("registration");

    let request = EvaluationRequest {
        unit: r#"{"entry":"negate"}"#.to_string(),
        contract: Contract {
            name: "negate".to_string(),
            parameters: vec![Parameter {
                name: "n".to_string(),
                param_type: Descriptor::Scalar(ScalarKind::Integer),
            }],
            return_type: Descriptor::Scalar(ScalarKind::Integer),
        },
        cases: vec![
            TestCase {
                parameters: vec!["3".to_string()],
                expected_output: "-3".to_string(),
            },
            TestCase {
                parameters: vec!["0".to_string()],
                expected_output: "0".to_string(),
            },
        ],
    };

    let buffer = SharedBuffer::default();
    let schema = serde_json::json!({"type": "object"});
    Evaluator::new(&registry)
        .with_emitter(LogEmitter::to_writer(buffer.clone()))
        .evaluate(&request, &schema);

    let bytes = buffer.0.lock().clone();
    let text = String::from_utf8(bytes).expect("utf-8 log stream");
    let entries: Vec<serde_json::Value> = text
        .lines()
        .map(|line| serde_json::from_str(line).expect("valid JSONL line"))
        .collect();

    let events: Vec<&str> = entries
        .iter()
        .map(|e| e["event"].as_str().expect("event field"))
        .collect();
    assert_eq!(events[0], "run_started");
    assert_eq!(events.iter().filter(|e| **e == "case_completed").count(), 2);
    assert_eq!(*events.last().expect("events"), "run_completed");

    let trace = entries[0]["trace_id"].as_str().expect("trace id");
    assert_eq!(trace.len(), 64);
    assert!(entries.iter().all(|e| e["trace_id"] == trace));
}
