//! Candidate sandbox: the trust boundary around code this system did not
//! write.
//!
//! The implementation language is fixed at build time, so a candidate is a
//! polymorphic callable registered through a typed registry rather than
//! literal source text. What a candidate can reach is exactly the
//! `gauntlet-core` construction/export surface its arguments and return
//! value are built from; no filesystem, network, or process capability
//! crosses the boundary. This layer restricts the symbol surface only;
//! CPU/memory/wall-clock limits belong to the outer isolation layer.

pub mod loader;
pub mod registry;

use gauntlet_core::Value;
use thiserror::Error;

pub use loader::{Loaded, SandboxError, SubmissionUnit, load};
pub use registry::{Registry, RegistryError};

/// Fault raised by a candidate invocation.
#[derive(Debug, Error)]
pub enum CandidateFault {
    /// The candidate reported a runtime failure.
    #[error("{0}")]
    Runtime(String),
}

/// An invocable candidate implementation.
pub trait Candidate: Send + Sync {
    /// Number of parameters the callable accepts.
    fn arity(&self) -> usize;

    /// Invoke with marshaled arguments in declared order.
    fn invoke(&self, args: Vec<Value>) -> Result<Value, CandidateFault>;
}

/// Adapter turning a closure into a [`Candidate`].
pub struct FnCandidate<F> {
    arity: usize,
    body: F,
}

impl<F> FnCandidate<F>
where
    F: Fn(Vec<Value>) -> Result<Value, CandidateFault> + Send + Sync,
{
    #[must_use]
    pub fn new(arity: usize, body: F) -> Self {
        Self { arity, body }
    }
}

impl<F> Candidate for FnCandidate<F>
where
    F: Fn(Vec<Value>) -> Result<Value, CandidateFault> + Send + Sync,
{
    fn arity(&self) -> usize {
        self.arity
    }

    fn invoke(&self, args: Vec<Value>) -> Result<Value, CandidateFault> {
        (self.body)(args)
    }
}
