use serde::Serialize;
use tracing::debug;

use crate::errors::{EquivalencyError, Result};

/// One reported mismatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Failure {
    /// Machine path of the node, e.g. `Address.Lines[2]`.
    pub path: String,
    /// Human rendering, e.g. `property Address.Lines[2]`.
    pub description: String,
    pub message: String,
}

/// Receives failures raised during a walk.
pub trait Reporter {
    fn report(&mut self, failure: Failure);
}

/// Collects every failure so they can be reported together.
#[derive(Debug, Default)]
pub struct AssertionScope {
    failures: Vec<Failure>,
}

impl AssertionScope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failures(&self) -> &[Failure] {
        &self.failures
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    pub fn into_result(self) -> Result<()> {
        if self.failures.is_empty() {
            Ok(())
        } else {
            Err(EquivalencyError::AssertionFailed { failures: self.failures })
        }
    }
}

impl Reporter for AssertionScope {
    fn report(&mut self, failure: Failure) {
        debug!(path = %failure.path, failure = %failure.message, "equivalency failure");
        self.failures.push(failure);
    }
}
