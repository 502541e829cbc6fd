//! Call-history replay
//!
//! Reads the tracking data the interceptors wrote and renders it as a
//! human-readable trace. Read-only: replay never mutates the store.

use std::fmt::Write as _;
use std::sync::Arc;

use crate::error::Result;
use crate::interceptor::{INPUTS_SUFFIX, OUTPUTS_SUFFIX};
use crate::store::KeyValueStore;

/// Renders the recorded call history of an instrumented operation
pub struct Replay {
    store: Arc<dyn KeyValueStore>,
}

impl Replay {
    /// Create a replay tool over the store the interceptors wrote to
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Render the full trace for an operation
    ///
    /// Output shape: a `"{op} was called {count} times:"` header, then one
    /// line per recorded call, `"{op}(*{input}) -> {output}"`. Inputs and
    /// outputs are zipped by position; if the lists differ in length
    /// (partial failure mid-call), only the pairs up to the shorter length
    /// appear.
    ///
    /// # Arguments
    /// * `op` - Qualified operation name, e.g. [`crate::STORE_OP`]
    pub fn trace(&self, op: &str) -> Result<String> {
        let count = match self.store.get(op)? {
            Some(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            None => "0".to_string(),
        };
        let inputs = self.store.lrange(&format!("{}{}", op, INPUTS_SUFFIX), 0, -1)?;
        let outputs = self.store.lrange(&format!("{}{}", op, OUTPUTS_SUFFIX), 0, -1)?;

        let mut out = format!("{} was called {} times:\n", op, count);
        for (input, output) in inputs.iter().zip(outputs.iter()) {
            let _ = writeln!(
                out,
                "{}(*{}) -> {}",
                op,
                String::from_utf8_lossy(input),
                String::from_utf8_lossy(output),
            );
        }

        Ok(out)
    }

    /// Print the trace for an operation to stdout
    pub fn print(&self, op: &str) -> Result<()> {
        print!("{}", self.trace(op)?);
        Ok(())
    }
}
