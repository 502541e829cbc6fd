//! Call instrumentation interceptors
//!
//! An [`Interceptor`] wraps an operation with before/after hooks that write
//! tracking data into the same store the operation targets. The cache runs
//! its chain in order: every `before_call` fires ahead of the operation,
//! every `after_call` once it has succeeded.

use crate::error::Result;
use crate::store::KeyValueStore;

/// Suffix for the per-operation inputs history list
pub const INPUTS_SUFFIX: &str = ":inputs";

/// Suffix for the per-operation outputs history list
pub const OUTPUTS_SUFFIX: &str = ":outputs";

/// Around-call hook pair for an instrumented operation
///
/// `op` is the operation's qualified name (e.g. `Cache.store`);
/// representations are the display strings recorded in history.
pub trait Interceptor: Send + Sync {
    /// Runs before the operation, with the rendered input arguments
    fn before_call(&self, store: &dyn KeyValueStore, op: &str, input: &str) -> Result<()>;

    /// Runs after the operation succeeds, with the rendered result
    fn after_call(&self, store: &dyn KeyValueStore, op: &str, output: &str) -> Result<()>;
}

/// Counts invocations: one INCR on the operation-name key per call
#[derive(Debug, Default)]
pub struct CallCounter;

impl Interceptor for CallCounter {
    fn before_call(&self, store: &dyn KeyValueStore, op: &str, _input: &str) -> Result<()> {
        store.incr(op)?;
        Ok(())
    }

    fn after_call(&self, _store: &dyn KeyValueStore, _op: &str, _output: &str) -> Result<()> {
        Ok(())
    }
}

/// Records call history: inputs and outputs as two parallel append-only
/// lists under `{op}:inputs` and `{op}:outputs`
///
/// The i-th element of each list belongs to the i-th call. A failure
/// between the two appends leaves the lists unequal in length; replay
/// tolerates that by zipping to the shorter one.
#[derive(Debug, Default)]
pub struct CallHistory;

impl Interceptor for CallHistory {
    fn before_call(&self, store: &dyn KeyValueStore, op: &str, input: &str) -> Result<()> {
        store.rpush(&format!("{}{}", op, INPUTS_SUFFIX), input.as_bytes())?;
        Ok(())
    }

    fn after_call(&self, store: &dyn KeyValueStore, op: &str, output: &str) -> Result<()> {
        store.rpush(&format!("{}{}", op, OUTPUTS_SUFFIX), output.as_bytes())?;
        Ok(())
    }
}
