//! # kvtrace
//!
//! Instrumented key-value cache: stores values under generated keys and
//! tracks every store call with a counter and an append-only call history,
//! all kept in the same backing store.
//!
//! ## Architecture
//! - **KeyValueStore**: trait seam over the backing store (Redis or
//!   in-memory)
//! - **Cache**: typed store/get with a generated UUID key per value
//! - **Interceptors**: around-call chain for counting and history
//! - **Replay**: read-only rendering of a recorded call history
//!
//! ## Example
//! ```
//! use std::sync::Arc;
//! use kvtrace::{Cache, MemoryStore, Replay, STORE_OP};
//!
//! # fn main() -> kvtrace::Result<()> {
//! let store: Arc<dyn kvtrace::KeyValueStore> = Arc::new(MemoryStore::new());
//! let cache = Cache::new(Arc::clone(&store));
//!
//! let key = cache.store("bar")?;
//! assert_eq!(cache.get_text(&key)?.as_deref(), Some("bar"));
//!
//! Replay::new(store).print(STORE_OP)?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod cache;
mod error;
mod interceptor;
mod replay;
mod store;
mod value;

pub use cache::{Cache, STORE_OP};
pub use error::{Error, Result};
pub use interceptor::{CallCounter, CallHistory, Interceptor};
pub use replay::Replay;
pub use store::{KeyValueStore, MemoryStore, RedisStore, DEFAULT_REDIS_URL};
pub use value::Value;
