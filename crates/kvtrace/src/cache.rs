//! Instrumented cache wrapping a key-value store

use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::interceptor::{CallCounter, CallHistory, Interceptor};
use crate::store::KeyValueStore;
use crate::value::Value;

/// Qualified name of the instrumented store operation
pub const STORE_OP: &str = "Cache.store";

/// Cache layer that stores values under generated keys and instruments
/// each store call through an interceptor chain
///
/// The store handle is injected, not global; any [`KeyValueStore`] works.
/// By default the chain counts calls and records call history, both in the
/// same backing store.
pub struct Cache {
    /// Underlying key-value store
    store: Arc<dyn KeyValueStore>,

    /// Interceptors run in order around every `store` call
    interceptors: Vec<Box<dyn Interceptor>>,
}

impl Cache {
    /// Create a cache with the default instrumentation (call counting
    /// plus call history)
    ///
    /// # Arguments
    /// * `store` - Backing store handle, shared with any other consumers
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self::with_interceptors(store, vec![Box::new(CallCounter), Box::new(CallHistory)])
    }

    /// Create a cache with an explicit interceptor chain
    ///
    /// An empty chain gives an uninstrumented cache.
    pub fn with_interceptors(
        store: Arc<dyn KeyValueStore>,
        interceptors: Vec<Box<dyn Interceptor>>,
    ) -> Self {
        Self {
            store,
            interceptors,
        }
    }

    /// Store a value under a freshly generated key
    ///
    /// Effect order: each interceptor's `before_call` (counter increment,
    /// input-history append), then the SET, then each `after_call`
    /// (output-history append). The calls are not transactional together;
    /// a failure mid-sequence leaves partial tracking data behind.
    ///
    /// # Arguments
    /// * `value` - Text, bytes, integer, or float
    ///
    /// # Returns
    /// * `Result<String>` - The generated key (random UUID)
    pub fn store(&self, value: impl Into<Value>) -> Result<String> {
        let value = value.into();
        let input = format!("({},)", value);

        for interceptor in &self.interceptors {
            interceptor.before_call(self.store.as_ref(), STORE_OP, &input)?;
        }

        let key = Uuid::new_v4().to_string();
        self.store.set(&key, &value.encode())?;

        for interceptor in &self.interceptors {
            interceptor.after_call(self.store.as_ref(), STORE_OP, &key)?;
        }

        debug!(%key, "Stored value");
        Ok(key)
    }

    /// Get the raw bytes stored under `key`, or `None` if absent
    pub fn get_raw(&self, key: &str) -> Result<Option<Vec<u8>>> {
        self.store.get(key)
    }

    /// Get the value under `key`, applying `transform` to the raw bytes
    ///
    /// The transform is the caller's contract: it must match the type that
    /// was stored. Absent keys yield `Ok(None)` without invoking it.
    pub fn get<T, F>(&self, key: &str, transform: F) -> Result<Option<T>>
    where
        F: FnOnce(Vec<u8>) -> T,
    {
        Ok(self.store.get(key)?.map(transform))
    }

    /// Get the value under `key` decoded as UTF-8 text
    pub fn get_text(&self, key: &str) -> Result<Option<String>> {
        match self.store.get(key)? {
            Some(bytes) => String::from_utf8(bytes)
                .map(Some)
                .map_err(|e| Error::Parse(e.to_string())),
            None => Ok(None),
        }
    }

    /// Get the value under `key` parsed as a signed integer
    pub fn get_int(&self, key: &str) -> Result<Option<i64>> {
        match self.store.get(key)? {
            Some(bytes) => {
                let text = std::str::from_utf8(&bytes).map_err(|e| Error::Parse(e.to_string()))?;
                let n = text.parse::<i64>().map_err(|e| Error::Parse(e.to_string()))?;
                Ok(Some(n))
            }
            None => Ok(None),
        }
    }

    /// Read the call counter for an operation (absent counts as zero)
    pub fn call_count(&self, op: &str) -> Result<u64> {
        match self.store.get(op)? {
            Some(bytes) => {
                let text = std::str::from_utf8(&bytes).map_err(|e| Error::Parse(e.to_string()))?;
                text.parse::<u64>().map_err(|e| Error::Parse(e.to_string()))
            }
            None => Ok(0),
        }
    }

    /// Delete everything in the backing store
    ///
    /// The only reset mechanism: stored values, counters, and history all
    /// live in the same store and go together.
    pub fn flush(&self) -> Result<()> {
        self.store.flush_all()
    }

    /// Get a handle to the backing store (e.g. for [`crate::Replay`])
    pub fn backend(&self) -> Arc<dyn KeyValueStore> {
        Arc::clone(&self.store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn cache() -> Cache {
        Cache::new(Arc::new(MemoryStore::new()))
    }

    #[test]
    fn test_roundtrip_bytes() {
        let cache = cache();

        let key = cache.store(b"foo".to_vec()).unwrap();
        assert_eq!(cache.get_raw(&key).unwrap(), Some(b"foo".to_vec()));
    }

    #[test]
    fn test_roundtrip_text() {
        let cache = cache();

        let key = cache.store("bar").unwrap();
        assert_eq!(cache.get_text(&key).unwrap(), Some("bar".to_string()));
    }

    #[test]
    fn test_roundtrip_int() {
        let cache = cache();

        let key = cache.store(123i64).unwrap();
        assert_eq!(cache.get_int(&key).unwrap(), Some(123));
    }

    #[test]
    fn test_roundtrip_float() {
        let cache = cache();

        let key = cache.store(2.5f64).unwrap();
        let got = cache
            .get(&key, |b| String::from_utf8(b).unwrap().parse::<f64>().unwrap())
            .unwrap();
        assert_eq!(got, Some(2.5));
    }

    #[test]
    fn test_get_transform() {
        let cache = cache();

        let key = cache.store("bar").unwrap();
        let got = cache
            .get(&key, |b| String::from_utf8(b).unwrap())
            .unwrap();
        assert_eq!(got, Some("bar".to_string()));
    }

    #[test]
    fn test_absent_key() {
        let cache = cache();

        assert_eq!(cache.get_raw("missing").unwrap(), None);
        assert_eq!(cache.get_text("missing").unwrap(), None);
        assert_eq!(cache.get_int("missing").unwrap(), None);
        // Transform not invoked on absent keys
        let got = cache.get("missing", |_| panic!("transform ran")).unwrap();
        assert_eq!(got, None::<()>);
    }

    #[test]
    fn test_get_int_parse_error() {
        let cache = cache();

        let key = cache.store("not a number").unwrap();
        assert!(matches!(cache.get_int(&key), Err(Error::Parse(_))));
    }

    #[test]
    fn test_call_counter() {
        let cache = cache();

        assert_eq!(cache.call_count(STORE_OP).unwrap(), 0);

        cache.store("a").unwrap();
        cache.store("b").unwrap();
        cache.store("c").unwrap();

        assert_eq!(cache.call_count(STORE_OP).unwrap(), 3);
    }

    #[test]
    fn test_call_history_alignment() {
        let store = Arc::new(MemoryStore::new());
        let cache = Cache::new(Arc::clone(&store) as Arc<dyn KeyValueStore>);

        let k1 = cache.store("foo").unwrap();
        let k2 = cache.store(42i64).unwrap();

        let inputs = store.lrange("Cache.store:inputs", 0, -1).unwrap();
        let outputs = store.lrange("Cache.store:outputs", 0, -1).unwrap();

        assert_eq!(inputs.len(), 2);
        assert_eq!(outputs.len(), 2);
        assert_eq!(inputs[0], b"(\"foo\",)");
        assert_eq!(inputs[1], b"(42,)");
        assert_eq!(outputs[0], k1.as_bytes());
        assert_eq!(outputs[1], k2.as_bytes());
    }

    #[test]
    fn test_uninstrumented() {
        let store = Arc::new(MemoryStore::new());
        let cache = Cache::with_interceptors(Arc::clone(&store) as Arc<dyn KeyValueStore>, vec![]);

        let key = cache.store("foo").unwrap();
        assert_eq!(cache.get_text(&key).unwrap(), Some("foo".to_string()));
        assert_eq!(cache.call_count(STORE_OP).unwrap(), 0);
        assert!(store.lrange("Cache.store:inputs", 0, -1).unwrap().is_empty());
    }

    #[test]
    fn test_keys_are_unique() {
        let cache = cache();

        let k1 = cache.store("same").unwrap();
        let k2 = cache.store("same").unwrap();
        assert_ne!(k1, k2);
    }

    #[test]
    fn test_flush() {
        let cache = cache();

        let key = cache.store("foo").unwrap();
        cache.flush().unwrap();

        assert_eq!(cache.get_raw(&key).unwrap(), None);
        assert_eq!(cache.call_count(STORE_OP).unwrap(), 0);
    }
}
