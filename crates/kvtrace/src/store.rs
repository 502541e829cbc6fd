//! Key-value store backends
//!
//! `KeyValueStore` is the seam between the cache layer and the store it
//! delegates to. `RedisStore` talks to a real server over the `redis`
//! client; `MemoryStore` keeps the same command semantics in-process.

use ahash::AHashMap;
use parking_lot::{Mutex, RwLock};
use redis::Commands;
use tracing::{debug, info};

use crate::error::{Error, Result};

/// Default server address used by [`RedisStore::connect_default`]
pub const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379";

/// Minimal command set the cache layer needs from a backing store
///
/// Each method maps to one store command and is atomic per call; the trait
/// makes no guarantee across calls. Absent keys are `Ok(None)` / empty
/// results, never errors.
pub trait KeyValueStore: Send + Sync {
    /// Set `key` to `value`, overwriting any existing entry
    fn set(&self, key: &str, value: &[u8]) -> Result<()>;

    /// Get the value for `key`, or `None` if absent
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Increment the integer at `key` by one, creating it at zero first
    ///
    /// # Returns
    /// * `Result<i64>` - The value after the increment
    fn incr(&self, key: &str) -> Result<i64>;

    /// Append `value` to the list at `key`, creating the list if absent
    ///
    /// # Returns
    /// * `Result<i64>` - The list length after the push
    fn rpush(&self, key: &str, value: &[u8]) -> Result<i64>;

    /// Return list elements between `start` and `stop` inclusive
    ///
    /// Negative indices count from the end, as in the LRANGE command.
    /// An absent key yields an empty list.
    fn lrange(&self, key: &str, start: isize, stop: isize) -> Result<Vec<Vec<u8>>>;

    /// Delete every key in the store
    fn flush_all(&self) -> Result<()>;
}

/// Store backed by a Redis server over a synchronous connection
///
/// The single connection is shared behind a mutex, so calls from multiple
/// threads serialize. Connection failures surface as
/// [`Error::StoreUnavailable`]; no retry is attempted.
pub struct RedisStore {
    conn: Mutex<redis::Connection>,
}

impl RedisStore {
    /// Connect to a Redis server
    ///
    /// # Arguments
    /// * `url` - Connection string, e.g. `redis://127.0.0.1:6379`
    ///
    /// # Returns
    /// * `Result<RedisStore>` - Connected store handle
    pub fn connect(url: &str) -> Result<Self> {
        let client = redis::Client::open(url)?;
        let conn = client.get_connection()?;
        info!("Connected to key-value store at {}", url);

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Connect to the default local server address
    pub fn connect_default() -> Result<Self> {
        Self::connect(DEFAULT_REDIS_URL)
    }
}

impl KeyValueStore for RedisStore {
    fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        let mut conn = self.conn.lock();
        conn.set::<_, _, ()>(key, value)?;
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let mut conn = self.conn.lock();
        let value: Option<Vec<u8>> = conn.get(key)?;
        Ok(value)
    }

    fn incr(&self, key: &str) -> Result<i64> {
        let mut conn = self.conn.lock();
        let count: i64 = conn.incr(key, 1)?;
        Ok(count)
    }

    fn rpush(&self, key: &str, value: &[u8]) -> Result<i64> {
        let mut conn = self.conn.lock();
        let len: i64 = conn.rpush(key, value)?;
        Ok(len)
    }

    fn lrange(&self, key: &str, start: isize, stop: isize) -> Result<Vec<Vec<u8>>> {
        let mut conn = self.conn.lock();
        let items: Vec<Vec<u8>> = conn.lrange(key, start, stop)?;
        Ok(items)
    }

    fn flush_all(&self) -> Result<()> {
        let mut conn = self.conn.lock();
        debug!("Flushing all keys");
        redis::cmd("FLUSHALL").query::<()>(&mut *conn)?;
        Ok(())
    }
}

/// A key maps to either a byte string or a list, never both
#[derive(Debug, Clone)]
enum Entry {
    Str(Vec<u8>),
    List(Vec<Vec<u8>>),
}

/// In-process store with Redis command semantics
///
/// Used by the test suite and usable as an embedded backend. Keys hold
/// either a string or a list; commands against the wrong kind fail with
/// WRONGTYPE, mirroring the server's behavior.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<AHashMap<String, Entry>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    fn wrong_type() -> Error {
        Error::Backend(
            "WRONGTYPE Operation against a key holding the wrong kind of value".to_string(),
        )
    }
}

impl KeyValueStore for MemoryStore {
    fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        let mut entries = self.entries.write();
        // SET overwrites regardless of the previous entry kind
        entries.insert(key.to_string(), Entry::Str(value.to_vec()));
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let entries = self.entries.read();
        match entries.get(key) {
            Some(Entry::Str(value)) => Ok(Some(value.clone())),
            Some(Entry::List(_)) => Err(Self::wrong_type()),
            None => Ok(None),
        }
    }

    fn incr(&self, key: &str) -> Result<i64> {
        let mut entries = self.entries.write();
        let current = match entries.get(key) {
            Some(Entry::Str(value)) => std::str::from_utf8(value)
                .ok()
                .and_then(|s| s.parse::<i64>().ok())
                .ok_or_else(|| {
                    Error::Backend("value is not an integer or out of range".to_string())
                })?,
            Some(Entry::List(_)) => return Err(Self::wrong_type()),
            None => 0,
        };

        let next = current + 1;
        entries.insert(key.to_string(), Entry::Str(next.to_string().into_bytes()));
        Ok(next)
    }

    fn rpush(&self, key: &str, value: &[u8]) -> Result<i64> {
        let mut entries = self.entries.write();
        match entries
            .entry(key.to_string())
            .or_insert_with(|| Entry::List(Vec::new()))
        {
            Entry::List(items) => {
                items.push(value.to_vec());
                Ok(items.len() as i64)
            }
            Entry::Str(_) => Err(Self::wrong_type()),
        }
    }

    fn lrange(&self, key: &str, start: isize, stop: isize) -> Result<Vec<Vec<u8>>> {
        let entries = self.entries.read();
        let items = match entries.get(key) {
            Some(Entry::List(items)) => items,
            Some(Entry::Str(_)) => return Err(Self::wrong_type()),
            None => return Ok(Vec::new()),
        };

        // LRANGE index rules: negatives count from the end, out-of-range
        // bounds clamp, inverted ranges are empty
        let len = items.len() as isize;
        let mut start = if start < 0 { len + start } else { start };
        let mut stop = if stop < 0 { len + stop } else { stop };
        if start < 0 {
            start = 0;
        }
        if stop >= len {
            stop = len - 1;
        }
        if len == 0 || start > stop {
            return Ok(Vec::new());
        }

        Ok(items[start as usize..=stop as usize].to_vec())
    }

    fn flush_all(&self) -> Result<()> {
        let mut entries = self.entries.write();
        debug!("Flushing all keys");
        entries.clear();
        Ok(())
    }
}
