//! Smoke test against a live Redis server
//!
//! Ignored by default; run with `cargo test -- --ignored` while a server is
//! listening on the default local address. Flushes the target database.

use std::sync::Arc;

use kvtrace::{Cache, KeyValueStore, RedisStore, Replay, STORE_OP};

#[test]
#[ignore]
fn live_roundtrip_and_replay() {
    let store: Arc<dyn KeyValueStore> =
        Arc::new(RedisStore::connect_default().expect("server not reachable"));
    store.flush_all().unwrap();

    let cache = Cache::new(Arc::clone(&store));

    let k1 = cache.store(b"foo".to_vec()).unwrap();
    assert_eq!(cache.get_raw(&k1).unwrap(), Some(b"foo".to_vec()));

    let k2 = cache.store(123i64).unwrap();
    assert_eq!(cache.get_int(&k2).unwrap(), Some(123));

    let k3 = cache.store("bar").unwrap();
    assert_eq!(cache.get_text(&k3).unwrap(), Some("bar".to_string()));

    assert_eq!(cache.call_count(STORE_OP).unwrap(), 3);

    let trace = Replay::new(store).trace(STORE_OP).unwrap();
    assert!(trace.starts_with("Cache.store was called 3 times:"));
    assert_eq!(trace.lines().count(), 4);
}
