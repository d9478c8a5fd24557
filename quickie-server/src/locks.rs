//! Per-session mutual exclusion for the history read-modify-write

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::{Arc, Weak};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// One async lock per session token.
///
/// Serializes concurrent sends that carry the same token inside this
/// process. Entries are held weakly and pruned once no request holds or
/// waits on them. Separate processes sharing one cache still race with
/// last-writer-wins semantics.
#[derive(Default)]
pub struct SessionLocks {
    inner: Mutex<HashMap<String, Weak<AsyncMutex<()>>>>,
}

impl SessionLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `token`
    pub async fn acquire(&self, token: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut map = self.inner.lock();
            match map.get(token).and_then(Weak::upgrade) {
                Some(lock) => lock,
                None => {
                    map.retain(|_, weak| weak.strong_count() > 0);
                    let lock = Arc::new(AsyncMutex::new(()));
                    map.insert(token.to_string(), Arc::downgrade(&lock));
                    lock
                }
            }
        };
        lock.lock_owned().await
    }

    /// Tokens with a live lock
    pub fn active(&self) -> usize {
        self.inner
            .lock()
            .values()
            .filter(|weak| weak.strong_count() > 0)
            .count()
    }
}
