use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Keyed mutexes giving per-record linearizability over any store backend.
///
/// Operations lock the remittance code first, then the accounts they touch
/// in sorted order, so two operations on the same record serialize while
/// unrelated records proceed independently. Locks are created on demand and
/// kept for the registry's lifetime (keys are codes and account addresses,
/// which are never recycled).
#[derive(Default)]
pub struct LockRegistry {
    inner: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl LockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, key: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut map = self.inner.lock().expect("lock registry poisoned");
            Arc::clone(map.entry(key.to_string()).or_default())
        };
        lock.lock_owned().await
    }

    /// Acquires several keys in sorted order, deduplicated, to keep lock
    /// acquisition deadlock-free across concurrent operations.
    pub async fn acquire_all(&self, keys: &mut Vec<String>) -> Vec<OwnedMutexGuard<()>> {
        keys.sort();
        keys.dedup();
        let mut guards = Vec::with_capacity(keys.len());
        for key in keys.iter() {
            guards.push(self.acquire(key).await);
        }
        guards
    }
}

/// Lock key for a remittance code.
pub fn code_key(code: &str) -> String {
    format!("code:{code}")
}

/// Lock key for an account address.
pub fn account_key(account: &crate::domain::account::Address) -> String {
    format!("acct:{account}")
}
