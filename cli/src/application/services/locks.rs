//! Per-VM-name serialization of lifecycle operations.
//!
//! Two transitions on the same VM must never interleave: each one reads the
//! record, runs a hypervisor command and writes the record back. Operations on
//! different names proceed independently.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Registry of one async mutex per VM name.
#[derive(Default)]
pub struct NameLocks {
    inner: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl NameLocks {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `name`. Released when the guard drops.
    pub async fn acquire(&self, name: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut map = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
            // Entries only the registry still references are idle.
            map.retain(|_, l| Arc::strong_count(l) > 1);
            Arc::clone(map.entry(name.to_string()).or_default())
        };
        lock.lock_owned().await
    }

    /// Number of names currently locked or awaited.
    #[cfg(test)]
    fn active(&self) -> usize {
        let map = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        map.values().filter(|l| Arc::strong_count(l) > 1).count()
    }
}
