use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// One async mutex per handle, created on first use.
#[derive(Debug, Default)]
pub(crate) struct HandleLocks {
    locks: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl HandleLocks {
    pub async fn acquire(&self, handle: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(locks.entry(handle.to_string()).or_default())
        };
        lock.lock_owned().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn same_handle_is_exclusive() {
        let locks = HandleLocks::default();
        let guard = locks.acquire("news").await;
        let blocked = tokio::time::timeout(Duration::from_millis(20), locks.acquire("news")).await;
        assert!(blocked.is_err());
        drop(guard);
        let _again = locks.acquire("news").await;
    }

    #[tokio::test]
    async fn different_handles_do_not_block() {
        let locks = HandleLocks::default();
        let _a = locks.acquire("a").await;
        let _b = tokio::time::timeout(Duration::from_millis(20), locks.acquire("b"))
            .await
            .unwrap();
    }
}
