use std::future::Future;
use std::sync::Arc;

use tokio::sync::OnceCell;

/// A value computed at most once and shared by every clone.
///
/// Used to let a task's `estimate` and `execute` phases share an expensive
/// sub-computation (a fee simulation, say) without re-running it. A failed
/// initialization leaves the memo empty, so the next caller retries.
pub struct Memo<T> {
    cell: Arc<OnceCell<T>>,
}

impl<T: Clone> Memo<T> {
    pub fn new() -> Self {
        Self {
            cell: Arc::new(OnceCell::new()),
        }
    }

    /// Return the cached value, running `init` if there is none yet.
    pub async fn get_or_try_init<E, F, Fut>(&self, init: F) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.cell.get_or_try_init(init).await.cloned()
    }

    pub fn get(&self) -> Option<T> {
        self.cell.get().cloned()
    }
}

impl<T: Clone> Default for Memo<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for Memo<T> {
    fn clone(&self) -> Self {
        Self {
            cell: Arc::clone(&self.cell),
        }
    }
}
