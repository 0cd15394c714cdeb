use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

/// Mutable state shared by the phases of one task.
///
/// Cloning a `Context` clones the handle, not the state: every clone sees
/// every mutation. The lock is only ever held inside the closures passed to
/// [`read`](Self::read) and [`update`](Self::update), never across an
/// `.await`, so the task phases themselves are not serialized against each
/// other.
pub struct Context<C> {
    inner: Arc<RwLock<C>>,
}

impl<C> Context<C> {
    pub fn new(initial: C) -> Self {
        Self {
            inner: Arc::new(RwLock::new(initial)),
        }
    }

    /// Run `f` against the current state.
    pub fn read<T>(&self, f: impl FnOnce(&C) -> T) -> T {
        let guard = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        f(&guard)
    }

    /// Run `f` against the current state with write access.
    pub fn update<T>(&self, f: impl FnOnce(&mut C) -> T) -> T {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }

    /// A copy of the current state.
    pub fn snapshot(&self) -> C
    where
        C: Clone,
    {
        self.read(C::clone)
    }

    /// Returns `true` if both handles point at the same state.
    pub fn shares_state_with(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<C> Clone for Context<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<C: Default> Default for Context<C> {
    fn default() -> Self {
        Self::new(C::default())
    }
}

impl<C: fmt::Debug> fmt::Debug for Context<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.read(|state| f.debug_tuple("Context").field(state).finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_state() {
        let a = Context::new(1u32);
        let b = a.clone();
        b.update(|n| *n += 1);
        assert_eq!(a.snapshot(), 2);
        assert!(a.shares_state_with(&b));
    }

    #[test]
    fn independent_contexts_do_not_share() {
        let a = Context::new(0u32);
        let b = Context::new(0u32);
        a.update(|n| *n = 5);
        assert_eq!(b.snapshot(), 0);
        assert!(!a.shares_state_with(&b));
    }

    #[test]
    fn update_returns_closure_value() {
        let ctx = Context::new(vec![1, 2, 3]);
        let popped = ctx.update(|v| v.pop());
        assert_eq!(popped, Some(3));
        assert_eq!(ctx.read(Vec::len), 2);
    }
}
