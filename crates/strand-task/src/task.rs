use std::borrow::Cow;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tracing::debug;

use crate::context::Context;
use crate::cost::Cost;

/// A boxed, sendable future.
pub type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send + 'static>>;

/// The estimate phase of a task: price the work without doing it.
pub type EstimateFn<C, E> = Arc<dyn Fn(Context<C>) -> BoxFuture<Result<Cost, E>> + Send + Sync>;

/// The execute phase of a task: do the work, possibly mutating the context.
pub type ExecuteFn<C, R, E> = Arc<dyn Fn(Context<C>) -> BoxFuture<Result<R, E>> + Send + Sync>;

/// Box an async closure into an [`EstimateFn`].
pub fn estimate_fn<C, E, F, Fut>(f: F) -> EstimateFn<C, E>
where
    C: 'static,
    E: 'static,
    F: Fn(Context<C>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Cost, E>> + Send + 'static,
{
    Arc::new(move |ctx: Context<C>| -> BoxFuture<Result<Cost, E>> { Box::pin(f(ctx)) })
}

/// Box an async closure into an [`ExecuteFn`].
pub fn execute_fn<C, R, E, F, Fut>(f: F) -> ExecuteFn<C, R, E>
where
    C: 'static,
    R: 'static,
    E: 'static,
    F: Fn(Context<C>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<R, E>> + Send + 'static,
{
    Arc::new(move |ctx: Context<C>| -> BoxFuture<Result<R, E>> { Box::pin(f(ctx)) })
}

/// The pair of phases a task is created from.
pub struct Operations<C, R, E> {
    estimate: EstimateFn<C, E>,
    execute: ExecuteFn<C, R, E>,
}

impl<C: 'static, R: 'static, E: 'static> Operations<C, R, E> {
    pub fn new<Fe, FeFut, Fx, FxFut>(estimate: Fe, execute: Fx) -> Self
    where
        Fe: Fn(Context<C>) -> FeFut + Send + Sync + 'static,
        FeFut: Future<Output = Result<Cost, E>> + Send + 'static,
        Fx: Fn(Context<C>) -> FxFut + Send + Sync + 'static,
        FxFut: Future<Output = Result<R, E>> + Send + 'static,
    {
        Self {
            estimate: estimate_fn(estimate),
            execute: execute_fn(execute),
        }
    }

    /// Operations whose estimate is always [`Cost::ZERO`] (pure reads).
    pub fn free<Fx, FxFut>(execute: Fx) -> Self
    where
        Fx: Fn(Context<C>) -> FxFut + Send + Sync + 'static,
        FxFut: Future<Output = Result<R, E>> + Send + 'static,
    {
        Self::new(|_| async { Ok(Cost::ZERO) }, execute)
    }
}

/// Replacement phases for [`modify_task`]. Unset phases are inherited.
pub struct Overrides<C, R, E> {
    estimate: Option<EstimateFn<C, E>>,
    execute: Option<ExecuteFn<C, R, E>>,
}

impl<C, R, E> Overrides<C, R, E> {
    pub fn new() -> Self {
        Self {
            estimate: None,
            execute: None,
        }
    }
}

impl<C: 'static, R: 'static, E: 'static> Overrides<C, R, E> {
    pub fn estimate<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(Context<C>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Cost, E>> + Send + 'static,
    {
        self.estimate = Some(estimate_fn(f));
        self
    }

    pub fn execute<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(Context<C>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, E>> + Send + 'static,
    {
        self.execute = Some(execute_fn(f));
        self
    }
}

impl<C, R, E> Default for Overrides<C, R, E> {
    fn default() -> Self {
        Self::new()
    }
}

/// A deferred, two-phase unit of work.
///
/// [`estimate`](Self::estimate) prices the work and must not have visible
/// side effects; [`execute`](Self::execute) performs it, every time it is
/// called. Both phases receive the same [`Context`], which is how execute
/// publishes observable results (a committed pointer, written addresses).
///
/// A task does not lock across phases: running `execute` concurrently on
/// the same instance (or on tasks derived from it) races on the context.
pub struct Task<C, R, E> {
    label: Cow<'static, str>,
    context: Context<C>,
    estimate: EstimateFn<C, E>,
    execute: ExecuteFn<C, R, E>,
}

/// Create a task from its phases and an initial context value.
pub fn create_task<C, R, E>(operations: Operations<C, R, E>, initial: C) -> Task<C, R, E> {
    Task {
        label: Cow::Borrowed("task"),
        context: Context::new(initial),
        estimate: operations.estimate,
        execute: operations.execute,
    }
}

/// Derive a task that shares `task`'s context but swaps in the given phases.
pub fn modify_task<C, R, E>(task: &Task<C, R, E>, overrides: Overrides<C, R, E>) -> Task<C, R, E> {
    Task {
        label: task.label.clone(),
        context: task.context.clone(),
        estimate: overrides
            .estimate
            .unwrap_or_else(|| Arc::clone(&task.estimate)),
        execute: overrides
            .execute
            .unwrap_or_else(|| Arc::clone(&task.execute)),
    }
}

impl<C, R, E> Task<C, R, E> {
    /// Name used in tracing events.
    pub fn labelled(mut self, label: impl Into<Cow<'static, str>>) -> Self {
        self.label = label.into();
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn context(&self) -> &Context<C> {
        &self.context
    }

    /// Price the work.
    pub async fn estimate(&self) -> Result<Cost, E> {
        let cost = (self.estimate)(self.context.clone()).await;
        if let Ok(cost) = &cost {
            debug!(task = %self.label, %cost, "task estimated");
        }
        cost
    }

    /// Perform the work.
    pub async fn execute(&self) -> Result<R, E> {
        debug!(task = %self.label, "task executing");
        let result = (self.execute)(self.context.clone()).await;
        debug!(task = %self.label, ok = result.is_ok(), "task finished");
        result
    }

    /// Shorthand for [`modify_task`].
    pub fn modify(&self, overrides: Overrides<C, R, E>) -> Self {
        modify_task(self, overrides)
    }

    /// Derive a task whose execute post-processes this task's result.
    ///
    /// The estimate phase and the context are shared with `self`.
    pub fn map_result<R2, F>(&self, f: F) -> Task<C, R2, E>
    where
        C: Send + Sync + 'static,
        R: Send + 'static,
        E: Send + 'static,
        R2: Send + 'static,
        F: Fn(R, &Context<C>) -> R2 + Send + Sync + 'static,
    {
        let inner = Arc::clone(&self.execute);
        let f = Arc::new(f);
        let execute = execute_fn(move |ctx: Context<C>| {
            let inner = Arc::clone(&inner);
            let f = Arc::clone(&f);
            async move {
                let raw = inner(ctx.clone()).await?;
                Ok(f(raw, &ctx))
            }
        });
        Task {
            label: self.label.clone(),
            context: self.context.clone(),
            estimate: Arc::clone(&self.estimate),
            execute,
        }
    }
}

impl<C, R, E> Clone for Task<C, R, E> {
    fn clone(&self) -> Self {
        Self {
            label: self.label.clone(),
            context: self.context.clone(),
            estimate: Arc::clone(&self.estimate),
            execute: Arc::clone(&self.execute),
        }
    }
}

impl<C, R, E> fmt::Debug for Task<C, R, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task").field("label", &self.label).finish_non_exhaustive()
    }
}
