//! Deferred, two-phase tasks for Strand.
//!
//! Every mutating operation in Strand is handed to callers as a [`Task`]: a
//! value that can first [`estimate`](Task::estimate) its [`Cost`] and then
//! [`execute`](Task::execute) its side effect. Both phases share a mutable
//! [`Context`] scoped to the task, which execute uses to publish observable
//! results.
//!
//! Tasks compose: [`modify_task`] swaps either phase while keeping the
//! context, and [`Task::map_result`] layers post-processing over execute.
//! [`Memo`] lets both phases share a sub-computation that should only run
//! once.

pub mod context;
pub mod cost;
pub mod memo;
pub mod task;

pub use context::Context;
pub use cost::Cost;
pub use memo::Memo;
pub use task::{
    create_task, estimate_fn, execute_fn, modify_task, BoxFuture, EstimateFn, ExecuteFn,
    Operations, Overrides, Task,
};
