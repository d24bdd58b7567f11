//! taskgraph - in-memory task bookkeeping with an acyclic dependency graph
//!
//! Tasks carry a title, assignee, priority and deadline and may depend on
//! one another. [`TaskGraph`] owns them, refuses any edge that would form
//! a cycle, gates status changes on dependency completion and produces a
//! deterministic execution order.

pub mod cli;
pub mod domain;
pub mod logging;
pub mod storage;

pub use domain::{GraphError, Priority, SharedTaskGraph, Task, TaskGraph, TaskId, TaskStatus};
