//! Domain models for taskgraph
//!
//! Contains the task graph and its invariant-preserving operations
//! without any I/O concerns.

mod error;
mod graph;
mod id;
mod shared;
mod task;

pub use error::GraphError;
pub use graph::{AssigneeSummary, Column, TaskGraph};
pub use id::{IdError, TaskId};
pub use shared::SharedTaskGraph;
pub use task::{Priority, Task, TaskStatus, TaskUpdate};
