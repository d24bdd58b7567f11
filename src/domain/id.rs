//! Task identifiers
//!
//! ID Format: `t-{sequence}` (e.g., `t-1`, `t-42`)
//!
//! Sequences are allocated by the owning [`TaskGraph`](super::TaskGraph)
//! from a monotonically increasing counter and are never reused while
//! that graph is alive. A bare number (`42`) is accepted when parsing.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum IdError {
    #[error("Invalid task ID format: expected 't-{{sequence}}', got '{0}'")]
    InvalidTaskId(String),

    #[error("Invalid sequence number: {0}")]
    InvalidSequence(String),
}

/// Opaque, process-unique task identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TaskId(u64);

impl TaskId {
    /// Wraps a raw sequence number
    pub(crate) fn from_sequence(sequence: u64) -> Self {
        Self(sequence)
    }

    /// Returns the sequence number
    pub fn sequence(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t-{}", self.0)
    }
}

impl FromStr for TaskId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let digits = s.strip_prefix("t-").unwrap_or(s);

        if digits.is_empty() {
            return Err(IdError::InvalidTaskId(s.to_string()));
        }
        if !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(IdError::InvalidTaskId(s.to_string()));
        }

        let sequence = digits
            .parse::<u64>()
            .map_err(|_| IdError::InvalidSequence(digits.to_string()))?;

        // Allocation starts at 1
        if sequence == 0 {
            return Err(IdError::InvalidSequence(digits.to_string()));
        }

        Ok(Self(sequence))
    }
}

impl TryFrom<String> for TaskId {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TaskId> for String {
    fn from(id: TaskId) -> Self {
        id.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_id_format_is_correct() {
        assert_eq!(TaskId::from_sequence(7).to_string(), "t-7");
    }

    #[test]
    fn task_id_parses_prefixed_and_bare() {
        assert_eq!("t-12".parse::<TaskId>().unwrap(), TaskId::from_sequence(12));
        assert_eq!(" 12 ".parse::<TaskId>().unwrap(), TaskId::from_sequence(12));
    }

    #[test]
    fn task_id_rejects_invalid_format() {
        assert!(matches!("".parse::<TaskId>(), Err(IdError::InvalidTaskId(_))));
        assert!(matches!("t-".parse::<TaskId>(), Err(IdError::InvalidTaskId(_))));
        assert!(matches!("a-1".parse::<TaskId>(), Err(IdError::InvalidTaskId(_))));
        assert!(matches!("t-1x".parse::<TaskId>(), Err(IdError::InvalidTaskId(_))));
        assert!(matches!("t-0".parse::<TaskId>(), Err(IdError::InvalidSequence(_))));
    }

    #[test]
    fn task_id_rejects_overflow() {
        let huge = format!("t-{}0", u64::MAX);
        assert!(matches!(huge.parse::<TaskId>(), Err(IdError::InvalidSequence(_))));
    }

    #[test]
    fn task_id_orders_by_sequence() {
        assert!(TaskId::from_sequence(2) < TaskId::from_sequence(10));
    }

    #[test]
    fn task_id_serializes_as_string() {
        let json = serde_json::to_string(&TaskId::from_sequence(3)).unwrap();
        assert_eq!(json, "\"t-3\"");

        let parsed: TaskId = serde_json::from_str("\"t-3\"").unwrap();
        assert_eq!(parsed, TaskId::from_sequence(3));
    }
}
