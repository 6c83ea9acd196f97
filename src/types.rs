/// Shared types used across the codebase

use serde::{Deserialize, Serialize};
use std::fmt;

/// Server-assigned task identifier. Drawn from a monotonic sequence and never reused.
pub type TaskId = i64;

/// Identity of the user that owns a set of tasks.
///
/// Every store operation takes one of these as its first argument. Request
/// handlers only obtain an `OwnerId` from the authorization guard, which builds
/// it from the verified token subject.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(String);

impl OwnerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Parse a task id taken from a request path. Only the canonical decimal form of
/// a positive integer is accepted, so each task has exactly one path.
pub fn parse_task_id(raw: &str) -> Option<TaskId> {
    if raw.is_empty() || raw.starts_with('0') || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse::<TaskId>().ok()
}
