//! Task types.
//!
//! Tasks are pushed by the service and collected client-side in arrival
//! order. They are immutable once received; identity is positional.

use serde::{Deserialize, Serialize};

/// A task pushed by the Igor service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Human-readable task description.
    pub text: String,

    /// Routing category.
    pub category: TaskCategory,
}

impl Task {
    pub fn new(text: impl Into<String>, category: TaskCategory) -> Self {
        Self {
            text: text.into(),
            category,
        }
    }
}

/// Task category.
///
/// The wire form is the lowercase tag. A frame carrying any other
/// category string fails to decode and is dropped as malformed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskCategory {
    /// Directly executable.
    Actionable,
    /// Needs investigation first.
    Research,
    /// Scheduled for later.
    Reminder,
}

impl std::fmt::Display for TaskCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Actionable => write!(f, "actionable"),
            Self::Research => write!(f, "research"),
            Self::Reminder => write!(f, "reminder"),
        }
    }
}
