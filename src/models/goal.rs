use serde::{Deserialize, Serialize};

/// A learning goal for the course.
///
/// Goals start as instructor input and are replaced wholesale when the AI
/// refines them or the instructor approves them. Identity is the `id`; the
/// description may be rewritten by the refinement heuristics.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub id: u64,
    pub description: String,
    /// Set once the goal has passed through the refinement stage, whether the
    /// AI rewrote it or it was carried over unchanged.
    #[serde(default)]
    pub is_refined: bool,
}

impl Goal {
    pub fn new(id: u64, description: impl Into<String>) -> Self {
        Self {
            id,
            description: description.into(),
            is_refined: false,
        }
    }

    pub fn refined(id: u64, description: impl Into<String>) -> Self {
        Self {
            id,
            description: description.into(),
            is_refined: true,
        }
    }
}
