use serde::{Deserialize, Serialize};

/// An assessment strategy measuring one goal.
///
/// After generation there is exactly one assessment per approved goal, with
/// `goal_id` pointing at that goal.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Assessment {
    pub id: u64,
    pub goal_id: u64,
    /// One or more strategies, rendered as Markdown paragraphs.
    pub description: String,
    #[serde(default)]
    pub is_refined: bool,
}
