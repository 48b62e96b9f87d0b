use serde::{Deserialize, Serialize};

/// The six levels of Bloom's taxonomy, lowest to highest.
pub const BLOOM_LEVELS: [&str; 6] = [
    "Remember",
    "Understand",
    "Apply",
    "Analyze",
    "Evaluate",
    "Create",
];

/// A measurable objective supporting one goal.
///
/// `bloom_level` is kept as free text: the AI's label is trusted verbatim and
/// is not forced into [`BLOOM_LEVELS`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LearningObjective {
    pub id: u64,
    pub goal_id: u64,
    pub bloom_level: String,
    pub description: String,
    /// Description of the assessment this objective is measured by.
    pub assessment_alignment: String,
}

/// Map a verb at the start of an objective to its Bloom level.
///
/// Level names themselves are accepted as verbs ("Apply", "Analyze", ...).
pub fn bloom_level_for_verb(word: &str) -> Option<&'static str> {
    let word = word
        .trim_matches(|c: char| !c.is_alphanumeric())
        .to_lowercase();

    let level = match word.as_str() {
        "remember" | "define" | "list" | "recall" | "identify" | "name" | "recognize"
        | "state" => "Remember",
        "understand" | "explain" | "describe" | "summarize" | "classify" | "interpret"
        | "discuss" => "Understand",
        "apply" | "use" | "implement" | "execute" | "demonstrate" | "solve" | "operate" => {
            "Apply"
        }
        "analyze" | "analyse" | "compare" | "contrast" | "differentiate" | "examine"
        | "troubleshoot" | "diagnose" => "Analyze",
        "evaluate" | "assess" | "justify" | "critique" | "judge" | "defend" => "Evaluate",
        "create" | "design" | "develop" | "construct" | "produce" | "build" | "compose" => {
            "Create"
        }
        _ => return None,
    };
    Some(level)
}
