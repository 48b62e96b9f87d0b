use serde::{Deserialize, Serialize};

/// Whether the instruction is a full course or a short workshop.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CourseType {
    Course,
    Workshop,
}

impl CourseType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Course => "course",
            Self::Workshop => "workshop",
        }
    }
}

/// Configuration of the instruction being planned.
///
/// Created once during setup and threaded into every prompt. The instructor
/// may re-edit and reconfirm it, but nothing else mutates it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CourseContext {
    pub course_type: CourseType,
    pub course_subject: String,
    pub target_audience: String,
    pub instruction_duration: String,
}

impl CourseContext {
    /// "course" or "workshop", as used in prompt wording.
    pub fn kind(&self) -> &'static str {
        self.course_type.as_str()
    }
}
