//! Field validation for wizard input.
//!
//! Validators are pure: they take raw input plus whatever context the rule
//! needs and return a [`ValidationResult`]. They never panic and never touch
//! wizard state; the wizard wraps them to record per-field messages.

use serde::Serialize;

use crate::models::{CourseType, Goal};

/// Maximum number of goals a course may carry.
pub const MAX_GOALS: usize = 5;

pub const SUBJECT_LEN: (usize, usize) = (3, 100);
pub const AUDIENCE_LEN: (usize, usize) = (5, 200);
pub const DURATION_LEN: (usize, usize) = (3, 100);
pub const GOAL_LEN: (usize, usize) = (10, 300);

/// The outcome of validating one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,
    pub error: Option<String>,
}

impl ValidationResult {
    pub fn ok() -> Self {
        Self {
            is_valid: true,
            error: None,
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            error: Some(message.into()),
        }
    }
}

/// Input fields that can carry a validation message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    CourseType,
    CourseSubject,
    TargetAudience,
    InstructionDuration,
    Goal,
}

impl Field {
    pub fn label(&self) -> &'static str {
        match self {
            Self::CourseType => "Course type",
            Self::CourseSubject => "Course subject",
            Self::TargetAudience => "Target audience",
            Self::InstructionDuration => "Instruction duration",
            Self::Goal => "Goal",
        }
    }
}

fn check_length(label: &str, value: &str, (min, max): (usize, usize)) -> ValidationResult {
    if value.is_empty() {
        return ValidationResult::invalid(format!("{} is required", label));
    }
    let len = value.chars().count();
    if len < min {
        return ValidationResult::invalid(format!(
            "{} must be at least {} characters",
            label, min
        ));
    }
    if len > max {
        return ValidationResult::invalid(format!(
            "{} must be no more than {} characters",
            label, max
        ));
    }
    ValidationResult::ok()
}

pub fn validate_course_type(course_type: Option<CourseType>) -> ValidationResult {
    match course_type {
        Some(_) => ValidationResult::ok(),
        None => ValidationResult::invalid("Please choose a course or a workshop"),
    }
}

pub fn validate_course_subject(raw: &str) -> ValidationResult {
    check_length(Field::CourseSubject.label(), raw.trim(), SUBJECT_LEN)
}

pub fn validate_target_audience(raw: &str) -> ValidationResult {
    check_length(Field::TargetAudience.label(), raw.trim(), AUDIENCE_LEN)
}

pub fn validate_instruction_duration(raw: &str) -> ValidationResult {
    check_length(Field::InstructionDuration.label(), raw.trim(), DURATION_LEN)
}

/// Validate a new goal against the course subject and the goals already added.
pub fn validate_goal(raw: &str, course_subject: &str, existing: &[Goal]) -> ValidationResult {
    let text = raw.trim();

    let length = check_length(Field::Goal.label(), text, GOAL_LEN);
    if !length.is_valid {
        return length;
    }

    let subject = course_subject.trim();
    if !subject.is_empty() && text.to_lowercase() == subject.to_lowercase() {
        return ValidationResult::invalid(
            "A goal should describe what learners will achieve, not restate the course subject",
        );
    }

    let lowered = text.to_lowercase();
    if existing
        .iter()
        .any(|g| g.description.trim().to_lowercase() == lowered)
    {
        return ValidationResult::invalid("This goal has already been added");
    }

    if existing.len() >= MAX_GOALS {
        return ValidationResult::invalid(format!(
            "A maximum of {} goals is allowed",
            MAX_GOALS
        ));
    }

    ValidationResult::ok()
}
