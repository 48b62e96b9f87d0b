//! Deterministic content used when an AI reply yields nothing usable.

use super::strip_prefix_ci;
use crate::models::Goal;

/// Broad subject area, chosen by keyword from the course subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubjectArea {
    ThreeDPrinting,
    Programming,
    Design,
    Science,
    Math,
    Writing,
    General,
}

impl SubjectArea {
    pub fn detect(course_subject: &str) -> Self {
        let s = course_subject.to_lowercase();
        let has = |words: &[&str]| words.iter().any(|w| s.contains(w));

        if has(&["3d print", "3-d print", "additive manufacturing"]) {
            Self::ThreeDPrinting
        } else if has(&[
            "programming",
            "coding",
            "code",
            "software",
            "python",
            "javascript",
            "computer science",
        ]) {
            Self::Programming
        } else if has(&["design"]) {
            Self::Design
        } else if has(&["science", "biology", "chemistry", "physics", "ecology"]) {
            Self::Science
        } else if has(&["math", "algebra", "calculus", "geometry", "statistics"]) {
            Self::Math
        } else if has(&["writing", "english", "composition", "literature"]) {
            Self::Writing
        } else {
            Self::General
        }
    }
}

/// The goal reduced to a verb phrase: "Students will be able to X." becomes "x".
pub fn outcome_phrase(goal: &str) -> String {
    let trimmed = goal.trim();
    let phrase = [
        "students will be able to ",
        "learners will be able to ",
        "participants will be able to ",
        "students will ",
        "learners will ",
        "participants will ",
    ]
    .iter()
    .find_map(|stem| strip_prefix_ci(trimmed, stem))
    .unwrap_or(trimmed)
    .trim_end_matches('.')
    .trim();

    let mut chars = phrase.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Canned assessment strategies for one goal.
pub fn assessment_template(course_subject: &str, goal: &Goal) -> String {
    let phrase = outcome_phrase(&goal.description);
    let (first, second) = match SubjectArea::detect(course_subject) {
        SubjectArea::ThreeDPrinting => (
            format!(
                "**Print Project**: Learners model, slice and print a part that shows they can {}. \
                 The print and its slicer settings are checked against a rubric for accuracy and finish.",
                phrase
            ),
            "**Troubleshooting Log**: Learners record one failed or flawed print, identify the cause, \
             and document the settings change that fixed it."
                .to_string(),
        ),
        SubjectArea::Programming => (
            format!(
                "**Coding Project**: Learners write a small working program that shows they can {}. \
                 The code is run against test cases and reviewed for correctness and readability.",
                phrase
            ),
            "**Code Walkthrough**: Learners explain their solution line by line to a peer or the \
             instructor and answer questions about the choices they made."
                .to_string(),
        ),
        SubjectArea::Design => (
            format!(
                "**Design Portfolio Piece**: Learners produce a design that shows they can {}, \
                 assessed with a rubric covering the brief, process and final quality.",
                phrase
            ),
            "**Critique Session**: Learners present their work, respond to structured peer feedback, \
             and submit a short revision plan."
                .to_string(),
        ),
        SubjectArea::Science => (
            format!(
                "**Lab Investigation**: Learners plan and carry out an investigation that shows they can {}, \
                 then submit a lab report with data, analysis and conclusions.",
                phrase
            ),
            "**Concept Check**: A short quiz with applied scenarios confirms understanding of the \
             underlying principles."
                .to_string(),
        ),
        SubjectArea::Math => (
            format!(
                "**Problem Set**: Learners solve a graded set of problems that shows they can {}, \
                 showing all working.",
                phrase
            ),
            "**Explain Your Reasoning**: Learners choose one problem and write or record an explanation \
             of the method and why it works."
                .to_string(),
        ),
        SubjectArea::Writing => (
            format!(
                "**Writing Assignment**: Learners draft and revise a piece that shows they can {}, \
                 assessed with a rubric for purpose, organization and style.",
                phrase
            ),
            "**Peer Review**: Learners exchange drafts, give feedback using a checklist, and reflect on \
             the changes they made."
                .to_string(),
        ),
        SubjectArea::General => (
            format!(
                "**Applied Project**: Learners complete a practical task that shows they can {}, \
                 assessed with a clear rubric shared in advance.",
                phrase
            ),
            "**Reflection**: Learners write a short reflection on what they learned, what was difficult, \
             and how they would apply it next time."
                .to_string(),
        ),
    };
    format!("{}\n\n{}", first, second)
}

/// Canned `(bloom level, description)` objectives for one goal.
///
/// Two or three per goal, at the Apply/Analyze/Evaluate levels, adjusted by
/// keywords in the goal text.
pub fn objective_templates(goal: &Goal) -> Vec<(&'static str, String)> {
    let lowered = goal.description.to_lowercase();
    let phrase = outcome_phrase(&goal.description);

    if lowered.contains("troubleshoot") {
        vec![
            (
                "Analyze",
                format!("Diagnose the likely causes of problems encountered when they {}", phrase),
            ),
            (
                "Evaluate",
                "Judge which corrective action is most effective and justify the choice".to_string(),
            ),
        ]
    } else if lowered.contains("3d print") {
        vec![
            (
                "Apply",
                "Prepare and slice a 3D model with settings suited to the printer and material"
                    .to_string(),
            ),
            (
                "Analyze",
                "Inspect finished prints to identify defects and trace them to their causes".to_string(),
            ),
            (
                "Evaluate",
                "Evaluate print quality against the design requirements and recommend improvements"
                    .to_string(),
            ),
        ]
    } else {
        vec![
            (
                "Apply",
                format!("Apply what they have learned to {} in a practical task", phrase),
            ),
            (
                "Analyze",
                format!("Analyze worked examples to identify what it takes to {}", phrase),
            ),
            (
                "Evaluate",
                format!("Evaluate their own attempts to {} against clear criteria", phrase),
            ),
        ]
    }
}
