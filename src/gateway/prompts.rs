//! Prompt construction for each AI stage.
//!
//! Prompts embed the course context and the records the stage builds on, and
//! spell out the reply format the parsers in [`crate::parsers`] expect.

use std::fmt::Write;

use serde::{Deserialize, Serialize};

use crate::models::{Assessment, CourseContext, Goal, BLOOM_LEVELS};

/// Reply shape requested for assessment generation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ResponseFormat {
    /// A single JSON document.
    #[default]
    Json,
    /// `ASSESSMENT FOR GOAL <n>:` sections.
    Text,
}

fn push_context(prompt: &mut String, course: &CourseContext) {
    let _ = writeln!(prompt, "Course context:");
    let _ = writeln!(prompt, "- Type: {}", course.kind());
    let _ = writeln!(prompt, "- Subject: {}", course.course_subject);
    let _ = writeln!(prompt, "- Target audience: {}", course.target_audience);
    let _ = writeln!(prompt, "- Duration: {}", course.instruction_duration);
    prompt.push('\n');
}

fn push_goals(prompt: &mut String, heading: &str, goals: &[Goal]) {
    let _ = writeln!(prompt, "{}:", heading);
    for (i, goal) in goals.iter().enumerate() {
        let _ = writeln!(prompt, "{}. {}", i + 1, goal.description);
    }
    prompt.push('\n');
}

/// Ask the AI to rewrite each goal as a clear, outcome-focused statement.
pub fn build_refinement_prompt(course: &CourseContext, goals: &[Goal]) -> String {
    let mut prompt = String::with_capacity(2048);
    let _ = writeln!(
        prompt,
        "You are an instructional designer using backward design to plan a {}.\n",
        course.kind()
    );
    push_context(&mut prompt, course);
    push_goals(&mut prompt, "Learning goals drafted by the instructor", goals);

    prompt.push_str(
        "Refine each goal so it describes what learners will be able to do by the end, \
         in one clear sentence suited to the audience and duration above. \
         Begin each refined goal with \"Students will be able to\". \
         Do not start a goal with the course subject and do not merge or drop goals.\n\n",
    );
    prompt.push_str("Reply with exactly one line per goal, in this format and nothing else:\n");
    for i in 1..=goals.len() {
        let _ = writeln!(prompt, "REFINED GOAL {}: <refined goal text>", i);
    }
    prompt
}

/// Ask the AI for assessment strategies, one set per approved goal.
pub fn build_assessment_prompt(
    course: &CourseContext,
    goals: &[Goal],
    format: ResponseFormat,
) -> String {
    let mut prompt = String::with_capacity(3072);
    let _ = writeln!(
        prompt,
        "You are an assessment designer helping plan a {} with backward design.\n",
        course.kind()
    );
    push_context(&mut prompt, course);
    push_goals(&mut prompt, "Approved learning goals", goals);

    let _ = writeln!(
        prompt,
        "For each goal, propose 2-3 practical assessment strategies that show whether \
         learners achieved it. Keep them realistic for {} over {}.\n",
        course.target_audience, course.instruction_duration
    );

    match format {
        ResponseFormat::Json => {
            prompt.push_str(
                "Reply with a single JSON document and no other text, shaped like:\n\
                 {\n  \"assessments\": [\n    {\n      \"goal\": 1,\n      \"strategies\": [\n        \
                 { \"title\": \"Short title\", \"description\": \"What learners do and how it is judged\" }\n      \
                 ]\n    }\n  ]\n}\n",
            );
            let _ = writeln!(
                prompt,
                "\"goal\" is the 1-based goal number. Include one entry for each of the {} goals.",
                goals.len()
            );
        }
        ResponseFormat::Text => {
            prompt.push_str("Use this format, one section per goal:\n\n");
            for i in 1..=goals.len() {
                let _ = writeln!(
                    prompt,
                    "ASSESSMENT FOR GOAL {}:\n<assessment strategies>\n",
                    i
                );
            }
        }
    }
    prompt
}

/// Ask the AI for Bloom-levelled objectives aligned with each goal's assessment.
pub fn build_objectives_prompt(
    course: &CourseContext,
    goals: &[Goal],
    assessments: &[Assessment],
) -> String {
    let mut prompt = String::with_capacity(4096);
    let _ = writeln!(
        prompt,
        "You are an instructional designer writing learning objectives for a {}.\n",
        course.kind()
    );
    push_context(&mut prompt, course);

    prompt.push_str("Goals and their assessments:\n");
    for (i, goal) in goals.iter().enumerate() {
        let _ = writeln!(prompt, "GOAL {}: {}", i + 1, goal.description);
        if let Some(assessment) = assessments.iter().find(|a| a.goal_id == goal.id) {
            let _ = writeln!(prompt, "Assessment: {}", assessment.description);
        }
        prompt.push('\n');
    }

    let _ = writeln!(
        prompt,
        "Write 2-4 measurable learning objectives per goal. Label each with one Bloom's \
         taxonomy level ({}) and make sure each objective is measured by the goal's assessment.\n",
        BLOOM_LEVELS.join(", ")
    );
    prompt.push_str("Use exactly this format:\n\n");
    for i in 1..=goals.len() {
        let _ = writeln!(
            prompt,
            "OBJECTIVES FOR GOAL {}:\n• <Bloom level>: <objective>\n• <Bloom level>: <objective>\n",
            i
        );
    }
    prompt
}
