//! The finished curriculum framework and its Markdown rendering.

use std::fmt::Write;

use serde::Serialize;

use crate::models::{Assessment, CourseContext, Goal, LearningObjective};

/// One goal with the assessment measuring it and the objectives supporting it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameworkEntry {
    pub goal: Goal,
    pub assessment: Option<Assessment>,
    pub objectives: Vec<LearningObjective>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Framework {
    pub course: Option<CourseContext>,
    pub entries: Vec<FrameworkEntry>,
}

impl Framework {
    /// Group assessments and objectives under their goals, in goal order.
    pub fn assemble(
        course: Option<CourseContext>,
        goals: &[Goal],
        assessments: &[Assessment],
        objectives: &[LearningObjective],
    ) -> Self {
        let entries = goals
            .iter()
            .map(|goal| FrameworkEntry {
                goal: goal.clone(),
                assessment: assessments.iter().find(|a| a.goal_id == goal.id).cloned(),
                objectives: objectives
                    .iter()
                    .filter(|o| o.goal_id == goal.id)
                    .cloned()
                    .collect(),
            })
            .collect();
        Self { course, entries }
    }

    /// True when every goal has an assessment and at least one objective.
    pub fn is_complete(&self) -> bool {
        !self.entries.is_empty()
            && self
                .entries
                .iter()
                .all(|e| e.assessment.is_some() && !e.objectives.is_empty())
    }

    pub fn render_markdown(&self) -> String {
        let mut out = String::new();

        match &self.course {
            Some(course) => {
                let _ = writeln!(out, "# Curriculum Framework: {}\n", course.course_subject);
                let _ = writeln!(out, "- **Type:** {}", capitalize(course.kind()));
                let _ = writeln!(out, "- **Audience:** {}", course.target_audience);
                let _ = writeln!(out, "- **Duration:** {}", course.instruction_duration);
            }
            None => out.push_str("# Curriculum Framework\n"),
        }

        if self.entries.is_empty() {
            out.push_str("\n_No approved goals yet._\n");
            return out;
        }

        for (i, entry) in self.entries.iter().enumerate() {
            let _ = writeln!(out, "\n## Goal {}\n\n{}", i + 1, entry.goal.description);

            out.push_str("\n### Assessment\n\n");
            match &entry.assessment {
                Some(a) => {
                    let _ = writeln!(out, "{}", a.description);
                }
                None => out.push_str("_No assessment yet._\n"),
            }

            out.push_str("\n### Learning Objectives\n\n");
            if entry.objectives.is_empty() {
                out.push_str("_No objectives yet._\n");
            }
            for objective in &entry.objectives {
                let _ = writeln!(
                    out,
                    "- **{}**: {}",
                    objective.bloom_level, objective.description
                );
            }
        }
        out
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
