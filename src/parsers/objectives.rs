//! Learning objective replies.
//!
//! ```text
//! OBJECTIVES FOR GOAL 1:
//! • Apply: Write a function that ...
//! • Analyze: Compare two ...
//! ```

use std::sync::OnceLock;

use regex::Regex;

use super::fallback::objective_templates;
use super::{first_success, goal_index, strip_markup, Strategy};
use crate::models::{bloom_level_for_verb, Assessment, Goal, IdSequence, LearningObjective};

/// Alignment text for objectives whose goal has no assessment.
pub const ALIGNMENT_PENDING: &str = "Aligned assessment pending";

/// `(goal index, bloom level, description)`.
type ParsedObjective = (usize, String, String);

fn objectives_header() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)^(?:learning\s+)?objectives?\s+for\s+goal\s*#?\s*(\d+)\b")
            .expect("objectives header pattern is valid")
    })
}

/// Body of a `•`, `-` or `*` bullet. A leading `**` is bold text, not a bullet.
fn bullet_body(line: &str) -> Option<&str> {
    let line = line.trim();
    if line.starts_with("**") {
        return None;
    }
    line.strip_prefix(['•', '-', '*']).map(str::trim)
}

fn split_objective(body: &str) -> Option<(String, String)> {
    if let Some((level, description)) = body.split_once(':') {
        let level = level.replace("**", "").trim().to_string();
        let description = description.replace("**", "").trim().to_string();
        return (!level.is_empty() && !description.is_empty()).then_some((level, description));
    }

    let first_word = body.split_whitespace().next()?;
    let level = bloom_level_for_verb(first_word)?;
    Some((level.to_string(), body.replace("**", "").trim().to_string()))
}

fn headed_bullets(text: &str, goal_count: &usize) -> Option<Vec<ParsedObjective>> {
    let mut current: Option<usize> = None;
    let mut parsed = Vec::new();

    for line in text.lines() {
        if let Some(caps) = objectives_header().captures(&strip_markup(line)) {
            current = goal_index(&caps[1], *goal_count);
            if current.is_none() {
                tracing::debug!(goal = &caps[1], "objectives header for unknown goal");
            }
            continue;
        }

        let (Some(index), Some(body)) = (current, bullet_body(line)) else {
            continue;
        };
        if let Some((level, description)) = split_objective(body) {
            parsed.push((index, level, description));
        }
    }

    (!parsed.is_empty()).then_some(parsed)
}

const STRATEGIES: [Strategy<usize, Vec<ParsedObjective>>; 1] = [Strategy {
    name: "objective-headers",
    parse: headed_bullets,
}];

fn alignment_for<'a>(goal: &Goal, assessments: &'a [Assessment]) -> &'a str {
    assessments
        .iter()
        .find(|a| a.goal_id == goal.id)
        .map_or(ALIGNMENT_PENDING, |a| a.description.as_str())
}

/// Parse an objectives reply.
///
/// Each objective belongs to the goal named by the nearest preceding header
/// and is aligned with that goal's assessment. A reply yielding no objectives
/// at all is replaced by two or three template objectives per goal.
pub fn parse_objectives(
    text: &str,
    goals: &[Goal],
    assessments: &[Assessment],
    ids: &mut IdSequence,
) -> Vec<LearningObjective> {
    let count = goals.len();
    if let Some((strategy, parsed)) = first_success(text, &count, &STRATEGIES) {
        tracing::debug!(strategy, objectives = parsed.len(), "parsed learning objectives");
        return parsed
            .into_iter()
            .map(|(index, bloom_level, description)| {
                let goal = &goals[index];
                LearningObjective {
                    id: ids.next_id(),
                    goal_id: goal.id,
                    bloom_level,
                    description,
                    assessment_alignment: alignment_for(goal, assessments).to_string(),
                }
            })
            .collect();
    }

    tracing::info!(goals = count, "no objectives in reply, using templates");
    goals
        .iter()
        .flat_map(|goal| {
            let alignment = alignment_for(goal, assessments).to_string();
            objective_templates(goal)
                .into_iter()
                .map(move |(level, description)| (goal.id, level, description, alignment.clone()))
        })
        .map(|(goal_id, level, description, assessment_alignment)| LearningObjective {
            id: ids.next_id(),
            goal_id,
            bloom_level: level.to_string(),
            description,
            assessment_alignment,
        })
        .collect()
}
