//! Goal refinement replies.
//!
//! Expected shape, one line per goal:
//!
//! ```text
//! REFINED GOAL 1: Students will be able to ...
//! REFINED GOAL 2: Students will be able to ...
//! ```

use std::sync::OnceLock;

use regex::Regex;

use super::{first_success, goal_index, strip_markup, strip_prefix_ci, Strategy};
use crate::models::{Goal, IdSequence};
use crate::validation::MAX_GOALS;

/// Stem prepended when a refined goal had the course subject stripped off.
pub const OUTCOME_STEM: &str = "Students will be able to ";

const OUTCOME_OPENERS: [&str; 3] = ["students will", "learners will", "participants will"];

fn refined_line() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)^refined\s+goal\s*#?\s*(\d+)\s*[:.)\-–]\s*(.+)$")
            .expect("refined goal pattern is valid")
    })
}

/// `(goal number, text)` for every `REFINED GOAL n:` line.
fn refined_lines(text: &str, _: &()) -> Option<Vec<(String, String)>> {
    let lines: Vec<(String, String)> = text
        .lines()
        .filter_map(|line| {
            let line = strip_markup(line.trim().trim_start_matches(['-', '*', '•']));
            let caps = refined_line().captures(&line)?;
            let body = caps[2].trim();
            (!body.is_empty()).then(|| (caps[1].to_string(), body.to_string()))
        })
        .collect();
    (!lines.is_empty()).then_some(lines)
}

const STRATEGIES: [Strategy<(), Vec<(String, String)>>; 1] = [Strategy {
    name: "refined-goal-lines",
    parse: refined_lines,
}];

/// Parse a refinement reply into refined goals.
///
/// Refined text for goal `n` keeps goal `n`'s id. Goals the reply skipped are
/// carried over unchanged, so the result is never shorter than `goals`. When
/// nothing matches, every goal is returned as-is, marked refined. Lines beyond
/// the input goals become new goals, up to [`MAX_GOALS`].
pub fn parse_refined_goals(
    text: &str,
    goals: &[Goal],
    course_subject: &str,
    ids: &mut IdSequence,
) -> Vec<Goal> {
    let Some((strategy, lines)) = first_success(text, &(), &STRATEGIES) else {
        tracing::info!(
            goals = goals.len(),
            "no refined goals in reply, keeping the original goals"
        );
        return goals
            .iter()
            .map(|g| Goal::refined(g.id, g.description.clone()))
            .collect();
    };

    let mut slots: Vec<Option<String>> = vec![None; goals.len()];
    let mut unplaced = Vec::new();
    for (number, body) in lines {
        let fixed = fix_subject_prefix(&body, course_subject);
        match goal_index(&number, goals.len()) {
            Some(i) if slots[i].is_none() => slots[i] = Some(fixed),
            _ => unplaced.push(fixed),
        }
    }

    // Misnumbered lines fill skipped goals before becoming new ones.
    let mut unplaced = unplaced.into_iter();
    for slot in slots.iter_mut().filter(|s| s.is_none()) {
        match unplaced.next() {
            Some(text) => *slot = Some(text),
            None => break,
        }
    }

    let mut refined: Vec<Goal> = goals
        .iter()
        .zip(slots)
        .map(|(goal, slot)| {
            Goal::refined(goal.id, slot.unwrap_or_else(|| goal.description.clone()))
        })
        .collect();

    for extra in unplaced {
        if refined.len() >= MAX_GOALS {
            break;
        }
        refined.push(Goal::refined(ids.next_id(), extra));
    }

    tracing::debug!(strategy, refined = refined.len(), "parsed refined goals");
    refined
}

/// Rewrite a refined goal that merely starts with the course subject.
///
/// Matches the whole subject or its first word longer than three characters,
/// at a word boundary and ignoring case. The match is stripped and, unless
/// the rest already reads "students/learners/participants will", the
/// [`OUTCOME_STEM`] is prepended. Text that does not start with the subject
/// is returned unchanged.
pub fn fix_subject_prefix(text: &str, course_subject: &str) -> String {
    let subject = course_subject.trim();
    if subject.is_empty() {
        return text.to_string();
    }

    let first_word = subject
        .split_whitespace()
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()))
        .find(|w| w.chars().count() > 3);

    let at_boundary = |rest: &str| rest.chars().next().map_or(true, |c| !c.is_alphanumeric());
    let remainder = strip_prefix_ci(text, subject)
        .filter(|rest| at_boundary(*rest))
        .or_else(|| {
            first_word
                .and_then(|w| strip_prefix_ci(text, w))
                .filter(|rest| at_boundary(*rest))
        });

    let Some(rest) = remainder else {
        return text.to_string();
    };

    let rest = rest.trim_start_matches(|c: char| {
        c.is_whitespace() || matches!(c, ':' | '-' | '–' | '—' | ',' | ';' | '.')
    });
    if rest.is_empty() {
        return text.to_string();
    }

    let lowered = rest.to_lowercase();
    if OUTCOME_OPENERS.iter().any(|o| lowered.starts_with(o)) {
        return capitalize(rest);
    }

    format!("{}{}", OUTCOME_STEM, decapitalize(rest))
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn decapitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}
