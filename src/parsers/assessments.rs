//! Assessment generation replies.
//!
//! Preferred shape is a JSON document:
//!
//! ```text
//! { "assessments": [ { "goal": 1, "strategies": [ { "title": "...", "description": "..." } ] } ] }
//! ```
//!
//! Text replies with `ASSESSMENT FOR GOAL <n>:` sections are read next. Goals
//! still missing afterwards are filled from heading-split sections, then from
//! plain paragraphs, then from a subject template.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;
use serde::Deserialize;
use serde_json::Value;

use super::fallback::assessment_template;
use super::{first_success, goal_index, strip_markup, Strategy};
use crate::models::{Assessment, Goal, IdSequence};

/// Goal index (0-based) to assessment text.
type Sections = BTreeMap<usize, String>;

/// Heading-split sections shorter than this are ignored.
const MIN_SECTION_LEN: usize = 20;
/// Paragraphs must be longer than this to count as an assessment.
const MIN_PARAGRAPH_LEN: usize = 50;

#[derive(Debug, Deserialize)]
struct AssessmentDocument {
    assessments: Vec<GoalEntry>,
}

#[derive(Debug, Deserialize)]
struct GoalEntry {
    goal: Value,
    #[serde(default)]
    strategies: Vec<StrategyEntry>,
}

#[derive(Debug, Deserialize)]
struct StrategyEntry {
    #[serde(default)]
    title: Option<String>,
    description: String,
}

impl StrategyEntry {
    fn render(&self) -> Option<String> {
        let description = self.description.trim();
        if description.is_empty() {
            return None;
        }
        Some(match self.title.as_deref().map(str::trim) {
            Some(title) if !title.is_empty() => format!("**{}**: {}", title, description),
            _ => description.to_string(),
        })
    }
}

/// Goal numbers arrive as `1` or `"1"`.
fn goal_number(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => Some(s.trim().trim_start_matches('#').to_string()),
        _ => None,
    }
}

/// The outermost `{ ... }` span, which also drops code fences and chatter.
fn json_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

fn json_document(text: &str, goal_count: &usize) -> Option<Sections> {
    let document: AssessmentDocument = serde_json::from_str(json_span(text)?).ok()?;

    let mut sections = Sections::new();
    for entry in &document.assessments {
        let Some(index) = goal_number(&entry.goal).and_then(|n| goal_index(&n, *goal_count)) else {
            tracing::debug!(goal = %entry.goal, "assessment entry for unknown goal");
            continue;
        };
        let rendered: Vec<String> = entry.strategies.iter().filter_map(StrategyEntry::render).collect();
        if rendered.is_empty() {
            continue;
        }
        let joined = rendered.join("\n\n");
        sections
            .entry(index)
            .and_modify(|existing| {
                existing.push_str("\n\n");
                existing.push_str(&joined);
            })
            .or_insert(joined);
    }
    (!sections.is_empty()).then_some(sections)
}

fn section_header() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"(?i)^(?:assessments?\s+(?:strategies\s+)?for\s+goal\s*#?\s*(\d+)|goal\s*#?\s*(\d+)\s*[:.\-–]?\s*assessments?(?:\s+strateg(?:y|ies))?)\s*[:.\-–]?\s*(.*)$",
        )
        .expect("assessment header pattern is valid")
    })
}

fn header_sections(text: &str, goal_count: &usize) -> Option<Sections> {
    let mut sections = Sections::new();
    let mut current: Option<(String, Vec<String>)> = None;

    let flush = |current: Option<(String, Vec<String>)>, sections: &mut Sections| {
        let Some((number, lines)) = current else {
            return;
        };
        let body = lines.join("\n").trim().to_string();
        if body.is_empty() {
            return;
        }
        if let Some(index) = goal_index(&number, *goal_count) {
            sections.entry(index).or_insert(body);
        }
    };

    for line in text.lines() {
        let cleaned = strip_markup(line);
        if let Some(caps) = section_header().captures(&cleaned) {
            flush(current.take(), &mut sections);
            let number = caps
                .get(1)
                .or_else(|| caps.get(2))
                .map(|m| m.as_str().to_string())
                .unwrap_or_default();
            let inline = caps.get(3).map(|m| m.as_str().trim()).unwrap_or_default();
            let lines = if inline.is_empty() {
                Vec::new()
            } else {
                vec![inline.to_string()]
            };
            current = Some((number, lines));
        } else if let Some((_, lines)) = current.as_mut() {
            lines.push(line.trim_end().to_string());
        }
    }
    flush(current, &mut sections);

    (!sections.is_empty()).then_some(sections)
}

const STRATEGIES: [Strategy<usize, Sections>; 2] = [
    Strategy {
        name: "json-document",
        parse: json_document,
    },
    Strategy {
        name: "assessment-headers",
        parse: header_sections,
    },
];

fn heading_boundary() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"(?im)^[ \t]*(?:#+[ \t]*)?(?:\*\*)?[ \t]*(?:assessment[ \t]+for[ \t]+goal[ \t]*#?[ \t]*(\d+)|goal[ \t]*#?[ \t]*(\d+)|(\d+)[.)])",
        )
        .expect("heading boundary pattern is valid")
    })
}

/// Split on heading-like lines and place sections by their number.
fn fill_from_headings(text: &str, goal_count: usize, sections: &mut Sections) {
    let matches: Vec<_> = heading_boundary().captures_iter(text).collect();
    for (i, caps) in matches.iter().enumerate() {
        let Some(whole) = caps.get(0) else { continue };
        let end = matches
            .get(i + 1)
            .and_then(|next| next.get(0))
            .map_or(text.len(), |m| m.start());
        let body = text[whole.end()..end]
            .trim_start_matches(|c: char| c.is_whitespace() || matches!(c, ':' | '*' | '-' | '.'))
            .trim();
        if body.chars().count() < MIN_SECTION_LEN {
            continue;
        }

        let index = [1, 2, 3]
            .iter()
            .find_map(|&g| caps.get(g))
            .and_then(|m| goal_index(m.as_str(), goal_count))
            .unwrap_or(i);
        if index < goal_count {
            sections.entry(index).or_insert_with(|| body.to_string());
        }
    }
}

fn paragraph_break() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\n[ \t]*\n").expect("paragraph pattern is valid"))
}

/// Paragraphs go, in order, to the goals still missing a section.
///
/// Paragraphs containing a heading were already considered by
/// [`fill_from_headings`] and are skipped.
fn fill_from_paragraphs(text: &str, goal_count: usize, sections: &mut Sections) {
    let missing: Vec<usize> = (0..goal_count)
        .filter(|i| !sections.contains_key(i))
        .collect();
    let paragraphs = paragraph_break()
        .split(text)
        .map(str::trim)
        .filter(|p| p.chars().count() > MIN_PARAGRAPH_LEN)
        .filter(|p| !heading_boundary().is_match(p));
    for (index, paragraph) in missing.into_iter().zip(paragraphs) {
        sections.insert(index, paragraph.to_string());
    }
}

/// Parse an assessment reply into exactly one assessment per goal.
///
/// The result is in goal order and `result[i].goal_id == goals[i].id` for
/// every input, whatever `text` contains.
pub fn parse_assessments(
    text: &str,
    goals: &[Goal],
    course_subject: &str,
    ids: &mut IdSequence,
) -> Vec<Assessment> {
    let count = goals.len();
    let (strategy, mut sections) =
        first_success(text, &count, &STRATEGIES).unwrap_or(("none", Sections::new()));

    if sections.len() < count {
        fill_from_headings(text, count, &mut sections);
    }
    if sections.len() < count {
        fill_from_paragraphs(text, count, &mut sections);
    }

    let templated = count - sections.len();
    if templated > 0 {
        tracing::info!(
            strategy,
            parsed = sections.len(),
            templated,
            "filling missing assessments from templates"
        );
    }

    goals
        .iter()
        .enumerate()
        .map(|(i, goal)| Assessment {
            id: ids.next_id(),
            goal_id: goal.id,
            description: sections
                .remove(&i)
                .unwrap_or_else(|| assessment_template(course_subject, goal)),
            is_refined: true,
        })
        .collect()
}
