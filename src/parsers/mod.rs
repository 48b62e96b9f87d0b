//! Parsers turning free-text AI replies into typed records.
//!
//! Every stage runs an ordered list of [`Strategy`] values and stops at the
//! first one that yields records. When none does, a deterministic template
//! from [`fallback`] fills in, so each stage is a total function from
//! arbitrary text to exactly the records the wizard needs.

pub mod assessments;
pub mod fallback;
pub mod goals;
pub mod objectives;

pub use assessments::parse_assessments;
pub use goals::{fix_subject_prefix, parse_refined_goals};
pub use objectives::parse_objectives;

/// One named way of reading a reply.
///
/// `C` is whatever context the strategy needs besides the text.
pub struct Strategy<C: ?Sized, T> {
    pub name: &'static str,
    pub parse: fn(&str, &C) -> Option<T>,
}

/// Run strategies in order and return the first result with its strategy name.
pub fn first_success<C: ?Sized, T>(
    text: &str,
    ctx: &C,
    strategies: &[Strategy<C, T>],
) -> Option<(&'static str, T)> {
    strategies.iter().find_map(|strategy| {
        let parsed = (strategy.parse)(text, ctx);
        if parsed.is_none() {
            tracing::debug!(strategy = strategy.name, "parse strategy found nothing");
        }
        parsed.map(|value| (strategy.name, value))
    })
}

/// Remove bold/underline markers and leading heading or quote characters.
pub(crate) fn strip_markup(line: &str) -> String {
    line.replace("**", "")
        .replace("__", "")
        .trim()
        .trim_start_matches(['#', '>'])
        .trim()
        .to_string()
}

/// Case-insensitive `strip_prefix`, returning the remainder of `text`.
pub(crate) fn strip_prefix_ci<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let mut chars = text.char_indices();
    for expected in prefix.chars() {
        let (_, actual) = chars.next()?;
        if !actual.to_lowercase().eq(expected.to_lowercase()) {
            return None;
        }
    }
    let rest = chars.next().map(|(i, _)| i).unwrap_or(text.len());
    Some(&text[rest..])
}

/// Parse a 1-based goal number into an index below `count`.
pub(crate) fn goal_index(number: &str, count: usize) -> Option<usize> {
    let n: usize = number.parse().ok()?;
    (1..=count).contains(&n).then(|| n - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn never(_: &str, _: &()) -> Option<u8> {
        None
    }

    fn always(_: &str, _: &()) -> Option<u8> {
        Some(7)
    }

    #[test]
    fn first_success_reports_winning_strategy() {
        let strategies = [
            Strategy {
                name: "never",
                parse: never,
            },
            Strategy {
                name: "always",
                parse: always,
            },
        ];
        assert_eq!(first_success("", &(), &strategies), Some(("always", 7)));
        assert_eq!(first_success("", &(), &strategies[..1]), None);
    }

    #[test]
    fn strip_prefix_ci_handles_case_and_unicode() {
        assert_eq!(strip_prefix_ci("Intro to X: more", "intro to x"), Some(": more"));
        assert_eq!(strip_prefix_ci("Éclairs", "écl"), Some("airs"));
        assert_eq!(strip_prefix_ci("abc", "abcd"), None);
        assert_eq!(strip_prefix_ci("abc", "abc"), Some(""));
    }

    #[test]
    fn strip_markup_removes_emphasis_and_headings() {
        assert_eq!(strip_markup("## **ASSESSMENT FOR GOAL 1:**"), "ASSESSMENT FOR GOAL 1:");
        assert_eq!(strip_markup("> __Goal 2__"), "Goal 2");
    }

    #[test]
    fn goal_index_is_bounded() {
        assert_eq!(goal_index("1", 2), Some(0));
        assert_eq!(goal_index("2", 2), Some(1));
        assert_eq!(goal_index("3", 2), None);
        assert_eq!(goal_index("0", 2), None);
    }
}
