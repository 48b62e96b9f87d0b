//! Domain models for the curriculum wizard.
//!
//! # Core Concepts
//!
//! Backward design plans a course from the outcome inward:
//!
//! - [`CourseContext`]: What is being taught, to whom, and for how long. Threaded
//!   into every prompt sent to the AI.
//! - [`Goal`]: A learning goal stated by the instructor, optionally refined by AI.
//! - [`Assessment`]: How achievement of one goal is measured. Linked by `goal_id`.
//! - [`LearningObjective`]: A Bloom-levelled objective supporting one goal and
//!   aligned with that goal's assessment.
//!
//! All records live in memory for the length of one wizard session. Nothing is
//! persisted.

mod assessment;
mod course;
mod goal;
mod objective;

pub use assessment::*;
pub use course::*;
pub use goal::*;
pub use objective::*;

/// Monotonic identifier source for records created during a session.
///
/// Identifiers are never derived from wall-clock time, so records created in
/// quick succession cannot collide.
#[derive(Debug, Clone)]
pub struct IdSequence {
    next: u64,
}

impl IdSequence {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    /// Return the next identifier and advance the sequence.
    pub fn next_id(&mut self) -> u64 {
        let id = self.next;
        self.next += 1;
        id
    }

    /// Peek at the identifier the next call to [`IdSequence::next_id`] returns.
    pub fn peek(&self) -> u64 {
        self.next
    }
}

impl Default for IdSequence {
    fn default() -> Self {
        Self::new()
    }
}
