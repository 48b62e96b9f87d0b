//! Step gating.
//!
//! Moving back is always allowed. Moving forward to a step requires the data
//! that step displays or builds on.

use super::state::{WizardError, WizardState};
use super::step::{StepStatus, WizardStep};

impl WizardState {
    /// Why `target` cannot be entered from here, if it cannot.
    fn blocked_reason(&self, target: WizardStep) -> Option<&'static str> {
        if target <= self.current_step {
            return None;
        }
        let (ready, reason) = match target {
            WizardStep::Setup => (true, ""),
            WizardStep::Goals => (self.setup_confirmed, "course setup is not confirmed"),
            WizardStep::RefineGoals => (!self.goals.is_empty(), "no goals have been added"),
            WizardStep::SaveGoals => (!self.refined_goals.is_empty(), "goals have not been refined"),
            WizardStep::GenerateAssessments => {
                (!self.approved_goals.is_empty(), "goals have not been approved")
            }
            WizardStep::ReviewAssessments => (
                !self.refined_assessments.is_empty(),
                "assessments have not been generated",
            ),
            WizardStep::SaveAssessments | WizardStep::GenerateObjectives => (
                !self.approved_assessments.is_empty(),
                "assessments have not been approved",
            ),
            WizardStep::ReviewObjectives => (
                !self.learning_objectives.is_empty(),
                "objectives have not been generated",
            ),
            WizardStep::Complete => (
                !self.approved_objectives.is_empty(),
                "objectives have not been approved",
            ),
        };
        (!ready).then_some(reason)
    }

    pub fn can_navigate_to_step(&self, target: WizardStep) -> bool {
        self.blocked_reason(target).is_none()
    }

    pub fn step_status(&self, step: WizardStep) -> StepStatus {
        match step.cmp(&self.current_step) {
            std::cmp::Ordering::Less => StepStatus::Completed,
            std::cmp::Ordering::Equal => StepStatus::Active,
            std::cmp::Ordering::Greater => StepStatus::Upcoming,
        }
    }

    /// Every step with its status, in order.
    pub fn progress(&self) -> Vec<(WizardStep, StepStatus)> {
        WizardStep::ALL
            .into_iter()
            .map(|step| (step, self.step_status(step)))
            .collect()
    }

    /// Jump to `target` if its data dependencies are met.
    ///
    /// Entering [`WizardStep::GenerateObjectives`] does not start generation
    /// here; [`crate::wizard::Wizard::go_to_step`] does.
    pub fn go_to_step(&mut self, target: WizardStep) -> Result<(), WizardError> {
        if let Some(reason) = self.blocked_reason(target) {
            tracing::debug!(from = %self.current_step, to = %target, reason, "navigation blocked");
            return Err(WizardError::Blocked { target, reason });
        }
        tracing::debug!(from = %self.current_step, to = %target, "navigating");
        self.current_step = target;
        Ok(())
    }

    pub fn next_step(&mut self) -> Result<(), WizardError> {
        let next = self
            .current_step
            .next()
            .ok_or(WizardError::Precondition("already at the last step"))?;
        self.go_to_step(next)
    }

    pub fn previous_step(&mut self) -> Result<(), WizardError> {
        let prev = self
            .current_step
            .prev()
            .ok_or(WizardError::Precondition("already at the first step"))?;
        self.go_to_step(prev)
    }
}
