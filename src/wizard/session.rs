use super::requests::ApplyOutcome;
use super::state::{WizardError, WizardState};
use super::step::WizardStep;
use crate::gateway::prompts::ResponseFormat;
use crate::gateway::CompletionBackend;

/// A wizard session: the state plus the backend that answers its AI requests.
///
/// The async methods run `begin_*`, await the backend (which retries on its
/// own), then `apply_*`. Backend failures never surface as errors here; they
/// become fallback content and an error banner on the state.
pub struct Wizard<B> {
    state: WizardState,
    backend: B,
    assessment_format: ResponseFormat,
}

impl<B: CompletionBackend> Wizard<B> {
    pub fn new(backend: B) -> Self {
        Self {
            state: WizardState::new(),
            backend,
            assessment_format: ResponseFormat::default(),
        }
    }

    pub fn with_assessment_format(mut self, format: ResponseFormat) -> Self {
        self.assessment_format = format;
        self
    }

    pub fn state(&self) -> &WizardState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut WizardState {
        &mut self.state
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn into_state(self) -> WizardState {
        self.state
    }

    pub async fn refine_goals(&mut self) -> Result<ApplyOutcome, WizardError> {
        let pending = self.state.begin_refine_goals()?;
        let reply = self.backend.complete(&pending.request).await;
        Ok(self.state.apply_refined_goals(pending.token, reply))
    }

    pub async fn generate_assessments(&mut self) -> Result<ApplyOutcome, WizardError> {
        let pending = self.state.begin_generate_assessments(self.assessment_format)?;
        let reply = self.backend.complete(&pending.request).await;
        Ok(self.state.apply_assessments(pending.token, reply))
    }

    pub async fn generate_objectives(&mut self) -> Result<ApplyOutcome, WizardError> {
        let pending = self.state.begin_generate_objectives()?;
        let reply = self.backend.complete(&pending.request).await;
        Ok(self.state.apply_objectives(pending.token, reply))
    }

    /// Navigate, then run the entry action of the new step.
    pub async fn go_to_step(&mut self, target: WizardStep) -> Result<(), WizardError> {
        self.state.go_to_step(target)?;
        self.enter_current_step().await
    }

    pub async fn next_step(&mut self) -> Result<(), WizardError> {
        self.state.next_step()?;
        self.enter_current_step().await
    }

    pub async fn previous_step(&mut self) -> Result<(), WizardError> {
        self.state.previous_step()?;
        self.enter_current_step().await
    }

    pub async fn confirm_assessments_saved(&mut self) -> Result<(), WizardError> {
        self.state.confirm_assessments_saved()?;
        self.enter_current_step().await
    }

    /// Entering objective generation starts it.
    async fn enter_current_step(&mut self) -> Result<(), WizardError> {
        if self.state.current_step() == WizardStep::GenerateObjectives {
            self.generate_objectives().await?;
        }
        Ok(())
    }
}
