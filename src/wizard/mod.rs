//! The step-by-step planning wizard.
//!
//! [`WizardState`] owns every record and enforces the step order. [`Wizard`]
//! pairs it with a [`crate::gateway::CompletionBackend`] and drives the three
//! AI stages: goal refinement, assessment generation and objective
//! generation.

mod framework;
mod navigation;
mod requests;
mod session;
mod state;
mod step;

pub use framework::{Framework, FrameworkEntry};
pub use requests::{ApplyOutcome, PendingRequest, RequestToken};
pub use session::Wizard;
pub use state::{WizardError, WizardState};
pub use step::{StepStatus, WizardStep};
