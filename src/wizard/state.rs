use std::collections::BTreeMap;

use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use super::framework::Framework;
use super::requests::{ApplyOutcome, PendingRequest, RequestToken, RequestTokens};
use super::step::WizardStep;
use crate::error::AppError;
use crate::gateway::prompts::{
    build_assessment_prompt, build_objectives_prompt, build_refinement_prompt, ResponseFormat,
};
use crate::gateway::{CompletionRequest, RequestKind};
use crate::models::{Assessment, CourseContext, CourseType, Goal, IdSequence, LearningObjective};
use crate::parsers::{parse_assessments, parse_objectives, parse_refined_goals};
use crate::validation::{
    validate_course_subject, validate_course_type, validate_goal, validate_instruction_duration,
    validate_target_audience, Field, ValidationResult,
};

/// Why a wizard operation was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WizardError {
    #[error("{}: {message}", field.label())]
    Invalid { field: Field, message: String },

    #[error("cannot go to {} yet: {reason}", target.title())]
    Blocked {
        target: WizardStep,
        reason: &'static str,
    },

    #[error("{0}")]
    Precondition(&'static str),

    #[error("no {kind} with id {id}")]
    NotFound { kind: &'static str, id: u64 },
}

/// Everything the wizard knows, owned by one session.
///
/// Created empty by [`WizardState::new`] and returned to that state by
/// [`WizardState::reset_application`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WizardState {
    pub(super) current_step: WizardStep,

    course_type: Option<CourseType>,
    course_subject: String,
    course_subject_confirmed: bool,
    target_audience: String,
    target_audience_confirmed: bool,
    instruction_duration: String,
    instruction_duration_confirmed: bool,
    pub(super) setup_confirmed: bool,

    pub(super) goals: Vec<Goal>,
    pub(super) refined_goals: Vec<Goal>,
    pub(super) approved_goals: Vec<Goal>,
    pub(super) refined_assessments: Vec<Assessment>,
    pub(super) approved_assessments: Vec<Assessment>,
    pub(super) learning_objectives: Vec<LearningObjective>,
    pub(super) approved_objectives: Vec<LearningObjective>,

    field_errors: BTreeMap<Field, String>,
    errors: Vec<AppError>,
    is_refining: bool,

    #[serde(skip)]
    ids: IdSequence,
    #[serde(skip)]
    requests: RequestTokens,
}

impl Default for WizardState {
    fn default() -> Self {
        Self::new()
    }
}

impl WizardState {
    pub fn new() -> Self {
        Self {
            current_step: WizardStep::Setup,
            course_type: None,
            course_subject: String::new(),
            course_subject_confirmed: false,
            target_audience: String::new(),
            target_audience_confirmed: false,
            instruction_duration: String::new(),
            instruction_duration_confirmed: false,
            setup_confirmed: false,
            goals: Vec::new(),
            refined_goals: Vec::new(),
            approved_goals: Vec::new(),
            refined_assessments: Vec::new(),
            approved_assessments: Vec::new(),
            learning_objectives: Vec::new(),
            approved_objectives: Vec::new(),
            field_errors: BTreeMap::new(),
            errors: Vec::new(),
            is_refining: false,
            ids: IdSequence::new(),
            requests: RequestTokens::default(),
        }
    }

    // ============================================================
    // Getters
    // ============================================================

    pub fn current_step(&self) -> WizardStep {
        self.current_step
    }

    pub fn course_type(&self) -> Option<CourseType> {
        self.course_type
    }

    pub fn course_subject(&self) -> &str {
        &self.course_subject
    }

    pub fn course_subject_confirmed(&self) -> bool {
        self.course_subject_confirmed
    }

    pub fn target_audience(&self) -> &str {
        &self.target_audience
    }

    pub fn target_audience_confirmed(&self) -> bool {
        self.target_audience_confirmed
    }

    pub fn instruction_duration(&self) -> &str {
        &self.instruction_duration
    }

    pub fn instruction_duration_confirmed(&self) -> bool {
        self.instruction_duration_confirmed
    }

    pub fn setup_confirmed(&self) -> bool {
        self.setup_confirmed
    }

    pub fn goals(&self) -> &[Goal] {
        &self.goals
    }

    pub fn refined_goals(&self) -> &[Goal] {
        &self.refined_goals
    }

    pub fn approved_goals(&self) -> &[Goal] {
        &self.approved_goals
    }

    pub fn refined_assessments(&self) -> &[Assessment] {
        &self.refined_assessments
    }

    pub fn approved_assessments(&self) -> &[Assessment] {
        &self.approved_assessments
    }

    pub fn learning_objectives(&self) -> &[LearningObjective] {
        &self.learning_objectives
    }

    pub fn approved_objectives(&self) -> &[LearningObjective] {
        &self.approved_objectives
    }

    pub fn field_error(&self, field: Field) -> Option<&str> {
        self.field_errors.get(&field).map(String::as_str)
    }

    /// Dismissible error banners, oldest first.
    pub fn errors(&self) -> &[AppError] {
        &self.errors
    }

    /// True while an AI request is outstanding.
    pub fn is_refining(&self) -> bool {
        self.is_refining
    }

    /// The course context, once a course type has been chosen.
    pub fn course_context(&self) -> Option<CourseContext> {
        Some(CourseContext {
            course_type: self.course_type?,
            course_subject: self.course_subject.clone(),
            target_audience: self.target_audience.clone(),
            instruction_duration: self.instruction_duration.clone(),
        })
    }

    // ============================================================
    // Setup
    // ============================================================

    pub fn set_course_type(&mut self, course_type: CourseType) {
        self.course_type = Some(course_type);
        self.field_errors.remove(&Field::CourseType);
    }

    fn confirm_field(
        &mut self,
        field: Field,
        raw: &str,
        validate: fn(&str) -> ValidationResult,
    ) -> ValidationResult {
        self.field_errors.remove(&field);
        let result = validate(raw);
        if let Some(message) = &result.error {
            tracing::debug!(field = field.label(), "{}", message);
            self.field_errors.insert(field, message.clone());
            return result;
        }

        let value = raw.trim().to_string();
        match field {
            Field::CourseSubject => {
                self.course_subject = value;
                self.course_subject_confirmed = true;
            }
            Field::TargetAudience => {
                self.target_audience = value;
                self.target_audience_confirmed = true;
            }
            Field::InstructionDuration => {
                self.instruction_duration = value;
                self.instruction_duration_confirmed = true;
            }
            Field::CourseType | Field::Goal => {}
        }
        result
    }

    pub fn confirm_course_subject(&mut self, raw: &str) -> ValidationResult {
        self.confirm_field(Field::CourseSubject, raw, validate_course_subject)
    }

    pub fn confirm_target_audience(&mut self, raw: &str) -> ValidationResult {
        self.confirm_field(Field::TargetAudience, raw, validate_target_audience)
    }

    pub fn confirm_instruction_duration(&mut self, raw: &str) -> ValidationResult {
        self.confirm_field(Field::InstructionDuration, raw, validate_instruction_duration)
    }

    /// Finish setup and move on to goal entry.
    pub fn confirm_setup(&mut self) -> Result<(), WizardError> {
        let course_type = validate_course_type(self.course_type);
        if let Some(message) = course_type.error {
            self.field_errors.insert(Field::CourseType, message.clone());
            return Err(WizardError::Invalid {
                field: Field::CourseType,
                message,
            });
        }
        if !(self.course_subject_confirmed
            && self.target_audience_confirmed
            && self.instruction_duration_confirmed)
        {
            return Err(WizardError::Precondition(
                "confirm the course subject, target audience and instruction duration first",
            ));
        }

        self.setup_confirmed = true;
        self.current_step = WizardStep::Goals;
        tracing::info!(subject = %self.course_subject, "course setup confirmed");
        Ok(())
    }

    // ============================================================
    // Goals
    // ============================================================

    pub fn add_goal(&mut self, raw: &str) -> ValidationResult {
        self.field_errors.remove(&Field::Goal);
        let result = validate_goal(raw, &self.course_subject, &self.goals);
        match &result.error {
            Some(message) => {
                self.field_errors.insert(Field::Goal, message.clone());
            }
            None => {
                let goal = Goal::new(self.ids.next_id(), raw.trim());
                tracing::debug!(id = goal.id, "goal added");
                self.goals.push(goal);
            }
        }
        result
    }

    /// Remove a goal by id. Returns whether it existed.
    pub fn remove_goal(&mut self, id: u64) -> bool {
        let before = self.goals.len();
        self.goals.retain(|g| g.id != id);
        self.goals.len() != before
    }

    pub fn update_refined_goal(&mut self, id: u64, text: &str) -> Result<(), WizardError> {
        let text = non_empty(Field::Goal, text)?;
        let goal = self
            .refined_goals
            .iter_mut()
            .find(|g| g.id == id)
            .ok_or(WizardError::NotFound { kind: "goal", id })?;
        goal.description = text;
        Ok(())
    }

    /// Accept the refined goals and move to the save step.
    pub fn approve_goals(&mut self) -> Result<(), WizardError> {
        if self.refined_goals.is_empty() {
            return Err(WizardError::Precondition("there are no refined goals to approve"));
        }
        self.approved_goals = self.refined_goals.clone();
        self.current_step = WizardStep::SaveGoals;
        tracing::info!(goals = self.approved_goals.len(), "goals approved");
        Ok(())
    }

    pub fn confirm_goals_saved(&mut self) -> Result<(), WizardError> {
        if self.approved_goals.is_empty() {
            return Err(WizardError::Precondition("approve the goals before saving them"));
        }
        self.current_step = WizardStep::GenerateAssessments;
        Ok(())
    }

    // ============================================================
    // Assessments
    // ============================================================

    pub fn update_assessment(&mut self, id: u64, text: &str) -> Result<(), WizardError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(WizardError::Precondition("assessment text cannot be empty"));
        }
        let assessment = self
            .refined_assessments
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or(WizardError::NotFound {
                kind: "assessment",
                id,
            })?;
        assessment.description = text.to_string();
        Ok(())
    }

    pub fn approve_assessments(&mut self) -> Result<(), WizardError> {
        if self.refined_assessments.is_empty() {
            return Err(WizardError::Precondition("there are no assessments to approve"));
        }
        self.approved_assessments = self.refined_assessments.clone();
        self.current_step = WizardStep::SaveAssessments;
        tracing::info!(
            assessments = self.approved_assessments.len(),
            "assessments approved"
        );
        Ok(())
    }

    /// Move to objective generation. The session layer starts generation on entry.
    pub fn confirm_assessments_saved(&mut self) -> Result<(), WizardError> {
        if self.approved_assessments.is_empty() {
            return Err(WizardError::Precondition(
                "approve the assessments before saving them",
            ));
        }
        self.current_step = WizardStep::GenerateObjectives;
        Ok(())
    }

    // ============================================================
    // Objectives
    // ============================================================

    pub fn approve_objectives(&mut self) -> Result<(), WizardError> {
        if self.learning_objectives.is_empty() {
            return Err(WizardError::Precondition("there are no objectives to approve"));
        }
        self.approved_objectives = self.learning_objectives.clone();
        self.current_step = WizardStep::Complete;
        tracing::info!(
            objectives = self.approved_objectives.len(),
            "objectives approved, framework complete"
        );
        Ok(())
    }

    // ============================================================
    // AI stages
    // ============================================================

    fn require_course(&self) -> Result<CourseContext, WizardError> {
        self.course_context()
            .ok_or(WizardError::Precondition("choose a course type first"))
    }

    fn begin(&mut self, kind: RequestKind, prompt: String) -> PendingRequest {
        let token = self.requests.issue(kind);
        self.is_refining = true;
        tracing::debug!(kind = kind.as_str(), seq = token.seq(), "AI request issued");
        PendingRequest {
            token,
            request: CompletionRequest { kind, prompt },
        }
    }

    /// Accept a reply if its token is current. Failures become an error
    /// banner and an empty reply, which the parsers turn into fallback content.
    fn settle(&mut self, token: RequestToken, reply: Result<String, AppError>) -> Option<String> {
        if !self.requests.is_current(token) {
            tracing::warn!(
                kind = token.kind().as_str(),
                seq = token.seq(),
                "discarding stale AI reply"
            );
            return None;
        }
        self.requests.settle(token);
        self.is_refining = self.requests.any_pending();

        match reply {
            Ok(text) => Some(text),
            Err(error) => {
                error.log();
                self.errors.push(error);
                Some(String::new())
            }
        }
    }

    pub fn begin_refine_goals(&mut self) -> Result<PendingRequest, WizardError> {
        if self.goals.is_empty() {
            return Err(WizardError::Precondition("add at least one goal first"));
        }
        let prompt = build_refinement_prompt(&self.require_course()?, &self.goals);
        Ok(self.begin(RequestKind::RefineGoals, prompt))
    }

    pub fn apply_refined_goals(
        &mut self,
        token: RequestToken,
        reply: Result<String, AppError>,
    ) -> ApplyOutcome {
        let Some(text) = self.settle(token, reply) else {
            return ApplyOutcome::Stale;
        };
        self.refined_goals =
            parse_refined_goals(&text, &self.goals, &self.course_subject, &mut self.ids);
        self.current_step = WizardStep::RefineGoals;
        ApplyOutcome::Applied
    }

    pub fn begin_generate_assessments(
        &mut self,
        format: ResponseFormat,
    ) -> Result<PendingRequest, WizardError> {
        if self.approved_goals.is_empty() {
            return Err(WizardError::Precondition("approve the goals first"));
        }
        let prompt = build_assessment_prompt(&self.require_course()?, &self.approved_goals, format);
        Ok(self.begin(RequestKind::GenerateAssessments, prompt))
    }

    pub fn apply_assessments(
        &mut self,
        token: RequestToken,
        reply: Result<String, AppError>,
    ) -> ApplyOutcome {
        let Some(text) = self.settle(token, reply) else {
            return ApplyOutcome::Stale;
        };
        self.refined_assessments = parse_assessments(
            &text,
            &self.approved_goals,
            &self.course_subject,
            &mut self.ids,
        );
        self.current_step = WizardStep::ReviewAssessments;
        ApplyOutcome::Applied
    }

    pub fn begin_generate_objectives(&mut self) -> Result<PendingRequest, WizardError> {
        if self.approved_assessments.is_empty() {
            return Err(WizardError::Precondition("approve the assessments first"));
        }
        let prompt = build_objectives_prompt(
            &self.require_course()?,
            &self.approved_goals,
            &self.approved_assessments,
        );
        Ok(self.begin(RequestKind::GenerateObjectives, prompt))
    }

    pub fn apply_objectives(
        &mut self,
        token: RequestToken,
        reply: Result<String, AppError>,
    ) -> ApplyOutcome {
        let Some(text) = self.settle(token, reply) else {
            return ApplyOutcome::Stale;
        };
        self.learning_objectives = parse_objectives(
            &text,
            &self.approved_goals,
            &self.approved_assessments,
            &mut self.ids,
        );
        self.current_step = WizardStep::ReviewObjectives;
        ApplyOutcome::Applied
    }

    // ============================================================
    // Errors, reset, output
    // ============================================================

    /// Remove an error banner. Returns whether it was present.
    pub fn dismiss_error(&mut self, id: Uuid) -> bool {
        let before = self.errors.len();
        self.errors.retain(|e| e.id != id);
        self.errors.len() != before
    }

    /// Return to the initial state. Outstanding requests become stale.
    pub fn reset_application(&mut self) {
        let mut requests = std::mem::take(&mut self.requests);
        requests.invalidate_all();
        *self = Self {
            requests,
            ..Self::new()
        };
        tracing::info!("wizard reset");
    }

    pub fn framework(&self) -> Framework {
        Framework::assemble(
            self.course_context(),
            &self.approved_goals,
            &self.approved_assessments,
            &self.approved_objectives,
        )
    }
}

fn non_empty(field: Field, text: &str) -> Result<String, WizardError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(WizardError::Invalid {
            field,
            message: format!("{} is required", field.label()),
        });
    }
    Ok(text.to_string())
}
