//! Non-interactive planning: run the whole wizard from a JSON description.

use std::fs;
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::gateway::prompts::ResponseFormat;
use crate::gateway::CompletionBackend;
use crate::models::CourseType;
use crate::validation::{Field, ValidationResult};
use crate::wizard::{Wizard, WizardError, WizardState};

/// Input for `cwiz plan`.
///
/// ```json
/// {
///   "courseType": "workshop",
///   "courseSubject": "Intro to 3D Printing",
///   "targetAudience": "Makerspace members",
///   "instructionDuration": "Two evenings",
///   "goals": ["Slice a model for printing", "Diagnose failed prints"]
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanInput {
    pub course_type: CourseType,
    pub course_subject: String,
    pub target_audience: String,
    pub instruction_duration: String,
    pub goals: Vec<String>,
}

pub fn load_input(path: &Path) -> anyhow::Result<PlanInput> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read plan input {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse plan input {}", path.display()))
}

fn check(field: Field, result: ValidationResult) -> Result<(), WizardError> {
    match result.error {
        Some(message) => Err(WizardError::Invalid { field, message }),
        None => Ok(()),
    }
}

/// Drive every step, approving each AI result as-is.
///
/// AI failures do not stop the run: fallback content is used and the errors
/// are left on the returned state's banner list.
pub async fn run_plan<B: CompletionBackend>(
    input: &PlanInput,
    backend: B,
    format: ResponseFormat,
) -> Result<WizardState, WizardError> {
    let mut wizard = Wizard::new(backend).with_assessment_format(format);

    let state = wizard.state_mut();
    state.set_course_type(input.course_type);
    check(
        Field::CourseSubject,
        state.confirm_course_subject(&input.course_subject),
    )?;
    check(
        Field::TargetAudience,
        state.confirm_target_audience(&input.target_audience),
    )?;
    check(
        Field::InstructionDuration,
        state.confirm_instruction_duration(&input.instruction_duration),
    )?;
    state.confirm_setup()?;
    for goal in &input.goals {
        check(Field::Goal, state.add_goal(goal))?;
    }

    wizard.refine_goals().await?;
    wizard.state_mut().approve_goals()?;
    wizard.state_mut().confirm_goals_saved()?;

    wizard.generate_assessments().await?;
    wizard.state_mut().approve_assessments()?;
    wizard.confirm_assessments_saved().await?;

    wizard.state_mut().approve_objectives()?;
    tracing::info!(
        goals = wizard.state().approved_goals().len(),
        objectives = wizard.state().approved_objectives().len(),
        warnings = wizard.state().errors().len(),
        "plan complete"
    );
    Ok(wizard.into_state())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_camel_case_input() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"courseType":"course","courseSubject":"Biology","targetAudience":"Ninth graders","instructionDuration":"One term","goals":["Describe the parts of a cell"]}}"#
        )
        .unwrap();

        let input = load_input(file.path()).unwrap();
        assert_eq!(input.course_type, CourseType::Course);
        assert_eq!(input.goals.len(), 1);
    }

    #[test]
    fn unreadable_input_names_the_file() {
        let err = load_input(Path::new("/definitely/missing.json")).unwrap_err();
        assert!(format!("{:#}", err).contains("missing.json"));
    }
}
