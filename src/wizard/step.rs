use std::fmt;

use serde::{Deserialize, Serialize};

/// The fixed, ordered sequence of wizard steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WizardStep {
    Setup,
    Goals,
    RefineGoals,
    SaveGoals,
    GenerateAssessments,
    ReviewAssessments,
    SaveAssessments,
    GenerateObjectives,
    ReviewObjectives,
    Complete,
}

impl WizardStep {
    pub const ALL: [WizardStep; 10] = [
        WizardStep::Setup,
        WizardStep::Goals,
        WizardStep::RefineGoals,
        WizardStep::SaveGoals,
        WizardStep::GenerateAssessments,
        WizardStep::ReviewAssessments,
        WizardStep::SaveAssessments,
        WizardStep::GenerateObjectives,
        WizardStep::ReviewObjectives,
        WizardStep::Complete,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Setup => "setup",
            Self::Goals => "goals",
            Self::RefineGoals => "refine-goals",
            Self::SaveGoals => "save-goals",
            Self::GenerateAssessments => "generate-assessments",
            Self::ReviewAssessments => "review-assessments",
            Self::SaveAssessments => "save-assessments",
            Self::GenerateObjectives => "generate-objectives",
            Self::ReviewObjectives => "review-objectives",
            Self::Complete => "complete",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|step| step.as_str() == s)
    }

    /// Heading shown for the step.
    pub fn title(&self) -> &'static str {
        match self {
            Self::Setup => "Course Setup",
            Self::Goals => "Learning Goals",
            Self::RefineGoals => "Review Refined Goals",
            Self::SaveGoals => "Save Goals",
            Self::GenerateAssessments => "Generate Assessments",
            Self::ReviewAssessments => "Review Assessments",
            Self::SaveAssessments => "Save Assessments",
            Self::GenerateObjectives => "Generate Objectives",
            Self::ReviewObjectives => "Review Objectives",
            Self::Complete => "Framework Complete",
        }
    }

    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn next(&self) -> Option<Self> {
        Self::ALL.get(self.index() + 1).copied()
    }

    pub fn prev(&self) -> Option<Self> {
        self.index().checked_sub(1).map(|i| Self::ALL[i])
    }
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a step sits relative to the current one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    Completed,
    Active,
    Upcoming,
}
