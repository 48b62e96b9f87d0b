//! AI gateway: prompt construction, transport and retry.
//!
//! The wizard never talks HTTP itself. It hands a [`CompletionRequest`] to a
//! [`CompletionBackend`]; [`GatewayClient`] is the production backend, which
//! posts to the same-origin proxy (or the provider directly) and retries
//! transient failures.

mod client;
pub mod prompts;
mod retry;

pub use client::*;
pub use retry::*;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Which wizard stage a completion request belongs to.
///
/// Sent to the proxy as the `type` field and used to key request tokens.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum RequestKind {
    RefineGoals,
    GenerateAssessments,
    GenerateObjectives,
}

impl RequestKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RefineGoals => "refine-goals",
            Self::GenerateAssessments => "generate-assessments",
            Self::GenerateObjectives => "generate-objectives",
        }
    }

    pub(crate) fn index(&self) -> usize {
        match self {
            Self::RefineGoals => 0,
            Self::GenerateAssessments => 1,
            Self::GenerateObjectives => 2,
        }
    }
}

/// A prompt ready to send, tagged with its stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    pub kind: RequestKind,
    pub prompt: String,
}

/// Anything that can turn a prompt into reply text.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, AppError>;
}
