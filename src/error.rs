//! Error taxonomy for failures surfaced to the instructor.
//!
//! Every caught failure (network, non-2xx HTTP, malformed payload) is
//! normalized into an [`AppError`]. The category decides the user-facing
//! message and whether the gateway's retry wrapper may try again.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// What kind of failure occurred.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    Validation,
    Network,
    Api,
    Ui,
    Data,
    Permission,
    Timeout,
    Unknown,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::Network => "network",
            Self::Api => "api",
            Self::Ui => "ui",
            Self::Data => "data",
            Self::Permission => "permission",
            Self::Timeout => "timeout",
            Self::Unknown => "unknown",
        }
    }

    /// Non-technical message shown in the banner for this category.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Validation => "Please check the highlighted fields and try again.",
            Self::Network => {
                "We couldn't reach the AI service. Check your connection; default content was used so you can keep going."
            }
            Self::Api => {
                "The AI service had a problem with this request. Default content was used so you can keep going."
            }
            Self::Ui => "Something went wrong on this page. Please try that again.",
            Self::Data => {
                "The AI reply could not be read. Default content was used so you can keep going."
            }
            Self::Permission => {
                "The AI service rejected our credentials. Ask your administrator to check the API key."
            }
            Self::Timeout => {
                "The AI service took too long to answer. Default content was used so you can keep going."
            }
            Self::Unknown => "An unexpected error occurred. Default content was used so you can keep going.",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How serious a failure is.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ErrorSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

/// A normalized failure record.
#[derive(Debug, Clone, Serialize, Deserialize, Error)]
#[serde(rename_all = "camelCase")]
#[error("[{category}] {message}")]
pub struct AppError {
    pub id: Uuid,
    /// Raw, technical message.
    pub message: String,
    /// Templated message for the instructor, independent of `message`.
    pub user_message: String,
    pub category: ErrorCategory,
    pub severity: ErrorSeverity,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub context: BTreeMap<String, String>,
    pub recoverable: bool,
    pub retryable: bool,
}

impl AppError {
    pub fn new(
        category: ErrorCategory,
        severity: ErrorSeverity,
        message: impl Into<String>,
        retryable: bool,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            message: message.into(),
            user_message: category.user_message().to_string(),
            category,
            severity,
            timestamp: Utc::now(),
            context: BTreeMap::new(),
            recoverable: severity != ErrorSeverity::Critical,
            retryable,
        }
    }

    pub fn data(message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::Data, ErrorSeverity::Medium, message, false)
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::Network, ErrorSeverity::Medium, message, true)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::Timeout, ErrorSeverity::Medium, message, true)
    }

    /// Classify a non-2xx HTTP response.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        let error = match status {
            401 | 403 => Self::new(ErrorCategory::Permission, ErrorSeverity::High, message, false),
            408 => Self::timeout(message),
            429 => Self::new(ErrorCategory::Api, ErrorSeverity::Medium, message, true),
            500..=599 => Self::new(ErrorCategory::Api, ErrorSeverity::High, message, true),
            400..=499 => Self::new(ErrorCategory::Api, ErrorSeverity::Medium, message, false),
            _ => Self::from_message(message),
        };
        error.with_context("status", status.to_string())
    }

    /// Classify a failure from its message alone.
    pub fn from_message(message: impl Into<String>) -> Self {
        let message = message.into();
        let lowered = message.to_lowercase();

        if lowered.contains("timeout") || lowered.contains("timed out") {
            Self::timeout(message)
        } else if lowered.contains("network")
            || lowered.contains("fetch")
            || lowered.contains("connection")
            || lowered.contains("connect")
        {
            Self::network(message)
        } else if lowered.contains("parse")
            || lowered.contains("json")
            || lowered.contains("unexpected token")
            || lowered.contains("format")
        {
            Self::data(message)
        } else {
            Self::new(ErrorCategory::Unknown, ErrorSeverity::Medium, message, false)
        }
    }

    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Emit this error through `tracing` at a level matching its severity.
    pub fn log(&self) {
        match self.severity {
            ErrorSeverity::High | ErrorSeverity::Critical => tracing::error!(
                error_id = %self.id,
                category = %self.category,
                severity = self.severity.as_str(),
                retryable = self.retryable,
                context = ?self.context,
                "{}",
                self.message
            ),
            ErrorSeverity::Low | ErrorSeverity::Medium => tracing::warn!(
                error_id = %self.id,
                category = %self.category,
                severity = self.severity.as_str(),
                retryable = self.retryable,
                context = ?self.context,
                "{}",
                self.message
            ),
        }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::timeout(e.to_string())
        } else if e.is_connect() || e.is_request() {
            Self::network(e.to_string())
        } else if e.is_decode() {
            Self::data(e.to_string())
        } else if let Some(status) = e.status() {
            Self::from_status(status.as_u16(), e.to_string())
        } else {
            Self::from_message(e.to_string())
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        Self::data(format!("failed to parse JSON: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_statuses_are_permission_and_not_retryable() {
        for status in [401, 403] {
            let e = AppError::from_status(status, "denied");
            assert_eq!(e.category, ErrorCategory::Permission);
            assert!(!e.retryable);
        }
    }

    #[test]
    fn server_errors_are_high_severity_and_retryable() {
        let e = AppError::from_status(503, "unavailable");
        assert_eq!(e.category, ErrorCategory::Api);
        assert_eq!(e.severity, ErrorSeverity::High);
        assert!(e.retryable);
        assert_eq!(e.context.get("status").map(String::as_str), Some("503"));
    }

    #[test]
    fn rate_limit_is_medium_and_retryable() {
        let e = AppError::from_status(429, "slow down");
        assert_eq!(e.category, ErrorCategory::Api);
        assert_eq!(e.severity, ErrorSeverity::Medium);
        assert!(e.retryable);
    }

    #[test]
    fn message_classification() {
        assert_eq!(
            AppError::from_message("request timed out").category,
            ErrorCategory::Timeout
        );
        assert!(AppError::from_message("Timeout after 30s").retryable);
        assert_eq!(
            AppError::from_message("Failed to parse reply").category,
            ErrorCategory::Data
        );
        assert_eq!(
            AppError::from_message("Failed to fetch").category,
            ErrorCategory::Network
        );
        let unknown = AppError::from_message("something odd");
        assert_eq!(unknown.category, ErrorCategory::Unknown);
        assert!(!unknown.retryable);
    }

    #[test]
    fn user_message_is_templated_per_category() {
        let a = AppError::from_status(500, "stack trace with internals");
        let b = AppError::from_status(502, "different internals");
        assert_eq!(a.user_message, b.user_message);
        assert!(!a.user_message.contains("internals"));
    }

    #[test]
    fn serializes_with_camel_case_fields() {
        let e = AppError::data("bad payload");
        let json = serde_json::to_value(&e).unwrap();
        assert_eq!(json["category"], "data");
        assert_eq!(json["userMessage"], ErrorCategory::Data.user_message());
        assert!(json.get("context").is_none());
    }
}
