use std::error::Error;
use std::fmt::{Debug, Display};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::transcript::Transcript;

/// Represents the current status of a lesson
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum LessonStatus {
    /// Lesson is registered but has not been run yet
    Pending,
    /// Lesson is currently printing its demonstration
    Running,
    /// Last run finished without error
    Completed,
    /// Last run stopped with an error
    Failed(String),
}

impl Display for LessonStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LessonStatus::Pending => write!(f, "Pending"),
            LessonStatus::Running => write!(f, "Running"),
            LessonStatus::Completed => write!(f, "Completed"),
            LessonStatus::Failed(err) => write!(f, "Failed: {}", err),
        }
    }
}

/// Error type for lesson operations
#[derive(Debug, Clone, PartialEq)]
pub enum LessonError {
    /// Configuration could not be read or parsed
    ConfigError(String),
    /// No lesson registered under the requested id
    NotFound(String),
    /// The lesson demonstration itself failed
    ExecutionError(String),
    /// Lesson not in the expected state
    InvalidStateError(String),
}

impl Display for LessonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LessonError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            LessonError::NotFound(msg) => write!(f, "Lesson not found: {}", msg),
            LessonError::ExecutionError(msg) => write!(f, "Execution error: {}", msg),
            LessonError::InvalidStateError(msg) => write!(f, "Invalid state: {}", msg),
        }
    }
}

impl Error for LessonError {}

/// Tunables shared by every lesson
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LessonConfig {
    /// Delay used by the simulated network calls, in milliseconds
    pub mock_delay_ms: u64,
    /// Attempts made by the retry demonstration
    pub retry_attempts: u32,
    /// Pause between retry attempts, in milliseconds
    pub retry_delay_ms: u64,
}

impl Default for LessonConfig {
    fn default() -> Self {
        Self {
            mock_delay_ms: 100,
            retry_attempts: 2,
            retry_delay_ms: 500,
        }
    }
}

impl LessonConfig {
    /// Configuration with every delay set to zero
    pub fn instant() -> Self {
        Self {
            mock_delay_ms: 0,
            retry_delay_ms: 0,
            ..Self::default()
        }
    }
}

/// How a single lesson run ended
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum LessonOutcome {
    Completed,
    Failed(String),
}

/// Record of one lesson run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LessonReport {
    /// Unique identifier for this run
    pub run_id: String,
    /// Lesson that was run
    pub lesson_id: String,
    /// Lesson title at the time of the run
    pub title: String,
    /// When the run started
    pub started_at: DateTime<Utc>,
    /// Wall-clock duration in milliseconds
    pub duration_ms: f64,
    /// Lines printed by the lesson
    pub lines: Vec<String>,
    /// Final outcome
    pub outcome: LessonOutcome,
}

impl LessonReport {
    pub fn succeeded(&self) -> bool {
        self.outcome == LessonOutcome::Completed
    }
}

/// Core trait for every lesson in the curriculum
#[async_trait]
pub trait Lesson: Send + Sync + Debug {
    /// Returns the lesson identifier
    fn id(&self) -> &str;

    /// Returns the human readable title
    fn title(&self) -> &str;

    /// Returns the status of the latest run
    fn status(&self) -> LessonStatus;

    /// Apply shared configuration before a run
    fn configure(&mut self, config: LessonConfig);

    /// Print the demonstration into the transcript
    async fn run(&mut self, transcript: &mut Transcript) -> Result<(), LessonError>;

    /// Get lesson-specific information
    fn get_info(&self) -> serde_json::Value;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_display() {
        assert_eq!(LessonStatus::Pending.to_string(), "Pending");
        assert_eq!(
            LessonStatus::Failed("boom".to_string()).to_string(),
            "Failed: boom"
        );
    }

    #[test]
    fn test_config_defaults_and_partial_json() {
        let config: LessonConfig = serde_json::from_str(r#"{"retry_attempts": 5}"#).unwrap();
        assert_eq!(config.retry_attempts, 5);
        assert_eq!(config.mock_delay_ms, 100);
        assert_eq!(LessonConfig::instant().retry_delay_ms, 0);
    }
}
