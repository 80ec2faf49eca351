use chrono::{DateTime, Utc};
use log::{debug, error, warn};
use serde::{Deserialize, Serialize};

use crate::core::lesson::{LessonConfig, LessonError, LessonStatus};

/// Base functionality shared by all lessons
#[derive(Debug)]
pub struct BaseLesson {
    /// Lesson identifier
    pub id: String,
    /// Lesson title
    pub title: String,
    /// Status of the latest run
    pub status: LessonStatus,
    /// Configuration
    pub config: LessonConfig,
    /// Run statistics
    pub metrics: RunMetrics,
    /// Log of recent events
    pub event_log: Vec<LessonEvent>,
}

/// Run statistics for a lesson
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunMetrics {
    /// Completed runs
    pub runs_completed: u64,
    /// Failed runs
    pub runs_failed: u64,
    /// Average run time in ms
    pub avg_run_time: f64,
    /// Last run time in ms
    pub last_run_time: f64,
    /// When the last run finished
    pub last_run_at: Option<DateTime<Utc>>,
}

/// Lesson event for logging
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LessonEvent {
    pub timestamp: DateTime<Utc>,
    pub event_type: EventType,
    pub description: String,
}

/// Types of lesson events
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub enum EventType {
    StateChange,
    Error,
    Warning,
    Info,
}

const MAX_EVENTS: usize = 200;

impl BaseLesson {
    pub fn new(id: &str, title: &str) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            status: LessonStatus::Pending,
            config: LessonConfig::default(),
            metrics: RunMetrics::default(),
            event_log: Vec::new(),
        }
    }

    /// Record an event and mirror it to the logger
    pub fn log_event(&mut self, event_type: EventType, description: &str) {
        self.event_log.push(LessonEvent {
            timestamp: Utc::now(),
            event_type,
            description: description.to_string(),
        });

        if self.event_log.len() > MAX_EVENTS {
            self.event_log.drain(0..MAX_EVENTS / 2);
        }

        match event_type {
            EventType::Error => error!("{}: {}", self.id, description),
            EventType::Warning => warn!("{}: {}", self.id, description),
            _ => debug!("{}: {}", self.id, description),
        }
    }

    pub fn mark_running(&mut self) {
        self.status = LessonStatus::Running;
        self.log_event(EventType::StateChange, "run started");
    }

    /// Close a run and fold its duration into the running average
    pub fn record_run(&mut self, success: bool, run_time_ms: f64) {
        if success {
            self.metrics.runs_completed += 1;
            self.status = LessonStatus::Completed;
        } else {
            self.metrics.runs_failed += 1;
        }

        let total_runs = self.metrics.runs_completed + self.metrics.runs_failed;
        if total_runs > 1 {
            self.metrics.avg_run_time = (self.metrics.avg_run_time * (total_runs - 1) as f64
                + run_time_ms)
                / total_runs as f64;
        } else {
            self.metrics.avg_run_time = run_time_ms;
        }

        self.metrics.last_run_time = run_time_ms;
        self.metrics.last_run_at = Some(Utc::now());
        self.log_event(EventType::StateChange, "run finished");
    }

    pub fn mark_failed(&mut self, reason: &str) {
        self.status = LessonStatus::Failed(reason.to_string());
        self.log_event(EventType::Error, reason);
    }

    /// Shared part of every lesson's `get_info`
    pub fn info(&self) -> serde_json::Value {
        serde_json::json!({
            "id": self.id,
            "title": self.title,
            "status": self.status.to_string(),
            "metrics": self.metrics,
            "config": self.config,
        })
    }
}

/// Helper function to measure execution time
pub async fn measure_execution_time<F, T, E>(f: F) -> (Result<T, E>, f64)
where
    F: std::future::Future<Output = Result<T, E>>,
{
    let start = std::time::Instant::now();
    let result = f.await;
    let duration_ms = start.elapsed().as_secs_f64() * 1000.0;

    (result, duration_ms)
}

/// Run a lesson body, keeping the base status and metrics in step with it
pub async fn run_tracked<F>(base: &mut BaseLesson, body: F) -> Result<(), LessonError>
where
    F: std::future::Future<Output = Result<(), LessonError>>,
{
    base.mark_running();
    let (result, duration_ms) = measure_execution_time(body).await;
    base.record_run(result.is_ok(), duration_ms);
    if let Err(e) = &result {
        base.mark_failed(&e.to_string());
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_run_tracked_sets_status() {
        let mut base = BaseLesson::new("demo", "Demo");
        run_tracked(&mut base, async { Ok(()) }).await.unwrap();
        assert_eq!(base.status, LessonStatus::Completed);

        let err = run_tracked(&mut base, async {
            Err(LessonError::ExecutionError("boom".to_string()))
        })
        .await
        .unwrap_err();
        assert_eq!(err, LessonError::ExecutionError("boom".to_string()));
        assert!(matches!(base.status, LessonStatus::Failed(_)));
        assert_eq!(base.metrics.runs_failed, 1);
    }

    #[test]
    fn test_record_run_averages() {
        let mut base = BaseLesson::new("demo", "Demo");
        base.record_run(true, 10.0);
        base.record_run(false, 30.0);
        assert_eq!(base.metrics.runs_completed, 1);
        assert_eq!(base.metrics.runs_failed, 1);
        assert!((base.metrics.avg_run_time - 20.0).abs() < f64::EPSILON);
        assert_eq!(base.metrics.last_run_time, 30.0);
    }

    #[test]
    fn test_event_log_is_trimmed() {
        let mut base = BaseLesson::new("demo", "Demo");
        for i in 0..=MAX_EVENTS {
            base.log_event(EventType::Info, &format!("event {}", i));
        }
        assert!(base.event_log.len() <= MAX_EVENTS);
    }

    #[tokio::test]
    async fn test_measure_execution_time() {
        let (result, ms) = measure_execution_time(async { Ok::<_, String>(7) }).await;
        assert_eq!(result, Ok(7));
        assert!(ms >= 0.0);
    }
}
