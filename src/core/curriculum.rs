use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::core::lesson::{Lesson, LessonConfig, LessonError, LessonOutcome, LessonReport};
use crate::core::transcript::Transcript;

/// The curriculum owns the lessons and runs them one after another.
/// Lessons never see each other; the curriculum only sequences them and
/// keeps a report per run.
#[derive(Debug)]
pub struct Curriculum {
    /// Lessons by id
    lessons: HashMap<String, Arc<RwLock<dyn Lesson>>>,
    /// Registration order
    order: Vec<String>,
    /// Current status
    status: CurriculumStatus,
    /// Reports of every run so far
    reports: Vec<LessonReport>,
}

/// Overall curriculum status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurriculumStatus {
    /// Current state
    pub state: CurriculumState,
    /// Last state update time
    pub last_updated: DateTime<Utc>,
    /// Registered lesson count
    pub registered_lessons: usize,
    /// Runs that completed without error
    pub completed_runs: usize,
    /// Error messages if any
    pub errors: Vec<String>,
}

impl CurriculumStatus {
    /// Process exit status: 1 once any lesson failed or an id was unknown, else 0
    pub fn exit_code(&self) -> u8 {
        match self.state {
            CurriculumState::Failed => 1,
            _ => 0,
        }
    }
}

/// Curriculum states
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub enum CurriculumState {
    /// Nothing has run yet
    Idle,
    /// Lessons are running
    Running,
    /// The last batch finished without failures
    Finished,
    /// At least one lesson of the last batch failed
    Failed,
}

impl Curriculum {
    pub fn new() -> Self {
        Self {
            lessons: HashMap::new(),
            order: Vec::new(),
            status: CurriculumStatus {
                state: CurriculumState::Idle,
                last_updated: Utc::now(),
                registered_lessons: 0,
                completed_runs: 0,
                errors: Vec::new(),
            },
            reports: Vec::new(),
        }
    }

    /// Register a lesson; an existing id is replaced in place
    pub fn register_lesson(&mut self, id: &str, lesson: Arc<RwLock<dyn Lesson>>) {
        if self.lessons.insert(id.to_string(), lesson).is_some() {
            warn!("Replacing existing lesson with ID: {}", id);
        } else {
            self.order.push(id.to_string());
        }
        self.status.registered_lessons = self.lessons.len();
        info!("Registered lesson: {}", id);
    }

    /// Remove a lesson from the curriculum
    pub fn unregister_lesson(&mut self, id: &str) -> bool {
        let removed = self.lessons.remove(id).is_some();
        if removed {
            self.order.retain(|existing| existing != id);
            self.status.registered_lessons = self.lessons.len();
            info!("Unregistered lesson: {}", id);
        } else {
            warn!("Attempted to unregister non-existent lesson: {}", id);
        }
        removed
    }

    pub fn get_lesson(&self, id: &str) -> Option<&Arc<RwLock<dyn Lesson>>> {
        self.lessons.get(id)
    }

    /// Lesson ids in registration order
    pub fn lesson_ids(&self) -> &[String] {
        &self.order
    }

    /// Hand the same configuration to every lesson
    pub async fn configure_all(&self, config: &LessonConfig) {
        for id in &self.order {
            if let Some(lesson) = self.lessons.get(id) {
                lesson.write().await.configure(config.clone());
            }
        }
    }

    /// Run one lesson and record its report
    pub async fn run_lesson(
        &mut self,
        id: &str,
        transcript: &mut Transcript,
    ) -> Result<LessonReport, LessonError> {
        let lesson = self
            .lessons
            .get(id)
            .cloned()
            .ok_or_else(|| LessonError::NotFound(id.to_string()))?;

        let started_at = Utc::now();
        let start = std::time::Instant::now();
        let mut lesson = lesson.write().await;
        let title = lesson.title().to_string();
        info!("Running lesson: {}", id);

        // Only this lesson's lines end up in its report
        let mark = transcript.len();
        let result = lesson.run(transcript).await;
        let lines = transcript.lines_since(mark);

        let outcome = match &result {
            Ok(()) => {
                self.status.completed_runs += 1;
                LessonOutcome::Completed
            }
            Err(e) => {
                error!("Lesson {} failed: {}", id, e);
                self.status.errors.push(format!("{}: {}", id, e));
                LessonOutcome::Failed(e.to_string())
            }
        };
        self.status.last_updated = Utc::now();

        let report = LessonReport {
            run_id: Uuid::new_v4().to_string(),
            lesson_id: id.to_string(),
            title,
            started_at,
            duration_ms: start.elapsed().as_secs_f64() * 1000.0,
            lines,
            outcome,
        };
        self.reports.push(report.clone());

        result.map(|_| report)
    }

    /// Run the given lessons in order; failures are recorded and skipped past
    pub async fn run_selected(
        &mut self,
        ids: &[String],
        transcript: &mut Transcript,
    ) -> Vec<LessonReport> {
        self.status.state = CurriculumState::Running;
        self.status.last_updated = Utc::now();

        let mut reports = Vec::new();
        let mut failed = false;
        for id in ids {
            match self.run_lesson(id, transcript).await {
                Ok(report) => reports.push(report),
                Err(LessonError::NotFound(missing)) => {
                    failed = true;
                    error!("Unknown lesson: {}", missing);
                    self.status.errors.push(format!("unknown lesson: {}", missing));
                }
                Err(_) => {
                    failed = true;
                    if let Some(report) = self.reports.last() {
                        reports.push(report.clone());
                    }
                }
            }
        }

        self.status.state = if failed {
            CurriculumState::Failed
        } else {
            CurriculumState::Finished
        };
        self.status.last_updated = Utc::now();
        reports
    }

    /// Run every registered lesson in registration order
    pub async fn run_all(&mut self, transcript: &mut Transcript) -> Vec<LessonReport> {
        let ids = self.order.clone();
        self.run_selected(&ids, transcript).await
    }

    pub fn get_status(&self) -> &CurriculumStatus {
        &self.status
    }

    /// Reports of every run so far, oldest first
    pub fn reports(&self) -> &[LessonReport] {
        &self.reports
    }
}

impl Default for Curriculum {
    fn default() -> Self {
        Self::new()
    }
}
