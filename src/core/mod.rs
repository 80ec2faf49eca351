//! Core of the curriculum
//!
//! The lesson contract, the transcript lessons print into, the curriculum
//! that sequences them, the lesson catalogue and run configuration.

pub mod catalogue;
pub mod config;
pub mod curriculum;
pub mod lesson;
pub mod transcript;

pub use config::{Command, CurriculumConfig};
pub use curriculum::{Curriculum, CurriculumState, CurriculumStatus};
pub use lesson::{Lesson, LessonConfig, LessonError, LessonOutcome, LessonReport, LessonStatus};
pub use transcript::Transcript;
