//! Lessons of the curriculum
//!
//! Each module demonstrates one area of the language and exposes its
//! building blocks as plain functions and types, plus a `Lesson` that prints
//! the walkthrough.

pub mod common;
pub mod overview;
pub mod variables;
pub mod data_types;
pub mod ownership;
pub mod functions;
pub mod pattern_matching;
pub mod error_handling;
pub mod loops;
pub mod conditionals;

// Re-export lessons for convenience
pub use overview::OverviewLesson;
pub use variables::VariablesLesson;
pub use data_types::DataTypesLesson;
pub use ownership::OwnershipLesson;
pub use functions::FunctionsLesson;
pub use pattern_matching::PatternMatchingLesson;
pub use error_handling::ErrorHandlingLesson;
pub use loops::LoopsLesson;
pub use conditionals::ConditionalsLesson;
