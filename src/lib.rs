//! Rust Basics
//!
//! A runnable curriculum of core-language lessons: variables, data types,
//! ownership, functions, pattern matching, error handling, loops and
//! conditionals.

pub mod core;
pub mod lessons;
