use std::path::Path;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::core::catalogue::find_entry;
use crate::core::lesson::{LessonConfig, LessonError};

/// Environment variable naming an optional JSON configuration file
pub const CONFIG_ENV_VAR: &str = "RUST_BASICS_CONFIG";

/// What the command line asks for
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Print the lesson index and exit
    List,
    /// Run these lessons; empty means the configured selection
    Run(Vec<String>),
}

impl Command {
    /// `--list` anywhere wins; everything else is a lesson id
    pub fn parse(args: Vec<String>) -> Self {
        if args.iter().any(|arg| arg == "--list") {
            Command::List
        } else {
            Command::Run(args)
        }
    }
}

/// Configuration for a curriculum run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CurriculumConfig {
    /// Print lesson output to stdout while recording it
    pub echo: bool,
    /// Lessons to run, in order; empty means all of them
    pub lessons: Vec<String>,
    /// Settings handed to every lesson
    pub lesson: LessonConfig,
}

impl Default for CurriculumConfig {
    fn default() -> Self {
        Self {
            echo: true,
            lessons: Vec::new(),
            lesson: LessonConfig::default(),
        }
    }
}

impl CurriculumConfig {
    /// Parse a configuration from JSON text
    pub fn from_json(text: &str) -> Result<Self, LessonError> {
        serde_json::from_str(text)
            .map_err(|e| LessonError::ConfigError(format!("Invalid configuration: {}", e)))
    }

    /// Read a configuration file
    pub fn from_file(path: &Path) -> Result<Self, LessonError> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            LessonError::ConfigError(format!("Failed to read {}: {}", path.display(), e))
        })?;
        debug!("Loaded configuration from {}", path.display());
        Self::from_json(&text)
    }

    /// Defaults, or the file named by `RUST_BASICS_CONFIG` when it is set
    pub fn load_from_env() -> Result<Self, LessonError> {
        match std::env::var(CONFIG_ENV_VAR) {
            Ok(path) if !path.is_empty() => {
                info!("Using configuration file {}", path);
                Self::from_file(Path::new(&path))
            }
            _ => Ok(Self::default()),
        }
    }

    /// Lesson ids given on the command line replace the configured selection
    pub fn with_cli_lessons(mut self, ids: Vec<String>) -> Self {
        if !ids.is_empty() {
            self.lessons = ids;
        }
        self
    }

    /// Ids in the selection that name no known lesson
    pub fn unknown_lessons(&self) -> Vec<&str> {
        self.lessons
            .iter()
            .map(String::as_str)
            .filter(|id| find_entry(id).is_none())
            .collect()
    }
}
