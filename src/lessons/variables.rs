use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::lesson::{Lesson, LessonConfig, LessonError, LessonStatus};
use crate::core::transcript::Transcript;
use crate::lessons::common::{run_tracked, BaseLesson};

#[allow(clippy::approx_constant)]
pub const PI: f64 = 3.14159;
pub const APP_NAME: &str = "My App";

/// Variables and constants: `let`, `mut`, `const`, shadowing and scope
#[derive(Debug)]
pub struct VariablesLesson {
    base: BaseLesson,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Person {
    pub name: String,
    pub age: u32,
}

pub fn calculate_area(width: f64, height: f64) -> f64 {
    let area = width * height;
    area
}

/// Lines produced by a block that shadows an outer binding
pub fn demonstrate_scope() -> Vec<String> {
    let mut lines = Vec::new();
    let outer_var = "I'm in the outer scope";

    {
        let inner_var = "I'm in the inner scope";
        let outer_var = "I'm shadowing the outer variable";
        lines.push(format!("Inner: {}", outer_var));
        lines.push(format!("Block scoped: {}", inner_var));
    }

    lines.push(format!("Outer: {}", outer_var));
    lines
}

pub fn shadowed_score() -> i32 {
    let score = 100;
    let score = score * 2;
    score
}

/// Comma separated, the way an array reads when interpolated into a string
pub fn join_numbers(numbers: &[i32]) -> String {
    numbers
        .iter()
        .map(|n| n.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

pub fn person_json(person: &Person) -> Result<String, LessonError> {
    serde_json::to_string(person)
        .map_err(|e| LessonError::ExecutionError(format!("Failed to serialize person: {}", e)))
}

fn demonstrate(transcript: &mut Transcript) -> Result<(), LessonError> {
    transcript.line("=== Rust 中的变量和常量 ===");

    let user_name = "Alice";
    let age: u32 = 25;
    let is_active = true;
    let message = "Hello, Rust!";
    let count = 42;

    let mut mutable_data = "I can change";
    transcript.line(format!("可变数据(修改前): {}", mutable_data));
    mutable_data = "I changed!";
    let immutable_data = "I cannot change";

    transcript.line(format!("用户名: {}", user_name));
    transcript.line(format!("年龄: {}", age));
    transcript.line(format!("活跃状态: {}", is_active));
    transcript.line(format!("消息: {}", message));
    transcript.line(format!("计数: {}", count));
    transcript.line(format!("PI: {}", PI));
    transcript.line(format!("应用名: {}", APP_NAME));
    transcript.line(format!("可变数据: {}", mutable_data));
    transcript.line(format!("不可变数据: {}", immutable_data));

    for line in demonstrate_scope() {
        transcript.line(line);
    }

    let numbers = [1, 2, 3, 4, 5];
    let person = Person {
        name: "Bob".to_string(),
        age: 30,
    };
    let (name, years) = ("Bob", 30);

    transcript.line(format!("分数: {}", shadowed_score()));
    transcript.line(format!("数字数组: {}", join_numbers(&numbers)));
    transcript.line(format!("人员信息: {}", person_json(&person)?));
    transcript.line(format!("元组: ({}, {})", name, years));
    transcript.line(format!("区域计算: {}", calculate_area(10.0, 5.0)));

    Ok(())
}

impl VariablesLesson {
    pub fn new() -> Self {
        Self {
            base: BaseLesson::new("variables", "变量和常量"),
        }
    }
}

impl Default for VariablesLesson {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Lesson for VariablesLesson {
    fn id(&self) -> &str {
        &self.base.id
    }

    fn title(&self) -> &str {
        &self.base.title
    }

    fn status(&self) -> LessonStatus {
        self.base.status.clone()
    }

    fn configure(&mut self, config: LessonConfig) {
        self.base.config = config;
    }

    async fn run(&mut self, transcript: &mut Transcript) -> Result<(), LessonError> {
        run_tracked(&mut self.base, async { demonstrate(transcript) }).await
    }

    fn get_info(&self) -> serde_json::Value {
        let mut info = self.base.info();
        info["constants"] = serde_json::json!({ "PI": PI, "APP_NAME": APP_NAME });
        info
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_and_shadowing() {
        assert_eq!(
            demonstrate_scope(),
            vec![
                "Inner: I'm shadowing the outer variable",
                "Block scoped: I'm in the inner scope",
                "Outer: I'm in the outer scope",
            ]
        );
        assert_eq!(shadowed_score(), 200);
    }

    #[test]
    fn test_helpers() {
        assert_eq!(calculate_area(10.0, 5.0), 50.0);
        assert_eq!(join_numbers(&[1, 2, 3, 4, 5]), "1,2,3,4,5");
        let person = Person {
            name: "Bob".to_string(),
            age: 30,
        };
        assert_eq!(person_json(&person).unwrap(), r#"{"name":"Bob","age":30}"#);
    }

    #[tokio::test]
    async fn test_run_output() {
        let mut lesson = VariablesLesson::new();
        let mut transcript = Transcript::silent();
        lesson.run(&mut transcript).await.unwrap();

        assert!(transcript.contains("PI: 3.14159"));
        assert!(transcript.contains("可变数据: I changed!"));
        assert!(transcript.contains(r#"人员信息: {"name":"Bob","age":30}"#));
        assert!(transcript.contains("区域计算: 50"));
        assert_eq!(lesson.get_info()["constants"]["APP_NAME"], "My App");
    }
}
