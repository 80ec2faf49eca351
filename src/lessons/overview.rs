use async_trait::async_trait;

use crate::core::catalogue::render_index;
use crate::core::lesson::{Lesson, LessonConfig, LessonError, LessonStatus};
use crate::core::transcript::Transcript;
use crate::lessons::common::{run_tracked, BaseLesson};

/// Intro page: the module index plus a short preview of what is ahead
#[derive(Debug)]
pub struct OverviewLesson {
    base: BaseLesson,
}

pub fn safe_divide(a: f64, b: f64) -> Result<f64, String> {
    if b == 0.0 {
        Err("不能除以零".to_string())
    } else {
        Ok(a / b)
    }
}

pub fn classify_magnitude(number: u32) -> &'static str {
    match number {
        0 => "零",
        1..=10 => "小数",
        11..=100 => "中数",
        _ => "大数",
    }
}

fn demonstrate(transcript: &mut Transcript) -> Result<(), LessonError> {
    transcript.line("🦀 欢迎来到 Rust 基础课程! ✨");
    transcript.blank();
    transcript.line("📚 基础课程模块:");
    for line in render_index() {
        transcript.line(line);
    }

    transcript.blank();
    transcript.line("🔍 Rust 特性预览:");

    let owned_string = String::from("Hello, Rust!");
    let borrowed_string = &owned_string;
    transcript.line(format!("  所有权: {} (借用: {})", owned_string, borrowed_string));

    let number = 42;
    transcript.line(format!(
        "  模式匹配: {} 是 {}",
        number,
        classify_magnitude(number)
    ));

    match safe_divide(10.0, 2.0) {
        Ok(result) => transcript.line(format!("  错误处理: 10 ÷ 2 = {}", result)),
        Err(e) => transcript.line(format!("  错误处理: {}", e)),
    }

    let numbers: Vec<i32> = (1..=5).collect();
    let doubled: Vec<i32> = numbers.iter().map(|x| x * 2).collect();
    transcript.line(format!("  迭代器: {:?} → {:?}", numbers, doubled));

    Ok(())
}

impl OverviewLesson {
    pub fn new() -> Self {
        Self {
            base: BaseLesson::new("overview", "Rust 特性预览"),
        }
    }
}

impl Default for OverviewLesson {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Lesson for OverviewLesson {
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
        self.base.info()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_divide() {
        assert_eq!(safe_divide(10.0, 2.0), Ok(5.0));
        assert_eq!(safe_divide(1.0, 0.0), Err("不能除以零".to_string()));
    }

    #[test]
    fn test_classify_magnitude() {
        assert_eq!(classify_magnitude(0), "零");
        assert_eq!(classify_magnitude(10), "小数");
        assert_eq!(classify_magnitude(42), "中数");
        assert_eq!(classify_magnitude(101), "大数");
    }

    #[tokio::test]
    async fn test_run_prints_preview() {
        let mut lesson = OverviewLesson::new();
        let mut transcript = Transcript::silent();
        lesson.run(&mut transcript).await.unwrap();

        assert!(transcript.contains("模式匹配: 42 是 中数"));
        assert!(transcript.contains("错误处理: 10 ÷ 2 = 5"));
        assert!(transcript.contains("迭代器: [1, 2, 3, 4, 5] → [2, 4, 6, 8, 10]"));
        assert_eq!(lesson.status(), LessonStatus::Completed);
    }
}
