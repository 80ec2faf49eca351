use std::f64::consts::PI;
use std::fmt::Display;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::core::lesson::{Lesson, LessonConfig, LessonError, LessonStatus};
use crate::core::transcript::Transcript;
use crate::lessons::common::{run_tracked, BaseLesson};

/// Pattern matching: `match`, sum types, destructuring, guards, ranges
#[derive(Debug)]
pub struct PatternMatchingLesson {
    base: BaseLesson,
}

pub fn process_number(value: i32) -> &'static str {
    match value {
        0 => "零",
        1 => "一",
        2 => "二",
        3 => "三",
        _ => "其他数字",
    }
}

pub fn process_status(status: &str) -> &'static str {
    match status {
        "pending" => "等待处理",
        "approved" => "已批准",
        "rejected" => "已拒绝",
        _ => "未知状态",
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Circle { radius: f64 },
    Rectangle { width: f64, height: f64 },
    Triangle { base: f64, height: f64 },
}

impl Shape {
    pub fn kind(&self) -> &'static str {
        match self {
            Shape::Circle { .. } => "circle",
            Shape::Rectangle { .. } => "rectangle",
            Shape::Triangle { .. } => "triangle",
        }
    }
}

/// Exhaustive: adding a variant without an arm is a compile error
pub fn calculate_area(shape: &Shape) -> f64 {
    match *shape {
        Shape::Circle { radius } => PI * radius * radius,
        Shape::Rectangle { width, height } => width * height,
        Shape::Triangle { base, height } => base * height / 2.0,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ApiResponse {
    Success(Value),
    Error { error: String, code: u16 },
    Loading,
}

pub fn handle_api_response(response: &ApiResponse) -> String {
    match response {
        ApiResponse::Success(data) => format!("成功: {}", data),
        ApiResponse::Error { error, code } => format!("错误 {}: {}", code, error),
        ApiResponse::Loading => "加载中...".to_string(),
    }
}

pub fn describe_slice<T: Display>(items: &[T]) -> String {
    match items {
        [] => "空数组".to_string(),
        [only] => format!("单元素数组: {}", only),
        [first, second] => format!("双元素数组: {}, {}", first, second),
        _ => format!("多元素数组，长度: {}", items.len()),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Person {
    User { name: String, email: String },
    Admin { name: String, permissions: Vec<String> },
    Guest,
}

pub fn get_person_info(person: &Person) -> String {
    match person {
        Person::User { name, email } => format!("用户: {} ({})", name, email),
        Person::Admin { name, permissions } => {
            format!("管理员: {} - 权限: {}", name, permissions.join(", "))
        }
        Person::Guest => "访客用户".to_string(),
    }
}

/// Classify a value whose shape is only known at runtime
pub fn classify_value(value: &Value) -> String {
    match value {
        Value::String(s) if s.is_empty() => "空字符串".to_string(),
        Value::String(s) if s.chars().count() < 5 => "短字符串".to_string(),
        Value::String(_) => "长字符串".to_string(),
        Value::Number(n) => match n.as_f64() {
            Some(x) if x == 0.0 => "零".to_string(),
            Some(x) if x > 0.0 => "正数".to_string(),
            _ => "负数".to_string(),
        },
        Value::Array(items) => format!("数组，长度: {}", items.len()),
        _ => "未知类型".to_string(),
    }
}

pub fn map_option<T, U>(option: Option<T>, f: impl FnOnce(T) -> U) -> Option<U> {
    match option {
        Some(value) => Some(f(value)),
        None => None,
    }
}

pub fn unwrap_option<T>(option: Option<T>, default_value: T) -> T {
    match option {
        Some(value) => value,
        None => default_value,
    }
}

pub fn divide(a: f64, b: f64) -> Result<f64, String> {
    if b == 0.0 {
        return Err("除零错误".to_string());
    }
    Ok(a / b)
}

pub fn handle_result<T: Display, E: Display>(result: &Result<T, E>) -> String {
    match result {
        Ok(value) => format!("成功: {}", value),
        Err(error) => format!("错误: {}", error),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Tree<T> {
    Leaf(T),
    Branch(Box<Tree<T>>, Box<Tree<T>>),
}

impl<T> Tree<T> {
    pub fn branch(left: Tree<T>, right: Tree<T>) -> Self {
        Tree::Branch(Box::new(left), Box::new(right))
    }
}

pub fn sum_tree(tree: &Tree<i64>) -> i64 {
    match tree {
        Tree::Leaf(value) => *value,
        Tree::Branch(left, right) => sum_tree(left) + sum_tree(right),
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

pub fn process_point(point: Point) -> String {
    match point {
        Point { x: 0, y: 0 } => "原点".to_string(),
        Point { x, y: 0 } => format!("在 x 轴上, x = {}", x),
        Point { x: 0, y } => format!("在 y 轴上, y = {}", y),
        Point { x, y } => format!("点 ({}, {})", x, y),
    }
}

pub fn process_tuple(tuple: (i32, i32)) -> String {
    match tuple {
        (0, 0) => "两个都是零".to_string(),
        (a, b) if a == b => format!("相等: {}", a),
        (a, b) if a.checked_add(b) == Some(0) => format!("互为相反数: {} 和 {}", a, b),
        (a, b) => format!("其他: ({}, {})", a, b),
    }
}

pub fn categorize_number(num: i32) -> &'static str {
    match num {
        n if n < 0 => "负数",
        0 => "零",
        n if n % 2 == 0 => "正偶数",
        _ => "正奇数",
    }
}

pub fn match_range(num: i32) -> &'static str {
    match num {
        i32::MIN..=-1 => "负数",
        0 => "零",
        1..=9 => "个位数",
        10..=99 => "两位数",
        _ => "大数",
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Quit,
    Move { x: i32, y: i32 },
    Write(String),
    ChangeColor(u8, u8, u8),
}

pub fn process_message(message: &Message) -> String {
    match message {
        Message::Quit => "退出".to_string(),
        Message::Move { x, y } => format!("移动到 ({}, {})", x, y),
        Message::Write(text) => format!("写入: {}", text),
        Message::ChangeColor(r, g, b) => format!("颜色变为 #{:02x}{:02x}{:02x}", r, g, b),
    }
}

fn demonstrate(transcript: &mut Transcript) -> Result<(), LessonError> {
    transcript.line("=== Rust 模式匹配演示 ===");

    transcript.line(format!("数字匹配: {}", process_number(1)));
    transcript.line(format!("状态匹配: {}", process_status("approved")));

    let shapes = [
        Shape::Circle { radius: 5.0 },
        Shape::Rectangle {
            width: 4.0,
            height: 6.0,
        },
        Shape::Triangle {
            base: 3.0,
            height: 4.0,
        },
    ];
    for shape in &shapes {
        transcript.line(format!("{} 面积: {}", shape.kind(), calculate_area(shape)));
    }

    let responses = [
        ApiResponse::Success(json!({ "id": 1, "name": "Alice" })),
        ApiResponse::Error {
            error: "Not found".to_string(),
            code: 404,
        },
        ApiResponse::Loading,
    ];
    for response in &responses {
        transcript.line(format!("API 响应: {}", handle_api_response(response)));
    }

    transcript.line(format!("数组匹配: {}", describe_slice::<i32>(&[])));
    transcript.line(format!("数组匹配: {}", describe_slice(&[1])));
    transcript.line(format!("数组匹配: {}", describe_slice(&[1, 2])));
    transcript.line(format!("数组匹配: {}", describe_slice(&[1, 2, 3, 4])));

    let people = [
        Person::User {
            name: "Alice".to_string(),
            email: "alice@example.com".to_string(),
        },
        Person::Admin {
            name: "Bob".to_string(),
            permissions: vec!["read".to_string(), "write".to_string(), "delete".to_string()],
        },
        Person::Guest,
    ];
    for person in &people {
        transcript.line(format!("人员信息: {}", get_person_info(person)));
    }

    let values = [
        json!("hello"),
        json!(""),
        json!("a very long string"),
        json!(42),
        json!(0),
        json!(-10),
        json!([1, 2, 3]),
        json!({}),
    ];
    for value in &values {
        transcript.line(format!("值处理: {}", classify_value(value)));
    }

    let some_value = Some(42);
    let none_value: Option<i32> = None;
    transcript.line(format!(
        "Option 映射: {}",
        unwrap_option(map_option(some_value, |x| x * 2), 0)
    ));
    transcript.line(format!("Option 默认值: {}", unwrap_option(none_value, 100)));

    for result in [divide(10.0, 2.0), divide(10.0, 0.0)] {
        transcript.line(format!("除法结果: {}", handle_result(&result)));
    }

    let tree = Tree::branch(Tree::Leaf(1), Tree::branch(Tree::Leaf(2), Tree::Leaf(3)));
    transcript.line(format!("树的和: {}", sum_tree(&tree)));

    transcript.section("解构、守卫和范围");
    for point in [Point { x: 0, y: 0 }, Point { x: 3, y: 0 }, Point { x: 1, y: 2 }] {
        transcript.line(format!("点: {}", process_point(point)));
    }
    for tuple in [(0, 0), (2, 2), (3, -3), (1, 5)] {
        transcript.line(format!("元组: {}", process_tuple(tuple)));
    }
    for num in [-5, 0, 4, 7] {
        transcript.line(format!(
            "{}: {} / {}",
            num,
            categorize_number(num),
            match_range(num)
        ));
    }
    let messages = [
        Message::Move { x: 10, y: 20 },
        Message::Write("hello".to_string()),
        Message::ChangeColor(255, 128, 0),
        Message::Quit,
    ];
    for message in &messages {
        transcript.line(format!("消息: {}", process_message(message)));
    }

    Ok(())
}

impl PatternMatchingLesson {
    pub fn new() -> Self {
        Self {
            base: BaseLesson::new("pattern_matching", "模式匹配"),
        }
    }
}

impl Default for PatternMatchingLesson {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Lesson for PatternMatchingLesson {
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
    fn test_literal_matches() {
        assert_eq!(process_number(1), "一");
        assert_eq!(process_number(9), "其他数字");
        assert_eq!(process_status("approved"), "已批准");
        assert_eq!(process_status("archived"), "未知状态");
    }

    #[test]
    fn test_shapes() {
        let circle = Shape::Circle { radius: 5.0 };
        assert!((calculate_area(&circle) - 78.53981633974483).abs() < 1e-12);
        assert_eq!(
            calculate_area(&Shape::Rectangle {
                width: 4.0,
                height: 6.0
            }),
            24.0
        );
        assert_eq!(
            calculate_area(&Shape::Triangle {
                base: 3.0,
                height: 4.0
            }),
            6.0
        );
        assert_eq!(circle.kind(), "circle");
    }

    #[test]
    fn test_api_responses() {
        let success = ApiResponse::Success(json!({ "id": 1, "name": "Alice" }));
        assert_eq!(handle_api_response(&success), r#"成功: {"id":1,"name":"Alice"}"#);
        let error = ApiResponse::Error {
            error: "Not found".to_string(),
            code: 404,
        };
        assert_eq!(handle_api_response(&error), "错误 404: Not found");
        assert_eq!(handle_api_response(&ApiResponse::Loading), "加载中...");
    }

    #[test]
    fn test_slice_patterns() {
        assert_eq!(describe_slice::<i32>(&[]), "空数组");
        assert_eq!(describe_slice(&[1]), "单元素数组: 1");
        assert_eq!(describe_slice(&[1, 2]), "双元素数组: 1, 2");
        assert_eq!(describe_slice(&[1, 2, 3, 4]), "多元素数组，长度: 4");
    }

    #[test]
    fn test_people() {
        let admin = Person::Admin {
            name: "Bob".to_string(),
            permissions: vec!["read".to_string(), "write".to_string(), "delete".to_string()],
        };
        assert_eq!(get_person_info(&admin), "管理员: Bob - 权限: read, write, delete");
        assert_eq!(get_person_info(&Person::Guest), "访客用户");
    }

    #[test]
    fn test_classify_value() {
        assert_eq!(classify_value(&json!("hello")), "长字符串");
        assert_eq!(classify_value(&json!("")), "空字符串");
        assert_eq!(classify_value(&json!("hey")), "短字符串");
        assert_eq!(classify_value(&json!(42)), "正数");
        assert_eq!(classify_value(&json!(0)), "零");
        assert_eq!(classify_value(&json!(-10)), "负数");
        assert_eq!(classify_value(&json!([1, 2, 3])), "数组，长度: 3");
        assert_eq!(classify_value(&json!({})), "未知类型");
        assert_eq!(classify_value(&Value::Null), "未知类型");
    }

    #[test]
    fn test_option_and_result() {
        assert_eq!(unwrap_option(map_option(Some(42), |x| x * 2), 0), 84);
        assert_eq!(unwrap_option(None, 100), 100);
        assert_eq!(handle_result(&divide(10.0, 2.0)), "成功: 5");
        assert_eq!(handle_result(&divide(10.0, 0.0)), "错误: 除零错误");
    }

    #[test]
    fn test_sum_tree() {
        let tree = Tree::branch(Tree::Leaf(1), Tree::branch(Tree::Leaf(2), Tree::Leaf(3)));
        assert_eq!(sum_tree(&tree), 6);
        assert_eq!(sum_tree(&Tree::Leaf(-4)), -4);
    }

    #[test]
    fn test_destructuring_and_guards() {
        assert_eq!(process_point(Point { x: 0, y: 0 }), "原点");
        assert_eq!(process_point(Point { x: 3, y: 0 }), "在 x 轴上, x = 3");
        assert_eq!(process_point(Point { x: 0, y: -2 }), "在 y 轴上, y = -2");
        assert_eq!(process_tuple((2, 2)), "相等: 2");
        assert_eq!(process_tuple((3, -3)), "互为相反数: 3 和 -3");
        assert_eq!(
            process_tuple((i32::MAX, 1)),
            format!("其他: ({}, 1)", i32::MAX)
        );
        assert_eq!(
            process_tuple((i32::MAX, i32::MIN + 1)),
            format!("互为相反数: {} 和 {}", i32::MAX, i32::MIN + 1)
        );
        assert_eq!(categorize_number(-1), "负数");
        assert_eq!(categorize_number(4), "正偶数");
        assert_eq!(categorize_number(7), "正奇数");
        assert_eq!(match_range(-5), "负数");
        assert_eq!(match_range(42), "两位数");
        assert_eq!(match_range(100), "大数");
        assert_eq!(
            process_message(&Message::ChangeColor(255, 128, 0)),
            "颜色变为 #ff8000"
        );
    }

    #[tokio::test]
    async fn test_run_output() {
        let mut lesson = PatternMatchingLesson::new();
        let mut transcript = Transcript::silent();
        lesson.run(&mut transcript).await.unwrap();

        assert!(transcript.contains("circle 面积: 78.53981633974483"));
        assert!(transcript.contains("rectangle 面积: 24"));
        assert!(transcript.contains("Option 映射: 84"));
        assert!(transcript.contains("除法结果: 错误: 除零错误"));
        assert!(transcript.contains("树的和: 6"));
    }
}
