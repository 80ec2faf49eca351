use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::lesson::{Lesson, LessonConfig, LessonError, LessonStatus};
use crate::core::transcript::Transcript;
use crate::lessons::common::{run_tracked, BaseLesson};

/// Conditionals: `if`/`else`, `match` as a switch, guards, `Option` checks
#[derive(Debug)]
pub struct ConditionalsLesson {
    base: BaseLesson,
}

pub fn check_age(age: u32) -> &'static str {
    if age < 13 {
        "儿童"
    } else if age < 18 {
        "青少年"
    } else if age < 65 {
        "成年人"
    } else {
        "老年人"
    }
}

pub fn get_weekday(day: u32) -> &'static str {
    match day {
        1 => "星期一",
        2 => "星期二",
        3 => "星期三",
        4 => "星期四",
        5 => "星期五",
        6 => "星期六",
        7 => "星期日",
        _ => "无效的日期",
    }
}

pub fn is_even(num: i64) -> &'static str {
    if num % 2 == 0 {
        "偶数"
    } else {
        "奇数"
    }
}

/// Unsigned so that `i64::MIN` has an absolute value too
pub fn get_absolute_value(num: i64) -> u64 {
    num.unsigned_abs()
}

pub fn check_access(username: &str, password: &str, is_active: bool) -> &'static str {
    if username.is_empty() {
        "缺少用户名"
    } else if password.is_empty() {
        "缺少密码"
    } else if !is_active {
        "账户未激活"
    } else {
        "访问允许"
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
    Guest,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
            Role::Guest => "guest",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub name: String,
    pub age: u32,
    pub role: Role,
    pub is_active: bool,
}

impl User {
    pub fn new(name: &str, age: u32, role: Role, is_active: bool) -> Self {
        Self {
            name: name.to_string(),
            age,
            role,
            is_active,
        }
    }
}

pub fn get_user_permissions(user: &User) -> Vec<&'static str> {
    let mut permissions = Vec::new();
    if !user.is_active {
        return permissions;
    }

    permissions.push("login");
    match user.role {
        Role::Admin => permissions.extend(["read", "write", "delete", "manage_users"]),
        Role::User => permissions.extend(["read", "write"]),
        Role::Guest => permissions.push("read"),
    }
    if user.age >= 18 {
        permissions.push("access_adult_content");
    }

    permissions
}

/// A value that is one of a few known kinds
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Number(f64),
    Boolean(bool),
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Text(text) => write!(f, "{:?}", text),
            Value::Number(n) => write!(f, "{}", n),
            Value::Boolean(b) => write!(f, "{}", b),
        }
    }
}

pub fn process_value(value: &Value) -> String {
    match value {
        Value::Text(text) => format!("字符串: {}", text.to_uppercase()),
        Value::Number(n) if *n > 0.0 => format!("正数: {}", n),
        Value::Number(n) if *n < 0.0 => format!("负数: {}", n),
        Value::Number(_) => "零".to_string(),
        Value::Boolean(true) => "真值".to_string(),
        Value::Boolean(false) => "假值".to_string(),
    }
}

pub fn process_optional_value(value: Option<&str>) -> String {
    match value {
        Some("") => "空字符串".to_string(),
        Some(text) => format!("有值: {}", text),
        None => "无值".to_string(),
    }
}

/// Quoted text, or `null` when absent
pub fn render_optional(value: Option<&str>) -> String {
    match value {
        Some(text) => format!("{:?}", text),
        None => "null".to_string(),
    }
}

pub fn analyze_data<T>(data: &[T]) -> &'static str {
    match data.len() {
        0 => "空数组",
        1 => "单元素数组",
        2..=5 => "小数组",
        6..=100 => "中等数组",
        _ => "大数组",
    }
}

pub fn calculate_base_cost(weight: f64) -> f64 {
    if weight <= 1.0 {
        5.0
    } else if weight <= 5.0 {
        10.0
    } else if weight <= 10.0 {
        20.0
    } else {
        30.0
    }
}

pub fn apply_distance_multiplier(cost: f64, distance: f64) -> f64 {
    if distance > 1000.0 {
        cost * 2.0
    } else if distance > 500.0 {
        cost * 1.5
    } else {
        cost
    }
}

pub fn apply_priority_fee(cost: f64, is_priority: bool) -> f64 {
    if is_priority {
        cost * 1.3
    } else {
        cost
    }
}

/// Shipping cost rounded to cents
pub fn calculate_shipping(weight: f64, distance: f64, is_priority: bool) -> f64 {
    let cost = calculate_base_cost(weight);
    let cost = apply_distance_multiplier(cost, distance);
    let cost = apply_priority_fee(cost, is_priority);
    (cost * 100.0).round() / 100.0
}

pub fn get_display_name(
    first_name: Option<&str>,
    last_name: Option<&str>,
    username: Option<&str>,
) -> String {
    match (first_name, last_name) {
        (Some(first), Some(last)) if !first.is_empty() && !last.is_empty() => {
            format!("{} {}", first, last)
        }
        _ => username
            .filter(|name| !name.is_empty())
            .unwrap_or("匿名用户")
            .to_string(),
    }
}

fn demonstrate(transcript: &mut Transcript) -> Result<(), LessonError> {
    transcript.line("=== Rust 条件语句演示 ===");

    transcript.section("1. 年龄分类");
    for age in [5, 15, 25, 70] {
        transcript.line(format!("  年龄 {}: {}", age, check_age(age)));
    }

    transcript.section("2. 星期几");
    for day in 1..=8 {
        transcript.line(format!("  {}: {}", day, get_weekday(day)));
    }

    transcript.section("3. 奇偶判断");
    for num in 1..=5 {
        transcript.line(format!("  {} 是 {}", num, is_even(num)));
    }

    transcript.section("4. 绝对值");
    for value in [-5, -1, 0, 3, 7] {
        transcript.line(format!("  abs({}) = {}", value, get_absolute_value(value)));
    }

    transcript.section("5. 访问控制");
    let access_tests = [
        ("alice", "123", true),
        ("", "123", true),
        ("bob", "", true),
        ("charlie", "456", false),
    ];
    for (index, (username, password, is_active)) in access_tests.iter().enumerate() {
        transcript.line(format!(
            "  测试 {}: {}",
            index + 1,
            check_access(username, password, *is_active)
        ));
    }

    transcript.section("6. 用户权限");
    let users = [
        User::new("Admin", 30, Role::Admin, true),
        User::new("User", 25, Role::User, true),
        User::new("Guest", 16, Role::Guest, true),
        User::new("Inactive", 35, Role::User, false),
    ];
    for user in &users {
        transcript.line(format!(
            "  {} ({}): [{}]",
            user.name,
            user.role.as_str(),
            get_user_permissions(user).join(", ")
        ));
    }

    transcript.section("7. 值处理");
    let values = [
        Value::Text("hello".to_string()),
        Value::Number(42.0),
        Value::Boolean(true),
        Value::Number(-10.0),
        Value::Boolean(false),
        Value::Text(String::new()),
    ];
    for value in &values {
        transcript.line(format!("  {}: {}", value, process_value(value)));
    }

    transcript.section("8. 可选值处理");
    for value in [Some("hello"), Some(""), None] {
        transcript.line(format!(
            "  {}: {}",
            render_optional(value),
            process_optional_value(value)
        ));
    }

    transcript.section("9. 数组分析");
    let arrays: [Vec<u8>; 5] = [vec![], vec![1], vec![1, 2, 3], vec![0; 10], vec![0; 200]];
    for (index, array) in arrays.iter().enumerate() {
        transcript.line(format!(
            "  数组 {} (长度 {}): {}",
            index + 1,
            array.len(),
            analyze_data(array)
        ));
    }

    transcript.section("10. 运费计算");
    let shipments = [
        (0.5, 100.0, false),
        (3.0, 600.0, true),
        (8.0, 1200.0, false),
        (15.0, 300.0, true),
    ];
    for (index, (weight, distance, is_priority)) in shipments.iter().enumerate() {
        transcript.line(format!(
            "  货物 {}: {}kg, {}km, 优先: {} -> ${}",
            index + 1,
            weight,
            distance,
            is_priority,
            calculate_shipping(*weight, *distance, *is_priority)
        ));
    }

    transcript.section("11. 显示名称");
    let name_tests = [
        (Some("John"), Some("Doe"), Some("johndoe")),
        (Some("Jane"), None, Some("jane")),
        (None, None, Some("anonymous")),
        (None, None, None),
    ];
    for (index, (first, last, username)) in name_tests.iter().enumerate() {
        transcript.line(format!(
            "  用户 {}: {}",
            index + 1,
            get_display_name(*first, *last, *username)
        ));
    }

    Ok(())
}

impl ConditionalsLesson {
    pub fn new() -> Self {
        Self {
            base: BaseLesson::new("conditionals", "条件语句"),
        }
    }
}

impl Default for ConditionalsLesson {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Lesson for ConditionalsLesson {
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
