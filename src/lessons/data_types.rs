use std::fmt::Display;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::lesson::{Lesson, LessonConfig, LessonError, LessonStatus};
use crate::core::transcript::Transcript;
use crate::lessons::common::{run_tracked, BaseLesson};

/// Data types: primitives, tuples, structs, enums, generics
#[derive(Debug)]
pub struct DataTypesLesson {
    base: BaseLesson,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub email: String,
    /// Optional field
    pub age: Option<u32>,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Address {
    pub street: String,
    pub city: String,
    pub zip_code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserWithAddress {
    pub id: u64,
    pub name: String,
    pub address: Address,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Pending,
    Approved,
    Rejected,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Pending => "pending",
            Status::Approved => "approved",
            Status::Rejected => "rejected",
        }
    }
}

impl Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An identifier that is either text or a number
#[derive(Debug, Clone, PartialEq)]
pub enum Id {
    Text(String),
    Numeric(u64),
}

pub type Calculator = fn(i64, i64) -> i64;

pub fn add(a: i64, b: i64) -> i64 {
    a + b
}

pub fn multiply(a: i64, b: i64) -> i64 {
    a * b
}

#[derive(Debug, Clone, PartialEq)]
pub struct Container<T> {
    value: T,
}

impl<T> Container<T> {
    pub fn new(value: T) -> Self {
        Self { value }
    }

    pub fn get_value(&self) -> &T {
        &self.value
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Category {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    pub id: u64,
    pub name: String,
    pub price: f64,
    pub tags: Vec<String>,
    pub category: Category,
}

pub fn process_user(user: &User) -> String {
    let age_text = match user.age {
        Some(age) => format!(" (age: {})", age),
        None => String::new(),
    };
    format!("{}{} - {}", user.name, age_text, user.email)
}

pub fn calculate_total(products: &[Product]) -> f64 {
    products.iter().map(|product| product.price).sum()
}

pub fn match_status(status: &Status) -> &'static str {
    match status {
        Status::Pending => "等待处理",
        Status::Approved => "已批准",
        Status::Rejected => "已拒绝",
    }
}

pub fn process_id(id: &Id) -> String {
    match id {
        Id::Text(text) => text.to_uppercase(),
        Id::Numeric(number) => number.to_string(),
    }
}

/// Type name with module paths stripped, e.g. `i32` or `Vec<String>`
pub fn type_label<T: ?Sized>(_: &T) -> String {
    let full = std::any::type_name::<T>();
    let mut label = String::with_capacity(full.len());
    let mut path = String::new();
    for ch in full.chars() {
        if ch.is_alphanumeric() || ch == '_' || ch == ':' {
            path.push(ch);
        } else {
            label.push_str(last_segment(&path));
            path.clear();
            label.push(ch);
        }
    }
    label.push_str(last_segment(&path));
    label
}

fn last_segment(path: &str) -> &str {
    path.rsplit("::").next().unwrap_or(path)
}

pub fn sample_products() -> Vec<Product> {
    vec![
        Product {
            id: 1,
            name: "Laptop".to_string(),
            price: 999.99,
            tags: vec!["electronics".to_string(), "computer".to_string()],
            category: Category {
                id: 1,
                name: "Electronics".to_string(),
            },
        },
        Product {
            id: 2,
            name: "Book".to_string(),
            price: 29.99,
            tags: vec!["education".to_string(), "reading".to_string()],
            category: Category {
                id: 2,
                name: "Books".to_string(),
            },
        },
    ]
}

fn join<T: Display>(items: &[T]) -> String {
    items
        .iter()
        .map(|item| item.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

fn demonstrate(transcript: &mut Transcript) -> Result<(), LessonError> {
    transcript.line("=== Rust 数据类型演示 ===");

    let age: i32 = 25;
    let name: String = String::from("Alice");
    let is_active: bool = true;
    transcript.line(format!("年龄: {} (类型: {})", age, type_label(&age)));
    transcript.line(format!("姓名: {} (类型: {})", name, type_label(&name)));
    transcript.line(format!("活跃: {} (类型: {})", is_active, type_label(&is_active)));

    let numbers: [i32; 5] = [1, 2, 3, 4, 5];
    let strings: Vec<&str> = vec!["hello", "world", "rust"];
    transcript.line(format!("数字数组: {}", join(&numbers)));
    transcript.line(format!("字符串向量: {}", join(&strings)));

    let person: (&str, u32) = ("Alice", 25);
    let coordinates: (i32, i32, i32) = (10, 20, 30);
    transcript.line(format!("人员信息: {}, {}岁", person.0, person.1));
    transcript.line(format!(
        "坐标: ({}, {}, {})",
        coordinates.0, coordinates.1, coordinates.2
    ));

    let user = User {
        id: 1,
        name: "Alice".to_string(),
        email: "alice@example.com".to_string(),
        age: None,
        is_active: true,
    };
    transcript.line(format!("用户信息: {}", process_user(&user)));

    let user_with_address = UserWithAddress {
        id: 1,
        name: "Bob".to_string(),
        address: Address {
            street: "123 Main St".to_string(),
            city: "New York".to_string(),
            zip_code: "10001".to_string(),
        },
    };
    transcript.line(format!(
        "带地址的用户: {} 住在 {}",
        user_with_address.name, user_with_address.address.city
    ));

    let current_status = Status::Pending;
    transcript.line(format!(
        "当前状态: {} ({})",
        current_status,
        match_status(&current_status)
    ));

    let user_id = Id::Numeric(123);
    let product_id = Id::Text("prod-456".to_string());
    transcript.line(format!("用户ID: {}", process_id(&user_id)));
    transcript.line(format!("产品ID: {}", process_id(&product_id)));

    let operations: [(&str, Calculator); 2] = [("加法", add), ("乘法", multiply)];
    for (label, op) in operations {
        transcript.line(format!("{}: {}", label, op(6, 7)));
    }

    let string_container = Container::new("hello");
    let number_container = Container::new(42);
    transcript.line(format!("字符串容器: {}", string_container.get_value()));
    transcript.line(format!("数字容器: {}", number_container.get_value()));

    let products = sample_products();
    transcript.line(format!("产品总价: ${}", calculate_total(&products)));
    for product in &products {
        transcript.line(format!(
            "{}: ${} ({})",
            product.name, product.price, product.category.name
        ));
    }

    let catalogue = serde_json::to_string(&products)
        .map_err(|e| LessonError::ExecutionError(format!("Failed to serialize products: {}", e)))?;
    transcript.line(format!("JSON: {}", catalogue));

    Ok(())
}

impl DataTypesLesson {
    pub fn new() -> Self {
        Self {
            base: BaseLesson::new("data_types", "数据类型"),
        }
    }
}

impl Default for DataTypesLesson {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Lesson for DataTypesLesson {
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
    use std::collections::HashMap;

    use super::*;

    fn alice(age: Option<u32>) -> User {
        User {
            id: 1,
            name: "Alice".to_string(),
            email: "alice@example.com".to_string(),
            age,
            is_active: true,
        }
    }

    #[test]
    fn test_process_user_optional_age() {
        assert_eq!(process_user(&alice(None)), "Alice - alice@example.com");
        assert_eq!(
            process_user(&alice(Some(30))),
            "Alice (age: 30) - alice@example.com"
        );
    }

    #[test]
    fn test_calculate_total() {
        let total = calculate_total(&sample_products());
        assert!((total - 1029.98).abs() < 1e-9);
        assert_eq!(calculate_total(&[]), 0.0);
    }

    #[test]
    fn test_status_and_ids() {
        assert_eq!(Status::Pending.to_string(), "pending");
        assert_eq!(match_status(&Status::Rejected), "已拒绝");
        assert_eq!(
            serde_json::to_string(&Status::Approved).unwrap(),
            r#""approved""#
        );
        assert_eq!(process_id(&Id::Text("prod-456".to_string())), "PROD-456");
        assert_eq!(process_id(&Id::Numeric(123)), "123");
    }

    #[test]
    fn test_generics_and_function_types() {
        assert_eq!(*Container::new(42).get_value(), 42);
        let calc: Calculator = multiply;
        assert_eq!(calc(6, 7), 42);
        assert_eq!(add(2, 3), 5);
        assert_eq!(type_label(&1_i32), "i32");
        assert_eq!(type_label(&String::new()), "String");
        assert_eq!(type_label("text"), "str");
        assert_eq!(type_label(&vec!["a".to_string()]), "Vec<String>");
        assert_eq!(type_label(&Some(vec![1_u8])), "Option<Vec<u8>>");
        let scores: HashMap<String, i32> = HashMap::new();
        assert_eq!(type_label(&scores), "HashMap<String, i32>");
    }

    #[tokio::test]
    async fn test_run_output() {
        let mut lesson = DataTypesLesson::new();
        let mut transcript = Transcript::silent();
        lesson.run(&mut transcript).await.unwrap();

        assert!(transcript.contains("产品ID: PROD-456"));
        assert!(transcript.contains("带地址的用户: Bob 住在 New York"));
        assert!(transcript.contains("Laptop: $999.99 (Electronics)"));
        assert!(transcript.contains("年龄: 25 (类型: i32)"));
    }
}
