use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::lesson::{Lesson, LessonConfig, LessonError, LessonStatus};
use crate::core::transcript::Transcript;
use crate::lessons::common::{run_tracked, BaseLesson};

/// Functions: closures, function pointers, higher-order functions, recursion
#[derive(Debug)]
pub struct FunctionsLesson {
    base: BaseLesson,
}

pub fn greet(name: &str) -> String {
    format!("Hello, {}!", name)
}

pub fn multiply(a: i64, b: i64) -> i64 {
    a * b
}

/// Record with an optional field that is left out of the JSON when absent
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewUser {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
}

pub fn create_user(name: &str, age: Option<u32>) -> NewUser {
    NewUser {
        name: name.to_string(),
        age,
    }
}

pub fn power(base: f64, exponent: f64) -> f64 {
    base.powf(exponent)
}

/// `power` with the exponent defaulted to 2
pub fn power_default(base: f64) -> f64 {
    power(base, 2.0)
}

pub fn sum(numbers: &[i64]) -> i64 {
    numbers.iter().sum()
}

/// One name, several argument types: overloading expressed as a trait
pub trait ProcessData {
    type Output;

    fn process(self) -> Self::Output;
}

impl ProcessData for &str {
    type Output = String;

    fn process(self) -> String {
        self.to_uppercase()
    }
}

impl ProcessData for i64 {
    type Output = i64;

    fn process(self) -> i64 {
        self * 2
    }
}

impl ProcessData for bool {
    type Output = &'static str;

    fn process(self) -> &'static str {
        if self {
            "YES"
        } else {
            "NO"
        }
    }
}

pub fn process_data<T: ProcessData>(data: T) -> T::Output {
    data.process()
}

pub fn create_multiplier(factor: i64) -> impl Fn(i64) -> i64 {
    move |value| value * factor
}

pub type MathOperation = fn(i64, i64) -> i64;

pub fn add(a: i64, b: i64) -> i64 {
    a + b
}

pub fn subtract(a: i64, b: i64) -> i64 {
    a - b
}

pub fn apply_operation<F>(x: i64, y: i64, op: F) -> i64
where
    F: Fn(i64, i64) -> i64,
{
    op(x, y)
}

pub fn process_array<T, F>(items: &[T], callback: F) -> Vec<T>
where
    F: Fn(&T, usize) -> T,
{
    items
        .iter()
        .enumerate()
        .map(|(index, item)| callback(item, index))
        .collect()
}

/// `None` once the result no longer fits in a `u64` (from 21!)
pub fn factorial(n: u64) -> Option<u64> {
    if n <= 1 {
        return Some(1);
    }
    factorial(n - 1)?.checked_mul(n)
}

pub fn fibonacci(n: u32) -> u64 {
    match n {
        0 => 0,
        1 => 1,
        _ => fibonacci(n - 1) + fibonacci(n - 2),
    }
}

/// Closure that owns its count
pub fn create_counter() -> impl FnMut() -> u32 {
    let mut count = 0;
    move || {
        count += 1;
        count
    }
}

/// `compose(f, g)(x) == f(g(x))`
pub fn compose<T, F, G>(f: F, g: G) -> impl Fn(T) -> T
where
    F: Fn(T) -> T,
    G: Fn(T) -> T,
{
    move |x| f(g(x))
}

pub type Curried2 = Box<dyn Fn(i64) -> i64>;
pub type Curried1 = Box<dyn Fn(i64) -> Curried2>;

pub fn curry(f: fn(i64, i64, i64) -> i64) -> impl Fn(i64) -> Curried1 {
    move |a: i64| -> Curried1 {
        Box::new(move |b: i64| -> Curried2 { Box::new(move |c: i64| f(a, b, c)) })
    }
}

pub fn even_square_sum(numbers: &[i64]) -> i64 {
    numbers
        .iter()
        .filter(|n| *n % 2 == 0)
        .map(|n| n * n)
        .sum()
}

pub fn divide(a: f64, b: f64) -> Result<f64, String> {
    if b == 0.0 {
        return Err("Division by zero".to_string());
    }
    Ok(a / b)
}

/// Simulated asynchronous call: succeeds when `roll` is above one half
pub async fn flaky_operation(delay: Duration, roll: f64) -> Result<&'static str, String> {
    tokio::time::sleep(delay).await;
    if roll > 0.5 {
        Ok("Success!")
    } else {
        Err("Random failure".to_string())
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<String, LessonError> {
    serde_json::to_string(value)
        .map_err(|e| LessonError::ExecutionError(format!("Failed to serialize value: {}", e)))
}

async fn demonstrate(config: &LessonConfig, transcript: &mut Transcript) -> Result<(), LessonError> {
    transcript.line("=== Rust 函数演示 ===");

    transcript.line(format!("问候: {}", greet("Alice")));
    transcript.line(format!("乘法: {}", multiply(5, 3)));

    transcript.line(format!("创建用户1: {}", to_json(&create_user("Bob", None))?));
    transcript.line(format!(
        "创建用户2: {}",
        to_json(&create_user("Charlie", Some(25)))?
    ));
    transcript.line(format!("幂运算1: {}", power_default(5.0)));
    transcript.line(format!("幂运算2: {}", power(5.0, 3.0)));

    transcript.line(format!("求和: {}", sum(&[1, 2, 3, 4, 5])));

    transcript.line(format!("处理字符串: {}", process_data("hello")));
    transcript.line(format!("处理数字: {}", process_data(42_i64)));
    transcript.line(format!("处理布尔: {}", process_data(true)));

    let doubler = create_multiplier(2);
    let tripler = create_multiplier(3);
    transcript.line(format!("双倍: {}", doubler(5)));
    transcript.line(format!("三倍: {}", tripler(5)));

    let operations: [(&str, MathOperation); 2] = [("加法", add), ("减法", subtract)];
    for (label, op) in operations {
        transcript.line(format!("{}: {}", label, apply_operation(10, 5, op)));
    }

    let doubled = process_array(&[1, 2, 3], |item, _index| item * 2);
    transcript.line(format!("数组处理: {:?}", doubled));

    for n in [5, 21] {
        match factorial(n) {
            Some(value) => transcript.line(format!("阶乘: {}! = {}", n, value)),
            None => transcript.line(format!("阶乘: {}! 超出 u64 范围", n)),
        }
    }
    transcript.line(format!("斐波那契: {}", fibonacci(10)));

    let mut counter = create_counter();
    let (first, second, third) = (counter(), counter(), counter());
    transcript.line(format!("计数器: {} {} {}", first, second, third));

    let add_one = |x: i64| x + 1;
    let double = |x: i64| x * 2;
    let add_one_then_double = compose(double, add_one);
    transcript.line(format!("组合函数: {}", add_one_then_double(5)));

    let curried_add = curry(|a, b, c| a + b + c);
    transcript.line(format!("柯里化: {}", curried_add(1)(2)(3)));

    let numbers: Vec<i64> = (1..=10).collect();
    transcript.line(format!("函数式编程结果: {}", even_square_sum(&numbers)));

    transcript.section("错误处理演示");
    for (a, b) in [(10.0, 2.0), (10.0, 0.0)] {
        match divide(a, b) {
            Ok(result) => transcript.line(format!("除法结果: {}", result)),
            Err(e) => transcript.line(format!("捕获错误: {}", e)),
        }
    }

    let roll = rand::random::<f64>();
    match flaky_operation(Duration::from_millis(config.mock_delay_ms), roll).await {
        Ok(result) => transcript.line(format!("异步结果: {}", result)),
        Err(e) => transcript.line(format!("异步错误: {}", e)),
    }

    Ok(())
}

impl FunctionsLesson {
    pub fn new() -> Self {
        Self {
            base: BaseLesson::new("functions", "函数"),
        }
    }
}

impl Default for FunctionsLesson {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Lesson for FunctionsLesson {
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
        let config = self.base.config.clone();
        run_tracked(&mut self.base, demonstrate(&config, transcript)).await
    }

    fn get_info(&self) -> serde_json::Value {
        self.base.info()
    }
}
