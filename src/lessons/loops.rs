use std::time::Duration;

use async_trait::async_trait;
use futures::stream::{self, Stream, StreamExt};
use serde_json::json;

use crate::core::lesson::{Lesson, LessonConfig, LessonError, LessonStatus};
use crate::core::transcript::Transcript;
use crate::lessons::common::{run_tracked, BaseLesson};
use crate::lessons::functions::even_square_sum;

/// Loops and iterators: `for`, `while`, `loop`, adapters, custom iterators, streams
#[derive(Debug)]
pub struct LoopsLesson {
    base: BaseLesson,
}

/// Yields `0..max`
#[derive(Debug, Clone)]
pub struct NumberIterator {
    current: u32,
    max: u32,
}

impl NumberIterator {
    pub fn new(max: u32) -> Self {
        Self { current: 0, max }
    }
}

impl Iterator for NumberIterator {
    type Item = u32;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current >= self.max {
            return None;
        }
        let value = self.current;
        self.current += 1;
        Some(value)
    }
}

/// Fibonacci sequence; ends when the next term would overflow `u64`
#[derive(Debug, Clone)]
pub struct Fibonacci {
    current: Option<u64>,
    next: Option<u64>,
}

impl Fibonacci {
    pub fn new() -> Self {
        Self {
            current: Some(0),
            next: Some(1),
        }
    }
}

impl Default for Fibonacci {
    fn default() -> Self {
        Self::new()
    }
}

impl Iterator for Fibonacci {
    type Item = u64;

    fn next(&mut self) -> Option<Self::Item> {
        let value = self.current?;
        let following = match (self.current, self.next) {
            (Some(a), Some(b)) => a.checked_add(b),
            _ => None,
        };
        self.current = self.next;
        self.next = following;
        Some(value)
    }
}

/// `0..count`, one item every `delay`
pub fn async_numbers(count: u32, delay: Duration) -> impl Stream<Item = u32> {
    stream::unfold(0, move |n| async move {
        if n >= count {
            return None;
        }
        tokio::time::sleep(delay).await;
        Some((n, n + 1))
    })
}

#[allow(clippy::needless_range_loop)]
pub fn manual_even_square_sum(numbers: &[i64]) -> i64 {
    let mut total = 0;
    for i in 0..numbers.len() {
        let n = numbers[i];
        if n % 2 == 0 {
            total += n * n;
        }
    }
    total
}

pub fn join<T: ToString>(items: impl IntoIterator<Item = T>) -> String {
    items
        .into_iter()
        .map(|item| item.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn basic_loops(transcript: &mut Transcript) {
    transcript.section("基本循环");

    for i in 0..5 {
        transcript.line(format!("计数: {}", i));
    }

    let fruits = ["apple", "banana", "orange"];
    for fruit in &fruits {
        transcript.line(format!("水果: {}", fruit));
    }

    // serde_json maps iterate in key order
    let person = json!({ "name": "Alice", "age": 25, "city": "Beijing" });
    if let Some(fields) = person.as_object() {
        for (key, value) in fields {
            transcript.line(format!("{}: {}", key, value));
        }
    }

    let mut count = 0;
    while count < 3 {
        transcript.line(format!("while 循环: {}", count));
        count += 1;
    }

    // Body runs once even though the condition is already false
    let mut n = 10;
    loop {
        transcript.line(format!("do-while 循环: {}", n));
        n += 1;
        if n >= 10 {
            break;
        }
    }

    let mut counter = 0;
    let result = loop {
        counter += 1;
        if counter == 10 {
            break counter * 2;
        }
    };
    transcript.line(format!("loop 返回值: {}", result));

    let grid = [[1, 2], [3, 4]];
    let mut found = None;
    'outer: for (i, row) in grid.iter().enumerate() {
        for (j, &value) in row.iter().enumerate() {
            if value == 3 {
                found = Some((i, j));
                break 'outer;
            }
        }
    }
    if let Some((i, j)) = found {
        transcript.line(format!("找到 3 位于 ({}, {})", i, j));
    }
}

fn iterator_adapters(transcript: &mut Transcript) {
    transcript.section("迭代器方法");
    let numbers = [1, 2, 3, 4, 5];

    let doubled: Vec<i32> = numbers.iter().map(|n| n * 2).collect();
    transcript.line(format!("map 翻倍: [{}]", join(&doubled)));

    let evens: Vec<i32> = numbers.iter().copied().filter(|n| n % 2 == 0).collect();
    transcript.line(format!("filter 偶数: [{}]", join(&evens)));

    let sum = numbers.iter().fold(0, |acc, n| acc + n);
    let product = numbers.iter().fold(1, |acc, n| acc * n);
    transcript.line(format!("fold 求和: {}", sum));
    transcript.line(format!("fold 求积: {}", product));

    for (index, value) in numbers.iter().enumerate() {
        transcript.line(format!("索引 {}: {}", index, value));
    }

    let names = ["Alice", "Bob", "Charlie"];
    let ages = [25, 30, 35];
    for (name, age) in names.iter().zip(ages.iter()) {
        transcript.line(format!("{} 的年龄是 {}", name, age));
    }

    let range: Vec<i64> = (1..=10).collect();
    transcript.line(format!("偶数平方和: {}", even_square_sum(&range)));
}

fn nested_loops(transcript: &mut Transcript) {
    transcript.section("嵌套循环");
    let matrix = [[1, 2, 3], [4, 5, 6], [7, 8, 9]];
    for (i, row) in matrix.iter().enumerate() {
        for (j, value) in row.iter().enumerate() {
            transcript.line(format!("matrix[{}][{}] = {}", i, j, value));
        }
    }
}

async fn demonstrate(config: &LessonConfig, transcript: &mut Transcript) -> Result<(), LessonError> {
    transcript.line("=== Rust 循环和迭代器演示 ===");

    basic_loops(transcript);
    iterator_adapters(transcript);
    nested_loops(transcript);

    transcript.section("自定义迭代器");
    transcript.line(format!("NumberIterator: {}", join(NumberIterator::new(5))));
    transcript.line(format!("斐波那契: {}", join(Fibonacci::new().take(10))));

    transcript.section("异步流");
    let delay = Duration::from_millis(config.mock_delay_ms / 10);
    let mut numbers = Box::pin(async_numbers(3, delay));
    while let Some(n) = numbers.next().await {
        transcript.line(format!("异步数字: {}", n));
    }

    Ok(())
}

impl LoopsLesson {
    pub fn new() -> Self {
        Self {
            base: BaseLesson::new("loops", "循环和迭代器"),
        }
    }
}

impl Default for LoopsLesson {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Lesson for LoopsLesson {
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
