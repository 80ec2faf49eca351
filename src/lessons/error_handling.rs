use std::error::Error;
use std::fmt::Display;
use std::future::Future;
use std::num::ParseIntError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use futures::future::{join_all, try_join_all};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::lesson::{Lesson, LessonConfig, LessonError, LessonStatus};
use crate::core::transcript::Transcript;
use crate::lessons::common::{run_tracked, BaseLesson};

/// Error handling: `Result`, custom error types, `?`, async failures, retries
#[derive(Debug)]
pub struct ErrorHandlingLesson {
    base: BaseLesson,
}

/// A rejected field in user input
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    pub message: String,
    pub field: String,
    pub code: String,
}

impl ValidationError {
    pub fn new(message: &str, field: &str, code: &str) -> Self {
        Self {
            message: message.to_string(),
            field: field.to_string(),
            code: code.to_string(),
        }
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for ValidationError {}

/// A failed request against the simulated user service
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkError {
    pub message: String,
    pub status_code: u16,
    pub url: String,
}

impl NetworkError {
    pub fn new(message: &str, status_code: u16, url: String) -> Self {
        Self {
            message: message.to_string(),
            status_code,
            url,
        }
    }
}

impl Display for NetworkError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for NetworkError {}

/// Everything that can go wrong in this lesson
#[derive(Debug, Clone, PartialEq)]
pub enum FetchError {
    Validation(ValidationError),
    Network(NetworkError),
    Arithmetic(String),
    Processing(String),
    Busy,
}

impl Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchError::Validation(err) => write!(f, "{}", err),
            FetchError::Network(err) => write!(f, "{}", err),
            FetchError::Arithmetic(msg) => write!(f, "{}", msg),
            FetchError::Processing(msg) => write!(f, "{}", msg),
            FetchError::Busy => write!(f, "已有文件正在处理中"),
        }
    }
}

impl Error for FetchError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            FetchError::Validation(err) => Some(err),
            FetchError::Network(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for FetchError {
    fn from(err: ValidationError) -> Self {
        FetchError::Validation(err)
    }
}

impl From<NetworkError> for FetchError {
    fn from(err: NetworkError) -> Self {
        FetchError::Network(err)
    }
}

impl From<ParseIntError> for FetchError {
    fn from(err: ParseIntError) -> Self {
        FetchError::Processing(format!("无效数字: {}", err))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub name: String,
    pub email: String,
    pub age: u32,
}

impl Display for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} <{}>, {}岁", self.name, self.email, self.age)
    }
}

pub fn divide(a: f64, b: f64) -> Result<f64, FetchError> {
    if b == 0.0 {
        return Err(FetchError::Arithmetic("除零错误：除数不能为零".to_string()));
    }
    Ok(a / b)
}

/// Validate loosely typed input into a `User`
pub fn validate_user(data: &Value) -> Result<User, ValidationError> {
    let name = data
        .get("name")
        .and_then(Value::as_str)
        .filter(|name| !name.is_empty())
        .ok_or_else(|| ValidationError::new("姓名是必需的且必须是字符串", "name", "INVALID_NAME"))?;

    let email = data
        .get("email")
        .and_then(Value::as_str)
        .filter(|email| email.contains('@'))
        .ok_or_else(|| ValidationError::new("请提供有效的邮箱地址", "email", "INVALID_EMAIL"))?;

    // Zero counts as missing
    let age = data
        .get("age")
        .and_then(Value::as_f64)
        .filter(|age| *age > 0.0 && *age <= 150.0)
        .ok_or_else(|| ValidationError::new("年龄必须在 0-150 之间", "age", "INVALID_AGE"))?;

    Ok(User {
        name: name.to_string(),
        email: email.to_string(),
        age: age as u32,
    })
}

/// Source of user records
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserSource: Send + Sync {
    async fn fetch_user(&self, user_id: i64) -> Result<User, FetchError>;
}

/// User service that answers after a fixed delay
#[derive(Debug, Clone)]
pub struct SimulatedNetwork {
    delay: Duration,
}

impl SimulatedNetwork {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl UserSource for SimulatedNetwork {
    async fn fetch_user(&self, user_id: i64) -> Result<User, FetchError> {
        tokio::time::sleep(self.delay).await;

        if user_id <= 0 {
            return Err(ValidationError::new("用户ID必须为正数", "userId", "INVALID_USER_ID").into());
        }

        let url = format!("/api/users/{}", user_id);
        match user_id {
            404 => Err(NetworkError::new("用户未找到", 404, url).into()),
            500 => Err(NetworkError::new("服务器内部错误", 500, url).into()),
            _ => Ok(User {
                name: format!("User{}", user_id),
                email: format!("user{}@example.com", user_id),
                age: 20 + (user_id % 50) as u32,
            }),
        }
    }
}

pub fn describe_fetch_error(error: &FetchError) -> String {
    match error {
        FetchError::Validation(err) => {
            format!("验证错误: {} (字段: {}, 代码: {})", err.message, err.field, err.code)
        }
        FetchError::Network(err) => format!(
            "网络错误: {} (状态码: {}, URL: {})",
            err.message, err.status_code, err.url
        ),
        other => format!("未知错误: {}", other),
    }
}

/// Fetch each id in turn; a failure is reported and the loop moves on
pub async fn fetch_sequentially<S>(source: &S, user_ids: &[i64], transcript: &mut Transcript)
where
    S: UserSource + ?Sized,
{
    for &user_id in user_ids {
        match source.fetch_user(user_id).await {
            Ok(user) => transcript.line(format!("获取用户成功: {}", user)),
            Err(err) => transcript.line(describe_fetch_error(&err)),
        }
    }
}

/// Two dependent fetches, then a processing step that always fails
pub async fn chained_steps<S>(source: &S, transcript: &mut Transcript) -> Result<User, FetchError>
where
    S: UserSource + ?Sized,
{
    let first = source.fetch_user(1).await?;
    transcript.line(format!("步骤1 - 获取用户: {}", first.name));

    let second = source.fetch_user(2).await?;
    transcript.line(format!("步骤2 - 获取用户: {}", second.name));

    Err(FetchError::Processing("模拟处理过程中的错误".to_string()))
}

/// Error returned once every retry attempt has failed
#[derive(Debug, Clone, PartialEq)]
pub struct RetryError<E> {
    pub attempts: u32,
    pub last_error: E,
}

impl<E: Display> Display for RetryError<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (共尝试 {} 次)", self.last_error, self.attempts)
    }
}

impl<E: Error + 'static> Error for RetryError<E> {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.last_error)
    }
}

/// Run `operation` up to `max_retries` times, pausing `delay` between attempts
pub async fn retry_operation<T, E, F, Fut>(
    operation: F,
    max_retries: u32,
    delay: Duration,
) -> Result<T, RetryError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    retry_operation_with(operation, max_retries, delay, |_, _, _| {}).await
}

/// Like [`retry_operation`], calling `on_failure(attempt, attempts, &err)` after each failed attempt
pub async fn retry_operation_with<T, E, F, Fut, H>(
    mut operation: F,
    max_retries: u32,
    delay: Duration,
    mut on_failure: H,
) -> Result<T, RetryError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
    H: FnMut(u32, u32, &E),
{
    let attempts = max_retries.max(1);
    let mut attempt = 1;

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                warn!("Attempt {}/{} failed: {}", attempt, attempts, err);
                on_failure(attempt, attempts, &err);
                if attempt >= attempts {
                    return Err(RetryError {
                        attempts,
                        last_error: err,
                    });
                }
            }
        }

        info!("Retrying in {}ms", delay.as_millis());
        tokio::time::sleep(delay).await;
        attempt += 1;
    }
}

/// Processes one file at a time
#[derive(Debug, Default)]
pub struct FileProcessor {
    processing: AtomicBool,
    delay: Duration,
}

/// Clears the busy flag however processing ends
struct ProcessingGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for ProcessingGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
        debug!("Processing flag cleared");
    }
}

impl FileProcessor {
    pub fn new(delay: Duration) -> Self {
        Self {
            processing: AtomicBool::new(false),
            delay,
        }
    }

    pub fn is_processing(&self) -> bool {
        self.processing.load(Ordering::Acquire)
    }

    pub async fn process_file(&self, filename: &str) -> Result<String, FetchError> {
        if self
            .processing
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            return Err(FetchError::Busy);
        }
        let _guard = ProcessingGuard {
            flag: &self.processing,
        };

        info!("Processing file {}", filename);
        tokio::time::sleep(self.delay).await;

        if filename.contains("error") {
            return Err(FetchError::Processing(format!("文件处理失败: {}", filename)));
        }

        Ok(format!("处理结果: {}", filename))
    }
}

/// Collects the errors of wrapped operations and substitutes a fallback
#[derive(Debug, Default)]
pub struct ErrorBoundary {
    errors: Vec<String>,
}

impl ErrorBoundary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn wrap_operation<T, E, F>(&mut self, operation: F, fallback: Option<T>) -> Option<T>
    where
        F: FnOnce() -> Result<T, E>,
        E: Display,
    {
        match operation() {
            Ok(value) => Some(value),
            Err(err) => {
                let message = err.to_string();
                warn!("Error boundary caught: {}", message);
                self.errors.push(message);
                fallback
            }
        }
    }

    pub fn get_errors(&self) -> &[String] {
        &self.errors
    }

    pub fn clear_errors(&mut self) {
        self.errors.clear();
    }
}

pub fn parse_number(text: &str) -> Result<i64, ParseIntError> {
    text.trim().parse::<i64>()
}

pub fn safe_divide_and_parse(a: &str, b: &str) -> Result<f64, FetchError> {
    let a = parse_number(a)?;
    let b = parse_number(b)?;
    divide(a as f64, b as f64)
}

pub fn find_user<'a>(users: &'a [User], name: &str) -> Option<&'a User> {
    users.iter().find(|user| user.name == name)
}

fn divide_both(transcript: &mut Transcript) -> Result<(), FetchError> {
    transcript.line(format!("正常除法: {}", divide(10.0, 2.0)?));
    transcript.line(format!("错误除法: {}", divide(10.0, 0.0)?));
    Ok(())
}

async fn demonstrate(config: &LessonConfig, transcript: &mut Transcript) -> Result<(), LessonError> {
    transcript.line("=== Rust 错误处理演示 ===");
    let mock_delay = Duration::from_millis(config.mock_delay_ms);

    transcript.section("1. 基本错误处理");
    if let Err(err) = divide_both(transcript) {
        transcript.line(format!("捕获错误: {}", err));
    }
    transcript.line("清理资源（无论成功与否都会执行）");

    transcript.section("2. 验证错误");
    let test_users = [
        serde_json::json!({ "name": "Alice", "email": "alice@example.com", "age": 25 }),
        serde_json::json!({ "name": "", "email": "invalid-email", "age": -1 }),
        serde_json::json!({ "name": "Bob", "email": "bob@example.com", "age": 200 }),
    ];
    for (index, data) in test_users.iter().enumerate() {
        match validate_user(data) {
            Ok(user) => transcript.line(format!("用户 {} 验证成功: {}", index + 1, user.name)),
            Err(err) => transcript.line(format!(
                "用户 {} 验证失败: {} ({})",
                index + 1,
                err.message,
                err.field
            )),
        }
    }

    let network = SimulatedNetwork::new(mock_delay);

    transcript.section("3. 异步错误处理");
    fetch_sequentially(&network, &[1, 404, 500, -1], transcript).await;

    transcript.section("4. 链式错误处理");
    if let Err(err) = chained_steps(&network, transcript).await {
        transcript.line(format!("链式调用中的错误: {}", err));
    }
    transcript.line("链式处理完成");

    transcript.section("5. 并行操作错误处理");
    let user_ids = [1_i64, 2, 3, 404];
    match try_join_all(user_ids.iter().map(|&id| network.fetch_user(id))).await {
        Ok(users) => {
            let names: Vec<&str> = users.iter().map(|user| user.name.as_str()).collect();
            transcript.line(format!("所有用户获取成功: {}", names.join(", ")));
        }
        Err(err) => transcript.line(format!("try_join_all 失败: {}", err)),
    }
    let results = join_all(user_ids.iter().map(|&id| network.fetch_user(id))).await;
    for (user_id, result) in user_ids.iter().zip(results) {
        match result {
            Ok(user) => transcript.line(format!("用户 {} 获取成功: {}", user_id, user.name)),
            Err(err) => transcript.line(format!("用户 {} 获取失败: {}", user_id, err)),
        }
    }

    transcript.section("6. 重试机制");
    let retry_delay = Duration::from_millis(config.retry_delay_ms);
    let retried = retry_operation_with(
        || network.fetch_user(500),
        config.retry_attempts,
        retry_delay,
        |attempt, attempts, err: &FetchError| {
            transcript.line(format!("尝试 {}/{} 失败: {}", attempt, attempts, err));
            if attempt < attempts {
                transcript.line(format!("等待 {}ms 后重试...", retry_delay.as_millis()));
            }
        },
    )
    .await;
    match retried {
        Ok(user) => transcript.line(format!("重试成功: {}", user.name)),
        Err(err) => transcript.line(format!("重试失败，最终错误: {}", err)),
    }

    transcript.section("7. 资源清理");
    let processor = FileProcessor::new(mock_delay);
    for filename in ["document.txt", "error_file.txt"] {
        transcript.line(format!("开始处理文件: {}", filename));
        match processor.process_file(filename).await {
            Ok(result) => transcript.line(format!("文件处理完成: {}", result)),
            Err(err) => {
                transcript.line(format!("文件处理错误: {}", err));
                break;
            }
        }
    }
    transcript.line(format!("清理处理状态, 处理中: {}", processor.is_processing()));

    transcript.section("8. 错误边界");
    let mut boundary = ErrorBoundary::new();
    let first = boundary.wrap_operation(|| Ok::<_, String>("正常操作结果"), None);
    let second = boundary.wrap_operation(|| Err::<&str, _>("操作失败".to_string()), Some("默认值"));
    transcript.line(format!("操作结果1: {}", first.unwrap_or("无")));
    transcript.line(format!("操作结果2: {}", second.unwrap_or("无")));
    transcript.line(format!("错误边界收集的错误: {}", boundary.get_errors().len()));

    transcript.section("9. ? 运算符与 Option");
    for (a, b) in [("84", "2"), ("abc", "2"), ("1", "0")] {
        match safe_divide_and_parse(a, b) {
            Ok(value) => transcript.line(format!("{} / {} = {}", a, b, value)),
            Err(err) => transcript.line(format!("{} / {} 失败: {}", a, b, err)),
        }
    }
    let users = vec![User {
        name: "Alice".to_string(),
        email: "alice@example.com".to_string(),
        age: 25,
    }];
    for name in ["Alice", "Carol"] {
        match find_user(&users, name) {
            Some(user) => transcript.line(format!("找到用户: {}", user)),
            None => transcript.line(format!("未找到用户: {}", name)),
        }
    }

    Ok(())
}

impl ErrorHandlingLesson {
    pub fn new() -> Self {
        Self {
            base: BaseLesson::new("error_handling", "错误处理"),
        }
    }
}

impl Default for ErrorHandlingLesson {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Lesson for ErrorHandlingLesson {
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

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn server_error() -> FetchError {
        NetworkError::new("服务器内部错误", 500, "/api/users/500".to_string()).into()
    }

    #[test]
    fn test_divide() {
        assert_eq!(divide(10.0, 2.0), Ok(5.0));
        let err = divide(10.0, 0.0).unwrap_err();
        assert_eq!(err.to_string(), "除零错误：除数不能为零");
    }

    #[test]
    fn test_validate_user() {
        let user = validate_user(&json!({ "name": "Alice", "email": "alice@example.com", "age": 25 }))
            .unwrap();
        assert_eq!(user.name, "Alice");
        assert_eq!(user.age, 25);

        let err = validate_user(&json!({ "name": "", "email": "invalid-email", "age": -1 })).unwrap_err();
        assert_eq!(err.code, "INVALID_NAME");
        assert_eq!(err.message, "姓名是必需的且必须是字符串");

        let err = validate_user(&json!({ "name": 42, "email": "a@b.c", "age": 5 })).unwrap_err();
        assert_eq!(err.field, "name");

        let err = validate_user(&json!({ "name": "Eve", "email": "eve.example.com", "age": 5 })).unwrap_err();
        assert_eq!(err.code, "INVALID_EMAIL");
        assert_eq!(err.message, "请提供有效的邮箱地址");

        for age in [json!(0), json!(-1), json!(151), Value::Null] {
            let err = validate_user(&json!({ "name": "Bob", "email": "bob@example.com", "age": age }))
                .unwrap_err();
            assert_eq!(err.code, "INVALID_AGE");
            assert_eq!(err.message, "年龄必须在 0-150 之间");
        }
        assert!(validate_user(&json!({ "name": "Bob", "email": "bob@example.com" })).is_err());
        assert!(validate_user(&json!({ "name": "Bob", "email": "bob@example.com", "age": 150 })).is_ok());
    }

    #[tokio::test]
    async fn test_simulated_network() {
        let network = SimulatedNetwork::new(Duration::ZERO);

        let user = network.fetch_user(1).await.unwrap();
        assert_eq!(user.name, "User1");
        assert_eq!(user.email, "user1@example.com");
        assert_eq!(user.age, 21);

        match network.fetch_user(404).await {
            Err(FetchError::Network(err)) => {
                assert_eq!(err.message, "用户未找到");
                assert_eq!(err.status_code, 404);
                assert_eq!(err.url, "/api/users/404");
            }
            other => panic!("unexpected result: {:?}", other),
        }

        match network.fetch_user(-1).await {
            Err(FetchError::Validation(err)) => {
                assert_eq!(err.message, "用户ID必须为正数");
                assert_eq!(err.field, "userId");
                assert_eq!(err.code, "INVALID_USER_ID");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fetch_sequentially_with_mock() {
        let mut source = MockUserSource::new();
        source.expect_fetch_user().times(2).returning(|id| {
            if id == 500 {
                Err(server_error())
            } else {
                Ok(User {
                    name: format!("User{}", id),
                    email: format!("user{}@example.com", id),
                    age: 30,
                })
            }
        });

        let mut transcript = Transcript::silent();
        fetch_sequentially(&source, &[7, 500], &mut transcript).await;

        assert!(transcript.contains("获取用户成功: User7"));
        assert!(transcript.contains("网络错误: 服务器内部错误 (状态码: 500, URL: /api/users/500)"));
    }

    #[tokio::test]
    async fn test_chained_steps_stop_at_first_failure() {
        let mut source = MockUserSource::new();
        source
            .expect_fetch_user()
            .times(1)
            .returning(|_| Err(server_error()));

        let mut transcript = Transcript::silent();
        let result = chained_steps(&source, &mut transcript).await;
        assert_eq!(result, Err(server_error()));
        assert!(transcript.is_empty());
    }

    #[tokio::test]
    async fn test_retry_exhausts_attempts() {
        let mut source = MockUserSource::new();
        source
            .expect_fetch_user()
            .times(3)
            .returning(|_| Err(server_error()));

        let err = retry_operation(|| source.fetch_user(500), 3, Duration::ZERO)
            .await
            .unwrap_err();
        assert_eq!(err.attempts, 3);
        assert_eq!(err.last_error, server_error());
        assert_eq!(err.to_string(), "服务器内部错误 (共尝试 3 次)");
    }

    #[tokio::test]
    async fn test_retry_recovers() {
        let mut source = MockUserSource::new();
        let mut calls = 0;
        source.expect_fetch_user().times(2).returning(move |id| {
            calls += 1;
            if calls == 1 {
                Err(server_error())
            } else {
                Ok(User {
                    name: format!("User{}", id),
                    email: "retry@example.com".to_string(),
                    age: 40,
                })
            }
        });

        let user = retry_operation(|| source.fetch_user(9), 2, Duration::ZERO)
            .await
            .unwrap();
        assert_eq!(user.name, "User9");
    }

    #[tokio::test]
    async fn test_retry_reports_each_failure() {
        let mut source = MockUserSource::new();
        source
            .expect_fetch_user()
            .times(2)
            .returning(|_| Err(server_error()));

        let mut failures = Vec::new();
        let err = retry_operation_with(
            || source.fetch_user(500),
            2,
            Duration::ZERO,
            |attempt, attempts, err: &FetchError| {
                failures.push((attempt, attempts, err.to_string()));
            },
        )
        .await
        .unwrap_err();

        assert_eq!(err.attempts, 2);
        assert_eq!(
            failures,
            vec![
                (1, 2, "服务器内部错误".to_string()),
                (2, 2, "服务器内部错误".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_retry_zero_means_one_attempt() {
        let mut calls = 0;
        let err = retry_operation(
            || {
                calls += 1;
                async { Err::<(), _>("boom") }
            },
            0,
            Duration::ZERO,
        )
        .await
        .unwrap_err();
        assert_eq!(err.attempts, 1);
        assert_eq!(calls, 1);
    }

    #[tokio::test]
    async fn test_file_processor() {
        let processor = FileProcessor::new(Duration::from_millis(10));

        let (first, second) = tokio::join!(
            processor.process_file("a.txt"),
            processor.process_file("b.txt")
        );
        assert_eq!(first.unwrap(), "处理结果: a.txt");
        assert_eq!(second, Err(FetchError::Busy));
        assert!(!processor.is_processing());

        let err = processor.process_file("error_file.txt").await.unwrap_err();
        assert_eq!(err.to_string(), "文件处理失败: error_file.txt");
        assert!(!processor.is_processing());
    }

    #[test]
    fn test_error_boundary() {
        let mut boundary = ErrorBoundary::new();
        assert_eq!(
            boundary.wrap_operation(|| Ok::<_, String>(1), None),
            Some(1)
        );
        assert_eq!(
            boundary.wrap_operation(|| Err::<i32, _>("操作失败"), Some(0)),
            Some(0)
        );
        assert_eq!(boundary.wrap_operation(|| Err::<i32, _>("again"), None), None);
        assert_eq!(boundary.get_errors(), ["操作失败", "again"]);

        boundary.clear_errors();
        assert!(boundary.get_errors().is_empty());
    }

    #[test]
    fn test_question_mark_composition() {
        assert_eq!(safe_divide_and_parse("84", " 2 "), Ok(42.0));
        assert!(matches!(
            safe_divide_and_parse("abc", "2"),
            Err(FetchError::Processing(_))
        ));
        assert!(matches!(
            safe_divide_and_parse("1", "0"),
            Err(FetchError::Arithmetic(_))
        ));

        let users = vec![User {
            name: "Alice".to_string(),
            email: "alice@example.com".to_string(),
            age: 25,
        }];
        assert!(find_user(&users, "Alice").is_some());
        assert!(find_user(&users, "Carol").is_none());
    }

    #[tokio::test]
    async fn test_run_output() {
        let mut lesson = ErrorHandlingLesson::new();
        lesson.configure(LessonConfig::instant());
        let mut transcript = Transcript::silent();
        lesson.run(&mut transcript).await.unwrap();

        assert!(transcript.contains("正常除法: 5"));
        assert!(transcript.contains("捕获错误: 除零错误：除数不能为零"));
        assert!(transcript.contains("用户 2 验证失败: 姓名是必需的且必须是字符串 (name)"));
        assert!(transcript.contains("用户 3 验证失败: 年龄必须在 0-150 之间 (age)"));
        assert!(transcript.contains("验证错误: 用户ID必须为正数 (字段: userId, 代码: INVALID_USER_ID)"));
        assert!(transcript.contains("链式调用中的错误: 模拟处理过程中的错误"));
        assert!(transcript.contains("try_join_all 失败: 用户未找到"));
        assert!(transcript.contains("用户 3 获取成功: User3"));
        assert!(transcript.contains("尝试 1/2 失败: 服务器内部错误"));
        assert!(transcript.contains("等待 0ms 后重试..."));
        assert!(transcript.contains("尝试 2/2 失败: 服务器内部错误"));
        assert!(transcript.contains("重试失败，最终错误: 服务器内部错误 (共尝试 2 次)"));
        assert!(transcript.contains("文件处理错误: 文件处理失败: error_file.txt"));
        assert!(transcript.contains("操作结果2: 默认值"));
        assert!(transcript.contains("错误边界收集的错误: 1"));
    }
}
