//! Ownership and borrowing.
//!
//! Moves, copies, shared and mutable borrows, and the `Rc<RefCell<_>>`
//! pattern for data that really is shared between several owners.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use async_trait::async_trait;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::core::lesson::{Lesson, LessonConfig, LessonError, LessonStatus};
use crate::core::transcript::Transcript;
use crate::lessons::common::{run_tracked, BaseLesson};

#[derive(Debug)]
pub struct OwnershipLesson {
    base: BaseLesson,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Person {
    pub name: String,
    pub age: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Address {
    pub city: String,
    pub zip_code: String,
}

/// Owns its address; `clone` copies everything
#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    pub name: String,
    pub address: Address,
}

/// Shares its address; `clone` copies the handle, not the address
#[derive(Debug, Clone)]
pub struct SharedProfile {
    pub name: String,
    pub address: Rc<RefCell<Address>>,
}

/// Copy types are duplicated on assignment
pub fn copy_primitive(original: i32) -> (i32, i32) {
    let mut copied = original;
    copied = copied + 58;
    (original, copied)
}

/// Consumes the string; the caller can no longer use it
pub fn take_ownership(s: String) -> usize {
    debug!("took ownership of {:?}", s);
    s.len()
}

pub fn borrow_string(s: &str) -> usize {
    s.len()
}

pub fn borrow_and_modify(s: &mut String) {
    s.push_str(", world");
}

pub fn create_person(name: String, age: u32) -> Person {
    Person { name, age }
}

pub fn process_person(person: &Person) -> String {
    format!("{} ({}岁)", person.name, person.age)
}

pub fn update_person_age(person: &mut Person, new_age: u32) {
    person.age = new_age;
}

pub fn first_word(s: &str) -> &str {
    match s.find(' ') {
        Some(index) => &s[..index],
        None => s,
    }
}

pub fn longest<'a>(x: &'a str, y: &'a str) -> &'a str {
    if x.len() >= y.len() {
        x
    } else {
        y
    }
}

/// Works on its own copy; the caller's value is untouched
pub fn modify_primitive(mut value: i32) -> i32 {
    value *= 10;
    value
}

pub fn modify_object(person: &mut Person) {
    person.age = 999;
}

pub fn modify_array(numbers: &mut Vec<i32>) {
    numbers.push(999);
}

/// Builds a vector that is freed when the function returns
pub fn create_temporary_objects() -> usize {
    let temp: Vec<i32> = (0..1000).collect();
    temp.len()
}

pub type ListenerId = usize;

/// Callbacks registered by id; removing the id drops the callback and
/// whatever it captured.
#[derive(Default)]
pub struct EventEmitter {
    listeners: Vec<(ListenerId, Box<dyn Fn()>)>,
    next_id: ListenerId,
}

impl std::fmt::Debug for EventEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventEmitter")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl EventEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_listener(&mut self, callback: impl Fn() + 'static) -> ListenerId {
        let id = self.next_id;
        self.next_id += 1;
        self.listeners.push((id, Box::new(callback)));
        id
    }

    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() != before
    }

    /// Invoke every listener, returning how many ran
    pub fn emit(&self) -> usize {
        for (_, callback) in &self.listeners {
            callback();
        }
        self.listeners.len()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Resource {
    pub id: String,
    pub data: Vec<i32>,
}

/// Resources keyed by owner; a transfer moves the value between keys
#[derive(Debug, Default)]
pub struct ResourceManager {
    resources: HashMap<String, Resource>,
}

impl ResourceManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_resource(&mut self, key: &str, resource: Resource) {
        self.resources.insert(key.to_string(), resource);
    }

    pub fn get_resource(&self, key: &str) -> Option<&Resource> {
        self.resources.get(key)
    }

    /// Move the resource held by `from` to `to`; `None` when `from` holds nothing
    pub fn transfer_resource(&mut self, from: &str, to: &str) -> Option<&Resource> {
        let resource = self.resources.remove(from)?;
        self.resources.insert(to.to_string(), resource);
        self.resources.get(to)
    }
}

#[derive(Debug, Default)]
pub struct SharedCounter {
    pub count: u32,
}

#[derive(Debug)]
pub struct CounterUser {
    pub name: String,
    pub data: Rc<RefCell<SharedCounter>>,
}

/// Three users holding the same counter; a single write is seen by all
pub fn share_counter(names: &[&str], value: u32) -> Vec<(String, u32)> {
    let shared = Rc::new(RefCell::new(SharedCounter::default()));
    let users: Vec<CounterUser> = names
        .iter()
        .map(|name| CounterUser {
            name: name.to_string(),
            data: Rc::clone(&shared),
        })
        .collect();

    if let Some(first) = users.first() {
        first.data.borrow_mut().count = value;
    }

    users
        .iter()
        .map(|user| (user.name.clone(), user.data.borrow().count))
        .collect()
}

fn demonstrate(transcript: &mut Transcript) -> Result<(), LessonError> {
    transcript.line("=== Rust 所有权和借用演示 ===");

    let (original, copied) = copy_primitive(42);
    transcript.line(format!("原始值: {}", original));
    transcript.line(format!("复制值: {}", copied));

    let s1 = String::from("hello");
    let s2 = s1;
    transcript.line(format!("移动后只有 s2 可用: {}", s2));
    transcript.line(format!("take_ownership 返回长度: {}", take_ownership(s2)));

    let original_text = String::from("clone me");
    let cloned_text = original_text.clone();
    transcript.line(format!("克隆: {} / {}", original_text, cloned_text));

    let mut greeting = String::from("hello");
    transcript.line(format!("借用长度: {}", borrow_string(&greeting)));
    borrow_and_modify(&mut greeting);
    transcript.line(format!("可变借用后: {}", greeting));

    transcript.section("浅复制 vs 深复制");
    let user1 = SharedProfile {
        name: "Bob".to_string(),
        address: Rc::new(RefCell::new(Address {
            city: "New York".to_string(),
            zip_code: "10001".to_string(),
        })),
    };
    let mut user2 = user1.clone();
    user2.name = "Charlie".to_string();
    user2.address.borrow_mut().city = "Los Angeles".to_string();
    transcript.line(format!(
        "浅复制后 user1: {} 住在 {}",
        user1.name,
        user1.address.borrow().city
    ));

    let user3 = Profile {
        name: user1.name.clone(),
        address: user1.address.borrow().clone(),
    };
    let mut user4 = user3.clone();
    user4.address.city = "Chicago".to_string();
    transcript.line(format!(
        "深复制后 user3: {} 住在 {}, user4 住在 {}",
        user3.name, user3.address.city, user4.address.city
    ));

    transcript.section("函数参数传递");
    let my_number = 42;
    let mut my_object = create_person("David".to_string(), 25);
    let mut my_array = vec![1, 2, 3];
    transcript.line(format!(
        "修改前: {} / {} / {:?}",
        my_number,
        process_person(&my_object),
        my_array
    ));
    modify_primitive(my_number);
    modify_object(&mut my_object);
    modify_array(&mut my_array);
    transcript.line(format!(
        "修改后: {} / {} / {:?}",
        my_number,
        process_person(&my_object),
        my_array
    ));
    update_person_age(&mut my_object, 26);
    transcript.line(format!("更新年龄: {}", process_person(&my_object)));

    transcript.line(format!("创建了临时数组，长度: {}", create_temporary_objects()));

    transcript.section("切片和生命周期");
    let sentence = "hello rust world";
    transcript.line(format!("第一个单词: {}", first_word(sentence)));
    transcript.line(format!("较长的字符串: {}", longest("short", "longer one")));
    let array = [1, 2, 3, 4, 5];
    transcript.line(format!("数组切片: {:?}", &array[1..3]));

    transcript.section("事件监听器");
    let heavy_object = Rc::new(vec![0u8; 1_000]);
    let mut emitter = EventEmitter::new();
    let captured = Rc::clone(&heavy_object);
    let listener = emitter.add_listener(move || debug!("heavy object size: {}", captured.len()));
    transcript.line(format!(
        "触发监听器: {} 个, 引用计数: {}",
        emitter.emit(),
        Rc::strong_count(&heavy_object)
    ));
    emitter.remove_listener(listener);
    transcript.line(format!(
        "移除监听器后引用计数: {}",
        Rc::strong_count(&heavy_object)
    ));

    transcript.section("所有权转移");
    let mut manager = ResourceManager::new();
    manager.add_resource(
        "owner1",
        Resource {
            id: "res001".to_string(),
            data: vec![1, 2, 3, 4, 5],
        },
    );
    transcript.line(format!("Owner1 的资源: {:?}", manager.get_resource("owner1")));
    manager.transfer_resource("owner1", "owner2");
    transcript.line(format!(
        "转移后 Owner1 的资源: {:?}",
        manager.get_resource("owner1")
    ));
    transcript.line(format!(
        "转移后 Owner2 的资源: {:?}",
        manager.get_resource("owner2")
    ));

    transcript.section("引用共享");
    for (name, count) in share_counter(&["Alice", "Bob", "Charlie"], 10) {
        transcript.line(format!("{} 的计数: {}", name, count));
    }
    transcript.line("共享可变数据要显式使用 Rc<RefCell<T>>");

    Ok(())
}

impl OwnershipLesson {
    pub fn new() -> Self {
        Self {
            base: BaseLesson::new("ownership", "所有权和借用"),
        }
    }
}

impl Default for OwnershipLesson {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Lesson for OwnershipLesson {
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
    use std::cell::Cell;

    #[test]
    fn test_copy_and_parameter_passing() {
        assert_eq!(copy_primitive(42), (42, 100));

        let number = 42;
        assert_eq!(modify_primitive(number), 420);
        assert_eq!(number, 42);

        let mut person = create_person("David".to_string(), 25);
        modify_object(&mut person);
        assert_eq!(person.age, 999);

        let mut numbers = vec![1, 2, 3];
        modify_array(&mut numbers);
        assert_eq!(numbers, vec![1, 2, 3, 999]);
    }

    #[test]
    fn test_borrowing() {
        let mut s = String::from("hello");
        assert_eq!(borrow_string(&s), 5);
        borrow_and_modify(&mut s);
        assert_eq!(s, "hello, world");
        assert_eq!(take_ownership(s), 12);
    }

    #[test]
    fn test_slices_and_lifetimes() {
        assert_eq!(first_word("hello world"), "hello");
        assert_eq!(first_word("single"), "single");
        assert_eq!(first_word(""), "");
        assert_eq!(longest("abc", "de"), "abc");
        assert_eq!(longest("ab", "cde"), "cde");
    }

    #[test]
    fn test_shallow_copy_shares_address() {
        let original = SharedProfile {
            name: "Bob".to_string(),
            address: Rc::new(RefCell::new(Address {
                city: "New York".to_string(),
                zip_code: "10001".to_string(),
            })),
        };
        let copy = original.clone();
        copy.address.borrow_mut().city = "Los Angeles".to_string();
        assert_eq!(original.address.borrow().city, "Los Angeles");
    }

    #[test]
    fn test_event_emitter() {
        let hits = Rc::new(Cell::new(0));
        let mut emitter = EventEmitter::new();
        let counter = Rc::clone(&hits);
        let id = emitter.add_listener(move || counter.set(counter.get() + 1));
        emitter.add_listener(|| {});

        assert_eq!(emitter.emit(), 2);
        assert_eq!(hits.get(), 1);
        assert!(emitter.remove_listener(id));
        assert!(!emitter.remove_listener(id));
        assert_eq!(emitter.emit(), 1);
        assert_eq!(hits.get(), 1);
        assert_eq!(Rc::strong_count(&hits), 1);
    }

    #[test]
    fn test_resource_transfer() {
        let mut manager = ResourceManager::new();
        let resource = Resource {
            id: "res001".to_string(),
            data: vec![1, 2, 3],
        };
        manager.add_resource("owner1", resource.clone());

        assert_eq!(manager.transfer_resource("owner1", "owner2"), Some(&resource));
        assert!(manager.get_resource("owner1").is_none());
        assert_eq!(manager.get_resource("owner2"), Some(&resource));

        assert!(manager.transfer_resource("nobody", "owner3").is_none());
        assert!(manager.get_resource("owner3").is_none());
        assert_eq!(manager.get_resource("owner2"), Some(&resource));
    }

    #[test]
    fn test_shared_counter_visible_to_all() {
        let counts = share_counter(&["Alice", "Bob", "Charlie"], 10);
        assert_eq!(counts.len(), 3);
        assert!(counts.iter().all(|(_, count)| *count == 10));
        assert!(share_counter(&[], 10).is_empty());
    }

    #[tokio::test]
    async fn test_run_output() {
        let mut lesson = OwnershipLesson::new();
        let mut transcript = Transcript::silent();
        lesson.run(&mut transcript).await.unwrap();

        assert!(transcript.contains("浅复制后 user1: Bob 住在 Los Angeles"));
        assert!(transcript.contains("深复制后 user3: Bob 住在 Los Angeles, user4 住在 Chicago"));
        assert!(transcript.contains("转移后 Owner1 的资源: None"));
        assert!(transcript.contains("Charlie 的计数: 10"));
        assert!(transcript.contains("移除监听器后引用计数: 1"));
    }
}
