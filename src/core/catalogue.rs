/// One row of the module index
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogueEntry {
    /// Lesson identifier, also accepted on the command line
    pub id: &'static str,
    /// Short title
    pub title: &'static str,
    /// One-line description shown in the index
    pub summary: &'static str,
}

lazy_static::lazy_static! {
    /// Every lesson in teaching order
    pub static ref LESSON_CATALOGUE: Vec<CatalogueEntry> = vec![
        CatalogueEntry { id: "overview", title: "Rust 特性预览", summary: "项目介绍和特性预览" },
        CatalogueEntry { id: "variables", title: "变量和常量", summary: "let、mut、const 与变量遮蔽" },
        CatalogueEntry { id: "data_types", title: "数据类型", summary: "基本类型、结构体、枚举与泛型" },
        CatalogueEntry { id: "ownership", title: "所有权和借用", summary: "移动、复制、引用与共享 ⭐ Rust 核心" },
        CatalogueEntry { id: "functions", title: "函数", summary: "闭包、函数指针、高阶函数与递归" },
        CatalogueEntry { id: "pattern_matching", title: "模式匹配", summary: "match、解构与守卫 ⭐ Rust 特色" },
        CatalogueEntry { id: "error_handling", title: "错误处理", summary: "Result、Option 与自定义错误" },
        CatalogueEntry { id: "loops", title: "循环和迭代器", summary: "for、while、loop 与迭代器适配器" },
        CatalogueEntry { id: "conditionals", title: "条件语句", summary: "if、match 与短路求值" },
    ];
}

pub fn find_entry(id: &str) -> Option<&'static CatalogueEntry> {
    LESSON_CATALOGUE.iter().find(|entry| entry.id == id)
}

/// Numbered module index, one lesson per line
pub fn render_index() -> Vec<String> {
    let width = LESSON_CATALOGUE
        .iter()
        .map(|entry| entry.id.len())
        .max()
        .unwrap_or(0);

    LESSON_CATALOGUE
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            format!(
                "  {}. {:<width$} - {}: {}",
                i + 1,
                entry.id,
                entry.title,
                entry.summary,
                width = width
            )
        })
        .collect()
}
