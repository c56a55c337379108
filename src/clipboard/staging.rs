//! # 离屏暂存区
//!
//! ## 设计思路
//!
//! 富文本复制需要先把标记放进一个“可被选中”的容器，再对选区执行复制。
//! `StagingDocument` 模拟宿主文档：容器可以挂载 / 卸载，同一时刻至多一个选区。
//!
//! ## 实现思路
//!
//! - 容器固定挂在视口之外（`left:-9999px`），不会闪现在界面上。
//! - `StagingGuard` 采用 RAII：构造时挂载，`Drop` 时先清除选区再卸载容器，
//!   提前返回与 panic 展开都会走到清理。

/// 暂存容器的固定样式：完全位于视口之外。
pub const STAGING_STYLE: &str = "position:fixed;left:-9999px;top:0;width:600px;overflow:hidden;";

/// 挂载中的暂存容器。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagingContainer {
    id: u64,
    style: &'static str,
    markup: String,
}

impl StagingContainer {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn style(&self) -> &'static str {
        self.style
    }

    pub fn markup(&self) -> &str {
        &self.markup
    }
}

/// 承载暂存容器与当前选区的宿主文档。
#[derive(Debug, Default)]
pub struct StagingDocument {
    next_id: u64,
    containers: Vec<StagingContainer>,
    selection: Option<u64>,
}

impl StagingDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// 挂载一个新容器并返回其 id。
    pub fn attach(&mut self, markup: &str) -> u64 {
        self.next_id += 1;
        let id = self.next_id;
        self.containers.push(StagingContainer {
            id,
            style: STAGING_STYLE,
            markup: markup.to_string(),
        });
        log::debug!("📎 挂载暂存容器 #{}（{} 字节）", id, markup.len());
        id
    }

    /// 选中容器的全部内容；容器不存在时返回 `false`。
    pub fn select_contents(&mut self, id: u64) -> bool {
        if self.container(id).is_none() {
            return false;
        }
        self.selection = Some(id);
        true
    }

    pub fn selected_markup(&self) -> Option<&str> {
        self.selection
            .and_then(|id| self.container(id))
            .map(StagingContainer::markup)
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    pub fn detach(&mut self, id: u64) {
        self.containers.retain(|c| c.id != id);
        if self.selection == Some(id) {
            self.selection = None;
        }
        log::debug!("🧹 卸载暂存容器 #{}", id);
    }

    pub fn container(&self, id: u64) -> Option<&StagingContainer> {
        self.containers.iter().find(|c| c.id == id)
    }

    pub fn attached_count(&self) -> usize {
        self.containers.len()
    }

    pub fn has_selection(&self) -> bool {
        self.selection.is_some()
    }

    /// 没有任何挂载容器，也没有残留选区。
    pub fn is_clean(&self) -> bool {
        self.containers.is_empty() && self.selection.is_none()
    }
}

/// 暂存容器的 RAII 守卫。
///
/// # 示例
/// ```rust
/// use email_signature::clipboard::{StagingDocument, StagingGuard};
///
/// let mut document = StagingDocument::new();
/// {
///     let mut guard = StagingGuard::attach(&mut document, "<b>hi</b>");
///     assert!(guard.select_contents());
///     assert_eq!(guard.selected_markup(), Some("<b>hi</b>"));
/// }
/// assert!(document.is_clean());
/// ```
pub struct StagingGuard<'a> {
    document: &'a mut StagingDocument,
    id: u64,
}

impl<'a> StagingGuard<'a> {
    pub fn attach(document: &'a mut StagingDocument, markup: &str) -> Self {
        let id = document.attach(markup);
        Self { document, id }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn select_contents(&mut self) -> bool {
        self.document.select_contents(self.id)
    }

    pub fn selected_markup(&self) -> Option<&str> {
        self.document.selected_markup()
    }
}

impl Drop for StagingGuard<'_> {
    fn drop(&mut self) {
        self.document.clear_selection();
        self.document.detach(self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn container_is_positioned_off_screen() {
        let mut document = StagingDocument::new();
        let id = document.attach("<p>x</p>");
        let container = document.container(id).expect("attached");

        assert!(container.style().contains("left:-9999px"));
        assert!(container.style().contains("width:600px"));
        assert_eq!(container.markup(), "<p>x</p>");
    }

    #[test]
    fn guard_cleans_up_on_early_return() {
        fn stage_and_bail(document: &mut StagingDocument) -> Result<(), &'static str> {
            let mut guard = StagingGuard::attach(document, "<p>x</p>");
            guard.select_contents();
            Err("bail")
        }

        let mut document = StagingDocument::new();
        assert!(stage_and_bail(&mut document).is_err());
        assert!(document.is_clean());
    }

    #[test]
    fn guard_cleans_up_on_panic() {
        let mut document = StagingDocument::new();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let mut guard = StagingGuard::attach(&mut document, "<p>x</p>");
            guard.select_contents();
            panic!("sink exploded");
        }));

        assert!(result.is_err());
        assert!(document.is_clean());
    }

    #[test]
    fn selecting_a_detached_container_fails() {
        let mut document = StagingDocument::new();
        let id = document.attach("x");
        document.detach(id);

        assert!(!document.select_contents(id));
        assert_eq!(document.selected_markup(), None);
    }

    #[test]
    fn ids_are_not_reused() {
        let mut document = StagingDocument::new();
        let first = document.attach("a");
        document.detach(first);
        let second = document.attach("b");
        assert_ne!(first, second);
    }
}
