//! # 签名文档树
//!
//! ## 设计思路
//!
//! 目标邮件客户端会剥离 `<style>`、外部样式表与 `class` 属性，只保留行内 `style`。
//! 因此文档树中每个元素都直接携带自己的样式声明，不存在任何共享样式引用。
//!
//! - `Element`：标签 + 普通属性 + 行内样式 + 子节点
//! - `Text`：构造时即已转义的文本叶子
//! - `SectionKind`：仅用于检查 / 测试的区块标记，**不会**被序列化
//!
//! ## 实现思路
//!
//! 序列化是纯函数：属性按插入顺序输出，样式声明按插入顺序拼接，
//! 同一棵树永远得到同一串标记。

use super::escape::{escape_markup, unescape_markup};

/// 不需要闭合标签的元素。
const VOID_TAGS: [&str; 3] = ["img", "br", "hr"];

/// 序列化为纯文本时，结束后换行的块级元素。
const BLOCK_TAGS: [&str; 4] = ["div", "tr", "table", "p"];

/// 文档中的可识别区块。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionKind {
    ProfileTable,
    ProfileImage,
    DisplayName,
    Location,
    Divider,
    EmailRow,
    PhoneRow,
    SocialRow,
    Disclaimer,
    Banner,
    DisclaimerText,
}

/// 有序的行内样式声明列表。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InlineStyle {
    declarations: Vec<(&'static str, String)>,
}

impl InlineStyle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, property: &'static str, value: impl Into<String>) -> Self {
        let value = value.into();
        match self.declarations.iter_mut().find(|(p, _)| *p == property) {
            Some(existing) => existing.1 = value,
            None => self.declarations.push((property, value)),
        }
        self
    }

    pub fn get(&self, property: &str) -> Option<&str> {
        self.declarations
            .iter()
            .find(|(p, _)| *p == property)
            .map(|(_, v)| v.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    /// `prop:value;prop:value` 形式。
    pub fn to_css(&self) -> String {
        self.declarations
            .iter()
            .map(|(p, v)| format!("{}:{}", p, v))
            .collect::<Vec<_>>()
            .join(";")
    }
}

/// 已转义的文本叶子。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextNode {
    escaped: String,
}

impl TextNode {
    /// 转义后保存，之后不再改写。
    pub fn new(raw: &str) -> Self {
        Self {
            escaped: escape_markup(raw),
        }
    }

    pub fn escaped(&self) -> &str {
        &self.escaped
    }

    pub fn to_plain(&self) -> String {
        unescape_markup(&self.escaped)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(TextNode),
}

/// 文档元素。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    tag: &'static str,
    attributes: Vec<(&'static str, String)>,
    style: InlineStyle,
    section: Option<SectionKind>,
    children: Vec<Node>,
}

impl Element {
    pub fn new(tag: &'static str) -> Self {
        Self {
            tag,
            attributes: Vec::new(),
            style: InlineStyle::new(),
            section: None,
            children: Vec::new(),
        }
    }

    pub fn attr(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.attributes.push((name, value.into()));
        self
    }

    pub fn style(mut self, style: InlineStyle) -> Self {
        self.style = style;
        self
    }

    pub fn section(mut self, section: SectionKind) -> Self {
        self.section = Some(section);
        self
    }

    pub fn child(mut self, element: Element) -> Self {
        self.children.push(Node::Element(element));
        self
    }

    pub fn maybe_child(self, element: Option<Element>) -> Self {
        match element {
            Some(element) => self.child(element),
            None => self,
        }
    }

    pub fn text(mut self, raw: &str) -> Self {
        self.children.push(Node::Text(TextNode::new(raw)));
        self
    }

    pub fn tag(&self) -> &'static str {
        self.tag
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn inline_style(&self) -> &InlineStyle {
        &self.style
    }

    pub fn section_kind(&self) -> Option<SectionKind> {
        self.section
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// 子树中的全部文本（已反转义）。
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        for child in &self.children {
            match child {
                Node::Text(text) => out.push_str(&text.to_plain()),
                Node::Element(element) => element.collect_text(out),
            }
        }
    }

    /// 深度优先遍历（含自身）。
    pub fn descendants(&self) -> Vec<&Element> {
        let mut out = Vec::new();
        self.collect_descendants(&mut out);
        out
    }

    fn collect_descendants<'a>(&'a self, out: &mut Vec<&'a Element>) {
        out.push(self);
        for child in &self.children {
            if let Node::Element(element) = child {
                element.collect_descendants(out);
            }
        }
    }

    fn write_html(&self, out: &mut String) {
        out.push('<');
        out.push_str(self.tag);
        for (name, value) in &self.attributes {
            out.push(' ');
            out.push_str(name);
            out.push_str("=\"");
            out.push_str(&escape_markup(value));
            out.push('"');
        }
        if !self.style.is_empty() {
            out.push_str(" style=\"");
            out.push_str(&escape_markup(&self.style.to_css()));
            out.push('"');
        }
        out.push('>');

        if VOID_TAGS.contains(&self.tag) {
            return;
        }

        for child in &self.children {
            match child {
                Node::Text(text) => out.push_str(text.escaped()),
                Node::Element(element) => element.write_html(out),
            }
        }

        out.push_str("</");
        out.push_str(self.tag);
        out.push('>');
    }

    fn write_plain(&self, out: &mut String) {
        for child in &self.children {
            match child {
                Node::Text(text) => out.push_str(&text.to_plain()),
                Node::Element(element) => element.write_plain(out),
            }
        }
        if BLOCK_TAGS.contains(&self.tag) {
            out.push('\n');
        } else if self.tag == "td" {
            out.push(' ');
        }
    }
}

/// 构建完成的签名文档。构建后不可变，只能被序列化或检查。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDocument {
    root: Element,
}

impl RenderedDocument {
    pub(crate) fn new(root: Element) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Element {
        &self.root
    }

    /// 序列化为可粘贴的 HTML 片段。
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.root.write_html(&mut out);
        out
    }

    /// 纯文本版本，作为剪贴板中的备选格式。
    pub fn to_plain_text(&self) -> String {
        let mut raw = String::new();
        self.root.write_plain(&mut raw);
        raw.lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// 第一个带指定标记的区块。
    pub fn section(&self, kind: SectionKind) -> Option<&Element> {
        self.root
            .descendants()
            .into_iter()
            .find(|e| e.section_kind() == Some(kind))
    }

    /// 带指定标记的区块数量。
    pub fn count_sections(&self, kind: SectionKind) -> usize {
        self.root
            .descendants()
            .into_iter()
            .filter(|e| e.section_kind() == Some(kind))
            .count()
    }

    /// 文档中全部链接目标（`href`）。
    pub fn link_targets(&self) -> Vec<&str> {
        self.root
            .descendants()
            .into_iter()
            .filter(|e| e.tag() == "a")
            .filter_map(|e| e.attribute("href"))
            .collect()
    }
}
