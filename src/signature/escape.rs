//! 标记转义
//!
//! 用户输入的文本在插入文档前统一转义，属性值在序列化时转义。
//! 只处理 `& < > " '` 五个字符，不做其他改写。

/// 转义文本 / 属性值中的标记字符。
///
/// # 示例
/// ```rust
/// use email_signature::signature::escape_markup;
///
/// assert_eq!(escape_markup("<b>\"A&B\"</b>"), "&lt;b&gt;&quot;A&amp;B&quot;&lt;/b&gt;");
/// ```
pub fn escape_markup(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

/// `escape_markup` 的逆操作，用于生成剪贴板纯文本备选内容。
pub fn unescape_markup(input: &str) -> String {
    input
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}
