//! # 签名模块
//!
//! 资料模型 → 文档树 → HTML 序列化。
//!
//! - `profile`：草稿与校验后的只读资料
//! - `branding`：机构图标 / 横幅地址
//! - `document`：只带行内样式的文档树
//! - `builder`：纯函数式的签名布局
//! - `escape`：文本转义

mod branding;
mod builder;
mod document;
mod escape;
mod profile;

pub use branding::BrandingAssets;
pub use builder::{dial_link, social_link_url, SignatureDocumentBuilder};
pub use document::{Element, InlineStyle, Node, RenderedDocument, SectionKind, TextNode};
pub use escape::{escape_markup, unescape_markup};
pub use profile::{BrandColor, ProfileDraft, RequiredField, SignatureProfile, DEFAULT_DISCLAIMER};
