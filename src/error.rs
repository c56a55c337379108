//! 统一错误类型模块
//!
//! # 设计思路
//!
//! 各子系统各自定义 `thiserror` 枚举（`ImageError` / `UploadError` / `ClipboardError`），
//! 在应用层汇总为 `AppError`，CLI 与服务层统一返回 `Result<T, AppError>`。
//!
//! # 实现思路
//!
//! - 子系统错误通过 `#[from]` 自动转换，无需手动 map。
//! - `code()` / `stage()` 提供稳定的机器可读标识，日志中与消息一起输出。
//! - 缺少必填项不是异常路径，但 `generate` 被强行调用时以 `IncompleteProfile` 报告。

use crate::clipboard::ClipboardError;
use crate::image_handler::ImageError;
use crate::signature::RequiredField;
use crate::upload::UploadError;

/// 应用级统一错误类型
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// 图片规范化失败（解码 / 编码 / 资源上限）
    #[error("{0}")]
    Image(#[from] ImageError),

    /// 素材上传失败
    #[error("{0}")]
    Upload(#[from] UploadError),

    /// 富文本复制失败
    #[error("{0}")]
    Clipboard(#[from] ClipboardError),

    /// 配置文件或环境变量无效
    #[error("配置无效: {0}")]
    Config(String),

    /// 预览目录不可用
    #[error("存储目录不可用: {0}")]
    Storage(String),

    /// 文件系统 I/O 错误
    #[error("文件系统错误: {0}")]
    Io(#[from] std::io::Error),

    /// 必填项缺失
    #[error("资料不完整，缺少: {}", join_labels(.0))]
    IncompleteProfile(Vec<RequiredField>),

    /// 尚未准备好头像
    #[error("头像尚未就绪: {0}")]
    ImageNotReady(String),

    /// 本次头像结果已被更新的请求取代
    #[error("头像结果已过期：已有更新的上传")]
    Superseded,
}

fn join_labels(fields: &[RequiredField]) -> String {
    fields
        .iter()
        .map(|f| f.label())
        .collect::<Vec<_>>()
        .join(", ")
}

impl AppError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Image(e) => e.code(),
            Self::Upload(e) => e.code(),
            Self::Clipboard(e) => e.code(),
            Self::Config(_) => "E_CONFIG",
            Self::Storage(_) => "E_STORAGE",
            Self::Io(_) => "E_IO",
            Self::IncompleteProfile(_) => "E_INCOMPLETE_PROFILE",
            Self::ImageNotReady(_) => "E_IMAGE_NOT_READY",
            Self::Superseded => "E_SUPERSEDED",
        }
    }

    pub fn stage(&self) -> &'static str {
        match self {
            Self::Image(e) => e.stage(),
            Self::Upload(e) => e.stage(),
            Self::Clipboard(e) => e.stage(),
            Self::Config(_) => "config",
            Self::Storage(_) | Self::Io(_) => "storage",
            Self::IncompleteProfile(_) | Self::ImageNotReady(_) => "generate",
            Self::Superseded => "upload",
        }
    }
}
