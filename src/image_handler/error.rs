//! # 错误模型模块
//!
//! ## 设计思路
//!
//! 使用单一错误枚举承载图片规范化链路中的所有错误来源，避免字符串拼接式错误处理。
//! 通过 `thiserror` 保持人类可读错误，同时让调用侧可按分支匹配：
//! - 解码类错误（`InvalidFormat` / `Decode` / `ResourceLimit`）对本次输入是致命的
//! - 编码错误（`Encode`）可由调用方回退为“原始字节内嵌”

/// 图片处理统一错误类型。
///
/// 该类型会在应用层被上转为 `AppError`，最终以可读文本呈现给用户。
#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    #[error("解码错误：{0}")]
    Decode(String),

    #[error("格式错误：{0}")]
    InvalidFormat(String),

    #[error("编码错误：{0}")]
    Encode(String),

    #[error("文件错误：{0}")]
    FileSystem(String),

    #[error("资源限制：{0}")]
    ResourceLimit(String),
}

impl ImageError {
    /// 稳定错误码，供 CLI / 上层展示与日志聚合。
    pub fn code(&self) -> &'static str {
        match self {
            Self::Decode(_) => "E_DECODE",
            Self::InvalidFormat(_) => "E_INVALID_FORMAT",
            Self::Encode(_) => "E_ENCODE",
            Self::FileSystem(_) => "E_FILE",
            Self::ResourceLimit(_) => "E_RESOURCE_LIMIT",
        }
    }

    /// 出错阶段。
    pub fn stage(&self) -> &'static str {
        match self {
            Self::FileSystem(_) => "load",
            Self::Decode(_) | Self::InvalidFormat(_) | Self::ResourceLimit(_) => "decode",
            Self::Encode(_) => "encode",
        }
    }
}
