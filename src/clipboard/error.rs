use thiserror::Error;

/// 富文本复制失败时给用户的提示。
pub const MANUAL_COPY_HINT: &str =
    "Failed to copy. Please select and copy manually from the preview.";

#[derive(Debug, Error)]
pub enum ClipboardError {
    /// 剪贴板被其他进程占用，重试预算内仍未释放。
    #[error("剪贴板被占用：{0}。Failed to copy. Please select and copy manually from the preview.")]
    Busy(String),

    /// 系统拒绝或不支持富文本写入。
    #[error("复制被拒绝：{0}。Failed to copy. Please select and copy manually from the preview.")]
    Denied(String),

    /// 暂存区没有可复制的选区。
    #[error("暂存区选区无效：{0}。Failed to copy. Please select and copy manually from the preview.")]
    Staging(String),
}

impl ClipboardError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Busy(_) => "E_CLIPBOARD_BUSY",
            Self::Denied(_) => "E_CLIPBOARD_DENIED",
            Self::Staging(_) => "E_CLIPBOARD_STAGING",
        }
    }

    pub fn stage(&self) -> &'static str {
        match self {
            Self::Staging(_) => "stage",
            Self::Busy(_) | Self::Denied(_) => "copy",
        }
    }

    /// 提示用户从预览中手动复制。
    pub fn manual_copy_hint(&self) -> &'static str {
        MANUAL_COPY_HINT
    }
}
