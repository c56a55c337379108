use thiserror::Error;

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("无法创建 HTTP 客户端：{0}")]
    Client(String),

    #[error("上传请求失败：{0}")]
    Network(String),

    #[error("上传失败（HTTP {status}）：{message}")]
    Status { status: u16, message: String },

    #[error("素材服务拒绝上传：{0}")]
    Remote(String),

    #[error("无法解析上传响应：{0}")]
    MalformedResponse(String),
}

impl UploadError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Client(_) => "E_UPLOAD_CLIENT",
            Self::Network(_) => "E_UPLOAD_NETWORK",
            Self::Status { .. } => "E_UPLOAD_HTTP_STATUS",
            Self::Remote(_) => "E_UPLOAD_REMOTE",
            Self::MalformedResponse(_) => "E_UPLOAD_RESPONSE",
        }
    }

    pub fn stage(&self) -> &'static str {
        match self {
            Self::Client(_) | Self::Network(_) => "request",
            Self::Status { .. } | Self::Remote(_) | Self::MalformedResponse(_) => "response",
        }
    }
}
