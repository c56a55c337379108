//! 素材上传：把规范化后的图片传到远端素材库，换取稳定的公开地址。

mod client;
mod config;
mod error;
mod session;

pub use client::AssetUploadClient;
pub use config::{UploadConfig, DEFAULT_API_BASE, DEFAULT_CLOUD_NAME, DEFAULT_UPLOAD_PRESET};
pub use error::UploadError;
pub use session::{UploadSession, UploadState, UploadTicket};
