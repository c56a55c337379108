//! # 素材上传客户端
//!
//! ## 设计思路
//!
//! 上传端点只关心两件事：成功时的 `secure_url`，失败时的 `error.message`。
//! 响应中的其他字段一律忽略，不做自动重试，失败由用户决定是否重新上传。
//!
//! ## 实现思路
//!
//! - `multipart/form-data`：`file`、`upload_preset`、`cloud_name` 三个字段。
//! - 只设置建连超时，不设置整体请求超时。
//! - 响应解析与网络 I/O 分离（`interpret_response`），便于单独测试。

use std::time::{Duration, Instant};

use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use serde::Deserialize;

use super::config::UploadConfig;
use super::error::UploadError;
use crate::image_handler::{ImageAsset, NORMALIZED_MIME};

#[derive(Debug, Deserialize)]
struct UploadResponse {
    #[serde(default)]
    secure_url: Option<String>,
    #[serde(default)]
    error: Option<RemoteError>,
}

#[derive(Debug, Deserialize)]
struct RemoteError {
    #[serde(default)]
    message: Option<String>,
}

/// 素材上传客户端。
pub struct AssetUploadClient {
    config: UploadConfig,
    http_client: reqwest::Client,
}

impl AssetUploadClient {
    pub fn new(config: UploadConfig) -> Result<Self, UploadError> {
        let http_client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()
            .map_err(|e| UploadError::Client(e.to_string()))?;

        Ok(Self {
            config,
            http_client,
        })
    }

    pub fn config(&self) -> &UploadConfig {
        &self.config
    }

    /// 上传规范化后的图片，返回公开地址。
    pub async fn upload_asset(&self, asset: &ImageAsset) -> Result<String, UploadError> {
        self.upload_bytes(asset.encoded_bytes().to_vec(), NORMALIZED_MIME)
            .await
    }

    /// 上传任意字节，返回公开地址。
    pub async fn upload_bytes(&self, bytes: Vec<u8>, mime: &str) -> Result<String, UploadError> {
        let endpoint = self.config.endpoint();
        let size = bytes.len();
        log::info!("☁️ 开始上传图片：{}（{} 字节）", endpoint, size);
        let started = Instant::now();

        let part = Part::bytes(bytes)
            .file_name(self.config.file_name.clone())
            .mime_str(mime)
            .map_err(|e| UploadError::Client(format!("无效的 MIME 类型 {}：{}", mime, e)))?;

        let form = Form::new()
            .part("file", part)
            .text("upload_preset", self.config.upload_preset.clone())
            .text("cloud_name", self.config.cloud_name.clone());

        let response = self
            .http_client
            .post(&endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| UploadError::Network(format!("读取响应失败：{}", e)))?;

        let result = interpret_response(status, &body);
        match &result {
            Ok(url) => log::info!(
                "✅ 上传完成（{}ms）：{}",
                started.elapsed().as_millis(),
                url
            ),
            Err(err) => log::warn!("❌ 上传失败 [{}]：{}", err.code(), err),
        }
        result
    }
}

fn map_reqwest_error(e: reqwest::Error) -> UploadError {
    if e.is_connect() {
        UploadError::Network(format!("无法连接：{}", e))
    } else {
        UploadError::Network(format!("请求失败：{}", e))
    }
}

/// 解析上传接口响应。
pub(crate) fn interpret_response(status: StatusCode, body: &str) -> Result<String, UploadError> {
    let parsed = serde_json::from_str::<UploadResponse>(body);

    if !status.is_success() {
        let message = parsed
            .ok()
            .and_then(|r| r.error)
            .and_then(|e| e.message)
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("请求失败").to_string());
        return Err(UploadError::Status {
            status: status.as_u16(),
            message,
        });
    }

    let parsed = parsed.map_err(|e| UploadError::MalformedResponse(e.to_string()))?;

    if let Some(error) = parsed.error {
        return Err(UploadError::Remote(
            error.message.unwrap_or_else(|| "未知错误".to_string()),
        ));
    }

    match parsed.secure_url {
        Some(url) if !url.trim().is_empty() => Ok(url),
        _ => Err(UploadError::MalformedResponse("响应缺少 secure_url".to_string())),
    }
}
