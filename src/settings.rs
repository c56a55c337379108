//! 应用设置
//!
//! # 设计思路
//!
//! 设置以 JSON 文件保存，所有字段都有默认值，缺省的字段不会导致解析失败。
//! 部署相关的少数字段允许通过环境变量覆盖，便于在不改文件的情况下切换素材库。
//!
//! # 实现思路
//!
//! - 读取顺序：默认值 → 设置文件（可选）→ 环境变量。
//! - 环境变量查找以闭包注入，测试时不必修改进程环境。

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::clipboard::ClipboardConfig;
use crate::error::AppError;
use crate::image_handler::ImageDelivery;
use crate::signature::BrandingAssets;
use crate::upload::UploadConfig;

pub const ENV_CLOUD_NAME: &str = "SIGNATURE_CLOUD_NAME";
pub const ENV_UPLOAD_PRESET: &str = "SIGNATURE_UPLOAD_PRESET";
pub const ENV_UPLOAD_API_BASE: &str = "SIGNATURE_UPLOAD_API_BASE";
pub const ENV_IMAGE_DELIVERY: &str = "SIGNATURE_IMAGE_DELIVERY";

/// 应用设置。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// 头像交付方式。
    pub delivery: ImageDelivery,
    pub upload: UploadConfig,
    pub clipboard: ClipboardConfig,
    pub branding: BrandingAssets,
    /// 预览文件目录；未设置时使用系统临时目录。
    pub preview_dir: Option<String>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            delivery: ImageDelivery::Embed,
            upload: UploadConfig::default(),
            clipboard: ClipboardConfig::default(),
            branding: BrandingAssets::default(),
            preview_dir: None,
        }
    }
}

impl AppSettings {
    /// 读取设置文件（可选）并应用进程环境变量。
    pub fn load(path: Option<&Path>) -> Result<Self, AppError> {
        let mut settings = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        settings.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(settings)
    }

    pub fn from_file(path: &Path) -> Result<Self, AppError> {
        let content = fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("读取设置文件 '{}' 失败: {}", path.display(), e))
        })?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self, AppError> {
        serde_json::from_str(content).map_err(|e| AppError::Config(format!("解析设置文件失败: {}", e)))
    }

    /// 应用环境变量覆盖。空值视为未设置。
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(cloud_name) = get(ENV_CLOUD_NAME) {
            self.upload.cloud_name = cloud_name;
        }
        if let Some(preset) = get(ENV_UPLOAD_PRESET) {
            self.upload.upload_preset = preset;
        }
        if let Some(api_base) = get(ENV_UPLOAD_API_BASE) {
            self.upload.api_base = api_base;
        }
        if let Some(delivery) = get(ENV_IMAGE_DELIVERY) {
            self.delivery = delivery
                .parse::<ImageDelivery>()
                .map_err(|e| AppError::Config(format!("{}: {}", ENV_IMAGE_DELIVERY, e)))?;
        }
        Ok(())
    }

    pub fn preview_dir(&self) -> Option<PathBuf> {
        self.preview_dir
            .as_deref()
            .filter(|dir| !dir.trim().is_empty())
            .map(PathBuf::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn empty_json_yields_defaults() {
        let settings = AppSettings::from_json("{}").expect("valid");
        assert_eq!(settings, AppSettings::default());
        assert_eq!(settings.delivery, ImageDelivery::Embed);
    }

    #[test]
    fn nested_sections_merge_with_defaults() {
        let settings = AppSettings::from_json(
            r#"{"delivery":"upload","upload":{"upload_preset":"team"},"clipboard":{"retries":1}}"#,
        )
        .expect("valid");

        assert_eq!(settings.delivery, ImageDelivery::Upload);
        assert_eq!(settings.upload.upload_preset, "team");
        assert_eq!(settings.upload.cloud_name, crate::upload::DEFAULT_CLOUD_NAME);
        assert_eq!(settings.clipboard.retries, 1);
    }

    #[test]
    fn environment_overrides_file_values() {
        let mut settings = AppSettings::default();
        settings
            .apply_overrides(env(&[
                (ENV_CLOUD_NAME, "acme"),
                (ENV_UPLOAD_API_BASE, "http://127.0.0.1:8080"),
                (ENV_IMAGE_DELIVERY, "UPLOAD"),
                (ENV_UPLOAD_PRESET, "  "),
            ]))
            .expect("valid overrides");

        assert_eq!(settings.upload.cloud_name, "acme");
        assert_eq!(settings.upload.api_base, "http://127.0.0.1:8080");
        assert_eq!(settings.delivery, ImageDelivery::Upload);
        assert_eq!(settings.upload.upload_preset, crate::upload::DEFAULT_UPLOAD_PRESET);
    }

    #[test]
    fn invalid_delivery_is_config_error() {
        let mut settings = AppSettings::default();
        let err = settings
            .apply_overrides(env(&[(ENV_IMAGE_DELIVERY, "ftp")]))
            .unwrap_err();
        assert_eq!(err.code(), "E_CONFIG");
    }

    #[test]
    fn malformed_json_is_config_error() {
        assert!(matches!(AppSettings::from_json("{"), Err(AppError::Config(_))));
    }

    #[test]
    fn blank_preview_dir_is_ignored() {
        let settings = AppSettings {
            preview_dir: Some(" ".into()),
            ..Default::default()
        };
        assert_eq!(settings.preview_dir(), None);
    }
}
