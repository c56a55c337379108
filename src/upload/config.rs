use serde::{Deserialize, Serialize};

pub const DEFAULT_API_BASE: &str = "https://api.cloudinary.com";
pub const DEFAULT_CLOUD_NAME: &str = "duybphdbl";
pub const DEFAULT_UPLOAD_PRESET: &str = "profile_preset";

/// 素材上传配置。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    /// 接口根地址（测试时指向本地假服务）。
    pub api_base: String,
    pub cloud_name: String,
    /// 无签名上传预设。
    pub upload_preset: String,
    /// 建连超时（秒）。整个请求不设超时。
    pub connect_timeout_secs: u64,
    /// 上传文件名。
    pub file_name: String,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            cloud_name: DEFAULT_CLOUD_NAME.to_string(),
            upload_preset: DEFAULT_UPLOAD_PRESET.to_string(),
            connect_timeout_secs: 8,
            file_name: "profile.jpg".to_string(),
        }
    }
}

impl UploadConfig {
    /// `{api_base}/v1_1/{cloud_name}/image/upload`
    ///
    /// # 示例
    /// ```rust
    /// use email_signature::upload::UploadConfig;
    ///
    /// let config = UploadConfig::default();
    /// assert_eq!(
    ///     config.endpoint(),
    ///     "https://api.cloudinary.com/v1_1/duybphdbl/image/upload"
    /// );
    /// ```
    pub fn endpoint(&self) -> String {
        format!(
            "{}/v1_1/{}/image/upload",
            self.api_base.trim_end_matches('/'),
            self.cloud_name
        )
    }
}
