//! # 数据源与中间模型
//!
//! ## 设计思路
//!
//! 将“外部输入类型”和“流水线产物”解耦：
//! - `ImageSource` 表示外部来源语义
//! - `RawImageData` 表示已加载但未解码的字节
//! - `ImageAsset` 表示规范化完成、可内嵌或上传的最终图片
//! - `ImageReference` 表示签名文档中 `<img src>` 最终使用的引用

use std::str::FromStr;

use base64::{Engine as _, engine::general_purpose};

/// 规范化输出的 MIME 类型。
pub const NORMALIZED_MIME: &str = "image/jpeg";

/// 图片输入来源。
pub enum ImageSource {
    /// 本地文件路径来源。
    FilePath(String),
    /// 已在内存中的字节（如上传表单）。
    Bytes(Vec<u8>),
}

/// 加载阶段输出：原始字节与来源标识。
#[derive(Debug, Clone)]
pub struct RawImageData {
    /// 原始图片字节。
    pub bytes: Vec<u8>,
    /// 来源提示（用于日志与诊断）。
    pub source_hint: &'static str,
}

/// 规范化后的图片资产。
///
/// 一次上传产生一个，重新上传即整体替换。输出始终不带 alpha 通道。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAsset {
    source_bytes: Vec<u8>,
    width: u32,
    height: u32,
    encoded_bytes: Vec<u8>,
    background: [u8; 3],
}

impl ImageAsset {
    pub(crate) fn new(
        source_bytes: Vec<u8>,
        width: u32,
        height: u32,
        encoded_bytes: Vec<u8>,
        background: [u8; 3],
    ) -> Self {
        Self {
            source_bytes,
            width,
            height,
            encoded_bytes,
            background,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// 用户上传的原始字节。
    pub fn source_bytes(&self) -> &[u8] {
        &self.source_bytes
    }

    /// 有损编码后的最终字节（JPEG）。
    pub fn encoded_bytes(&self) -> &[u8] {
        &self.encoded_bytes
    }

    pub fn background(&self) -> [u8; 3] {
        self.background
    }

    pub fn mime_type(&self) -> &'static str {
        NORMALIZED_MIME
    }

    /// 生成可直接写入 `<img src>` 的 Data URI。
    pub fn to_data_uri(&self) -> String {
        to_data_uri(NORMALIZED_MIME, &self.encoded_bytes)
    }
}

/// 图片交付方式（部署模式）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageDelivery {
    /// 以 Data URI 直接内嵌到文档中。
    Embed,
    /// 上传到远端资源库，文档中使用返回的 HTTPS 地址。
    Upload,
}

impl FromStr for ImageDelivery {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "embed" => Ok(Self::Embed),
            "upload" => Ok(Self::Upload),
            _ => Err(format!("交付方式无效: {}（可选 embed / upload）", value)),
        }
    }
}

impl ImageDelivery {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Embed => "embed",
            Self::Upload => "upload",
        }
    }
}

/// 签名文档中的图片引用。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageReference {
    /// 规范化后的 JPEG Data URI。
    Embedded(String),
    /// 编码失败时的回退：原始字节原样内嵌（MIME 由文件签名推断）。
    RawEmbedded(String),
    /// 远端资源库返回的公开地址。
    Remote(String),
}

impl ImageReference {
    /// 将未经处理的原始字节包装为 Data URI。
    pub fn raw_embedded(bytes: &[u8]) -> Self {
        let mime = infer::get(bytes)
            .map(|kind| kind.mime_type())
            .unwrap_or("application/octet-stream");
        Self::RawEmbedded(to_data_uri(mime, bytes))
    }

    /// `<img src>` 属性值。
    pub fn src(&self) -> &str {
        match self {
            Self::Embedded(uri) | Self::RawEmbedded(uri) | Self::Remote(uri) => uri,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::RawEmbedded(_))
    }
}

fn to_data_uri(mime: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime, general_purpose::STANDARD.encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_uri_uses_jpeg_mime() {
        let asset = ImageAsset::new(vec![1, 2, 3], 400, 300, vec![0xFF, 0xD8, 0xFF], [255, 255, 255]);
        assert!(asset.to_data_uri().starts_with("data:image/jpeg;base64,"));
        assert_eq!(asset.to_data_uri(), "data:image/jpeg;base64,/9j/");
    }

    #[test]
    fn raw_fallback_sniffs_png_mime() {
        let png_magic = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];
        let reference = ImageReference::raw_embedded(&png_magic);
        assert!(reference.is_fallback());
        assert!(reference.src().starts_with("data:image/png;base64,"));
    }

    #[test]
    fn raw_fallback_defaults_to_octet_stream() {
        let reference = ImageReference::raw_embedded(b"not an image");
        assert!(reference.src().starts_with("data:application/octet-stream;base64,"));
    }

    #[test]
    fn delivery_parses_case_insensitively() {
        assert_eq!(" Upload ".parse::<ImageDelivery>(), Ok(ImageDelivery::Upload));
        assert_eq!("embed".parse::<ImageDelivery>(), Ok(ImageDelivery::Embed));
        assert!("inline".parse::<ImageDelivery>().is_err());
    }
}
