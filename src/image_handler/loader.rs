//! # 加载与校验模块
//!
//! 负责把头像来源（本地文件 / 内存字节）读成原始字节。
//! 体积上限在读取前后各校验一次，最后用文件签名（`infer`）拒绝非图片内容，
//! 解码器只会看到“看起来是图片”的输入。

use std::path::Path;

use super::source::{ImageSource, RawImageData};
use super::{ImageConfig, ImageError};

/// 按来源加载原始字节。
pub fn load_source(source: ImageSource, config: &ImageConfig) -> Result<RawImageData, ImageError> {
    let raw = match source {
        ImageSource::FilePath(path) => RawImageData {
            bytes: read_file_within_limit(Path::new(&path), config.max_file_size)?,
            source_hint: "file",
        },
        ImageSource::Bytes(bytes) => RawImageData {
            bytes,
            source_hint: "bytes",
        },
    };

    ensure_within_limit(raw.bytes.len() as u64, config.max_file_size)?;
    ensure_image_signature(&raw.bytes)?;
    Ok(raw)
}

fn read_file_within_limit(path: &Path, max_file_size: u64) -> Result<Vec<u8>, ImageError> {
    log::info!("📁 读取头像文件：{}", path.display());

    let metadata = std::fs::metadata(path).map_err(|e| {
        ImageError::FileSystem(format!("无法访问头像文件 '{}'：{}", path.display(), e))
    })?;
    if !metadata.is_file() {
        return Err(ImageError::FileSystem(format!(
            "不是普通文件：{}",
            path.display()
        )));
    }
    ensure_within_limit(metadata.len(), max_file_size)?;

    std::fs::read(path)
        .map_err(|e| ImageError::FileSystem(format!("读取头像文件失败：{}", e)))
}

fn ensure_within_limit(len: u64, max_file_size: u64) -> Result<(), ImageError> {
    if len > max_file_size {
        return Err(ImageError::ResourceLimit(format!(
            "头像体积过大：{:.2} MB（限制：{:.2} MB）",
            len as f64 / 1024.0 / 1024.0,
            max_file_size as f64 / 1024.0 / 1024.0
        )));
    }
    Ok(())
}

fn ensure_image_signature(bytes: &[u8]) -> Result<(), ImageError> {
    let kind = infer::get(bytes)
        .ok_or_else(|| ImageError::InvalidFormat("无法识别的文件内容".to_string()))?;

    match kind.matcher_type() {
        infer::MatcherType::Image => Ok(()),
        _ => Err(ImageError::InvalidFormat(format!(
            "上传的文件不是图片：{}",
            kind.mime_type()
        ))),
    }
}
