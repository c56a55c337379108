//! 预览文件存储模块
//!
//! # 设计思路
//!
//! 富文本复制失败时，用户需要一个可以打开并手动复制的预览页面。
//! 本模块统一管理预览文件的目录与命名。
//!
//! # 实现思路
//!
//! - 优先使用设置中的自定义目录。
//! - 未设置时回退到系统临时目录下的 `email-signature` 子目录。
//! - 目录不存在时自动 `create_dir_all`，避免上层判断。
//! - 文件名带本地时间戳，多次生成互不覆盖。

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;

use crate::error::AppError;

/// 获取预览目录
///
/// # 返回
/// - `Ok(PathBuf)`：可用的预览目录
/// - `Err(AppError::Storage)`：无法创建目录
pub fn get_preview_dir(custom_dir: Option<&Path>) -> Result<PathBuf, AppError> {
    let dir = match custom_dir {
        Some(dir) => dir.to_path_buf(),
        None => std::env::temp_dir().join("email-signature"),
    };

    if !dir.exists() {
        fs::create_dir_all(&dir).map_err(|e| {
            AppError::Storage(format!("创建预览目录 '{}' 失败: {}", dir.display(), e))
        })?;
    }
    Ok(dir)
}

/// 包一层最小的 HTML 页面，浏览器打开后可直接全选复制。
fn preview_page(fragment: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>Email signature preview</title></head>\n<body>\n{}\n</body>\n</html>\n",
        fragment
    )
}

/// 写入预览文件并返回其路径。
pub fn write_preview(dir: &Path, fragment: &str) -> Result<PathBuf, AppError> {
    let file_name = format!("signature-{}.html", Local::now().format("%Y%m%d-%H%M%S-%3f"));
    let path = dir.join(file_name);
    fs::write(&path, preview_page(fragment))?;
    log::info!("📝 预览文件已写入：{}", path.display());
    Ok(path)
}
