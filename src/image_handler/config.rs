//! # 配置模块
//!
//! ## 设计思路
//!
//! 将图片规范化的“策略常量”与“资源上限”集中到 `ImageConfig`。
//! 目标宽度、背景色、JPEG 质量属于产品策略而非用户选项：
//! 固定下来才能让输出体积可预期、同一输入多次输出逐字节一致。
//!
//! ## 实现思路
//!
//! - `Default` 提供生产配置（400 宽 / 白底 / 质量 85）。
//! - `normalized_height` 以整数运算实现“四舍五入（半数进一）”，不经过浮点。
//! - 输出尺寸由源图宽高比决定，细长图会放大出巨大画布，
//!   因此 `check_output_dimensions` 在缩放前对目标尺寸套用同一组上限。

use image::imageops::FilterType;

use super::ImageError;

/// 规范化后图片的固定宽度（逻辑像素）。
pub const TARGET_WIDTH: u32 = 400;

/// JPEG 编码质量（对应 0.85）。
pub const JPEG_QUALITY: u8 = 85;

/// 不透明白色背景。
pub const WHITE: [u8; 3] = [255, 255, 255];

/// 图片规范化配置。
#[derive(Debug, Clone)]
pub struct ImageConfig {
    /// 输出宽度，与源图尺寸无关。
    pub target_width: u32,
    /// 有损编码质量（1~100）。
    pub jpeg_quality: u8,
    /// 透明区域铺底颜色（RGB）。
    pub background: [u8; 3],
    /// 读取原始字节时允许的最大文件体积（字节）。
    pub max_file_size: u64,
    /// 解码后的像素上限（`width * height`）。
    pub max_decoded_pixels: u64,
    /// 解码阶段允许的预计内存上限（按 RGBA 估算，字节）。
    pub max_decoded_bytes: u64,
    /// 缩放滤镜策略。
    pub resize_filter: FilterType,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            target_width: TARGET_WIDTH,
            jpeg_quality: JPEG_QUALITY,
            background: WHITE,
            max_file_size: 20 * 1024 * 1024,
            max_decoded_pixels: 40_000_000,
            max_decoded_bytes: 160 * 1024 * 1024,
            resize_filter: FilterType::CatmullRom,
        }
    }
}

impl ImageConfig {
    /// 校验缩放目标尺寸是否在像素与内存上限之内（按 RGBA 估算）。
    pub fn check_output_dimensions(&self, width: u32, height: u32) -> Result<(), ImageError> {
        let pixels = (width as u64)
            .checked_mul(height as u64)
            .ok_or_else(|| ImageError::ResourceLimit("输出像素数溢出".to_string()))?;

        if pixels > self.max_decoded_pixels {
            return Err(ImageError::ResourceLimit(format!(
                "输出尺寸过大：{}x{} = {} 像素（限制：{} 像素）",
                width, height, pixels, self.max_decoded_pixels
            )));
        }

        let estimated = pixels
            .checked_mul(4)
            .ok_or_else(|| ImageError::ResourceLimit("输出内存估算溢出".to_string()))?;
        if estimated > self.max_decoded_bytes {
            return Err(ImageError::ResourceLimit(format!(
                "输出预计内存过大：{:.2} MB（限制：{:.2} MB）",
                estimated as f64 / 1024.0 / 1024.0,
                self.max_decoded_bytes as f64 / 1024.0 / 1024.0
            )));
        }

        Ok(())
    }
}

/// 按固定宽度等比计算目标高度。
///
/// `round_half_up(target_width * source_height / source_width)`，结果至少为 1。
/// 源宽度为 0 时返回 `None`。
///
/// # 示例
/// ```rust
/// use email_signature::image_handler::normalized_height;
///
/// assert_eq!(normalized_height(800, 600, 400), Some(300));
/// assert_eq!(normalized_height(3, 1, 400), Some(133));
/// assert_eq!(normalized_height(3, 2, 400), Some(267));
/// ```
pub fn normalized_height(source_width: u32, source_height: u32, target_width: u32) -> Option<u32> {
    if source_width == 0 {
        return None;
    }

    let numerator = 2 * target_width as u64 * source_height as u64 + source_width as u64;
    let denominator = 2 * source_width as u64;
    let height = (numerator / denominator).max(1);

    u32::try_from(height).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_policy() {
        let config = ImageConfig::default();
        assert_eq!(config.target_width, 400);
        assert_eq!(config.jpeg_quality, 85);
        assert_eq!(config.background, [255, 255, 255]);
    }

    #[test]
    fn height_rounds_half_up() {
        // 400 * 1 / 800 = 0.5 -> 1
        assert_eq!(normalized_height(800, 1, 400), Some(1));
        // 400 * 5 / 8 = 250
        assert_eq!(normalized_height(8, 5, 400), Some(250));
        // 400 * 7 / 1600 = 1.75 -> 2
        assert_eq!(normalized_height(1600, 7, 400), Some(2));
        // 400 * 1 / 3 = 133.33 -> 133
        assert_eq!(normalized_height(3, 1, 400), Some(133));
    }

    #[test]
    fn height_never_collapses_to_zero() {
        assert_eq!(normalized_height(100_000, 1, 400), Some(1));
    }

    #[test]
    fn output_dimensions_within_limits_pass() {
        assert!(ImageConfig::default().check_output_dimensions(400, 300).is_ok());
    }

    #[test]
    fn tall_output_exceeds_pixel_limit() {
        // 2x20000 源图 -> 400x4000000 目标
        let height = normalized_height(2, 20_000, 400).expect("height");
        let result = ImageConfig::default().check_output_dimensions(400, height);
        assert!(matches!(result, Err(ImageError::ResourceLimit(_))));
    }

    #[test]
    fn output_memory_limit_is_enforced() {
        let config = ImageConfig {
            max_decoded_bytes: 400 * 100 * 4 - 1,
            ..Default::default()
        };
        assert!(matches!(
            config.check_output_dimensions(400, 100),
            Err(ImageError::ResourceLimit(_))
        ));
    }

    #[test]
    fn zero_width_source_is_rejected() {
        assert_eq!(normalized_height(0, 10, 400), None);
    }
}
