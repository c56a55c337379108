//! # 解码与变换流水线模块
//!
//! ## 设计思路
//!
//! `RasterCodec` 是 `ImageCodec` 的生产实现，集中管理“字节 → 位图 → 缩放 → 铺底 → JPEG”，
//! 并在关键节点增加资源上限控制。
//! 优先做尺寸检查，再进行完整解码，降低恶意输入触发高内存开销的风险。
//!
//! ## 实现思路
//!
//! 1. 猜测格式并读取 header 尺寸
//! 2. 按像素 / 内存上限快速拒绝
//! 3. 完整解码
//! 4. `fast_image_resize` 精确缩放（失败回退 `image::resize_exact`）
//! 5. 逐像素 alpha 合成到不透明背景，输出 RGB8
//! 6. 固定质量 JPEG 编码（编码器本身是确定性的，同输入同输出）

use fast_image_resize as fr;
use image::codecs::jpeg::JpegEncoder;
use image::{
    DynamicImage, ExtendedColorType, GenericImageView, ImageBuffer, ImageEncoder, Rgb, RgbImage,
    Rgba,
};
use std::io::Cursor;

use super::codec::ImageCodec;
use super::{ImageConfig, ImageError};

/// 基于 `image` 与 `fast_image_resize` 的编解码器。
#[derive(Debug, Default, Clone, Copy)]
pub struct RasterCodec;

impl ImageCodec for RasterCodec {
    type Raster = DynamicImage;

    fn decode(&self, bytes: &[u8], config: &ImageConfig) -> Result<DynamicImage, ImageError> {
        image::guess_format(bytes)
            .map_err(|e| ImageError::InvalidFormat(format!("不支持的图片格式：{}", e)))?;

        let (header_width, header_height) = Self::inspect_dimensions_from_memory(bytes)?;
        Self::validate_pixel_limits(config, header_width, header_height)?;
        Self::validate_decoded_memory_limits(config, header_width, header_height)?;

        let decoded = image::load_from_memory(bytes)
            .map_err(|e| ImageError::Decode(format!("图片解码失败：{}", e)))?;

        let (width, height) = decoded.dimensions();
        if width == 0 || height == 0 {
            return Err(ImageError::Decode(format!("图片尺寸无效：{}x{}", width, height)));
        }
        Self::validate_pixel_limits(config, width, height)?;
        Self::validate_decoded_memory_limits(config, width, height)?;

        Ok(decoded)
    }

    fn dimensions(&self, raster: &DynamicImage) -> (u32, u32) {
        raster.dimensions()
    }

    fn resize(
        &self,
        raster: DynamicImage,
        width: u32,
        height: u32,
        config: &ImageConfig,
    ) -> Result<DynamicImage, ImageError> {
        if width == 0 || height == 0 {
            return Err(ImageError::ResourceLimit(format!(
                "目标尺寸无效：{}x{}",
                width, height
            )));
        }
        config.check_output_dimensions(width, height)?;

        match Self::resize_with_fast_image_resize(&raster, width, height, config.resize_filter) {
            Ok(resized) => Ok(resized),
            Err(err) => {
                log::warn!(
                    "⚠️ fast_image_resize 缩放失败，回退 image::resize_exact：{}",
                    err
                );
                Ok(raster.resize_exact(width, height, config.resize_filter))
            }
        }
    }

    fn flatten_on_background(
        &self,
        raster: DynamicImage,
        background: [u8; 3],
    ) -> Result<DynamicImage, ImageError> {
        let rgba = raster.to_rgba8();
        let (width, height) = rgba.dimensions();
        let mut canvas: RgbImage = ImageBuffer::from_pixel(width, height, Rgb(background));

        for (dst, src) in canvas.pixels_mut().zip(rgba.pixels()) {
            let Rgba([r, g, b, a]) = *src;
            dst.0 = [
                blend_channel(r, a, background[0]),
                blend_channel(g, a, background[1]),
                blend_channel(b, a, background[2]),
            ];
        }

        Ok(DynamicImage::ImageRgb8(canvas))
    }

    fn encode(&self, raster: &DynamicImage, quality: u8) -> Result<Vec<u8>, ImageError> {
        let converted;
        let rgb = match raster.as_rgb8() {
            Some(rgb) => rgb,
            None => {
                converted = raster.to_rgb8();
                &converted
            }
        };
        let (width, height) = rgb.dimensions();

        let mut buf = Vec::new();
        JpegEncoder::new_with_quality(&mut buf, quality.clamp(1, 100))
            .write_image(rgb.as_raw(), width, height, ExtendedColorType::Rgb8)
            .map_err(|e| ImageError::Encode(format!("JPEG 编码失败：{}", e)))?;

        Ok(buf)
    }
}

/// 单通道 alpha 合成：`src * a + bg * (255 - a)`，按 255 归一并四舍五入。
fn blend_channel(src: u8, alpha: u8, bg: u8) -> u8 {
    let a = alpha as u32;
    let value = src as u32 * a + bg as u32 * (255 - a);
    ((value + 127) / 255) as u8
}

impl RasterCodec {
    /// 仅通过内存中的图片头信息读取宽高。
    ///
    /// 用于在完整解码前做像素限制检查。
    fn inspect_dimensions_from_memory(bytes: &[u8]) -> Result<(u32, u32), ImageError> {
        let cursor = Cursor::new(bytes);
        let reader = image::ImageReader::new(cursor)
            .with_guessed_format()
            .map_err(|e| ImageError::InvalidFormat(format!("无法识别图片格式：{}", e)))?;

        reader
            .into_dimensions()
            .map_err(|e| ImageError::InvalidFormat(format!("无法读取图片尺寸：{}", e)))
    }

    /// 校验像素数量是否超过配置上限。
    fn validate_pixel_limits(config: &ImageConfig, width: u32, height: u32) -> Result<(), ImageError> {
        let pixels = (width as u64)
            .checked_mul(height as u64)
            .ok_or_else(|| ImageError::ResourceLimit("图片像素数溢出".to_string()))?;

        if pixels > config.max_decoded_pixels {
            return Err(ImageError::ResourceLimit(format!(
                "图片像素过大：{} 像素（限制：{} 像素）",
                pixels, config.max_decoded_pixels
            )));
        }

        Ok(())
    }

    fn validate_decoded_memory_limits(
        config: &ImageConfig,
        width: u32,
        height: u32,
    ) -> Result<(), ImageError> {
        let estimated = (width as u64)
            .checked_mul(height as u64)
            .and_then(|pixels| pixels.checked_mul(4))
            .ok_or_else(|| ImageError::ResourceLimit("图片解码内存估算溢出".to_string()))?;

        if estimated > config.max_decoded_bytes {
            return Err(ImageError::ResourceLimit(format!(
                "图片解码预计内存过大：{:.2} MB（限制：{:.2} MB）",
                estimated as f64 / 1024.0 / 1024.0,
                config.max_decoded_bytes as f64 / 1024.0 / 1024.0
            )));
        }

        Ok(())
    }

    fn resize_with_fast_image_resize(
        image: &DynamicImage,
        target_width: u32,
        target_height: u32,
        filter: image::imageops::FilterType,
    ) -> Result<DynamicImage, ImageError> {
        let src = image.to_rgba8();
        let (src_width, src_height) = src.dimensions();

        let src_image = fr::images::Image::from_vec_u8(
            src_width,
            src_height,
            src.into_raw(),
            fr::PixelType::U8x4,
        )
        .map_err(|e| ImageError::Decode(format!("构建源图像缓冲失败：{}", e)))?;

        let mut dst_image = fr::images::Image::new(target_width, target_height, fr::PixelType::U8x4);

        let mut resizer = fr::Resizer::new();
        let options = fr::ResizeOptions::new().resize_alg(fr::ResizeAlg::Convolution(
            Self::to_fast_filter(filter),
        ));

        resizer
            .resize(&src_image, &mut dst_image, Some(&options))
            .map_err(|e| ImageError::Decode(format!("fast_image_resize 执行失败：{}", e)))?;

        let rgba = ImageBuffer::<Rgba<u8>, Vec<u8>>::from_raw(
            target_width,
            target_height,
            dst_image.into_vec(),
        )
        .ok_or_else(|| ImageError::Decode("fast_image_resize 输出缓冲长度异常".to_string()))?;

        Ok(DynamicImage::ImageRgba8(rgba))
    }

    fn to_fast_filter(filter: image::imageops::FilterType) -> fr::FilterType {
        match filter {
            image::imageops::FilterType::Nearest => fr::FilterType::Box,
            image::imageops::FilterType::Triangle => fr::FilterType::Bilinear,
            image::imageops::FilterType::CatmullRom => fr::FilterType::CatmullRom,
            image::imageops::FilterType::Gaussian => fr::FilterType::Mitchell,
            image::imageops::FilterType::Lanczos3 => fr::FilterType::Lanczos3,
        }
    }
}
