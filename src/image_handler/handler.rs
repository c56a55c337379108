//! # 规范化编排模块
//!
//! ## 设计思路
//!
//! `ImageNormalizer` 只负责“策略 + 流程编排”，具体像素操作交给 `ImageCodec`。
//! 处理链路固定为：
//! 1. 解码（非图片 → 解码类错误）
//! 2. 固定宽度、等比计算高度（四舍五入，半数进一），目标尺寸超限则拒绝
//! 3. 精确缩放
//! 4. 铺白底去除透明通道
//! 5. 固定质量有损编码
//!
//! ## 实现思路
//!
//! - 不做任何 I/O，不持有可变状态，可重入、可重复调用。
//! - 记录 `decode/resize/flatten/encode/total` 阶段耗时，便于性能诊断。
//! - `embed_reference` 提供“编码失败 → 原始字节内嵌”的文档化回退。

use std::time::Instant;

use super::codec::ImageCodec;
use super::pipeline::RasterCodec;
use super::source::{ImageAsset, ImageReference, ImageSource, RawImageData};
use super::{loader, normalized_height, ImageConfig, ImageError};

/// 图片规范化器。
pub struct ImageNormalizer<C: ImageCodec = RasterCodec> {
    codec: C,
    config: ImageConfig,
}

impl ImageNormalizer<RasterCodec> {
    /// 使用生产编解码器创建规范化器。
    ///
    /// # 示例
    /// ```rust,no_run
    /// use email_signature::image_handler::{ImageConfig, ImageNormalizer};
    ///
    /// let normalizer = ImageNormalizer::new(ImageConfig::default());
    /// let bytes = std::fs::read("avatar.png")?;
    /// let asset = normalizer.normalize(&bytes)?;
    /// assert_eq!(asset.width(), 400);
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn new(config: ImageConfig) -> Self {
        Self::with_codec(RasterCodec, config)
    }
}

impl<C: ImageCodec> ImageNormalizer<C> {
    /// 注入自定义编解码器（主要用于测试策略本身）。
    pub fn with_codec(codec: C, config: ImageConfig) -> Self {
        Self { codec, config }
    }

    pub fn config(&self) -> &ImageConfig {
        &self.config
    }

    /// 按来源加载并校验原始字节。
    pub fn load(&self, source: ImageSource) -> Result<RawImageData, ImageError> {
        loader::load_source(source, &self.config)
    }

    /// 将任意图片字节规范化为固定宽度、无透明通道的 JPEG 资产。
    pub fn normalize(&self, source_bytes: &[u8]) -> Result<ImageAsset, ImageError> {
        let config = &self.config;
        let total_start = Instant::now();

        let decode_start = Instant::now();
        let raster = self.codec.decode(source_bytes, config)?;
        let (source_width, source_height) = self.codec.dimensions(&raster);
        let decode_elapsed = decode_start.elapsed();

        let target_width = config.target_width;
        let target_height = normalized_height(source_width, source_height, target_width)
            .ok_or_else(|| {
                ImageError::Decode(format!(
                    "图片尺寸无效：{}x{}",
                    source_width, source_height
                ))
            })?;
        config.check_output_dimensions(target_width, target_height)?;

        let resize_start = Instant::now();
        let resized = self
            .codec
            .resize(raster, target_width, target_height, config)?;
        let resize_elapsed = resize_start.elapsed();

        let flatten_start = Instant::now();
        let flattened = self
            .codec
            .flatten_on_background(resized, config.background)?;
        let flatten_elapsed = flatten_start.elapsed();

        let encode_start = Instant::now();
        let encoded = self.codec.encode(&flattened, config.jpeg_quality)?;
        let encode_elapsed = encode_start.elapsed();

        log::info!(
            "✅ 图片规范化完成 - {}x{} -> {}x{} size={}KB decode={}ms resize={}ms flatten={}ms encode={}ms total={}ms",
            source_width,
            source_height,
            target_width,
            target_height,
            encoded.len() / 1024,
            decode_elapsed.as_millis(),
            resize_elapsed.as_millis(),
            flatten_elapsed.as_millis(),
            encode_elapsed.as_millis(),
            total_start.elapsed().as_millis()
        );

        Ok(ImageAsset::new(
            source_bytes.to_vec(),
            target_width,
            target_height,
            encoded,
            config.background,
        ))
    }

    /// 内嵌模式：规范化并生成 Data URI 引用。
    ///
    /// 编码失败时回退为原始字节内嵌（记录 warn 日志，不静默丢失）；
    /// 解码类错误原样返回，只能由用户重新选择文件。
    pub fn embed_reference(&self, raw: &RawImageData) -> Result<ImageReference, ImageError> {
        match self.normalize(&raw.bytes) {
            Ok(asset) => Ok(ImageReference::Embedded(asset.to_data_uri())),
            Err(ImageError::Encode(message)) => {
                log::warn!(
                    "⚠️ 图片重编码失败，回退为原始字节内嵌 - 来源: {} 原因: {}",
                    raw.source_hint,
                    message
                );
                Ok(ImageReference::raw_embedded(&raw.bytes))
            }
            Err(err) => Err(err),
        }
    }
}
