//! # 图像编解码能力接口
//!
//! ## 设计思路
//!
//! 缩放、铺底、重编码属于“能力”，而“固定宽度 / 白底 / 固定质量”属于“策略”。
//! 将能力隔离在 `ImageCodec` 之后，策略（见 `handler.rs`）即可脱离具体图像库单独测试。
//!
//! 生产实现为 `pipeline.rs` 中的 `RasterCodec`（`image` + `fast_image_resize`）。

use super::{ImageConfig, ImageError};

/// 图像编解码能力。
pub trait ImageCodec {
    /// 编解码器内部使用的位图类型。
    type Raster;

    /// 将任意格式字节解码为位图，非图片输入返回解码类错误。
    fn decode(&self, bytes: &[u8], config: &ImageConfig) -> Result<Self::Raster, ImageError>;

    /// 位图宽高。
    fn dimensions(&self, raster: &Self::Raster) -> (u32, u32);

    /// 精确缩放到 `width x height`。
    fn resize(
        &self,
        raster: Self::Raster,
        width: u32,
        height: u32,
        config: &ImageConfig,
    ) -> Result<Self::Raster, ImageError>;

    /// 铺设不透明背景，输出不再携带 alpha 通道。
    fn flatten_on_background(
        &self,
        raster: Self::Raster,
        background: [u8; 3],
    ) -> Result<Self::Raster, ImageError>;

    /// 以指定质量进行有损编码。
    fn encode(&self, raster: &Self::Raster, quality: u8) -> Result<Vec<u8>, ImageError>;
}
