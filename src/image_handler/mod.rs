//! # 图片规范化模块（image_handler）
//!
//! ## 设计思路
//!
//! 该模块将“来源加载 → 解码校验 → 固定宽度缩放 → 白底铺平 → JPEG 重编码”
//! 按职责拆分为多个子模块，避免单文件膨胀与耦合。
//!
//! - `loader`：负责文件 / 内存字节加载与签名校验
//! - `codec`：`ImageCodec` 能力接口（decode / resize / flatten / encode）
//! - `pipeline`：`RasterCodec`，基于 `image` + `fast_image_resize` 的生产实现
//! - `handler`：`ImageNormalizer`，编排整条流水线并承载策略
//! - `config/error/source`：配置、错误、中间数据模型
//!
//! ## 新同事快速上手
//!
//! ```text
//! ImageSource
//!    ↓
//! loader.rs（体积限制 + 文件签名校验）
//!    ↓
//! handler.rs（固定宽度 400 / 白底 / 质量 85 + 阶段耗时日志）
//!    └─ codec.rs → pipeline.rs（实际像素操作）
//!    ↓
//! ImageAsset ──→ Data URI（内嵌） 或 upload 模块（上传）
//! ```
//!
//! 输出对同一输入逐字节一致；高度按“四舍五入（半数进一）”计算，见 [`normalized_height`]。

mod codec;
mod config;
mod error;
mod handler;
mod loader;
mod pipeline;
mod source;

pub use codec::ImageCodec;
pub use config::{normalized_height, ImageConfig, JPEG_QUALITY, TARGET_WIDTH, WHITE};
pub use error::ImageError;
pub use handler::ImageNormalizer;
pub use pipeline::RasterCodec;
pub use source::{ImageAsset, ImageDelivery, ImageReference, ImageSource, RawImageData, NORMALIZED_MIME};
