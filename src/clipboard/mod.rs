//! 剪贴板导出模块
//!
//! # 设计思路
//!
//! 目标邮件客户端只接受“从页面选区复制”的富文本，因此导出流程分为两层：
//! - **暂存**：`StagingDocument` + `StagingGuard`，负责离屏容器与选区的生命周期
//! - **写入**：`RichTextSink`，负责把 HTML 与纯文本备选写入系统剪贴板
//!
//! # 实现思路
//!
//! - `StagingGuard` 采用 RAII 模式：构造时挂载容器，`Drop` 时清除选区并卸载。
//! - 生产环境的 `ArboardSink` 通过 `arboard` 写入 HTML；Linux 上写入后持有选区直到被替换。
//! - 剪贴板被占用时在时间预算内指数退避重试，失败后提示用户手动复制。

mod error;
mod exporter;
mod staging;
mod writer;

pub use error::{ClipboardError, MANUAL_COPY_HINT};
pub use exporter::ClipboardExporter;
pub use staging::{StagingContainer, StagingDocument, StagingGuard, STAGING_STYLE};
pub use writer::{
    write_with_retry, ArboardSink, ClipboardConfig, FailureKind, RichTextSink, WriteFailure,
};
