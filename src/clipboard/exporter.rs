//! # 签名导出
//!
//! ## 实现思路
//!
//! 1. 序列化文档为 HTML，同时生成纯文本备选
//! 2. 挂载离屏暂存容器并选中全部内容
//! 3. 对选区执行富文本复制（含有限重试）
//! 4. 无论成功失败，守卫离开作用域时清除选区并卸载容器

use super::error::ClipboardError;
use super::staging::{StagingDocument, StagingGuard};
use super::writer::{write_with_retry, ArboardSink, ClipboardConfig, RichTextSink};
use crate::signature::RenderedDocument;

/// 剪贴板导出器。
pub struct ClipboardExporter<S: RichTextSink = ArboardSink> {
    sink: S,
    config: ClipboardConfig,
    staging: StagingDocument,
}

impl ClipboardExporter<ArboardSink> {
    /// 使用系统剪贴板。
    pub fn system(config: ClipboardConfig) -> Self {
        Self::with_sink(ArboardSink::new(&config), config)
    }
}

impl<S: RichTextSink> ClipboardExporter<S> {
    pub fn with_sink(sink: S, config: ClipboardConfig) -> Self {
        Self {
            sink,
            config,
            staging: StagingDocument::new(),
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn staging(&self) -> &StagingDocument {
        &self.staging
    }

    /// 将签名以富文本形式写入剪贴板。
    pub fn copy_to_clipboard(&mut self, document: &RenderedDocument) -> Result<(), ClipboardError> {
        let html = document.to_html();
        let alt_text = document.to_plain_text();
        log::debug!("📋 准备复制签名（HTML {} 字节）", html.len());

        let mut guard = StagingGuard::attach(&mut self.staging, &html);
        if !guard.select_contents() {
            return Err(ClipboardError::Staging(format!("容器 #{} 未挂载", guard.id())));
        }

        let selected = guard
            .selected_markup()
            .ok_or_else(|| ClipboardError::Staging("选区为空".to_string()))?;

        write_with_retry(&mut self.sink, selected, &alt_text, &self.config)
    }
}
