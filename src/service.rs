//! # 服务层
//!
//! ## 设计思路
//!
//! `SignatureService` 对应一次编辑会话，持有会话内全部状态：
//! 配置、规范化器、上传客户端、上传令牌、当前头像引用、剪贴板导出器。
//! 调用方（CLI 或测试）只与这一个对象交互。
//!
//! ## 实现思路
//!
//! 对外仅暴露少量稳定 API：
//! - `prepare_image`：按部署模式内嵌或上传头像，只保留最新一次的结果
//! - `generate`：校验资料并构建签名文档
//! - `copy` / `copy_or_preview`：富文本复制，失败时可退回预览文件

use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

use crate::clipboard::{ArboardSink, ClipboardExporter, RichTextSink};
use crate::error::AppError;
use crate::image_handler::{
    ImageConfig, ImageDelivery, ImageError, ImageNormalizer, ImageReference, ImageSource,
};
use crate::settings::AppSettings;
use crate::signature::{ProfileDraft, RenderedDocument, SignatureDocumentBuilder, SignatureProfile};
use crate::storage;
use crate::upload::{AssetUploadClient, UploadSession, UploadState};

/// 复制结果。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CopyOutcome {
    /// 已写入系统剪贴板。
    Copied,
    /// 复制失败，已写出预览文件供手动复制。
    Preview { path: PathBuf, hint: &'static str },
}

pub struct SignatureService<S: RichTextSink = ArboardSink> {
    settings: AppSettings,
    normalizer: ImageNormalizer,
    builder: SignatureDocumentBuilder,
    uploader: AssetUploadClient,
    session: UploadSession,
    image: Mutex<Option<ImageReference>>,
    exporter: ClipboardExporter<S>,
}

impl SignatureService<ArboardSink> {
    /// 使用系统剪贴板创建服务。
    pub fn new(settings: AppSettings) -> Result<Self, AppError> {
        let exporter = ClipboardExporter::system(settings.clipboard.clone());
        Self::with_exporter(settings, exporter)
    }
}

impl<S: RichTextSink> SignatureService<S> {
    pub fn with_sink(settings: AppSettings, sink: S) -> Result<Self, AppError> {
        let exporter = ClipboardExporter::with_sink(sink, settings.clipboard.clone());
        Self::with_exporter(settings, exporter)
    }

    fn with_exporter(settings: AppSettings, exporter: ClipboardExporter<S>) -> Result<Self, AppError> {
        let uploader = AssetUploadClient::new(settings.upload.clone())?;
        Ok(Self {
            normalizer: ImageNormalizer::new(ImageConfig::default()),
            builder: SignatureDocumentBuilder::new(settings.branding.clone()),
            uploader,
            session: UploadSession::new(),
            image: Mutex::new(None),
            exporter,
            settings,
        })
    }

    pub fn settings(&self) -> &AppSettings {
        &self.settings
    }

    pub fn normalizer(&self) -> &ImageNormalizer {
        &self.normalizer
    }

    pub fn exporter(&self) -> &ClipboardExporter<S> {
        &self.exporter
    }

    pub fn upload_state(&self) -> UploadState {
        self.session.state()
    }

    /// 上传进行中时，上传入口应保持禁用。
    pub fn is_uploading(&self) -> bool {
        self.session.is_busy()
    }

    fn lock_image(&self) -> MutexGuard<'_, Option<ImageReference>> {
        match self.image.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub fn current_image(&self) -> Option<ImageReference> {
        self.lock_image().clone()
    }

    /// 加载并交付头像，替换之前的头像。
    ///
    /// 同时进行的多次调用中只有最后开始的一次会生效，其余返回 `AppError::Superseded`。
    pub async fn prepare_image(&self, source: ImageSource) -> Result<ImageReference, AppError> {
        let raw = self.normalizer.load(source)?;
        let ticket = self.session.begin();

        let result = match self.settings.delivery {
            ImageDelivery::Embed => self.normalizer.embed_reference(&raw).map_err(AppError::from),
            ImageDelivery::Upload => match self.normalizer.normalize(&raw.bytes) {
                Ok(asset) => self
                    .uploader
                    .upload_asset(&asset)
                    .await
                    .map(ImageReference::Remote)
                    .map_err(AppError::from),
                Err(ImageError::Encode(message)) => {
                    log::warn!("⚠️ 图片重编码失败，回退为原始字节内嵌，跳过上传 - 原因: {}", message);
                    Ok(ImageReference::raw_embedded(&raw.bytes))
                }
                Err(err) => Err(err.into()),
            },
        };

        let mut slot = self.lock_image();
        let outcome = result.as_ref().map(|reference| reference.src().to_string());
        if !self.session.finish(ticket, &outcome) {
            return Err(AppError::Superseded);
        }

        let reference = result?;
        log::info!(
            "🖼️ 头像已就绪（{}{}）",
            self.settings.delivery.as_str(),
            if reference.is_fallback() { "，原始字节回退" } else { "" }
        );
        *slot = Some(reference.clone());
        Ok(reference)
    }

    /// 直接使用已有的公开地址作为头像。
    pub fn use_remote_image(&self, url: &str) {
        let ticket = self.session.begin();
        let mut slot = self.lock_image();
        if self.session.finish(ticket, &Ok::<_, AppError>(url.to_string())) {
            *slot = Some(ImageReference::Remote(url.to_string()));
        }
    }

    /// 校验资料并构建签名文档。
    pub fn generate(&self, draft: &ProfileDraft) -> Result<RenderedDocument, AppError> {
        let profile = SignatureProfile::from_draft(draft).map_err(AppError::IncompleteProfile)?;

        let image = self.current_image().ok_or_else(|| {
            if self.session.is_busy() {
                AppError::ImageNotReady("上传仍在进行中".to_string())
            } else {
                AppError::ImageNotReady("请先选择头像图片".to_string())
            }
        })?;

        let document = self.builder.build(&profile, &image);
        log::info!("✅ 签名已生成 - {}", profile.display_name());
        Ok(document)
    }

    /// 富文本复制。
    pub fn copy(&mut self, document: &RenderedDocument) -> Result<(), AppError> {
        self.exporter.copy_to_clipboard(document)?;
        Ok(())
    }

    /// 复制失败时写出预览文件，而不是直接报错。
    pub fn copy_or_preview(&mut self, document: &RenderedDocument) -> Result<CopyOutcome, AppError> {
        match self.exporter.copy_to_clipboard(document) {
            Ok(()) => Ok(CopyOutcome::Copied),
            Err(err) => {
                log::warn!("📋 [{}] {}", err.code(), err);
                let dir = storage::get_preview_dir(self.settings.preview_dir().as_deref())?;
                let path = storage::write_preview(&dir, &document.to_html())?;
                Ok(CopyOutcome::Preview {
                    path,
                    hint: err.manual_copy_hint(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clipboard::WriteFailure;
    use crate::signature::SectionKind;
    use image::{ImageFormat, Rgba, RgbaImage};
    use std::io::Cursor;

    #[derive(Default)]
    struct RecordingSink {
        html: Vec<String>,
    }

    impl RichTextSink for RecordingSink {
        fn write_html(&mut self, html: &str, _alt_text: &str) -> Result<(), WriteFailure> {
            self.html.push(html.to_string());
            Ok(())
        }
    }

    struct DenyingSink;

    impl RichTextSink for DenyingSink {
        fn write_html(&mut self, _html: &str, _alt_text: &str) -> Result<(), WriteFailure> {
            Err(WriteFailure::fatal("denied"))
        }
    }

    fn png(width: u32, height: u32) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, Rgba([10, 20, 30, 255]));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).expect("encode png");
        out.into_inner()
    }

    fn draft() -> ProfileDraft {
        ProfileDraft {
            name: "Legislative Department".into(),
            email: "a@b.org".into(),
            phone: "+63 997 850 9514".into(),
            ..Default::default()
        }
    }

    fn quiet_settings() -> AppSettings {
        let mut settings = AppSettings::default();
        settings.clipboard.retries = 1;
        settings
    }

    #[tokio::test]
    async fn embed_mode_produces_data_uri() {
        let service = SignatureService::with_sink(quiet_settings(), RecordingSink::default())
            .expect("service");

        let reference = service
            .prepare_image(ImageSource::Bytes(png(800, 600)))
            .await
            .expect("image prepared");

        assert!(matches!(reference, ImageReference::Embedded(_)));
        assert!(reference.src().starts_with("data:image/jpeg;base64,"));
        assert!(matches!(service.upload_state(), UploadState::Ready(_)));
    }

    #[test]
    fn generate_without_image_is_not_ready() {
        let service = SignatureService::with_sink(quiet_settings(), RecordingSink::default())
            .expect("service");
        let err = service.generate(&draft()).unwrap_err();
        assert_eq!(err.code(), "E_IMAGE_NOT_READY");
    }

    #[test]
    fn generate_with_incomplete_profile_lists_fields() {
        let service = SignatureService::with_sink(quiet_settings(), RecordingSink::default())
            .expect("service");
        service.use_remote_image("https://res.example.com/a.jpg");

        let err = service.generate(&ProfileDraft::default()).unwrap_err();
        assert!(matches!(err, AppError::IncompleteProfile(ref f) if f.len() == 3));
    }

    #[tokio::test]
    async fn undecodable_upload_is_rejected_and_keeps_previous_image() {
        let service = SignatureService::with_sink(quiet_settings(), RecordingSink::default())
            .expect("service");
        service.use_remote_image("https://res.example.com/old.jpg");

        let err = service
            .prepare_image(ImageSource::Bytes(b"definitely not an image".to_vec()))
            .await
            .unwrap_err();

        assert_eq!(err.code(), "E_INVALID_FORMAT");
        assert_eq!(
            service.current_image(),
            Some(ImageReference::Remote("https://res.example.com/old.jpg".into()))
        );
    }

    #[test]
    fn copy_sends_generated_markup() {
        let mut service = SignatureService::with_sink(quiet_settings(), RecordingSink::default())
            .expect("service");
        service.use_remote_image("https://res.example.com/a.jpg");

        let doc = service.generate(&draft()).expect("generated");
        assert_eq!(doc.count_sections(SectionKind::SocialRow), 0);
        service.copy(&doc).expect("copied");

        assert_eq!(service.exporter().sink().html, vec![doc.to_html()]);
        assert!(service.exporter().staging().is_clean());
    }

    #[test]
    fn denied_copy_falls_back_to_preview_file() {
        let dir = std::env::temp_dir().join(format!("email-signature-svc-{}", std::process::id()));
        let settings = AppSettings {
            preview_dir: Some(dir.to_string_lossy().to_string()),
            ..quiet_settings()
        };
        let mut service = SignatureService::with_sink(settings, DenyingSink).expect("service");
        service.use_remote_image("https://res.example.com/a.jpg");
        let doc = service.generate(&draft()).expect("generated");

        match service.copy_or_preview(&doc).expect("preview written") {
            CopyOutcome::Preview { path, hint } => {
                assert!(path.starts_with(&dir));
                assert_eq!(hint, crate::clipboard::MANUAL_COPY_HINT);
                let content = std::fs::read_to_string(&path).expect("readable");
                assert!(content.contains(&doc.to_html()));
            }
            CopyOutcome::Copied => panic!("copy should have been denied"),
        }

        let _ = std::fs::remove_dir_all(dir);
    }
}
