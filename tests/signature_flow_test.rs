use std::io::Cursor;

use email_signature::clipboard::{RichTextSink, WriteFailure};
use email_signature::image_handler::{ImageConfig, ImageNormalizer, ImageReference, ImageSource};
use email_signature::settings::AppSettings;
use email_signature::service::SignatureService;
use email_signature::signature::{BrandColor, ProfileDraft, SectionKind};
use image::{ColorType, ImageFormat, Rgba, RgbaImage};

#[derive(Default)]
struct RecordingSink {
    payloads: Vec<(String, String)>,
}

impl RichTextSink for RecordingSink {
    fn write_html(&mut self, html: &str, alt_text: &str) -> Result<(), WriteFailure> {
        self.payloads.push((html.to_string(), alt_text.to_string()));
        Ok(())
    }
}

fn opaque_png(width: u32, height: u32) -> Vec<u8> {
    let img = RgbaImage::from_fn(width, height, |x, y| {
        Rgba([(x % 256) as u8, (y % 256) as u8, 128, 255])
    });
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png).expect("encode png");
    out.into_inner()
}

fn legislative_draft() -> ProfileDraft {
    ProfileDraft {
        name: "Legislative Department".into(),
        email: "a@b.org".into(),
        phone: "+63 997 850 9514".into(),
        brand_color: BrandColor::Blue,
        ..Default::default()
    }
}

#[test]
fn landscape_image_normalizes_to_400_by_300_opaque() {
    let normalizer = ImageNormalizer::new(ImageConfig::default());
    let asset = normalizer.normalize(&opaque_png(800, 600)).expect("normalized");

    assert_eq!((asset.width(), asset.height()), (400, 300));

    let decoded = image::load_from_memory(asset.encoded_bytes()).expect("jpeg decodes");
    assert_eq!((decoded.width(), decoded.height()), (400, 300));
    assert_eq!(decoded.color(), ColorType::Rgb8);
    assert!(!decoded.color().has_alpha());
}

#[tokio::test]
async fn end_to_end_generate_and_copy() {
    let mut settings = AppSettings::default();
    settings.clipboard.retries = 1;
    let mut service =
        SignatureService::with_sink(settings, RecordingSink::default()).expect("service builds");

    let reference = service
        .prepare_image(ImageSource::Bytes(opaque_png(800, 600)))
        .await
        .expect("image prepared");
    assert!(matches!(reference, ImageReference::Embedded(_)));

    let document = service.generate(&legislative_draft()).expect("document built");

    assert_eq!(document.count_sections(SectionKind::DisplayName), 1);
    assert_eq!(document.count_sections(SectionKind::EmailRow), 1);
    assert_eq!(document.count_sections(SectionKind::PhoneRow), 1);
    assert_eq!(document.count_sections(SectionKind::Location), 0);
    assert_eq!(document.count_sections(SectionKind::SocialRow), 0);

    service.copy(&document).expect("copy succeeds");

    let (html, alt_text) = &service.exporter().sink().payloads[0];
    assert!(html.contains(r#"href="mailto:a@b.org""#));
    assert!(html.contains(r#"href="tel:+639978509514""#));
    assert!(html.contains(reference.src()));
    assert!(alt_text.contains("Legislative Department"));
    assert!(service.exporter().staging().is_clean());
}

#[test]
fn generated_markup_is_free_of_shared_styles() {
    let service = SignatureService::with_sink(AppSettings::default(), RecordingSink::default())
        .expect("service builds");
    service.use_remote_image("https://res.example.com/avatar.jpg");

    let draft = ProfileDraft {
        location: "Santa Cruz, Davao del Sur".into(),
        social: "https://fb.com/example".into(),
        ..legislative_draft()
    };
    let html = service.generate(&draft).expect("document built").to_html();

    assert!(!html.contains("class="));
    assert!(!html.contains("<style"));
    assert!(html.contains(r#"href="https://fb.com/example""#));
    assert!(html.contains("Santa Cruz, Davao del Sur"));
    assert!(html.contains("#387ff1"));
}

#[test]
fn script_in_name_is_rendered_inert() {
    let service = SignatureService::with_sink(AppSettings::default(), RecordingSink::default())
        .expect("service builds");
    service.use_remote_image("https://res.example.com/avatar.jpg");

    let draft = ProfileDraft {
        name: "<script>alert(1)</script>".into(),
        ..legislative_draft()
    };
    let html = service.generate(&draft).expect("document built").to_html();

    assert!(!html.contains("<script>"));
    assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
}
