use std::io::Cursor;

use email_signature::image_handler::{normalized_height, ImageConfig, ImageNormalizer};
use image::{ImageFormat, Rgba, RgbaImage};
use proptest::prelude::*;

fn png(img: &RgbaImage) -> Vec<u8> {
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png).expect("encode png");
    out.into_inner()
}

fn reference_height(width: u32, height: u32) -> u32 {
    ((400.0 * height as f64 / width as f64) + 0.5).floor().max(1.0) as u32
}

#[test]
fn fully_transparent_source_becomes_white() {
    let source = RgbaImage::from_pixel(50, 50, Rgba([0, 0, 0, 0]));
    let asset = ImageNormalizer::new(ImageConfig::default())
        .normalize(&png(&source))
        .expect("normalized");

    let decoded = image::load_from_memory(asset.encoded_bytes())
        .expect("jpeg decodes")
        .to_rgb8();
    assert!(decoded.pixels().all(|p| p.0.iter().all(|&c| c >= 245)));
}

#[test]
fn tall_thin_source_keeps_minimum_height() {
    let source = RgbaImage::from_pixel(1000, 1, Rgba([0, 0, 255, 255]));
    let asset = ImageNormalizer::new(ImageConfig::default())
        .normalize(&png(&source))
        .expect("normalized");
    assert_eq!((asset.width(), asset.height()), (400, 1));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn height_rounds_half_up(width in 1u32..=4000, height in 1u32..=4000) {
        prop_assert_eq!(normalized_height(width, height, 400), Some(reference_height(width, height)));
    }

    #[test]
    fn output_geometry_matches_policy(
        width in 8u32..=64,
        height in 1u32..=64,
        alpha in any::<u8>(),
        shade in any::<u8>(),
    ) {
        let source = RgbaImage::from_pixel(width, height, Rgba([shade, shade / 2, 255 - shade, alpha]));
        let asset = ImageNormalizer::new(ImageConfig::default())
            .normalize(&png(&source))
            .expect("normalized");

        prop_assert_eq!(asset.width(), 400);
        prop_assert_eq!(asset.height(), reference_height(width, height));
        prop_assert_eq!(asset.mime_type(), "image/jpeg");

        let decoded = image::load_from_memory(asset.encoded_bytes()).expect("jpeg decodes");
        prop_assert!(!decoded.color().has_alpha());
    }

    #[test]
    fn normalization_is_deterministic(width in 8u32..=48, height in 8u32..=48, seed in any::<u8>()) {
        let source = RgbaImage::from_fn(width, height, |x, y| {
            Rgba([(x as u8).wrapping_mul(seed), (y as u8).wrapping_add(seed), seed, ((x + y) % 256) as u8])
        });
        let bytes = png(&source);
        let normalizer = ImageNormalizer::new(ImageConfig::default());

        let first = normalizer.normalize(&bytes).expect("normalized");
        let second = normalizer.normalize(&bytes).expect("normalized");
        prop_assert_eq!(first.encoded_bytes(), second.encoded_bytes());
    }
}
