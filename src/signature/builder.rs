//! # 签名文档构建器
//!
//! ## 设计思路
//!
//! 以“表格优先”的布局生成 Gmail 可存活的签名：
//!
//! ```text
//! div（字体 / 颜色 / 行高）
//! ├─ table  ProfileTable
//! │   └─ tr
//! │      ├─ td  头像（130x130 固定尺寸）
//! │      └─ td  姓名 → [地址] → 品牌色分隔线 → 联系方式表格
//! │                                           ├─ 邮箱行（mailto:）
//! │                                           ├─ 电话行（tel:，去除空白）
//! │                                           └─ [社交链接行]（https://）
//! └─ table  Disclaimer
//!     ├─ 机构横幅
//!     └─ 声明文本（原样转义）
//! ```
//!
//! 方括号内为可选区块：源字段为空时该节点**不存在**于树中，而不是隐藏。
//!
//! ## 实现思路
//!
//! `build` 是纯函数：不读时钟、不做 I/O、不依赖随机数，相同输入得到相等的树。

use once_cell::sync::Lazy;
use regex::Regex;

use super::branding::BrandingAssets;
use super::document::{Element, InlineStyle, RenderedDocument, SectionKind};
use super::profile::SignatureProfile;
use crate::image_handler::ImageReference;

const FONT_FAMILY: &str = "Arial, Helvetica, sans-serif";
const TEXT_COLOR: &str = "#333333";
const MUTED_COLOR: &str = "#666666";
const CONTACT_COLOR: &str = "#555555";
const DISCLAIMER_COLOR: &str = "#888888";
const LAYOUT_WIDTH: u32 = 600;
const PROFILE_IMAGE_SIZE: u32 = 130;
const ICON_SIZE: u32 = 14;
const DIVIDER_WIDTH: u32 = 120;
const BANNER_WIDTH: u32 = 500;

/// 已有的协议前缀（不区分大小写）。
static PROTOCOL_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^https?://").expect("协议前缀正则无效"));

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("空白正则无效"));

/// 社交链接：去掉已有协议前缀后统一补 `https://`。
///
/// # 示例
/// ```rust
/// use email_signature::signature::social_link_url;
///
/// assert_eq!(social_link_url("fb.com/example"), "https://fb.com/example");
/// assert_eq!(social_link_url("http://fb.com/example"), "https://fb.com/example");
/// ```
pub fn social_link_url(handle: &str) -> String {
    format!("https://{}", PROTOCOL_PREFIX.replace(handle.trim(), ""))
}

/// 拨号链接：去除号码中的全部空白。
///
/// # 示例
/// ```rust
/// use email_signature::signature::dial_link;
///
/// assert_eq!(dial_link("+63 997 850 9514"), "tel:+639978509514");
/// ```
pub fn dial_link(phone: &str) -> String {
    format!("tel:{}", WHITESPACE.replace_all(phone, ""))
}

/// 签名文档构建器。
#[derive(Debug, Clone, Default)]
pub struct SignatureDocumentBuilder {
    branding: BrandingAssets,
}

impl SignatureDocumentBuilder {
    pub fn new(branding: BrandingAssets) -> Self {
        Self { branding }
    }

    pub fn branding(&self) -> &BrandingAssets {
        &self.branding
    }

    /// 由资料与图片引用构建完整签名文档。
    pub fn build(&self, profile: &SignatureProfile, image: &ImageReference) -> RenderedDocument {
        let root = Element::new("div")
            .style(
                InlineStyle::new()
                    .set("font-family", FONT_FAMILY)
                    .set("color", TEXT_COLOR)
                    .set("line-height", "1.2")
                    .set("font-size", "14px")
                    .set("display", "block"),
            )
            .child(self.profile_table(profile, image))
            .child(self.disclaimer_block(profile));

        RenderedDocument::new(root)
    }

    fn profile_table(&self, profile: &SignatureProfile, image: &ImageReference) -> Element {
        let row = Element::new("tr")
            .child(Self::image_cell(image))
            .child(self.details_cell(profile));

        layout_table(LAYOUT_WIDTH)
            .section(SectionKind::ProfileTable)
            .child(Element::new("tbody").child(row))
    }

    fn image_cell(image: &ImageReference) -> Element {
        let size = PROFILE_IMAGE_SIZE.to_string();
        let img = Element::new("img")
            .attr("src", image.src())
            .attr("alt", "Profile")
            .attr("width", size.clone())
            .attr("height", size)
            .style(
                InlineStyle::new()
                    .set("display", "block")
                    .set("width", format!("{}px", PROFILE_IMAGE_SIZE))
                    .set("height", format!("{}px", PROFILE_IMAGE_SIZE))
                    .set("line-height", "1")
                    .set("border", "0")
                    .set("outline", "none")
                    .set("text-decoration", "none")
                    .set("object-fit", "cover")
                    .set("border-radius", "0"),
            )
            .section(SectionKind::ProfileImage);

        Element::new("td")
            .attr("width", (PROFILE_IMAGE_SIZE + 10).to_string())
            .attr("valign", "top")
            .style(
                InlineStyle::new()
                    .set("padding", "8px 12px 8px 0")
                    .set("vertical-align", "top"),
            )
            .child(img)
    }

    fn details_cell(&self, profile: &SignatureProfile) -> Element {
        let brand = profile.brand_color().hex();

        let name = Element::new("div")
            .style(InlineStyle::new().set("display", "block").set("margin-bottom", "6px"))
            .child(
                Element::new("span")
                    .style(
                        InlineStyle::new()
                            .set("font-size", "16px")
                            .set("font-weight", "700")
                            .set("line-height", "1.15")
                            .set("color", brand)
                            .set("font-family", FONT_FAMILY)
                            .set("display", "inline-block"),
                    )
                    .section(SectionKind::DisplayName)
                    .text(profile.display_name()),
            );

        let location = profile.location_label().map(|label| {
            Element::new("div")
                .style(
                    InlineStyle::new()
                        .set("font-size", "12px")
                        .set("color", MUTED_COLOR)
                        .set("font-weight", "600")
                        .set("margin-bottom", "8px")
                        .set("font-family", FONT_FAMILY),
                )
                .section(SectionKind::Location)
                .text(label)
        });

        let divider = Element::new("div")
            .style(
                InlineStyle::new()
                    .set("margin", "6px 0 10px 0")
                    .set("width", format!("{}px", DIVIDER_WIDTH))
                    .set("max-width", "100%")
                    .set("height", "0")
                    .set("border-top", format!("3px solid {}", brand))
                    .set("font-size", "0")
                    .set("line-height", "0"),
            )
            .section(SectionKind::Divider);

        let email_row = self.contact_row(
            SectionKind::EmailRow,
            &self.branding.email_icon_url,
            "Email",
            format!("mailto:{}", profile.email_address()),
            profile.email_address(),
            false,
        );

        let phone_row = self.contact_row(
            SectionKind::PhoneRow,
            &self.branding.phone_icon_url,
            "Phone",
            dial_link(profile.phone_number()),
            profile.phone_number(),
            false,
        );

        let social_row = profile.social_handle().map(|handle| {
            let url = social_link_url(handle);
            self.contact_row(
                SectionKind::SocialRow,
                &self.branding.social_icon_url,
                "Facebook",
                url.clone(),
                &url,
                true,
            )
        });

        let contacts = Element::new("table")
            .attr("cellpadding", "0")
            .attr("cellspacing", "0")
            .attr("border", "0")
            .style(InlineStyle::new().set("border-collapse", "collapse").set("width", "100%"))
            .child(
                Element::new("tbody")
                    .child(email_row)
                    .child(phone_row)
                    .maybe_child(social_row),
            );

        Element::new("td")
            .attr("valign", "top")
            .style(
                InlineStyle::new()
                    .set("padding", "12px 0 8px 6px")
                    .set("vertical-align", "top"),
            )
            .child(name)
            .maybe_child(location)
            .child(divider)
            .child(contacts)
    }

    fn contact_row(
        &self,
        section: SectionKind,
        icon_url: &str,
        icon_alt: &str,
        href: String,
        label: &str,
        external: bool,
    ) -> Element {
        let icon = Element::new("img")
            .attr("src", icon_url)
            .attr("alt", icon_alt)
            .attr("width", ICON_SIZE.to_string())
            .attr("height", ICON_SIZE.to_string())
            .style(
                InlineStyle::new()
                    .set("display", "inline-block")
                    .set("vertical-align", "middle")
                    .set("border", "0")
                    .set("margin-right", "8px"),
            );

        let mut link = Element::new("a").attr("href", href);
        if external {
            link = link
                .attr("target", "_blank")
                .attr("rel", "noopener noreferrer");
        }
        let link = link
            .style(
                InlineStyle::new()
                    .set("color", CONTACT_COLOR)
                    .set("text-decoration", "none")
                    .set("font-size", "13px")
                    .set("font-family", FONT_FAMILY)
                    .set("vertical-align", "middle"),
            )
            .text(label);

        Element::new("tr").section(section).child(
            Element::new("td")
                .style(
                    InlineStyle::new()
                        .set("vertical-align", "middle")
                        .set("padding", "3px 0"),
                )
                .child(icon)
                .child(link),
        )
    }

    fn disclaimer_block(&self, profile: &SignatureProfile) -> Element {
        let banner = Element::new("tr").child(
            Element::new("td")
                .style(InlineStyle::new().set("padding", "8px 0 0 0"))
                .child(
                    Element::new("img")
                        .attr("src", self.branding.banner_url.as_str())
                        .attr("alt", self.branding.banner_alt.as_str())
                        .attr("width", BANNER_WIDTH.to_string())
                        .style(
                            InlineStyle::new()
                                .set("display", "block")
                                .set("max-width", "100%")
                                .set("height", "auto")
                                .set("border", "0"),
                        )
                        .section(SectionKind::Banner),
                ),
        );

        let text = Element::new("tr").child(
            Element::new("td")
                .style(InlineStyle::new().set("padding-top", "8px"))
                .child(
                    Element::new("div")
                        .style(
                            InlineStyle::new()
                                .set("font-size", "11px")
                                .set("color", DISCLAIMER_COLOR)
                                .set("line-height", "1.25")
                                .set("font-family", FONT_FAMILY)
                                .set("max-width", format!("{}px", BANNER_WIDTH)),
                        )
                        .section(SectionKind::DisclaimerText)
                        .text(profile.disclaimer_text()),
                ),
        );

        layout_table(LAYOUT_WIDTH)
            .style(
                InlineStyle::new()
                    .set("max-width", format!("{}px", LAYOUT_WIDTH))
                    .set("width", "100%")
                    .set("border-collapse", "collapse")
                    .set("margin-top", "12px"),
            )
            .section(SectionKind::Disclaimer)
            .child(Element::new("tbody").child(banner).child(text))
    }
}

fn layout_table(width: u32) -> Element {
    Element::new("table")
        .attr("cellpadding", "0")
        .attr("cellspacing", "0")
        .attr("border", "0")
        .attr("width", width.to_string())
        .style(
            InlineStyle::new()
                .set("max-width", format!("{}px", width))
                .set("width", "100%")
                .set("border-collapse", "collapse"),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signature::{BrandColor, ProfileDraft};

    fn profile(location: &str, social: &str) -> SignatureProfile {
        SignatureProfile::from_draft(&ProfileDraft {
            name: "Legislative Department".into(),
            location: location.into(),
            email: "a@b.org".into(),
            phone: "+63 997 850 9514".into(),
            social: social.into(),
            brand_color: BrandColor::Green,
            ..Default::default()
        })
        .expect("profile should be complete")
    }

    fn image() -> ImageReference {
        ImageReference::Remote("https://res.example.com/avatar.jpg".into())
    }

    #[test]
    fn build_is_pure() {
        let builder = SignatureDocumentBuilder::default();
        let p = profile("Santa Cruz", "fb.com/x");

        let first = builder.build(&p, &image());
        let second = builder.build(&p, &image());

        assert_eq!(first, second);
        assert_eq!(first.to_html(), second.to_html());
    }

    #[test]
    fn empty_location_has_no_location_node() {
        let doc = SignatureDocumentBuilder::default().build(&profile("", ""), &image());
        assert_eq!(doc.count_sections(SectionKind::Location), 0);
        assert_eq!(doc.count_sections(SectionKind::SocialRow), 0);
    }

    #[test]
    fn whitespace_location_still_renders_a_line() {
        let doc = SignatureDocumentBuilder::default().build(&profile("   ", ""), &image());
        assert_eq!(doc.count_sections(SectionKind::Location), 1);
    }

    #[test]
    fn location_is_escaped_exactly_once() {
        let doc = SignatureDocumentBuilder::default().build(&profile("<Davao & Sur>", ""), &image());

        assert_eq!(doc.count_sections(SectionKind::Location), 1);
        let location = doc.section(SectionKind::Location).expect("location present");
        assert_eq!(location.text_content(), "<Davao & Sur>");
        assert!(doc.to_html().contains("&lt;Davao &amp; Sur&gt;"));
    }

    #[test]
    fn social_link_is_normalized_to_https() {
        let doc = SignatureDocumentBuilder::default().build(&profile("", "fb.com/example"), &image());

        let row = doc.section(SectionKind::SocialRow).expect("social row present");
        let link = row
            .descendants()
            .into_iter()
            .find(|e| e.tag() == "a")
            .expect("social link");
        assert_eq!(link.attribute("href"), Some("https://fb.com/example"));
        assert_eq!(link.attribute("rel"), Some("noopener noreferrer"));
    }

    #[test]
    fn social_prefix_stripping_is_case_insensitive() {
        assert_eq!(social_link_url("HTTPS://fb.com/x"), "https://fb.com/x");
        assert_eq!(social_link_url("  fb.com/x "), "https://fb.com/x");
    }

    #[test]
    fn contact_links_use_mailto_and_stripped_tel() {
        let doc = SignatureDocumentBuilder::default().build(&profile("", ""), &image());
        let html = doc.to_html();

        assert!(html.contains("href=\"mailto:a@b.org\""));
        assert!(html.contains("href=\"tel:+639978509514\""));
        assert!(html.contains(">+63 997 850 9514</a>"));
    }

    #[test]
    fn name_and_divider_use_brand_color() {
        let doc = SignatureDocumentBuilder::default().build(&profile("", ""), &image());

        let name = doc.section(SectionKind::DisplayName).expect("name present");
        assert_eq!(name.inline_style().get("color"), Some("#49dd83"));
        assert_eq!(name.inline_style().get("font-weight"), Some("700"));

        let divider = doc.section(SectionKind::Divider).expect("divider present");
        assert_eq!(divider.inline_style().get("border-top"), Some("3px solid #49dd83"));
        assert_eq!(divider.inline_style().get("width"), Some("120px"));
    }

    #[test]
    fn output_has_no_shared_style_definitions() {
        let doc = SignatureDocumentBuilder::default().build(&profile("X", "fb.com/x"), &image());
        let html = doc.to_html();

        assert!(!html.contains("class="));
        assert!(!html.contains("<style"));
        assert!(!html.contains("<link"));
    }

    #[test]
    fn right_column_keeps_fixed_order() {
        let doc = SignatureDocumentBuilder::default().build(&profile("Here", "fb.com/x"), &image());
        let order: Vec<SectionKind> = doc
            .root()
            .descendants()
            .into_iter()
            .filter_map(|e| e.section_kind())
            .collect();

        assert_eq!(
            order,
            vec![
                SectionKind::ProfileTable,
                SectionKind::ProfileImage,
                SectionKind::DisplayName,
                SectionKind::Location,
                SectionKind::Divider,
                SectionKind::EmailRow,
                SectionKind::PhoneRow,
                SectionKind::SocialRow,
                SectionKind::Disclaimer,
                SectionKind::Banner,
                SectionKind::DisclaimerText,
            ]
        );
    }

    #[test]
    fn disclaimer_text_is_verbatim_but_escaped() {
        let draft = ProfileDraft {
            name: "N".into(),
            email: "a@b.org".into(),
            phone: "1".into(),
            disclaimer: "Do not <forward>.".into(),
            ..Default::default()
        };
        let p = SignatureProfile::from_draft(&draft).expect("complete");
        let doc = SignatureDocumentBuilder::default().build(&p, &image());

        let text = doc.section(SectionKind::DisclaimerText).expect("disclaimer present");
        assert_eq!(text.text_content(), "Do not <forward>.");
        assert!(doc.to_html().contains("Do not &lt;forward&gt;."));
    }

    #[test]
    fn image_cell_uses_reference_src() {
        let doc = SignatureDocumentBuilder::default().build(&profile("", ""), &image());
        let img = doc.section(SectionKind::ProfileImage).expect("image present");

        assert_eq!(img.attribute("src"), Some("https://res.example.com/avatar.jpg"));
        assert_eq!(img.attribute("width"), Some("130"));
        assert_eq!(img.attribute("height"), Some("130"));
    }
}
