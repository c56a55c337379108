//! # 签名资料模型
//!
//! ## 设计思路
//!
//! 编辑侧只维护一个可变的 `ProfileDraft`，核心只接收不可变的 `SignatureProfile`。
//! “必填 / 可选”约束在构造 `SignatureProfile` 时一次性校验，而不是散落在各调用点。
//!
//! 缺少必填项不是异常：`missing_fields` 返回缺失清单，调用方据此保持“生成”按钮禁用。

use serde::{Deserialize, Serialize};

/// 默认保密声明。
pub const DEFAULT_DISCLAIMER: &str = "CONFIDENTIALITY NOTICE: This email and any attachments are confidential and intended solely for the use of the individual or entity to whom they are addressed. If you are not the intended recipient, please notify the sender immediately and delete this email. Any unauthorized review, use, disclosure, or distribution is prohibited.";

/// 品牌色（固定调色板，不接受任意颜色）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum BrandColor {
    #[default]
    Blue,
    Green,
    Brown,
}

impl BrandColor {
    pub const ALL: [BrandColor; 3] = [BrandColor::Blue, BrandColor::Green, BrandColor::Brown];

    pub fn hex(self) -> &'static str {
        match self {
            Self::Blue => "#387ff1",
            Self::Green => "#49dd83",
            Self::Brown => "#b9847c",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Blue => "Blue",
            Self::Green => "Green",
            Self::Brown => "Brown",
        }
    }

    /// 按色板名称或十六进制值解析（不区分大小写）。
    ///
    /// # 示例
    /// ```rust
    /// use email_signature::signature::BrandColor;
    ///
    /// assert_eq!(BrandColor::parse("green"), Some(BrandColor::Green));
    /// assert_eq!(BrandColor::parse("#B9847C"), Some(BrandColor::Brown));
    /// assert_eq!(BrandColor::parse("#ff0000"), None);
    /// ```
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::ALL.into_iter().find(|color| {
            color.name().eq_ignore_ascii_case(value) || color.hex().eq_ignore_ascii_case(value)
        })
    }
}

impl TryFrom<String> for BrandColor {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value).ok_or_else(|| {
            format!("未知品牌色：{}（可选：Blue / Green / Brown）", value)
        })
    }
}

impl From<BrandColor> for String {
    fn from(color: BrandColor) -> Self {
        color.name().to_string()
    }
}

/// 必填字段。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequiredField {
    DisplayName,
    EmailAddress,
    PhoneNumber,
}

impl RequiredField {
    pub fn label(self) -> &'static str {
        match self {
            Self::DisplayName => "name",
            Self::EmailAddress => "email",
            Self::PhoneNumber => "phone",
        }
    }
}

/// 编辑中的资料（可变、可不完整）。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileDraft {
    pub name: String,
    pub location: String,
    pub email: String,
    pub phone: String,
    pub social: String,
    pub brand_color: BrandColor,
    pub disclaimer: String,
}

impl Default for ProfileDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            location: String::new(),
            email: String::new(),
            phone: String::new(),
            social: String::new(),
            brand_color: BrandColor::default(),
            disclaimer: DEFAULT_DISCLAIMER.to_string(),
        }
    }
}

impl ProfileDraft {
    /// 尚未满足的必填项；为空表示可以生成。
    pub fn missing_fields(&self) -> Vec<RequiredField> {
        let mut missing = Vec::new();
        if self.name.trim().is_empty() {
            missing.push(RequiredField::DisplayName);
        }
        if !self.email.contains('@') || self.email.trim().is_empty() {
            missing.push(RequiredField::EmailAddress);
        }
        if self.phone.trim().is_empty() {
            missing.push(RequiredField::PhoneNumber);
        }
        missing
    }

    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }
}

/// 经过校验的签名资料，构造后只读。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureProfile {
    display_name: String,
    location_label: Option<String>,
    email_address: String,
    phone_number: String,
    social_handle: Option<String>,
    brand_color: BrandColor,
    disclaimer_text: String,
}

impl SignatureProfile {
    /// 从草稿构造；缺少必填项时返回缺失清单。
    pub fn from_draft(draft: &ProfileDraft) -> Result<Self, Vec<RequiredField>> {
        let missing = draft.missing_fields();
        if !missing.is_empty() {
            return Err(missing);
        }

        let disclaimer_text = if draft.disclaimer.trim().is_empty() {
            DEFAULT_DISCLAIMER.to_string()
        } else {
            draft.disclaimer.clone()
        };

        Ok(Self {
            display_name: draft.name.trim().to_string(),
            location_label: non_empty(&draft.location),
            email_address: draft.email.trim().to_string(),
            phone_number: draft.phone.trim().to_string(),
            social_handle: non_empty(&draft.social),
            brand_color: draft.brand_color,
            disclaimer_text,
        })
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn location_label(&self) -> Option<&str> {
        self.location_label.as_deref()
    }

    pub fn email_address(&self) -> &str {
        &self.email_address
    }

    pub fn phone_number(&self) -> &str {
        &self.phone_number
    }

    pub fn social_handle(&self) -> Option<&str> {
        self.social_handle.as_deref()
    }

    pub fn brand_color(&self) -> BrandColor {
        self.brand_color
    }

    pub fn disclaimer_text(&self) -> &str {
        &self.disclaimer_text
    }
}

/// 可选字段只要非空就保留原文，空白字符串同样会渲染。
fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}
