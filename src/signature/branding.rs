//! 机构品牌素材（图标、横幅）地址。
//!
//! 默认值指向现有部署中已托管的公开图片；可在配置文件中整体或逐项覆盖。

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrandingAssets {
    pub email_icon_url: String,
    pub phone_icon_url: String,
    pub social_icon_url: String,
    pub banner_url: String,
    pub banner_alt: String,
}

impl Default for BrandingAssets {
    fn default() -> Self {
        Self {
            email_icon_url: "https://res.cloudinary.com/duybphdbl/image/upload/v1759619667/email-blue_rk0zdk.png".to_string(),
            phone_icon_url: "https://res.cloudinary.com/duybphdbl/image/upload/v1759619668/phone-blue_qpok67.png".to_string(),
            social_icon_url: "https://res.cloudinary.com/duybphdbl/image/upload/v1759619668/facebook-blue_ijfdsg.png".to_string(),
            banner_url: "https://res.cloudinary.com/duybphdbl/image/upload/v1759618075/fb-cover-WITH-SB-LOGO-Left-Right-wrapped_sqkpxb.png".to_string(),
            banner_alt: "VMO Logo".to_string(),
        }
    }
}
