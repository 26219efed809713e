use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 支持的语言集合（封闭集合，不支持运行时注册）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    /// 规范语言，规范路径段即英文 slug
    #[default]
    En,
    Pt,
    Nl,
}

impl Locale {
    pub const ALL: [Locale; 3] = [Locale::En, Locale::Pt, Locale::Nl];

    pub fn as_str(&self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Pt => "pt",
            Locale::Nl => "nl",
        }
    }

    pub fn is_canonical(&self) -> bool {
        matches!(self, Locale::En)
    }

    /// 解析语言标签，忽略大小写与地区子标签
    ///
    /// `"pt-BR"`、`"PT"`、`"pt_PT"` 都解析为 [`Locale::Pt`]，无法识别时返回 `None`。
    pub fn from_tag(tag: &str) -> Option<Self> {
        let primary = tag.trim().split(['-', '_']).next()?;
        match primary.to_ascii_lowercase().as_str() {
            "en" => Some(Locale::En),
            "pt" => Some(Locale::Pt),
            "nl" => Some(Locale::Nl),
            _ => None,
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported locale: {0}")]
pub struct UnknownLocale(pub String);

impl FromStr for Locale {
    type Err = UnknownLocale;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Locale::from_tag(s).ok_or_else(|| UnknownLocale(s.to_string()))
    }
}
