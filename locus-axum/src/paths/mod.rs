pub mod middleware;

use locus_core::{Error, Locale, PathTranslator, TranslatorConfig};
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use serde::Deserialize;
use std::sync::Arc;

/// 路径段中需要转义的字符（含 `/` 与 `%`，非 ASCII 字符总会被转义）
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

pub(crate) fn encode_segment(segment: &str) -> String {
    utf8_percent_encode(segment, SEGMENT).to_string()
}

pub use middleware::{CURRENT_LOCALE, RequestLocale, current_locale, localize_paths};

/// 多语言路径中间件的共享状态
#[derive(Debug, Clone)]
pub struct LocalizedPaths {
    translator: Arc<PathTranslator>,
    default_locale: Locale,
    /// 是否识别并剥离 `/pt/...` 形式的语言前缀
    locale_prefix: bool,
}

impl LocalizedPaths {
    pub fn new(translator: impl Into<Arc<PathTranslator>>) -> Self {
        Self {
            translator: translator.into(),
            default_locale: Locale::default(),
            locale_prefix: true,
        }
    }

    pub fn from_config(config: &TranslatorConfig) -> Result<Self, Error> {
        Ok(Self::new(config.build()?).default_locale(config.default_locale))
    }

    pub fn default_locale(mut self, locale: Locale) -> Self {
        self.default_locale = locale;
        self
    }

    pub fn locale_prefix(mut self, enable: bool) -> Self {
        self.locale_prefix = enable;
        self
    }

    pub fn translator(&self) -> &PathTranslator {
        &self.translator
    }

    /// 生成指定语言下的对外链接，各段按 URI 规则转义
    ///
    /// `canonical_path` 为未转义的规范路径：`href(Pt, "/catalog")` -> `/pt/cat%C3%A1logo`。
    /// 启用前缀时默认语言同样带前缀，否则无前缀链接会按 `Accept-Language` 解析成别的语言。
    pub fn href(&self, locale: Locale, canonical_path: &str) -> String {
        let localized = self
            .translator
            .translate_path(canonical_path, locale)
            .split('/')
            .map(encode_segment)
            .collect::<Vec<_>>()
            .join("/");
        if !self.locale_prefix {
            return localized;
        }

        let localized = localized.trim_start_matches('/');
        if localized.is_empty() {
            format!("/{}", locale)
        } else {
            format!("/{}/{}", locale, localized)
        }
    }
}

/// `WebServer` 的监听配置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub addr: String,
    pub locale_prefix: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: "0.0.0.0:8080".to_string(),
            locale_prefix: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_href() {
        let paths = LocalizedPaths::new(PathTranslator::builtin());
        assert_eq!(paths.href(Locale::En, "/categories/7"), "/en/categories/7");
        assert_eq!(paths.href(Locale::Pt, "/categories/7"), "/pt/categorias/7");
        assert_eq!(paths.href(Locale::Nl, "/businesses/"), "/nl/bedrijven/");
        assert_eq!(paths.href(Locale::Nl, "/"), "/nl");

        let paths = paths.default_locale(Locale::Pt).locale_prefix(true);
        assert_eq!(paths.href(Locale::Pt, "/categories"), "/pt/categorias");
        assert_eq!(paths.href(Locale::En, "/categories"), "/en/categories");

        let paths = paths.locale_prefix(false);
        assert_eq!(paths.href(Locale::Nl, "/categories"), "/categorieen");
    }

    #[test]
    fn test_href_encodes_segments() {
        let translator = PathTranslator::builder()
            .segment("catalog", [(Locale::Pt, "catálogo"), (Locale::Nl, "catalogus")])
            .build()
            .unwrap();
        let paths = LocalizedPaths::new(translator);
        assert_eq!(paths.href(Locale::Pt, "/catalog"), "/pt/cat%C3%A1logo");
        assert_eq!(paths.href(Locale::Nl, "/catalog/a b"), "/nl/catalogus/a%20b");
        assert_eq!(encode_segment("50%"), "50%25");
    }

    #[test]
    fn test_from_config() {
        let config = TranslatorConfig::from_yaml_str(
            "default_locale: nl\nsegments:\n  categories:\n    nl: categorieen\n",
        )
        .unwrap();
        let paths = LocalizedPaths::from_config(&config).unwrap();
        assert_eq!(paths.href(Locale::Nl, "/categories"), "/nl/categorieen");
        assert_eq!(paths.translator().len(), 1);
    }
}
