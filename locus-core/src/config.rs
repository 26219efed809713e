use crate::error::Error;
use crate::locale::Locale;
use crate::translator::PathTranslator;
use crate::yaml;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// 翻译表配置
///
/// ```yaml
/// default_locale: ${DEFAULT_LOCALE:en}
/// segments:
///   categories:
///     pt: categorias
///     nl: categorieen
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TranslatorConfig {
    /// 请求未携带语言信息时使用的语言
    pub default_locale: Locale,
    pub segments: BTreeMap<String, BTreeMap<Locale, String>>,
}

impl TranslatorConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        Ok(yaml::load_from_file(path)?)
    }

    pub fn from_yaml_str(yaml_content: &str) -> Result<Self, Error> {
        Ok(yaml::load_from_str(yaml_content)?)
    }

    /// 校验并构建翻译表
    pub fn build(&self) -> Result<PathTranslator, Error> {
        self.segments
            .iter()
            .fold(PathTranslator::builder(), |builder, (segment, slugs)| {
                builder.segment(segment.as_str(), slugs.iter().map(|(l, s)| (*l, s.as_str())))
            })
            .build()
    }
}

impl PathTranslator {
    pub fn from_config(config: &TranslatorConfig) -> Result<Self, Error> {
        config.build()
    }

    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        TranslatorConfig::from_file(path)?.build()
    }
}
