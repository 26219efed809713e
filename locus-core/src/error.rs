use crate::locale::Locale;
use crate::yaml::YamlLoaderError;
use thiserror::Error;

/// 构建翻译表时的错误
///
/// 查询操作本身永远不会失败，只有建表与加载配置会返回该错误。
#[derive(Debug, Error)]
pub enum Error {
    #[error("canonical segment must not be empty")]
    EmptySegment,
    #[error("empty slug for segment `{segment}` in locale `{locale}`")]
    EmptySlug { segment: String, locale: Locale },
    #[error("`{value}` is not a single path segment")]
    InvalidSlug { value: String },
    #[error("`{value}` is a locale code and would be read as a locale prefix")]
    ReservedSlug { value: String },
    #[error("`en` slug `{slug}` must equal its canonical segment `{segment}`")]
    CanonicalMismatch { segment: String, slug: String },
    #[error("slug `{slug}` is claimed by both `{first}` and `{second}`")]
    AmbiguousSlug {
        slug: String,
        first: String,
        second: String,
    },
    #[error("config error: {0}")]
    Config(#[from] YamlLoaderError),
}
