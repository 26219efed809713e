//! 路径段翻译：规范（英文）路径段 <-> 各语言 slug
//!
//! 翻译表只在构建时校验一次，之后只读，可以放在 `Arc` 中被多个线程共享。
//! 所有查询都是全函数：无法识别的输入原样返回。

use crate::error::Error;
use crate::locale::Locale;
use log::trace;
use std::collections::{BTreeMap, HashMap};

/// 内置的路径翻译表
pub const DEFAULT_TABLE: &[(&str, &[(Locale, &str)])] = &[
    (
        "categories",
        &[(Locale::Pt, "categorias"), (Locale::Nl, "categorieen")],
    ),
    (
        "businesses",
        &[(Locale::Pt, "empresas"), (Locale::Nl, "bedrijven")],
    ),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTranslator {
    /// 规范段 -> (语言 -> slug)，不含 `en`
    forward: HashMap<String, HashMap<Locale, String>>,
    /// slug -> 规范段，规范段自身也在其中
    reverse: HashMap<String, String>,
}

impl PathTranslator {
    pub fn builder() -> PathTranslatorBuilder {
        PathTranslatorBuilder::default()
    }

    /// 使用 [`DEFAULT_TABLE`] 构建
    pub fn builtin() -> Self {
        Self::from_static_unchecked(DEFAULT_TABLE)
    }

    /// 从静态表构建并校验
    pub fn from_static(table: &[(&str, &[(Locale, &str)])]) -> Result<Self, Error> {
        table
            .iter()
            .fold(Self::builder(), |builder, (segment, slugs)| {
                builder.segment(*segment, slugs.iter().copied())
            })
            .build()
    }

    /// 跳过校验直接建表，供 `path_table!` 展开使用（校验已在编译期完成）
    #[doc(hidden)]
    pub fn from_static_unchecked(table: &[(&str, &[(Locale, &str)])]) -> Self {
        let mut forward = HashMap::with_capacity(table.len());
        let mut reverse = HashMap::new();

        for (segment, slugs) in table {
            reverse.insert(segment.to_string(), segment.to_string());
            let localized = forward
                .entry(segment.to_string())
                .or_insert_with(HashMap::new);
            for (locale, slug) in slugs.iter().filter(|(l, _)| !l.is_canonical()) {
                localized.insert(*locale, slug.to_string());
                reverse.insert(slug.to_string(), segment.to_string());
            }
        }

        Self { forward, reverse }
    }

    /// 将规范段翻译为指定语言的 slug
    ///
    /// 段未知、或请求 `en` 时原样返回 `segment`。
    pub fn translate<'a>(&'a self, segment: &'a str, locale: Locale) -> &'a str {
        if locale.is_canonical() {
            return segment;
        }

        match self.forward.get(segment).and_then(|m| m.get(&locale)) {
            Some(slug) => slug.as_str(),
            None => {
                trace!("No {} slug for segment `{}`", locale, segment);
                segment
            }
        }
    }

    /// 同 [`translate`](Self::translate)，但语言以原始标签给出（如 `"pt-BR"`）
    ///
    /// 无法识别的语言标签按恒等映射处理。
    pub fn translate_tag<'a>(&'a self, segment: &'a str, tag: &str) -> &'a str {
        match Locale::from_tag(tag) {
            Some(locale) => self.translate(segment, locale),
            None => {
                trace!("Unknown locale tag `{}`", tag);
                segment
            }
        }
    }

    /// 将任意语言的 slug 还原为规范段，未知 slug 原样返回
    pub fn reverse_translate<'a>(&'a self, slug: &'a str) -> &'a str {
        match self.reverse.get(slug) {
            Some(segment) => segment.as_str(),
            None => {
                trace!("Unknown slug `{}`", slug);
                slug
            }
        }
    }

    /// 逐段翻译整个路径，保留首尾斜杠与空段
    pub fn translate_path(&self, path: &str, locale: Locale) -> String {
        map_segments(path, |s, out| out.push_str(self.translate(s, locale)))
    }

    /// 逐段还原整个路径
    pub fn reverse_translate_path(&self, path: &str) -> String {
        map_segments(path, |s, out| out.push_str(self.reverse_translate(s)))
    }

    pub fn contains_segment(&self, segment: &str) -> bool {
        self.forward.contains_key(segment)
    }

    pub fn contains_slug(&self, slug: &str) -> bool {
        self.reverse.contains_key(slug)
    }

    /// 推断 slug 所属的非规范语言
    ///
    /// 只有当 slug 恰好属于一个语言、且不是规范（英文）形式时返回该语言；
    /// 多个语言共用同一 slug 时无法判断，返回 `None`。
    pub fn slug_locale(&self, slug: &str) -> Option<Locale> {
        let segment = self.reverse.get(slug)?;
        let mut matched = Locale::ALL
            .into_iter()
            .filter(|l| self.translate(segment, *l) == slug);
        match (matched.next(), matched.next()) {
            (Some(locale), None) if !locale.is_canonical() => Some(locale),
            _ => None,
        }
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.forward.keys().map(String::as_str)
    }

    /// 表中出现过的语言，总是包含 `en`
    pub fn locales(&self) -> Vec<Locale> {
        Locale::ALL
            .into_iter()
            .filter(|l| l.is_canonical() || self.forward.values().any(|m| m.contains_key(l)))
            .collect()
    }

    /// 规范段数量
    pub fn len(&self) -> usize {
        self.forward.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }
}

impl Default for PathTranslator {
    fn default() -> Self {
        Self::builtin()
    }
}

fn map_segments<F>(path: &str, f: F) -> String
where
    F: Fn(&str, &mut String),
{
    let mut out = String::with_capacity(path.len());
    for (i, segment) in path.split('/').enumerate() {
        if i > 0 {
            out.push('/');
        }
        if !segment.is_empty() {
            f(segment, &mut out);
        }
    }
    out
}

/// 翻译表构建器
///
/// 同一规范段多次调用 [`segment`](Self::segment) 时合并，后写入的 slug 覆盖先前的。
#[derive(Debug, Default, Clone)]
pub struct PathTranslatorBuilder {
    rows: BTreeMap<String, BTreeMap<Locale, String>>,
}

impl PathTranslatorBuilder {
    pub fn segment<S, I, V>(mut self, segment: S, slugs: I) -> Self
    where
        S: Into<String>,
        I: IntoIterator<Item = (Locale, V)>,
        V: Into<String>,
    {
        let row = self.rows.entry(segment.into()).or_default();
        for (locale, slug) in slugs {
            row.insert(locale, slug.into());
        }
        self
    }

    /// 校验并生成只读翻译表
    pub fn build(self) -> Result<PathTranslator, Error> {
        let mut forward = HashMap::with_capacity(self.rows.len());
        let mut reverse: HashMap<String, String> = HashMap::new();

        for segment in self.rows.keys() {
            check_segment(segment)?;
            claim(&mut reverse, segment, segment)?;
        }

        for (segment, slugs) in self.rows {
            let mut localized = HashMap::with_capacity(slugs.len());
            for (locale, slug) in slugs {
                if slug.is_empty() {
                    return Err(Error::EmptySlug { segment, locale });
                }
                check_segment(&slug)?;
                if locale.is_canonical() {
                    if slug != segment {
                        return Err(Error::CanonicalMismatch { segment, slug });
                    }
                    continue;
                }
                claim(&mut reverse, &slug, &segment)?;
                localized.insert(locale, slug);
            }
            forward.insert(segment, localized);
        }

        Ok(PathTranslator { forward, reverse })
    }
}

fn check_segment(value: &str) -> Result<(), Error> {
    if value.is_empty() {
        return Err(Error::EmptySegment);
    }
    if value.contains('/') {
        return Err(Error::InvalidSlug {
            value: value.to_string(),
        });
    }
    // 与语言码相同的段会被当作 `/pt/...` 前缀吞掉
    if Locale::ALL.iter().any(|l| l.as_str() == value) {
        return Err(Error::ReservedSlug {
            value: value.to_string(),
        });
    }
    Ok(())
}

/// 在反向表中登记 slug；同一 slug 指向不同规范段即为歧义
fn claim(reverse: &mut HashMap<String, String>, slug: &str, segment: &str) -> Result<(), Error> {
    if let Some(existing) = reverse.get(slug) {
        if existing != segment {
            return Err(Error::AmbiguousSlug {
                slug: slug.to_string(),
                first: existing.clone(),
                second: segment.to_string(),
            });
        }
        return Ok(());
    }
    reverse.insert(slug.to_string(), segment.to_string());
    Ok(())
}
