use super::{LocalizedPaths, encode_segment};
use axum::extract::{Request, State};
use axum::http::HeaderMap;
use axum::http::uri::{PathAndQuery, Uri};
use axum::middleware::Next;
use axum::response::Response;
use locus_core::{Locale, PathTranslator};
use percent_encoding::percent_decode_str;
use tokio::task_local;

task_local! {
    pub static CURRENT_LOCALE: Locale;
}

/// 当前请求的语言，也会作为 request extension 注入，可用 `Extension<RequestLocale>` 提取
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestLocale(pub Locale);

/// 在中间件作用域外调用时返回 `None`
pub fn current_locale() -> Option<Locale> {
    CURRENT_LOCALE.try_with(|l| *l).ok()
}

/// 识别请求语言，并把本地化路径改写为规范路径后交给内层路由
///
/// `/pt/categorias/7?x=1` -> `/categories/7?x=1`，语言为 `pt`。
/// 语言优先级：路径前缀 > 路径中本地化 slug 所属语言 > `Accept-Language` > 默认语言。
pub async fn localize_paths(
    State(paths): State<LocalizedPaths>,
    mut req: Request,
    next: Next,
) -> Response {
    let path = req.uri().path().to_string();

    let (prefix_locale, rest) = if paths.locale_prefix {
        split_locale_prefix(&path)
    } else {
        (None, path.as_str())
    };

    let (canonical, slug_locale) = canonicalize(&paths.translator, rest);

    let locale = prefix_locale
        .or(slug_locale)
        .or_else(|| resolve_language(req.headers()))
        .unwrap_or(paths.default_locale);

    if canonical != path {
        log::debug!("Rewrote {} -> {} ({})", path, canonical, locale);
        rewrite_path(&mut req, &canonical);
    }

    req.extensions_mut().insert(RequestLocale(locale));
    CURRENT_LOCALE.scope(locale, next.run(req)).await
}

/// 逐段解码后还原为规范段，并返回第一个能判断语言的本地化 slug 的语言
///
/// 未命中的段保持原始（已转义）形式。
fn canonicalize(translator: &PathTranslator, raw: &str) -> (String, Option<Locale>) {
    let mut inferred = None;
    let canonical = raw
        .split('/')
        .map(|segment| {
            let decoded = percent_decode_str(segment).decode_utf8_lossy();
            if !translator.contains_slug(&decoded) {
                return segment.to_string();
            }
            if inferred.is_none() {
                inferred = translator.slug_locale(&decoded);
            }
            encode_segment(translator.reverse_translate(&decoded))
        })
        .collect::<Vec<_>>()
        .join("/");
    (canonical, inferred)
}

/// 拆出首段语言前缀：`/nl/bedrijven` -> (`Nl`, `/bedrijven`)，`/nl` -> (`Nl`, `/`)
fn split_locale_prefix(path: &str) -> (Option<Locale>, &str) {
    let trimmed = path.strip_prefix('/').unwrap_or(path);
    let (first, rest) = match trimmed.find('/') {
        Some(i) => (&trimmed[..i], &trimmed[i..]),
        None => (trimmed, "/"),
    };

    // 只接受精确的小写语言码，避免 `en-route` 之类的 slug 被误判
    match Locale::ALL.into_iter().find(|l| l.as_str() == first) {
        Some(locale) => (Some(locale), rest),
        None => (None, path),
    }
}

fn rewrite_path(req: &mut Request, path: &str) {
    let path_and_query = match req.uri().query() {
        Some(query) => format!("{}?{}", path, query),
        None => path.to_string(),
    };

    let mut parts = req.uri().clone().into_parts();
    parts.path_and_query = match PathAndQuery::try_from(path_and_query) {
        Ok(pq) => Some(pq),
        Err(e) => {
            log::warn!("Invalid rewritten path {}: {}", path, e);
            return;
        }
    };

    match Uri::from_parts(parts) {
        Ok(uri) => *req.uri_mut() = uri,
        Err(e) => log::warn!("Invalid rewritten uri for {}: {}", path, e),
    }
}

/// 按 q 值降序选择第一个受支持的语言
fn resolve_language(headers: &HeaderMap) -> Option<Locale> {
    let header = headers
        .get("accept-language")
        .and_then(|v| v.to_str().ok())?;

    // "pt-BR,pt;q=0.9,en;q=0.8" -> [(1.0, "pt-BR"), (0.9, "pt"), (0.8, "en")]
    let mut langs: Vec<(f32, &str)> = header
        .split(',')
        .filter_map(|part| {
            let mut sections = part.split(';');
            let lang = sections.next()?.trim();
            if lang.is_empty() {
                return None;
            }
            let q_value = sections
                .next()
                .and_then(|q| q.trim().strip_prefix("q="))
                .and_then(|v| v.parse::<f32>().ok())
                .unwrap_or(1.0);
            Some((q_value, lang))
        })
        .filter(|(q, _)| *q > 0.0)
        .collect();

    // 稳定排序，同权重保持原顺序
    langs.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

    langs.into_iter().find_map(|(_, lang)| Locale::from_tag(lang))
}
