use locus_core::{Locale, PathTranslator};
use proc_macro::TokenStream;
use proc_macro2::Span;
use quote::quote;
use std::collections::BTreeMap;
use syn::{LitStr, parse_macro_input};

type Rows = Vec<(String, Vec<(Locale, String)>)>;

/// 在编译期读取并校验 TOML 路径翻译表，展开为 `locus_core::PathTranslator` 表达式
///
/// ```toml
/// [categories]
/// pt = "categorias"
/// nl = "categorieen"
/// ```
///
/// 路径相对于调用方的 `CARGO_MANIFEST_DIR`。未知语言、空 slug、歧义 slug 都会报编译错误。
#[proc_macro]
pub fn path_table(input: TokenStream) -> TokenStream {
    let lit = parse_macro_input!(input as LitStr);
    let manifest_dir = match std::env::var("CARGO_MANIFEST_DIR") {
        Ok(dir) => dir,
        Err(e) => return compile_error(lit.span(), format!("CARGO_MANIFEST_DIR: {}", e)),
    };

    let path = std::path::Path::new(&manifest_dir).join(lit.value());
    let content = match std::fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) => {
            return compile_error(lit.span(), format!("Read error for {}: {}", path.display(), e));
        }
    };

    let rows = match parse_rows(&content) {
        Ok(rows) => rows,
        Err(msg) => return compile_error(lit.span(), format!("{}: {}", path.display(), msg)),
    };

    // 强制编译器监视文件，修改 TOML 后会重新展开
    let abs_path = path.canonicalize().unwrap_or(path);
    let abs_path_str = abs_path.to_string_lossy().into_owned();

    let row_tokens = rows.iter().map(|(segment, slugs)| {
        let slug_tokens = slugs.iter().map(|(locale, slug)| {
            let variant = syn::Ident::new(variant_name(*locale), Span::call_site());
            quote! { (::locus_core::Locale::#variant, #slug) }
        });
        quote! {
            (#segment, &[ #(#slug_tokens),* ] as &[(::locus_core::Locale, &str)])
        }
    });

    quote! {
        {
            const _: &[u8] = include_bytes!(#abs_path_str);
            ::locus_core::PathTranslator::from_static_unchecked(&[ #(#row_tokens),* ])
        }
    }
    .into()
}

fn compile_error(span: Span, msg: String) -> TokenStream {
    syn::Error::new(span, msg).to_compile_error().into()
}

fn variant_name(locale: Locale) -> &'static str {
    match locale {
        Locale::En => "En",
        Locale::Pt => "Pt",
        Locale::Nl => "Nl",
    }
}

/// 解析 `[segment] locale = "slug"` 形式的表并做与运行期相同的校验
fn parse_rows(content: &str) -> Result<Rows, String> {
    let table: BTreeMap<String, BTreeMap<String, String>> =
        toml::from_str(content).map_err(|e| format!("TOML error: {}", e))?;

    let mut rows = Vec::with_capacity(table.len());
    for (segment, slugs) in table {
        let mut localized = Vec::with_capacity(slugs.len());
        for (code, slug) in slugs {
            let locale = Locale::ALL
                .into_iter()
                .find(|l| l.as_str() == code)
                .ok_or_else(|| format!("unsupported locale `{}` in [{}]", code, segment))?;
            localized.push((locale, slug));
        }
        rows.push((segment, localized));
    }

    rows.iter()
        .fold(PathTranslator::builder(), |builder, (segment, slugs)| {
            builder.segment(segment.as_str(), slugs.iter().map(|(l, s)| (*l, s.as_str())))
        })
        .build()
        .map_err(|e| e.to_string())?;

    Ok(rows)
}
