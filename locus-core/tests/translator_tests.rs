use locus_core::{Locale, PathTranslator, TranslatorConfig};
use std::path::PathBuf;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

#[test]
fn yaml_table_matches_builtin_for_shared_segments() {
    let translator = PathTranslator::from_yaml_file(fixture("paths.yaml")).unwrap();
    let builtin = PathTranslator::builtin();

    for segment in builtin.segments() {
        for locale in Locale::ALL {
            assert_eq!(
                translator.translate(segment, locale),
                builtin.translate(segment, locale)
            );
        }
    }

    assert_eq!(translator.len(), 3);
    assert_eq!(translator.translate("about", Locale::Pt), "sobre");
    assert_eq!(translator.reverse_translate("over-ons"), "about");
}

#[test]
fn yaml_default_locale_uses_env_default() {
    let config = TranslatorConfig::from_file(fixture("paths.yaml")).unwrap();
    assert_eq!(config.default_locale, Locale::Nl);
}

#[test]
fn every_slug_round_trips() {
    let translator = PathTranslator::from_yaml_file(fixture("paths.yaml")).unwrap();
    let segments: Vec<String> = translator.segments().map(str::to_string).collect();

    for segment in &segments {
        for locale in Locale::ALL {
            let slug = translator.translate(segment, locale);
            assert!(!slug.is_empty());
            assert_eq!(translator.reverse_translate(slug), segment);
        }
    }
}

#[test]
fn slugs_are_unique_across_segments() {
    let translator = PathTranslator::from_yaml_file(fixture("paths.yaml")).unwrap();
    let segments: Vec<&str> = translator.segments().collect();

    for (i, a) in segments.iter().enumerate() {
        for b in segments.iter().skip(i + 1) {
            for la in Locale::ALL {
                for lb in Locale::ALL {
                    assert_ne!(translator.translate(a, la), translator.translate(b, lb));
                }
            }
        }
    }
}

#[test]
fn localized_paths_round_trip() {
    let translator = PathTranslator::builtin();
    let canonical = "/categories/7/businesses?sort=name";

    let (path, query) = canonical.split_once('?').unwrap();
    let localized = translator.translate_path(path, Locale::Pt);
    assert_eq!(localized, "/categorias/7/empresas");
    assert_eq!(
        format!("{}?{}", translator.reverse_translate_path(&localized), query),
        canonical
    );
}
