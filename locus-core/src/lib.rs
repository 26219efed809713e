pub mod config;
pub mod error;
pub mod locale;
pub mod translator;
pub mod yaml;

pub use config::TranslatorConfig;
pub use error::Error;
pub use locale::{Locale, UnknownLocale};
pub use translator::{DEFAULT_TABLE, PathTranslator, PathTranslatorBuilder};
