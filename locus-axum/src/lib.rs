pub mod paths;
pub use paths::{LocalizedPaths, RequestLocale, ServerConfig, current_locale};

pub mod server;
pub use server::WebServer;

pub use locus_core::{Locale, PathTranslator};
