//! YAML 配置加载器，支持 `${VAR}` / `${VAR:default}` 环境变量替换

use dotenvy::dotenv;
use regex::{Captures, Regex};
use serde::de::DeserializeOwned;
use std::env;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;
use thiserror::Error;

/// YAML 加载器错误
#[derive(Debug, Error)]
pub enum YamlLoaderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),
}

fn var_regex() -> &'static Regex {
    static VAR_REGEX: OnceLock<Regex> = OnceLock::new();
    VAR_REGEX.get_or_init(|| {
        Regex::new(r"\$\{([A-Z0-9_]+)(?::([^\}]*))?\}").expect("Invalid regex pattern")
    })
}

/// 替换占位符；变量不存在且没有默认值时替换为空串
fn replace_vars(yaml_content: &str) -> String {
    // 生产环境可能没有 .env 文件
    let _ = dotenv();

    var_regex()
        .replace_all(yaml_content, |caps: &Captures<'_>| {
            env::var(&caps[1])
                .ok()
                .or_else(|| caps.get(2).map(|m| m.as_str().to_string()))
                .unwrap_or_default()
        })
        .into_owned()
}

/// 从文件加载 YAML 配置
pub fn load_from_file<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<T, YamlLoaderError> {
    let content = fs::read_to_string(path)?;
    load_from_str(&content)
}

/// 从字符串加载 YAML 配置
pub fn load_from_str<T: DeserializeOwned>(yaml_content: &str) -> Result<T, YamlLoaderError> {
    Ok(serde_yaml::from_str(&replace_vars(yaml_content))?)
}

/// 编译时嵌入 YAML 文件
#[macro_export]
macro_rules! include_yaml {
    ($path:expr, $t:ty) => {
        $crate::yaml::load_from_str::<$t>(include_str!($path))
    };
}
