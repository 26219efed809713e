use log::{error, info};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter, Layer, Registry,
    fmt::{self, time::ChronoLocal},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

const DEFAULT_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";
const DEFAULT_LOG_DIR: &str = "./logs";
const DEFAULT_FILE_PREFIX: &str = "locus.log";
const DEFAULT_LEVEL: &str = "info";
const DEFAULT_CLEANUP_INTERVAL_SECS: u64 = 3600;

/// 日志配置
///
/// 既可以通过构建器方法设置，也可以作为应用 YAML 配置的一部分反序列化：
///
/// ```yaml
/// logger:
///   level: info,locus_axum=debug
///   log_dir: ./logs
///   max_files: 7
/// ```
///
/// `level` 使用 `EnvFilter` 指令语法；设置了 `RUST_LOG` 时以环境变量为准。
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    /// 日志文件前缀 (实际文件名带日期后缀，如 locus.log.2024-05-01)
    file_prefix: String,
    log_dir: PathBuf,
    /// chrono 格式
    time_format: String,
    level: String,
    console: bool,
    file: bool,
    /// 保留的最大日志文件数量，`None` 表示不清理
    max_files: Option<usize>,
    cleanup_interval_secs: u64,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            file_prefix: DEFAULT_FILE_PREFIX.to_string(),
            log_dir: PathBuf::from(DEFAULT_LOG_DIR),
            time_format: DEFAULT_TIME_FORMAT.to_string(),
            level: DEFAULT_LEVEL.to_string(),
            console: true,
            file: true,
            max_files: None,
            cleanup_interval_secs: DEFAULT_CLEANUP_INTERVAL_SECS,
        }
    }
}

impl LoggerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn file_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.file_prefix = prefix.into();
        self
    }

    pub fn log_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.log_dir = dir.into();
        self
    }

    pub fn time_format(mut self, format: impl Into<String>) -> Self {
        self.time_format = format.into();
        self
    }

    /// 设置过滤指令，如 `"debug"` 或 `"info,locus_core=trace"`
    pub fn level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    pub fn enable_console(mut self, enable: bool) -> Self {
        self.console = enable;
        self
    }

    pub fn enable_file(mut self, enable: bool) -> Self {
        self.file = enable;
        self
    }

    pub fn max_files(mut self, count: usize) -> Self {
        self.max_files = Some(count);
        self
    }

    pub fn cleanup_interval(mut self, interval: Duration) -> Self {
        self.cleanup_interval_secs = interval.as_secs().max(1);
        self
    }

    /// 注册全局 subscriber，`log` 宏的记录也会被转发到 tracing
    ///
    /// 返回的 guard 必须持有到进程结束，否则文件中的异步日志可能丢失。
    /// 重复初始化时只记录错误并返回 `None`。
    pub fn init(self) -> Option<WorkerGuard> {
        let console_layer = self.console.then(|| {
            fmt::layer()
                .with_timer(ChronoLocal::new(self.time_format.clone()))
                .with_writer(std::io::stdout)
                .with_filter(self.env_filter())
        });

        let (file_layer, guard) = if self.file {
            let appender = tracing_appender::rolling::daily(&self.log_dir, &self.file_prefix);
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_timer(ChronoLocal::new(self.time_format.clone()))
                .with_ansi(false)
                .with_writer(non_blocking)
                .with_filter(self.env_filter());
            (Some(layer), Some(guard))
        } else {
            (None, None)
        };

        if let Err(e) = Registry::default()
            .with(console_layer)
            .with(file_layer)
            .try_init()
        {
            error!("Logger already initialized: {}", e);
            return None;
        }

        tracing::debug!(level = %self.level, console = self.console, file = self.file, "Logger initialized");
        self.spawn_cleanup_task();
        guard
    }

    fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&self.level))
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LEVEL))
    }

    fn spawn_cleanup_task(&self) {
        let Some(max_files) = self.max_files else {
            return;
        };
        if !self.file {
            return;
        }

        let log_dir = self.log_dir.clone();
        let file_prefix = self.file_prefix.clone();
        let interval = Duration::from_secs(self.cleanup_interval_secs.max(1));

        let spawned = std::thread::Builder::new()
            .name("locus-log-cleanup".to_string())
            .spawn(move || {
                loop {
                    let removed = prune_logs(&log_dir, &file_prefix, max_files);
                    if removed > 0 {
                        info!("Removed {} old log files", removed);
                    }
                    std::thread::sleep(interval);
                }
            });

        if let Err(e) = spawned {
            error!("Failed to spawn log cleanup thread: {}", e);
        }
    }
}

/// 保留最新的 `max_files` 个以 `file_prefix` 开头的日志文件，返回删除数量
///
/// 依赖日期后缀按字典序即时间序（`.2024-05-01`）。
pub fn prune_logs(log_dir: &Path, file_prefix: &str, max_files: usize) -> usize {
    let read_dir = match std::fs::read_dir(log_dir) {
        Ok(dir) => dir,
        Err(e) => {
            if log_dir.exists() {
                error!("Failed to read log directory: {}", e);
            }
            return 0;
        }
    };

    let mut log_files: Vec<(PathBuf, String)> = read_dir
        .filter_map(Result::ok)
        .filter_map(|entry| {
            let file_name = entry.file_name().into_string().ok()?;
            file_name
                .starts_with(file_prefix)
                .then(|| (entry.path(), file_name))
        })
        .collect();

    // 降序: [locus.log.2024-05-02, locus.log.2024-05-01, ...]
    log_files.sort_by(|a, b| b.1.cmp(&a.1));

    log_files
        .iter()
        .skip(max_files)
        .filter(|(path, _)| {
            std::fs::remove_file(path)
                .inspect_err(|e| error!("Failed to remove old log file {:?}: {}", path, e))
                .is_ok()
        })
        .count()
}
