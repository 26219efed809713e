use locus_logger::{LoggerConfig, prune_logs};
use std::fs::File;
use std::path::Path;
use std::thread;
use std::time::Duration;

fn reset_dir(dir: &str) {
    if Path::new(dir).exists() {
        std::fs::remove_dir_all(dir).unwrap();
    }
    std::fs::create_dir_all(dir).unwrap();
}

fn list(dir: &str) -> Vec<String> {
    std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect()
}

#[test]
fn prune_keeps_newest_files_with_prefix() {
    let dir = "./target/prune_logs";
    reset_dir(dir);

    for date in ["2024-05-01", "2024-05-02", "2024-05-03", "2024-05-04"] {
        File::create(format!("{}/paths.log.{}", dir, date)).unwrap();
    }
    File::create(format!("{}/other.log.2024-01-01", dir)).unwrap();

    let removed = prune_logs(Path::new(dir), "paths.log", 2);
    assert_eq!(removed, 2);

    let mut files = list(dir);
    files.sort();
    assert_eq!(
        files,
        vec![
            "other.log.2024-01-01".to_string(),
            "paths.log.2024-05-03".to_string(),
            "paths.log.2024-05-04".to_string(),
        ]
    );
}

#[test]
fn background_cleanup_runs_on_start_and_periodically() {
    let dir = "./target/cleanup_scenarios_logs";
    reset_dir(dir);
    let file_name = "locus_scenarios.log";

    for date in ["2023-10-20", "2023-10-21", "2023-10-22", "2023-10-23", "2023-10-24"] {
        File::create(format!("{}/{}.{}", dir, file_name, date)).unwrap();
    }

    let _guard = LoggerConfig::new()
        .log_dir(dir)
        .file_prefix(file_name)
        .max_files(3)
        .cleanup_interval(Duration::from_secs(1))
        .enable_console(false)
        .init();

    log::info!("logger initialized for {}", file_name);
    thread::sleep(Duration::from_millis(500));

    let oldest = format!("{}.2023-10-20", file_name);
    assert!(
        !list(dir).contains(&oldest),
        "{} should be deleted on start",
        oldest
    );

    for date in ["2023-10-25", "2023-10-26", "2023-10-27"] {
        File::create(format!("{}/{}.{}", dir, file_name, date)).unwrap();
    }
    thread::sleep(Duration::from_millis(1500));

    // 今日的活动日志文件名同样以前缀开头，只断言明显过旧的文件
    let older = format!("{}.2023-10-22", file_name);
    assert!(
        !list(dir).contains(&older),
        "{} should be deleted by periodic cleanup",
        older
    );
}
