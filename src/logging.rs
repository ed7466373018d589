//! # Logging モジュール
//!
//! 機雷原シミュレーションのログ出力を設定します。
//!
//! コンソールには人が読むための簡潔な形式、ファイルにはtracing-appenderによる
//! 非同期のJSON形式で出力します。試行ループ内のログは `debug!` / `trace!` レベルなので、
//! 通常のINFOレベルでは実行速度に影響しません。
//!
//! ## 設定可能な出力先
//!
//! - `Console`: コンソールのみ
//! - `File`: ファイルのみ（logs/minesim.YYYY-MM-DD）
//! - `Both`: コンソールとファイルの両方

use std::str::FromStr;
use tracing::Level;
use tracing_appender::{non_blocking, non_blocking::WorkerGuard, rolling};
use tracing_subscriber::{EnvFilter, Registry, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// ログ出力先の設定
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LogOutput {
    /// コンソールのみ
    Console,
    /// ファイルのみ
    File,
    /// コンソールとファイルの両方
    Both,
}

impl FromStr for LogOutput {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "console" | "stdout" => Ok(LogOutput::Console),
            "file" => Ok(LogOutput::File),
            "both" | "all" => Ok(LogOutput::Both),
            _ => Err(format!("無効な出力先: {}. 利用可能: console, file, both", s)),
        }
    }
}

impl LogOutput {
    fn writes_file(&self) -> bool {
        matches!(self, LogOutput::File | LogOutput::Both)
    }
}

/// ログ設定構造体
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub level: Level,
    pub output: LogOutput,
    /// ログファイルのディレクトリ（File または Both の場合）
    pub log_dir: String,
    pub file_prefix: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            output: LogOutput::Console,
            log_dir: "logs".to_string(),
            file_prefix: "minesim".to_string(),
        }
    }
}

/// ログシステムを初期化
///
/// 環境変数 `RUST_LOG` が設定されていればそちらを優先します。
/// ファイル出力時は非同期書き込みのガードを返すので、プログラム終了まで保持してください。
/// ガードを破棄すると未書き込みのログが失われます。
pub fn init_logging(config: &LogConfig) -> Result<Option<WorkerGuard>, Box<dyn std::error::Error>> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.level.to_string()))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let console_layer = matches!(config.output, LogOutput::Console | LogOutput::Both).then(|| {
        fmt::layer()
            .with_target(false)
            .with_thread_ids(false)
            .compact()
    });

    let (file_layer, guard) = if config.output.writes_file() {
        ensure_log_directory(&config.log_dir)?;
        let file_appender = rolling::daily(&config.log_dir, &config.file_prefix);
        let (writer, guard) = non_blocking(file_appender);
        let layer = fmt::layer()
            .with_writer(writer)
            .with_target(true)
            .with_thread_ids(true)
            .json();
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    Registry::default()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()?;

    Ok(guard)
}

/// ログレベルを文字列から解析（無効な場合はINFO）
pub fn parse_log_level(level_str: &str) -> Level {
    match level_str.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => {
            eprintln!("警告: 無効なログレベル '{}'. INFOを使用します", level_str);
            Level::INFO
        }
    }
}

/// -v の回数からログレベルを決定
pub fn level_for_verbosity(verbose_level: u8) -> Level {
    match verbose_level {
        0 | 1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// ログディレクトリを作成
pub fn ensure_log_directory(log_dir: &str) -> Result<(), std::io::Error> {
    std::fs::create_dir_all(log_dir)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_output_from_str() {
        assert_eq!(LogOutput::from_str("console"), Ok(LogOutput::Console));
        assert_eq!(LogOutput::from_str("file"), Ok(LogOutput::File));
        assert_eq!(LogOutput::from_str("BOTH"), Ok(LogOutput::Both));
        assert!(LogOutput::from_str("invalid").is_err());
    }

    #[test]
    fn test_parse_log_level() {
        assert_eq!(parse_log_level("debug"), Level::DEBUG);
        assert_eq!(parse_log_level("INFO"), Level::INFO);
        assert_eq!(parse_log_level("invalid"), Level::INFO);
    }

    #[test]
    fn test_level_for_verbosity() {
        assert_eq!(level_for_verbosity(0), Level::INFO);
        assert_eq!(level_for_verbosity(2), Level::DEBUG);
        assert_eq!(level_for_verbosity(5), Level::TRACE);
    }
}
