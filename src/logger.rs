//! Structured logging for the storefront core
//!
//! - Log levels (ERROR, WARN, INFO, DEBUG, TRACE)
//! - JSON lines in production, human-readable lines in development
//! - Optional daily log file under `<data dir>/logs`
//! - Payment references and credentials are redacted before they are written

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};

use crate::config::LoggingConfig;

const REDACTED: &str = "***REDACTED***";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Error = 0,
    Warn = 1,
    Info = 2,
    Debug = 3,
    Trace = 4,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warn => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
            LogLevel::Trace => "TRACE",
        }
    }

    /// Unknown names fall back to INFO.
    pub fn parse(level: &str) -> Self {
        match level.trim().to_uppercase().as_str() {
            "ERROR" => LogLevel::Error,
            "WARN" | "WARNING" => LogLevel::Warn,
            "DEBUG" => LogLevel::Debug,
            "TRACE" => LogLevel::Trace,
            _ => LogLevel::Info,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Local>,
    pub level: LogLevel,
    pub target: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone)]
pub struct LoggerConfig {
    pub level: LogLevel,
    pub log_to_file: bool,
    pub log_to_stdout: bool,
    pub json_format: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::parse(&std::env::var("RUST_LOG").unwrap_or_default()),
            log_to_file: true,
            log_to_stdout: true,
            json_format: cfg!(not(debug_assertions)),
        }
    }
}

impl From<&LoggingConfig> for LoggerConfig {
    fn from(c: &LoggingConfig) -> Self {
        Self {
            level: LogLevel::parse(&c.level),
            log_to_file: c.log_to_file,
            log_to_stdout: c.log_to_stdout,
            json_format: c.json_format,
        }
    }
}

pub struct Logger {
    config: LoggerConfig,
    log_path: Option<PathBuf>,
    file: Mutex<Option<BufWriter<File>>>,
}

impl Logger {
    /// Build a logger. When file output is enabled the log directory is
    /// created under `app_data_dir`.
    pub fn init(app_data_dir: &Path, config: LoggerConfig) -> Result<Self, String> {
        if !config.log_to_file {
            return Ok(Self {
                config,
                log_path: None,
                file: Mutex::new(None),
            });
        }

        let log_dir = app_data_dir.join("logs");
        std::fs::create_dir_all(&log_dir)
            .map_err(|e| format!("Failed to create log directory: {}", e))?;

        let log_path = log_dir.join(format!("storefront-{}.log", Local::now().format("%Y-%m-%d")));
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)
            .map_err(|e| format!("Failed to open log file: {}", e))?;

        Ok(Self {
            config,
            log_path: Some(log_path),
            file: Mutex::new(Some(BufWriter::new(file))),
        })
    }

    pub fn log_path(&self) -> Option<&Path> {
        self.log_path.as_deref()
    }

    pub fn format_line(&self, entry: &LogEntry) -> String {
        if self.config.json_format {
            return serde_json::to_string(entry).unwrap_or_else(|_| "{}".to_string());
        }
        let mut line = format!(
            "{} [{}] [{}] {}",
            entry.timestamp.format("%Y-%m-%d %H:%M:%S%.3f"),
            entry.level.as_str(),
            entry.target,
            entry.message,
        );
        if let Some(data) = &entry.data {
            line.push_str(&format!(" | {}", data));
        }
        if let Some(err) = &entry.error {
            line.push_str(&format!(" | error: {}", err));
        }
        line
    }

    fn write(&self, entry: LogEntry) {
        if entry.level > self.config.level {
            return;
        }
        let line = self.format_line(&entry);

        if self.config.log_to_stdout {
            match entry.level {
                LogLevel::Error | LogLevel::Warn => eprintln!("{}", line),
                _ => println!("{}", line),
            }
        }

        if let Ok(mut guard) = self.file.lock() {
            if let Some(writer) = guard.as_mut() {
                let _ = writeln!(writer, "{}", line);
                let _ = writer.flush();
            }
        }
    }

    fn entry(
        level: LogLevel,
        target: &str,
        message: &str,
        data: Option<serde_json::Value>,
        error: Option<&str>,
    ) -> LogEntry {
        LogEntry {
            timestamp: Local::now(),
            level,
            target: target.to_string(),
            message: message.to_string(),
            data,
            error: error.map(String::from),
        }
    }

    pub fn error(&self, target: &str, message: &str, error: Option<&str>) {
        self.write(Self::entry(LogLevel::Error, target, message, None, error));
    }

    pub fn warn(&self, target: &str, message: &str, data: Option<serde_json::Value>) {
        self.write(Self::entry(LogLevel::Warn, target, message, data, None));
    }

    pub fn info(&self, target: &str, message: &str, data: Option<serde_json::Value>) {
        self.write(Self::entry(LogLevel::Info, target, message, data, None));
    }

    pub fn debug(&self, target: &str, message: &str, data: Option<serde_json::Value>) {
        self.write(Self::entry(LogLevel::Debug, target, message, data, None));
    }

    /// Payment-related event. Sensitive fields are redacted first.
    pub fn payment(&self, action: &str, data: &serde_json::Value) {
        let redacted = redact_sensitive_data(data.clone());
        self.write(Self::entry(LogLevel::Info, "PAYMENT", action, Some(redacted), None));
    }
}

fn is_sensitive_key(key: &str) -> bool {
    let key = key.to_lowercase();
    ["reference", "key", "secret", "password", "token"]
        .iter()
        .any(|needle| key.contains(needle))
}

/// Replace values under sensitive keys, recursing into objects and arrays.
pub fn redact_sensitive_data(value: serde_json::Value) -> serde_json::Value {
    match value {
        serde_json::Value::Object(map) => serde_json::Value::Object(
            map.into_iter()
                .map(|(key, val)| {
                    if is_sensitive_key(&key) {
                        (key, serde_json::Value::String(REDACTED.to_string()))
                    } else {
                        (key, redact_sensitive_data(val))
                    }
                })
                .collect(),
        ),
        serde_json::Value::Array(arr) => {
            serde_json::Value::Array(arr.into_iter().map(redact_sensitive_data).collect())
        }
        other => other,
    }
}

static GLOBAL_LOGGER: OnceLock<Logger> = OnceLock::new();

pub fn init_global_logger(app_data_dir: &Path, config: LoggerConfig) -> Result<(), String> {
    let logger = Logger::init(app_data_dir, config)?;
    GLOBAL_LOGGER
        .set(logger)
        .map_err(|_| "Logger already initialized".to_string())
}

/// The global logger. Logging macros are no-ops until it is initialized.
pub fn get_logger() -> Option<&'static Logger> {
    GLOBAL_LOGGER.get()
}

#[macro_export]
macro_rules! log_error {
    ($target:expr, $msg:expr) => {
        if let Some(l) = $crate::logger::get_logger() {
            l.error($target, $msg, None);
        }
    };
    ($target:expr, $msg:expr, $err:expr) => {
        if let Some(l) = $crate::logger::get_logger() {
            l.error($target, $msg, Some(&$err.to_string()));
        }
    };
}

#[macro_export]
macro_rules! log_warn {
    ($target:expr, $msg:expr) => {
        if let Some(l) = $crate::logger::get_logger() {
            l.warn($target, $msg, None);
        }
    };
    ($target:expr, $msg:expr, $data:expr) => {
        if let Some(l) = $crate::logger::get_logger() {
            l.warn($target, $msg, Some($data));
        }
    };
}

#[macro_export]
macro_rules! log_info {
    ($target:expr, $msg:expr) => {
        if let Some(l) = $crate::logger::get_logger() {
            l.info($target, $msg, None);
        }
    };
    ($target:expr, $msg:expr, $data:expr) => {
        if let Some(l) = $crate::logger::get_logger() {
            l.info($target, $msg, Some($data));
        }
    };
}

#[macro_export]
macro_rules! log_debug {
    ($target:expr, $msg:expr) => {
        if let Some(l) = $crate::logger::get_logger() {
            l.debug($target, $msg, None);
        }
    };
    ($target:expr, $msg:expr, $data:expr) => {
        if let Some(l) = $crate::logger::get_logger() {
            l.debug($target, $msg, Some($data));
        }
    };
}

#[macro_export]
macro_rules! log_payment {
    ($action:expr, $data:expr) => {
        if let Some(l) = $crate::logger::get_logger() {
            l.payment($action, $data);
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn redacts_nested_payment_fields() {
        let data = json!({
            "order": { "paymentReference": "TX-SECRET", "itemName": "Lua Pack" },
            "attempts": [{ "api_token": "abc" }],
            "price": 900
        });
        let redacted = redact_sensitive_data(data);
        assert_eq!(redacted["order"]["paymentReference"], REDACTED);
        assert_eq!(redacted["order"]["itemName"], "Lua Pack");
        assert_eq!(redacted["attempts"][0]["api_token"], REDACTED);
        assert_eq!(redacted["price"], 900);
    }

    #[test]
    fn level_parse_defaults_to_info() {
        assert_eq!(LogLevel::parse("warning"), LogLevel::Warn);
        assert_eq!(LogLevel::parse("nonsense"), LogLevel::Info);
        assert!(LogLevel::Error < LogLevel::Debug);
    }

    #[test]
    fn writes_filtered_lines_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let logger = Logger::init(
            dir.path(),
            LoggerConfig {
                level: LogLevel::Info,
                log_to_file: true,
                log_to_stdout: false,
                json_format: false,
            },
        )
        .unwrap();

        logger.info("CHECKOUT", "order placed", Some(json!({ "price": 900 })));
        logger.debug("CHECKOUT", "below threshold", None);
        logger.error("DOWNLOAD", "download failed", Some("timeout"));

        let contents = std::fs::read_to_string(logger.log_path().unwrap()).unwrap();
        assert!(contents.contains("[INFO] [CHECKOUT] order placed | {\"price\":900}"));
        assert!(!contents.contains("below threshold"));
        assert!(contents.contains("[ERROR] [DOWNLOAD] download failed | error: timeout"));
    }

    #[test]
    fn json_format_is_one_object_per_line() {
        let dir = tempfile::tempdir().unwrap();
        let logger = Logger::init(
            dir.path(),
            LoggerConfig {
                level: LogLevel::Trace,
                log_to_file: false,
                log_to_stdout: false,
                json_format: true,
            },
        )
        .unwrap();
        assert!(logger.log_path().is_none());

        let entry = Logger::entry(LogLevel::Warn, "COUPON", "rejected", None, None);
        let line = logger.format_line(&entry);
        let parsed: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(parsed["level"], "WARN");
        assert_eq!(parsed["target"], "COUPON");
        assert!(parsed.get("data").is_none());
    }
}
