//! Logging setup for oraimage: env_logger for humans, JSON lines for CI

use chrono::{Local, Utc};
use log::{Level, LevelFilter, Log, Metadata, Record};
use serde_json::json;
use std::env;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::sync::Mutex;

/// Environment variable holding the log level (`info`, `json:debug`, ...)
pub const LOG_LEVEL_ENV: &str = "ORAIMAGE_LOG_LEVEL";

/// Environment variable naming a file that receives JSON log lines
pub const LOG_PATH_ENV: &str = "ORAIMAGE_LOG_PATH";

const DEFAULT_LEVEL: &str = "info";

/// JSON logger implementation
#[derive(Debug)]
pub struct JsonLogger {
    level: Level,
    target_file: Mutex<Option<std::fs::File>>,
}

fn parse_level_filter(level: &str) -> LevelFilter {
    match level {
        "trace" => LevelFilter::Trace,
        "debug" => LevelFilter::Debug,
        "info" => LevelFilter::Info,
        "warn" => LevelFilter::Warn,
        "error" => LevelFilter::Error,
        "off" => LevelFilter::Off,
        _ => LevelFilter::Info,
    }
}

/// Split `json:debug` / `json` / `debug` into (json?, level)
fn split_level(level_str: &str) -> (bool, &str) {
    if let Some(stripped) = level_str.strip_prefix("json:") {
        (true, stripped)
    } else if level_str == "json" {
        (true, DEFAULT_LEVEL)
    } else {
        (false, level_str)
    }
}

impl JsonLogger {
    /// Create a new JSON logger
    pub fn new(level: Level, log_path: Option<String>) -> Self {
        let target_file = if let Some(path) = log_path {
            OpenOptions::new().create(true).append(true).open(path).ok()
        } else {
            None
        };

        JsonLogger {
            level,
            target_file: Mutex::new(target_file),
        }
    }

    /// Initialize logging with the given level string; `source` names where it came from
    pub fn init_with_level(level_str: &str, source: &str) -> (String, String) {
        let log_path = env::var(LOG_PATH_ENV).ok();
        let (use_json, actual_level) = split_level(level_str);

        if !use_json {
            let level_filter = parse_level_filter(actual_level);

            let _ = env_logger::Builder::new()
                .filter_level(level_filter)
                .format(|buf, record| {
                    write!(
                        buf,
                        "[{} {} {}] ",
                        Local::now().format("%Y-%m-%dT%H:%M:%S"),
                        record.level(),
                        record.target()
                    )?;
                    writeln!(buf, "{}", record.args())
                })
                .try_init();
            return (actual_level.to_string(), source.to_string());
        }

        let level = parse_level_filter(actual_level)
            .to_level()
            .unwrap_or(Level::Info);

        let logger = Box::new(JsonLogger::new(level, log_path));

        if let Err(e) = log::set_boxed_logger(logger) {
            eprintln!("Failed to initialize JSON logger: {e}");
            return (actual_level.to_string(), source.to_string());
        }

        log::set_max_level(level.to_level_filter());
        (actual_level.to_string(), source.to_string())
    }

    /// Initialize from `ORAIMAGE_LOG_LEVEL`, defaulting to `info`
    pub fn init() {
        let log_level = env::var(LOG_LEVEL_ENV).unwrap_or_else(|_| DEFAULT_LEVEL.to_string());
        Self::init_with_level(&log_level, LOG_LEVEL_ENV);
    }

    /// Initialize from a CLI flag when given, else from the environment
    pub fn init_from_cli(level: Option<&str>) {
        match level {
            Some(level) => {
                Self::init_with_level(level, "CLI --log-level");
            }
            None => Self::init(),
        }
    }

    fn render(record: &Record<'_>) -> String {
        let log_entry = json!({
            "@timestamp": Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Micros, true),
            "@level": record.level().to_string().to_lowercase(),
            "@message": record.args().to_string(),
            "@module": record.target(),
            "@pid": std::process::id(),
            "@file": record.file().unwrap_or("unknown"),
            "@line": record.line().unwrap_or(0),
        });

        format!(
            "{}\n",
            serde_json::to_string(&log_entry).unwrap_or_default()
        )
    }
}

impl Log for JsonLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let json_string = Self::render(record);

        // File target when configured, stderr otherwise
        if let Ok(mut file_guard) = self.target_file.lock() {
            if let Some(ref mut file) = *file_guard {
                let _ = file.write_all(json_string.as_bytes());
                let _ = file.flush();
                return;
            }
        }
        let _ = io::stderr().write_all(json_string.as_bytes());
        let _ = io::stderr().flush();
    }

    fn flush(&self) {
        if let Ok(mut file_guard) = self.target_file.lock() {
            if let Some(ref mut file) = *file_guard {
                let _ = file.flush();
            }
        }
        let _ = io::stderr().flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_level() {
        assert_eq!(split_level("json:debug"), (true, "debug"));
        assert_eq!(split_level("json"), (true, "info"));
        assert_eq!(split_level("warn"), (false, "warn"));
    }

    #[test]
    fn test_unknown_level_falls_back_to_info() {
        assert_eq!(parse_level_filter("chatty"), LevelFilter::Info);
        assert_eq!(parse_level_filter("off"), LevelFilter::Off);
    }

    #[test]
    fn test_render_is_single_json_line() {
        let line = JsonLogger::render(
            &Record::builder()
                .args(format_args!("staged {} files", 3))
                .level(Level::Warn)
                .target("oraimage::patches::stager")
                .build(),
        );
        assert!(line.ends_with('\n'));
        let value: serde_json::Value = serde_json::from_str(line.trim()).unwrap();
        assert_eq!(value["@level"], "warn");
        assert_eq!(value["@message"], "staged 3 files");
    }
}
