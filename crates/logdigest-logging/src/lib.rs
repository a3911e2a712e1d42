//! Logging setup for logdigest.
//!
//! Everything logs through the `log` facade; the binary installs an
//! `env_logger` sink that writes to stderr, leaving stdout to the reports.
//! Lines look like
//!
//! ```text
//! [2024-03-01 12:00:00] WARNING ⚠️  message
//! ```
//!
//! `log` has no level above error, so critical messages are error records
//! with the [`CRITICAL_TARGET`] target, emitted through [`critical!`].

use anyhow::Result;
use log::{Level, LevelFilter};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Write;
use std::str::FromStr;

pub use log;

pub const CRITICAL_TARGET: &str = "critical";

/// Log at critical level: an error record that renders as `CRITICAL 💣`.
#[macro_export]
macro_rules! critical {
    ($($arg:tt)+) => {
        $crate::log::error!(target: $crate::CRITICAL_TARGET, $($arg)+)
    };
}

/// Minimum level written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    #[serde(alias = "critical")]
    Error,
    #[serde(alias = "warning")]
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn filter(&self) -> LevelFilter {
        match self {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "error" | "critical" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            other => Err(format!("unknown log level {other:?}")),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        };
        f.write_str(s)
    }
}

/// Level name and glyph shown for a record.
pub fn label(level: Level, target: &str) -> (&'static str, &'static str) {
    if level == Level::Error && target == CRITICAL_TARGET {
        return ("CRITICAL", "💣");
    }
    match level {
        Level::Error => ("ERROR", "❌"),
        Level::Warn => ("WARNING", "⚠️"),
        Level::Info => ("INFO", "ℹ️"),
        Level::Debug => ("DEBUG", "🔎"),
        Level::Trace => ("TRACE", "🔎"),
    }
}

pub fn format_line(timestamp: &str, level: Level, target: &str, message: &fmt::Arguments<'_>) -> String {
    let (name, glyph) = label(level, target);
    format!("[{timestamp}] {name} {glyph}  {message}")
}

/// Install the stderr logger. `RUST_LOG`, when set, overrides `level`.
pub fn init(level: LogLevel) -> Result<()> {
    env_logger::Builder::new()
        .filter_level(level.filter())
        .parse_default_env()
        .target(env_logger::Target::Stderr)
        .format(|buf, record| {
            let ts = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
            writeln!(
                buf,
                "{}",
                format_line(&ts, record.level(), record.target(), record.args())
            )
        })
        .try_init()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn critical_target_gets_its_own_label() {
        assert_eq!(label(Level::Error, CRITICAL_TARGET), ("CRITICAL", "💣"));
        assert_eq!(label(Level::Error, "logdigest_fetch"), ("ERROR", "❌"));
        assert_eq!(label(Level::Warn, CRITICAL_TARGET), ("WARNING", "⚠️"));
    }

    #[test]
    fn line_layout() {
        let line = format_line(
            "2024-03-01 12:00:00",
            Level::Info,
            "x",
            &format_args!("syncing {}...", "a.log"),
        );
        assert_eq!(line, "[2024-03-01 12:00:00] INFO ℹ️  syncing a.log...");
    }

    #[test]
    fn level_parsing_accepts_long_names() {
        assert_eq!("warning".parse::<LogLevel>().unwrap(), LogLevel::Warn);
        assert_eq!("CRITICAL".parse::<LogLevel>().unwrap(), LogLevel::Error);
        assert_eq!(" Debug ".parse::<LogLevel>().unwrap(), LogLevel::Debug);
        assert!("loud".parse::<LogLevel>().is_err());
    }

    #[test]
    fn level_serde_is_lowercase() {
        assert_eq!(serde_json::to_string(&LogLevel::Warn).unwrap(), "\"warn\"");
        assert_eq!(LogLevel::default(), LogLevel::Info);
        assert_eq!(LogLevel::Debug.filter(), LevelFilter::Debug);
        let warn: LogLevel = serde_json::from_str("\"warning\"").unwrap();
        assert_eq!(warn, LogLevel::Warn);
        let error: LogLevel = serde_json::from_str("\"critical\"").unwrap();
        assert_eq!(error, LogLevel::Error);
    }
}
