//! Configuration schema definitions.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct HooklineConfig {
    /// Bot identity settings.
    #[serde(default)]
    pub core: CoreConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Example test harness settings.
    #[serde(default)]
    pub testing: TestingConfig,
}

// =============================================================================
// core
// =============================================================================

/// Bot identity settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CoreConfig {
    /// The bot's nick.
    #[serde(default = "default_nick")]
    pub nick: String,

    /// Prefix for prefixed commands.
    #[serde(default = "default_help_prefix")]
    pub help_prefix: String,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            nick: default_nick(),
            help_prefix: default_help_prefix(),
        }
    }
}

fn default_nick() -> String {
    "Hookline".to_string()
}

fn default_help_prefix() -> String {
    ".".to_string()
}

// =============================================================================
// logging
// =============================================================================

/// Log verbosity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Everything.
    Trace,
    /// Diagnostics.
    Debug,
    /// The default.
    #[default]
    Info,
    /// Problems that were handled.
    Warn,
    /// Failures.
    Error,
}

impl LogLevel {
    /// Returns the level name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }

    /// Converts to a `tracing` level.
    pub fn to_tracing_level(self) -> tracing::Level {
        match self {
            Self::Trace => tracing::Level::TRACE,
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warn => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Log line layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// One short line per event.
    #[default]
    Compact,
    /// The `tracing-subscriber` default layout.
    Full,
    /// Multi-line, human oriented.
    Pretty,
    /// One JSON object per line. Needs the `json-log` feature.
    Json,
}

/// Where log lines go.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    /// Standard output.
    #[default]
    Stdout,
    /// Standard error.
    Stderr,
    /// The file at `logging.file_path`.
    File,
}

/// Which span lifecycle events are logged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpanEventConfig {
    /// Span creation.
    #[serde(default)]
    pub new: bool,
    /// Span entry.
    #[serde(default)]
    pub enter: bool,
    /// Span exit.
    #[serde(default)]
    pub exit: bool,
    /// Span close.
    #[serde(default)]
    pub close: bool,
}

/// Logging settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Base log level.
    #[serde(default)]
    pub level: LogLevel,

    /// Line layout.
    #[serde(default)]
    pub format: LogFormat,

    /// Destination.
    #[serde(default)]
    pub output: LogOutput,

    /// Log file, required when `output` is `file`.
    #[serde(default)]
    pub file_path: Option<PathBuf>,

    /// Per-module levels, e.g. `hookline_framework = "debug"`.
    #[serde(default)]
    pub filters: HashMap<String, LogLevel>,

    /// Include thread IDs.
    #[serde(default)]
    pub thread_ids: bool,

    /// Include source file and line.
    #[serde(default)]
    pub file_location: bool,

    /// Span lifecycle events.
    #[serde(default)]
    pub span_events: SpanEventConfig,
}

// =============================================================================
// testing
// =============================================================================

/// Example test harness settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TestingConfig {
    /// Nick that sends example messages.
    #[serde(default = "default_testing_nick")]
    pub nick: String,

    /// Channel example messages are sent to.
    #[serde(default = "default_testing_channel")]
    pub channel: String,

    /// Run examples marked as needing network access.
    #[serde(default)]
    pub online: bool,
}

impl Default for TestingConfig {
    fn default() -> Self {
        Self {
            nick: default_testing_nick(),
            channel: default_testing_channel(),
            online: false,
        }
    }
}

fn default_testing_nick() -> String {
    "Tester".to_string()
}

fn default_testing_channel() -> String {
    "#channel".to_string()
}
