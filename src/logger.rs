use crate::config::StudioConfig;
use chrono::{DateTime, Utc};
use colored::*;
use log::{Level, LevelFilter, Metadata, Record};
use once_cell::sync::Lazy;
use serde::{Serialize, Serializer};
use std::env;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use uuid::Uuid;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

static STUDIO_LOGGER: Lazy<StudioLogger> = Lazy::new(StudioLogger::new);

/// Install the studio logger as the `log` backend.
///
/// Fails if the log file cannot be opened or another logger is already set.
pub fn init_with_config(config: LoggerConfig) -> Result<(), String> {
    let max_level = config.min_level;
    STUDIO_LOGGER
        .configure(config)
        .map_err(|e| format!("Failed to open log file: {}", e))?;

    log::set_logger(&*STUDIO_LOGGER).map_err(|e| format!("Failed to set logger: {:?}", e))?;
    log::set_max_level(max_level);
    Ok(())
}

fn level_style(level: Level) -> (Color, &'static str) {
    match level {
        Level::Error => (Color::Red, "❌"),
        Level::Warn => (Color::Yellow, "⚠️"),
        Level::Info => (Color::Green, "💡"),
        Level::Debug => (Color::Blue, "🐛"),
        Level::Trace => (Color::Cyan, "🔍"),
    }
}

fn serialize_level<S: Serializer>(level: &Level, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(level.as_str())
}

/// One formatted record.
///
/// Pipeline messages end with a `[req:<uuid>]` tag; it is lifted out of the
/// message into `request_id` so JSON output can be filtered per request.
#[derive(Debug, Clone, Serialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    #[serde(serialize_with = "serialize_level")]
    pub level: Level,
    pub target: String,
    pub message: String,
    pub request_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub uptime_ms: u64,
}

impl LogEntry {
    pub fn new(level: Level, target: impl Into<String>, message: &str) -> Self {
        let (message, request_id) = split_request_tag(message);
        Self {
            timestamp: Utc::now(),
            level,
            target: target.into(),
            message,
            request_id,
            location: None,
            uptime_ms: 0,
        }
    }

    fn from_record(record: &Record, uptime: Duration) -> Self {
        let mut entry = Self::new(record.level(), record.target(), &record.args().to_string());
        entry.location = record
            .file()
            .map(|file| format!("{}:{}", file, record.line().unwrap_or(0)));
        entry.uptime_ms = uptime.as_millis() as u64;
        entry
    }
}

fn split_request_tag(message: &str) -> (String, Option<Uuid>) {
    let trimmed = message.trim_end();
    if let Some(start) = trimmed.rfind("[req:") {
        if let Some(inner) = trimmed[start + 5..].strip_suffix(']') {
            if let Ok(id) = Uuid::parse_str(inner) {
                return (trimmed[..start].trim_end().to_string(), Some(id));
            }
        }
    }
    (message.to_string(), None)
}

#[derive(Debug, Clone)]
pub struct LoggerConfig {
    pub min_level: LevelFilter,
    pub show_colors: bool,
    pub show_emojis: bool,
    pub show_location: bool,
    pub include_timestamp: bool,
    pub output_json: bool,
    pub log_file: Option<PathBuf>,
    pub prefix: Option<String>,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            min_level: LevelFilter::Info,
            show_colors: true,
            show_emojis: true,
            show_location: false,
            include_timestamp: true,
            output_json: false,
            log_file: None,
            prefix: None,
        }
    }
}

impl LoggerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Debug level with source locations, for running the demo binary.
    pub fn development() -> Self {
        Self {
            min_level: LevelFilter::Debug,
            show_location: true,
            ..Default::default()
        }
    }

    /// [`LoggerConfig::development`] adjusted by `FLUXGEN_LOG_LEVEL`,
    /// `FLUXGEN_LOG_JSON` and `FLUXGEN_LOG_FILE`.
    pub fn from_env() -> Self {
        let mut config = Self::development();

        if let Some(level) = env::var("FLUXGEN_LOG_LEVEL")
            .ok()
            .and_then(|s| s.parse().ok())
        {
            config.min_level = level;
        }
        if let Ok(json) = env::var("FLUXGEN_LOG_JSON") {
            config = config.with_json_output(matches!(json.as_str(), "1" | "true"));
        }
        if let Ok(path) = env::var("FLUXGEN_LOG_FILE") {
            config = config.with_file_output(path);
        }

        config
    }

    pub fn with_colors(mut self, enabled: bool) -> Self {
        self.show_colors = enabled;
        self
    }

    /// JSON lines are read by machines, so colors and emojis are switched off.
    pub fn with_json_output(mut self, enabled: bool) -> Self {
        self.output_json = enabled;
        if enabled {
            self.show_colors = false;
            self.show_emojis = false;
        }
        self
    }

    pub fn with_file_output(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_file = Some(path.into());
        self
    }

    pub fn with_prefix(mut self, prefix: &str) -> Self {
        self.prefix = Some(prefix.to_string());
        self
    }
}

fn format_console(entry: &LogEntry, config: &LoggerConfig) -> String {
    let paint = |text: &str, style: fn(&str) -> ColoredString| -> String {
        if config.show_colors {
            style(text).to_string()
        } else {
            text.to_string()
        }
    };

    let mut parts = Vec::new();

    if let Some(prefix) = &config.prefix {
        parts.push(format!("[{}]", paint(prefix.as_str(), |s| s.bright_white().bold())));
    }
    if config.include_timestamp {
        let timestamp = entry.timestamp.format(TIMESTAMP_FORMAT).to_string();
        parts.push(paint(timestamp.as_str(), |s| s.bright_black()));
    }

    let (color, emoji) = level_style(entry.level);
    let label = if config.show_emojis {
        format!("{} {}", emoji, entry.level)
    } else {
        entry.level.to_string()
    };
    if config.show_colors {
        parts.push(format!("[{}]", label.color(color).bold()));
    } else {
        parts.push(format!("[{}]", label));
    }

    if !entry.target.is_empty() {
        parts.push(format!("{}:", paint(entry.target.as_str(), |s| s.bright_blue())));
    }
    parts.push(paint(entry.message.as_str(), |s| s.white().bold()));

    if let Some(request_id) = entry.request_id {
        // First block of the uuid is enough to follow one request by eye.
        let short = request_id.to_string()[..8].to_string();
        parts.push(format!("[req:{}]", paint(short.as_str(), |s| s.bright_yellow())));
    }
    if let (true, Some(location)) = (config.show_location, &entry.location) {
        parts.push(format!("({})", paint(location.as_str(), |s| s.bright_black())));
    }

    parts.join(" ")
}

fn format_line(entry: &LogEntry, config: &LoggerConfig) -> String {
    if config.output_json {
        serde_json::to_string(entry).unwrap_or_default()
    } else {
        format_console(entry, config)
    }
}

struct StudioLogger {
    config: Mutex<LoggerConfig>,
    log_file: Mutex<Option<File>>,
    started: Instant,
}

impl StudioLogger {
    fn new() -> Self {
        Self {
            config: Mutex::new(LoggerConfig::default()),
            log_file: Mutex::new(None),
            started: Instant::now(),
        }
    }

    fn configure(&self, config: LoggerConfig) -> io::Result<()> {
        let file = match &config.log_file {
            Some(path) => Some(OpenOptions::new().create(true).append(true).open(path)?),
            None => None,
        };

        if let Ok(mut log_file) = self.log_file.lock() {
            *log_file = file;
        }
        if let Ok(mut current) = self.config.lock() {
            *current = config;
        }
        Ok(())
    }
}

impl log::Log for StudioLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        match self.config.lock() {
            Ok(config) => metadata.level() <= config.min_level,
            Err(_) => true,
        }
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let entry = LogEntry::from_record(record, self.started.elapsed());
        let config = match self.config.lock() {
            Ok(config) => config.clone(),
            Err(_) => return,
        };

        println!("{}", format_line(&entry, &config));

        if let Ok(mut log_file) = self.log_file.lock() {
            if let Some(file) = log_file.as_mut() {
                let plain = config.with_colors(false);
                let _ = writeln!(file, "{}", format_line(&entry, &plain));
            }
        }
    }

    fn flush(&self) {
        let _ = io::stdout().flush();
        if let Ok(mut log_file) = self.log_file.lock() {
            if let Some(file) = log_file.as_mut() {
                let _ = file.flush();
            }
        }
    }
}

/// Logs how long one backend call took when dropped.
pub struct Timer {
    label: &'static str,
    request_id: Uuid,
    start: Instant,
}

impl Timer {
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        log::info!(
            "⏱️  {} took {}ms [req:{}]",
            self.label,
            self.elapsed().as_millis(),
            self.request_id
        );
    }
}

pub fn timer(label: &'static str, request_id: Uuid) -> Timer {
    log::debug!("⏱️  {} started [req:{}]", label, request_id);
    Timer {
        label,
        request_id,
        start: Instant::now(),
    }
}

#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        log::info!("💡 {}", format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        log::error!("❌ {}", format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        log::warn!("⚠️  {}", format!($($arg)*))
    };
}

pub fn log_startup_info(app_name: &str, version: &str, backend: &str) {
    log::info!("🚀 Starting {} v{}", app_name, version);
    log::info!("🎨 Generation backend: {}", backend);
}

pub fn log_config_info(config: &StudioConfig) {
    log::info!("⚙️  Configuration loaded:");
    log::info!("   Seed mode: {}", config.seed_mode);
    log::info!(
        "   Defaults: {}x{}, {} steps, {} sample(s), randomize seed {}",
        config.defaults.width,
        config.defaults.height,
        config.defaults.steps,
        config.defaults.sample_count,
        if config.defaults.randomize_seed { "✅" } else { "❌" }
    );
    match &config.http {
        Some(http) => log::info!(
            "   Endpoint: {}",
            http.endpoint.as_deref().unwrap_or("(missing)")
        ),
        None => log::info!("   Endpoint: ❌ (placeholder backend)"),
    }
}
