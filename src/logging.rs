//! Structured logging setup.
//!
//! Events are emitted with `tracing` throughout the crate; this module builds
//! the subscriber from environment configuration:
//!
//! | variable | default | meaning |
//! |---|---|---|
//! | `JUKEBOX_LOG_LEVEL` | `info` | base level |
//! | `JUKEBOX_LOG_FORMAT` | `json` | `json` or `pretty` |
//! | `JUKEBOX_LOG_REDACT_LEVEL` | `credentials` | `none`, `credentials` or `full` |
//! | `JUKEBOX_LOG_TARGET_FILTER` | unset | extra comma-separated directives |
//! | `JUKEBOX_LOG_INCLUDE_LOCATION` | `false` | add file and line |
//!
//! `RUST_LOG` takes precedence over `JUKEBOX_LOG_LEVEL` when set.

use anyhow::{Context, Result};
use std::env;
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Log format: JSON for production, pretty-print for development
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

impl LogFormat {
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "pretty" => LogFormat::Pretty,
            _ => LogFormat::Json,
        }
    }
}

/// How aggressively parameter values are masked in log events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RedactionLevel {
    /// No redaction (dev only)
    None,
    /// Passwords, tokens and other credentials
    #[default]
    Credentials,
    /// Credentials plus user-identifying values
    Full,
}

impl RedactionLevel {
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "none" => RedactionLevel::None,
            "full" => RedactionLevel::Full,
            _ => RedactionLevel::Credentials,
        }
    }

    /// `true` when values of a parameter called `name` must be masked.
    #[must_use]
    pub fn should_redact(self, name: &str) -> bool {
        const CREDENTIALS: [&str; 9] = [
            "password",
            "passwd",
            "pwd",
            "secret",
            "apikey",
            "api_key",
            "token",
            "authorization",
            "credentials",
        ];
        const PII: [&str; 4] = ["email", "phone", "username", "user_id"];

        if self == RedactionLevel::None {
            return false;
        }
        let name = name.to_lowercase();
        if CREDENTIALS.iter().any(|p| name.contains(p)) {
            return true;
        }
        self == RedactionLevel::Full && PII.iter().any(|p| name.contains(p))
    }

    /// The loggable form of `value` for a parameter called `name`.
    #[must_use]
    pub fn redact(self, name: &str, value: &str) -> String {
        if !self.should_redact(name) {
            return value.to_string();
        }
        if name.to_lowercase().contains("token") && value.chars().count() > 8 {
            let head: String = value.chars().take(4).collect();
            return format!("{head}***");
        }
        "<REDACTED>".to_string()
    }
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    pub log_level: String,
    pub format: LogFormat,
    pub redact_level: RedactionLevel,
    /// Extra directives, comma-separated
    pub target_filter: Option<String>,
    pub include_location: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            format: LogFormat::Json,
            redact_level: RedactionLevel::Credentials,
            target_filter: None,
            include_location: false,
        }
    }
}

impl LogConfig {
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            log_level: env::var("JUKEBOX_LOG_LEVEL").unwrap_or(defaults.log_level),
            format: env::var("JUKEBOX_LOG_FORMAT")
                .map(|s| LogFormat::parse(&s))
                .unwrap_or(defaults.format),
            redact_level: env::var("JUKEBOX_LOG_REDACT_LEVEL")
                .map(|s| RedactionLevel::parse(&s))
                .unwrap_or(defaults.redact_level),
            target_filter: env::var("JUKEBOX_LOG_TARGET_FILTER").ok(),
            include_location: env::var("JUKEBOX_LOG_INCLUDE_LOCATION")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.include_location),
        }
    }

    fn level(&self) -> Level {
        match self.log_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        }
    }

    /// Filter built from `RUST_LOG` (or the configured level) plus directives.
    #[must_use]
    pub fn env_filter(&self) -> EnvFilter {
        let mut filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.level().as_str()));

        // The listener logs every client disconnect at info.
        if let Ok(directive) = "may_minihttp::http_server=warn".parse() {
            filter = filter.add_directive(directive);
        }

        if let Some(extra) = &self.target_filter {
            for directive in extra.split(',').map(str::trim).filter(|d| !d.is_empty()) {
                match directive.parse() {
                    Ok(d) => filter = filter.add_directive(d),
                    Err(_) => eprintln!("Warning: invalid log filter directive: {directive}"),
                }
            }
        }
        filter
    }
}

/// Install the global subscriber.
///
/// # Errors
///
/// Fails when a global subscriber is already installed.
pub fn init_logging(config: &LogConfig) -> Result<()> {
    let fmt_layer = match config.format {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(true)
            .with_target(true)
            .with_thread_ids(true)
            .with_file(config.include_location)
            .with_line_number(config.include_location)
            .boxed(),
        LogFormat::Pretty => tracing_subscriber::fmt::layer()
            .pretty()
            .with_target(true)
            .with_file(config.include_location)
            .with_line_number(config.include_location)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(config.env_filter())
        .with(fmt_layer)
        .try_init()
        .context("Failed to initialize logging")
}
