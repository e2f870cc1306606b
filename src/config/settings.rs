use crate::error::{ModLoggerError, Result};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Settings {
    pub slack: SlackConfig,
    pub audit: AuditConfig,
    pub cache: CacheConfig,
    pub control: ControlConfig,
}

#[derive(Debug, Clone)]
pub struct SlackConfig {
    pub bot_token: String,
    pub app_token: String,
    pub max_concurrent_handlers: usize,
}

#[derive(Debug, Clone)]
pub struct AuditConfig {
    pub log_path: PathBuf,
    pub escape_newlines: bool,
}

#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub retention: Duration,
    pub sweep_interval: Duration,
    pub metadata_ttl: Duration,
}

#[derive(Debug, Clone)]
pub struct ControlConfig {
    pub bind_addr: SocketAddr,
    pub auto_start: bool,
}

pub fn load_settings() -> Result<Settings> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    Settings::from_lookup(|key| std::env::var(key).ok())
}

impl Settings {
    /// Build settings from an arbitrary key lookup (the process environment in production)
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| ModLoggerError::Config(format!("{} not set", key)))
        };

        let slack = SlackConfig {
            bot_token: required("SLACK_BOT_TOKEN")?,
            app_token: required("SLACK_APP_TOKEN")?,
            max_concurrent_handlers: parse_or(&lookup, "MAX_CONCURRENT_HANDLERS", 32)?,
        };

        let audit = AuditConfig {
            log_path: lookup("AUDIT_LOG_PATH")
                .unwrap_or_else(|| "./mod_logs.txt".to_string())
                .into(),
            escape_newlines: parse_bool_or(&lookup, "AUDIT_ESCAPE_NEWLINES", true)?,
        };

        let cache = CacheConfig {
            retention: Duration::from_secs(parse_or(&lookup, "CACHE_RETENTION_SECS", 86_400)?),
            sweep_interval: Duration::from_secs(parse_or(
                &lookup,
                "CACHE_SWEEP_INTERVAL_SECS",
                3_600,
            )?),
            metadata_ttl: Duration::from_secs(parse_or(&lookup, "METADATA_TTL_SECS", 3_600)?),
        };

        if cache.retention.is_zero() {
            return Err(ModLoggerError::Config(
                "CACHE_RETENTION_SECS must be greater than zero".to_string(),
            ));
        }
        if cache.sweep_interval.is_zero() {
            return Err(ModLoggerError::Config(
                "CACHE_SWEEP_INTERVAL_SECS must be greater than zero".to_string(),
            ));
        }
        if slack.max_concurrent_handlers == 0 {
            return Err(ModLoggerError::Config(
                "MAX_CONCURRENT_HANDLERS must be greater than zero".to_string(),
            ));
        }

        let control = ControlConfig {
            bind_addr: parse_or(
                &lookup,
                "CONTROL_BIND_ADDR",
                SocketAddr::from(([0, 0, 0, 0], 8080)),
            )?,
            auto_start: parse_bool_or(&lookup, "AUTO_START", false)?,
        };

        Ok(Settings {
            slack,
            audit,
            cache,
            control,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ModLoggerError::Config(format!("Invalid {}", key))),
        None => Ok(default),
    }
}

fn parse_bool_or<F>(lookup: &F, key: &str, default: bool) -> Result<bool>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key).map(|v| v.trim().to_ascii_lowercase()) {
        None => Ok(default),
        Some(v) => match v.as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(ModLoggerError::Config(format!("Invalid {}", key))),
        },
    }
}
