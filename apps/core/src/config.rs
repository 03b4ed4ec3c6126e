//! Runtime configuration loaded from the environment.
//!
//! `dotenv` merges a `.env` file first (see `main`). Unset API keys are not
//! errors: the matching collaborator reports itself as unconfigured.

use std::env;
use std::str::FromStr;
use std::time::Duration;
use url::Url;

use crate::brain::memory::DEFAULT_MEMORY_CAPACITY;
use crate::error::AppError;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
const DEFAULT_MAX_TOKENS: u32 = 600;
const DEFAULT_FOOTBALL_BASE_URL: &str = "https://v3.football.api-sports.io";
const DEFAULT_COMPLETION_TIMEOUT_SECS: u64 = 12;
const DEFAULT_FIXTURES_TIMEOUT_SECS: u64 = 8;
const DEFAULT_SESSION_CAPACITY: usize = 1024;

const MIN_MEMORY_CAPACITY: usize = 2;
const MAX_MEMORY_CAPACITY: usize = 50;

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" | "" => Ok(LogFormat::Pretty),
            "json" | "bunyan" => Ok(LogFormat::Json),
            other => Err(AppError::Config(format!("Unknown LOG_FORMAT: {}", other))),
        }
    }
}

/// Chat completion provider settings
#[derive(Debug, Clone)]
pub struct CompletionConfig {
    pub api_key: Option<String>,
    pub base_url: Url,
    pub model: String,
    pub max_tokens: u32,
    /// Deadline for one completion, after which the fallback reply is used
    pub timeout: Duration,
}

// NOTE: expect() is acceptable in these Default impls: the URLs are literals.
impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: Url::parse(DEFAULT_OPENAI_BASE_URL).expect("default URL is valid"),
            model: DEFAULT_OPENAI_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout: Duration::from_secs(DEFAULT_COMPLETION_TIMEOUT_SECS),
        }
    }
}

/// Fixture provider settings
#[derive(Debug, Clone)]
pub struct FixturesConfig {
    pub api_key: Option<String>,
    pub base_url: Url,
    pub timeout: Duration,
}

impl Default for FixturesConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: Url::parse(DEFAULT_FOOTBALL_BASE_URL).expect("default URL is valid"),
            timeout: Duration::from_secs(DEFAULT_FIXTURES_TIMEOUT_SECS),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub completion: CompletionConfig,
    pub fixtures: FixturesConfig,
    /// Turns kept per session
    pub memory_capacity: usize,
    /// Sessions kept before the least recently used one is dropped
    pub session_capacity: usize,
    pub log_format: LogFormat,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            completion: CompletionConfig::default(),
            fixtures: FixturesConfig::default(),
            memory_capacity: DEFAULT_MEMORY_CAPACITY,
            session_capacity: DEFAULT_SESSION_CAPACITY,
            log_format: LogFormat::Pretty,
        }
    }
}

impl AppConfig {
    /// Read the configuration from the process environment.
    pub fn from_env() -> Result<Self, AppError> {
        let completion = CompletionConfig {
            api_key: secret(&["OPENAI_API_KEY", "OPENAI_KEY"]),
            base_url: url_var("OPENAI_BASE_URL", DEFAULT_OPENAI_BASE_URL)?,
            model: var("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
            max_tokens: parsed_var("OPENAI_MAX_TOKENS", DEFAULT_MAX_TOKENS)?,
            timeout: Duration::from_secs(parsed_var(
                "COMPLETION_TIMEOUT_SECS",
                DEFAULT_COMPLETION_TIMEOUT_SECS,
            )?),
        };

        let fixtures = FixturesConfig {
            api_key: secret(&["FOOTBALL_API_KEY", "API_FOOTBALL_KEY"]),
            base_url: url_var("FOOTBALL_API_BASE_URL", DEFAULT_FOOTBALL_BASE_URL)?,
            timeout: Duration::from_secs(parsed_var(
                "FIXTURES_TIMEOUT_SECS",
                DEFAULT_FIXTURES_TIMEOUT_SECS,
            )?),
        };

        let memory_capacity = parsed_var("MEMORY_CAPACITY", DEFAULT_MEMORY_CAPACITY)?
            .clamp(MIN_MEMORY_CAPACITY, MAX_MEMORY_CAPACITY);
        let session_capacity = parsed_var("SESSION_CAPACITY", DEFAULT_SESSION_CAPACITY)?.max(1);

        let log_format = match var("LOG_FORMAT") {
            Some(value) => value.parse()?,
            None => LogFormat::Pretty,
        };

        Ok(Self {
            port: parsed_var("PORT", DEFAULT_PORT)?,
            completion,
            fixtures,
            memory_capacity,
            session_capacity,
            log_format,
        })
    }
}

/// Non-empty, trimmed value of a variable
fn var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// First set variable among aliases
fn secret(names: &[&str]) -> Option<String> {
    names.iter().find_map(|name| var(name))
}

fn parsed_var<T: FromStr>(name: &str, default: T) -> Result<T, AppError> {
    match var(name) {
        Some(raw) => raw
            .parse()
            .map_err(|_| AppError::Config(format!("{} is not a valid number: {}", name, raw))),
        None => Ok(default),
    }
}

fn url_var(name: &str, default: &str) -> Result<Url, AppError> {
    let raw = var(name).unwrap_or_else(|| default.to_string());
    Ok(Url::parse(raw.trim_end_matches('/'))?)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_VARS: &[&str] = &[
        "PORT",
        "OPENAI_API_KEY",
        "OPENAI_KEY",
        "OPENAI_BASE_URL",
        "OPENAI_MODEL",
        "OPENAI_MAX_TOKENS",
        "FOOTBALL_API_KEY",
        "API_FOOTBALL_KEY",
        "FOOTBALL_API_BASE_URL",
        "COMPLETION_TIMEOUT_SECS",
        "FIXTURES_TIMEOUT_SECS",
        "MEMORY_CAPACITY",
        "SESSION_CAPACITY",
        "LOG_FORMAT",
    ];

    fn with_clean_env<F: FnOnce()>(vars: &[(&str, &str)], f: F) {
        let mut all: Vec<(&str, Option<&str>)> = ALL_VARS.iter().map(|name| (*name, None)).collect();
        for (name, value) in vars {
            all.retain(|(n, _)| n != name);
            all.push((*name, Some(*value)));
        }
        temp_env::with_vars(all, f);
    }

    #[test]
    fn test_defaults() {
        with_clean_env(&[], || {
            let config = AppConfig::from_env().expect("defaults should load");
            assert_eq!(config.port, 8080);
            assert!(config.completion.api_key.is_none());
            assert_eq!(config.completion.model, "gpt-4o-mini");
            assert_eq!(config.completion.max_tokens, 600);
            assert_eq!(config.completion.timeout, Duration::from_secs(12));
            assert_eq!(config.fixtures.base_url.as_str(), "https://v3.football.api-sports.io/");
            assert_eq!(config.memory_capacity, 10);
            assert_eq!(config.session_capacity, 1024);
            assert_eq!(config.log_format, LogFormat::Pretty);
        });
    }

    #[test]
    fn test_key_aliases() {
        with_clean_env(&[("OPENAI_KEY", " sk-test "), ("API_FOOTBALL_KEY", "fk")], || {
            let config = AppConfig::from_env().unwrap();
            assert_eq!(config.completion.api_key.as_deref(), Some("sk-test"));
            assert_eq!(config.fixtures.api_key.as_deref(), Some("fk"));
        });
    }

    #[test]
    fn test_blank_key_is_unset() {
        with_clean_env(&[("OPENAI_API_KEY", "   ")], || {
            assert!(AppConfig::from_env().unwrap().completion.api_key.is_none());
        });
    }

    #[test]
    fn test_memory_capacity_is_clamped() {
        with_clean_env(&[("MEMORY_CAPACITY", "500")], || {
            assert_eq!(AppConfig::from_env().unwrap().memory_capacity, 50);
        });
        with_clean_env(&[("MEMORY_CAPACITY", "0")], || {
            assert_eq!(AppConfig::from_env().unwrap().memory_capacity, 2);
        });
    }

    #[test]
    fn test_malformed_values_are_config_errors() {
        with_clean_env(&[("PORT", "eighty")], || {
            assert!(matches!(AppConfig::from_env(), Err(AppError::Config(_))));
        });
        with_clean_env(&[("OPENAI_BASE_URL", "not a url")], || {
            assert!(matches!(AppConfig::from_env(), Err(AppError::Config(_))));
        });
        with_clean_env(&[("LOG_FORMAT", "xml")], || {
            assert!(matches!(AppConfig::from_env(), Err(AppError::Config(_))));
        });
    }

    #[test]
    fn test_json_log_format() {
        with_clean_env(&[("LOG_FORMAT", "JSON")], || {
            assert_eq!(AppConfig::from_env().unwrap().log_format, LogFormat::Json);
        });
    }
}
