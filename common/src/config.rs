//! Global application configuration manager.
//!
//! `AppConfig` is a lazily initialized, globally accessible singleton containing
//! runtime configuration values loaded from environment variables. Tests can
//! override individual fields through the setters and restore the environment
//! values with [`AppConfig::reset`].

use serde::Deserialize;
use std::env;
use std::str::FromStr;
use std::sync::{OnceLock, RwLock, RwLockReadGuard};

/// Complete runtime configuration for a grading session host.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub env: String,
    pub project_name: String,
    pub log_level: String,
    pub log_file: String,
    pub log_dir: String,
    pub log_to_stdout: bool,
    /// Base URL of the REST API, without a trailing slash (e.g. `https://host/api`).
    pub api_base_url: String,
    /// Static bearer credential; empty means "ask the credential provider".
    pub api_access_token: String,
    pub grading_timeout_secs: u64,
    pub request_timeout_secs: u64,
    /// Endpoint key used when the selected assignment is not bound to one.
    pub default_grading_endpoint: String,
    /// Upper bound accepted for an instructor-chosen maximum score.
    pub max_manual_score: f64,
}

static CONFIG_INSTANCE: OnceLock<RwLock<AppConfig>> = OnceLock::new();

fn var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parsed_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            env: "development".into(),
            project_name: "gradebatch".into(),
            log_level: "info".into(),
            log_file: "gradebatch.log".into(),
            log_dir: "logs".into(),
            log_to_stdout: false,
            api_base_url: "https://localhost:7223/api".into(),
            api_access_token: String::new(),
            grading_timeout_secs: 120,
            request_timeout_secs: 30,
            default_grading_endpoint: "project09".into(),
            max_manual_score: 1000.0,
        }
    }
}

impl AppConfig {
    /// Loads the configuration from `.env` and environment variables.
    ///
    /// Missing or unparseable values fall back to [`AppConfig::default`].
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let defaults = Self::default();

        Self {
            env: var_or("APP_ENV", &defaults.env),
            project_name: var_or("PROJECT_NAME", &defaults.project_name),
            log_level: var_or("LOG_LEVEL", &defaults.log_level),
            log_file: var_or("LOG_FILE", &defaults.log_file),
            log_dir: var_or("LOG_DIR", &defaults.log_dir),
            log_to_stdout: var_or("LOG_TO_STDOUT", "false") == "true",
            api_base_url: var_or("API_BASE_URL", &defaults.api_base_url)
                .trim_end_matches('/')
                .to_string(),
            api_access_token: var_or("API_ACCESS_TOKEN", ""),
            grading_timeout_secs: parsed_or("GRADING_TIMEOUT_SECS", defaults.grading_timeout_secs),
            request_timeout_secs: parsed_or("REQUEST_TIMEOUT_SECS", defaults.request_timeout_secs),
            default_grading_endpoint: var_or(
                "DEFAULT_GRADING_ENDPOINT",
                &defaults.default_grading_endpoint,
            ),
            max_manual_score: parsed_or("MAX_MANUAL_SCORE", defaults.max_manual_score),
        }
    }

    fn instance() -> &'static RwLock<AppConfig> {
        CONFIG_INSTANCE.get_or_init(|| RwLock::new(AppConfig::from_env()))
    }

    /// Returns a shared reference to the global configuration.
    ///
    /// A poisoned lock still yields the last written value.
    pub fn global() -> RwLockReadGuard<'static, AppConfig> {
        Self::instance()
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Reloads the configuration from environment variables, dropping overrides.
    pub fn reset() {
        Self::set_field(|cfg| *cfg = AppConfig::from_env());
    }

    fn set_field<F>(setter: F)
    where
        F: FnOnce(&mut AppConfig),
    {
        let mut guard = Self::instance()
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        setter(&mut guard);
    }

    pub fn set_log_level(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.log_level = value.into());
    }

    pub fn set_log_to_stdout(value: bool) {
        AppConfig::set_field(|cfg| cfg.log_to_stdout = value);
    }

    pub fn set_api_base_url(value: impl Into<String>) {
        let value = value.into();
        AppConfig::set_field(|cfg| cfg.api_base_url = value.trim_end_matches('/').to_string());
    }

    pub fn set_api_access_token(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.api_access_token = value.into());
    }

    pub fn set_grading_timeout_secs(value: u64) {
        AppConfig::set_field(|cfg| cfg.grading_timeout_secs = value);
    }

    pub fn set_default_grading_endpoint(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.default_grading_endpoint = value.into());
    }

    pub fn set_max_manual_score(value: f64) {
        AppConfig::set_field(|cfg| cfg.max_manual_score = value);
    }
}

// --- Free accessors ---

pub fn project_name() -> String {
    AppConfig::global().project_name.clone()
}

pub fn log_level() -> String {
    AppConfig::global().log_level.clone()
}

pub fn log_file() -> String {
    AppConfig::global().log_file.clone()
}

pub fn log_dir() -> String {
    AppConfig::global().log_dir.clone()
}

pub fn log_to_stdout() -> bool {
    AppConfig::global().log_to_stdout
}

pub fn api_base_url() -> String {
    AppConfig::global().api_base_url.clone()
}

pub fn api_access_token() -> String {
    AppConfig::global().api_access_token.clone()
}

pub fn grading_timeout_secs() -> u64 {
    AppConfig::global().grading_timeout_secs
}

pub fn request_timeout_secs() -> u64 {
    AppConfig::global().request_timeout_secs
}

pub fn default_grading_endpoint() -> String {
    AppConfig::global().default_grading_endpoint.clone()
}

pub fn max_manual_score() -> f64 {
    AppConfig::global().max_manual_score
}
