use std::path::PathBuf;
use std::time::Duration;

use kids_core::UnlockPolicy;

pub const DEFAULT_TEXT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_IMAGE_MODEL: &str = "gemini-2.5-flash-image";
pub const DEFAULT_API_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_TIMEOUT_MS: u64 = 30_000;
const DEFAULT_MAX_RETRIES: usize = 2;
const DATA_DIR_NAME: &str = "cambridge-kids";
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_LOG_DIR: &str = "./logs";

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub text_model: String,
    pub image_model: String,
    pub api_endpoint: String,
    pub timeout: Duration,
    pub max_retries: usize,
}

impl GeminiConfig {
    pub fn from_env() -> Self {
        Self {
            api_key: env_string("GEMINI_API_KEY").or_else(|| env_string("API_KEY")),
            text_model: env_string("GEMINI_TEXT_MODEL").unwrap_or_else(|| DEFAULT_TEXT_MODEL.to_string()),
            image_model: env_string("GEMINI_IMAGE_MODEL").unwrap_or_else(|| DEFAULT_IMAGE_MODEL.to_string()),
            api_endpoint: env_string("GEMINI_API_ENDPOINT")
                .unwrap_or_else(|| DEFAULT_API_ENDPOINT.to_string())
                .trim_end_matches('/')
                .to_string(),
            timeout: Duration::from_millis(env_u64("GEMINI_TIMEOUT").unwrap_or(DEFAULT_TIMEOUT_MS)),
            max_retries: env_u64("GEMINI_MAX_RETRIES")
                .map(|v| v as usize)
                .unwrap_or(DEFAULT_MAX_RETRIES),
        }
    }

    pub fn is_available(&self) -> bool {
        self.api_key.as_deref().is_some_and(|v| !v.trim().is_empty())
            && !self.text_model.trim().is_empty()
            && !self.api_endpoint.trim().is_empty()
    }
}

/// Where log events go: always stdout, plus a daily file when enabled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// `EnvFilter` directive, e.g. `info` or `kids_app=debug`.
    pub level: String,
    pub file_logs: bool,
    pub dir: PathBuf,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
            file_logs: false,
            dir: PathBuf::from(DEFAULT_LOG_DIR),
        }
    }
}

impl LogConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            level: env_string("RUST_LOG").unwrap_or(defaults.level),
            file_logs: env_bool("ENABLE_FILE_LOGS").unwrap_or(defaults.file_logs),
            dir: env_string("LOG_DIR").map(PathBuf::from).unwrap_or(defaults.dir),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub log: LogConfig,
    pub data_dir: PathBuf,
    pub unlock_policy: UnlockPolicy,
    /// Skip the provider entirely and serve offline content.
    pub offline: bool,
    pub gemini: GeminiConfig,
}

impl Config {
    pub fn from_env() -> Self {
        let data_dir = env_string("KIDS_DATA_DIR")
            .map(PathBuf::from)
            .or_else(|| dirs::data_dir().map(|d| d.join(DATA_DIR_NAME)))
            .unwrap_or_else(|| PathBuf::from("./data"));

        let unlock_policy = if env_bool("UNLOCK_ALL_UNITS").unwrap_or(true) {
            UnlockPolicy::AllUnlocked
        } else {
            UnlockPolicy::Gated
        };

        Self {
            log: LogConfig::from_env(),
            data_dir,
            unlock_policy,
            offline: env_bool("OFFLINE_MODE").unwrap_or(false),
            gemini: GeminiConfig::from_env(),
        }
    }

    /// Whether a remote provider should be constructed at all.
    pub fn wants_provider(&self) -> bool {
        !self.offline && self.gemini.is_available()
    }
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_u64(key: &str) -> Option<u64> {
    env_string(key)?.trim().parse().ok()
}

fn env_bool(key: &str) -> Option<bool> {
    parse_bool(&env_string(key)?)
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
