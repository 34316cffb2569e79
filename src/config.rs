use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use log::warn;

/// Errors that stop the process before it starts serving.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("required environment variable {0} is not set")]
    MissingVar(&'static str),

    #[error("environment variable {name} has invalid value {value:?}")]
    InvalidVar { name: &'static str, value: String },
}

/// Fixed generation parameters sent with every completion request.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationParams {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub top_p: f32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            temperature: 0.7,
            max_tokens: 512,
            top_p: 0.95,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub api_key: String,
    pub base_url: String,
    pub timeout: Duration,
    pub params: GenerationParams,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub service_name: String,
    pub provider: ProviderConfig,
    pub memory_capacity: usize,
    pub enforce_structure: bool,
    pub default_system_prompt: Option<String>,
    pub static_dir: PathBuf,
    pub body_limit: usize,
    pub cors_origin: Option<String>,
}

impl Config {
    /// Reads configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Empty values count as unset.
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let api_key = get("OPENAI_API_KEY").ok_or(ConfigError::MissingVar("OPENAI_API_KEY"))?;

        let defaults = GenerationParams::default();
        let params = GenerationParams {
            model: get("MODEL").unwrap_or(defaults.model),
            temperature: parse_or(&get, "TEMPERATURE", defaults.temperature)?,
            max_tokens: parse_or(&get, "MAX_TOKENS", defaults.max_tokens)?,
            top_p: parse_or(&get, "TOP_P", defaults.top_p)?,
        };

        let mut memory_capacity =
            parse_or(&get, "MEMORY_CAPACITY", crate::memory::DEFAULT_CAPACITY)?;
        if memory_capacity == 0 {
            warn!("MEMORY_CAPACITY of 0 raised to 1");
            memory_capacity = 1;
        }

        Ok(Self {
            host: get("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_or(&get, "PORT", 3000)?,
            service_name: get("SERVICE_NAME").unwrap_or_else(|| "chat-relay".to_string()),
            provider: ProviderConfig {
                api_key,
                base_url: get("PROVIDER_BASE_URL")
                    .unwrap_or_else(|| "https://api.openai.com/v1".to_string())
                    .trim_end_matches('/')
                    .to_string(),
                timeout: Duration::from_secs(parse_or(&get, "PROVIDER_TIMEOUT_SECS", 60)?),
                params,
            },
            memory_capacity,
            enforce_structure: parse_flag(&get, "ENFORCE_STRUCTURE")?,
            default_system_prompt: get("DEFAULT_SYSTEM_PROMPT"),
            static_dir: get("STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("./public")),
            body_limit: parse_or(&get, "BODY_LIMIT_BYTES", 1024 * 1024)?,
            cors_origin: get("CORS_ORIGIN"),
        })
    }
}

fn parse_or<T, G>(get: &G, name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    G: Fn(&str) -> Option<String>,
{
    match get(name) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidVar { name, value }),
        None => Ok(default),
    }
}

fn parse_flag<G>(get: &G, name: &'static str) -> Result<bool, ConfigError>
where
    G: Fn(&str) -> Option<String>,
{
    match get(name) {
        None => Ok(false),
        Some(value) => match value.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::InvalidVar { name, value }),
        },
    }
}
