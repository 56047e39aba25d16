use std::collections::HashMap;
use std::env;
#[cfg(feature = "email")]
use std::time::Duration;

use crate::domain::DomainError;

const DEFAULT_PORT: u16 = 5000;
const DEFAULT_MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

/// Settings for the hosted LLM agent and its tools.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    pub api_token: Option<String>,
    pub base_url: String,
    pub model_id: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub max_steps: usize,
    pub search_url: String,
    pub image_url: String,
    pub image_model_id: String,
}

/// Settings for the tesseract executable.
#[derive(Debug, Clone)]
pub struct OcrConfig {
    pub tesseract_bin: String,
    pub language: Option<String>,
}

/// SMTP server and account. All four connection values are required.
#[cfg(feature = "email")]
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    /// Sender address, defaults to the login
    pub from: String,
    pub timeout: Duration,
    pub subject: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
    pub max_upload_bytes: usize,
    pub ocr: OcrConfig,
    pub agent: AgentConfig,
    #[cfg(feature = "email")]
    pub smtp: SmtpConfig,
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, DomainError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from a fixed set of variables.
    pub fn from_map(vars: &HashMap<String, String>) -> Result<Self, DomainError> {
        Self::from_lookup(|key| vars.get(key).cloned())
    }

    /// Build and validate configuration from any variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, DomainError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let agent = AgentConfig {
            api_token: get("HG_TOKEN"),
            base_url: get("AGENT_BASE_URL")
                .unwrap_or_else(|| "https://router.huggingface.co/v1".to_string()),
            model_id: get("AGENT_MODEL_ID")
                .unwrap_or_else(|| "Qwen/Qwen2.5-Coder-32B-Instruct".to_string()),
            max_tokens: parse_or(get("AGENT_MAX_TOKENS"), "AGENT_MAX_TOKENS", 2096)?,
            temperature: parse_or(get("AGENT_TEMPERATURE"), "AGENT_TEMPERATURE", 0.5)?,
            max_steps: parse_or(get("AGENT_MAX_STEPS"), "AGENT_MAX_STEPS", 6)?,
            search_url: get("SEARCH_API_URL")
                .unwrap_or_else(|| "https://api.duckduckgo.com".to_string()),
            image_url: get("IMAGE_API_URL")
                .unwrap_or_else(|| "https://router.huggingface.co/hf-inference/models".to_string()),
            image_model_id: get("IMAGE_MODEL_ID")
                .unwrap_or_else(|| "black-forest-labs/FLUX.1-schnell".to_string()),
        };

        if agent.max_steps == 0 {
            return Err(DomainError::Config(
                "AGENT_MAX_STEPS must be at least 1".to_string(),
            ));
        }

        let ocr = OcrConfig {
            tesseract_bin: get("TESSERACT_BIN").unwrap_or_else(|| "tesseract".to_string()),
            language: get("OCR_LANGUAGE"),
        };

        #[cfg(feature = "email")]
        let smtp = {
            let required = |key: &str| {
                get(key).ok_or_else(|| {
                    DomainError::Config(format!("missing required variable {}", key))
                })
            };

            let host = required("SMTP_SERVER")?;
            let port = required("SMTP_PORT")?
                .parse::<u16>()
                .map_err(|e| DomainError::Config(format!("invalid SMTP_PORT: {}", e)))?;
            let username = required("EMAIL_USER")?;
            let password = required("EMAIL_PASSWORD")?;
            let from = get("EMAIL_FROM").unwrap_or_else(|| username.clone());

            SmtpConfig {
                host,
                port,
                username,
                password,
                from,
                timeout: Duration::from_secs(parse_or(
                    get("SMTP_TIMEOUT_SECS"),
                    "SMTP_TIMEOUT_SECS",
                    10,
                )?),
                subject: get("EMAIL_SUBJECT")
                    .unwrap_or_else(|| "Texto extraído da imagem".to_string()),
            }
        };

        Ok(Self {
            port: parse_or(get("PORT"), "PORT", DEFAULT_PORT)?,
            cors_allowed_origins: get("CORS_ALLOWED_ORIGINS")
                .map(|s| {
                    s.split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_else(Vec::new),
            max_upload_bytes: parse_or(
                get("MAX_UPLOAD_BYTES"),
                "MAX_UPLOAD_BYTES",
                DEFAULT_MAX_UPLOAD_BYTES,
            )?,
            ocr,
            agent,
            #[cfg(feature = "email")]
            smtp,
        })
    }
}

fn parse_or<T>(value: Option<String>, key: &str, default: T) -> Result<T, DomainError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match value {
        Some(raw) => raw
            .parse()
            .map_err(|e| DomainError::Config(format!("invalid {}: {}", key, e))),
        None => Ok(default),
    }
}
