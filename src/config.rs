use std::env;
use std::time::Duration;

use crate::errors::AppError;

/// One year. Larger values overflow `chrono::Duration`.
pub const MAX_SESSION_TTL_MINUTES: i64 = 525_600;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    /// `None` when the variable is unset or blank; the gateway then skips the provider.
    pub openai_api_key: Option<String>,
    pub openai_model: String,
    pub openai_base_url: String,
    pub completion_timeout_secs: u64,
    pub session_ttl_minutes: i64,
    pub cors_allow_any: bool,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            openai_api_key: env::var("OPENAI_API_KEY")
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),
            openai_model: env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string()),
            openai_base_url: env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| "https://api.openai.com/v1".to_string()),
            completion_timeout_secs: env::var("COMPLETION_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(15),
            session_ttl_minutes: env::var("SESSION_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
            cors_allow_any: env::var("CORS_ALLOW_ANY")
                .map(|v| matches!(v.as_str(), "1" | "true" | "yes"))
                .unwrap_or(false),
        }
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.completion_timeout_secs == 0 {
            return Err(AppError::Config(
                "COMPLETION_TIMEOUT_SECS must be greater than zero".to_string(),
            ));
        }
        if self.session_ttl_minutes <= 0 {
            return Err(AppError::Config(
                "SESSION_TTL_MINUTES must be greater than zero".to_string(),
            ));
        }
        if self.session_ttl_minutes > MAX_SESSION_TTL_MINUTES {
            return Err(AppError::Config(format!(
                "SESSION_TTL_MINUTES must be at most {MAX_SESSION_TTL_MINUTES}"
            )));
        }
        Ok(())
    }

    pub fn completion_timeout(&self) -> Duration {
        Duration::from_secs(self.completion_timeout_secs)
    }

    pub fn session_ttl(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.session_ttl_minutes.clamp(1, MAX_SESSION_TTL_MINUTES))
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            openai_api_key: None,
            openai_model: "gpt-4o-mini".to_string(),
            openai_base_url: "https://api.openai.com/v1".to_string(),
            completion_timeout_secs: 15,
            session_ttl_minutes: 30,
            cors_allow_any: false,
        }
    }
}
