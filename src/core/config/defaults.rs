//! Effective settings: environment overrides first, then the config file,
//! then built-in defaults.

use crate::core::config::data::{Config, ReplyBackend};
use crate::core::constants::{
    DEFAULT_API_BASE_URL, DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_TYPING_DELAY_MS,
};
use std::time::Duration;

pub const API_URL_ENV: &str = "KAPPACHAT_API_URL";
pub const SUPABASE_URL_ENV: &str = "KAPPACHAT_SUPABASE_URL";
pub const SUPABASE_KEY_ENV: &str = "KAPPACHAT_SUPABASE_KEY";

/// Connection details for the data backend, present only when both the
/// project URL and the anon key are known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendSettings {
    pub url: String,
    pub anon_key: String,
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

impl Config {
    pub fn api_base_url(&self) -> String {
        env_value(API_URL_ENV)
            .or_else(|| self.api_base_url.clone())
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string())
    }

    pub fn backend_settings(&self) -> Option<BackendSettings> {
        let url = env_value(SUPABASE_URL_ENV).or_else(|| self.supabase_url.clone())?;
        let anon_key = env_value(SUPABASE_KEY_ENV).or_else(|| self.supabase_anon_key.clone())?;
        Some(BackendSettings { url, anon_key })
    }

    pub fn effective_reply_backend(&self) -> ReplyBackend {
        self.reply_backend.unwrap_or_default()
    }

    pub fn typing_delay(&self) -> Duration {
        Duration::from_millis(self.typing_delay_ms.unwrap_or(DEFAULT_TYPING_DELAY_MS))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(
            self.request_timeout_secs
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
        )
    }
}
