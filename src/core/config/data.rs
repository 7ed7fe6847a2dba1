use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Where counterpart replies come from.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ReplyBackend {
    /// `POST /chat` on the chat API.
    #[default]
    Api,
    /// The backend's `generate-ai-response` function.
    EdgeFunction,
}

impl ReplyBackend {
    pub fn as_str(self) -> &'static str {
        match self {
            ReplyBackend::Api => "api",
            ReplyBackend::EdgeFunction => "edge-function",
        }
    }
}

impl FromStr for ReplyBackend {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "api" => Ok(ReplyBackend::Api),
            "edge-function" | "edge" | "function" => Ok(ReplyBackend::EdgeFunction),
            other => Err(format!(
                "unknown reply backend '{other}' (expected 'api' or 'edge-function')"
            )),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
pub struct Config {
    /// Base URL of the chat API (register, login, chat, history)
    pub api_base_url: Option<String>,
    /// Project URL of the data backend (e.g., https://xyz.supabase.co)
    pub supabase_url: Option<String>,
    /// Public anon key for the data backend
    pub supabase_anon_key: Option<String>,
    /// Source of counterpart replies
    pub reply_backend: Option<ReplyBackend>,
    /// Delay between revealed characters of a reply, in milliseconds (0 disables)
    pub typing_delay_ms: Option<u64>,
    /// Timeout applied to every HTTP request, in seconds
    pub request_timeout_secs: Option<u64>,
}

/// Keys accepted by `kappachat set` / `kappachat unset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    ApiBaseUrl,
    SupabaseUrl,
    SupabaseAnonKey,
    ReplyBackend,
    TypingDelayMs,
    RequestTimeoutSecs,
}

impl ConfigKey {
    pub const ALL: [ConfigKey; 6] = [
        ConfigKey::ApiBaseUrl,
        ConfigKey::SupabaseUrl,
        ConfigKey::SupabaseAnonKey,
        ConfigKey::ReplyBackend,
        ConfigKey::TypingDelayMs,
        ConfigKey::RequestTimeoutSecs,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ConfigKey::ApiBaseUrl => "api-base-url",
            ConfigKey::SupabaseUrl => "supabase-url",
            ConfigKey::SupabaseAnonKey => "supabase-anon-key",
            ConfigKey::ReplyBackend => "reply-backend",
            ConfigKey::TypingDelayMs => "typing-delay-ms",
            ConfigKey::RequestTimeoutSecs => "request-timeout-secs",
        }
    }

    pub fn parse(key: &str) -> Option<Self> {
        let normalized = key.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|candidate| candidate.as_str() == normalized)
    }
}

/// Get a user-friendly display string for a path
/// Converts absolute paths to use ~ notation on Unix-like systems when possible
pub fn path_display<P: AsRef<Path>>(path: P) -> String {
    let path = path.as_ref();

    #[cfg(unix)]
    {
        if let Some(home) = std::env::var_os("HOME") {
            let home_path = PathBuf::from(home);
            if let Ok(relative) = path.strip_prefix(&home_path) {
                return format!("~/{}", relative.display());
            }
        }
    }

    path.display().to_string()
}

impl Config {
    /// Assign a value from its textual form, validating numbers and enums.
    pub fn set_value(&mut self, key: ConfigKey, value: &str) -> Result<(), String> {
        let value = value.trim();
        if value.is_empty() {
            return Err(format!("a value is required for {}", key.as_str()));
        }
        match key {
            ConfigKey::ApiBaseUrl => self.api_base_url = Some(value.to_string()),
            ConfigKey::SupabaseUrl => self.supabase_url = Some(value.to_string()),
            ConfigKey::SupabaseAnonKey => self.supabase_anon_key = Some(value.to_string()),
            ConfigKey::ReplyBackend => self.reply_backend = Some(value.parse()?),
            ConfigKey::TypingDelayMs => {
                self.typing_delay_ms = Some(parse_number(key, value)?);
            }
            ConfigKey::RequestTimeoutSecs => {
                let secs = parse_number(key, value)?;
                if secs == 0 {
                    return Err("request-timeout-secs must be greater than zero".to_string());
                }
                self.request_timeout_secs = Some(secs);
            }
        }
        Ok(())
    }

    pub fn unset_value(&mut self, key: ConfigKey) {
        match key {
            ConfigKey::ApiBaseUrl => self.api_base_url = None,
            ConfigKey::SupabaseUrl => self.supabase_url = None,
            ConfigKey::SupabaseAnonKey => self.supabase_anon_key = None,
            ConfigKey::ReplyBackend => self.reply_backend = None,
            ConfigKey::TypingDelayMs => self.typing_delay_ms = None,
            ConfigKey::RequestTimeoutSecs => self.request_timeout_secs = None,
        }
    }
}

fn parse_number(key: ConfigKey, value: &str) -> Result<u64, String> {
    value
        .parse::<u64>()
        .map_err(|_| format!("{} expects a whole number, got '{value}'", key.as_str()))
}
