use crate::core::config::data::{Config, ConfigKey};

impl Config {
    /// Render every key with its stored value, masking the backend key.
    pub fn describe(&self) -> Vec<(ConfigKey, String)> {
        ConfigKey::ALL
            .into_iter()
            .map(|key| {
                let value = match key {
                    ConfigKey::ApiBaseUrl => self.api_base_url.clone(),
                    ConfigKey::SupabaseUrl => self.supabase_url.clone(),
                    ConfigKey::SupabaseAnonKey => self.supabase_anon_key.as_deref().map(mask),
                    ConfigKey::ReplyBackend => self.reply_backend.map(|b| b.as_str().to_string()),
                    ConfigKey::TypingDelayMs => self.typing_delay_ms.map(|v| v.to_string()),
                    ConfigKey::RequestTimeoutSecs => {
                        self.request_timeout_secs.map(|v| v.to_string())
                    }
                };
                (key, value.unwrap_or_else(|| "(unset)".to_string()))
            })
            .collect()
    }

    pub fn print_all(&self) {
        println!("Current configuration:");
        for (key, value) in self.describe() {
            println!("  {}: {}", key.as_str(), value);
        }
    }
}

fn mask(secret: &str) -> String {
    let tail: String = secret
        .chars()
        .rev()
        .take(4)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    format!("…{tail}")
}
