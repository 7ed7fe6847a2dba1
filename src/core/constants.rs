//! Shared constants used across the application

/// Chat API used when neither config nor environment names one.
pub const DEFAULT_API_BASE_URL: &str = "https://kappa-ai-os7y.onrender.com";

/// Avatar assigned to custom characters created without an image.
pub const DEFAULT_CHARACTER_IMAGE_URL: &str =
    "https://images.unsplash.com/photo-1494790108377-be9c29b29330?auto=format&fit=crop&q=80";

/// Counterpart turn synthesized when a reply cannot be obtained.
pub const FALLBACK_REPLY: &str =
    "I'm sorry, I'm having trouble responding right now. Could you try again later?";

/// Per-character delay of the cosmetic typing reveal.
pub const DEFAULT_TYPING_DELAY_MS: u64 = 15;

pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

/// How many recent turns accompany an edge-function reply request.
pub const REPLY_HISTORY_WINDOW: usize = 10;

/// Service name under which account secrets are kept in the OS keyring.
pub const KEYRING_SERVICE: &str = "kappachat";
