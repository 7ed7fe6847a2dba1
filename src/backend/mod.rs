//! Data backend access (PostgREST-compatible tables plus edge functions).

pub mod supabase;

pub use supabase::{SupabaseClient, SupabaseConfig};

#[derive(Debug)]
pub enum BackendError {
    /// No data backend is configured for this installation.
    Unconfigured,
    /// The request never produced an HTTP response.
    Transport(reqwest::Error),
    /// The backend answered with a non-2xx status.
    Status { status: u16, body: String },
    /// The response body did not match the expected shape.
    Decode(String),
}

impl std::fmt::Display for BackendError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendError::Unconfigured => write!(
                f,
                "No data backend configured (set supabase-url and supabase-anon-key)"
            ),
            BackendError::Transport(err) => write!(f, "Could not reach the data backend: {err}"),
            BackendError::Status { status, body } => {
                write!(f, "Data backend request failed ({status}): {body}")
            }
            BackendError::Decode(message) => {
                write!(f, "Unexpected data backend response: {message}")
            }
        }
    }
}

impl std::error::Error for BackendError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BackendError::Transport(err) => Some(err),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            BackendError::Decode(err.to_string())
        } else {
            BackendError::Transport(err)
        }
    }
}
