//! URL helpers shared by the API and backend clients.
//!
//! Base URLs come from user configuration and frequently carry trailing
//! slashes; endpoints are joined here so neither side has to care.

/// Strip trailing slashes from a configured base URL.
///
/// ```
/// use kappachat::utils::url::normalize_base_url;
///
/// assert_eq!(normalize_base_url("https://kappa.example.com/"), "https://kappa.example.com");
/// assert_eq!(normalize_base_url("https://kappa.example.com///"), "https://kappa.example.com");
/// ```
pub fn normalize_base_url(base_url: &str) -> String {
    base_url.trim().trim_end_matches('/').to_string()
}

/// Join a base URL and an endpoint path with exactly one slash.
///
/// ```
/// use kappachat::utils::url::construct_api_url;
///
/// assert_eq!(
///     construct_api_url("https://kappa.example.com/", "/history"),
///     "https://kappa.example.com/history"
/// );
/// ```
pub fn construct_api_url(base_url: &str, endpoint: &str) -> String {
    let normalized_base = normalize_base_url(base_url);
    let endpoint = endpoint.trim_start_matches('/');
    format!("{}/{}", normalized_base, endpoint)
}

/// True when `value` looks like a canonical hyphenated UUID.
///
/// User-owned characters carry server-issued UUIDs while built-ins use short
/// slugs, so this is how a bare id is classified before hitting the backend.
pub fn looks_like_uuid(value: &str) -> bool {
    uuid::Uuid::try_parse(value)
        .map(|parsed| parsed.hyphenated().to_string() == value.to_ascii_lowercase())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_trailing_slashes() {
        assert_eq!(
            normalize_base_url("https://kappa.example.com"),
            "https://kappa.example.com"
        );
        assert_eq!(
            normalize_base_url("https://kappa.example.com/"),
            "https://kappa.example.com"
        );
        assert_eq!(
            normalize_base_url("  https://kappa.example.com// "),
            "https://kappa.example.com"
        );
        assert_eq!(normalize_base_url(""), "");
        assert_eq!(normalize_base_url("///"), "");
    }

    #[test]
    fn construct_joins_with_single_slash() {
        let cases = [
            ("https://kappa.example.com", "login", "https://kappa.example.com/login"),
            ("https://kappa.example.com/", "login", "https://kappa.example.com/login"),
            ("https://kappa.example.com", "/chat", "https://kappa.example.com/chat"),
            (
                "https://db.example.co/",
                "///rest/v1/characters",
                "https://db.example.co/rest/v1/characters",
            ),
        ];

        for (base, endpoint, expected) in cases {
            assert_eq!(
                construct_api_url(base, endpoint),
                expected,
                "base={base:?} endpoint={endpoint:?}"
            );
        }
    }

    #[test]
    fn uuid_detection_matches_server_ids_only() {
        assert!(looks_like_uuid("6f1c1a8e-2b7d-4e4b-9a55-0c2f1f0f7d11"));
        assert!(looks_like_uuid("6F1C1A8E-2B7D-4E4B-9A55-0C2F1F0F7D11"));
        assert!(!looks_like_uuid("philosopher"));
        assert!(!looks_like_uuid("6f1c1a8e2b7d4e4b9a550c2f1f0f7d11"));
        assert!(!looks_like_uuid(""));
    }
}
