//! Path table for the page shell. CLI subcommands resolve to these routes
//! and `kappachat open <path>` accepts them directly.

use std::fmt;

use crate::core::session::Session;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    Characters,
    Conversation(String),
    About,
    Auth,
    NotFound(String),
}

impl Route {
    /// Resolve a path. Static segments match case-insensitively and a
    /// trailing slash is ignored; anything unrecognized is `NotFound`.
    pub fn parse(path: &str) -> Route {
        let trimmed = path.trim();
        let segments: Vec<&str> = trimmed
            .trim_start_matches('/')
            .trim_end_matches('/')
            .split('/')
            .filter(|segment| !segment.is_empty())
            .collect();

        match segments.as_slice() {
            [] if trimmed.starts_with('/') || trimmed.is_empty() => Route::Home,
            [page] if page.eq_ignore_ascii_case("characters") => Route::Characters,
            [page] if page.eq_ignore_ascii_case("about") => Route::About,
            [page] if page.eq_ignore_ascii_case("auth") => Route::Auth,
            [page, id] if page.eq_ignore_ascii_case("conversation") => {
                Route::Conversation((*id).to_string())
            }
            _ => Route::NotFound(trimmed.to_string()),
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::Characters => "/characters".to_string(),
            Route::Conversation(id) => format!("/conversation/{id}"),
            Route::About => "/about".to_string(),
            Route::Auth => "/auth".to_string(),
            Route::NotFound(path) => path.clone(),
        }
    }

    pub fn is_protected(&self) -> bool {
        matches!(self, Route::Conversation(_))
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path())
    }
}

/// Protected routes without a session land on the login page.
pub fn guard(route: Route, session: Option<&Session>) -> Route {
    if route.is_protected() && session.is_none() {
        Route::Auth
    } else {
        route
    }
}
