//! # Quiz Config
//!
//! Configuration for the Quiz application, loaded once at startup.
//!
//! Every config struct offers `from_env()` (reads the process environment) and
//! `from_lookup(..)` (reads through any `Fn(&str) -> Option<String>`), so the set
//! of registered routes can be derived from a plain value in tests without
//! touching the process environment.
//!
//! - [`app`]: [`AppConfig`], the aggregate handed to the router builder
//! - [`cors`]: CORS configuration for the JSON API
//! - [`jwt`]: API token configuration
//! - [`oauth`]: Third-party login providers and their credential pairs
//! - [`server`]: Listen address, public base URL and database settings
//! - [`session`]: Session cookie and login idle timeout
//!
//! # Example
//!
//! ```ignore
//! use quiz_config::AppConfig;
//!
//! let config = AppConfig::from_env();
//! if config.open_register {
//!     println!("Anyone can sign up");
//! }
//! ```

pub mod app;
pub mod cors;
pub mod jwt;
pub mod oauth;
pub mod server;
pub mod session;

// Re-export commonly used types at crate root
pub use app::AppConfig;
pub use cors::CorsConfig;
pub use jwt::JwtConfig;
pub use oauth::{OAuthConfig, OAuthCredentials, OAuthProvider};
pub use server::{DatabaseConfig, ServerConfig};
pub use session::SessionConfig;

/// Source of configuration values, keyed by environment variable name.
pub type Lookup<'a> = &'a dyn Fn(&str) -> Option<String>;

/// Reads the process environment.
pub fn env_lookup(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Value of `key`, trimmed; empty values count as absent.
pub(crate) fn non_empty(lookup: Lookup<'_>, key: &str) -> Option<String> {
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub(crate) fn parse_or<T>(lookup: Lookup<'_>, key: &str, default: T) -> T
where
    T: std::str::FromStr,
{
    match non_empty(lookup, key) {
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %raw, "Ignoring unparsable configuration value");
            default
        }),
        None => default,
    }
}

/// Boolean-like flag: on for any non-empty value except `0`, `false`, `no`, `off`.
pub(crate) fn flag(lookup: Lookup<'_>, key: &str) -> bool {
    match non_empty(lookup, key) {
        Some(v) => !matches!(v.to_ascii_lowercase().as_str(), "0" | "false" | "no" | "off"),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup_of(pairs: &'static [(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
        move |key: &str| {
            pairs
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.to_string())
        }
    }

    #[test]
    fn test_flag_values() {
        let lookup = lookup_of(&[
            ("A", "1"),
            ("B", "true"),
            ("C", "yes please"),
            ("D", "false"),
            ("E", "OFF"),
            ("F", "0"),
            ("G", "   "),
        ]);
        assert!(flag(&lookup, "A"));
        assert!(flag(&lookup, "B"));
        assert!(flag(&lookup, "C"));
        assert!(!flag(&lookup, "D"));
        assert!(!flag(&lookup, "E"));
        assert!(!flag(&lookup, "F"));
        assert!(!flag(&lookup, "G"));
        assert!(!flag(&lookup, "MISSING"));
    }

    #[test]
    fn test_parse_or_falls_back() {
        let lookup = lookup_of(&[("PORT", "8080"), ("BAD", "eighty")]);
        assert_eq!(parse_or(&lookup, "PORT", 3000u16), 8080);
        assert_eq!(parse_or(&lookup, "BAD", 3000u16), 3000);
        assert_eq!(parse_or(&lookup, "MISSING", 3000u16), 3000);
    }
}
