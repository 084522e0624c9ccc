use std::time::Duration;

use crate::{Lookup, env_lookup, flag, parse_or};

/// Session cookie and login timeout settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionConfig {
    /// Name of the cookie carrying the session id
    pub cookie_name: String,
    /// How long an untouched session is kept by the store
    pub ttl: Duration,
    /// Idle time after which a login expires (sliding)
    pub login_max_idle: Duration,
    /// Whether the cookie is flagged `Secure`
    pub cookie_secure: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::from_lookup(&|_: &str| None)
    }
}

impl SessionConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(&env_lookup)
    }

    pub fn from_lookup(lookup: Lookup<'_>) -> Self {
        Self {
            cookie_name: "quiz_sid".to_string(),
            ttl: Duration::from_secs(parse_or(lookup, "SESSION_TTL", 4 * 60 * 60)),
            login_max_idle: Duration::from_secs(parse_or(lookup, "LOGIN_MAX_IDLE", 5 * 60)),
            cookie_secure: flag(lookup, "SESSION_COOKIE_SECURE"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SessionConfig::default();
        assert_eq!(config.ttl, Duration::from_secs(14400));
        assert_eq!(config.login_max_idle, Duration::from_secs(300));
        assert!(!config.cookie_secure);
    }

    #[test]
    fn test_overrides() {
        let lookup = |key: &str| match key {
            "LOGIN_MAX_IDLE" => Some("60".to_string()),
            "SESSION_COOKIE_SECURE" => Some("on".to_string()),
            _ => None,
        };
        let config = SessionConfig::from_lookup(&lookup);
        assert_eq!(config.login_max_idle, Duration::from_secs(60));
        assert!(config.cookie_secure);
    }
}
