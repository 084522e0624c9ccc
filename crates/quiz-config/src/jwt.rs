use crate::{Lookup, env_lookup, non_empty, parse_or};

/// Signing configuration for API tokens.
#[derive(Clone)]
pub struct JwtConfig {
    pub secret: String,
    /// API token lifetime in seconds
    pub api_token_expiry: i64,
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .field("api_token_expiry", &self.api_token_expiry)
            .finish()
    }
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self::from_lookup(&|_: &str| None)
    }
}

impl JwtConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(&env_lookup)
    }

    pub fn from_lookup(lookup: Lookup<'_>) -> Self {
        Self {
            secret: non_empty(lookup, "JWT_SECRET")
                .unwrap_or_else(|| "your-secret-key-change-in-production".to_string()),
            api_token_expiry: parse_or(lookup, "API_TOKEN_EXPIRY", 604800), // 7 days
        }
    }
}
