use crate::{
    CorsConfig, DatabaseConfig, JwtConfig, Lookup, OAuthConfig, ServerConfig, SessionConfig,
    env_lookup, flag,
};

/// Everything the application reads from its deployment environment.
///
/// Built once at startup and handed to the router builder; nothing else in the
/// application reads environment variables.
#[derive(Clone, Debug, Default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub session: SessionConfig,
    pub jwt: JwtConfig,
    pub cors: CorsConfig,
    pub oauth: OAuthConfig,
    /// Anonymous visitors may create accounts (`QUIZ_OPEN_REGISTER`)
    pub open_register: bool,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(&env_lookup)
    }

    pub fn from_lookup(lookup: Lookup<'_>) -> Self {
        Self {
            server: ServerConfig::from_lookup(lookup),
            database: DatabaseConfig::from_lookup(lookup),
            session: SessionConfig::from_lookup(lookup),
            jwt: JwtConfig::from_lookup(lookup),
            cors: CorsConfig::from_lookup(lookup),
            oauth: OAuthConfig::from_lookup(lookup),
            open_register: flag(lookup, "QUIZ_OPEN_REGISTER"),
        }
    }
}
