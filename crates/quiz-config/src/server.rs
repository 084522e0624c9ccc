use crate::{Lookup, env_lookup, non_empty, parse_or};

/// Listen address and public origin.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Public origin used to build OAuth callback URLs, without trailing slash
    pub base_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::from_lookup(&|_: &str| None)
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(&env_lookup)
    }

    pub fn from_lookup(lookup: Lookup<'_>) -> Self {
        Self {
            host: non_empty(lookup, "HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_or(lookup, "PORT", 3000),
            base_url: non_empty(lookup, "BASE_URL")
                .unwrap_or_else(|| "http://localhost:3000".to_string())
                .trim_end_matches('/')
                .to_string(),
        }
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Database connection settings.
#[derive(Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // connection strings carry passwords
        f.debug_struct("DatabaseConfig")
            .field("url", &"<redacted>")
            .field("max_connections", &self.max_connections)
            .finish()
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self::from_lookup(&|_: &str| None)
    }
}

impl DatabaseConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(&env_lookup)
    }

    pub fn from_lookup(lookup: Lookup<'_>) -> Self {
        Self {
            url: non_empty(lookup, "DATABASE_URL")
                .unwrap_or_else(|| "postgres://localhost/quiz".to_string()),
            max_connections: parse_or(lookup, "DATABASE_MAX_CONNECTIONS", 10),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_removed() {
        let lookup = |key: &str| (key == "BASE_URL").then(|| "https://quiz.example.com/".to_string());
        let config = ServerConfig::from_lookup(&lookup);
        assert_eq!(config.base_url, "https://quiz.example.com");
        assert_eq!(config.listen_addr(), "0.0.0.0:3000");
    }

    #[test]
    fn test_database_defaults() {
        let config = DatabaseConfig::default();
        assert_eq!(config.url, "postgres://localhost/quiz");
        assert_eq!(config.max_connections, 10);
        assert!(!format!("{:?}", config).contains("localhost"));
    }
}
