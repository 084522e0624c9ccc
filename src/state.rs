use std::sync::Arc;

use quiz_config::AppConfig;
use sqlx::PgPool;

use crate::middleware::session::{PgSessionStore, SessionStore};

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Arc<AppConfig>,
    pub sessions: Arc<dyn SessionStore>,
    /// Client for OAuth provider calls
    pub http: reqwest::Client,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl AppState {
    pub fn new(db: PgPool, config: AppConfig, sessions: Arc<dyn SessionStore>) -> Self {
        Self {
            db,
            config: Arc::new(config),
            sessions,
            http: reqwest::Client::new(),
        }
    }
}

/// Connects to the database and keeps sessions in it.
pub async fn init_app_state(config: AppConfig) -> Result<AppState, sqlx::Error> {
    let db = quiz_db::init_db_pool(&config.database).await?;
    let sessions = Arc::new(PgSessionStore::new(db.clone()));
    Ok(AppState::new(db, config, sessions))
}

#[cfg(any(test, feature = "test-utils"))]
impl AppState {
    /// State keeping sessions in memory, for tests.
    pub fn with_memory_sessions(db: PgPool, config: AppConfig) -> Self {
        use crate::middleware::session::MemorySessionStore;

        Self::new(db, config, Arc::new(MemorySessionStore::new()))
    }
}
