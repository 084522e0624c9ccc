//! Cookie-backed sessions.
//!
//! The session layer resolves the `quiz_sid` cookie into a [`Session`] handle
//! stored in the request extensions. Handlers and later middleware read and
//! modify it through the handle; when the response comes back the data is
//! written to the [`SessionStore`] if anything changed, and the cookie is
//! (re)issued.
//!
//! Unknown or expired session ids are never reused: a fresh id is minted on the
//! first write.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderValue, header::SET_COOKIE, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tokio::sync::Mutex;
use tracing::{debug, error, instrument};

use quiz_config::SessionConfig;
use quiz_core::AppError;
use quiz_models::{Flash, FlashKind, LoginUser, SessionData};

use crate::state::AppState;

type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, AppError>> + Send + 'a>>;

/// Backend holding session data between requests.
pub trait SessionStore: Send + Sync {
    /// Data of a live session, `None` for unknown or expired ids.
    fn load<'a>(&'a self, sid: &'a str) -> StoreFuture<'a, Option<SessionData>>;

    /// Creates or replaces a session.
    fn save<'a>(
        &'a self,
        sid: &'a str,
        data: &'a SessionData,
        expires: DateTime<Utc>,
    ) -> StoreFuture<'a, ()>;

    /// Deletes expired sessions, returning how many were removed.
    fn sweep(&self) -> StoreFuture<'_, u64>;
}

/// Sessions in the `sessions` table.
#[derive(Clone, Debug)]
pub struct PgSessionStore {
    db: PgPool,
}

impl PgSessionStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

impl SessionStore for PgSessionStore {
    fn load<'a>(&'a self, sid: &'a str) -> StoreFuture<'a, Option<SessionData>> {
        Box::pin(async move {
            let data = sqlx::query_scalar::<_, sqlx::types::Json<SessionData>>(
                "SELECT data FROM sessions WHERE sid = $1 AND expires > NOW()",
            )
            .bind(sid)
            .fetch_optional(&self.db)
            .await
            .map_err(|e| {
                error!(error = %e, "Database error loading session");
                AppError::database(e)
            })?;

            Ok(data.map(|json| json.0))
        })
    }

    fn save<'a>(
        &'a self,
        sid: &'a str,
        data: &'a SessionData,
        expires: DateTime<Utc>,
    ) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            sqlx::query(
                "INSERT INTO sessions (sid, expires, data) VALUES ($1, $2, $3)
                 ON CONFLICT (sid) DO UPDATE
                 SET expires = EXCLUDED.expires, data = EXCLUDED.data, updated_at = NOW()",
            )
            .bind(sid)
            .bind(expires)
            .bind(sqlx::types::Json(data))
            .execute(&self.db)
            .await
            .map_err(|e| {
                error!(error = %e, "Database error saving session");
                AppError::database(e)
            })?;

            Ok(())
        })
    }

    fn sweep(&self) -> StoreFuture<'_, u64> {
        Box::pin(async move {
            let result = sqlx::query("DELETE FROM sessions WHERE expires <= NOW()")
                .execute(&self.db)
                .await
                .map_err(AppError::database)?;

            Ok(result.rows_affected())
        })
    }
}

/// Process-local sessions, for tests and single-node development.
#[derive(Default)]
pub struct MemorySessionStore {
    sessions: Mutex<HashMap<String, (SessionData, DateTime<Utc>)>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn load<'a>(&'a self, sid: &'a str) -> StoreFuture<'a, Option<SessionData>> {
        Box::pin(async move {
            let sessions = self.sessions.lock().await;
            Ok(sessions
                .get(sid)
                .filter(|(_, expires)| *expires > Utc::now())
                .map(|(data, _)| data.clone()))
        })
    }

    fn save<'a>(
        &'a self,
        sid: &'a str,
        data: &'a SessionData,
        expires: DateTime<Utc>,
    ) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            self.sessions
                .lock()
                .await
                .insert(sid.to_string(), (data.clone(), expires));
            Ok(())
        })
    }

    fn sweep(&self) -> StoreFuture<'_, u64> {
        Box::pin(async move {
            let mut sessions = self.sessions.lock().await;
            let before = sessions.len();
            let now = Utc::now();
            sessions.retain(|_, (_, expires)| *expires > now);
            Ok((before - sessions.len()) as u64)
        })
    }
}

#[derive(Debug, Default)]
struct SessionInner {
    data: SessionData,
    dirty: bool,
}

/// Per-request handle on the session data.
#[derive(Clone, Debug, Default)]
pub struct Session {
    inner: Arc<Mutex<SessionInner>>,
}

impl Session {
    pub fn new(data: SessionData) -> Self {
        Self {
            inner: Arc::new(Mutex::new(SessionInner { data, dirty: false })),
        }
    }

    pub async fn read<R>(&self, f: impl FnOnce(&SessionData) -> R) -> R {
        let inner = self.inner.lock().await;
        f(&inner.data)
    }

    /// Mutates the data and marks the session for saving.
    pub async fn update<R>(&self, f: impl FnOnce(&mut SessionData) -> R) -> R {
        let mut inner = self.inner.lock().await;
        inner.dirty = true;
        f(&mut inner.data)
    }

    pub async fn login_user(&self) -> Option<LoginUser> {
        self.read(|data| data.login_user.clone()).await
    }

    pub async fn flash(&self, kind: FlashKind, text: impl Into<String>) {
        let text = text.into();
        self.update(|data| data.flash(kind, text)).await;
    }

    pub async fn take_flash(&self) -> Vec<Flash> {
        let mut inner = self.inner.lock().await;
        if inner.data.flash.is_empty() {
            return Vec::new();
        }
        inner.dirty = true;
        inner.data.take_flash()
    }

    async fn snapshot(&self) -> Option<SessionData> {
        let inner = self.inner.lock().await;
        inner.dirty.then(|| inner.data.clone())
    }
}

impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or_else(|| AppError::internal(anyhow::anyhow!("Session layer is not installed")))
    }
}

fn session_cookie(config: &SessionConfig, sid: &str) -> Option<HeaderValue> {
    let cookie = Cookie::build((config.cookie_name.clone(), sid.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(config.cookie_secure)
        .build();

    HeaderValue::from_str(&cookie.to_string()).ok()
}

/// Loads the session before the request and persists it afterwards.
#[instrument(skip_all, name = "session")]
pub async fn session_layer(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let config = &state.config.session;
    let jar = CookieJar::from_headers(req.headers());
    let cookie_sid = jar.get(&config.cookie_name).map(|c| c.value().to_string());

    let (sid, data) = match cookie_sid {
        Some(sid) => match state.sessions.load(&sid).await {
            Ok(Some(data)) => (Some(sid), data),
            Ok(None) => {
                debug!("Unknown or expired session id, starting a new session");
                (None, SessionData::default())
            }
            Err(e) => return e.into_response(),
        },
        None => (None, SessionData::default()),
    };

    let session = Session::new(data);
    req.extensions_mut().insert(session.clone());

    let mut response = next.run(req).await;

    let Some(data) = session.snapshot().await else {
        return response;
    };

    let sid = sid.unwrap_or_else(|| uuid::Uuid::new_v4().simple().to_string());
    let expires = Utc::now() + chrono::Duration::seconds(config.ttl.as_secs() as i64);

    if let Err(e) = state.sessions.save(&sid, &data, expires).await {
        return e.into_response();
    }

    if let Some(cookie) = session_cookie(config, &sid) {
        response.headers_mut().append(SET_COOKIE, cookie);
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_models::UserId;

    #[tokio::test]
    async fn test_memory_store_round_trip_and_sweep() {
        let store = MemorySessionStore::new();
        let data = SessionData {
            back_url: Some("/quizzes".into()),
            ..Default::default()
        };

        store
            .save("live", &data, Utc::now() + chrono::Duration::hours(1))
            .await
            .unwrap();
        store
            .save("stale", &data, Utc::now() - chrono::Duration::seconds(1))
            .await
            .unwrap();

        assert_eq!(store.load("live").await.unwrap(), Some(data));
        assert_eq!(store.load("stale").await.unwrap(), None);
        assert_eq!(store.sweep().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_reads_do_not_dirty_the_session() {
        let session = Session::new(SessionData::default());
        assert!(session.login_user().await.is_none());
        assert!(session.take_flash().await.is_empty());
        assert!(session.snapshot().await.is_none());
    }

    #[tokio::test]
    async fn test_updates_dirty_the_session() {
        let session = Session::default();
        session
            .update(|data| {
                data.login(LoginUser {
                    id: UserId(1),
                    username: "admin".into(),
                    is_admin: true,
                    account_type_id: 0,
                })
            })
            .await;
        let saved = session.snapshot().await.unwrap();
        assert_eq!(saved.login_user.map(|u| u.username), Some("admin".into()));
    }

    #[test]
    fn test_session_cookie_attributes() {
        let config = SessionConfig::default();
        let value = session_cookie(&config, "abc").unwrap();
        let value = value.to_str().unwrap();
        assert!(value.starts_with("quiz_sid=abc"));
        assert!(value.contains("HttpOnly"));
        assert!(value.contains("Path=/"));
        assert!(!value.contains("Secure"));
    }
}
