use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use quiz_models::{FlashKind, LoginUser, SessionData};
use tracing::{debug, info};

use crate::middleware::session::Session;
use crate::state::AppState;

pub const LOGIN_EXPIRED_MESSAGE: &str = "User session has expired.";

/// Stores the login and starts its idle timer.
pub fn start_login(data: &mut SessionData, user: LoginUser, now_ms: i64, max_idle_ms: i64) {
    data.login(user);
    data.login_expires = Some(now_ms + max_idle_ms);
}

/// Drops a login whose idle timer ran out, otherwise slides the timer.
/// Returns `true` when the login was dropped.
pub fn refresh_login_expiry(data: &mut SessionData, now_ms: i64, max_idle_ms: i64) -> bool {
    let Some(expires) = data.login_expires else {
        return false;
    };

    if expires < now_ms {
        data.logout();
        data.flash(FlashKind::Info, LOGIN_EXPIRED_MESSAGE);
        return true;
    }

    data.login_expires = Some(now_ms + max_idle_ms);
    false
}

pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

pub fn max_idle_ms(state: &AppState) -> i64 {
    i64::try_from(state.config.session.login_max_idle.as_millis()).unwrap_or(i64::MAX / 2)
}

/// Runs on every page request before routing.
pub async fn check_login_expires(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Response {
    if let Some(session) = req.extensions().get::<Session>().cloned() {
        let has_login = session.read(|data| data.login_expires.is_some()).await;
        if has_login {
            let max_idle = max_idle_ms(&state);
            let expired = session
                .update(|data| refresh_login_expiry(data, now_ms(), max_idle))
                .await;
            if expired {
                info!("Login expired after inactivity");
            } else {
                debug!("Login expiry extended");
            }
        }
    }

    next.run(req).await
}
