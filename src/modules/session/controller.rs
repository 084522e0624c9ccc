use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::{info, instrument, warn};

use quiz_core::AppError;
use quiz_models::{FlashKind, LoginForm, LoginUser};

use crate::middleware::session::Session;
use crate::modules::session::service::{max_idle_ms, now_ms, start_login};
use crate::modules::users::service::UserService;
use crate::state::AppState;
use crate::views::View;

pub const AUTH_FAILED_MESSAGE: &str = "Authentication has failed. Retry it again.";

#[derive(Debug, Default, Deserialize)]
pub struct RedirParams {
    pub redir: Option<String>,
}

/// Only local absolute paths are followed after login.
pub fn safe_redirect(redir: Option<&str>) -> &str {
    match redir {
        Some(path) if path.starts_with('/') && !path.starts_with("//") => path,
        _ => "/",
    }
}

pub async fn new(
    session: Session,
    Query(params): Query<RedirParams>,
) -> Result<Response, AppError> {
    View::new("session/new")
        .with("redir", params.redir.unwrap_or_default())
        .render(&session)
        .await
}

#[instrument(skip(state, session, form), fields(user.username = %form.username))]
pub async fn create(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    let Some(user) = UserService::authenticate(&state.db, &form.username, &form.password).await?
    else {
        warn!("Local login failed");
        session.flash(FlashKind::Error, AUTH_FAILED_MESSAGE).await;
        return Ok(Redirect::to("/login").into_response());
    };

    let login = LoginUser::from(&user);
    let max_idle = max_idle_ms(&state);
    session
        .update(|data| start_login(data, login, now_ms(), max_idle))
        .await;
    info!(user.id = %user.id, "User logged in");

    Ok(Redirect::to(safe_redirect(form.redir.as_deref())).into_response())
}

pub async fn destroy(session: Session) -> Result<Response, AppError> {
    session.update(|data| data.logout()).await;
    Ok(Redirect::to("/login").into_response())
}
