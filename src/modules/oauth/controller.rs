use axum::{
    Extension,
    extract::{Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use quiz_config::{OAuthCredentials, OAuthProvider};
use quiz_core::AppError;
use quiz_models::{FlashKind, LoginUser, OAuthState};

use crate::middleware::session::Session;
use crate::modules::oauth::provider::{authorize_url, callback_url, endpoints};
use crate::modules::oauth::service::OAuthService;
use crate::modules::session::controller::AUTH_FAILED_MESSAGE;
use crate::modules::session::service::{max_idle_ms, now_ms, start_login};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

fn credentials(state: &AppState, provider: OAuthProvider) -> Result<OAuthCredentials, AppError> {
    state
        .config
        .oauth
        .credentials(provider)
        .cloned()
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Not Found: /auth/{}", provider)))
}

/// Redirects to the provider's consent page.
#[instrument(skip(state, session), fields(provider = %provider))]
pub async fn start(
    State(state): State<AppState>,
    Extension(provider): Extension<OAuthProvider>,
    session: Session,
) -> Result<Response, AppError> {
    let credentials = credentials(&state, provider)?;
    let oauth_state = Uuid::new_v4().simple().to_string();
    let code_verifier = endpoints(provider)
        .pkce
        .then(|| format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple()));

    let url = authorize_url(
        provider,
        &credentials,
        &callback_url(&state.config.server.base_url, provider),
        &oauth_state,
        code_verifier.as_deref(),
    )?;

    session
        .update(|data| {
            data.oauth_state = Some(OAuthState {
                provider: provider.slug().to_string(),
                state: oauth_state,
                code_verifier,
            })
        })
        .await;

    Ok((StatusCode::SEE_OTHER, [(header::LOCATION, url.to_string())]).into_response())
}

#[instrument(skip(state, session, params), fields(provider = %provider))]
pub async fn callback(
    State(state): State<AppState>,
    Extension(provider): Extension<OAuthProvider>,
    session: Session,
    Query(params): Query<CallbackParams>,
) -> Result<Response, AppError> {
    let credentials = credentials(&state, provider)?;
    let pending = session.update(|data| data.oauth_state.take()).await;

    let Some(pending) = pending.filter(|p| {
        p.provider == provider.slug() && params.state.as_deref() == Some(p.state.as_str())
    }) else {
        warn!("OAuth state mismatch");
        return Err(AppError::forbidden(anyhow::anyhow!("Invalid OAuth state")));
    };

    let Some(code) = params.code.as_deref() else {
        warn!(error = ?params.error, "Provider denied authorization");
        session.flash(FlashKind::Error, AUTH_FAILED_MESSAGE).await;
        return Ok(Redirect::to("/login").into_response());
    };

    let redirect_uri = callback_url(&state.config.server.base_url, provider);
    let access_token = OAuthService::exchange_code(
        &state.http,
        provider,
        &credentials,
        code,
        &redirect_uri,
        pending.code_verifier.as_deref(),
    )
    .await?;
    let profile = OAuthService::fetch_profile(&state.http, provider, &access_token).await?;
    let user = OAuthService::find_or_create_user(&state.db, provider, &profile).await?;

    let login = LoginUser::from(&user);
    let max_idle = max_idle_ms(&state);
    session
        .update(|data| start_login(data, login, now_ms(), max_idle))
        .await;
    info!(user.id = %user.id, "User logged in through OAuth");

    Ok(Redirect::to("/").into_response())
}
