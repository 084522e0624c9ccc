//! API token loader.
//!
//! Accepts `Authorization: Bearer <token>` or a `token` query parameter,
//! verifies it and stores the claims in [`Loaded::token`].

use axum::{
    extract::{Query, Request, State},
    http::{HeaderMap, Uri, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};
use serde::Deserialize;
use tracing::debug;

use quiz_auth::verify_api_token;
use quiz_core::AppError;

use crate::middleware::autoload::Loaded;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
struct TokenQuery {
    token: Option<String>,
}

/// The raw token of a request, header first.
pub fn extract_token(headers: &HeaderMap, uri: &Uri) -> Option<String> {
    let from_header = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string());

    from_header.or_else(|| {
        let Query(query) = Query::<TokenQuery>::try_from_uri(uri).ok()?;
        query.token.filter(|token| !token.is_empty())
    })
}

pub async fn require_api_token(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_token(req.headers(), req.uri()).ok_or_else(|| {
        debug!("Request without API token");
        AppError::unauthorized(anyhow::anyhow!("Authentication token required"))
    })?;

    let claims = verify_api_token(&token, &state.config.jwt)?;

    let mut loaded = req.extensions().get::<Loaded>().cloned().unwrap_or_default();
    loaded.token = Some(claims);
    req.extensions_mut().insert(loaded);

    Ok(next.run(req).await)
}
