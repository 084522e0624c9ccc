//! Restoration bookmarks.
//!
//! GETs to a few list pages remember their URL in the session; actions that
//! finish somewhere other than where they started redirect to `/goback`, which
//! returns to the remembered page.

use axum::{
    extract::{MatchedPath, RawPathParams, Request, rejection::RawPathParamsRejection},
    middleware::Next,
    response::Response,
};
use tracing::debug;

use crate::middleware::autoload::ids_well_formed;
use crate::middleware::session::Session;
use crate::routes::is_restoration_route;

pub const DEFAULT_BACK_URL: &str = "/";

pub async fn save_back(
    session: Session,
    params: Result<RawPathParams, RawPathParamsRejection>,
    req: Request,
    next: Next,
) -> Response {
    let well_formed = params.as_ref().map_or(true, ids_well_formed);
    let bookmark = req
        .extensions()
        .get::<MatchedPath>()
        .filter(|matched| well_formed && is_restoration_route(req.method(), matched.as_str()))
        .map(|_| {
            req.uri()
                .path_and_query()
                .map(|pq| pq.as_str().to_string())
                .unwrap_or_else(|| req.uri().path().to_string())
        });

    if let Some(url) = bookmark {
        debug!(back_url = %url, "Saving restoration bookmark");
        session.update(|data| data.back_url = Some(url)).await;
    }

    next.run(req).await
}

/// Takes the bookmark, falling back to the home page. A session without one
/// is left untouched.
pub async fn take_back_url(session: &Session) -> String {
    if session.read(|data| data.back_url.is_none()).await {
        return DEFAULT_BACK_URL.to_string();
    }

    session
        .update(|data| data.back_url.take())
        .await
        .unwrap_or_else(|| DEFAULT_BACK_URL.to_string())
}
