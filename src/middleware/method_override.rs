//! HTML forms only send GET and POST. A POST whose query carries
//! `_method=PUT|PATCH|DELETE` is rewritten to that method before routing.

use axum::{
    extract::{Query, Request},
    http::{Method, Uri},
    middleware::Next,
    response::Response,
};
use serde::Deserialize;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct OverrideQuery {
    #[serde(rename = "_method")]
    method: Option<String>,
}

/// Method requested through `_method`, if the request may be overridden.
pub fn override_method(method: &Method, uri: &Uri) -> Option<Method> {
    if method != Method::POST {
        return None;
    }

    let Query(query) = Query::<OverrideQuery>::try_from_uri(uri).ok()?;
    match query.method?.to_ascii_uppercase().as_str() {
        "PUT" => Some(Method::PUT),
        "PATCH" => Some(Method::PATCH),
        "DELETE" => Some(Method::DELETE),
        _ => None,
    }
}

pub async fn method_override(mut req: Request, next: Next) -> Response {
    if let Some(method) = override_method(req.method(), req.uri()) {
        debug!(from = %req.method(), to = %method, "Method override");
        *req.method_mut() = method;
    }
    next.run(req).await
}
