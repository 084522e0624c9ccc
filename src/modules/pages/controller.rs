use axum::response::{IntoResponse, Redirect, Response};

use quiz_core::AppError;

use crate::middleware::restore::take_back_url;
use crate::middleware::session::Session;
use crate::views::View;

pub async fn home(session: Session) -> Result<Response, AppError> {
    View::new("index").render(&session).await
}

pub async fn author(session: Session) -> Result<Response, AppError> {
    View::new("author").render(&session).await
}

/// Back to the last bookmarked page.
pub async fn go_back(session: Session) -> Response {
    let url = take_back_url(&session).await;
    Redirect::to(&url).into_response()
}
