//! View models for page responses.
//!
//! Page handlers do not render HTML. They answer with the name of a template and
//! its locals, serialized as JSON:
//!
//! ```text
//! {"view": "quizzes/index", "locals": {"quizzes": [...], "loginUser": {...}, "messages": [...]}}
//! ```
//!
//! `loginUser` and `messages` (the flash queue, consumed on render) are added to
//! every view.

use axum::{
    Json,
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Map, Value, json};
use tracing::error;

use quiz_core::{AppError, ErrorInfo};

use crate::middleware::session::Session;

#[derive(Debug)]
pub struct View {
    name: &'static str,
    status: StatusCode,
    locals: Map<String, Value>,
    error: Option<serde_json::Error>,
}

impl View {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            status: StatusCode::OK,
            locals: Map::new(),
            error: None,
        }
    }

    pub fn with(mut self, key: &str, value: impl Serialize) -> Self {
        match serde_json::to_value(value) {
            Ok(value) => {
                self.locals.insert(key.to_string(), value);
            }
            Err(e) => {
                self.error.get_or_insert(e);
            }
        }
        self
    }

    pub fn status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    pub async fn render(mut self, session: &Session) -> Result<Response, AppError> {
        if let Some(e) = self.error {
            return Err(AppError::internal(e));
        }

        let login_user = session.login_user().await;
        let messages = session.take_flash().await;
        self.locals
            .insert("loginUser".to_string(), serde_json::to_value(login_user)?);
        self.locals
            .insert("messages".to_string(), serde_json::to_value(messages)?);

        let body = json!({
            "view": self.name,
            "locals": self.locals,
        });

        Ok((self.status, Json(body)).into_response())
    }
}

/// Re-renders error responses of page routes as the `error` view.
pub async fn error_pages(req: Request, next: Next) -> Response {
    let session = req.extensions().get::<Session>().cloned();
    let response = next.run(req).await;

    let Some(info) = response.extensions().get::<ErrorInfo>().cloned() else {
        return response;
    };
    let Some(session) = session else {
        return response;
    };

    let view = View::new("error")
        .status(info.status)
        .with("status", info.status.as_u16())
        .with("message", &info.message);

    match view.render(&session).await {
        Ok(mut rendered) => {
            rendered.extensions_mut().insert(info);
            rendered
        }
        Err(e) => {
            error!(error = %e.message(), "Failed to render error page");
            response
        }
    }
}
