//! Route gates.
//!
//! A route's gates run in the order the route table declares them, after
//! autoload and before the handler. The first failing gate produces the
//! response: `LoginRequired` redirects to the login page with a flash message,
//! every other gate answers 403.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tracing::debug;

use quiz_core::AppError;
use quiz_models::{FlashKind, LoginUser};

use crate::middleware::autoload::Loaded;
use crate::middleware::session::Session;
use crate::routes::Gate;

pub const LOGIN_REQUIRED_MESSAGE: &str = "Login required: log in and retry.";

/// The gates of one route, shared by every request to it.
#[derive(Debug, Clone)]
pub struct GateChain(Arc<[Gate]>);

impl GateChain {
    pub fn new(gates: &[Gate]) -> Self {
        Self(gates.into())
    }

    pub fn gates(&self) -> &[Gate] {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateOutcome {
    Pass,
    LoginRedirect,
    Forbidden(&'static str),
}

/// Decides a single gate from the logged-in user and the loaded entities.
pub fn check_gate(gate: Gate, login: Option<&LoginUser>, loaded: &Loaded) -> GateOutcome {
    let Some(login) = login else {
        return match gate {
            Gate::LoginRequired => GateOutcome::LoginRedirect,
            _ => GateOutcome::Forbidden("Login required"),
        };
    };

    match gate {
        Gate::LoginRequired => GateOutcome::Pass,
        Gate::AdminRequired if login.is_admin => GateOutcome::Pass,
        Gate::AdminRequired => GateOutcome::Forbidden("Prohibited operation: admin required"),
        Gate::AdminOrMyselfRequired => {
            let myself = loaded.user.as_ref().is_some_and(|user| user.id == login.id);
            if login.is_admin || myself {
                GateOutcome::Pass
            } else {
                GateOutcome::Forbidden("Prohibited operation: the user is not you")
            }
        }
        Gate::AdminOrAuthorRequired => {
            let author = loaded
                .quiz
                .as_ref()
                .is_some_and(|quiz| quiz.author_id == login.id);
            if login.is_admin || author {
                GateOutcome::Pass
            } else {
                GateOutcome::Forbidden("Prohibited operation: you are not the author of this quiz")
            }
        }
        Gate::IsLocalRequired => {
            if loaded.user.as_ref().is_some_and(|user| user.is_local()) {
                GateOutcome::Pass
            } else {
                GateOutcome::Forbidden("Prohibited operation: the user is not a local user")
            }
        }
    }
}

/// Runs a route's gate chain.
pub async fn enforce_gates(
    State(chain): State<GateChain>,
    session: Session,
    loaded: Loaded,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let login = session.login_user().await;

    for gate in chain.gates() {
        match check_gate(*gate, login.as_ref(), &loaded) {
            GateOutcome::Pass => {}
            GateOutcome::LoginRedirect => {
                debug!(path = %req.uri().path(), "Login required");
                session.flash(FlashKind::Error, LOGIN_REQUIRED_MESSAGE).await;
                return Ok(Redirect::to("/login").into_response());
            }
            GateOutcome::Forbidden(reason) => {
                debug!(?gate, path = %req.uri().path(), "Gate refused request");
                return Err(AppError::forbidden(anyhow::anyhow!(reason)));
            }
        }
    }

    Ok(next.run(req).await)
}
