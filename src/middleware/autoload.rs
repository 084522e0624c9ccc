//! Resource autoloading.
//!
//! Routes with a `userId` or `quizId` parameter get the entity loaded before any
//! gate or handler runs. Loaded entities live in [`Loaded`], a per-request value
//! in the request extensions that gates and handlers read.

use axum::{
    extract::{
        FromRequestParts, RawPathParams, Request, State, rejection::RawPathParamsRejection,
    },
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use tracing::debug;

use quiz_auth::ApiClaims;
use quiz_core::AppError;
use quiz_models::{Quiz, QuizId, User, UserId};

use crate::middleware::session::Session;
use crate::modules::quizzes::service::QuizService;
use crate::modules::users::service::UserService;
use crate::state::AppState;

/// Entities resolved for the current request.
#[derive(Debug, Clone, Default)]
pub struct Loaded {
    pub user: Option<User>,
    pub quiz: Option<Quiz>,
    /// Verified API token
    pub token: Option<ApiClaims>,
}

impl Loaded {
    pub fn user(&self) -> Result<&User, AppError> {
        self.user
            .as_ref()
            .ok_or_else(|| AppError::internal(anyhow::anyhow!("No user loaded for this route")))
    }

    pub fn quiz(&self) -> Result<&Quiz, AppError> {
        self.quiz
            .as_ref()
            .ok_or_else(|| AppError::internal(anyhow::anyhow!("No quiz loaded for this route")))
    }
}

/// Never fails: a request without loaded entities gets an empty [`Loaded`].
impl<S> FromRequestParts<S> for Loaded
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts.extensions.get::<Loaded>().cloned().unwrap_or_default())
    }
}

/// The 404 of an unmatched route. A malformed id segment answers with it too.
pub fn route_not_found(path: &str) -> AppError {
    AppError::not_found(anyhow::anyhow!("Not Found: {}", path))
}

/// Parses a route parameter as an id; a malformed one means the route did not
/// match.
pub fn parse_param<T>(value: &str, path: &str) -> Result<T, AppError>
where
    T: std::str::FromStr,
{
    value.parse().map_err(|_| {
        debug!(param = %value, "Malformed id segment");
        route_not_found(path)
    })
}

/// Whether every `userId`/`quizId` parameter is a well-formed id. Routes with a
/// malformed id answer 404 as if they never matched.
pub fn ids_well_formed(params: &RawPathParams) -> bool {
    params.iter().all(|(key, value)| match key {
        UserId::PARAM => value.parse::<UserId>().is_ok(),
        QuizId::PARAM => value.parse::<QuizId>().is_ok(),
        _ => true,
    })
}

/// Loads `userId` and `quizId` route parameters into [`Loaded`].
pub async fn autoload(
    State(state): State<AppState>,
    params: Result<RawPathParams, RawPathParamsRejection>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Ok(params) = params else {
        return Ok(next.run(req).await);
    };

    let path = req.uri().path().to_string();
    let mut user_id = None;
    let mut quiz_id = None;
    for (key, value) in &params {
        match key {
            UserId::PARAM => user_id = Some(parse_param::<UserId>(value, &path)?),
            QuizId::PARAM => quiz_id = Some(parse_param::<QuizId>(value, &path)?),
            _ => {}
        }
    }

    if user_id.is_none() && quiz_id.is_none() {
        return Ok(next.run(req).await);
    }

    let mut loaded = req.extensions().get::<Loaded>().cloned().unwrap_or_default();

    if let Some(id) = user_id
        && loaded.user.as_ref().map(|u| u.id) != Some(id)
    {
        loaded.user = Some(UserService::get_user(&state.db, id).await?);
    }

    if let Some(id) = quiz_id
        && loaded.quiz.as_ref().map(|q| q.id) != Some(id)
    {
        let viewer = match req.extensions().get::<Session>() {
            Some(session) => session.login_user().await.map(|u| u.id),
            None => None,
        };
        loaded.quiz = Some(QuizService::get_quiz(&state.db, id, viewer).await?);
    }

    req.extensions_mut().insert(loaded);
    Ok(next.run(req).await)
}

/// Loads the owner of the verified API token as the request's user.
pub async fn load_token_owner(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let mut loaded = req.extensions().get::<Loaded>().cloned().unwrap_or_default();

    let claims = loaded
        .token
        .as_ref()
        .ok_or_else(|| AppError::unauthorized(anyhow::anyhow!("Authentication token required")))?;
    let id = UserId(claims.user_id()?);

    if loaded.user.as_ref().map(|u| u.id) != Some(id) {
        loaded.user = Some(UserService::get_user(&state.db, id).await?);
    }

    req.extensions_mut().insert(loaded);
    Ok(next.run(req).await)
}
