use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde_json::json;
use tracing::instrument;

use quiz_core::{AppError, PaginationParams};
use quiz_models::{CreateUserDto, FlashKind, UpdateUserDto};

use crate::middleware::autoload::Loaded;
use crate::middleware::session::Session;
use crate::modules::users::service::UserService;
use crate::state::AppState;
use crate::validator::ValidatedForm;
use crate::views::View;

#[instrument(skip(state, session))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    Query(pagination): Query<PaginationParams>,
) -> Result<Response, AppError> {
    let (users, meta) = UserService::list_users_page(&state.db, &pagination).await?;

    View::new("users/index")
        .with("users", users)
        .with("pagination", meta)
        .render(&session)
        .await
}

pub async fn show(session: Session, loaded: Loaded) -> Result<Response, AppError> {
    View::new("users/show")
        .with("user", loaded.user()?)
        .render(&session)
        .await
}

pub async fn new(session: Session) -> Result<Response, AppError> {
    View::new("users/new")
        .with("user", json!({ "username": "" }))
        .render(&session)
        .await
}

#[instrument(skip(state, session, dto), fields(user.username = %dto.username))]
pub async fn create(
    State(state): State<AppState>,
    session: Session,
    ValidatedForm(dto): ValidatedForm<CreateUserDto>,
) -> Result<Response, AppError> {
    let user = UserService::create_user(&state.db, dto).await?;

    session
        .flash(FlashKind::Success, "User created successfully.")
        .await;

    let target = match session.login_user().await {
        Some(_) => format!("/users/{}", user.id),
        None => "/login".to_string(),
    };
    Ok(Redirect::to(&target).into_response())
}

pub async fn edit(session: Session, loaded: Loaded) -> Result<Response, AppError> {
    View::new("users/edit")
        .with("user", loaded.user()?)
        .render(&session)
        .await
}

#[instrument(skip(state, session, loaded, dto))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    loaded: Loaded,
    ValidatedForm(dto): ValidatedForm<UpdateUserDto>,
) -> Result<Response, AppError> {
    let user = loaded.user()?;
    UserService::update_password(&state.db, user.id, dto).await?;

    session
        .flash(FlashKind::Success, "User edited successfully.")
        .await;
    Ok(Redirect::to(&format!("/users/{}", user.id)).into_response())
}

#[instrument(skip(state, session, loaded))]
pub async fn destroy(
    State(state): State<AppState>,
    session: Session,
    loaded: Loaded,
) -> Result<Response, AppError> {
    let user = loaded.user()?;
    UserService::delete_user(&state.db, user.id).await?;

    session
        .update(|data| {
            if data.login_user.as_ref().is_some_and(|login| login.id == user.id) {
                data.logout();
            }
            data.flash(FlashKind::Success, "User deleted successfully.");
        })
        .await;

    Ok(Redirect::to("/goback").into_response())
}
