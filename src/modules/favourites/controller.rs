use axum::{
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use tracing::instrument;

use quiz_core::AppError;

use crate::middleware::autoload::Loaded;
use crate::modules::favourites::service::FavouriteService;
use crate::state::AppState;

#[instrument(skip(state, loaded))]
pub async fn add(State(state): State<AppState>, loaded: Loaded) -> Result<Response, AppError> {
    FavouriteService::add(&state.db, loaded.user()?.id, loaded.quiz()?.id).await?;
    Ok(Redirect::to("/goback").into_response())
}

#[instrument(skip(state, loaded))]
pub async fn remove(State(state): State<AppState>, loaded: Loaded) -> Result<Response, AppError> {
    FavouriteService::remove(&state.db, loaded.user()?.id, loaded.quiz()?.id).await?;
    Ok(Redirect::to("/goback").into_response())
}
