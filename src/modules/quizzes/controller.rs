use axum::{
    body::Body,
    extract::{Multipart, Query, State, multipart::MultipartError},
    http::{StatusCode, header},
    response::{IntoResponse, Redirect, Response},
};
use serde_json::json;
use tracing::{debug, instrument};

use quiz_core::{AppError, ImageUpload, ImageValidator, MAX_UPLOAD_BYTES, UploadBuffer};
use quiz_models::{
    CheckParams, FlashKind, PlayParams, QuizFilterParams, QuizForm, QuizQuestion, answer_matches,
};

use crate::middleware::autoload::Loaded;
use crate::middleware::session::Session;
use crate::modules::quizzes::service::QuizService;
use crate::state::AppState;
use crate::validator;
use crate::views::View;

fn multipart_error(e: MultipartError) -> AppError {
    AppError::new(e.status(), anyhow::anyhow!(e.body_text()))
}

/// Reads the quiz form. The `image` part is buffered chunk by chunk and fails
/// with 413 as soon as it passes the upload ceiling.
pub async fn read_quiz_form(
    mut multipart: Multipart,
) -> Result<(QuizForm, Option<ImageUpload>), AppError> {
    let mut form = QuizForm::default();
    let mut image = None;

    while let Some(mut field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "question" => form.question = field.text().await.map_err(multipart_error)?,
            "answer" => form.answer = field.text().await.map_err(multipart_error)?,
            "image" => {
                let mime = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let filename = field.file_name().map(str::to_string);

                let mut buffer = UploadBuffer::new(MAX_UPLOAD_BYTES);
                while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
                    buffer.push(&chunk)?;
                }

                // Browsers send an empty part when no file was chosen.
                if buffer.is_empty() {
                    continue;
                }

                let upload = ImageUpload {
                    mime,
                    filename,
                    data: buffer.into_inner(),
                };
                ImageValidator::validate(&upload)?;
                image = Some(upload);
            }
            other => debug!(field = %other, "Ignoring unknown form field"),
        }
    }

    validator::validate(&form)?;

    Ok((form, image))
}

/// `GET /quizzes` and `GET /users/{userId}/quizzes`.
#[instrument(skip(state, session, loaded))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    loaded: Loaded,
    Query(filters): Query<QuizFilterParams>,
) -> Result<Response, AppError> {
    let viewer = session.login_user().await.map(|u| u.id);
    let author = loaded.user.as_ref().map(|u| u.id);

    let (quizzes, meta) = QuizService::list_quizzes(&state.db, &filters, author, viewer).await?;
    let quizzes: Vec<QuizQuestion> = quizzes.iter().map(QuizQuestion::from).collect();

    View::new("quizzes/index")
        .with("quizzes", quizzes)
        .with("pagination", meta)
        .with("search", filters.search.unwrap_or_default())
        .with("author", &loaded.user)
        .render(&session)
        .await
}

pub async fn show(session: Session, loaded: Loaded) -> Result<Response, AppError> {
    View::new("quizzes/show")
        .with("quiz", loaded.quiz()?)
        .render(&session)
        .await
}

pub async fn new(session: Session) -> Result<Response, AppError> {
    View::new("quizzes/new")
        .with("quiz", json!({ "question": "", "answer": "" }))
        .render(&session)
        .await
}

#[instrument(skip(state, session, multipart))]
pub async fn create(
    State(state): State<AppState>,
    session: Session,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let login = session
        .login_user()
        .await
        .ok_or_else(|| AppError::unauthorized(anyhow::anyhow!("Login required")))?;
    let (form, image) = read_quiz_form(multipart).await?;

    let id = QuizService::create_quiz(&state.db, login.id, &form, image).await?;

    session
        .flash(FlashKind::Success, "Quiz created successfully.")
        .await;
    Ok(Redirect::to(&format!("/quizzes/{}", id)).into_response())
}

pub async fn edit(session: Session, loaded: Loaded) -> Result<Response, AppError> {
    View::new("quizzes/edit")
        .with("quiz", loaded.quiz()?)
        .render(&session)
        .await
}

#[instrument(skip(state, session, loaded, multipart))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    loaded: Loaded,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let quiz = loaded.quiz()?;
    let (form, image) = read_quiz_form(multipart).await?;

    QuizService::update_quiz(&state.db, quiz, &form, image).await?;

    session
        .flash(FlashKind::Success, "Quiz edited successfully.")
        .await;
    Ok(Redirect::to("/goback").into_response())
}

#[instrument(skip(state, session, loaded))]
pub async fn destroy(
    State(state): State<AppState>,
    session: Session,
    loaded: Loaded,
) -> Result<Response, AppError> {
    QuizService::delete_quiz(&state.db, loaded.quiz()?).await?;

    session
        .flash(FlashKind::Success, "Quiz deleted successfully.")
        .await;
    Ok(Redirect::to("/goback").into_response())
}

pub async fn play(
    session: Session,
    loaded: Loaded,
    Query(params): Query<PlayParams>,
) -> Result<Response, AppError> {
    View::new("quizzes/play")
        .with("quiz", QuizQuestion::from(loaded.quiz()?))
        .with("answer", params.answer.unwrap_or_default())
        .render(&session)
        .await
}

pub async fn check(
    session: Session,
    loaded: Loaded,
    Query(params): Query<CheckParams>,
) -> Result<Response, AppError> {
    let quiz = loaded.quiz()?;
    let result = answer_matches(&quiz.answer, &params.answer);

    View::new("quizzes/result")
        .with("quiz", quiz)
        .with("answer", &params.answer)
        .with("result", result)
        .render(&session)
        .await
}

/// Stored bytes with their MIME type, or a redirect to the stored URL.
#[instrument(skip(state, loaded))]
pub async fn attachment(
    State(state): State<AppState>,
    loaded: Loaded,
) -> Result<Response, AppError> {
    let quiz = loaded.quiz()?;
    let attachment = QuizService::get_attachment(&state.db, quiz)
        .await?
        .ok_or_else(|| {
            AppError::not_found(anyhow::anyhow!("No attachment for quizId={}", quiz.id))
        })?;

    if let Some(data) = attachment.data {
        return Ok((
            [(header::CONTENT_TYPE, attachment.mime)],
            Body::from(data),
        )
            .into_response());
    }

    match attachment.url {
        Some(url) => Ok((StatusCode::FOUND, [(header::LOCATION, url)]).into_response()),
        None => Err(AppError::not_found(anyhow::anyhow!(
            "No attachment for quizId={}",
            quiz.id
        ))),
    }
}
