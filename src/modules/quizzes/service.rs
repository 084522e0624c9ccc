use anyhow::Context;
use sqlx::PgPool;
use tracing::{debug, error, info, instrument};

use quiz_core::{AppError, ImageUpload, PaginationMeta};
use quiz_models::{
    Attachment, NewAttachment, Quiz, QuizFilterParams, QuizForm, QuizId, QuizRow, UserId,
    search_pattern,
};

use crate::modules::attachments::service::AttachmentService;

/// Quiz projection with author, attachment meta and the favourite flag of the
/// viewer bound as `$1` (NULL for anonymous visitors).
const QUIZ_SELECT: &str = "SELECT q.id, q.question, q.answer, q.author_id, q.attachment_id,
        u.username AS author_username, u.profile_name AS author_profile_name,
        a.mime AS attachment_mime, a.url AS attachment_url,
        EXISTS (
            SELECT 1 FROM favourites f WHERE f.quiz_id = q.id AND f.user_id = $1
        ) AS favourite,
        q.created_at, q.updated_at
    FROM quizzes q
    LEFT JOIN users u ON u.id = q.author_id
    LEFT JOIN attachments a ON a.id = q.attachment_id";

pub struct QuizService;

impl QuizService {
    #[instrument(skip(db), fields(quiz.id = %id, db.operation = "SELECT", db.table = "quizzes"))]
    pub async fn get_quiz(
        db: &PgPool,
        id: QuizId,
        viewer: Option<UserId>,
    ) -> Result<Quiz, AppError> {
        let row = sqlx::query_as::<_, QuizRow>(&format!("{QUIZ_SELECT} WHERE q.id = $2"))
            .bind(viewer)
            .bind(id)
            .fetch_optional(db)
            .await
            .map_err(|e| {
                error!(quiz.id = %id, error = %e, "Database error fetching quiz");
                AppError::database(e)
            })?;

        match row {
            Some(row) => Ok(row.into()),
            None => {
                debug!(quiz.id = %id, "Quiz not found");
                Err(AppError::not_found(anyhow::anyhow!("No exist quizId={}", id)))
            }
        }
    }

    /// One page of quizzes ordered by question, optionally restricted to an
    /// author and filtered by the search words.
    #[instrument(skip(db, filters), fields(db.operation = "SELECT", db.table = "quizzes"))]
    pub async fn list_quizzes(
        db: &PgPool,
        filters: &QuizFilterParams,
        author: Option<UserId>,
        viewer: Option<UserId>,
    ) -> Result<(Vec<Quiz>, PaginationMeta), AppError> {
        let limit = filters.pagination.limit();
        let offset = filters.pagination.offset();
        let pattern = filters.search.as_deref().and_then(search_pattern);

        debug!(
            limit = %limit,
            offset = %offset,
            filter.author = ?author,
            filter.search = ?pattern,
            "Fetching quizzes with pagination"
        );

        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM quizzes q
             WHERE ($1::int IS NULL OR q.author_id = $1)
               AND ($2::text IS NULL OR q.question ILIKE $2)",
        )
        .bind(author)
        .bind(&pattern)
        .fetch_one(db)
        .await
        .map_err(|e| {
            error!(error = %e, "Database error counting quizzes");
            AppError::database(e)
        })?;

        let rows = sqlx::query_as::<_, QuizRow>(&format!(
            "{QUIZ_SELECT}
             WHERE ($2::int IS NULL OR q.author_id = $2)
               AND ($3::text IS NULL OR q.question ILIKE $3)
             ORDER BY q.question, q.id
             LIMIT $4 OFFSET $5"
        ))
        .bind(viewer)
        .bind(author)
        .bind(&pattern)
        .bind(limit)
        .bind(offset)
        .fetch_all(db)
        .await
        .map_err(|e| {
            error!(error = %e, "Database error fetching quizzes");
            AppError::database(e)
        })?;

        debug!(count = rows.len(), total = total, "Quizzes fetched");

        Ok((
            rows.into_iter().map(Quiz::from).collect(),
            PaginationMeta::new(total, &filters.pagination),
        ))
    }

    #[instrument(skip(db, form, image), fields(user.id = %author_id, db.operation = "INSERT", db.table = "quizzes"))]
    pub async fn create_quiz(
        db: &PgPool,
        author_id: UserId,
        form: &QuizForm,
        image: Option<ImageUpload>,
    ) -> Result<QuizId, AppError> {
        let form = form.normalized();
        let mut tx = db.begin().await.map_err(AppError::database)?;

        let attachment_id = match image {
            Some(image) => {
                Some(AttachmentService::insert(&mut tx, &NewAttachment::from_upload(image)).await?)
            }
            None => None,
        };

        let id = sqlx::query_scalar::<_, QuizId>(
            "INSERT INTO quizzes (question, answer, author_id, attachment_id)
             VALUES ($1, $2, $3, $4)
             RETURNING id",
        )
        .bind(&form.question)
        .bind(&form.answer)
        .bind(author_id)
        .bind(attachment_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            error!(error = %e, "Database error creating quiz");
            AppError::database(e)
        })?;

        tx.commit().await.map_err(AppError::database)?;

        info!(quiz.id = %id, user.id = %author_id, "Quiz created successfully");
        Ok(id)
    }

    /// Updates the texts; a new image replaces (and deletes) the old one.
    #[instrument(skip(db, quiz, form, image), fields(quiz.id = %quiz.id, db.operation = "UPDATE", db.table = "quizzes"))]
    pub async fn update_quiz(
        db: &PgPool,
        quiz: &Quiz,
        form: &QuizForm,
        image: Option<ImageUpload>,
    ) -> Result<(), AppError> {
        let form = form.normalized();
        let mut tx = db.begin().await.map_err(AppError::database)?;

        let attachment_id = match image {
            Some(image) => {
                Some(AttachmentService::insert(&mut tx, &NewAttachment::from_upload(image)).await?)
            }
            None => quiz.attachment_id,
        };

        sqlx::query(
            "UPDATE quizzes
             SET question = $1, answer = $2, attachment_id = $3, updated_at = NOW()
             WHERE id = $4",
        )
        .bind(&form.question)
        .bind(&form.answer)
        .bind(attachment_id)
        .bind(quiz.id)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            error!(quiz.id = %quiz.id, error = %e, "Database error updating quiz");
            AppError::database(e)
        })?;

        if let Some(old) = quiz.attachment_id
            && attachment_id != Some(old)
        {
            AttachmentService::delete(&mut tx, old).await?;
        }

        tx.commit().await.map_err(AppError::database)?;

        info!(quiz.id = %quiz.id, "Quiz updated successfully");
        Ok(())
    }

    #[instrument(skip(db, quiz), fields(quiz.id = %quiz.id, db.operation = "DELETE", db.table = "quizzes"))]
    pub async fn delete_quiz(db: &PgPool, quiz: &Quiz) -> Result<(), AppError> {
        let mut tx = db.begin().await.map_err(AppError::database)?;

        sqlx::query("DELETE FROM quizzes WHERE id = $1")
            .bind(quiz.id)
            .execute(&mut *tx)
            .await
            .context("Failed to delete quiz")
            .map_err(AppError::database)?;

        if let Some(attachment_id) = quiz.attachment_id {
            AttachmentService::delete(&mut tx, attachment_id).await?;
        }

        tx.commit().await.map_err(AppError::database)?;

        info!(quiz.id = %quiz.id, "Quiz deleted successfully");
        Ok(())
    }

    pub async fn get_attachment(db: &PgPool, quiz: &Quiz) -> Result<Option<Attachment>, AppError> {
        match quiz.attachment_id {
            Some(id) => AttachmentService::get(db, id).await,
            None => Ok(None),
        }
    }
}
