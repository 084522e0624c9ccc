use sqlx::{PgConnection, PgPool};
use tracing::{debug, error, instrument};

use quiz_core::AppError;
use quiz_models::{Attachment, AttachmentId, NewAttachment};

pub struct AttachmentService;

impl AttachmentService {
    /// Inserts an attachment inside the caller's transaction.
    #[instrument(skip(conn, attachment), fields(attachment.mime = %attachment.mime, db.operation = "INSERT", db.table = "attachments"))]
    pub async fn insert(
        conn: &mut PgConnection,
        attachment: &NewAttachment,
    ) -> Result<AttachmentId, AppError> {
        let id = sqlx::query_scalar::<_, AttachmentId>(
            "INSERT INTO attachments (mime, url, data) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(&attachment.mime)
        .bind(&attachment.url)
        .bind(&attachment.data)
        .fetch_one(conn)
        .await
        .map_err(|e| {
            error!(error = %e, "Database error inserting attachment");
            AppError::database(e)
        })?;

        debug!(attachment.id = %id, "Attachment stored");
        Ok(id)
    }

    #[instrument(skip(conn), fields(attachment.id = %id, db.operation = "DELETE", db.table = "attachments"))]
    pub async fn delete(conn: &mut PgConnection, id: AttachmentId) -> Result<(), AppError> {
        sqlx::query("DELETE FROM attachments WHERE id = $1")
            .bind(id)
            .execute(conn)
            .await
            .map_err(|e| {
                error!(attachment.id = %id, error = %e, "Database error deleting attachment");
                AppError::database(e)
            })?;
        Ok(())
    }

    #[instrument(skip(db), fields(attachment.id = %id, db.operation = "SELECT", db.table = "attachments"))]
    pub async fn get(db: &PgPool, id: AttachmentId) -> Result<Option<Attachment>, AppError> {
        sqlx::query_as::<_, Attachment>(
            "SELECT id, mime, url, data, created_at, updated_at FROM attachments WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(db)
        .await
        .map_err(|e| {
            error!(attachment.id = %id, error = %e, "Database error fetching attachment");
            AppError::database(e)
        })
    }
}
