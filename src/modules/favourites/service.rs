use sqlx::PgPool;
use tracing::{debug, error, instrument};

use quiz_core::AppError;
use quiz_models::{QuizId, UserId};

pub struct FavouriteService;

impl FavouriteService {
    /// Marks a quiz as favourite. Adding it twice keeps a single row.
    #[instrument(skip(db), fields(db.operation = "INSERT", db.table = "favourites"))]
    pub async fn add(db: &PgPool, user_id: UserId, quiz_id: QuizId) -> Result<(), AppError> {
        let result = sqlx::query(
            "INSERT INTO favourites (user_id, quiz_id) VALUES ($1, $2)
             ON CONFLICT (user_id, quiz_id) DO NOTHING",
        )
        .bind(user_id)
        .bind(quiz_id)
        .execute(db)
        .await
        .map_err(|e| {
            error!(error = %e, "Database error adding favourite");
            AppError::database(e)
        })?;

        debug!(inserted = result.rows_affected(), "Favourite added");
        Ok(())
    }

    /// Removing a missing favourite is not an error.
    #[instrument(skip(db), fields(db.operation = "DELETE", db.table = "favourites"))]
    pub async fn remove(db: &PgPool, user_id: UserId, quiz_id: QuizId) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM favourites WHERE user_id = $1 AND quiz_id = $2")
            .bind(user_id)
            .bind(quiz_id)
            .execute(db)
            .await
            .map_err(|e| {
                error!(error = %e, "Database error removing favourite");
                AppError::database(e)
            })?;

        debug!(deleted = result.rows_affected(), "Favourite removed");
        Ok(())
    }
}
