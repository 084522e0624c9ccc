use anyhow::Context;
use sqlx::PgPool;
use tracing::{debug, error, info, instrument, warn};

use quiz_core::{AppError, PaginationMeta, PaginationParams, hash_password, verify_password};
use quiz_models::{
    AttachmentId, CreateUserDto, LOCAL_ACCOUNT_TYPE, UpdateUserDto, User, UserId, UserRow,
};

/// Restricted user projection with the photo eager-loaded. Never selects the
/// password hash.
pub(crate) const USER_SELECT: &str = "SELECT u.id, u.is_admin, u.username, u.account_type_id,
        u.profile_id, u.profile_name, p.mime AS photo_mime, p.url AS photo_url
    FROM users u
    LEFT JOIN attachments p ON p.id = u.photo_id";

pub struct UserService;

impl UserService {
    #[instrument(skip(db), fields(user.id = %id, db.operation = "SELECT", db.table = "users"))]
    pub async fn get_user(db: &PgPool, id: UserId) -> Result<User, AppError> {
        let row = sqlx::query_as::<_, UserRow>(&format!("{USER_SELECT} WHERE u.id = $1"))
            .bind(id)
            .fetch_optional(db)
            .await
            .map_err(|e| {
                error!(user.id = %id, error = %e, "Database error fetching user");
                AppError::database(e)
            })?;

        match row {
            Some(row) => Ok(row.into()),
            None => {
                debug!(user.id = %id, "User not found");
                Err(AppError::not_found(anyhow::anyhow!("No exist userId={}", id)))
            }
        }
    }

    #[instrument(skip(db), fields(db.operation = "SELECT", db.table = "users"))]
    pub async fn list_users(db: &PgPool) -> Result<Vec<User>, AppError> {
        let rows = sqlx::query_as::<_, UserRow>(&format!("{USER_SELECT} ORDER BY u.id"))
            .fetch_all(db)
            .await
            .context("Failed to fetch users")
            .map_err(AppError::database)?;

        Ok(rows.into_iter().map(User::from).collect())
    }

    #[instrument(skip(db, pagination), fields(db.operation = "SELECT", db.table = "users"))]
    pub async fn list_users_page(
        db: &PgPool,
        pagination: &PaginationParams,
    ) -> Result<(Vec<User>, PaginationMeta), AppError> {
        let limit = pagination.limit();
        let offset = pagination.offset();

        debug!(limit = %limit, offset = %offset, "Fetching users with pagination");

        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(db)
            .await
            .context("Failed to count users")
            .map_err(AppError::database)?;

        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "{USER_SELECT} ORDER BY u.username LIMIT $1 OFFSET $2"
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(db)
        .await
        .context("Failed to fetch users")
        .map_err(AppError::database)?;

        Ok((
            rows.into_iter().map(User::from).collect(),
            PaginationMeta::new(total, pagination),
        ))
    }

    #[instrument(skip(db, dto), fields(user.username = %dto.username, db.operation = "INSERT", db.table = "users"))]
    pub async fn create_user(db: &PgPool, dto: CreateUserDto) -> Result<User, AppError> {
        let password_hash = hash_password(&dto.password)?;

        let id = sqlx::query_scalar::<_, UserId>(
            "INSERT INTO users (username, password, is_admin, account_type_id)
             VALUES ($1, $2, FALSE, $3)
             RETURNING id",
        )
        .bind(&dto.username)
        .bind(&password_hash)
        .bind(LOCAL_ACCOUNT_TYPE)
        .fetch_one(db)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e
                && db_err.is_unique_violation()
            {
                warn!(user.username = %dto.username, "Attempted to create user with existing username");
                return AppError::unprocessable(anyhow::anyhow!("Username already exists"));
            }
            error!(error = %e, user.username = %dto.username, "Database error creating user");
            AppError::database(e)
        })?;

        info!(user.id = %id, user.username = %dto.username, "User created successfully");

        Self::get_user(db, id).await
    }

    #[instrument(skip(db, dto), fields(user.id = %id, db.operation = "UPDATE", db.table = "users"))]
    pub async fn update_password(
        db: &PgPool,
        id: UserId,
        dto: UpdateUserDto,
    ) -> Result<(), AppError> {
        let password_hash = hash_password(&dto.password)?;

        let result = sqlx::query(
            "UPDATE users SET password = $1, updated_at = NOW()
             WHERE id = $2 AND account_type_id = $3",
        )
        .bind(&password_hash)
        .bind(id)
        .bind(LOCAL_ACCOUNT_TYPE)
        .execute(db)
        .await
        .map_err(|e| {
            error!(user.id = %id, error = %e, "Database error updating password");
            AppError::database(e)
        })?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow::anyhow!("No exist userId={}", id)));
        }

        info!(user.id = %id, "Password updated");
        Ok(())
    }

    /// Deletes a user with their quizzes and favourites (cascade) and the
    /// attachments those owned.
    #[instrument(skip(db), fields(user.id = %id, db.operation = "DELETE", db.table = "users"))]
    pub async fn delete_user(db: &PgPool, id: UserId) -> Result<(), AppError> {
        let mut tx = db.begin().await.map_err(AppError::database)?;

        let attachments = sqlx::query_scalar::<_, AttachmentId>(
            "SELECT photo_id FROM users WHERE id = $1 AND photo_id IS NOT NULL
             UNION
             SELECT attachment_id FROM quizzes WHERE author_id = $1 AND attachment_id IS NOT NULL",
        )
        .bind(id)
        .fetch_all(&mut *tx)
        .await
        .context("Failed to collect user attachments")
        .map_err(AppError::database)?;

        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                error!(user.id = %id, error = %e, "Database error deleting user");
                AppError::database(e)
            })?;

        if result.rows_affected() == 0 {
            debug!(user.id = %id, "User not found for deletion");
            return Err(AppError::not_found(anyhow::anyhow!("No exist userId={}", id)));
        }

        if !attachments.is_empty() {
            sqlx::query("DELETE FROM attachments WHERE id = ANY($1)")
                .bind(&attachments)
                .execute(&mut *tx)
                .await
                .context("Failed to delete user attachments")
                .map_err(AppError::database)?;
        }

        tx.commit().await.map_err(AppError::database)?;

        info!(user.id = %id, attachments = attachments.len(), "User deleted successfully");
        Ok(())
    }

    /// Checks a local username/password pair. `None` on any mismatch.
    #[instrument(skip(db, password), fields(user.username = %username, db.operation = "SELECT", db.table = "users"))]
    pub async fn authenticate(
        db: &PgPool,
        username: &str,
        password: &str,
    ) -> Result<Option<User>, AppError> {
        let credentials = sqlx::query_as::<_, (UserId, Option<String>)>(
            "SELECT id, password FROM users WHERE username = $1 AND account_type_id = $2",
        )
        .bind(username)
        .bind(LOCAL_ACCOUNT_TYPE)
        .fetch_optional(db)
        .await
        .context("Failed to fetch credentials")
        .map_err(AppError::database)?;

        let Some((id, Some(hash))) = credentials else {
            debug!("Unknown local user");
            return Ok(None);
        };

        if !verify_password(password, &hash)? {
            debug!(user.id = %id, "Wrong password");
            return Ok(None);
        }

        Self::get_user(db, id).await.map(Some)
    }
}
