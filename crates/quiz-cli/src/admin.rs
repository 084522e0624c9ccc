//! Administrator accounts.

use quiz_core::hash_password;
use quiz_models::{LOCAL_ACCOUNT_TYPE, UserId};
use sqlx::PgPool;

/// Creates a local administrator. Fails if the username is taken.
pub async fn create_admin(
    db: &PgPool,
    username: &str,
    password: &str,
) -> Result<UserId, Box<dyn std::error::Error>> {
    let hashed_password =
        hash_password(password).map_err(|e| format!("Failed to hash password: {}", e.error))?;

    let user_id = sqlx::query_scalar::<_, UserId>(
        "INSERT INTO users (username, password, is_admin, account_type_id)
         VALUES ($1, $2, TRUE, $3)
         ON CONFLICT (username) DO NOTHING
         RETURNING id",
    )
    .bind(username)
    .bind(&hashed_password)
    .bind(LOCAL_ACCOUNT_TYPE)
    .fetch_optional(db)
    .await?;

    user_id.ok_or_else(|| format!("User '{}' already exists", username).into())
}
