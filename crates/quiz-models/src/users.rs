//! User domain models and DTOs.
//!
//! A user is either local (username + password) or linked to an OAuth provider
//! account identified by `(account_type_id, profile_id)`. The password hash is
//! never selected into these types.

use crate::attachments::AttachmentMeta;
use crate::ids::UserId;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

/// `account_type_id` of users that log in with a local password.
pub const LOCAL_ACCOUNT_TYPE: i32 = 0;

/// A user with the restricted projection and the eager-loaded photo.
///
/// This is the JSON body of `GET /api/users/{userId}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub is_admin: bool,
    pub username: String,
    pub account_type_id: i32,
    pub profile_id: Option<String>,
    pub profile_name: Option<String>,
    pub photo: Option<AttachmentMeta>,
}

impl User {
    pub fn is_local(&self) -> bool {
        self.account_type_id == LOCAL_ACCOUNT_TYPE
    }
}

/// Flat row of `users LEFT JOIN attachments` as selected by the user queries.
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: UserId,
    pub is_admin: bool,
    pub username: String,
    pub account_type_id: i32,
    pub profile_id: Option<String>,
    pub profile_name: Option<String>,
    #[sqlx(default)]
    pub photo_mime: Option<String>,
    #[sqlx(default)]
    pub photo_url: Option<String>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            is_admin: row.is_admin,
            username: row.username,
            account_type_id: row.account_type_id,
            profile_id: row.profile_id,
            profile_name: row.profile_name,
            photo: AttachmentMeta::from_columns(row.photo_mime, row.photo_url),
        }
    }
}

/// Snapshot of the logged-in user kept in the session.
///
/// Taken at login time; changes to the user row (e.g. the admin flag) are seen
/// after the next login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginUser {
    pub id: UserId,
    pub username: String,
    pub is_admin: bool,
    pub account_type_id: i32,
}

impl LoginUser {
    pub fn is_local(&self) -> bool {
        self.account_type_id == LOCAL_ACCOUNT_TYPE
    }
}

impl From<&User> for LoginUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            is_admin: user.is_admin,
            account_type_id: user.account_type_id,
        }
    }
}

fn validate_username(username: &str) -> Result<(), ValidationError> {
    let valid = username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'));
    if valid {
        Ok(())
    } else {
        Err(ValidationError::new("username_chars").with_message(
            "Username may only contain letters, digits, '_', '.' and '-'".into(),
        ))
    }
}

/// Registration form (`POST /users`).
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateUserDto {
    #[validate(
        length(min = 1, max = 50, message = "Username must have between 1 and 50 characters"),
        custom(function = "validate_username")
    )]
    pub username: String,
    #[validate(length(min = 6, message = "Password must have at least 6 characters"))]
    pub password: String,
}

/// Password change form (`PUT /users/{userId}`).
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateUserDto {
    #[validate(length(min = 6, message = "Password must have at least 6 characters"))]
    pub password: String,
}

/// Login form (`POST /login`).
#[derive(Debug, Clone, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    /// Local path to continue to after a successful login
    #[serde(default)]
    pub redir: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ApiLoginRequest {
    #[validate(length(min = 1))]
    pub username: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiTokenResponse {
    pub token: String,
}
