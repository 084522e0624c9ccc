//! Stored files.
//!
//! An attachment is either an uploaded image kept as bytes or a reference to an
//! external URL (OAuth avatars). It can be the photo of a user, the image of a
//! quiz, or both: the two foreign keys are independent.

use crate::ids::AttachmentId;
use quiz_core::ImageUpload;
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Attachment {
    pub id: AttachmentId,
    pub mime: String,
    pub url: Option<String>,
    pub data: Option<Vec<u8>>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// The part of an attachment eager-loaded alongside its owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct AttachmentMeta {
    pub mime: String,
    pub url: Option<String>,
}

impl AttachmentMeta {
    /// Builds the meta from the nullable columns of a LEFT JOIN.
    pub fn from_columns(mime: Option<String>, url: Option<String>) -> Option<Self> {
        mime.map(|mime| Self { mime, url })
    }
}

/// Values for an attachment about to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAttachment {
    pub mime: String,
    pub url: Option<String>,
    pub data: Option<Vec<u8>>,
}

impl NewAttachment {
    pub fn from_upload(upload: ImageUpload) -> Self {
        Self {
            mime: upload.mime,
            url: None,
            data: Some(upload.data),
        }
    }

    pub fn from_url(mime: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            mime: mime.into(),
            url: Some(url.into()),
            data: None,
        }
    }
}
