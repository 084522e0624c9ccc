//! Upload ceiling and image validation.
//!
//! Uploaded files are buffered in memory before they reach a controller. The
//! buffer refuses to grow past [`MAX_UPLOAD_BYTES`]; an oversize file fails the
//! request with 413 instead of being silently truncated.

use crate::errors::AppError;

/// In-memory ceiling for a single uploaded file: 20 MiB.
pub const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// An uploaded image, fully buffered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    /// MIME type reported by the client (e.g., "image/png")
    pub mime: String,
    /// Original filename, informational only
    pub filename: Option<String>,
    pub data: Vec<u8>,
}

/// Accumulates an upload chunk by chunk, enforcing the ceiling.
#[derive(Debug, Default)]
pub struct UploadBuffer {
    data: Vec<u8>,
    limit: usize,
}

impl UploadBuffer {
    pub fn new(limit: usize) -> Self {
        Self {
            data: Vec::new(),
            limit,
        }
    }

    pub fn push(&mut self, chunk: &[u8]) -> Result<(), AppError> {
        if self.data.len() + chunk.len() > self.limit {
            return Err(AppError::payload_too_large(anyhow::anyhow!(
                "File too large: the maximum upload size is {} bytes",
                self.limit
            )));
        }
        self.data.extend_from_slice(chunk);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.data
    }
}

/// Validator for quiz images.
pub struct ImageValidator;

impl ImageValidator {
    /// Allowed MIME types for quiz images
    const ALLOWED_MIME_TYPES: &'static [&'static str] =
        &["image/png", "image/jpeg", "image/gif", "image/webp"];

    pub fn validate(upload: &ImageUpload) -> Result<(), AppError> {
        if upload.data.len() > MAX_UPLOAD_BYTES {
            return Err(AppError::payload_too_large(anyhow::anyhow!(
                "File size {} bytes exceeds the 20MB limit",
                upload.data.len()
            )));
        }

        if !Self::ALLOWED_MIME_TYPES.contains(&upload.mime.as_str()) {
            return Err(AppError::unprocessable(anyhow::anyhow!(
                "MIME type '{}' not allowed. Allowed types: PNG, JPEG, GIF, WebP",
                upload.mime
            )));
        }

        Ok(())
    }
}
