//! # Quiz Core
//!
//! Core types, errors, and utilities shared by every crate of the Quiz application.
//!
//! - [`errors`]: Application error type with HTTP response conversion
//! - [`pagination`]: Page-based pagination for list views
//! - [`password`]: Password hashing and verification
//! - [`upload`]: Upload ceiling and image validation
//!
//! # Example
//!
//! ```ignore
//! use quiz_core::{AppError, PaginationParams, hash_password};
//!
//! let error = AppError::not_found(anyhow::anyhow!("No exist quizId=7"));
//! let hash = hash_password("1234567")?;
//! let offset = PaginationParams::default().offset();
//! ```

pub mod errors;
pub mod pagination;
pub mod password;
pub mod upload;

// Re-export commonly used types at crate root
pub use errors::{AppError, ErrorInfo};
pub use pagination::{PaginationMeta, PaginationParams};
pub use password::{hash_password, verify_password};
pub use upload::{ImageUpload, ImageValidator, MAX_UPLOAD_BYTES, UploadBuffer};
