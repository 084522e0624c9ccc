//! # Quiz Models
//!
//! Domain models and DTOs for the Quiz application.
//!
//! # Modules
//!
//! - [`ids`]: Strongly-typed integer ids with digit-only parsing
//! - [`attachments`]: Stored files (uploaded images, avatar URLs)
//! - [`users`]: Users, the login snapshot and user forms
//! - [`quizzes`]: Quizzes, quiz forms and answer checking
//! - [`sessions`]: Data kept in a browser session
//!
//! # Example
//!
//! ```ignore
//! use quiz_models::ids::UserId;
//! use quiz_models::users::LoginUser;
//!
//! let id: UserId = "42".parse()?;
//! assert!("4a".parse::<UserId>().is_err());
//! ```

pub mod attachments;
pub mod ids;
pub mod quizzes;
pub mod sessions;
pub mod users;

// Re-export commonly used types at crate root for convenience
pub use attachments::{Attachment, AttachmentMeta, NewAttachment};
pub use ids::{AttachmentId, ParseIdError, QuizId, UserId};
pub use quizzes::{
    AuthorSummary, CheckParams, PlayParams, Quiz, QuizFilterParams, QuizForm, QuizQuestion,
    QuizRow, answer_matches, search_pattern,
};
pub use sessions::{Flash, FlashKind, OAuthState, SessionData};
pub use users::{
    ApiLoginRequest, ApiTokenResponse, CreateUserDto, LOCAL_ACCOUNT_TYPE, LoginForm, LoginUser,
    UpdateUserDto, User, UserRow,
};
