//! Strongly-typed ID newtypes for domain entities.
//!
//! Ids are PostgreSQL `SERIAL` values. Parsing from a path segment accepts
//! ASCII digits only (`\d+`) that fit the id type; anything else, including a
//! sign or surrounding whitespace, is rejected.
//!
//! # Example
//!
//! ```ignore
//! use quiz_models::ids::{QuizId, UserId};
//!
//! let user: UserId = "7".parse()?;
//! assert!("-7".parse::<UserId>().is_err());
//! assert!("99999999999".parse::<QuizId>().is_err());
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

/// A path segment that is not a valid id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIdError {
    pub param: &'static str,
    pub value: String,
}

impl fmt::Display for ParseIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid {}={}", self.param, self.value)
    }
}

impl std::error::Error for ParseIdError {}

/// Macro to define a strongly-typed ID newtype over `i32`.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident, $param:literal
    ) => {
        $(#[$meta])*
        #[derive(
            Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
            sqlx::Type,
        )]
        #[serde(transparent)]
        #[sqlx(transparent)]
        #[schema(value_type = i32)]
        pub struct $name(pub i32);

        impl $name {
            /// Name of the route parameter carrying this id.
            pub const PARAM: &'static str = $param;

            #[inline]
            pub const fn into_inner(self) -> i32 {
                self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i32> for $name {
            #[inline]
            fn from(id: i32) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i32 {
            #[inline]
            fn from(id: $name) -> i32 {
                id.0
            }
        }

        impl std::str::FromStr for $name {
            type Err = ParseIdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let invalid = || ParseIdError {
                    param: $param,
                    value: s.to_string(),
                };
                if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(invalid());
                }
                s.parse::<i32>().map(Self).map_err(|_| invalid())
            }
        }
    };
}

define_id!(
    /// Strongly-typed ID for User entities.
    UserId, "userId"
);

define_id!(
    /// Strongly-typed ID for Quiz entities.
    QuizId, "quizId"
);

define_id!(
    /// Strongly-typed ID for Attachment entities.
    AttachmentId, "attachmentId"
);
