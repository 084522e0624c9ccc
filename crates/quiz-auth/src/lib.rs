//! # Quiz Auth
//!
//! API token utilities for the Quiz application.
//!
//! Browser users authenticate with a session cookie. Programmatic clients of the
//! `/api` routes authenticate with a signed token whose subject is the user id;
//! the API token loader verifies it and exposes the embedded id to later stages.
//!
//! # Example
//!
//! ```ignore
//! use quiz_auth::{create_api_token, verify_api_token};
//! use quiz_config::JwtConfig;
//!
//! let config = JwtConfig::from_env();
//! let token = create_api_token(7, "pepe", &config)?;
//! let claims = verify_api_token(&token, &config)?;
//! assert_eq!(claims.user_id()?, 7);
//! ```

pub mod claims;
pub mod jwt;

pub use claims::ApiClaims;
pub use jwt::{create_api_token, verify_api_token};
