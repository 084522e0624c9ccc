use quiz_core::AppError;
use serde::{Deserialize, Serialize};

/// Claims embedded in API tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiClaims {
    /// User id (subject claim)
    pub sub: String,
    pub username: String,
    /// Token expiration timestamp (Unix timestamp)
    pub exp: usize,
    /// Token issued-at timestamp (Unix timestamp)
    pub iat: usize,
}

impl ApiClaims {
    /// The user id carried by the token.
    pub fn user_id(&self) -> Result<i32, AppError> {
        self.sub
            .parse()
            .map_err(|_| AppError::unauthorized(anyhow::anyhow!("Invalid user id in token")))
    }
}
