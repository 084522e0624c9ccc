use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};

use quiz_config::JwtConfig;
use quiz_core::AppError;

use crate::claims::ApiClaims;

/// Creates a signed API token for `user_id`.
pub fn create_api_token(
    user_id: i32,
    username: &str,
    jwt_config: &JwtConfig,
) -> Result<String, AppError> {
    let now = Utc::now().timestamp() as usize;
    let exp = now + jwt_config.api_token_expiry.max(0) as usize;

    let claims = ApiClaims {
        sub: user_id.to_string(),
        username: username.to_string(),
        exp,
        iat: now,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt_config.secret.as_bytes()),
    )
    .map_err(|e| AppError::internal(anyhow::anyhow!("Failed to create token: {}", e)))
}

/// Verifies signature and expiry of an API token.
///
/// Any failure is reported as 401 without detail.
pub fn verify_api_token(token: &str, jwt_config: &JwtConfig) -> Result<ApiClaims, AppError> {
    decode::<ApiClaims>(
        token,
        &DecodingKey::from_secret(jwt_config.secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::unauthorized(anyhow::anyhow!("Invalid or expired token")))
}
