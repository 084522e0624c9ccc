use anyhow::{Context, anyhow};
use axum::http::StatusCode;
use quiz_config::{OAuthCredentials, OAuthProvider};
use quiz_core::AppError;
use quiz_models::{AttachmentId, NewAttachment, User, UserId};
use serde_json::Value;
use sqlx::PgPool;
use tracing::{debug, error, info, instrument};

use crate::modules::attachments::service::AttachmentService;
use crate::modules::oauth::provider::{OAuthProfile, TokenResponse, endpoints, parse_profile};
use crate::modules::users::service::UserService;

/// Provider photos are stored by URL; the actual type is unknown.
const PROFILE_PHOTO_MIME: &str = "image/*";

fn upstream(err: reqwest::Error) -> AppError {
    AppError::new(StatusCode::BAD_GATEWAY, err)
}

pub struct OAuthService;

impl OAuthService {
    /// Trades the authorization code for an access token.
    #[instrument(skip(http, credentials, code, code_verifier), fields(provider = %provider))]
    pub async fn exchange_code(
        http: &reqwest::Client,
        provider: OAuthProvider,
        credentials: &OAuthCredentials,
        code: &str,
        redirect_uri: &str,
        code_verifier: Option<&str>,
    ) -> Result<String, AppError> {
        let endpoints = endpoints(provider);
        let mut form = vec![
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", redirect_uri),
            ("client_id", credentials.client_id.as_str()),
        ];

        let mut request = http
            .post(endpoints.token_url)
            .header(reqwest::header::ACCEPT, "application/json");
        if endpoints.pkce {
            if let Some(verifier) = code_verifier {
                form.push(("code_verifier", verifier));
            }
            request = request.basic_auth(&credentials.client_id, Some(&credentials.client_secret));
        } else {
            form.push(("client_secret", credentials.client_secret.as_str()));
        }

        let token = request
            .form(&form)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(upstream)?
            .json::<TokenResponse>()
            .await
            .map_err(upstream)?;

        debug!("Access token received");
        Ok(token.access_token)
    }

    #[instrument(skip(http, access_token), fields(provider = %provider))]
    pub async fn fetch_profile(
        http: &reqwest::Client,
        provider: OAuthProvider,
        access_token: &str,
    ) -> Result<OAuthProfile, AppError> {
        let body = http
            .get(endpoints(provider).profile_url)
            .bearer_auth(access_token)
            .header(reqwest::header::USER_AGENT, "quiz")
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(upstream)?
            .json::<Value>()
            .await
            .map_err(upstream)?;

        parse_profile(provider, &body)
    }

    /// Finds the user of a provider profile or registers it. The profile name
    /// and photo are refreshed on every login.
    #[instrument(skip(db, profile), fields(provider = %provider, profile.id = %profile.id, db.operation = "UPSERT", db.table = "users"))]
    pub async fn find_or_create_user(
        db: &PgPool,
        provider: OAuthProvider,
        profile: &OAuthProfile,
    ) -> Result<User, AppError> {
        let mut tx = db.begin().await.map_err(AppError::database)?;

        let existing = sqlx::query_as::<_, (UserId, Option<AttachmentId>, Option<String>)>(
            "SELECT u.id, u.photo_id, a.url FROM users u
             LEFT JOIN attachments a ON a.id = u.photo_id
             WHERE u.account_type_id = $1 AND u.profile_id = $2",
        )
        .bind(provider.account_type_id())
        .bind(&profile.id)
        .fetch_optional(&mut *tx)
        .await
        .context("Failed to look up OAuth user")
        .map_err(AppError::database)?;

        let id = match existing {
            Some((id, photo_id, photo_url)) => {
                let new_photo = match &profile.photo_url {
                    Some(url) if photo_url.as_deref() != Some(url.as_str()) => Some(
                        AttachmentService::insert(
                            &mut tx,
                            &NewAttachment::from_url(PROFILE_PHOTO_MIME, url),
                        )
                        .await?,
                    ),
                    _ => None,
                };

                sqlx::query(
                    "UPDATE users SET profile_name = $1, photo_id = COALESCE($2, photo_id),
                     updated_at = NOW() WHERE id = $3",
                )
                .bind(&profile.name)
                .bind(new_photo)
                .bind(id)
                .execute(&mut *tx)
                .await
                .context("Failed to refresh OAuth user")
                .map_err(AppError::database)?;

                if let (Some(_), Some(old)) = (new_photo, photo_id) {
                    AttachmentService::delete(&mut tx, old).await?;
                }

                debug!(user.id = %id, "OAuth user refreshed");
                id
            }
            None => {
                let photo = match &profile.photo_url {
                    Some(url) => Some(
                        AttachmentService::insert(
                            &mut tx,
                            &NewAttachment::from_url(PROFILE_PHOTO_MIME, url),
                        )
                        .await?,
                    ),
                    None => None,
                };

                let id = sqlx::query_scalar::<_, UserId>(
                    "INSERT INTO users (username, account_type_id, profile_id, profile_name, photo_id)
                     VALUES ($1, $2, $3, $4, $5) RETURNING id",
                )
                .bind(format!("{}/{}", provider.slug(), profile.id))
                .bind(provider.account_type_id())
                .bind(&profile.id)
                .bind(&profile.name)
                .bind(photo)
                .fetch_one(&mut *tx)
                .await
                .map_err(|e| {
                    error!(error = %e, "Database error creating OAuth user");
                    if let sqlx::Error::Database(db_err) = &e
                        && db_err.is_unique_violation()
                    {
                        return AppError::unprocessable(anyhow!("Username already exists"));
                    }
                    AppError::database(e)
                })?;

                info!(user.id = %id, "OAuth user created");
                id
            }
        };

        tx.commit().await.map_err(AppError::database)?;
        UserService::get_user(db, id).await
    }
}
