use anyhow::anyhow;
use quiz_config::{OAuthCredentials, OAuthProvider};
use quiz_core::AppError;
use reqwest::Url;
use serde::Deserialize;
use serde_json::Value;

/// Fixed endpoints and scope of a provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProviderEndpoints {
    pub authorize_url: &'static str,
    pub token_url: &'static str,
    pub profile_url: &'static str,
    pub scope: &'static str,
    /// Sends a `plain` PKCE challenge and authenticates the token request with
    /// HTTP basic auth
    pub pkce: bool,
}

pub fn endpoints(provider: OAuthProvider) -> ProviderEndpoints {
    match provider {
        OAuthProvider::GitHub => ProviderEndpoints {
            authorize_url: "https://github.com/login/oauth/authorize",
            token_url: "https://github.com/login/oauth/access_token",
            profile_url: "https://api.github.com/user",
            scope: "read:user",
            pkce: false,
        },
        OAuthProvider::Twitter => ProviderEndpoints {
            authorize_url: "https://twitter.com/i/oauth2/authorize",
            token_url: "https://api.twitter.com/2/oauth2/token",
            profile_url: "https://api.twitter.com/2/users/me?user.fields=profile_image_url",
            scope: "users.read tweet.read",
            pkce: true,
        },
        OAuthProvider::Google => ProviderEndpoints {
            authorize_url: "https://accounts.google.com/o/oauth2/v2/auth",
            token_url: "https://oauth2.googleapis.com/token",
            profile_url: "https://www.googleapis.com/oauth2/v3/userinfo",
            scope: "openid profile",
            pkce: false,
        },
        OAuthProvider::LinkedIn => ProviderEndpoints {
            authorize_url: "https://www.linkedin.com/oauth/v2/authorization",
            token_url: "https://www.linkedin.com/oauth/v2/accessToken",
            profile_url: "https://api.linkedin.com/v2/userinfo",
            scope: "openid profile",
            pkce: false,
        },
    }
}

/// `BASE_URL` + `/auth/<provider>/callback`.
pub fn callback_url(base_url: &str, provider: OAuthProvider) -> String {
    format!("{}/auth/{}/callback", base_url.trim_end_matches('/'), provider.slug())
}

pub fn authorize_url(
    provider: OAuthProvider,
    credentials: &OAuthCredentials,
    redirect_uri: &str,
    state: &str,
    code_verifier: Option<&str>,
) -> Result<Url, AppError> {
    let endpoints = endpoints(provider);
    let mut params = vec![
        ("client_id", credentials.client_id.as_str()),
        ("redirect_uri", redirect_uri),
        ("response_type", "code"),
        ("scope", endpoints.scope),
        ("state", state),
    ];
    if let Some(verifier) = code_verifier {
        params.push(("code_challenge", verifier));
        params.push(("code_challenge_method", "plain"));
    }

    Url::parse_with_params(endpoints.authorize_url, &params).map_err(AppError::internal)
}

#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
}

/// The part of a provider profile kept on the local user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthProfile {
    pub id: String,
    pub name: String,
    pub photo_url: Option<String>,
}

fn string_field(value: &Value, key: &str) -> Option<String> {
    match value.get(key)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Reads `{id, name, photoUrl}` out of the provider's profile document.
pub fn parse_profile(provider: OAuthProvider, body: &Value) -> Result<OAuthProfile, AppError> {
    let null = Value::Null;
    let (root, id_key, name_keys, photo_key): (&Value, &str, &[&str], &str) = match provider {
        OAuthProvider::GitHub => (body, "id", &["name", "login"][..], "avatar_url"),
        OAuthProvider::Twitter => (
            body.get("data").unwrap_or(&null),
            "id",
            &["name", "username"][..],
            "profile_image_url",
        ),
        OAuthProvider::Google | OAuthProvider::LinkedIn => {
            (body, "sub", &["name", "given_name"][..], "picture")
        }
    };

    let id = string_field(root, id_key).ok_or_else(|| {
        AppError::new(
            axum::http::StatusCode::BAD_GATEWAY,
            anyhow!("{} profile has no {}", provider, id_key),
        )
    })?;
    let name = name_keys
        .iter()
        .find_map(|key| string_field(root, key))
        .unwrap_or_else(|| id.clone());

    Ok(OAuthProfile {
        id,
        name,
        photo_url: string_field(root, photo_key),
    })
}
