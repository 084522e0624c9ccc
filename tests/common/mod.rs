#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response, header};
use http_body_util::BodyExt;
use quiz::quiz_config::{AppConfig, DatabaseConfig, OAuthCredentials, OAuthProvider};
use quiz::quiz_core::hash_password;
use quiz::quiz_models::{QuizId, UserId};
use quiz::router::init_router;
use quiz::state::AppState;
use serde_json::Value;
use sqlx::PgPool;
use tower::ServiceExt;

pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.jwt.secret = "test-secret".to_string();
    config
}

pub fn config_with_github() -> AppConfig {
    let mut config = test_config();
    config.oauth = config
        .oauth
        .with(OAuthProvider::GitHub, OAuthCredentials::new("gh-id", "gh-secret"));
    config
}

/// App on a real database. Keep cloning the returned router: the session store
/// lives inside it.
pub fn setup_test_app(pool: PgPool) -> Router {
    setup_test_app_with(pool, test_config())
}

pub fn setup_test_app_with(pool: PgPool, config: AppConfig) -> Router {
    init_router(AppState::with_memory_sessions(pool, config))
}

/// App whose pool never connects, for tests that must not reach the database.
pub fn setup_offline_app(config: AppConfig) -> Router {
    let pool = quiz::quiz_db::lazy_db_pool(&DatabaseConfig::default()).unwrap();
    init_router(AppState::with_memory_sessions(pool, config))
}

pub async fn create_test_user(
    pool: &PgPool,
    username: &str,
    password: &str,
    is_admin: bool,
) -> UserId {
    let hashed = hash_password(password).unwrap();
    sqlx::query_scalar::<_, UserId>(
        "INSERT INTO users (username, password, is_admin) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(username)
    .bind(hashed)
    .bind(is_admin)
    .fetch_one(pool)
    .await
    .unwrap()
}

pub async fn create_oauth_user(pool: &PgPool, username: &str, account_type_id: i32) -> UserId {
    sqlx::query_scalar::<_, UserId>(
        "INSERT INTO users (username, account_type_id, profile_id, profile_name)
         VALUES ($1, $2, $1, $1) RETURNING id",
    )
    .bind(username)
    .bind(account_type_id)
    .fetch_one(pool)
    .await
    .unwrap()
}

pub async fn create_test_quiz(
    pool: &PgPool,
    author: UserId,
    question: &str,
    answer: &str,
) -> QuizId {
    sqlx::query_scalar::<_, QuizId>(
        "INSERT INTO quizzes (question, answer, author_id) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(question)
    .bind(answer)
    .bind(author)
    .fetch_one(pool)
    .await
    .unwrap()
}

/// `name=value` of the session cookie set by a response.
pub fn session_cookie<B>(response: &Response<B>) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with("quiz_sid="))
        .and_then(|v| v.split(';').next())
        .map(str::to_string)
}

pub fn location<B>(response: &Response<B>) -> Option<String> {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

pub fn post_form(uri: &str, form: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(form.to_string())).unwrap()
}

pub fn post_empty(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("POST").uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

/// Logs in through `POST /login` and returns the session cookie.
pub async fn login(app: &Router, username: &str, password: &str) -> String {
    let response = app
        .clone()
        .oneshot(post_form(
            "/login",
            &format!("username={username}&password={password}"),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(location(&response).as_deref(), Some("/"), "login failed");
    session_cookie(&response).expect("login sets the session cookie")
}

pub const BOUNDARY: &str = "quiz-test-boundary";

/// Multipart body with the quiz text fields and an optional image part.
pub fn quiz_multipart(question: &str, answer: &str, image: Option<(&str, &[u8])>) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in [("question", question), ("answer", answer)] {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some((mime, data)) = image {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"image\"\r\nContent-Type: {mime}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub fn post_multipart(uri: &str, body: Vec<u8>, cookie: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .header(header::COOKIE, cookie)
        .body(Body::from(body))
        .unwrap()
}
