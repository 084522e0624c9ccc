mod common;

use axum::http::{StatusCode, header};
use common::{
    body_json, create_test_quiz, create_test_user, get, location, login, post_empty,
    post_multipart, quiz_multipart, session_cookie, setup_test_app,
};
use http_body_util::BodyExt;
use quiz::quiz_core::MAX_UPLOAD_BYTES;
use sqlx::PgPool;
use tower::ServiceExt;

const PNG: &[u8] = b"\x89PNG\r\n\x1a\nnot-really-a-png";

#[sqlx::test(migrations = "./migrations")]
async fn test_create_quiz_with_image(pool: PgPool) {
    let pepe = create_test_user(&pool, "pepe", "pepepass", false).await;
    let app = setup_test_app(pool.clone());
    let cookie = login(&app, "pepe", "pepepass").await;

    let body = quiz_multipart("  Capital of Spain?  ", " Madrid ", Some(("image/png", PNG)));
    let response = app
        .clone()
        .oneshot(post_multipart("/quizzes", body, &cookie))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let target = location(&response).unwrap();
    assert!(target.starts_with("/quizzes/"));

    let response = app
        .clone()
        .oneshot(get(&target, Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let quiz = &body["locals"]["quiz"];
    assert_eq!(quiz["question"], "Capital of Spain?");
    assert_eq!(quiz["answer"], "Madrid");
    assert_eq!(quiz["authorId"], pepe.into_inner());
    assert_eq!(quiz["author"]["username"], "pepe");
    assert_eq!(quiz["attachment"]["mime"], "image/png");
    assert_eq!(
        body["locals"]["messages"][0]["text"],
        "Quiz created successfully."
    );

    let response = app
        .oneshot(get(&format!("{target}/attachment"), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "image/png");
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&bytes[..], PNG);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_oversize_upload_is_rejected(pool: PgPool) {
    create_test_user(&pool, "pepe", "pepepass", false).await;
    let app = setup_test_app(pool.clone());
    let cookie = login(&app, "pepe", "pepepass").await;

    let image = vec![0u8; MAX_UPLOAD_BYTES + 1];
    let body = quiz_multipart("Big?", "Yes", Some(("image/png", &image)));
    let response = app
        .oneshot(post_multipart("/quizzes", body, &cookie))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM quizzes")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_invalid_quiz_forms(pool: PgPool) {
    create_test_user(&pool, "pepe", "pepepass", false).await;
    let app = setup_test_app(pool.clone());
    let cookie = login(&app, "pepe", "pepepass").await;

    let blank = quiz_multipart("   ", "Madrid", None);
    let response = app
        .clone()
        .oneshot(post_multipart("/quizzes", blank, &cookie))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let text = quiz_multipart("Q?", "A", Some(("text/plain", b"hello")));
    let response = app
        .oneshot(post_multipart("/quizzes", text, &cookie))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_index_search_and_author_filter(pool: PgPool) {
    let admin = create_test_user(&pool, "admin", "adminpass", true).await;
    let pepe = create_test_user(&pool, "pepe", "pepepass", false).await;
    create_test_quiz(&pool, admin, "Capital of Portugal", "Lisbon").await;
    create_test_quiz(&pool, pepe, "Capital of Italy", "Rome").await;
    create_test_quiz(&pool, pepe, "Capital of France", "Paris").await;
    let app = setup_test_app(pool.clone());

    let response = app
        .clone()
        .oneshot(get("/quizzes", None))
        .await
        .unwrap();
    let body = body_json(response).await;
    let questions: Vec<&str> = body["locals"]["quizzes"]
        .as_array()
        .unwrap()
        .iter()
        .map(|q| q["question"].as_str().unwrap())
        .collect();
    assert_eq!(
        questions,
        ["Capital of France", "Capital of Italy", "Capital of Portugal"]
    );
    assert!(body["locals"]["quizzes"][0].get("answer").is_none());

    let response = app
        .clone()
        .oneshot(get("/quizzes?search=capital%20FRANCE", None))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["locals"]["quizzes"].as_array().unwrap().len(), 1);
    assert_eq!(body["locals"]["search"], "capital FRANCE");

    let cookie = login(&app, "pepe", "pepepass").await;
    let response = app
        .oneshot(get(&format!("/users/{admin}/quizzes"), Some(&cookie)))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["locals"]["quizzes"].as_array().unwrap().len(), 1);
    assert_eq!(body["locals"]["author"]["username"], "admin");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_page_far_past_the_end_is_empty(pool: PgPool) {
    let pepe = create_test_user(&pool, "pepe", "pepepass", false).await;
    create_test_quiz(&pool, pepe, "Capital of France", "Paris").await;
    let app = setup_test_app(pool.clone());

    let response = app
        .clone()
        .oneshot(get("/quizzes?page=9223372036854775807", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!(body["locals"]["quizzes"].as_array().unwrap().is_empty());
    assert_eq!(body["locals"]["pagination"]["total"], 1);
    assert_eq!(body["locals"]["pagination"]["hasMore"], false);

    let cookie = login(&app, "pepe", "pepepass").await;
    let response = app
        .oneshot(get("/users?page=9223372036854775807", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!(body["locals"]["users"].as_array().unwrap().is_empty());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_play_and_check(pool: PgPool) {
    let admin = create_test_user(&pool, "admin", "adminpass", true).await;
    let quiz = create_test_quiz(&pool, admin, "Capital of France", "Paris").await;
    let app = setup_test_app(pool.clone());

    let response = app
        .clone()
        .oneshot(get(&format!("/quizzes/{quiz}/play"), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["view"], "quizzes/play");
    assert!(body["locals"]["quiz"].get("answer").is_none());

    let response = app
        .clone()
        .oneshot(get(&format!("/quizzes/{quiz}/check?answer=%20pARis%20"), None))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["view"], "quizzes/result");
    assert_eq!(body["locals"]["result"], true);

    let response = app
        .clone()
        .oneshot(get(&format!("/quizzes/{quiz}/check?answer=Rome"), None))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["locals"]["result"], false);

    let response = app
        .oneshot(get(&format!("/quizzes/{quiz}/attachment"), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_missing_quiz_is_not_found(pool: PgPool) {
    let app = setup_test_app(pool.clone());

    let response = app
        .oneshot(get("/quizzes/424242/play", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["locals"]["message"], "No exist quizId=424242");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_only_author_or_admin_manage_a_quiz(pool: PgPool) {
    let pepe = create_test_user(&pool, "pepe", "pepepass", false).await;
    create_test_user(&pool, "juan", "juanpass", false).await;
    create_test_user(&pool, "admin", "adminpass", true).await;
    let quiz = create_test_quiz(&pool, pepe, "Capital of France", "Paris").await;
    let app = setup_test_app(pool.clone());

    let cookie = login(&app, "juan", "juanpass").await;
    let response = app
        .clone()
        .oneshot(get(&format!("/quizzes/{quiz}/edit"), Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let cookie = login(&app, "admin", "adminpass").await;
    let response = app
        .clone()
        .oneshot(get(&format!("/quizzes/{quiz}/edit"), Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(post_empty(
            &format!("/quizzes/{quiz}?_method=DELETE"),
            Some(&cookie),
        ))
        .await
        .unwrap();
    assert_eq!(location(&response).as_deref(), Some("/goback"));

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM quizzes")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_update_replaces_the_image(pool: PgPool) {
    create_test_user(&pool, "pepe", "pepepass", false).await;
    let app = setup_test_app(pool.clone());
    let cookie = login(&app, "pepe", "pepepass").await;

    let body = quiz_multipart("Q?", "A", Some(("image/png", PNG)));
    let response = app
        .clone()
        .oneshot(post_multipart("/quizzes", body, &cookie))
        .await
        .unwrap();
    let target = location(&response).unwrap();

    let body = quiz_multipart("Q2?", "A2", Some(("image/gif", b"GIF89a")));
    let response = app
        .clone()
        .oneshot(post_multipart(&format!("{target}?_method=PUT"), body, &cookie))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response).as_deref(), Some("/goback"));

    let attachments: Vec<String> = sqlx::query_scalar("SELECT mime FROM attachments")
        .fetch_all(&pool)
        .await
        .unwrap();
    assert_eq!(attachments, ["image/gif"]);

    // Without a new image the current one is kept.
    let body = quiz_multipart("Q3?", "A3", None);
    app.oneshot(post_multipart(&format!("{target}?_method=PUT"), body, &cookie))
        .await
        .unwrap();
    let (question, has_image): (String, bool) =
        sqlx::query_as("SELECT question, attachment_id IS NOT NULL FROM quizzes")
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(question, "Q3?");
    assert!(has_image);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_favourites_are_idempotent(pool: PgPool) {
    let pepe = create_test_user(&pool, "pepe", "pepepass", false).await;
    let quiz = create_test_quiz(&pool, pepe, "Capital of France", "Paris").await;
    let app = setup_test_app(pool.clone());
    let cookie = login(&app, "pepe", "pepepass").await;
    let uri = format!("/users/{pepe}/favourites/{quiz}");

    for _ in 0..2 {
        let response = app
            .clone()
            .oneshot(post_empty(&format!("{uri}?_method=PUT"), Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response).as_deref(), Some("/goback"));
    }

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM favourites")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 1);

    let response = app
        .clone()
        .oneshot(get("/quizzes", Some(&cookie)))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["locals"]["quizzes"][0]["favourite"], true);

    for _ in 0..2 {
        let response = app
            .clone()
            .oneshot(post_empty(&format!("{uri}?_method=DELETE"), Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
    }

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM favourites")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_favourites_of_someone_else_are_forbidden(pool: PgPool) {
    let pepe = create_test_user(&pool, "pepe", "pepepass", false).await;
    create_test_user(&pool, "juan", "juanpass", false).await;
    let quiz = create_test_quiz(&pool, pepe, "Capital of France", "Paris").await;
    let app = setup_test_app(pool.clone());
    let cookie = login(&app, "juan", "juanpass").await;

    let response = app
        .oneshot(post_empty(
            &format!("/users/{pepe}/favourites/{quiz}?_method=PUT"),
            Some(&cookie),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_restoration_ignores_edit_pages(pool: PgPool) {
    let pepe = create_test_user(&pool, "pepe", "pepepass", false).await;
    let quiz = create_test_quiz(&pool, pepe, "Capital of France", "Paris").await;
    let app = setup_test_app(pool.clone());
    let cookie = login(&app, "pepe", "pepepass").await;

    let response = app
        .clone()
        .oneshot(get("/quizzes?page=1", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(get(&format!("/quizzes/{quiz}/edit"), Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(get("/goback", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(location(&response).as_deref(), Some("/quizzes?page=1"));

    let response = app.oneshot(get("/goback", Some(&cookie))).await.unwrap();
    assert_eq!(location(&response).as_deref(), Some("/"));
    assert!(session_cookie(&response).is_some());
}
