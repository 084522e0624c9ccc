mod common;

use std::time::Duration;

use axum::http::StatusCode;
use common::{
    body_json, create_test_user, get, location, login, post_empty, post_form, session_cookie,
    setup_test_app, setup_test_app_with, test_config,
};
use sqlx::PgPool;
use tower::ServiceExt;

#[sqlx::test(migrations = "./migrations")]
async fn test_login_follows_local_redirects_only(pool: PgPool) {
    create_test_user(&pool, "pepe", "pepepass", false).await;
    let app = setup_test_app(pool.clone());

    let response = app
        .clone()
        .oneshot(post_form(
            "/login",
            "username=pepe&password=pepepass&redir=%2Fquizzes%3Fpage%3D2",
            None,
        ))
        .await
        .unwrap();
    assert_eq!(location(&response).as_deref(), Some("/quizzes?page=2"));

    let response = app
        .oneshot(post_form(
            "/login",
            "username=pepe&password=pepepass&redir=%2F%2Fevil.example",
            None,
        ))
        .await
        .unwrap();
    assert_eq!(location(&response).as_deref(), Some("/"));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_login_user_is_rendered_in_views(pool: PgPool) {
    let pepe = create_test_user(&pool, "pepe", "pepepass", false).await;
    let app = setup_test_app(pool.clone());
    let cookie = login(&app, "pepe", "pepepass").await;

    let response = app.oneshot(get("/", Some(&cookie))).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["view"], "index");
    assert_eq!(body["locals"]["loginUser"]["id"], pepe.into_inner());
    assert_eq!(body["locals"]["loginUser"]["username"], "pepe");
    assert_eq!(body["locals"]["loginUser"]["isAdmin"], false);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_logout(pool: PgPool) {
    create_test_user(&pool, "pepe", "pepepass", false).await;
    let app = setup_test_app(pool.clone());
    let cookie = login(&app, "pepe", "pepepass").await;

    let response = app
        .clone()
        .oneshot(post_empty("/login?_method=DELETE", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(location(&response).as_deref(), Some("/login"));

    let response = app.oneshot(get("/users", Some(&cookie))).await.unwrap();
    assert_eq!(location(&response).as_deref(), Some("/login"));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_idle_login_expires(pool: PgPool) {
    create_test_user(&pool, "pepe", "pepepass", false).await;
    let mut config = test_config();
    config.session.login_max_idle = Duration::from_millis(1);
    let app = setup_test_app_with(pool.clone(), config);
    let cookie = login(&app, "pepe", "pepepass").await;

    tokio::time::sleep(Duration::from_millis(50)).await;

    let response = app
        .clone()
        .oneshot(get("/users", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response).as_deref(), Some("/login"));

    let response = app.oneshot(get("/login", Some(&cookie))).await.unwrap();
    let body = body_json(response).await;
    assert!(body["locals"]["loginUser"].is_null());
    let texts: Vec<&str> = body["locals"]["messages"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["text"].as_str().unwrap())
        .collect();
    assert_eq!(
        texts,
        ["User session has expired.", "Login required: log in and retry."]
    );
}

#[sqlx::test(migrations = "./migrations")]
async fn test_active_login_is_kept(pool: PgPool) {
    create_test_user(&pool, "pepe", "pepepass", false).await;
    let app = setup_test_app(pool.clone());
    let cookie = login(&app, "pepe", "pepepass").await;

    for _ in 0..3 {
        let response = app
            .clone()
            .oneshot(get("/users", Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        // The expiry slides, so the session is saved again with the same id.
        assert_eq!(session_cookie(&response).as_deref(), Some(cookie.as_str()));
    }
}
