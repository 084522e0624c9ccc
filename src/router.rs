use std::collections::BTreeMap;

use axum::extract::{DefaultBodyLimit, OriginalUri};
use axum::http::{HeaderValue, Method};
use axum::routing::{MethodFilter, MethodRouter, get, on, post};
use axum::{Extension, Router, middleware};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, warn};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use quiz_core::{AppError, MAX_UPLOAD_BYTES};

use crate::docs::ApiDoc;
use crate::logging::logging_middleware;
use crate::middleware::autoload::{autoload, load_token_owner, route_not_found};
use crate::middleware::gates::{GateChain, enforce_gates};
use crate::middleware::method_override::method_override;
use crate::middleware::restore::save_back;
use crate::middleware::session::session_layer;
use crate::middleware::token::require_api_token;
use crate::modules::session::service::check_login_expires;
use crate::modules::{api, favourites, oauth, pages, quizzes, session, users};
use crate::routes::{Action, RouteEntry, route_table};
use crate::state::AppState;
use crate::views::error_pages;

/// Multipart framing allowance on top of the upload ceiling.
const MULTIPART_OVERHEAD_BYTES: usize = 1024 * 1024;

async fn not_found(OriginalUri(uri): OriginalUri) -> AppError {
    route_not_found(uri.path())
}

fn action_router(filter: MethodFilter, action: Action) -> MethodRouter<AppState> {
    use Action::*;

    match action {
        SessionNew => on(filter, session::controller::new),
        SessionCreate => on(filter, session::controller::create),
        SessionDestroy => on(filter, session::controller::destroy),
        OAuthStart(provider) => on(filter, oauth::controller::start).layer(Extension(provider)),
        OAuthCallback(provider) => {
            on(filter, oauth::controller::callback).layer(Extension(provider))
        }
        GoBack => on(filter, pages::controller::go_back),
        Home => on(filter, pages::controller::home),
        Author => on(filter, pages::controller::author),
        UsersIndex => on(filter, users::controller::index),
        UsersShow => on(filter, users::controller::show),
        UsersNew => on(filter, users::controller::new),
        UsersCreate => on(filter, users::controller::create),
        UsersEdit => on(filter, users::controller::edit),
        UsersUpdate => on(filter, users::controller::update),
        UsersDestroy => on(filter, users::controller::destroy),
        UserQuizzesIndex | QuizzesIndex => on(filter, quizzes::controller::index),
        FavouriteAdd => on(filter, favourites::controller::add),
        FavouriteRemove => on(filter, favourites::controller::remove),
        QuizzesShow => on(filter, quizzes::controller::show),
        QuizzesNew => on(filter, quizzes::controller::new),
        QuizzesCreate => on(filter, quizzes::controller::create),
        QuizzesEdit => on(filter, quizzes::controller::edit),
        QuizzesUpdate => on(filter, quizzes::controller::update),
        QuizzesDestroy => on(filter, quizzes::controller::destroy),
        QuizzesPlay => on(filter, quizzes::controller::play),
        QuizzesCheck => on(filter, quizzes::controller::check),
        QuizzesAttachment => on(filter, quizzes::controller::attachment),
    }
}

/// One route of the table: the action wrapped in its body limit and gate chain.
fn entry_router(entry: &RouteEntry) -> Option<MethodRouter<AppState>> {
    let filter = match MethodFilter::try_from(entry.method.clone()) {
        Ok(filter) => filter,
        Err(e) => {
            warn!(method = %entry.method, path = %entry.path, error = %e, "Skipping route");
            return None;
        }
    };

    let mut router = action_router(filter, entry.action);

    if entry.action.accepts_upload() {
        router = router.layer(DefaultBodyLimit::max(
            MAX_UPLOAD_BYTES + MULTIPART_OVERHEAD_BYTES,
        ));
    }

    if !entry.gates.is_empty() {
        router = router.layer(middleware::from_fn_with_state(
            GateChain::new(&entry.gates),
            enforce_gates,
        ));
    }

    Some(router)
}

/// Page routes built from the route table, with the session, login expiry and
/// error page stages around them.
pub fn init_page_router(state: &AppState) -> Router<AppState> {
    let mut by_path: BTreeMap<String, MethodRouter<AppState>> = BTreeMap::new();
    for entry in route_table(&state.config) {
        let Some(method_router) = entry_router(&entry) else {
            continue;
        };
        let merged = match by_path.remove(&entry.path) {
            Some(existing) => existing.merge(method_router),
            None => method_router,
        };
        by_path.insert(entry.path, merged);
    }

    debug!(paths = by_path.len(), "Page routes registered");

    let mut router = Router::new();
    for (path, method_router) in by_path {
        router = router.route(&path, method_router);
    }

    router
        .route_layer(middleware::from_fn_with_state(state.clone(), autoload))
        .route_layer(middleware::from_fn(save_back))
        .fallback(not_found)
        .layer(middleware::from_fn(error_pages))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            check_login_expires,
        ))
        .layer(middleware::from_fn_with_state(state.clone(), session_layer))
}

fn cors_layer(state: &AppState) -> CorsLayer {
    let allowed_origins: Vec<HeaderValue> = state
        .config
        .cors
        .allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
            axum::http::header::ACCEPT,
        ])
        .allow_credentials(true)
}

/// JSON API, mounted under `/api`.
pub fn init_api_router(state: &AppState) -> Router<AppState> {
    let token = middleware::from_fn_with_state(state.clone(), require_api_token);

    Router::new()
        .route("/login", post(api::controller::login))
        .route(
            "/users",
            get(api::controller::list_users).layer(token.clone()),
        )
        .route(
            "/users/tokenOwner",
            get(api::controller::token_owner)
                .layer(middleware::from_fn_with_state(
                    state.clone(),
                    load_token_owner,
                ))
                .layer(token.clone()),
        )
        .route(
            "/users/{userId}",
            get(api::controller::show_user)
                .layer(middleware::from_fn_with_state(state.clone(), autoload))
                .layer(token),
        )
        .fallback(not_found)
        .layer(cors_layer(state))
}

pub fn init_router(state: AppState) -> Router {
    let app = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .nest("/api", init_api_router(&state))
        .merge(init_page_router(&state))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(logging_middleware));

    // The method override has to run before routing picks a route.
    Router::new()
        .fallback_service(app)
        .layer(middleware::from_fn(method_override))
}
