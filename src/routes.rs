//! The page route table.
//!
//! Every page route is a [`RouteEntry`]: method, path pattern, the ordered gates
//! guarding it and the controller action it ends in. The table is plain data
//! derived from an [`AppConfig`], so which routes exist and how they are guarded
//! can be inspected (and tested) without a database or the process environment.
//! [`crate::router`] turns it into an axum router.

use axum::http::Method;
use quiz_config::{AppConfig, OAuthProvider};

/// Authorization checks a route can require. Run in declared order; the first
/// failing gate ends the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Gate {
    /// A user is logged in. Failure redirects to `/login`.
    LoginRequired,
    /// The logged-in user is an administrator.
    AdminRequired,
    /// The logged-in user is an administrator or the `userId` of the route.
    AdminOrMyselfRequired,
    /// The logged-in user is an administrator or the author of the `quizId` of
    /// the route.
    AdminOrAuthorRequired,
    /// The `userId` of the route is a local (password) account.
    IsLocalRequired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    SessionNew,
    SessionCreate,
    SessionDestroy,
    OAuthStart(OAuthProvider),
    OAuthCallback(OAuthProvider),
    GoBack,
    Home,
    Author,
    UsersIndex,
    UsersShow,
    UsersNew,
    UsersCreate,
    UsersEdit,
    UsersUpdate,
    UsersDestroy,
    UserQuizzesIndex,
    FavouriteAdd,
    FavouriteRemove,
    QuizzesIndex,
    QuizzesShow,
    QuizzesNew,
    QuizzesCreate,
    QuizzesEdit,
    QuizzesUpdate,
    QuizzesDestroy,
    QuizzesPlay,
    QuizzesCheck,
    QuizzesAttachment,
}

impl Action {
    /// Actions reading a multipart body with an image.
    pub fn accepts_upload(&self) -> bool {
        matches!(self, Action::QuizzesCreate | Action::QuizzesUpdate)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteEntry {
    pub method: Method,
    pub path: String,
    pub gates: Vec<Gate>,
    pub action: Action,
}

impl RouteEntry {
    fn new(method: Method, path: impl Into<String>, gates: &[Gate], action: Action) -> Self {
        Self {
            method,
            path: path.into(),
            gates: gates.to_vec(),
            action,
        }
    }
}

/// Matched route patterns whose GET requests are remembered as the place
/// `/goback` returns to.
pub const RESTORATION_ROUTES: &[&str] = &[
    "/",
    "/author",
    "/users",
    "/users/{userId}/quizzes",
    "/quizzes",
];

pub fn is_restoration_route(method: &Method, matched_path: &str) -> bool {
    method == Method::GET && RESTORATION_ROUTES.contains(&matched_path)
}

/// Every page route registered for `config`.
pub fn route_table(config: &AppConfig) -> Vec<RouteEntry> {
    use Action::*;
    use Gate::*;

    let mut routes = vec![
        RouteEntry::new(Method::GET, "/login", &[], SessionNew),
        RouteEntry::new(Method::POST, "/login", &[], SessionCreate),
    ];

    for provider in config.oauth.enabled() {
        let slug = provider.slug();
        routes.push(RouteEntry::new(
            Method::GET,
            format!("/auth/{slug}"),
            &[],
            OAuthStart(provider),
        ));
        routes.push(RouteEntry::new(
            Method::GET,
            format!("/auth/{slug}/callback"),
            &[],
            OAuthCallback(provider),
        ));
    }

    let registration: &[Gate] = if config.open_register {
        &[]
    } else {
        &[LoginRequired, AdminRequired]
    };

    routes.extend([
        RouteEntry::new(Method::DELETE, "/login", &[], SessionDestroy),
        RouteEntry::new(Method::GET, "/goback", &[], GoBack),
        RouteEntry::new(Method::GET, "/", &[], Home),
        RouteEntry::new(Method::GET, "/author", &[], Author),
        // Users
        RouteEntry::new(Method::GET, "/users", &[LoginRequired], UsersIndex),
        RouteEntry::new(Method::GET, "/users/{userId}", &[LoginRequired], UsersShow),
        RouteEntry::new(Method::GET, "/users/new", registration, UsersNew),
        RouteEntry::new(Method::POST, "/users", registration, UsersCreate),
        RouteEntry::new(
            Method::GET,
            "/users/{userId}/edit",
            &[LoginRequired, IsLocalRequired, AdminOrMyselfRequired],
            UsersEdit,
        ),
        RouteEntry::new(
            Method::PUT,
            "/users/{userId}",
            &[LoginRequired, IsLocalRequired, AdminOrMyselfRequired],
            UsersUpdate,
        ),
        RouteEntry::new(
            Method::DELETE,
            "/users/{userId}",
            &[LoginRequired, AdminOrMyselfRequired],
            UsersDestroy,
        ),
        RouteEntry::new(
            Method::GET,
            "/users/{userId}/quizzes",
            &[LoginRequired],
            UserQuizzesIndex,
        ),
        // Favourites
        RouteEntry::new(
            Method::PUT,
            "/users/{userId}/favourites/{quizId}",
            &[LoginRequired, AdminOrMyselfRequired],
            FavouriteAdd,
        ),
        RouteEntry::new(
            Method::DELETE,
            "/users/{userId}/favourites/{quizId}",
            &[LoginRequired, AdminOrMyselfRequired],
            FavouriteRemove,
        ),
        // Quizzes
        RouteEntry::new(Method::GET, "/quizzes", &[], QuizzesIndex),
        RouteEntry::new(
            Method::GET,
            "/quizzes/{quizId}",
            &[LoginRequired, AdminOrAuthorRequired],
            QuizzesShow,
        ),
        RouteEntry::new(Method::GET, "/quizzes/new", &[LoginRequired], QuizzesNew),
        RouteEntry::new(Method::POST, "/quizzes", &[LoginRequired], QuizzesCreate),
        RouteEntry::new(
            Method::GET,
            "/quizzes/{quizId}/edit",
            &[LoginRequired, AdminOrAuthorRequired],
            QuizzesEdit,
        ),
        RouteEntry::new(
            Method::PUT,
            "/quizzes/{quizId}",
            &[LoginRequired, AdminOrAuthorRequired],
            QuizzesUpdate,
        ),
        RouteEntry::new(
            Method::DELETE,
            "/quizzes/{quizId}",
            &[LoginRequired, AdminOrAuthorRequired],
            QuizzesDestroy,
        ),
        RouteEntry::new(Method::GET, "/quizzes/{quizId}/play", &[], QuizzesPlay),
        RouteEntry::new(Method::GET, "/quizzes/{quizId}/check", &[], QuizzesCheck),
        RouteEntry::new(
            Method::GET,
            "/quizzes/{quizId}/attachment",
            &[],
            QuizzesAttachment,
        ),
    ]);

    routes
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_config::OAuthCredentials;

    fn find<'a>(routes: &'a [RouteEntry], method: Method, path: &str) -> Option<&'a RouteEntry> {
        routes.iter().find(|r| r.method == method && r.path == path)
    }

    #[test]
    fn test_no_oauth_routes_without_credentials() {
        let routes = route_table(&AppConfig::default());
        assert!(routes.iter().all(|r| !r.path.starts_with("/auth/")));
    }

    #[test]
    fn test_oauth_routes_per_enabled_provider() {
        let mut config = AppConfig::default();
        config.oauth = config
            .oauth
            .with(OAuthProvider::GitHub, OAuthCredentials::new("id", "secret"));

        let routes = route_table(&config);
        let start = find(&routes, Method::GET, "/auth/github").unwrap();
        assert_eq!(start.action, Action::OAuthStart(OAuthProvider::GitHub));
        assert!(start.gates.is_empty());
        assert!(find(&routes, Method::GET, "/auth/github/callback").is_some());
        assert!(find(&routes, Method::GET, "/auth/google").is_none());
        assert!(find(&routes, Method::GET, "/auth/twitter").is_none());
        assert!(find(&routes, Method::GET, "/auth/linkedin").is_none());
    }

    #[test]
    fn test_route_table_is_deterministic() {
        let mut config = AppConfig::default();
        config.oauth = config
            .oauth
            .with(OAuthProvider::LinkedIn, OAuthCredentials::new("k", "s"))
            .with(OAuthProvider::Twitter, OAuthCredentials::new("k", "s"));
        assert_eq!(route_table(&config), route_table(&config));
    }

    #[test]
    fn test_closed_registration_requires_admin() {
        let routes = route_table(&AppConfig::default());
        for (method, path) in [(Method::GET, "/users/new"), (Method::POST, "/users")] {
            let entry = find(&routes, method, path).unwrap();
            assert_eq!(entry.gates, vec![Gate::LoginRequired, Gate::AdminRequired]);
        }
    }

    #[test]
    fn test_open_registration_has_no_gates() {
        let config = AppConfig {
            open_register: true,
            ..Default::default()
        };
        let routes = route_table(&config);
        for (method, path) in [(Method::GET, "/users/new"), (Method::POST, "/users")] {
            assert!(find(&routes, method, path).unwrap().gates.is_empty());
        }
    }

    #[test]
    fn test_gate_order_is_declared_order() {
        let routes = route_table(&AppConfig::default());
        let edit = find(&routes, Method::GET, "/users/{userId}/edit").unwrap();
        assert_eq!(
            edit.gates,
            vec![
                Gate::LoginRequired,
                Gate::IsLocalRequired,
                Gate::AdminOrMyselfRequired
            ]
        );
        let destroy = find(&routes, Method::DELETE, "/quizzes/{quizId}").unwrap();
        assert_eq!(
            destroy.gates,
            vec![Gate::LoginRequired, Gate::AdminOrAuthorRequired]
        );
    }

    #[test]
    fn test_no_duplicate_routes() {
        let routes = route_table(&AppConfig::default());
        for (i, a) in routes.iter().enumerate() {
            for b in &routes[i + 1..] {
                assert!(
                    !(a.method == b.method && a.path == b.path),
                    "duplicate {} {}",
                    a.method,
                    a.path
                );
            }
        }
    }

    #[test]
    fn test_restoration_routes() {
        assert!(is_restoration_route(&Method::GET, "/quizzes"));
        assert!(is_restoration_route(&Method::GET, "/users/{userId}/quizzes"));
        assert!(!is_restoration_route(&Method::POST, "/quizzes"));
        assert!(!is_restoration_route(&Method::GET, "/quizzes/{quizId}/edit"));
        assert!(!is_restoration_route(&Method::GET, "/goback"));
    }

    #[test]
    fn test_upload_actions() {
        assert!(Action::QuizzesCreate.accepts_upload());
        assert!(Action::QuizzesUpdate.accepts_upload());
        assert!(!Action::UsersCreate.accepts_upload());
    }
}
