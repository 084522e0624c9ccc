//! # Quiz
//!
//! A server-rendered quiz application built with Rust, Axum, and PostgreSQL.
//! Users register, log in locally or through an OAuth provider, write quizzes,
//! play the quizzes of others and keep a list of favourites.
//!
//! ## Architecture
//!
//! ```text
//! src/
//! ├── middleware/       # Session, method override, autoload, gates, restoration
//! ├── modules/          # Feature modules
//! │   ├── api/         # JSON API (token login, users)
//! │   ├── favourites/  # Favourite quizzes
//! │   ├── oauth/       # Third-party login
//! │   ├── pages/       # Home, author and "go back" pages
//! │   ├── quizzes/     # Quiz CRUD, play and check
//! │   ├── session/     # Local login, logout, login expiry
//! │   └── users/       # User CRUD
//! ├── routes.rs        # Route table: (method, path) -> gates -> action
//! └── router.rs        # Builds the axum router from the route table
//! ```
//!
//! Each feature module follows the same structure:
//!
//! - `mod.rs`: Module exports
//! - `controller.rs`: HTTP handlers
//! - `service.rs`: Database access and business rules
//!
//! ## Request pipeline
//!
//! ```text
//! method override -> session -> login expiry -> route match
//!     -> restoration bookmark -> autoload -> gates -> controller
//! ```
//!
//! Page routes answer with a view model (`{"view": ..., "locals": ...}`); the
//! `/api` routes answer with plain JSON and authenticate with a bearer token.
//!
//! ## Modules
//!
//! - [`docs`]: OpenAPI documentation for the JSON API
//! - [`logging`]: Request logging and tracing subscriber setup
//! - [`middleware`]: Request pipeline stages
//! - [`modules`]: Feature modules
//! - [`router`]: Main application router
//! - [`routes`]: Declarative route table
//! - [`state`]: Shared application state
//! - [`validator`]: Validated request extractors
//! - [`views`]: View models for page responses

pub mod docs;
pub mod logging;
pub mod middleware;
pub mod modules;
pub mod router;
pub mod routes;
pub mod state;
pub mod validator;
pub mod views;

// Re-export workspace crates for convenience
pub use quiz_auth;
pub use quiz_config;
pub use quiz_core;
pub use quiz_db;
pub use quiz_models;
