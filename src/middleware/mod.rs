//! Request pipeline stages.
//!
//! # Modules
//!
//! - [`method_override`]: `POST ?_method=PUT|DELETE` rewriting for HTML forms
//! - [`session`]: Cookie sessions, [`session::Session`] handle and stores
//! - [`restore`]: Restoration bookmarks for `/goback`
//! - [`autoload`]: Resolves `userId`/`quizId` into [`autoload::Loaded`]
//! - [`gates`]: Per-route authorization gates
//! - [`token`]: API token loader for `/api`
//!
//! # Order
//!
//! For page routes the stages run in this order:
//!
//! 1. `method_override` (before routing)
//! 2. `session_layer`, then the login expiry check
//! 3. routing, then `save_back` and `autoload`
//! 4. `enforce_gates` with the route's gate chain
//! 5. the controller action

pub mod autoload;
pub mod gates;
pub mod method_override;
pub mod restore;
pub mod session;
pub mod token;
