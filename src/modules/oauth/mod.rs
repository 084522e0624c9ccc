//! Third-party login through GitHub, Twitter, Google and LinkedIn.
//!
//! The flow is the OAuth 2 authorization code grant: `start` redirects to the
//! provider with a random `state` kept in the session, `callback` checks it,
//! exchanges the code for an access token, fetches the profile and logs in the
//! matching local user, creating it on first login.

pub mod controller;
pub mod provider;
pub mod service;
