//! JSON API for programmatic clients, authenticated with a bearer token.

pub mod controller;
