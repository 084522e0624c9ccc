//! Local login, logout and login expiry.

pub mod controller;
pub mod service;
