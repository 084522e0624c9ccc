//! Static pages and the restoration redirect.

pub mod controller;
