//! # Quiz CLI
//!
//! Administrative and seeding utilities for the Quiz application.
//!
//! This library crate provides the functionality used by the `quiz-cli` binary.
//!
//! ## Usage
//!
//! ```ignore
//! use quiz_cli::seeder::{seed_all, SeedConfig};
//!
//! seed_all(&pool, &SeedConfig::default()).await?;
//! ```

pub mod admin;
pub mod seeder;
