//! Favourite quizzes of a user.

pub mod controller;
pub mod service;
