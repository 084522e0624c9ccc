//! Quizzes: CRUD with an optional image, playing and checking answers.

pub mod controller;
pub mod service;
