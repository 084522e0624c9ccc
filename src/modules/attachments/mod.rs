//! Attachment storage shared by quizzes (images) and users (OAuth photos).

pub mod service;
