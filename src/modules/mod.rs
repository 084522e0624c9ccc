pub mod api;
pub mod attachments;
pub mod favourites;
pub mod oauth;
pub mod pages;
pub mod quizzes;
pub mod session;
pub mod users;
