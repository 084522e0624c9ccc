//! Seed data definitions.

/// Seed data for creating a local user.
#[derive(Clone, Debug)]
pub struct UserSeed {
    pub username: String,
    pub password: String,
    pub is_admin: bool,
}

/// Seed data for creating a quiz authored by one of the seeded users.
#[derive(Clone, Debug)]
pub struct QuizSeed {
    pub question: String,
    pub answer: String,
    /// Username of the author, one of [`SeedConfig::users`]
    pub author: String,
}

/// Complete configuration for database seeding.
#[derive(Clone, Debug)]
pub struct SeedConfig {
    pub users: Vec<UserSeed>,
    pub quizzes: Vec<QuizSeed>,
}

impl Default for SeedConfig {
    fn default() -> Self {
        let user = |username: &str, password: &str, is_admin: bool| UserSeed {
            username: username.to_string(),
            password: password.to_string(),
            is_admin,
        };
        let quiz = |question: &str, answer: &str, author: &str| QuizSeed {
            question: question.to_string(),
            answer: answer.to_string(),
            author: author.to_string(),
        };

        Self {
            users: vec![user("admin", "1234", true), user("pepe", "5678", false)],
            quizzes: vec![
                quiz("Capital of Italy", "Rome", "admin"),
                quiz("Capital of France", "Paris", "admin"),
                quiz("Capital of Spain", "Madrid", "pepe"),
                quiz("Capital of Portugal", "Lisbon", "pepe"),
            ],
        }
    }
}

impl SeedConfig {
    /// Usernames created by this configuration.
    pub fn usernames(&self) -> Vec<String> {
        self.users.iter().map(|u| u.username.clone()).collect()
    }
}
