//! Database seeding for development.
//!
//! Seeding is idempotent: existing users are kept as they are and quizzes are
//! only inserted when their author has none with the same question.

mod models;

pub use models::{QuizSeed, SeedConfig, UserSeed};

use std::collections::HashMap;
use std::time::Instant;

use quiz_core::hash_password;
use quiz_models::{LOCAL_ACCOUNT_TYPE, UserId};
use sqlx::PgPool;

/// Seeds users, then their quizzes.
pub async fn seed_all(db: &PgPool, config: &SeedConfig) -> Result<(), Box<dyn std::error::Error>> {
    let start_time = Instant::now();
    println!("🌱 Seeding database...");

    let users = seed_users(db, &config.users).await?;
    let quizzes = seed_quizzes(db, &config.quizzes, &users).await?;

    println!(
        "✅ Seeded {} users and {} quizzes in {:?}",
        users.len(),
        quizzes,
        start_time.elapsed()
    );
    Ok(())
}

/// Inserts missing users and returns the id of every seeded username.
pub async fn seed_users(
    db: &PgPool,
    seeds: &[UserSeed],
) -> Result<HashMap<String, UserId>, Box<dyn std::error::Error>> {
    let mut ids = HashMap::new();

    for seed in seeds {
        let password_hash = hash_password(&seed.password)
            .map_err(|e| format!("Failed to hash password: {}", e.error))?;

        sqlx::query(
            "INSERT INTO users (username, password, is_admin, account_type_id)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT (username) DO NOTHING",
        )
        .bind(&seed.username)
        .bind(&password_hash)
        .bind(seed.is_admin)
        .bind(LOCAL_ACCOUNT_TYPE)
        .execute(db)
        .await?;

        let id = sqlx::query_scalar::<_, UserId>("SELECT id FROM users WHERE username = $1")
            .bind(&seed.username)
            .fetch_one(db)
            .await?;

        println!("   ✓ User {} (id {})", seed.username, id);
        ids.insert(seed.username.clone(), id);
    }

    Ok(ids)
}

/// Inserts missing quizzes, returning how many were created.
pub async fn seed_quizzes(
    db: &PgPool,
    seeds: &[QuizSeed],
    authors: &HashMap<String, UserId>,
) -> Result<u64, Box<dyn std::error::Error>> {
    let mut created = 0;

    for seed in seeds {
        let author_id = authors
            .get(&seed.author)
            .ok_or_else(|| format!("Unknown quiz author '{}'", seed.author))?;

        let result = sqlx::query(
            "INSERT INTO quizzes (question, answer, author_id)
             SELECT $1, $2, $3
             WHERE NOT EXISTS (
                 SELECT 1 FROM quizzes WHERE author_id = $3 AND question = $1
             )",
        )
        .bind(&seed.question)
        .bind(&seed.answer)
        .bind(author_id)
        .execute(db)
        .await?;

        created += result.rows_affected();
    }

    println!("   ✓ Created {} quizzes", created);
    Ok(created)
}

/// Deletes the seeded users. Their quizzes and favourites go with them.
pub async fn clear_seed(db: &PgPool, config: &SeedConfig) -> Result<u64, Box<dyn std::error::Error>> {
    let start_time = Instant::now();
    println!("🗑️  Clearing seeded users...");

    let result = sqlx::query("DELETE FROM users WHERE username = ANY($1)")
        .bind(config.usernames())
        .execute(db)
        .await?
        .rows_affected();

    println!(
        "   ✓ Deleted {} users in {:?}",
        result,
        start_time.elapsed()
    );

    Ok(result)
}
