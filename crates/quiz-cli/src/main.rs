use clap::{Parser, Subcommand};
use dialoguer::{Input, Password};
use dotenvy::dotenv;
use quiz_cli::admin::create_admin;
use quiz_cli::seeder::{self, SeedConfig};
use quiz_config::DatabaseConfig;
use sqlx::PgPool;

#[derive(Parser)]
#[command(name = "quiz-cli")]
#[command(about = "Quiz CLI - Administrative tools for the Quiz application", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply pending database migrations
    Migrate,
    /// Create a new administrator account
    CreateAdmin {
        /// Username of the administrator
        #[arg(short = 'u', long)]
        username: Option<String>,

        /// Password (will be prompted securely if not provided)
        #[arg(short = 'p', long)]
        password: Option<String>,
    },
    /// Seed the database with the admin and pepe users and sample quizzes
    Seed,
    /// Delete the seeded users together with their quizzes
    ClearSeed,
}

#[tokio::main]
async fn main() {
    dotenv().ok();

    let cli = Cli::parse();

    let pool = match quiz_db::init_db_pool(&DatabaseConfig::from_env()).await {
        Ok(pool) => pool,
        Err(e) => {
            eprintln!("❌ Failed to connect to database: {}", e);
            std::process::exit(1);
        }
    };

    match cli.command {
        Commands::Migrate => handle_migrate(&pool).await,
        Commands::CreateAdmin { username, password } => {
            handle_create_admin(&pool, username, password).await
        }
        Commands::Seed => handle_seed(&pool).await,
        Commands::ClearSeed => handle_clear_seed(&pool).await,
    }
}

async fn handle_migrate(pool: &PgPool) {
    match quiz_db::run_migrations(pool).await {
        Ok(()) => println!("✅ Migrations applied"),
        Err(e) => {
            eprintln!("\n❌ Error running migrations: {}", e);
            std::process::exit(1);
        }
    }
}

async fn handle_create_admin(pool: &PgPool, username: Option<String>, password: Option<String>) {
    let username = match username {
        Some(username) => username,
        None => match Input::<String>::new().with_prompt("Username").interact_text() {
            Ok(username) => username,
            Err(e) => {
                eprintln!("❌ Failed to read username: {}", e);
                std::process::exit(1);
            }
        },
    };

    let password = match password {
        Some(password) => password,
        None => match Password::new()
            .with_prompt("Password")
            .with_confirmation("Confirm password", "Passwords don't match")
            .interact()
        {
            Ok(password) => password,
            Err(e) => {
                eprintln!("❌ Failed to read password: {}", e);
                std::process::exit(1);
            }
        },
    };

    match create_admin(pool, &username, &password).await {
        Ok(id) => {
            println!("\n✅ Administrator created successfully!");
            println!("   Username: {}", username);
            println!("   Id: {}", id);
        }
        Err(e) => {
            eprintln!("\n❌ Error creating administrator: {}", e);
            std::process::exit(1);
        }
    }
}

async fn handle_seed(pool: &PgPool) {
    if let Err(e) = seeder::seed_all(pool, &SeedConfig::default()).await {
        eprintln!("\n❌ Error seeding database: {}", e);
        std::process::exit(1);
    }
}

async fn handle_clear_seed(pool: &PgPool) {
    match seeder::clear_seed(pool, &SeedConfig::default()).await {
        Ok(count) => println!("✅ Cleared {} seeded users", count),
        Err(e) => {
            eprintln!("\n❌ Error clearing seed data: {}", e);
            std::process::exit(1);
        }
    }
}
