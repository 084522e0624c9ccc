use std::time::Duration;

use dotenvy::dotenv;
use quiz::logging::init_tracing;
use quiz::router::init_router;
use quiz::state::{AppState, init_app_state};
use quiz_config::AppConfig;
use tracing::{error, info, warn};

/// How often expired sessions are purged.
const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(15 * 60);

fn spawn_session_sweeper(state: &AppState) {
    let sessions = state.sessions.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(SESSION_SWEEP_INTERVAL);
        loop {
            interval.tick().await;
            match sessions.sweep().await {
                Ok(0) => {}
                Ok(removed) => info!(removed, "Expired sessions swept"),
                Err(e) => warn!(error = %e.message(), "Session sweep failed"),
            }
        }
    });
}

#[tokio::main]
async fn main() {
    dotenv().ok();

    if let Err(e) = init_tracing() {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    let config = AppConfig::from_env();
    let addr = config.server.listen_addr();

    let state = match init_app_state(config).await {
        Ok(state) => state,
        Err(e) => {
            error!(error = %e, "Failed to connect to database");
            std::process::exit(1);
        }
    };

    if let Err(e) = quiz_db::run_migrations(&state.db).await {
        error!(error = %e, "Failed to run migrations");
        std::process::exit(1);
    }

    spawn_session_sweeper(&state);

    let enabled: Vec<&str> = state.config.oauth.enabled().map(|p| p.slug()).collect();
    info!(
        oauth = ?enabled,
        open_register = state.config.open_register,
        "Routes configured"
    );

    let app = init_router(state);

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(addr = %addr, error = %e, "Failed to bind");
            std::process::exit(1);
        }
    };

    info!("Server running on http://{}", addr);
    info!("Swagger UI available at http://{}/swagger-ui", addr);

    if let Err(e) = axum::serve(listener, app).await {
        error!(error = %e, "Server error");
        std::process::exit(1);
    }
}
