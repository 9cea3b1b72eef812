use std::net::SocketAddr;
use std::path::PathBuf;
use dotenv::dotenv;
use thiserror::Error;
use tokio::signal;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};
use janani_api::api::create_application;

/// Errors that stop the server from starting
#[derive(Debug, Error)]
enum AppError {
    /// The data directory could not be created
    #[error("Failed to create data directory {path}: {source}")]
    DataDir {
        path: String,
        source: std::io::Error,
    },
    /// PORT is not a valid port number
    #[error("Port parsing error: {0}")]
    PortParse(#[from] std::num::ParseIntError),
}

/// The main entry point for the JANANI health-score API server
///
/// This function:
/// 1. Initializes environment variables from .env file
/// 2. Sets up tracing for logging
/// 3. Ensures the data directory exists
/// 4. Initializes the database connection pool, falling back to in-memory history
/// 5. Creates and starts the Axum web application
/// 6. Handles graceful shutdown
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    if dotenv().is_err() {
        eprintln!("Warning: .env file not found or couldn't be read. Using environment variables.");
    }

    // Initialize tracing for structured logging
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(fmt::layer()
            .with_span_events(FmtSpan::CLOSE)
            .with_target(false)
            .with_ansi(true)
            .with_timer(fmt::time::uptime())
            .with_writer(std::io::stdout))
        .with(env_filter)
        .init();

    info!("Starting JANANI health-score API server");

    let db_path = prepare_data_dir()?;

    // Explicitly initialize the database connection pool
    match janani_domain::database::initialize_database_pool() {
        Ok(_) => info!("Using SQLite database at {}", db_path.display()),
        Err(e) => {
            error!("Failed to initialize database pool: {}", e);
            // Continue running; score history falls back to in-memory storage
            warn!("Score history will not survive a restart");
        }
    }

    // Initialize server start time for uptime reporting in health checks
    janani_api::api::handlers::health::initialize_server_start_time();

    // Create the Axum application with all routes and middleware
    let app = create_application().await;

    let port = read_port()?;
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Listening on {}", addr);

    // Create a TCP listener and bind to the address
    let listener = TcpListener::bind(addr).await?;

    // Serve the application with graceful shutdown support
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Create DATA_DIR and point DB_SQLITE_PATH into it unless already set
fn prepare_data_dir() -> Result<PathBuf, AppError> {
    let data_dir = std::env::var("DATA_DIR").unwrap_or_else(|_| "data".to_string());

    if !PathBuf::from(&data_dir).exists() {
        info!("Creating data directory: {}", data_dir);
        std::fs::create_dir_all(&data_dir).map_err(|source| AppError::DataDir {
            path: data_dir.clone(),
            source,
        })?;
    }

    match std::env::var("DB_SQLITE_PATH") {
        Ok(path) => Ok(PathBuf::from(path)),
        Err(_) => {
            let db_path = PathBuf::from(&data_dir).join("janani.db");
            std::env::set_var("DB_SQLITE_PATH", db_path.to_string_lossy().to_string());
            info!("Set DB_SQLITE_PATH to {}", db_path.display());
            Ok(db_path)
        }
    }
}

/// Port from the environment, 3000 when unset
fn read_port() -> Result<u16, AppError> {
    match std::env::var("PORT") {
        Ok(value) => Ok(value.parse::<u16>()?),
        Err(_) => Ok(3000),
    }
}

/// Sets up a signal handler for graceful shutdown
///
/// Waits for either CTRL+C or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutting down server...");
}
