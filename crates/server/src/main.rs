use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vidcat_server::config::{DatabaseConfig, ServerConfig, Transport};
use vidcat_server::mcp::stdio::serve_stdio;
use vidcat_server::router::build_app_router;
use vidcat_server::state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // stdout carries protocol messages on the stdio transport, so logs go to
    // stderr for both transports.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vidcat_server=debug,vidcat_db=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut config = ServerConfig::from_env();
    if let Some(arg) = std::env::args().nth(1) {
        config.transport = arg
            .parse::<Transport>()
            .unwrap_or_else(|e| panic!("Invalid transport argument: {e}"));
    }
    tracing::info!(transport = %config.transport, "Loaded server configuration");

    let db_config = DatabaseConfig::from_env();
    let pool = vidcat_db::create_pool(&db_config.url, db_config.max_connections)
        .await
        .expect("Failed to connect to database");
    tracing::info!(max_connections = db_config.max_connections, "Database connection pool created");

    vidcat_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    vidcat_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    let state = AppState {
        pool: pool.clone(),
        config: Arc::new(config.clone()),
    };

    match config.transport {
        Transport::Stdio => {
            tokio::select! {
                result = serve_stdio(&state) => {
                    if let Err(err) = result {
                        tracing::error!(error = %err, "stdio transport failed");
                    }
                }
                () = shutdown_signal() => {}
            }
        }
        Transport::Http => {
            let app = build_app_router(state, &config);

            let addr = SocketAddr::new(
                config.host.parse().expect("Invalid HOST address"),
                config.port,
            );
            tracing::info!(%addr, "Starting server");

            let listener = tokio::net::TcpListener::bind(addr)
                .await
                .expect("Failed to bind to address");

            axum::serve(listener, app)
                .with_graceful_shutdown(shutdown_signal())
                .await
                .expect("Server error");
        }
    }

    pool.close().await;
    tracing::info!("Database pool closed, shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
