use std::net::SocketAddr;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tokio::signal;
use tracing_subscriber::EnvFilter;

use stockroom::auth::password;
use stockroom::config::{BootstrapAdmin, Config};
use stockroom::db;
use stockroom::models::Role;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    let config = Config::from_env().expect("Failed to load configuration");

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(&config.log_level)
        }))
        .init();

    tracing::info!("Starting Stockroom");

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await
        .expect("Failed to connect to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    tracing::info!("Migrations applied");

    if let Some(admin) = &config.bootstrap_admin {
        ensure_admin(&pool, admin).await?;
    }

    let addr = SocketAddr::new(config.host, config.port);
    let app = stockroom::build_app(pool, config);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on {addr}");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    Ok(())
}

/// Create the configured admin account unless the email is already taken.
async fn ensure_admin(pool: &PgPool, admin: &BootstrapAdmin) -> Result<(), Box<dyn std::error::Error>> {
    if db::users::find_by_email(pool, &admin.email).await?.is_some() {
        return Ok(());
    }

    let hash = password::hash(&admin.password)?;
    let mut tx = pool.begin().await?;
    let user = db::users::create(&mut *tx, &admin.email, &hash).await?;
    db::profiles::create(&mut *tx, user.id, &admin.name, Role::Admin).await?;
    tx.commit().await?;

    tracing::info!(user_id = %user.id, email = %admin.email, "Bootstrap admin created");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
