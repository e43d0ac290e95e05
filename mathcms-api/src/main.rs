//! # MathCMS API Server
//!
//! Serves the public site and the admin panel of the research center.
//!
//! ## Usage
//!
//! ```bash
//! DATABASE_URL=postgresql://localhost/mathcms JWT_SECRET=$(openssl rand -hex 32) \
//!     cargo run -p mathcms-api
//! ```

use anyhow::Context;
use mathcms_api::{
    app::{build_router, AppState},
    config::Config,
};
use mathcms_shared::{
    db::{
        migrations::run_migrations,
        pool::{close_pool, create_pool, PoolConfig},
    },
    services::users::UserService,
    store::Backend,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "mathcms_api=debug,mathcms_shared=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("MathCMS API Server v{} starting...", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env()?;

    let pool = create_pool(PoolConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        ..Default::default()
    })
    .await
    .context("Failed to connect to the database")?;

    run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;

    tokio::fs::create_dir_all(&config.uploads.dir)
        .await
        .with_context(|| format!("Failed to create {}", config.uploads.dir.display()))?;

    let backend = Backend::Postgres(pool.clone());

    if let Some(admin) = &config.admin {
        let users = UserService::from_backend(&backend, &config.jwt.secret, config.token_ttl());
        users
            .ensure_admin(&admin.email, &admin.password)
            .await
            .context("Failed to bootstrap the admin account")?;
    }

    let address = config.bind_address();
    let app = build_router(AppState::new(backend, config));

    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;
    tracing::info!("Server listening on http://{}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutdown signal received, closing database pool...");
    close_pool(pool).await;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "Failed to listen for shutdown signal");
    }
}
