//! Server entrypoint: configuration, database, storage, admin bootstrap.

use axum::extract::DefaultBodyLimit;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use symposium_core::Roster;
use symposium_server::config::Config;
use symposium_server::storage::ArtifactStore;
use symposium_server::{auth, db, routes, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "symposium_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    tracing::info!(bind_addr = %config.bind_addr, "loaded configuration");

    let pool = db::create_pool(&config.database_url).await?;
    db::run_migrations(&pool).await?;
    tracing::info!("database ready");

    let store = ArtifactStore::new(config.upload_root.clone());
    store.ensure_buckets().await?;
    tracing::info!(root = %config.upload_root.display(), "artifact buckets ready");

    let roster = match &config.roster_path {
        Some(path) => {
            let roster = Roster::from_path(path)?;
            tracing::info!(
                path = %path.display(),
                groups = roster.groups().len(),
                aliases = roster.aliases().len(),
                "loaded roster"
            );
            roster
        }
        None => Roster::default(),
    };

    if auth::ensure_admin_account(&pool, &config.admin_username, &config.admin_password).await? {
        tracing::info!(username = %config.admin_username, "created admin account");
    }

    let state = AppState::new(pool, store, roster);
    let app = routes::create_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(DefaultBodyLimit::max(config.max_upload_bytes));

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "listening");
    axum::serve(listener, app).await?;
    Ok(())
}
