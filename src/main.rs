use std::{net::SocketAddr, sync::Arc};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use printshop_api::{
    adapters::{blob::LocalBlobStore, identity::InMemoryIdentityProvider},
    app::build_router,
    config::AppConfig,
    db::{MIGRATIONS_DIR, create_orm_conn, run_migrations},
    state::AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,printshop_api=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;
    let addr = SocketAddr::from((config.host.parse::<std::net::IpAddr>()?, config.port));

    let orm = create_orm_conn(&config.database_url).await?;
    let applied = run_migrations(&orm, MIGRATIONS_DIR).await?;
    tracing::info!(applied, "migrations up to date");

    let blobs = LocalBlobStore::new(&config.storage_base_path).await?;
    tracing::info!(path = %blobs.base_path().display(), "document storage ready");
    // Accounts live only for the lifetime of the process; swap in a hosted
    // `IdentityProvider` implementation before deploying.
    let identity = InMemoryIdentityProvider::new();
    tracing::warn!("using the in-memory identity provider; accounts are lost on restart");

    let state = AppState::new(orm, config, Arc::new(identity), Arc::new(blobs));
    let app = build_router(state);

    tracing::info!(%addr, "listening");
    axum::serve(tokio::net::TcpListener::bind(addr).await?, app).await?;

    Ok(())
}
