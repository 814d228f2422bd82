use anyhow::Context;
use printshop_api::db::{MIGRATIONS_DIR, create_orm_conn, run_migrations};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,printshop_api=debug".into()),
        )
        .init();

    // Only the database is needed here, so skip the full server config.
    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    let dir = std::env::args().nth(1).unwrap_or_else(|| MIGRATIONS_DIR.to_string());

    let orm = create_orm_conn(&database_url).await?;
    let applied = run_migrations(&orm, &dir).await?;
    println!("{applied} migration(s) applied from {dir}");
    Ok(())
}
