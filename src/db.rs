use std::{path::Path, time::Duration};

use anyhow::{Context, Result};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use tokio::fs;

pub const MIGRATIONS_DIR: &str = "migrations";

pub async fn create_orm_conn(database_url: &str) -> Result<DatabaseConnection> {
    let mut options = ConnectOptions::new(database_url.to_owned());
    options
        .max_connections(20)
        .connect_timeout(Duration::from_secs(10))
        .sqlx_logging(false);

    Database::connect(options)
        .await
        .context("failed to connect to database")
}

/// Applies the `*.sql` files of `dir` in filename order. Applied files are
/// recorded in `schema_migrations` and skipped on later runs.
pub async fn run_migrations(conn: &DatabaseConnection, dir: impl AsRef<Path>) -> Result<usize> {
    let backend = conn.get_database_backend();
    conn.execute(Statement::from_string(
        backend,
        "CREATE TABLE IF NOT EXISTS schema_migrations (\
            name TEXT PRIMARY KEY, \
            applied_at TIMESTAMPTZ NOT NULL DEFAULT now())",
    ))
    .await?;

    let mut entries = fs::read_dir(dir.as_ref())
        .await
        .with_context(|| format!("cannot read {}", dir.as_ref().display()))?;
    let mut files = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "sql") {
            files.push(path);
        }
    }
    files.sort();

    let mut applied = 0;
    for file in files {
        let name = file
            .file_name()
            .and_then(|n| n.to_str())
            .context("migration file name is not valid UTF-8")?
            .to_string();

        let already = conn
            .query_one(Statement::from_sql_and_values(
                backend,
                "SELECT name FROM schema_migrations WHERE name = $1",
                [name.clone().into()],
            ))
            .await?;
        if already.is_some() {
            continue;
        }

        let sql = fs::read_to_string(&file).await?;
        // Prepared statements cannot hold several commands, so run them one by one.
        for stmt in sql.split(';').map(str::trim).filter(|s| !s.is_empty()) {
            conn.execute(Statement::from_string(backend, format!("{stmt};")))
                .await
                .with_context(|| format!("migration {name} failed"))?;
        }

        conn.execute(Statement::from_sql_and_values(
            backend,
            "INSERT INTO schema_migrations (name) VALUES ($1)",
            [name.clone().into()],
        ))
        .await?;
        tracing::info!(migration = %name, "migration applied");
        applied += 1;
    }

    Ok(applied)
}
