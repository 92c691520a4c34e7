use anyhow::Result;
use tokio_postgres::{Client, NoTls};

use crate::config::Config;

/// Obtain a connected `tokio_postgres::Client` and spawn the connection task.
///
/// Mirrors the teacher's `db::connect::get_client`: one client per call,
/// connection driven on a background task, extensions/tables ensured
/// idempotently on every call. Callers are expected to call this once at
/// startup and share the resulting client via `Arc`.
pub async fn get_client() -> Result<Client> {
    let cfg = Config::from_env();
    let (client, connection) = tokio_postgres::connect(&cfg.db_url, NoTls).await?;

    tokio::spawn(async move {
        if let Err(e) = connection.await {
            tracing::error!("database connection error: {e}");
        }
    });

    client
        .batch_execute("CREATE EXTENSION IF NOT EXISTS vector;")
        .await?;

    run_schema_migration(&client, cfg.embed_dim).await?;

    Ok(client)
}

async fn run_schema_migration(client: &Client, embed_dim: usize) -> Result<()> {
    tracing::info!("running resume store schema migration");

    client
        .batch_execute(&format!(
            "CREATE TABLE IF NOT EXISTS resumes (
                id BIGSERIAL PRIMARY KEY,
                name TEXT NOT NULL,
                email TEXT NOT NULL DEFAULT '',
                phone TEXT NOT NULL DEFAULT '',
                role TEXT NOT NULL DEFAULT '',
                skills TEXT NOT NULL DEFAULT '',
                company TEXT NOT NULL DEFAULT '',
                text TEXT NOT NULL DEFAULT '',
                embedding vector({embed_dim}),
                created_at TIMESTAMP DEFAULT NOW()
            );"
        ))
        .await?;

    // `ivfflat` needs at least a handful of rows to build sensibly; this is
    // retried on every startup and is a no-op once it exists.
    let index_result = client
        .batch_execute(
            "CREATE INDEX IF NOT EXISTS idx_resumes_embedding_ivfflat ON resumes
                USING ivfflat (embedding vector_cosine_ops) WITH (lists = 100);",
        )
        .await;
    if let Err(e) = index_result {
        tracing::warn!("ivfflat index not created yet (expected on an empty table): {e}");
    }

    tracing::info!("resume store schema migration completed");
    Ok(())
}
