use anyhow::Context;
use sqlx::postgres::PgPoolOptions;

pub type Db = sqlx::PgPool;

pub async fn connect() -> anyhow::Result<Db> {
    let url = std::env::var("DATABASE_URL").context("DATABASE_URL missing")?;
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&url)
        .await
        .with_context(|| "failed to connect to database; check DATABASE_URL")?;
    Ok(pool)
}

/// Bootstraps the schema at startup. Records are never deleted, so there is
/// no retention DDL here.
pub async fn migrate(db: &Db) -> anyhow::Result<()> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS tokens (
            id UUID PRIMARY KEY,
            guid BIGINT NOT NULL,
            refresh_hash TEXT,
            status TEXT NOT NULL DEFAULT 'unused',
            created_at TIMESTAMPTZ NOT NULL DEFAULT now()
        )",
    )
    .execute(db)
    .await
    .context("failed to create tokens table")?;

    sqlx::query("CREATE INDEX IF NOT EXISTS tokens_guid_idx ON tokens (guid)")
        .execute(db)
        .await
        .context("failed to create tokens index")?;

    Ok(())
}
