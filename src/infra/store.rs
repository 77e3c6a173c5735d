use async_trait::async_trait;
use sqlx::Row;
use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

use super::db::Db;
use crate::domain::token::{TokenRecord, TokenStatus};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Unavailable(err.to_string())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Durable store for refresh-token records. `consume` is the only way a
/// record moves to `used`, and it must be an atomic compare-and-set so that
/// two concurrent rotations of the same record cannot both win.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Creates a record in `unused` state with no hash yet; returns its id.
    async fn insert(&self, guid: i64) -> StoreResult<Uuid>;

    async fn set_refresh_hash(&self, id: Uuid, hash: &str) -> StoreResult<()>;

    async fn get(&self, id: Uuid) -> StoreResult<Option<TokenRecord>>;

    /// Transitions `unused -> used`. Returns false when the record was
    /// already terminal (or missing), i.e. the caller lost the race.
    async fn consume(&self, id: Uuid) -> StoreResult<bool>;

    /// Transitions every `unused` record of the subject to `blocked`;
    /// returns how many records were affected. A second call is a no-op.
    async fn block_all_for_guid(&self, guid: i64) -> StoreResult<u64>;
}

pub struct PgTokenStore {
    db: Db,
}

impl PgTokenStore {
    pub fn new(db: Db) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TokenStore for PgTokenStore {
    async fn insert(&self, guid: i64) -> StoreResult<Uuid> {
        let id = Uuid::new_v4();
        sqlx::query("INSERT INTO tokens (id, guid, status, created_at) VALUES ($1, $2, 'unused', now())")
            .bind(id)
            .bind(guid)
            .execute(&self.db)
            .await?;
        Ok(id)
    }

    async fn set_refresh_hash(&self, id: Uuid, hash: &str) -> StoreResult<()> {
        sqlx::query("UPDATE tokens SET refresh_hash = $1 WHERE id = $2")
            .bind(hash)
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(())
    }

    async fn get(&self, id: Uuid) -> StoreResult<Option<TokenRecord>> {
        let row = sqlx::query("SELECT id, guid, refresh_hash, status, created_at FROM tokens WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db)
            .await?;

        row.map(|row| {
            let status: String = row.get("status");
            let status = TokenStatus::parse(&status)
                .ok_or_else(|| StoreError::Unavailable(format!("unknown token status: {status}")))?;
            let created_at: OffsetDateTime = row.get("created_at");
            Ok(TokenRecord {
                id: row.get("id"),
                guid: row.get("guid"),
                refresh_hash: row.get("refresh_hash"),
                status,
                created_at,
            })
        })
        .transpose()
    }

    async fn consume(&self, id: Uuid) -> StoreResult<bool> {
        // the status guard in the WHERE clause is what makes concurrent
        // rotations of one record resolve to a single winner
        let res = sqlx::query("UPDATE tokens SET status = 'used' WHERE id = $1 AND status = 'unused'")
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(res.rows_affected() == 1)
    }

    async fn block_all_for_guid(&self, guid: i64) -> StoreResult<u64> {
        let res = sqlx::query("UPDATE tokens SET status = 'blocked' WHERE guid = $1 AND status = 'unused'")
            .bind(guid)
            .execute(&self.db)
            .await?;
        Ok(res.rows_affected())
    }
}
