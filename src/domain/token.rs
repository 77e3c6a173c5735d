use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// Lifecycle of a refresh-token record. `Used` and `Blocked` are terminal;
/// a record never leaves either state once it gets there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenStatus {
    Unused,
    Used,
    Blocked,
}

impl TokenStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenStatus::Unused => "unused",
            TokenStatus::Used => "used",
            TokenStatus::Blocked => "blocked",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "unused" => Some(TokenStatus::Unused),
            "used" => Some(TokenStatus::Used),
            "blocked" => Some(TokenStatus::Blocked),
            _ => None,
        }
    }
}

/// One row per issued refresh secret. `refresh_hash` is `None` only for the
/// short window between record creation and hash persistence; a record stuck
/// hashless can never pass verification and is left as a harmless orphan.
#[derive(Debug, Clone)]
pub struct TokenRecord {
    pub id: Uuid,
    pub guid: i64,
    pub refresh_hash: Option<String>,
    pub status: TokenStatus,
    pub created_at: OffsetDateTime,
}

/// Device fingerprint captured at issuance and re-checked at every rotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fingerprint {
    pub ip: String,
    pub user_agent: String,
}
