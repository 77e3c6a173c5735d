#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::mpsc;
use uuid::Uuid;

use pairmint::domain::token::{Fingerprint, TokenRecord, TokenStatus};
use pairmint::infra::store::{StoreResult, TokenStore};
use pairmint::infra::webhook::{AnomalyNotifier, IpChangeEvent};
use pairmint::security::jwt::JwtManager;
use pairmint::service::TokenService;

/// In-memory stand-in for the Postgres store. `consume` checks and flips the
/// status under one lock acquisition, matching the conditional-update
/// contract of the real store.
#[derive(Default)]
pub struct MemStore {
    records: Mutex<HashMap<Uuid, TokenRecord>>,
}

impl MemStore {
    pub fn status_of(&self, id: Uuid) -> Option<TokenStatus> {
        self.records.lock().unwrap().get(&id).map(|r| r.status)
    }

    pub fn hash_of(&self, id: Uuid) -> Option<String> {
        self.records.lock().unwrap().get(&id).and_then(|r| r.refresh_hash.clone())
    }

    pub fn record_ids(&self) -> Vec<Uuid> {
        self.records.lock().unwrap().keys().copied().collect()
    }

    pub fn statuses_for_guid(&self, guid: i64) -> Vec<TokenStatus> {
        self.records
            .lock()
            .unwrap()
            .values()
            .filter(|r| r.guid == guid)
            .map(|r| r.status)
            .collect()
    }

    pub fn record_count(&self) -> usize {
        self.records.lock().unwrap().len()
    }
}

#[async_trait]
impl TokenStore for MemStore {
    async fn insert(&self, guid: i64) -> StoreResult<Uuid> {
        let id = Uuid::new_v4();
        let record = TokenRecord {
            id,
            guid,
            refresh_hash: None,
            status: TokenStatus::Unused,
            created_at: OffsetDateTime::now_utc(),
        };
        self.records.lock().unwrap().insert(id, record);
        Ok(id)
    }

    async fn set_refresh_hash(&self, id: Uuid, hash: &str) -> StoreResult<()> {
        if let Some(record) = self.records.lock().unwrap().get_mut(&id) {
            record.refresh_hash = Some(hash.to_string());
        }
        Ok(())
    }

    async fn get(&self, id: Uuid) -> StoreResult<Option<TokenRecord>> {
        Ok(self.records.lock().unwrap().get(&id).cloned())
    }

    async fn consume(&self, id: Uuid) -> StoreResult<bool> {
        let mut records = self.records.lock().unwrap();
        match records.get_mut(&id) {
            Some(record) if record.status == TokenStatus::Unused => {
                record.status = TokenStatus::Used;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn block_all_for_guid(&self, guid: i64) -> StoreResult<u64> {
        let mut records = self.records.lock().unwrap();
        let mut blocked = 0;
        for record in records.values_mut() {
            if record.guid == guid && record.status == TokenStatus::Unused {
                record.status = TokenStatus::Blocked;
                blocked += 1;
            }
        }
        Ok(blocked)
    }
}

/// Forwards every event to a channel so tests can assert on deliveries.
pub struct RecordingNotifier {
    tx: mpsc::UnboundedSender<IpChangeEvent>,
}

impl RecordingNotifier {
    pub fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<IpChangeEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Arc::new(Self { tx }), rx)
    }
}

#[async_trait]
impl AnomalyNotifier for RecordingNotifier {
    async fn notify(&self, event: IpChangeEvent) -> anyhow::Result<()> {
        self.tx.send(event).ok();
        Ok(())
    }
}

pub struct Harness {
    pub store: Arc<MemStore>,
    pub service: TokenService,
    pub events: mpsc::UnboundedReceiver<IpChangeEvent>,
}

pub fn harness() -> Harness {
    let store = Arc::new(MemStore::default());
    let (notifier, events) = RecordingNotifier::new();
    let jwt = JwtManager::new("integration-test-secret");
    let service = TokenService::new(store.clone(), jwt, notifier);
    Harness { store, service, events }
}

pub fn fp(ip: &str, user_agent: &str) -> Fingerprint {
    Fingerprint {
        ip: ip.into(),
        user_agent: user_agent.into(),
    }
}
