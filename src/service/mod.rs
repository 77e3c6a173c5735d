//! Token service: issuance, rotation, revocation and subject lookup.
//!
//! Rotation is the part that matters. A refresh record is single-use: the
//! `unused -> used` transition happens through the store's conditional
//! update, so of any number of concurrent rotations of one record exactly
//! one issues a new pair and the rest fail as replays.

use std::sync::Arc;

use serde::Serialize;
use time::OffsetDateTime;
use tracing::{info, warn};

use crate::domain::token::{Fingerprint, TokenStatus};
use crate::error::{ApiError, AuthError};
use crate::infra::store::TokenStore;
use crate::infra::webhook::{AnomalyNotifier, IpChangeEvent};
use crate::security::jwt::JwtManager;
use crate::security::refresh::{self, RefreshError};

#[derive(Debug, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Clone)]
pub struct TokenService {
    store: Arc<dyn TokenStore>,
    jwt: JwtManager,
    notifier: Arc<dyn AnomalyNotifier>,
}

impl TokenService {
    pub fn new(store: Arc<dyn TokenStore>, jwt: JwtManager, notifier: Arc<dyn AnomalyNotifier>) -> Self {
        Self { store, jwt, notifier }
    }

    /// Creates a record, generates the refresh secret, persists its hash and
    /// mints the access token around the new record id. If persisting the
    /// hash fails the record stays hashless and `unused`: it can never pass
    /// verification, so it is left behind rather than cleaned up.
    pub async fn issue_pair(&self, guid: i64, fingerprint: &Fingerprint) -> Result<TokenPair, ApiError> {
        let rid = self.store.insert(guid).await?;
        let (secret, hash) = refresh::generate().map_err(|e| ApiError::Dependency(e.to_string()))?;
        self.store.set_refresh_hash(rid, &hash).await?;
        let access = self
            .jwt
            .issue(guid, rid, fingerprint)
            .map_err(|e| ApiError::Dependency(e.to_string()))?;
        Ok(TokenPair {
            access_token: access,
            refresh_token: secret,
        })
    }

    /// Exchanges a valid, unused (access, refresh) pair for a fresh one.
    ///
    /// A user-agent that differs from the one in the claims is treated as a
    /// stolen session: the subject's whole refresh family is blocked before
    /// the request is rejected. An IP change alone is allowed through but
    /// reported out-of-band.
    pub async fn rotate(
        &self,
        access: &str,
        refresh_b64: &str,
        observed: &Fingerprint,
    ) -> Result<TokenPair, ApiError> {
        let claims = self.jwt.verify(access).map_err(|_| AuthError::InvalidAccessToken)?;

        if observed.user_agent != claims.ua {
            let blocked = self.store.block_all_for_guid(claims.guid).await?;
            info!(guid = claims.guid, blocked, "user-agent mismatch, refresh family revoked");
            return Err(AuthError::SessionInvalidated.into());
        }

        let record = self.store.get(claims.rid).await?.ok_or(AuthError::RecordNotFound)?;
        if record.status != TokenStatus::Unused {
            return Err(AuthError::ReplayOrRevoked.into());
        }

        let hash = record.refresh_hash.as_deref().unwrap_or("");
        let matches = match refresh::verify(refresh_b64, hash) {
            Ok(ok) => ok,
            Err(RefreshError::Encoding) => {
                return Err(ApiError::Validation("refresh token is not valid base64".into()))
            }
            Err(e) => return Err(ApiError::Dependency(e.to_string())),
        };
        if !matches {
            return Err(AuthError::InvalidRefreshSecret.into());
        }

        if observed.ip != claims.ip {
            let notifier = Arc::clone(&self.notifier);
            let event = IpChangeEvent {
                guid: claims.guid,
                from_ip: claims.ip.clone(),
                new_ip: observed.ip.clone(),
                datetime: OffsetDateTime::now_utc(),
            };
            // detached: delivery has no bearing on the rotation outcome
            tokio::spawn(async move {
                if let Err(err) = notifier.notify(event).await {
                    warn!(%err, "ip-change notification failed");
                }
            });
        }

        if !self.store.consume(claims.rid).await? {
            // a concurrent rotation or revocation got to the record first
            return Err(AuthError::ReplayOrRevoked.into());
        }

        self.issue_pair(claims.guid, observed).await
    }

    /// Resolves an access token to its subject. A blocked record kills the
    /// token immediately even while its signature and expiry still hold.
    pub async fn identify(&self, access: &str) -> Result<i64, ApiError> {
        let claims = self.jwt.verify(access).map_err(|_| AuthError::InvalidAccessToken)?;
        let record = self.store.get(claims.rid).await?.ok_or(AuthError::RecordNotFound)?;
        if record.status == TokenStatus::Blocked {
            return Err(AuthError::TokenRevoked.into());
        }
        Ok(claims.guid)
    }

    /// Blocks every outstanding refresh record for the subject. Idempotent.
    pub async fn revoke_all(&self, guid: i64) -> Result<(), ApiError> {
        let blocked = self.store.block_all_for_guid(guid).await?;
        info!(guid, blocked, "refresh family revoked");
        Ok(())
    }
}
