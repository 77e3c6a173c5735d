use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, ConnectInfo, State},
    http::{header, HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::domain::token::Fingerprint;
use crate::error::{ApiError, AuthError};
use crate::service::TokenPair;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/create", post(create))
        .route("/refresh", post(refresh))
        .route("/me", get(me))
        .route("/logout", post(logout))
}

#[derive(Deserialize)]
struct CreateRequest {
    guid: i64,
}

#[derive(Serialize)]
struct CurrentUserResponse {
    guid: i64,
}

async fn create(
    State(state): State<Arc<AppState>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    payload: Result<Json<CreateRequest>, JsonRejection>,
) -> Result<Json<TokenPair>, ApiError> {
    let Json(payload) = payload.map_err(|e| ApiError::Validation(e.body_text()))?;
    let fingerprint = fingerprint(&headers, peer);
    let pair = state.tokens.issue_pair(payload.guid, &fingerprint).await?;
    Ok(Json(pair))
}

async fn refresh(
    State(state): State<Arc<AppState>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
) -> Result<Json<TokenPair>, ApiError> {
    let access = bearer_from_header(&headers)
        .ok_or_else(|| ApiError::Validation("invalid Authorization header".into()))?;
    let refresh = headers
        .get("x-refresh-token")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::Validation("missing X-Refresh-Token header".into()))?;
    let fingerprint = fingerprint(&headers, peer);
    let pair = state.tokens.rotate(&access, refresh, &fingerprint).await?;
    Ok(Json(pair))
}

async fn me(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<CurrentUserResponse>, ApiError> {
    let access = bearer_from_header(&headers).ok_or(AuthError::InvalidAccessToken)?;
    let guid = state.tokens.identify(&access).await?;
    Ok(Json(CurrentUserResponse { guid }))
}

async fn logout(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    let access = bearer_from_header(&headers).ok_or(AuthError::InvalidAccessToken)?;
    let guid = state.tokens.identify(&access).await?;
    state.tokens.revoke_all(guid).await?;
    Ok(StatusCode::NO_CONTENT)
}

fn bearer_from_header(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(|s| s.to_string())
}

/// First X-Forwarded-For entry when present, else the transport peer; the
/// user-agent falls back to empty, which still participates in the strict
/// equality check at rotation.
fn fingerprint(headers: &HeaderMap, peer: SocketAddr) -> Fingerprint {
    let ip = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| peer.ip().to_string());
    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    Fingerprint { ip, user_agent }
}
