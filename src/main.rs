use std::net::SocketAddr;
use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pairmint::infra::{db, store::PgTokenStore, webhook::WebhookNotifier};
use pairmint::routes;
use pairmint::security::{config::SecurityConfig, jwt::JwtManager};
use pairmint::service::TokenService;
use pairmint::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = SecurityConfig::from_env()?;
    let pool = db::connect().await?;
    db::migrate(&pool).await?;

    let store = Arc::new(PgTokenStore::new(pool));
    let jwt = JwtManager::with_ttl(&config.jwt_secret, config.access_ttl);
    let notifier = Arc::new(WebhookNotifier::new(config.webhook_url.clone())?);
    let tokens = TokenService::new(store, jwt, notifier);
    let shared_state = AppState::new(tokens);

    let app = Router::new()
        .merge(routes::router())
        .route("/health", get(|| async { "OK" }))
        .layer(TraceLayer::new_for_http())
        .with_state(shared_state);

    let listener = tokio::net::TcpListener::bind(&config.server_addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;
    Ok(())
}
