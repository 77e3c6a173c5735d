use anyhow::Context as _;
use time::Duration;

/// Startup configuration, read once from the environment. The JWT secret is
/// handed to `JwtManager` explicitly rather than living in process-global
/// state.
#[derive(Clone)]
pub struct SecurityConfig {
    pub jwt_secret: String,
    pub access_ttl: Duration,
    pub webhook_url: String,
    pub server_addr: String,
}

impl SecurityConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let jwt_secret = env_string("SECRET_KEY").context("SECRET_KEY missing")?;
        let webhook_url = env_string("WEBHOOK_URL").context("WEBHOOK_URL missing")?;
        let server_addr = env_string("SERVER_ADDR").unwrap_or_else(|| "0.0.0.0:8080".into());

        Ok(SecurityConfig {
            jwt_secret,
            access_ttl: Duration::hours(24),
            webhook_url,
            server_addr,
        })
    }
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
