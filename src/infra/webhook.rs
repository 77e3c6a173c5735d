use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use time::OffsetDateTime;

/// Payload POSTed to the configured webhook when a rotation arrives from a
/// different IP than the one the pair was issued to.
#[derive(Debug, Clone, Serialize)]
pub struct IpChangeEvent {
    pub guid: i64,
    pub from_ip: String,
    pub new_ip: String,
    #[serde(with = "time::serde::rfc3339")]
    pub datetime: OffsetDateTime,
}

/// Best-effort delivery: callers spawn `notify` detached and never observe
/// the result beyond a warning log.
#[async_trait]
pub trait AnomalyNotifier: Send + Sync {
    async fn notify(&self, event: IpChangeEvent) -> anyhow::Result<()>;
}

pub struct WebhookNotifier {
    url: String,
    http: Client,
}

impl WebhookNotifier {
    pub fn new(url: String) -> anyhow::Result<Self> {
        let http = Client::builder().user_agent("pairmint").build()?;
        Ok(Self { url, http })
    }
}

#[async_trait]
impl AnomalyNotifier for WebhookNotifier {
    async fn notify(&self, event: IpChangeEvent) -> anyhow::Result<()> {
        self.http
            .post(&self.url)
            .json(&event)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}
