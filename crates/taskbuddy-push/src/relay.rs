use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

use crate::compose::Notification;

/// Why a single delivery did not reach the relay. Absorbed into a
/// `DeliveryOutcome` by the dispatcher; never escalated past it.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("push relay request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("push relay returned status {0}")]
    Status(u16),

    #[error("delivery timed out")]
    TimedOut,
}

/// One token-addressed send to the external push relay. The dispatcher is
/// generic over this so tests can stand in a relay that fails on demand.
pub trait PushRelay: Send + Sync {
    fn send(
        &self,
        token: &str,
        notification: &Notification,
    ) -> impl Future<Output = Result<(), DeliveryError>> + Send;
}

/// Wire shape the Expo push service expects: the composed message plus the
/// destination token.
#[derive(Debug, Serialize)]
struct PushMessage<'a> {
    to: &'a str,
    title: &'a str,
    body: &'a str,
    sound: &'a str,
}

/// Production relay client. The reqwest client carries its own request
/// timeout; the dispatcher layers a per-delivery deadline on top.
pub struct ExpoRelay {
    client: reqwest::Client,
    url: String,
}

impl ExpoRelay {
    pub fn new(url: String, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, url })
    }
}

impl PushRelay for ExpoRelay {
    async fn send(&self, token: &str, notification: &Notification) -> Result<(), DeliveryError> {
        let message = PushMessage {
            to: token,
            title: &notification.title,
            body: &notification.body,
            sound: &notification.sound,
        };

        let response = self.client.post(&self.url).json(&message).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(DeliveryError::Status(status.as_u16()));
        }

        Ok(())
    }
}
