use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use futures_util::stream;

use crate::compose::Notification;
use crate::relay::{DeliveryError, PushRelay};
use crate::report::DispatchReport;

/// Terminal state of one delivery attempt.
#[derive(Debug)]
pub enum DeliveryOutcome {
    Delivered,
    Failed(DeliveryError),
}

impl DeliveryOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered)
    }
}

/// Fans one notification out to a set of device tokens. Deliveries run
/// concurrently under a bound, each with its own deadline, and one failure
/// never delays or cancels the rest. No retries: delivery is best-effort
/// and must never block the write path that triggered it.
pub struct Dispatcher<R> {
    inner: Arc<DispatcherInner<R>>,
}

impl<R> Clone for Dispatcher<R> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

struct DispatcherInner<R> {
    relay: R,
    concurrency: usize,
    delivery_timeout: Duration,
}

impl<R: PushRelay> Dispatcher<R> {
    pub fn new(relay: R, concurrency: usize, delivery_timeout: Duration) -> Self {
        Self {
            inner: Arc::new(DispatcherInner {
                relay,
                concurrency: concurrency.max(1),
                delivery_timeout,
            }),
        }
    }

    /// Deliver `notification` to every token, collecting per-token outcomes.
    /// An empty token set is the common case (user with no registered
    /// device) and produces an empty report without touching the relay.
    pub async fn dispatch(&self, tokens: Vec<String>, notification: &Notification) -> DispatchReport {
        if tokens.is_empty() {
            return DispatchReport::default();
        }

        let inner = &self.inner;
        let outcomes = stream::iter(tokens)
            .map(|token| async move {
                let sent = tokio::time::timeout(
                    inner.delivery_timeout,
                    inner.relay.send(&token, notification),
                )
                .await;

                let outcome = match sent {
                    Ok(Ok(())) => DeliveryOutcome::Delivered,
                    Ok(Err(e)) => DeliveryOutcome::Failed(e),
                    Err(_) => DeliveryOutcome::Failed(DeliveryError::TimedOut),
                };

                (token, outcome)
            })
            .buffer_unordered(inner.concurrency)
            .collect::<Vec<_>>()
            .await;

        DispatchReport::new(outcomes)
    }
}
