use std::sync::Arc;

use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::info;
use uuid::Uuid;

use taskbuddy_db::Database;
use taskbuddy_push::{DispatchReport, Dispatcher, PushRelay, compose};
use taskbuddy_types::events::TaskCreatedEvent;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("device registry unavailable: {0}")]
    StoreUnavailable(#[source] anyhow::Error),
}

/// Fan a task-created event out to the owner's devices.
///
/// Looks up the device set, composes the message, and spawns the delivery
/// as a detached task: the caller acknowledges as soon as dispatch is
/// initiated, because delivery failures are not actionable upstream. Only
/// the registry lookup can fail here. Returns the dispatch task's handle
/// (`None` when the user has no devices) so tests can await the report;
/// the webhook handler just drops it.
pub async fn notify_user<R>(
    db: Arc<Database>,
    dispatcher: Dispatcher<R>,
    event: TaskCreatedEvent,
) -> Result<Option<JoinHandle<DispatchReport>>, NotifyError>
where
    R: PushRelay + 'static,
{
    let user_id = event.user_id.clone();

    // Run the blocking registry lookup off the async runtime
    let lookup_db = db.clone();
    let lookup_user = user_id.clone();
    let tokens = tokio::task::spawn_blocking(move || lookup_db.devices_for_user(&lookup_user))
        .await
        .map_err(|e| NotifyError::StoreUnavailable(anyhow::anyhow!("lookup task failed: {}", e)))?
        .map_err(NotifyError::StoreUnavailable)?;

    if tokens.is_empty() {
        info!(user_id, "no devices registered for user, skipping push");
        return Ok(None);
    }

    let dispatch_id = Uuid::new_v4();
    let notification = compose(&event.activity);
    info!(
        %dispatch_id,
        user_id,
        devices = tokens.len(),
        "dispatching task notification"
    );

    let dispatch_id = dispatch_id.to_string();
    let handle = tokio::spawn(async move {
        let report = dispatcher.dispatch(tokens, &notification).await;
        report.record(&dispatch_id, &user_id);
        report
    });

    Ok(Some(handle))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use std::sync::Mutex;
    use std::time::Duration;
    use taskbuddy_push::{DeliveryError, Notification};

    /// Relay double that records every message it accepts. Clones share the
    /// capture buffer so tests keep a view after the dispatcher takes it.
    #[derive(Clone, Default)]
    struct CapturingRelay {
        sent: Arc<Mutex<Vec<(String, Notification)>>>,
    }

    impl PushRelay for CapturingRelay {
        async fn send(&self, token: &str, notification: &Notification) -> Result<(), DeliveryError> {
            self.sent
                .lock()
                .unwrap()
                .push((token.to_string(), notification.clone()));
            Ok(())
        }
    }

    fn open_registry() -> Arc<Database> {
        Arc::new(Database::open(Path::new(":memory:")).unwrap())
    }

    #[tokio::test]
    async fn task_event_reaches_every_device_of_the_owner() {
        let db = open_registry();
        db.bind("tok-1", "42").unwrap();
        db.bind("tok-2", "42").unwrap();
        db.bind("tok-other", "99").unwrap();

        let dispatcher = Dispatcher::new(CapturingRelay::default(), 8, Duration::from_secs(5));
        let event = TaskCreatedEvent {
            user_id: "42".to_string(),
            activity: "Clean room".to_string(),
        };

        let handle = notify_user(db, dispatcher.clone(), event)
            .await
            .unwrap()
            .expect("dispatch should start for a user with devices");
        let report = handle.await.unwrap();

        assert_eq!(report.delivered(), 2);
        assert_eq!(report.failed(), 0);
        let mut delivered: Vec<&str> = report.outcomes().iter().map(|(t, _)| t.as_str()).collect();
        delivered.sort();
        assert_eq!(delivered, vec!["tok-1", "tok-2"]);
    }

    #[tokio::test]
    async fn composed_message_carries_the_activity() {
        let db = open_registry();
        db.bind("tok-1", "7").unwrap();

        let relay = CapturingRelay::default();
        let dispatcher = Dispatcher::new(relay.clone(), 8, Duration::from_secs(5));
        let event = TaskCreatedEvent {
            user_id: "7".to_string(),
            activity: "Clean room".to_string(),
        };

        let handle = notify_user(db, dispatcher, event).await.unwrap().unwrap();
        handle.await.unwrap();

        let sent = relay.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        let (token, notification) = &sent[0];
        assert_eq!(token, "tok-1");
        assert_eq!(notification.title, "Novi Zadatak");
        assert_eq!(notification.body, "Imate novi zadatak: Clean room");
        assert_eq!(notification.sound, "default");
    }

    #[tokio::test]
    async fn user_without_devices_skips_dispatch() {
        let db = open_registry();

        let dispatcher = Dispatcher::new(CapturingRelay::default(), 8, Duration::from_secs(5));
        let event = TaskCreatedEvent {
            user_id: "42".to_string(),
            activity: "Clean room".to_string(),
        };

        let handle = notify_user(db, dispatcher, event).await.unwrap();
        assert!(handle.is_none());
    }
}
