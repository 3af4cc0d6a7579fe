// models/src/notification.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    IncidentOpened,
    ExpiryWarning,
    WorkflowReminder,
}

/// Persisted record of one dispatched message. Delivery itself is the
/// notifier's concern; this is what shows up in a user's inbox.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub recipient: String,
    pub kind: NotificationKind,
    pub subject: String,
    pub payload: Value,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(
        recipient: impl Into<String>,
        kind: NotificationKind,
        subject: impl Into<String>,
        payload: Value,
    ) -> Self {
        Notification {
            id: Uuid::new_v4(),
            recipient: recipient.into(),
            kind,
            subject: subject.into(),
            payload,
            read: false,
            created_at: Utc::now(),
        }
    }
}
