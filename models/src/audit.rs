// models/src/audit.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Create,
    Update,
    Delete,
}

/// Immutable audit record appended on every create/update/delete of an
/// ambulance, user or material entity. Append-only; read back for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditLog {
    pub id: Uuid,
    pub actor: String,
    pub action: AuditAction,
    pub entity: String,
    pub entity_id: String,
    pub payload: Value,
    pub created_at: DateTime<Utc>,
}

impl AuditLog {
    pub fn record(
        actor: impl Into<String>,
        action: AuditAction,
        entity: impl Into<String>,
        entity_id: impl Into<String>,
        payload: Value,
    ) -> Self {
        AuditLog {
            id: Uuid::new_v4(),
            actor: actor.into(),
            action,
            entity: entity.into(),
            entity_id: entity_id.into(),
            payload,
            created_at: Utc::now(),
        }
    }
}
