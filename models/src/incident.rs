// models/src/incident.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::FleetError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum IncidentType {
    Expired,
    Missing,
    Maintenance,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum IncidentSeverity {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IncidentStatus {
    Open,
    InProgress,
    Resolved,
    Closed,
}

impl IncidentStatus {
    /// Whether the incident still counts against the one-open-incident-per
    /// (item, type) deduplication rule.
    pub fn is_active(&self) -> bool {
        matches!(self, IncidentStatus::Open | IncidentStatus::InProgress)
    }

    /// Allowed lifecycle moves: Open → InProgress → Resolved/Closed.
    /// Resolved incidents may still be closed. Incidents are never deleted.
    pub fn can_transition_to(&self, next: IncidentStatus) -> bool {
        match (self, next) {
            (IncidentStatus::Open, IncidentStatus::InProgress) => true,
            (IncidentStatus::Open, IncidentStatus::Resolved) => true,
            (IncidentStatus::Open, IncidentStatus::Closed) => true,
            (IncidentStatus::InProgress, IncidentStatus::Resolved) => true,
            (IncidentStatus::InProgress, IncidentStatus::Closed) => true,
            (IncidentStatus::Resolved, IncidentStatus::Closed) => true,
            _ => false,
        }
    }
}

/// Durable, actionable record opened by the scheduled job (or manually) when
/// an expiry/stock condition persists. Distinct from the transient `Alert`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Incident {
    pub id: Uuid,
    pub incident_type: IncidentType,
    pub severity: IncidentSeverity,
    pub status: IncidentStatus,
    pub ambulance_id: Option<Uuid>,
    pub item_id: Option<Uuid>,
    pub responsible_user_id: Option<Uuid>,
    pub description: String,
    pub due_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewIncident {
    pub incident_type: IncidentType,
    pub severity: IncidentSeverity,
    pub ambulance_id: Option<Uuid>,
    pub item_id: Option<Uuid>,
    pub responsible_user_id: Option<Uuid>,
    pub description: String,
    pub due_date: Option<DateTime<Utc>>,
}

impl Incident {
    pub fn from_new(new: NewIncident) -> Self {
        let now = Utc::now();
        Incident {
            id: Uuid::new_v4(),
            incident_type: new.incident_type,
            severity: new.severity,
            status: IncidentStatus::Open,
            ambulance_id: new.ambulance_id,
            item_id: new.item_id,
            responsible_user_id: new.responsible_user_id,
            description: new.description,
            due_date: new.due_date,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn transition_to(&mut self, next: IncidentStatus) -> Result<(), FleetError> {
        if !self.status.can_transition_to(next) {
            return Err(FleetError::InvalidInput(format!(
                "Incident cannot move from {:?} to {:?}",
                self.status, next
            )));
        }
        self.status = next;
        self.updated_at = Utc::now();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Incident {
        Incident::from_new(NewIncident {
            incident_type: IncidentType::Missing,
            severity: IncidentSeverity::Medium,
            ambulance_id: None,
            item_id: None,
            responsible_user_id: None,
            description: "gauze below minimum".into(),
            due_date: None,
        })
    }

    #[test]
    fn lifecycle_moves_forward_only() {
        let mut incident = sample();
        assert_eq!(incident.status, IncidentStatus::Open);
        incident.transition_to(IncidentStatus::InProgress).unwrap();
        incident.transition_to(IncidentStatus::Resolved).unwrap();
        incident.transition_to(IncidentStatus::Closed).unwrap();
        assert!(incident.transition_to(IncidentStatus::Open).is_err());
    }

    #[test]
    fn only_open_and_in_progress_are_active() {
        assert!(IncidentStatus::Open.is_active());
        assert!(IncidentStatus::InProgress.is_active());
        assert!(!IncidentStatus::Resolved.is_active());
        assert!(!IncidentStatus::Closed.is_active());
    }

    #[test]
    fn severity_orders_low_to_critical() {
        assert!(IncidentSeverity::Critical > IncidentSeverity::High);
        assert!(IncidentSeverity::High > IncidentSeverity::Medium);
        assert!(IncidentSeverity::Medium > IncidentSeverity::Low);
    }
}
