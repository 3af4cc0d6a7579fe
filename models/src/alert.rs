// models/src/alert.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Severity of a transient alert. The derive order matters: `Ord` must rank
/// Low < Medium < High so the display sort can put high first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    DailyCheckPending,
    ReviewPending,
    CleaningPending,
    LowStockAmbulance,
    LowStockSpace,
    ExpiredMaterial,
    ExpiringSoon,
    OpenIncident,
}

/// Ephemeral, request-time-derived notice for dashboard consumers. Never
/// persisted on the derivation path; the durable counterpart is `Incident`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub kind: AlertKind,
    pub message: String,
    pub severity: AlertSeverity,
    pub ambulance_id: Option<Uuid>,
    pub item_id: Option<Uuid>,
    pub space_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl Alert {
    pub fn new(kind: AlertKind, severity: AlertSeverity, message: impl Into<String>) -> Self {
        Alert {
            kind,
            message: message.into(),
            severity,
            ambulance_id: None,
            item_id: None,
            space_id: None,
            created_at: Utc::now(),
        }
    }

    pub fn for_ambulance(mut self, id: Uuid) -> Self {
        self.ambulance_id = Some(id);
        self
    }

    pub fn for_item(mut self, id: Uuid) -> Self {
        self.item_id = Some(id);
        self
    }

    pub fn for_space(mut self, id: Uuid) -> Self {
        self.space_id = Some(id);
        self
    }

    pub fn at(mut self, when: DateTime<Utc>) -> Self {
        self.created_at = when;
        self
    }
}

/// Total display order: severity descending, then derivation time descending.
pub fn sort_for_display(alerts: &mut [Alert]) {
    alerts.sort_by(|a, b| {
        b.severity
            .cmp(&a.severity)
            .then(b.created_at.cmp(&a.created_at))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn severity_ranks_high_over_medium_over_low() {
        assert!(AlertSeverity::High > AlertSeverity::Medium);
        assert!(AlertSeverity::Medium > AlertSeverity::Low);
    }

    #[test]
    fn display_sort_is_severity_major_recency_minor() {
        let now = Utc::now();
        let mut alerts = vec![
            Alert::new(AlertKind::CleaningPending, AlertSeverity::Medium, "old medium")
                .at(now - Duration::hours(2)),
            Alert::new(AlertKind::ExpiredMaterial, AlertSeverity::High, "high").at(now),
            Alert::new(AlertKind::ReviewPending, AlertSeverity::Medium, "fresh medium").at(now),
            Alert::new(AlertKind::OpenIncident, AlertSeverity::Low, "low").at(now),
        ];
        sort_for_display(&mut alerts);
        assert_eq!(alerts[0].message, "high");
        assert_eq!(alerts[1].message, "fresh medium");
        assert_eq!(alerts[2].message, "old medium");
        assert_eq!(alerts[3].message, "low");
    }
}
