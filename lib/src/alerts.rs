// lib/src/alerts.rs
//
// Request-time alert derivation. Pure functions over current entity state;
// nothing here touches storage or caches across requests. The durable
// counterpart of these conditions is the incident records opened by the
// scheduled job (`jobs`).

use chrono::NaiveDate;

use models::{
    sort_for_display, Alert, AlertKind, AlertSeverity, Ambulance, AmpularioMaterial, Incident,
    IncidentSeverity, InventoryItem,
};

/// Days before expiry at which a material starts warning.
pub const EXPIRY_WARNING_DAYS: i64 = 7;

fn days_until(expiry: NaiveDate, today: NaiveDate) -> i64 {
    (expiry - today).num_days()
}

/// Workflow alerts: exactly one per ambulance, the most urgent pending
/// stage. The checks are deliberately if/else-if, not independent.
pub fn workflow_alerts(ambulances: &[Ambulance]) -> Vec<Alert> {
    let mut alerts = Vec::new();
    for ambulance in ambulances {
        if !ambulance.daily_check_completed {
            alerts.push(
                Alert::new(
                    AlertKind::DailyCheckPending,
                    AlertSeverity::Medium,
                    format!("{} tiene el check diario pendiente", ambulance.code),
                )
                .for_ambulance(ambulance.id),
            );
        } else if !ambulance.mechanical_review_completed {
            alerts.push(
                Alert::new(
                    AlertKind::ReviewPending,
                    AlertSeverity::Medium,
                    format!("{} tiene la revisión mecánica pendiente", ambulance.code),
                )
                .for_ambulance(ambulance.id),
            );
        } else if !ambulance.cleaning_completed {
            alerts.push(
                Alert::new(
                    AlertKind::CleaningPending,
                    AlertSeverity::Medium,
                    format!("{} tiene la limpieza pendiente", ambulance.code),
                )
                .for_ambulance(ambulance.id),
            );
        }
    }
    alerts
}

/// Stock and expiry alerts for ambulance inventory.
pub fn material_alerts(items: &[InventoryItem], today: NaiveDate) -> Vec<Alert> {
    let mut alerts = Vec::new();
    for item in items {
        if item.min_stock > 0 && item.quantity <= item.min_stock {
            let severity = if item.quantity == 0 {
                AlertSeverity::High
            } else {
                AlertSeverity::Medium
            };
            alerts.push(
                Alert::new(
                    AlertKind::LowStockAmbulance,
                    severity,
                    format!("{}: quedan {} (mínimo {})", item.name, item.quantity, item.min_stock),
                )
                .for_ambulance(item.ambulance_id)
                .for_item(item.id),
            );
        }
        if let Some(expiry) = item.expiry_date {
            if expiry < today {
                alerts.push(
                    Alert::new(
                        AlertKind::ExpiredMaterial,
                        AlertSeverity::High,
                        format!("{} caducó el {}", item.name, expiry),
                    )
                    .for_ambulance(item.ambulance_id)
                    .for_item(item.id),
                );
            } else if days_until(expiry, today) <= EXPIRY_WARNING_DAYS {
                alerts.push(
                    Alert::new(
                        AlertKind::ExpiringSoon,
                        AlertSeverity::Medium,
                        format!("{} caduca el {}", item.name, expiry),
                    )
                    .for_ambulance(item.ambulance_id)
                    .for_item(item.id),
                );
            }
        }
    }
    alerts
}

/// Same stock/expiry rules over the central store, with space references.
pub fn ampulario_alerts(materials: &[AmpularioMaterial], today: NaiveDate) -> Vec<Alert> {
    let mut alerts = Vec::new();
    for material in materials {
        if material.min_stock > 0 && material.quantity <= material.min_stock {
            let severity = if material.quantity == 0 {
                AlertSeverity::High
            } else {
                AlertSeverity::Medium
            };
            alerts.push(
                Alert::new(
                    AlertKind::LowStockSpace,
                    severity,
                    format!(
                        "{}: quedan {} (mínimo {})",
                        material.name, material.quantity, material.min_stock
                    ),
                )
                .for_space(material.space_id)
                .for_item(material.id),
            );
        }
        if let Some(expiry) = material.expiry_date {
            if expiry < today {
                alerts.push(
                    Alert::new(
                        AlertKind::ExpiredMaterial,
                        AlertSeverity::High,
                        format!("{} caducó el {}", material.name, expiry),
                    )
                    .for_space(material.space_id)
                    .for_item(material.id),
                );
            } else if days_until(expiry, today) <= EXPIRY_WARNING_DAYS {
                alerts.push(
                    Alert::new(
                        AlertKind::ExpiringSoon,
                        AlertSeverity::Medium,
                        format!("{} caduca el {}", material.name, expiry),
                    )
                    .for_space(material.space_id)
                    .for_item(material.id),
                );
            }
        }
    }
    alerts
}

/// Open and in-progress incidents projected into the alert stream, keeping
/// their creation time so recency ordering interleaves them correctly.
pub fn incident_alerts(incidents: &[Incident]) -> Vec<Alert> {
    incidents
        .iter()
        .filter(|i| i.status.is_active())
        .map(|incident| {
            let severity = match incident.severity {
                IncidentSeverity::Critical | IncidentSeverity::High => AlertSeverity::High,
                IncidentSeverity::Medium => AlertSeverity::Medium,
                IncidentSeverity::Low => AlertSeverity::Low,
            };
            let mut alert = Alert::new(
                AlertKind::OpenIncident,
                severity,
                incident.description.clone(),
            )
            .at(incident.created_at);
            alert.ambulance_id = incident.ambulance_id;
            alert.item_id = incident.item_id;
            alert
        })
        .collect()
}

/// The full derived alert list: workflow + ambulance materials + central
/// store + persisted incidents, in one total display order.
pub fn derive_alerts(
    ambulances: &[Ambulance],
    items: &[InventoryItem],
    ampulario: &[AmpularioMaterial],
    incidents: &[Incident],
    today: NaiveDate,
) -> Vec<Alert> {
    let mut alerts = workflow_alerts(ambulances);
    alerts.extend(material_alerts(items, today));
    alerts.extend(ampulario_alerts(ampulario, today));
    alerts.extend(incident_alerts(incidents));
    sort_for_display(&mut alerts);
    alerts
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use models::{MaterialKind, NewAmbulance, NewInventoryItem};
    use uuid::Uuid;

    fn ambulance() -> Ambulance {
        Ambulance::from_new(NewAmbulance {
            code: "AMB-01".into(),
            plate: "1111-AAA".into(),
            vehicle_model: None,
            year: None,
            kit_number: None,
            last_known_kilometers: None,
            assigned_user_ids: None,
        })
    }

    fn item(quantity: i64, min_stock: i64, expiry: Option<NaiveDate>) -> InventoryItem {
        InventoryItem::from_new(
            NewInventoryItem {
                name: "suero".into(),
                kind: MaterialKind::Consumable,
                quantity,
                min_stock,
                expiry_date: expiry,
                location: None,
            },
            Uuid::new_v4(),
            chrono::Utc::now().date_naive(),
        )
    }

    #[test]
    fn one_workflow_alert_per_ambulance_most_urgent_first_pending() {
        let mut amb = ambulance();
        let alerts = workflow_alerts(std::slice::from_ref(&amb));
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].kind, AlertKind::DailyCheckPending);

        amb.daily_check_completed = true;
        let alerts = workflow_alerts(std::slice::from_ref(&amb));
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].kind, AlertKind::ReviewPending);

        amb.mechanical_review_completed = true;
        amb.cleaning_completed = true;
        amb.inventory_completed = true;
        assert!(workflow_alerts(std::slice::from_ref(&amb)).is_empty());
    }

    #[test]
    fn zero_stock_is_high_partial_stock_is_medium() {
        let today = chrono::Utc::now().date_naive();
        let empty = item(0, 5, None);
        let low = item(3, 5, None);
        let alerts = material_alerts(&[empty, low], today);
        assert_eq!(alerts.len(), 2);
        assert_eq!(alerts[0].severity, AlertSeverity::High);
        assert_eq!(alerts[1].severity, AlertSeverity::Medium);
    }

    #[test]
    fn expiry_window_splits_expired_and_expiring() {
        let today = chrono::Utc::now().date_naive();
        let expired = item(50, 0, Some(today - Duration::days(1)));
        let soon = item(50, 0, Some(today + Duration::days(5)));
        let fine = item(50, 0, Some(today + Duration::days(30)));
        let alerts = material_alerts(&[expired, soon, fine], today);
        assert_eq!(alerts.len(), 2);
        assert_eq!(alerts[0].kind, AlertKind::ExpiredMaterial);
        assert_eq!(alerts[0].severity, AlertSeverity::High);
        assert_eq!(alerts[1].kind, AlertKind::ExpiringSoon);
        assert_eq!(alerts[1].severity, AlertSeverity::Medium);
    }

    #[test]
    fn merged_output_is_severity_then_recency_ordered() {
        let today = chrono::Utc::now().date_naive();
        let amb = ambulance();
        let expired = item(50, 0, Some(today - Duration::days(1)));
        let alerts = derive_alerts(&[amb], &[expired], &[], &[], today);
        for pair in alerts.windows(2) {
            assert!(pair[0].severity >= pair[1].severity);
            if pair[0].severity == pair[1].severity {
                assert!(pair[0].created_at >= pair[1].created_at);
            }
        }
    }
}
