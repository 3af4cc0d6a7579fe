// lib/src/jobs.rs
//
// Daily and hourly maintenance passes plus the timer loops that drive
// them. A pass that fails partway is logged and dropped; the next tick is
// the retry mechanism. Manual triggers reuse the same pass functions and
// are not serialized against the timer: every step is idempotent, so an
// overlapping run converges to the same state.

use std::sync::Arc;

use chrono::{Duration as ChronoDuration, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::task::JoinHandle;
use tokio::time::{interval, sleep, Duration};
use tracing::{error, info, warn};

use models::errors::FleetResult;
use models::{
    Incident, IncidentSeverity, IncidentType, InventoryItem, MaterialStatus, NewIncident,
    Notification, NotificationKind,
};
use notifications_service::{NotificationDispatcher, NotificationEvent};

use crate::config::JobsConfig;
use crate::storage_engine::FleetStore;

/// Expiry incidents open for anything expiring within this many days.
pub const EXPIRY_INCIDENT_WINDOW_DAYS: i64 = 7;
/// Inside this window expiry escalates to High; hourly reminders also use it.
pub const EXPIRY_URGENT_DAYS: i64 = 3;

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct DailyPassReport {
    pub items_marked_expired: usize,
    pub items_marked_low: usize,
    pub incidents_created: usize,
    pub statuses_recomputed: usize,
    pub notifications_sent: usize,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct HourlyPassReport {
    pub warnings_sent: usize,
}

pub struct JobContext {
    pub store: Arc<dyn FleetStore>,
    pub dispatcher: Arc<NotificationDispatcher>,
}

impl JobContext {
    pub fn new(store: Arc<dyn FleetStore>, dispatcher: Arc<NotificationDispatcher>) -> Self {
        JobContext { store, dispatcher }
    }

    /// Best-effort send: the notification record is persisted and the event
    /// fanned out; a failure on either is logged and the pass continues.
    async fn notify(
        &self,
        recipient: String,
        kind: NotificationKind,
        subject: String,
        payload: serde_json::Value,
    ) -> bool {
        let record = Notification::new(&recipient, kind, &subject, payload.clone());
        if let Err(e) = self.store.append_notification(record).await {
            warn!(error = %e, "failed to persist notification record");
        }
        let event = NotificationEvent {
            recipient,
            kind,
            subject,
            payload,
        };
        self.dispatcher.dispatch(&event).await > 0
    }

    async fn recipient_for(&self, item: &InventoryItem) -> String {
        let ambulance = match self.store.get_ambulance(item.ambulance_id).await {
            Ok(a) => a,
            Err(_) => return "coordinator".to_string(),
        };
        match ambulance.assigned_user_ids.first() {
            Some(user_id) => match self.store.get_user(*user_id).await {
                Ok(user) => user.username,
                Err(_) => "coordinator".to_string(),
            },
            None => "coordinator".to_string(),
        }
    }
}

/// The daily pass, steps in fixed order so the incident scans observe the
/// refreshed status flags.
pub async fn run_daily_pass(ctx: &JobContext) -> FleetResult<DailyPassReport> {
    let today = Utc::now().date_naive();
    let mut report = DailyPassReport::default();

    // Steps 1 + 2: push stale stored statuses to what the derivation says,
    // expired first so precedence is observable in the counts.
    let items = ctx.store.list_inventory(None).await?;
    for mut item in items {
        let derived =
            MaterialStatus::derive(item.quantity, item.min_stock, item.expiry_date, today);
        if item.status == derived {
            continue;
        }
        match derived {
            MaterialStatus::Expired => report.items_marked_expired += 1,
            MaterialStatus::Low => report.items_marked_low += 1,
            MaterialStatus::Ok => {}
        }
        item.status = derived;
        item.updated_at = Utc::now();
        ctx.store.update_inventory_item(item).await?;
    }

    // Step 3: expiry incidents for anything inside the warning window,
    // deduplicated against open/in-progress incidents of the same type.
    let items = ctx.store.list_inventory(None).await?;
    for item in &items {
        let Some(expiry) = item.expiry_date else { continue };
        let days_left = (expiry - today).num_days();
        if days_left > EXPIRY_INCIDENT_WINDOW_DAYS {
            continue;
        }
        if ctx
            .store
            .find_active_incident(item.id, IncidentType::Expired)
            .await?
            .is_some()
        {
            continue;
        }
        let severity = if days_left < 0 {
            IncidentSeverity::Critical
        } else if days_left <= EXPIRY_URGENT_DAYS {
            IncidentSeverity::High
        } else {
            IncidentSeverity::Medium
        };
        let due_days = if severity >= IncidentSeverity::High { 1 } else { 3 };
        let responsible = first_assigned_user(ctx, item).await;
        let description = if days_left < 0 {
            format!("{} caducó el {}", item.name, expiry)
        } else {
            format!("{} caduca el {}", item.name, expiry)
        };
        let incident = Incident::from_new(NewIncident {
            incident_type: IncidentType::Expired,
            severity,
            ambulance_id: Some(item.ambulance_id),
            item_id: Some(item.id),
            responsible_user_id: responsible,
            description,
            due_date: Some(Utc::now() + ChronoDuration::days(due_days)),
        });
        let created = ctx.store.create_incident(incident).await?;
        report.incidents_created += 1;
        send_incident_notification(ctx, item, &created, &mut report).await;
    }

    // Step 4: missing-stock incidents for items sitting at Low.
    for item in items.iter().filter(|i| i.status == MaterialStatus::Low) {
        if ctx
            .store
            .find_active_incident(item.id, IncidentType::Missing)
            .await?
            .is_some()
        {
            continue;
        }
        let severity = if item.quantity == 0 {
            IncidentSeverity::Critical
        } else if item.quantity <= item.min_stock / 2 {
            IncidentSeverity::High
        } else {
            IncidentSeverity::Medium
        };
        let responsible = first_assigned_user(ctx, item).await;
        let incident = Incident::from_new(NewIncident {
            incident_type: IncidentType::Missing,
            severity,
            ambulance_id: Some(item.ambulance_id),
            item_id: Some(item.id),
            responsible_user_id: responsible,
            description: format!(
                "{}: quedan {} (mínimo {})",
                item.name, item.quantity, item.min_stock
            ),
            due_date: Some(Utc::now() + ChronoDuration::days(2)),
        });
        let created = ctx.store.create_incident(incident).await?;
        report.incidents_created += 1;
        send_incident_notification(ctx, item, &created, &mut report).await;
    }

    // Step 5: authoritative recompute for every item, ambulance and central
    // store alike. Idempotent with steps 1-2.
    for mut item in ctx.store.list_inventory(None).await? {
        let before = item.status;
        item.rederive_status(today);
        if item.status != before {
            item.updated_at = Utc::now();
            ctx.store.update_inventory_item(item).await?;
        }
        report.statuses_recomputed += 1;
    }
    for mut material in ctx.store.list_ampulario_materials(None).await? {
        let before = material.status;
        material.rederive_status(today);
        if material.status != before {
            material.updated_at = Utc::now();
            ctx.store.update_ampulario_material(material).await?;
        }
        report.statuses_recomputed += 1;
    }

    info!(
        expired = report.items_marked_expired,
        low = report.items_marked_low,
        incidents = report.incidents_created,
        notifications = report.notifications_sent,
        "daily pass finished"
    );
    Ok(report)
}

async fn first_assigned_user(ctx: &JobContext, item: &InventoryItem) -> Option<uuid::Uuid> {
    ctx.store
        .get_ambulance(item.ambulance_id)
        .await
        .ok()
        .and_then(|a| a.assigned_user_ids.first().copied())
}

async fn send_incident_notification(
    ctx: &JobContext,
    item: &InventoryItem,
    incident: &Incident,
    report: &mut DailyPassReport,
) {
    let recipient = ctx.recipient_for(item).await;
    let sent = ctx
        .notify(
            recipient,
            NotificationKind::IncidentOpened,
            incident.description.clone(),
            json!({
                "incident_id": incident.id,
                "incident_type": incident.incident_type,
                "severity": incident.severity,
                "ambulance_id": incident.ambulance_id,
                "item_id": incident.item_id,
                "due_date": incident.due_date,
            }),
        )
        .await;
    if sent {
        report.notifications_sent += 1;
    }
}

/// The hourly pass: a narrower, more frequent reminder channel for
/// imminent expiries, independent of the incident lifecycle.
pub async fn run_hourly_pass(ctx: &JobContext) -> FleetResult<HourlyPassReport> {
    let today = Utc::now().date_naive();
    let mut report = HourlyPassReport::default();

    for item in ctx.store.list_inventory(None).await? {
        if item.status != MaterialStatus::Ok {
            continue;
        }
        let Some(expiry) = item.expiry_date else { continue };
        let days_left = (expiry - today).num_days();
        if !(0..=EXPIRY_URGENT_DAYS).contains(&days_left) {
            continue;
        }
        let recipient = ctx.recipient_for(&item).await;
        let sent = ctx
            .notify(
                recipient,
                NotificationKind::ExpiryWarning,
                format!("{} caduca el {}", item.name, expiry),
                json!({
                    "item_id": item.id,
                    "ambulance_id": item.ambulance_id,
                    "expiry_date": expiry,
                    "days_left": days_left,
                }),
            )
            .await;
        if sent {
            report.warnings_sent += 1;
        }
    }

    info!(warnings = report.warnings_sent, "hourly pass finished");
    Ok(report)
}

/// Spawns the two timer loops. Each tick runs its pass inside its own
/// error boundary; a failure never kills the loop.
pub fn spawn_scheduler(ctx: Arc<JobContext>, config: JobsConfig) -> Vec<JoinHandle<()>> {
    let daily_ctx = ctx.clone();
    let daily = tokio::spawn(async move {
        loop {
            let wait = duration_until_daily(config.daily_time());
            info!(seconds = wait.as_secs(), "daily pass scheduled");
            sleep(wait).await;
            if let Err(e) = run_daily_pass(&daily_ctx).await {
                error!(error = %e, "daily pass failed");
            }
        }
    });

    let hourly_ctx = ctx;
    let hourly = tokio::spawn(async move {
        let mut ticker = interval(Duration::from_secs(3600));
        // The first tick of a tokio interval fires immediately; skip it so
        // startup does not double-run with the manual trigger or daily pass.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            if let Err(e) = run_hourly_pass(&hourly_ctx).await {
                error!(error = %e, "hourly pass failed");
            }
        }
    });

    vec![daily, hourly]
}

fn duration_until_daily(at: NaiveTime) -> Duration {
    let now = Utc::now();
    let today_target = now.date_naive().and_time(at).and_utc();
    let target = if today_target <= now {
        today_target + ChronoDuration::days(1)
    } else {
        today_target
    };
    (target - now).to_std().unwrap_or(Duration::from_secs(60))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage_engine::{FleetStore, InMemoryFleetStore};
    use chrono::Duration as ChronoDuration;
    use models::{
        Ambulance, MaterialKind, NewAmbulance, NewInventoryItem,
    };

    async fn context_with_ambulance() -> (Arc<JobContext>, Ambulance) {
        let store: Arc<dyn FleetStore> = Arc::new(InMemoryFleetStore::new());
        let (dispatcher, _socket) = NotificationDispatcher::with_default_sinks();
        let ctx = Arc::new(JobContext::new(store.clone(), Arc::new(dispatcher)));
        let ambulance = store
            .create_ambulance(Ambulance::from_new(NewAmbulance {
                code: "AMB-01".into(),
                plate: "1111-AAA".into(),
                vehicle_model: None,
                year: None,
                kit_number: None,
                last_known_kilometers: None,
                assigned_user_ids: None,
            }))
            .await
            .unwrap();
        (ctx, ambulance)
    }

    async fn seed_item(
        ctx: &JobContext,
        ambulance: &Ambulance,
        name: &str,
        quantity: i64,
        min_stock: i64,
        expiry_in_days: Option<i64>,
    ) -> InventoryItem {
        let today = Utc::now().date_naive();
        let mut item = InventoryItem::from_new(
            NewInventoryItem {
                name: name.into(),
                kind: MaterialKind::Consumable,
                quantity,
                min_stock,
                expiry_date: expiry_in_days.map(|d| today + ChronoDuration::days(d)),
                location: None,
            },
            ambulance.id,
            today,
        );
        // Stored status starts stale at Ok; the pass itself does the marking.
        item.status = MaterialStatus::Ok;
        ctx.store.create_inventory_item(item.clone()).await.unwrap();
        item
    }

    #[tokio::test]
    async fn daily_pass_marks_expired_and_low() {
        let (ctx, amb) = context_with_ambulance().await;
        let expired = seed_item(&ctx, &amb, "adrenalina", 10, 0, Some(-2)).await;
        let low = seed_item(&ctx, &amb, "gasas", 2, 5, None).await;

        let report = run_daily_pass(&ctx).await.unwrap();
        assert_eq!(report.items_marked_expired, 1);
        assert_eq!(report.items_marked_low, 1);

        let expired = ctx.store.get_inventory_item(expired.id).await.unwrap();
        assert_eq!(expired.status, MaterialStatus::Expired);
        let low = ctx.store.get_inventory_item(low.id).await.unwrap();
        assert_eq!(low.status, MaterialStatus::Low);
    }

    #[tokio::test]
    async fn daily_pass_is_idempotent_on_incidents() {
        let (ctx, amb) = context_with_ambulance().await;
        seed_item(&ctx, &amb, "adrenalina", 10, 0, Some(-2)).await;
        seed_item(&ctx, &amb, "gasas", 0, 5, None).await;
        seed_item(&ctx, &amb, "suero", 50, 0, Some(5)).await;

        run_daily_pass(&ctx).await.unwrap();
        let after_first = ctx.store.list_incidents().await.unwrap().len();
        assert!(after_first > 0);

        let second = run_daily_pass(&ctx).await.unwrap();
        assert_eq!(second.incidents_created, 0);
        let after_second = ctx.store.list_incidents().await.unwrap().len();
        assert_eq!(after_first, after_second);
    }

    #[tokio::test]
    async fn expiry_incident_severity_follows_the_ladder() {
        let (ctx, amb) = context_with_ambulance().await;
        let expired = seed_item(&ctx, &amb, "caducado", 10, 0, Some(-1)).await;
        let urgent = seed_item(&ctx, &amb, "urgente", 10, 0, Some(2)).await;
        let soon = seed_item(&ctx, &amb, "pronto", 10, 0, Some(6)).await;

        run_daily_pass(&ctx).await.unwrap();
        let incidents = ctx.store.list_incidents().await.unwrap();

        let severity_of = |item_id| {
            incidents
                .iter()
                .find(|i| i.item_id == Some(item_id))
                .map(|i| i.severity)
                .unwrap()
        };
        assert_eq!(severity_of(expired.id), IncidentSeverity::Critical);
        assert_eq!(severity_of(urgent.id), IncidentSeverity::High);
        assert_eq!(severity_of(soon.id), IncidentSeverity::Medium);
    }

    #[tokio::test]
    async fn missing_incident_severity_follows_stock_level() {
        let (ctx, amb) = context_with_ambulance().await;
        let empty = seed_item(&ctx, &amb, "vacio", 0, 10, None).await;
        let half = seed_item(&ctx, &amb, "mitad", 5, 10, None).await;
        let just_low = seed_item(&ctx, &amb, "justo", 9, 10, None).await;

        run_daily_pass(&ctx).await.unwrap();
        let incidents = ctx.store.list_incidents().await.unwrap();

        let severity_of = |item_id| {
            incidents
                .iter()
                .find(|i| i.item_id == Some(item_id) && i.incident_type == IncidentType::Missing)
                .map(|i| i.severity)
                .unwrap()
        };
        assert_eq!(severity_of(empty.id), IncidentSeverity::Critical);
        assert_eq!(severity_of(half.id), IncidentSeverity::High);
        assert_eq!(severity_of(just_low.id), IncidentSeverity::Medium);
    }

    #[tokio::test]
    async fn hourly_pass_warns_only_inside_the_urgent_window() {
        let (ctx, amb) = context_with_ambulance().await;
        seed_item(&ctx, &amb, "inminente", 10, 0, Some(1)).await;
        seed_item(&ctx, &amb, "lejano", 10, 0, Some(20)).await;
        seed_item(&ctx, &amb, "sin caducidad", 10, 0, None).await;

        let report = run_hourly_pass(&ctx).await.unwrap();
        assert_eq!(report.warnings_sent, 1);

        let notifications = ctx.store.list_notifications(None).await.unwrap();
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].kind, NotificationKind::ExpiryWarning);
    }
}
