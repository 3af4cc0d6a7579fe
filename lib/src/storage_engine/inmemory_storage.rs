// lib/src/storage_engine/inmemory_storage.rs
//
// HashMap-backed implementation of `FleetStore`. Serves tests and any
// "mock mode" consumer; behavior matches the sled store, including the
// conflict reasons and cascade semantics.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;
use uuid::Uuid;

use models::errors::{FleetError, FleetResult};
use models::{
    Ambulance, AmpularioMaterial, AuditLog, CleaningLog, DailyVehicleCheck, Incident,
    IncidentType, InventoryItem, MechanicalReview, Notification, QuantityChange, Space, User,
    UsvbKit,
};

use super::storage_engine::FleetStore;
use super::{
    ensure_ambulance_unique, ensure_item_name_unique, ensure_space_material_unique,
    ensure_user_unique,
};

#[derive(Default)]
struct Tables {
    ambulances: HashMap<Uuid, Ambulance>,
    inventory: HashMap<Uuid, InventoryItem>,
    quantity_changes: HashMap<Uuid, QuantityChange>,
    mechanical_reviews: HashMap<Uuid, MechanicalReview>,
    cleaning_logs: HashMap<Uuid, CleaningLog>,
    daily_checks: HashMap<Uuid, DailyVehicleCheck>,
    incidents: HashMap<Uuid, Incident>,
    spaces: HashMap<Uuid, Space>,
    ampulario: HashMap<Uuid, AmpularioMaterial>,
    kits: HashMap<Uuid, UsvbKit>,
    users: HashMap<Uuid, User>,
    notifications: HashMap<Uuid, Notification>,
    audit: HashMap<Uuid, AuditLog>,
    config: HashMap<String, Value>,
}

#[derive(Default)]
pub struct InMemoryFleetStore {
    tables: RwLock<Tables>,
}

impl InMemoryFleetStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FleetStore for InMemoryFleetStore {
    async fn create_ambulance(&self, ambulance: Ambulance) -> FleetResult<Ambulance> {
        let mut tables = self.tables.write().await;
        let existing: Vec<Ambulance> = tables.ambulances.values().cloned().collect();
        ensure_ambulance_unique(&existing, &ambulance)?;
        tables.ambulances.insert(ambulance.id, ambulance.clone());
        Ok(ambulance)
    }

    async fn get_ambulance(&self, id: Uuid) -> FleetResult<Ambulance> {
        let tables = self.tables.read().await;
        tables
            .ambulances
            .get(&id)
            .cloned()
            .ok_or_else(|| FleetError::not_found("Ambulance", id.to_string()))
    }

    async fn list_ambulances(&self) -> FleetResult<Vec<Ambulance>> {
        let tables = self.tables.read().await;
        let mut ambulances: Vec<Ambulance> = tables.ambulances.values().cloned().collect();
        ambulances.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(ambulances)
    }

    async fn update_ambulance(&self, ambulance: Ambulance) -> FleetResult<Ambulance> {
        let mut tables = self.tables.write().await;
        if !tables.ambulances.contains_key(&ambulance.id) {
            return Err(FleetError::not_found("Ambulance", ambulance.id.to_string()));
        }
        let existing: Vec<Ambulance> = tables.ambulances.values().cloned().collect();
        ensure_ambulance_unique(&existing, &ambulance)?;
        tables.ambulances.insert(ambulance.id, ambulance.clone());
        Ok(ambulance)
    }

    async fn delete_ambulance(&self, id: Uuid) -> FleetResult<()> {
        let mut tables = self.tables.write().await;
        if tables.ambulances.remove(&id).is_none() {
            return Err(FleetError::not_found("Ambulance", id.to_string()));
        }
        let item_ids: Vec<Uuid> = tables
            .inventory
            .values()
            .filter(|i| i.ambulance_id == id)
            .map(|i| i.id)
            .collect();
        for item_id in item_ids {
            tables.inventory.remove(&item_id);
            tables.quantity_changes.retain(|_, c| c.item_id != item_id);
        }
        tables.mechanical_reviews.retain(|_, r| r.ambulance_id != id);
        tables.cleaning_logs.retain(|_, l| l.ambulance_id != id);
        tables.daily_checks.retain(|_, c| c.ambulance_id != id);
        Ok(())
    }

    async fn create_inventory_item(&self, item: InventoryItem) -> FleetResult<InventoryItem> {
        let mut tables = self.tables.write().await;
        if !tables.ambulances.contains_key(&item.ambulance_id) {
            return Err(FleetError::not_found(
                "Ambulance",
                item.ambulance_id.to_string(),
            ));
        }
        let siblings: Vec<InventoryItem> = tables
            .inventory
            .values()
            .filter(|i| i.ambulance_id == item.ambulance_id)
            .cloned()
            .collect();
        ensure_item_name_unique(&siblings, &item)?;
        tables.inventory.insert(item.id, item.clone());
        Ok(item)
    }

    async fn get_inventory_item(&self, id: Uuid) -> FleetResult<InventoryItem> {
        let tables = self.tables.read().await;
        tables
            .inventory
            .get(&id)
            .cloned()
            .ok_or_else(|| FleetError::not_found("InventoryItem", id.to_string()))
    }

    async fn list_inventory(
        &self,
        ambulance_id: Option<Uuid>,
    ) -> FleetResult<Vec<InventoryItem>> {
        let tables = self.tables.read().await;
        let mut items: Vec<InventoryItem> = tables
            .inventory
            .values()
            .filter(|i| ambulance_id.map_or(true, |owner| i.ambulance_id == owner))
            .cloned()
            .collect();
        items.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(items)
    }

    async fn update_inventory_item(&self, item: InventoryItem) -> FleetResult<InventoryItem> {
        let mut tables = self.tables.write().await;
        if !tables.inventory.contains_key(&item.id) {
            return Err(FleetError::not_found("InventoryItem", item.id.to_string()));
        }
        let siblings: Vec<InventoryItem> = tables
            .inventory
            .values()
            .filter(|i| i.ambulance_id == item.ambulance_id)
            .cloned()
            .collect();
        ensure_item_name_unique(&siblings, &item)?;
        tables.inventory.insert(item.id, item.clone());
        Ok(item)
    }

    async fn delete_inventory_item(&self, id: Uuid) -> FleetResult<()> {
        let mut tables = self.tables.write().await;
        if tables.inventory.remove(&id).is_none() {
            return Err(FleetError::not_found("InventoryItem", id.to_string()));
        }
        tables.quantity_changes.retain(|_, c| c.item_id != id);
        Ok(())
    }

    async fn append_quantity_change(&self, change: QuantityChange) -> FleetResult<()> {
        let mut tables = self.tables.write().await;
        tables.quantity_changes.insert(change.id, change);
        Ok(())
    }

    async fn list_quantity_changes(&self, item_id: Uuid) -> FleetResult<Vec<QuantityChange>> {
        let tables = self.tables.read().await;
        let mut changes: Vec<QuantityChange> = tables
            .quantity_changes
            .values()
            .filter(|c| c.item_id == item_id)
            .cloned()
            .collect();
        changes.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(changes)
    }

    async fn append_mechanical_review(
        &self,
        review: MechanicalReview,
    ) -> FleetResult<MechanicalReview> {
        let mut tables = self.tables.write().await;
        tables.mechanical_reviews.insert(review.id, review.clone());
        Ok(review)
    }

    async fn list_mechanical_reviews(
        &self,
        ambulance_id: Uuid,
    ) -> FleetResult<Vec<MechanicalReview>> {
        let tables = self.tables.read().await;
        let mut reviews: Vec<MechanicalReview> = tables
            .mechanical_reviews
            .values()
            .filter(|r| r.ambulance_id == ambulance_id)
            .cloned()
            .collect();
        reviews.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(reviews)
    }

    async fn append_cleaning_log(&self, log: CleaningLog) -> FleetResult<CleaningLog> {
        let mut tables = self.tables.write().await;
        tables.cleaning_logs.insert(log.id, log.clone());
        Ok(log)
    }

    async fn list_cleaning_logs(&self, ambulance_id: Uuid) -> FleetResult<Vec<CleaningLog>> {
        let tables = self.tables.read().await;
        let mut logs: Vec<CleaningLog> = tables
            .cleaning_logs
            .values()
            .filter(|l| l.ambulance_id == ambulance_id)
            .cloned()
            .collect();
        logs.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(logs)
    }

    async fn append_daily_check(
        &self,
        check: DailyVehicleCheck,
    ) -> FleetResult<DailyVehicleCheck> {
        let mut tables = self.tables.write().await;
        tables.daily_checks.insert(check.id, check.clone());
        Ok(check)
    }

    async fn list_daily_checks(
        &self,
        ambulance_id: Uuid,
    ) -> FleetResult<Vec<DailyVehicleCheck>> {
        let tables = self.tables.read().await;
        let mut checks: Vec<DailyVehicleCheck> = tables
            .daily_checks
            .values()
            .filter(|c| c.ambulance_id == ambulance_id)
            .cloned()
            .collect();
        checks.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(checks)
    }

    async fn create_incident(&self, incident: Incident) -> FleetResult<Incident> {
        let mut tables = self.tables.write().await;
        tables.incidents.insert(incident.id, incident.clone());
        Ok(incident)
    }

    async fn get_incident(&self, id: Uuid) -> FleetResult<Incident> {
        let tables = self.tables.read().await;
        tables
            .incidents
            .get(&id)
            .cloned()
            .ok_or_else(|| FleetError::not_found("Incident", id.to_string()))
    }

    async fn list_incidents(&self) -> FleetResult<Vec<Incident>> {
        let tables = self.tables.read().await;
        let mut incidents: Vec<Incident> = tables.incidents.values().cloned().collect();
        incidents.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(incidents)
    }

    async fn update_incident(&self, incident: Incident) -> FleetResult<Incident> {
        let mut tables = self.tables.write().await;
        if !tables.incidents.contains_key(&incident.id) {
            return Err(FleetError::not_found("Incident", incident.id.to_string()));
        }
        tables.incidents.insert(incident.id, incident.clone());
        Ok(incident)
    }

    async fn find_active_incident(
        &self,
        item_id: Uuid,
        incident_type: IncidentType,
    ) -> FleetResult<Option<Incident>> {
        let tables = self.tables.read().await;
        Ok(tables
            .incidents
            .values()
            .find(|i| {
                i.item_id == Some(item_id)
                    && i.incident_type == incident_type
                    && i.status.is_active()
            })
            .cloned())
    }

    async fn create_space(&self, space: Space) -> FleetResult<Space> {
        let mut tables = self.tables.write().await;
        if tables.spaces.values().any(|s| s.name == space.name) {
            return Err(FleetError::Conflict("este espacio ya existe".to_string()));
        }
        tables.spaces.insert(space.id, space.clone());
        Ok(space)
    }

    async fn get_space(&self, id: Uuid) -> FleetResult<Space> {
        let tables = self.tables.read().await;
        tables
            .spaces
            .get(&id)
            .cloned()
            .ok_or_else(|| FleetError::not_found("Space", id.to_string()))
    }

    async fn list_spaces(&self) -> FleetResult<Vec<Space>> {
        let tables = self.tables.read().await;
        let mut spaces: Vec<Space> = tables.spaces.values().cloned().collect();
        spaces.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(spaces)
    }

    async fn create_ampulario_material(
        &self,
        material: AmpularioMaterial,
    ) -> FleetResult<AmpularioMaterial> {
        let mut tables = self.tables.write().await;
        if !tables.spaces.contains_key(&material.space_id) {
            return Err(FleetError::not_found("Space", material.space_id.to_string()));
        }
        let existing: Vec<AmpularioMaterial> = tables.ampulario.values().cloned().collect();
        ensure_space_material_unique(&existing, &material)?;
        tables.ampulario.insert(material.id, material.clone());
        Ok(material)
    }

    async fn get_ampulario_material(&self, id: Uuid) -> FleetResult<AmpularioMaterial> {
        let tables = self.tables.read().await;
        tables
            .ampulario
            .get(&id)
            .cloned()
            .ok_or_else(|| FleetError::not_found("AmpularioMaterial", id.to_string()))
    }

    async fn list_ampulario_materials(
        &self,
        space_id: Option<Uuid>,
    ) -> FleetResult<Vec<AmpularioMaterial>> {
        let tables = self.tables.read().await;
        let mut materials: Vec<AmpularioMaterial> = tables
            .ampulario
            .values()
            .filter(|m| space_id.map_or(true, |space| m.space_id == space))
            .cloned()
            .collect();
        materials.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(materials)
    }

    async fn update_ampulario_material(
        &self,
        material: AmpularioMaterial,
    ) -> FleetResult<AmpularioMaterial> {
        let mut tables = self.tables.write().await;
        if !tables.ampulario.contains_key(&material.id) {
            return Err(FleetError::not_found(
                "AmpularioMaterial",
                material.id.to_string(),
            ));
        }
        let existing: Vec<AmpularioMaterial> = tables.ampulario.values().cloned().collect();
        ensure_space_material_unique(&existing, &material)?;
        tables.ampulario.insert(material.id, material.clone());
        Ok(material)
    }

    async fn delete_ampulario_material(&self, id: Uuid) -> FleetResult<()> {
        let mut tables = self.tables.write().await;
        if tables.ampulario.remove(&id).is_none() {
            return Err(FleetError::not_found("AmpularioMaterial", id.to_string()));
        }
        Ok(())
    }

    async fn create_kit(&self, kit: UsvbKit) -> FleetResult<UsvbKit> {
        let mut tables = self.tables.write().await;
        tables.kits.insert(kit.id, kit.clone());
        Ok(kit)
    }

    async fn get_kit(&self, id: Uuid) -> FleetResult<UsvbKit> {
        let tables = self.tables.read().await;
        tables
            .kits
            .get(&id)
            .cloned()
            .ok_or_else(|| FleetError::not_found("UsvbKit", id.to_string()))
    }

    async fn list_kits(&self) -> FleetResult<Vec<UsvbKit>> {
        let tables = self.tables.read().await;
        let mut kits: Vec<UsvbKit> = tables.kits.values().cloned().collect();
        kits.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(kits)
    }

    async fn create_user(&self, user: User) -> FleetResult<User> {
        let mut tables = self.tables.write().await;
        let existing: Vec<User> = tables.users.values().cloned().collect();
        ensure_user_unique(&existing, &user)?;
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn get_user(&self, id: Uuid) -> FleetResult<User> {
        let tables = self.tables.read().await;
        tables
            .users
            .get(&id)
            .cloned()
            .ok_or_else(|| FleetError::not_found("User", id.to_string()))
    }

    async fn find_user_by_username(&self, username: &str) -> FleetResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn list_users(&self) -> FleetResult<Vec<User>> {
        let tables = self.tables.read().await;
        let mut users: Vec<User> = tables.users.values().cloned().collect();
        users.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(users)
    }

    async fn update_user(&self, user: User) -> FleetResult<User> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&user.id) {
            return Err(FleetError::not_found("User", user.id.to_string()));
        }
        let existing: Vec<User> = tables.users.values().cloned().collect();
        ensure_user_unique(&existing, &user)?;
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn append_notification(&self, notification: Notification) -> FleetResult<()> {
        let mut tables = self.tables.write().await;
        tables.notifications.insert(notification.id, notification);
        Ok(())
    }

    async fn list_notifications(
        &self,
        recipient: Option<&str>,
    ) -> FleetResult<Vec<Notification>> {
        let tables = self.tables.read().await;
        let mut notifications: Vec<Notification> = tables
            .notifications
            .values()
            .filter(|n| recipient.map_or(true, |who| n.recipient == who))
            .cloned()
            .collect();
        notifications.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(notifications)
    }

    async fn append_audit(&self, entry: AuditLog) -> FleetResult<()> {
        let mut tables = self.tables.write().await;
        tables.audit.insert(entry.id, entry);
        Ok(())
    }

    async fn list_audit(&self) -> FleetResult<Vec<AuditLog>> {
        let tables = self.tables.read().await;
        let mut entries: Vec<AuditLog> = tables.audit.values().cloned().collect();
        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(entries)
    }

    async fn get_config_blob(&self, key: &str) -> FleetResult<Option<Value>> {
        let tables = self.tables.read().await;
        Ok(tables.config.get(key).cloned())
    }

    async fn put_config_blob(&self, key: &str, value: Value) -> FleetResult<()> {
        let mut tables = self.tables.write().await;
        tables.config.insert(key.to_string(), value);
        Ok(())
    }
}
