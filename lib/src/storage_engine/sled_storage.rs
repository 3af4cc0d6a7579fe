// lib/src/storage_engine/sled_storage.rs
//
// Sled-backed implementation of `FleetStore`. One tree per aggregate,
// records keyed by their uuid string and serialized as JSON.

use std::path::Path;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::info;
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

const TREE_AMBULANCES: &str = "ambulances";
const TREE_INVENTORY: &str = "inventory_items";
const TREE_QUANTITY_CHANGES: &str = "quantity_changes";
const TREE_MECHANICAL_REVIEWS: &str = "mechanical_reviews";
const TREE_CLEANING_LOGS: &str = "cleaning_logs";
const TREE_DAILY_CHECKS: &str = "daily_checks";
const TREE_INCIDENTS: &str = "incidents";
const TREE_SPACES: &str = "spaces";
const TREE_AMPULARIO: &str = "ampulario_materials";
const TREE_KITS: &str = "kits";
const TREE_USERS: &str = "users";
const TREE_NOTIFICATIONS: &str = "notifications";
const TREE_AUDIT: &str = "audit_log";
const TREE_CONFIG: &str = "config_blobs";

pub struct SledFleetStore {
    db: sled::Db,
}

impl SledFleetStore {
    pub fn open(path: impl AsRef<Path>) -> FleetResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            std::fs::create_dir_all(path)?;
        }
        let db = sled::open(path)?;
        info!("Opened fleet database at {:?}", path);
        Ok(SledFleetStore { db })
    }

    fn tree(&self, name: &str) -> FleetResult<sled::Tree> {
        self.db
            .open_tree(name)
            .map_err(|e| FleetError::StorageError(e.to_string()))
    }

    fn put<T: Serialize>(&self, tree: &str, id: Uuid, value: &T) -> FleetResult<()> {
        let bytes = serde_json::to_vec(value)?;
        self.tree(tree)?
            .insert(id.to_string().as_bytes(), bytes)
            .map_err(|e| FleetError::StorageError(e.to_string()))?;
        Ok(())
    }

    fn fetch<T: DeserializeOwned>(&self, tree: &str, id: Uuid) -> FleetResult<Option<T>> {
        let found = self
            .tree(tree)?
            .get(id.to_string().as_bytes())
            .map_err(|e| FleetError::StorageError(e.to_string()))?;
        match found {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    fn all<T: DeserializeOwned>(&self, tree: &str) -> FleetResult<Vec<T>> {
        let mut out = Vec::new();
        for entry in self.tree(tree)?.iter() {
            let (_, bytes) = entry.map_err(|e| FleetError::StorageError(e.to_string()))?;
            out.push(serde_json::from_slice(&bytes)?);
        }
        Ok(out)
    }

    fn remove(&self, tree: &str, id: Uuid) -> FleetResult<bool> {
        let removed = self
            .tree(tree)?
            .remove(id.to_string().as_bytes())
            .map_err(|e| FleetError::StorageError(e.to_string()))?;
        Ok(removed.is_some())
    }
}

#[async_trait]
impl FleetStore for SledFleetStore {
    async fn create_ambulance(&self, ambulance: Ambulance) -> FleetResult<Ambulance> {
        let existing: Vec<Ambulance> = self.all(TREE_AMBULANCES)?;
        ensure_ambulance_unique(&existing, &ambulance)?;
        self.put(TREE_AMBULANCES, ambulance.id, &ambulance)?;
        Ok(ambulance)
    }

    async fn get_ambulance(&self, id: Uuid) -> FleetResult<Ambulance> {
        self.fetch(TREE_AMBULANCES, id)?
            .ok_or_else(|| FleetError::not_found("Ambulance", id.to_string()))
    }

    async fn list_ambulances(&self) -> FleetResult<Vec<Ambulance>> {
        let mut ambulances: Vec<Ambulance> = self.all(TREE_AMBULANCES)?;
        ambulances.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(ambulances)
    }

    async fn update_ambulance(&self, ambulance: Ambulance) -> FleetResult<Ambulance> {
        if self.fetch::<Ambulance>(TREE_AMBULANCES, ambulance.id)?.is_none() {
            return Err(FleetError::not_found("Ambulance", ambulance.id.to_string()));
        }
        let existing: Vec<Ambulance> = self.all(TREE_AMBULANCES)?;
        ensure_ambulance_unique(&existing, &ambulance)?;
        self.put(TREE_AMBULANCES, ambulance.id, &ambulance)?;
        Ok(ambulance)
    }

    async fn delete_ambulance(&self, id: Uuid) -> FleetResult<()> {
        if !self.remove(TREE_AMBULANCES, id)? {
            return Err(FleetError::not_found("Ambulance", id.to_string()));
        }
        // Cascade: drop every owned child record.
        let items: Vec<InventoryItem> = self.all(TREE_INVENTORY)?;
        for item in items.iter().filter(|i| i.ambulance_id == id) {
            self.remove(TREE_INVENTORY, item.id)?;
            let changes: Vec<QuantityChange> = self.all(TREE_QUANTITY_CHANGES)?;
            for change in changes.iter().filter(|c| c.item_id == item.id) {
                self.remove(TREE_QUANTITY_CHANGES, change.id)?;
            }
        }
        let reviews: Vec<MechanicalReview> = self.all(TREE_MECHANICAL_REVIEWS)?;
        for review in reviews.iter().filter(|r| r.ambulance_id == id) {
            self.remove(TREE_MECHANICAL_REVIEWS, review.id)?;
        }
        let logs: Vec<CleaningLog> = self.all(TREE_CLEANING_LOGS)?;
        for log in logs.iter().filter(|l| l.ambulance_id == id) {
            self.remove(TREE_CLEANING_LOGS, log.id)?;
        }
        let checks: Vec<DailyVehicleCheck> = self.all(TREE_DAILY_CHECKS)?;
        for check in checks.iter().filter(|c| c.ambulance_id == id) {
            self.remove(TREE_DAILY_CHECKS, check.id)?;
        }
        Ok(())
    }

    async fn create_inventory_item(&self, item: InventoryItem) -> FleetResult<InventoryItem> {
        self.get_ambulance(item.ambulance_id).await?;
        let siblings: Vec<InventoryItem> = self
            .all::<InventoryItem>(TREE_INVENTORY)?
            .into_iter()
            .filter(|i| i.ambulance_id == item.ambulance_id)
            .collect();
        ensure_item_name_unique(&siblings, &item)?;
        self.put(TREE_INVENTORY, item.id, &item)?;
        Ok(item)
    }

    async fn get_inventory_item(&self, id: Uuid) -> FleetResult<InventoryItem> {
        self.fetch(TREE_INVENTORY, id)?
            .ok_or_else(|| FleetError::not_found("InventoryItem", id.to_string()))
    }

    async fn list_inventory(
        &self,
        ambulance_id: Option<Uuid>,
    ) -> FleetResult<Vec<InventoryItem>> {
        let mut items: Vec<InventoryItem> = self.all(TREE_INVENTORY)?;
        if let Some(owner) = ambulance_id {
            items.retain(|i| i.ambulance_id == owner);
        }
        items.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(items)
    }

    async fn update_inventory_item(&self, item: InventoryItem) -> FleetResult<InventoryItem> {
        if self.fetch::<InventoryItem>(TREE_INVENTORY, item.id)?.is_none() {
            return Err(FleetError::not_found("InventoryItem", item.id.to_string()));
        }
        let siblings: Vec<InventoryItem> = self
            .all::<InventoryItem>(TREE_INVENTORY)?
            .into_iter()
            .filter(|i| i.ambulance_id == item.ambulance_id)
            .collect();
        ensure_item_name_unique(&siblings, &item)?;
        self.put(TREE_INVENTORY, item.id, &item)?;
        Ok(item)
    }

    async fn delete_inventory_item(&self, id: Uuid) -> FleetResult<()> {
        if !self.remove(TREE_INVENTORY, id)? {
            return Err(FleetError::not_found("InventoryItem", id.to_string()));
        }
        let changes: Vec<QuantityChange> = self.all(TREE_QUANTITY_CHANGES)?;
        for change in changes.iter().filter(|c| c.item_id == id) {
            self.remove(TREE_QUANTITY_CHANGES, change.id)?;
        }
        Ok(())
    }

    async fn append_quantity_change(&self, change: QuantityChange) -> FleetResult<()> {
        self.put(TREE_QUANTITY_CHANGES, change.id, &change)
    }

    async fn list_quantity_changes(&self, item_id: Uuid) -> FleetResult<Vec<QuantityChange>> {
        let mut changes: Vec<QuantityChange> = self.all(TREE_QUANTITY_CHANGES)?;
        changes.retain(|c| c.item_id == item_id);
        changes.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(changes)
    }

    async fn append_mechanical_review(
        &self,
        review: MechanicalReview,
    ) -> FleetResult<MechanicalReview> {
        self.put(TREE_MECHANICAL_REVIEWS, review.id, &review)?;
        Ok(review)
    }

    async fn list_mechanical_reviews(
        &self,
        ambulance_id: Uuid,
    ) -> FleetResult<Vec<MechanicalReview>> {
        let mut reviews: Vec<MechanicalReview> = self.all(TREE_MECHANICAL_REVIEWS)?;
        reviews.retain(|r| r.ambulance_id == ambulance_id);
        reviews.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(reviews)
    }

    async fn append_cleaning_log(&self, log: CleaningLog) -> FleetResult<CleaningLog> {
        self.put(TREE_CLEANING_LOGS, log.id, &log)?;
        Ok(log)
    }

    async fn list_cleaning_logs(&self, ambulance_id: Uuid) -> FleetResult<Vec<CleaningLog>> {
        let mut logs: Vec<CleaningLog> = self.all(TREE_CLEANING_LOGS)?;
        logs.retain(|l| l.ambulance_id == ambulance_id);
        logs.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(logs)
    }

    async fn append_daily_check(
        &self,
        check: DailyVehicleCheck,
    ) -> FleetResult<DailyVehicleCheck> {
        self.put(TREE_DAILY_CHECKS, check.id, &check)?;
        Ok(check)
    }

    async fn list_daily_checks(
        &self,
        ambulance_id: Uuid,
    ) -> FleetResult<Vec<DailyVehicleCheck>> {
        let mut checks: Vec<DailyVehicleCheck> = self.all(TREE_DAILY_CHECKS)?;
        checks.retain(|c| c.ambulance_id == ambulance_id);
        checks.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(checks)
    }

    async fn create_incident(&self, incident: Incident) -> FleetResult<Incident> {
        self.put(TREE_INCIDENTS, incident.id, &incident)?;
        Ok(incident)
    }

    async fn get_incident(&self, id: Uuid) -> FleetResult<Incident> {
        self.fetch(TREE_INCIDENTS, id)?
            .ok_or_else(|| FleetError::not_found("Incident", id.to_string()))
    }

    async fn list_incidents(&self) -> FleetResult<Vec<Incident>> {
        let mut incidents: Vec<Incident> = self.all(TREE_INCIDENTS)?;
        incidents.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(incidents)
    }

    async fn update_incident(&self, incident: Incident) -> FleetResult<Incident> {
        if self.fetch::<Incident>(TREE_INCIDENTS, incident.id)?.is_none() {
            return Err(FleetError::not_found("Incident", incident.id.to_string()));
        }
        self.put(TREE_INCIDENTS, incident.id, &incident)?;
        Ok(incident)
    }

    async fn find_active_incident(
        &self,
        item_id: Uuid,
        incident_type: IncidentType,
    ) -> FleetResult<Option<Incident>> {
        let incidents: Vec<Incident> = self.all(TREE_INCIDENTS)?;
        Ok(incidents.into_iter().find(|i| {
            i.item_id == Some(item_id)
                && i.incident_type == incident_type
                && i.status.is_active()
        }))
    }

    async fn create_space(&self, space: Space) -> FleetResult<Space> {
        let existing: Vec<Space> = self.all(TREE_SPACES)?;
        if existing.iter().any(|s| s.name == space.name) {
            return Err(FleetError::Conflict("este espacio ya existe".to_string()));
        }
        self.put(TREE_SPACES, space.id, &space)?;
        Ok(space)
    }

    async fn get_space(&self, id: Uuid) -> FleetResult<Space> {
        self.fetch(TREE_SPACES, id)?
            .ok_or_else(|| FleetError::not_found("Space", id.to_string()))
    }

    async fn list_spaces(&self) -> FleetResult<Vec<Space>> {
        let mut spaces: Vec<Space> = self.all(TREE_SPACES)?;
        spaces.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(spaces)
    }

    async fn create_ampulario_material(
        &self,
        material: AmpularioMaterial,
    ) -> FleetResult<AmpularioMaterial> {
        self.get_space(material.space_id).await?;
        let existing: Vec<AmpularioMaterial> = self.all(TREE_AMPULARIO)?;
        ensure_space_material_unique(&existing, &material)?;
        self.put(TREE_AMPULARIO, material.id, &material)?;
        Ok(material)
    }

    async fn get_ampulario_material(&self, id: Uuid) -> FleetResult<AmpularioMaterial> {
        self.fetch(TREE_AMPULARIO, id)?
            .ok_or_else(|| FleetError::not_found("AmpularioMaterial", id.to_string()))
    }

    async fn list_ampulario_materials(
        &self,
        space_id: Option<Uuid>,
    ) -> FleetResult<Vec<AmpularioMaterial>> {
        let mut materials: Vec<AmpularioMaterial> = self.all(TREE_AMPULARIO)?;
        if let Some(space) = space_id {
            materials.retain(|m| m.space_id == space);
        }
        materials.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(materials)
    }

    async fn update_ampulario_material(
        &self,
        material: AmpularioMaterial,
    ) -> FleetResult<AmpularioMaterial> {
        if self
            .fetch::<AmpularioMaterial>(TREE_AMPULARIO, material.id)?
            .is_none()
        {
            return Err(FleetError::not_found(
                "AmpularioMaterial",
                material.id.to_string(),
            ));
        }
        let existing: Vec<AmpularioMaterial> = self.all(TREE_AMPULARIO)?;
        ensure_space_material_unique(&existing, &material)?;
        self.put(TREE_AMPULARIO, material.id, &material)?;
        Ok(material)
    }

    async fn delete_ampulario_material(&self, id: Uuid) -> FleetResult<()> {
        if !self.remove(TREE_AMPULARIO, id)? {
            return Err(FleetError::not_found("AmpularioMaterial", id.to_string()));
        }
        Ok(())
    }

    async fn create_kit(&self, kit: UsvbKit) -> FleetResult<UsvbKit> {
        self.put(TREE_KITS, kit.id, &kit)?;
        Ok(kit)
    }

    async fn get_kit(&self, id: Uuid) -> FleetResult<UsvbKit> {
        self.fetch(TREE_KITS, id)?
            .ok_or_else(|| FleetError::not_found("UsvbKit", id.to_string()))
    }

    async fn list_kits(&self) -> FleetResult<Vec<UsvbKit>> {
        let mut kits: Vec<UsvbKit> = self.all(TREE_KITS)?;
        kits.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(kits)
    }

    async fn create_user(&self, user: User) -> FleetResult<User> {
        let existing: Vec<User> = self.all(TREE_USERS)?;
        ensure_user_unique(&existing, &user)?;
        self.put(TREE_USERS, user.id, &user)?;
        Ok(user)
    }

    async fn get_user(&self, id: Uuid) -> FleetResult<User> {
        self.fetch(TREE_USERS, id)?
            .ok_or_else(|| FleetError::not_found("User", id.to_string()))
    }

    async fn find_user_by_username(&self, username: &str) -> FleetResult<Option<User>> {
        let users: Vec<User> = self.all(TREE_USERS)?;
        Ok(users.into_iter().find(|u| u.username == username))
    }

    async fn list_users(&self) -> FleetResult<Vec<User>> {
        let mut users: Vec<User> = self.all(TREE_USERS)?;
        users.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(users)
    }

    async fn update_user(&self, user: User) -> FleetResult<User> {
        if self.fetch::<User>(TREE_USERS, user.id)?.is_none() {
            return Err(FleetError::not_found("User", user.id.to_string()));
        }
        let existing: Vec<User> = self.all(TREE_USERS)?;
        ensure_user_unique(&existing, &user)?;
        self.put(TREE_USERS, user.id, &user)?;
        Ok(user)
    }

    async fn append_notification(&self, notification: Notification) -> FleetResult<()> {
        self.put(TREE_NOTIFICATIONS, notification.id, &notification)
    }

    async fn list_notifications(
        &self,
        recipient: Option<&str>,
    ) -> FleetResult<Vec<Notification>> {
        let mut notifications: Vec<Notification> = self.all(TREE_NOTIFICATIONS)?;
        if let Some(who) = recipient {
            notifications.retain(|n| n.recipient == who);
        }
        notifications.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(notifications)
    }

    async fn append_audit(&self, entry: AuditLog) -> FleetResult<()> {
        self.put(TREE_AUDIT, entry.id, &entry)
    }

    async fn list_audit(&self) -> FleetResult<Vec<AuditLog>> {
        let mut entries: Vec<AuditLog> = self.all(TREE_AUDIT)?;
        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(entries)
    }

    async fn get_config_blob(&self, key: &str) -> FleetResult<Option<Value>> {
        let found = self
            .tree(TREE_CONFIG)?
            .get(key.as_bytes())
            .map_err(|e| FleetError::StorageError(e.to_string()))?;
        match found {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    async fn put_config_blob(&self, key: &str, value: Value) -> FleetResult<()> {
        let bytes = serde_json::to_vec(&value)?;
        self.tree(TREE_CONFIG)?
            .insert(key.as_bytes(), bytes)
            .map_err(|e| FleetError::StorageError(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use models::NewAmbulance;

    fn new_store() -> (SledFleetStore, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = SledFleetStore::open(dir.path().join("fleet_db")).unwrap();
        (store, dir)
    }

    fn sample_ambulance(code: &str, plate: &str) -> Ambulance {
        Ambulance::from_new(NewAmbulance {
            code: code.into(),
            plate: plate.into(),
            vehicle_model: None,
            year: None,
            kit_number: None,
            last_known_kilometers: None,
            assigned_user_ids: None,
        })
    }

    #[tokio::test]
    async fn ambulance_round_trip() {
        let (store, _dir) = new_store();
        let created = store
            .create_ambulance(sample_ambulance("AMB-01", "1111-AAA"))
            .await
            .unwrap();
        let fetched = store.get_ambulance(created.id).await.unwrap();
        assert_eq!(created, fetched);
    }

    #[tokio::test]
    async fn duplicate_code_is_a_conflict() {
        let (store, _dir) = new_store();
        store
            .create_ambulance(sample_ambulance("AMB-01", "1111-AAA"))
            .await
            .unwrap();
        let err = store
            .create_ambulance(sample_ambulance("AMB-01", "2222-BBB"))
            .await
            .unwrap_err();
        assert!(matches!(err, FleetError::Conflict(_)));
        assert_eq!(err.to_string(), "este código ya existe");
    }

    #[tokio::test]
    async fn delete_cascades_to_inventory() {
        let (store, _dir) = new_store();
        let amb = store
            .create_ambulance(sample_ambulance("AMB-01", "1111-AAA"))
            .await
            .unwrap();
        let today = chrono::Utc::now().date_naive();
        let item = InventoryItem::from_new(
            models::NewInventoryItem {
                name: "gasas".into(),
                kind: models::MaterialKind::Consumable,
                quantity: 10,
                min_stock: 2,
                expiry_date: None,
                location: None,
            },
            amb.id,
            today,
        );
        store.create_inventory_item(item.clone()).await.unwrap();
        store.delete_ambulance(amb.id).await.unwrap();
        assert!(store.get_inventory_item(item.id).await.is_err());
        assert!(store.list_inventory(None).await.unwrap().is_empty());
    }
}
