// lib/src/storage_engine/storage_engine.rs
//
// The single repository interface for every entity aggregate. Implemented
// by the sled-backed store and by the in-memory test double; nothing above
// this trait knows which one it is talking to.

use async_trait::async_trait;
use serde_json::Value;
use uuid::Uuid;

use models::errors::FleetResult;
use models::{
    Ambulance, AmpularioMaterial, AuditLog, CleaningLog, DailyVehicleCheck, Incident,
    IncidentType, InventoryItem, MechanicalReview, Notification, QuantityChange, Space, User,
    UsvbKit,
};

#[async_trait]
pub trait FleetStore: Send + Sync {
    // --- Ambulances ---
    async fn create_ambulance(&self, ambulance: Ambulance) -> FleetResult<Ambulance>;
    async fn get_ambulance(&self, id: Uuid) -> FleetResult<Ambulance>;
    async fn list_ambulances(&self) -> FleetResult<Vec<Ambulance>>;
    async fn update_ambulance(&self, ambulance: Ambulance) -> FleetResult<Ambulance>;
    /// Deletes the ambulance and all of its owned children: inventory items,
    /// quantity history, reviews, cleaning logs and daily checks.
    async fn delete_ambulance(&self, id: Uuid) -> FleetResult<()>;

    // --- Ambulance inventory ---
    async fn create_inventory_item(&self, item: InventoryItem) -> FleetResult<InventoryItem>;
    async fn get_inventory_item(&self, id: Uuid) -> FleetResult<InventoryItem>;
    /// All items, or the items of one ambulance.
    async fn list_inventory(&self, ambulance_id: Option<Uuid>) -> FleetResult<Vec<InventoryItem>>;
    async fn update_inventory_item(&self, item: InventoryItem) -> FleetResult<InventoryItem>;
    async fn delete_inventory_item(&self, id: Uuid) -> FleetResult<()>;
    async fn append_quantity_change(&self, change: QuantityChange) -> FleetResult<()>;
    async fn list_quantity_changes(&self, item_id: Uuid) -> FleetResult<Vec<QuantityChange>>;

    // --- Review records ---
    async fn append_mechanical_review(
        &self,
        review: MechanicalReview,
    ) -> FleetResult<MechanicalReview>;
    async fn list_mechanical_reviews(
        &self,
        ambulance_id: Uuid,
    ) -> FleetResult<Vec<MechanicalReview>>;
    async fn append_cleaning_log(&self, log: CleaningLog) -> FleetResult<CleaningLog>;
    async fn list_cleaning_logs(&self, ambulance_id: Uuid) -> FleetResult<Vec<CleaningLog>>;
    async fn append_daily_check(
        &self,
        check: DailyVehicleCheck,
    ) -> FleetResult<DailyVehicleCheck>;
    async fn list_daily_checks(&self, ambulance_id: Uuid)
        -> FleetResult<Vec<DailyVehicleCheck>>;

    // --- Incidents ---
    async fn create_incident(&self, incident: Incident) -> FleetResult<Incident>;
    async fn get_incident(&self, id: Uuid) -> FleetResult<Incident>;
    async fn list_incidents(&self) -> FleetResult<Vec<Incident>>;
    async fn update_incident(&self, incident: Incident) -> FleetResult<Incident>;
    /// The deduplication probe: an Open or InProgress incident of the given
    /// type for the given item, if one exists.
    async fn find_active_incident(
        &self,
        item_id: Uuid,
        incident_type: IncidentType,
    ) -> FleetResult<Option<Incident>>;

    // --- Central store (ampulario) ---
    async fn create_space(&self, space: Space) -> FleetResult<Space>;
    async fn get_space(&self, id: Uuid) -> FleetResult<Space>;
    async fn list_spaces(&self) -> FleetResult<Vec<Space>>;
    async fn create_ampulario_material(
        &self,
        material: AmpularioMaterial,
    ) -> FleetResult<AmpularioMaterial>;
    async fn get_ampulario_material(&self, id: Uuid) -> FleetResult<AmpularioMaterial>;
    async fn list_ampulario_materials(
        &self,
        space_id: Option<Uuid>,
    ) -> FleetResult<Vec<AmpularioMaterial>>;
    async fn update_ampulario_material(
        &self,
        material: AmpularioMaterial,
    ) -> FleetResult<AmpularioMaterial>;
    async fn delete_ampulario_material(&self, id: Uuid) -> FleetResult<()>;

    // --- USVB kits ---
    async fn create_kit(&self, kit: UsvbKit) -> FleetResult<UsvbKit>;
    async fn get_kit(&self, id: Uuid) -> FleetResult<UsvbKit>;
    async fn list_kits(&self) -> FleetResult<Vec<UsvbKit>>;

    // --- Users ---
    async fn create_user(&self, user: User) -> FleetResult<User>;
    async fn get_user(&self, id: Uuid) -> FleetResult<User>;
    async fn find_user_by_username(&self, username: &str) -> FleetResult<Option<User>>;
    async fn list_users(&self) -> FleetResult<Vec<User>>;
    async fn update_user(&self, user: User) -> FleetResult<User>;

    // --- Notifications ---
    async fn append_notification(&self, notification: Notification) -> FleetResult<()>;
    async fn list_notifications(&self, recipient: Option<&str>)
        -> FleetResult<Vec<Notification>>;

    // --- Audit trail ---
    async fn append_audit(&self, entry: AuditLog) -> FleetResult<()>;
    async fn list_audit(&self) -> FleetResult<Vec<AuditLog>>;

    // --- Configuration blobs (templates, seeded defaults) ---
    async fn get_config_blob(&self, key: &str) -> FleetResult<Option<Value>>;
    async fn put_config_blob(&self, key: &str, value: Value) -> FleetResult<()>;
}
