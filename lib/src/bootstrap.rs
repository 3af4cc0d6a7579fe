// lib/src/bootstrap.rs
//
// Explicit configuration store for the operational templates that gate
// daily work: mechanical-review checklist items, USVB kit compositions and
// the default ampulario spaces. Values live in the store's config blobs
// with an in-memory cache invalidated on write; `bootstrap` seeds the
// defaults once at startup when nothing is stored yet.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{json, Value};
use tokio::sync::RwLock;
use tracing::info;

use models::errors::FleetResult;
use models::Space;

use crate::storage_engine::FleetStore;

pub const KEY_MECHANICAL_CHECKLIST: &str = "templates/mechanical_checklist";
pub const KEY_KIT_TEMPLATES: &str = "templates/usvb_kits";
pub const KEY_SEEDED: &str = "bootstrap/seeded";

pub struct ConfigStore {
    store: Arc<dyn FleetStore>,
    cache: RwLock<HashMap<String, Value>>,
}

impl ConfigStore {
    pub fn new(store: Arc<dyn FleetStore>) -> Self {
        ConfigStore {
            store,
            cache: RwLock::new(HashMap::new()),
        }
    }

    pub async fn get(&self, key: &str) -> FleetResult<Option<Value>> {
        if let Some(cached) = self.cache.read().await.get(key) {
            return Ok(Some(cached.clone()));
        }
        let loaded = self.store.get_config_blob(key).await?;
        if let Some(ref value) = loaded {
            self.cache
                .write()
                .await
                .insert(key.to_string(), value.clone());
        }
        Ok(loaded)
    }

    pub async fn put(&self, key: &str, value: Value) -> FleetResult<()> {
        self.store.put_config_blob(key, value.clone()).await?;
        self.cache.write().await.insert(key.to_string(), value);
        Ok(())
    }
}

fn default_mechanical_checklist() -> Value {
    json!([
        {"name": "Niveles de aceite", "category": "motor"},
        {"name": "Líquido de frenos", "category": "frenos"},
        {"name": "Presión de neumáticos", "category": "neumáticos"},
        {"name": "Luces y señalización", "category": "eléctrico"},
        {"name": "Sirena y rotativos", "category": "eléctrico"},
        {"name": "Batería", "category": "eléctrico"},
        {"name": "Camilla y anclajes", "category": "sanitario"},
        {"name": "Oxígeno fijo", "category": "sanitario"},
    ])
}

fn default_kit_templates() -> Value {
    json!([
        {
            "name": "Kit vía aérea",
            "category": "airway",
            "materials": [
                {"name": "Guedel nº3", "target_quantity": 2},
                {"name": "Guedel nº4", "target_quantity": 2},
                {"name": "Mascarilla con reservorio", "target_quantity": 3},
            ]
        },
        {
            "name": "Kit circulatorio",
            "category": "circulation",
            "materials": [
                {"name": "Suero fisiológico 500ml", "target_quantity": 4},
                {"name": "Catéter 18G", "target_quantity": 6},
                {"name": "Compresor", "target_quantity": 2},
            ]
        },
    ])
}

const DEFAULT_SPACES: [&str; 3] = ["Vitrina A", "Vitrina B", "Nevera"];

/// One-time seeding of template defaults and ampulario spaces. Safe to call
/// on every startup; already-seeded stores are left alone.
pub async fn bootstrap(config_store: &ConfigStore) -> FleetResult<()> {
    if config_store.get(KEY_SEEDED).await?.is_some() {
        return Ok(());
    }

    if config_store.get(KEY_MECHANICAL_CHECKLIST).await?.is_none() {
        config_store
            .put(KEY_MECHANICAL_CHECKLIST, default_mechanical_checklist())
            .await?;
    }
    if config_store.get(KEY_KIT_TEMPLATES).await?.is_none() {
        config_store
            .put(KEY_KIT_TEMPLATES, default_kit_templates())
            .await?;
    }

    let existing_spaces = config_store.store.list_spaces().await?;
    for name in DEFAULT_SPACES {
        if !existing_spaces.iter().any(|s| s.name == name) {
            config_store
                .store
                .create_space(Space::new(name, None))
                .await?;
        }
    }

    config_store.put(KEY_SEEDED, json!(true)).await?;
    info!("bootstrap seeding complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage_engine::InMemoryFleetStore;

    #[tokio::test]
    async fn bootstrap_seeds_once() {
        let store: Arc<dyn FleetStore> = Arc::new(InMemoryFleetStore::new());
        let config = ConfigStore::new(store.clone());

        bootstrap(&config).await.unwrap();
        assert_eq!(store.list_spaces().await.unwrap().len(), DEFAULT_SPACES.len());
        assert!(config.get(KEY_MECHANICAL_CHECKLIST).await.unwrap().is_some());

        // A second bootstrap must not duplicate the seeds.
        bootstrap(&config).await.unwrap();
        assert_eq!(store.list_spaces().await.unwrap().len(), DEFAULT_SPACES.len());
    }

    #[tokio::test]
    async fn put_invalidates_the_cache() {
        let store: Arc<dyn FleetStore> = Arc::new(InMemoryFleetStore::new());
        let config = ConfigStore::new(store);

        config.put("k", json!("v1")).await.unwrap();
        assert_eq!(config.get("k").await.unwrap(), Some(json!("v1")));
        config.put("k", json!("v2")).await.unwrap();
        assert_eq!(config.get("k").await.unwrap(), Some(json!("v2")));
    }
}
