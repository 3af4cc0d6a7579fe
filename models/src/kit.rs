// models/src/kit.rs
//
// USVB kit templates: the ideal composition of an equipment bag, audited
// against an ambulance's current stock.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Finite set of kit categories. A closed enum rather than free-text icon
/// names; the presentation layer maps these to whatever icons it likes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KitCategory {
    Airway,
    Circulation,
    Trauma,
    Medication,
    Pediatric,
    Diagnostics,
    Protection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KitMaterial {
    pub name: String,
    pub target_quantity: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsvbKit {
    pub id: Uuid,
    pub name: String,
    pub category: KitCategory,
    pub materials: Vec<KitMaterial>,
    pub created_at: DateTime<Utc>,
}

impl UsvbKit {
    pub fn from_new(new: NewUsvbKit) -> Self {
        UsvbKit {
            id: Uuid::new_v4(),
            name: new.name,
            category: new.category,
            materials: new.materials,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewUsvbKit {
    pub name: String,
    pub category: KitCategory,
    pub materials: Vec<KitMaterial>,
}

/// One line of a kit audit: how a material's current stock compares to the
/// kit's target quantity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KitAuditEntry {
    pub material: String,
    pub target_quantity: i64,
    pub current_quantity: i64,
    pub shortfall: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KitAuditReport {
    pub kit_id: Uuid,
    pub ambulance_id: Uuid,
    pub entries: Vec<KitAuditEntry>,
    pub complete: bool,
    pub audited_at: DateTime<Utc>,
}
