// models/src/ampulario.rs
//
// Central medication store ("ampulario"), organized into named spaces.
// Materials here follow the same derived stock status as ambulance
// inventory but belong to a space instead of a vehicle.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::inventory::MaterialStatus;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Space {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Space {
    pub fn new(name: impl Into<String>, description: Option<String>) -> Self {
        Space {
            id: Uuid::new_v4(),
            name: name.into(),
            description,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmpularioMaterial {
    pub id: Uuid,
    pub space_id: Uuid,
    /// Material name, unique within its space.
    pub name: String,
    pub dose: Option<String>,
    pub unit: Option<String>,
    pub quantity: i64,
    pub min_stock: i64,
    pub expiry_date: Option<NaiveDate>,
    pub status: MaterialStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AmpularioMaterial {
    pub fn from_new(new: NewAmpularioMaterial, today: NaiveDate) -> Self {
        let now = Utc::now();
        let status =
            MaterialStatus::derive(new.quantity, new.min_stock, new.expiry_date, today);
        AmpularioMaterial {
            id: Uuid::new_v4(),
            space_id: new.space_id,
            name: new.name,
            dose: new.dose,
            unit: new.unit,
            quantity: new.quantity,
            min_stock: new.min_stock,
            expiry_date: new.expiry_date,
            status,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn rederive_status(&mut self, today: NaiveDate) {
        self.status =
            MaterialStatus::derive(self.quantity, self.min_stock, self.expiry_date, today);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAmpularioMaterial {
    pub space_id: Uuid,
    pub name: String,
    pub dose: Option<String>,
    pub unit: Option<String>,
    pub quantity: i64,
    pub min_stock: i64,
    pub expiry_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateAmpularioMaterial {
    pub name: Option<String>,
    pub dose: Option<String>,
    pub unit: Option<String>,
    pub quantity: Option<i64>,
    pub min_stock: Option<i64>,
    pub expiry_date: Option<Option<NaiveDate>>,
}
