// models/src/review.rs
//
// Point-in-time review records owned by one ambulance. Only the latest
// record per ambulance gates the workflow; history is kept for audit.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChecklistStatus {
    Ok,
    Repair,
    NotApplicable,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChecklistItem {
    pub name: String,
    pub category: String,
    pub status: ChecklistStatus,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MechanicalReview {
    pub id: Uuid,
    pub ambulance_id: Uuid,
    pub reviewer: String,
    pub kilometers: Option<u64>,
    pub items: Vec<ChecklistItem>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewMechanicalReview {
    pub reviewer: String,
    pub kilometers: Option<u64>,
    pub items: Vec<ChecklistItem>,
    pub notes: Option<String>,
}

impl MechanicalReview {
    pub fn from_new(new: NewMechanicalReview, ambulance_id: Uuid) -> Self {
        MechanicalReview {
            id: Uuid::new_v4(),
            ambulance_id,
            reviewer: new.reviewer,
            kilometers: new.kilometers,
            items: new.items,
            notes: new.notes,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleaningLog {
    pub id: Uuid,
    pub ambulance_id: Uuid,
    pub cleaner: String,
    pub items: Vec<ChecklistItem>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCleaningLog {
    pub cleaner: String,
    pub items: Vec<ChecklistItem>,
    pub notes: Option<String>,
}

impl CleaningLog {
    pub fn from_new(new: NewCleaningLog, ambulance_id: Uuid) -> Self {
        CleaningLog {
            id: Uuid::new_v4(),
            ambulance_id,
            cleaner: new.cleaner,
            items: new.items,
            notes: new.notes,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FuelLevel {
    Full,
    ThreeQuarters,
    Half,
    Quarter,
    Reserve,
}

/// Structured daily check-in record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyVehicleCheck {
    pub id: Uuid,
    pub ambulance_id: Uuid,
    pub driver: String,
    pub kilometers: u64,
    pub fuel_level: FuelLevel,
    pub tyres_ok: bool,
    pub lights_ok: bool,
    pub documents_present: bool,
    pub issues: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewDailyVehicleCheck {
    pub driver: String,
    pub kilometers: u64,
    pub fuel_level: FuelLevel,
    pub tyres_ok: bool,
    pub lights_ok: bool,
    pub documents_present: bool,
    pub issues: Option<String>,
}

impl DailyVehicleCheck {
    pub fn from_new(new: NewDailyVehicleCheck, ambulance_id: Uuid) -> Self {
        DailyVehicleCheck {
            id: Uuid::new_v4(),
            ambulance_id,
            driver: new.driver,
            kilometers: new.kilometers,
            fuel_level: new.fuel_level,
            tyres_ok: new.tyres_ok,
            lights_ok: new.lights_ok,
            documents_present: new.documents_present,
            issues: new.issues,
            created_at: Utc::now(),
        }
    }
}
