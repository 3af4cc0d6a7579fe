// models/src/ambulance.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::errors::FleetError;

/// The four review stages an ambulance walks through each cycle, in strict
/// order. The ambulance's boolean flags always encode a prefix of this
/// sequence; regressions cascade forward (see `lib::workflow`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WorkflowStage {
    DailyCheck,
    Mechanical,
    Cleaning,
    Inventory,
}

impl WorkflowStage {
    pub const ORDERED: [WorkflowStage; 4] = [
        WorkflowStage::DailyCheck,
        WorkflowStage::Mechanical,
        WorkflowStage::Cleaning,
        WorkflowStage::Inventory,
    ];

    /// Position of the stage in the fixed cycle order.
    pub fn index(&self) -> usize {
        match self {
            WorkflowStage::DailyCheck => 0,
            WorkflowStage::Mechanical => 1,
            WorkflowStage::Cleaning => 2,
            WorkflowStage::Inventory => 3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowStage::DailyCheck => "dailyCheck",
            WorkflowStage::Mechanical => "mechanical",
            WorkflowStage::Cleaning => "cleaning",
            WorkflowStage::Inventory => "inventory",
        }
    }
}

impl FromStr for WorkflowStage {
    type Err = FleetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dailyCheck" | "daily_check" => Ok(WorkflowStage::DailyCheck),
            "mechanical" => Ok(WorkflowStage::Mechanical),
            "cleaning" => Ok(WorkflowStage::Cleaning),
            "inventory" => Ok(WorkflowStage::Inventory),
            other => Err(FleetError::InvalidInput(format!("Unknown workflow stage: {}", other))),
        }
    }
}

impl fmt::Display for WorkflowStage {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Screen a consumer should be routed to next: the first pending stage in
/// order, or `Complete` once the whole cycle is done.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WorkflowScreen {
    DailyCheck,
    Mechanical,
    Cleaning,
    Inventory,
    Complete,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ambulance {
    pub id: Uuid,
    /// Internal fleet code, unique across the fleet.
    pub code: String,
    /// License plate, unique across the fleet.
    pub plate: String,
    pub vehicle_model: Option<String>,
    pub year: Option<u16>,
    /// USVB kit bag number carried by this vehicle, unique when set.
    pub kit_number: Option<String>,
    pub last_known_kilometers: u64,
    pub daily_check_completed: bool,
    pub mechanical_review_completed: bool,
    pub cleaning_completed: bool,
    pub inventory_completed: bool,
    pub last_daily_check: Option<DateTime<Utc>>,
    pub last_mechanical_review: Option<DateTime<Utc>>,
    pub last_cleaning: Option<DateTime<Utc>>,
    pub last_inventory_check: Option<DateTime<Utc>>,
    pub assigned_user_ids: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Ambulance {
    pub fn from_new(new: NewAmbulance) -> Self {
        let now = Utc::now();
        Ambulance {
            id: Uuid::new_v4(),
            code: new.code,
            plate: new.plate,
            vehicle_model: new.vehicle_model,
            year: new.year,
            kit_number: new.kit_number,
            last_known_kilometers: new.last_known_kilometers.unwrap_or(0),
            daily_check_completed: false,
            mechanical_review_completed: false,
            cleaning_completed: false,
            inventory_completed: false,
            last_daily_check: None,
            last_mechanical_review: None,
            last_cleaning: None,
            last_inventory_check: None,
            assigned_user_ids: new.assigned_user_ids.unwrap_or_default(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn stage_completed(&self, stage: WorkflowStage) -> bool {
        match stage {
            WorkflowStage::DailyCheck => self.daily_check_completed,
            WorkflowStage::Mechanical => self.mechanical_review_completed,
            WorkflowStage::Cleaning => self.cleaning_completed,
            WorkflowStage::Inventory => self.inventory_completed,
        }
    }

    pub fn set_stage_flag(&mut self, stage: WorkflowStage, value: bool) {
        match stage {
            WorkflowStage::DailyCheck => self.daily_check_completed = value,
            WorkflowStage::Mechanical => self.mechanical_review_completed = value,
            WorkflowStage::Cleaning => self.cleaning_completed = value,
            WorkflowStage::Inventory => self.inventory_completed = value,
        }
    }

    pub fn set_stage_timestamp(&mut self, stage: WorkflowStage, at: DateTime<Utc>) {
        match stage {
            WorkflowStage::DailyCheck => self.last_daily_check = Some(at),
            WorkflowStage::Mechanical => self.last_mechanical_review = Some(at),
            WorkflowStage::Cleaning => self.last_cleaning = Some(at),
            WorkflowStage::Inventory => self.last_inventory_check = Some(at),
        }
    }
}

/// DTO for creating a new ambulance via the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAmbulance {
    pub code: String,
    pub plate: String,
    pub vehicle_model: Option<String>,
    pub year: Option<u16>,
    pub kit_number: Option<String>,
    pub last_known_kilometers: Option<u64>,
    pub assigned_user_ids: Option<Vec<Uuid>>,
}

/// Mutable subset accepted on ambulance update. Workflow flags are not
/// updatable here; they only move through the state machine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateAmbulance {
    pub code: Option<String>,
    pub plate: Option<String>,
    pub vehicle_model: Option<String>,
    pub year: Option<u16>,
    pub kit_number: Option<String>,
    pub last_known_kilometers: Option<u64>,
    pub assigned_user_ids: Option<Vec<Uuid>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_order_is_fixed() {
        let indexes: Vec<usize> = WorkflowStage::ORDERED.iter().map(|s| s.index()).collect();
        assert_eq!(indexes, vec![0, 1, 2, 3]);
    }

    #[test]
    fn stage_parses_from_api_names() {
        assert_eq!("dailyCheck".parse::<WorkflowStage>().unwrap(), WorkflowStage::DailyCheck);
        assert_eq!("mechanical".parse::<WorkflowStage>().unwrap(), WorkflowStage::Mechanical);
        assert_eq!("cleaning".parse::<WorkflowStage>().unwrap(), WorkflowStage::Cleaning);
        assert_eq!("inventory".parse::<WorkflowStage>().unwrap(), WorkflowStage::Inventory);
        assert!("paint".parse::<WorkflowStage>().is_err());
    }

    #[test]
    fn new_ambulance_starts_with_all_stages_pending() {
        let amb = Ambulance::from_new(NewAmbulance {
            code: "AMB-01".into(),
            plate: "1234-ABC".into(),
            vehicle_model: None,
            year: None,
            kit_number: None,
            last_known_kilometers: None,
            assigned_user_ids: None,
        });
        for stage in WorkflowStage::ORDERED {
            assert!(!amb.stage_completed(stage));
        }
    }
}
