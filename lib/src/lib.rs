// lib/src/lib.rs

pub mod alerts;
pub mod bootstrap;
pub mod config;
pub mod jobs;
pub mod kits;
pub mod storage_engine;
pub mod workflow;

pub use models::errors::{FleetError, FleetResult};

// Explicit re-exports
pub use crate::bootstrap::{bootstrap, ConfigStore};
pub use crate::config::{load_fleet_config, FleetConfig, JobsConfig};
pub use crate::jobs::{
    run_daily_pass, run_hourly_pass, spawn_scheduler, DailyPassReport, HourlyPassReport,
    JobContext,
};
pub use crate::storage_engine::{FleetStore, InMemoryFleetStore, SledFleetStore};
pub use crate::workflow::{apply_stage_change, complete_stage, unlocked_screen};
