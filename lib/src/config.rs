// lib/src/config.rs

use std::fs;
use std::path::PathBuf;

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use models::errors::{FleetError, FleetResult};

pub const DEFAULT_DATA_DIRECTORY: &str = "/tmp/fleet_data";
pub const DEFAULT_DAILY_JOB_TIME: &str = "03:00";

/// Engine configuration, loaded from `fleet_config.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FleetConfig {
    pub data_directory: String,
    pub jobs: JobsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobsConfig {
    /// Wall-clock time (HH:MM, UTC) of the daily pass.
    pub daily_time: String,
    /// Whether the timer loops are started at all; manual triggers keep
    /// working either way.
    pub scheduler_enabled: bool,
}

impl Default for FleetConfig {
    fn default() -> Self {
        FleetConfig {
            data_directory: DEFAULT_DATA_DIRECTORY.to_string(),
            jobs: JobsConfig::default(),
        }
    }
}

impl Default for JobsConfig {
    fn default() -> Self {
        JobsConfig {
            daily_time: DEFAULT_DAILY_JOB_TIME.to_string(),
            scheduler_enabled: true,
        }
    }
}

impl JobsConfig {
    pub fn daily_time(&self) -> NaiveTime {
        NaiveTime::parse_from_str(&self.daily_time, "%H:%M")
            .unwrap_or(NaiveTime::from_hms_opt(3, 0, 0).unwrap())
    }
}

// Wrapper struct matching the top-level 'fleet:' key in the YAML file.
#[derive(Debug, Deserialize)]
struct FleetConfigWrapper {
    fleet: FleetConfig,
}

/// Loads the engine configuration from `fleet_config.yaml`, falling back
/// to defaults when no file is present.
pub fn load_fleet_config(config_file_path: Option<PathBuf>) -> FleetResult<FleetConfig> {
    let default_path = PathBuf::from("fleet_config.yaml");
    let path_to_use = config_file_path.unwrap_or(default_path);

    if !path_to_use.exists() {
        return Ok(FleetConfig::default());
    }

    let config_content = fs::read_to_string(&path_to_use).map_err(|e| {
        FleetError::StorageError(format!(
            "Failed to read fleet config file {}: {}",
            path_to_use.display(),
            e
        ))
    })?;

    let wrapper: FleetConfigWrapper = serde_yaml2::from_str(&config_content).map_err(|e| {
        FleetError::InvalidInput(format!(
            "Failed to parse fleet config file {}: {}",
            path_to_use.display(),
            e
        ))
    })?;

    Ok(wrapper.fleet)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_without_a_file() {
        let config = load_fleet_config(Some(PathBuf::from("/nonexistent/fleet.yaml"))).unwrap();
        assert_eq!(config.data_directory, DEFAULT_DATA_DIRECTORY);
        assert!(config.jobs.scheduler_enabled);
    }

    #[test]
    fn daily_time_parses_and_falls_back() {
        let mut jobs = JobsConfig::default();
        assert_eq!(jobs.daily_time(), NaiveTime::from_hms_opt(3, 0, 0).unwrap());
        jobs.daily_time = "18:30".to_string();
        assert_eq!(jobs.daily_time(), NaiveTime::from_hms_opt(18, 30, 0).unwrap());
        jobs.daily_time = "not a time".to_string();
        assert_eq!(jobs.daily_time(), NaiveTime::from_hms_opt(3, 0, 0).unwrap());
    }

    #[test]
    fn yaml_wrapper_round_trips() {
        let yaml = r#"
fleet:
  data_directory: "/var/lib/fleet"
  jobs:
    daily_time: "04:15"
    scheduler_enabled: false
"#;
        let wrapper: FleetConfigWrapper = serde_yaml2::from_str(yaml).unwrap();
        assert_eq!(wrapper.fleet.data_directory, "/var/lib/fleet");
        assert!(!wrapper.fleet.jobs.scheduler_enabled);
        assert_eq!(
            wrapper.fleet.jobs.daily_time(),
            NaiveTime::from_hms_opt(4, 15, 0).unwrap()
        );
    }
}
