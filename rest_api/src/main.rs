// rest_api/src/main.rs

use std::sync::Arc;

use anyhow::Context;
use tokio::sync::{oneshot, Mutex};
use tracing::{info, warn};

use lib::{
    bootstrap, load_fleet_config, spawn_scheduler, ConfigStore, FleetStore, JobContext,
    SledFleetStore,
};
use notifications_service::NotificationDispatcher;
use rest_api::{load_rest_api_config, start_server, AppState};
use security::RolesConfig;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt().init();

    let rest_config = load_rest_api_config(None).context("Failed to load REST API configuration")?;
    let fleet_config = load_fleet_config(None).context("Failed to load fleet configuration")?;

    let roles = match RolesConfig::from_yaml_file(&rest_config.roles_file) {
        Ok(roles) => roles,
        Err(e) => {
            warn!(error = %e, file = %rest_config.roles_file, "roles file missing, using built-in defaults");
            RolesConfig::from_yaml_str(DEFAULT_ROLES_YAML)?
        }
    };

    let store: Arc<dyn FleetStore> = Arc::new(
        SledFleetStore::open(&fleet_config.data_directory)
            .context("Failed to open fleet database")?,
    );

    let config_store = Arc::new(ConfigStore::new(store.clone()));
    bootstrap(&config_store)
        .await
        .context("Bootstrap seeding failed")?;

    let (dispatcher, _socket) = NotificationDispatcher::with_default_sinks();
    let job_ctx = Arc::new(JobContext::new(store.clone(), Arc::new(dispatcher)));

    if fleet_config.jobs.scheduler_enabled {
        spawn_scheduler(job_ctx.clone(), fleet_config.jobs.clone());
        info!(daily_time = %fleet_config.jobs.daily_time, "job scheduler started");
    } else {
        info!("job scheduler disabled by configuration");
    }

    let state = AppState {
        store,
        config_store,
        job_ctx,
        roles: Arc::new(roles),
        jwt_secret: Arc::new(rest_config.jwt_secret.clone().into_bytes()),
        rest_api_shutdown_tx: Arc::new(Mutex::new(None)),
    };

    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Ctrl-C received, shutting down.");
            let _ = shutdown_tx.send(());
        }
    });

    start_server(rest_config.port, state, shutdown_rx).await
}

const DEFAULT_ROLES_YAML: &str = r#"
roles:
  admin:
    id: 1
    permissions: ["superuser"]
  coordinator:
    id: 2
    permissions: ["manage_fleet", "manage_jobs", "view_audit"]
  crew:
    id: 3
    permissions: ["manage_fleet"]
"#;
