// rest_api/src/config.rs

use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use serde::Deserialize;

pub const DEFAULT_REST_PORT: u16 = 8082;

/// Represents the configuration for the REST API server itself.
#[derive(Debug, Clone, Deserialize)]
pub struct RestApiConfig {
    pub port: u16,
    pub host: String,
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,
    #[serde(default = "default_roles_file")]
    pub roles_file: String,
}

fn default_jwt_secret() -> String {
    "change_me_in_production".to_string()
}

fn default_roles_file() -> String {
    "security/roles_permissions.yaml".to_string()
}

impl Default for RestApiConfig {
    fn default() -> Self {
        RestApiConfig {
            port: DEFAULT_REST_PORT,
            host: "127.0.0.1".to_string(),
            jwt_secret: default_jwt_secret(),
            roles_file: default_roles_file(),
        }
    }
}

// Wrapper struct matching the 'rest_api:' key in the YAML config.
#[derive(Debug, Deserialize)]
struct RestApiConfigWrapper {
    rest_api: RestApiConfig,
}

/// Loads the REST API configuration from `fleet_rest_config.yaml`, falling
/// back to defaults when the file is absent. The JWT secret can always be
/// overridden through `FLEET_JWT_SECRET`.
pub fn load_rest_api_config(config_file_path: Option<PathBuf>) -> Result<RestApiConfig> {
    let path_to_use = config_file_path.unwrap_or_else(|| PathBuf::from("fleet_rest_config.yaml"));

    let mut config = if path_to_use.exists() {
        let config_content = fs::read_to_string(&path_to_use).map_err(|e| {
            anyhow::anyhow!("Failed to read REST API config file {}: {}", path_to_use.display(), e)
        })?;
        let wrapper: RestApiConfigWrapper = serde_yaml2::from_str(&config_content).map_err(|e| {
            anyhow::anyhow!("Failed to parse REST API config file {}: {}", path_to_use.display(), e)
        })?;
        wrapper.rest_api
    } else {
        RestApiConfig::default()
    };

    if let Ok(secret) = std::env::var("FLEET_JWT_SECRET") {
        if !secret.is_empty() {
            config.jwt_secret = secret;
        }
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let config = load_rest_api_config(Some(PathBuf::from("/nonexistent/rest.yaml"))).unwrap();
        assert_eq!(config.port, DEFAULT_REST_PORT);
        assert_eq!(config.host, "127.0.0.1");
    }

    #[test]
    fn yaml_wrapper_parses() {
        let yaml = r#"
rest_api:
  port: 9090
  host: "0.0.0.0"
  jwt_secret: "s3cret"
"#;
        let wrapper: RestApiConfigWrapper = serde_yaml2::from_str(yaml).unwrap();
        assert_eq!(wrapper.rest_api.port, 9090);
        assert_eq!(wrapper.rest_api.jwt_secret, "s3cret");
        assert_eq!(wrapper.rest_api.roles_file, "security/roles_permissions.yaml");
    }
}
