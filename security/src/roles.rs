// security/src/roles.rs

use std::collections::HashMap;
use std::fs;

use anyhow::Result;
use serde::Deserialize;

// Permission names used across the API surface.
pub const PERM_MANAGE_FLEET: &str = "manage_fleet";
pub const PERM_MANAGE_JOBS: &str = "manage_jobs";
pub const PERM_VIEW_AUDIT: &str = "view_audit";

#[derive(Debug, Deserialize, Clone)]
pub struct RoleConfig {
    pub id: u32,
    pub permissions: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RolesConfig {
    pub roles: HashMap<String, RoleConfig>,
    #[serde(skip)]
    role_id_map: HashMap<u32, RoleConfig>,
}

impl RolesConfig {
    pub fn from_yaml_file(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let mut config: RolesConfig = serde_yaml::from_str(content)?;
        config.role_id_map = config
            .roles
            .values()
            .map(|role_cfg| (role_cfg.id, role_cfg.clone()))
            .collect();
        Ok(config)
    }

    pub fn get_role_config_by_id(&self, role_id: u32) -> Option<&RoleConfig> {
        self.role_id_map.get(&role_id)
    }

    /// A role holds a permission if it lists it explicitly or carries the
    /// blanket `superuser` permission.
    pub fn has_permission(&self, role_id: u32, permission_name: &str) -> bool {
        self.get_role_config_by_id(role_id).is_some_and(|role_cfg| {
            role_cfg.permissions.iter().any(|p| p == permission_name)
                || role_cfg.permissions.iter().any(|p| p == "superuser")
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const YAML: &str = r#"
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

    #[test]
    fn permissions_resolve_by_role_id() {
        let roles = RolesConfig::from_yaml_str(YAML).unwrap();
        assert!(roles.has_permission(2, PERM_MANAGE_JOBS));
        assert!(!roles.has_permission(3, PERM_MANAGE_JOBS));
        assert!(!roles.has_permission(99, PERM_MANAGE_FLEET));
    }

    #[test]
    fn superuser_implies_everything() {
        let roles = RolesConfig::from_yaml_str(YAML).unwrap();
        assert!(roles.has_permission(1, PERM_MANAGE_JOBS));
        assert!(roles.has_permission(1, PERM_VIEW_AUDIT));
        assert!(roles.has_permission(1, "anything_else"));
    }
}
