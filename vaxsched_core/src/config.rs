//! Configuration file support for vaxsched.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/vaxsched/config.toml`, then
//! backend settings may be overridden from the environment.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub backend: BackendConfig,
}

/// Local data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Workflow backend endpoints
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BackendConfig {
    #[serde(default)]
    pub base_url: String,

    #[serde(default = "default_vaccine_webhook_path")]
    pub vaccine_webhook_path: String,

    #[serde(default = "default_check_staff_path")]
    pub check_staff_path: String,

    #[serde(default = "default_patient_search_path")]
    pub patient_search_path: String,

    #[serde(default = "default_assign_schedule_path")]
    pub assign_schedule_path: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            vaccine_webhook_path: default_vaccine_webhook_path(),
            check_staff_path: default_check_staff_path(),
            patient_search_path: default_patient_search_path(),
            assign_schedule_path: default_assign_schedule_path(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl BackendConfig {
    /// Full URL for an endpoint path
    pub fn endpoint_url(&self, path: &str) -> Result<String> {
        let base = self.base_url.trim().trim_end_matches('/');
        if base.is_empty() {
            return Err(Error::Config(
                "backend.base_url is not set (config file or VAXSCHED_BASE_URL)".into(),
            ));
        }
        Ok(format!("{}/{}", base, path.trim().trim_start_matches('/')))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

// Default value functions
fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));
    base.join("vaxsched")
}

fn default_vaccine_webhook_path() -> String {
    "Webhook-Vaccine".into()
}

fn default_check_staff_path() -> String {
    "CheckStaffToken".into()
}

fn default_patient_search_path() -> String {
    "PatientsSearch".into()
}

fn default_assign_schedule_path() -> String {
    "AssignSchedule".into()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Config {
    /// Load configuration from the standard config path plus environment
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        let mut config = if config_path.exists() {
            Self::load_from(&config_path)?
        } else {
            tracing::info!(
                "No config file found at {:?}, using defaults",
                config_path
            );
            Self::default()
        };
        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
            .unwrap_or_else(|| PathBuf::from("."));
        base.join("vaxsched").join("config.toml")
    }

    /// Override backend settings from `VAXSCHED_*` variables
    ///
    /// `lookup` is `std::env::var` in production; tests pass a map.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let backend = &mut self.backend;
        let fields: [(&str, &mut String); 5] = [
            ("VAXSCHED_BASE_URL", &mut backend.base_url),
            ("VAXSCHED_WEBHOOK_VACCINE_PATH", &mut backend.vaccine_webhook_path),
            ("VAXSCHED_CHECK_STAFF_ENDPOINT", &mut backend.check_staff_path),
            ("VAXSCHED_PATIENT_SEARCH_ENDPOINT", &mut backend.patient_search_path),
            ("VAXSCHED_ASSIGN_SCHEDULE_ENDPOINT", &mut backend.assign_schedule_path),
        ];

        for (key, field) in fields {
            if let Some(value) = lookup(key).filter(|v| !v.trim().is_empty()) {
                tracing::debug!("{} overrides config", key);
                *field = value;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.backend.base_url.is_empty());
        assert_eq!(config.backend.vaccine_webhook_path, "Webhook-Vaccine");
        assert_eq!(config.backend.check_staff_path, "CheckStaffToken");
        assert_eq!(config.backend.timeout_secs, 30);
    }

    #[test]
    fn test_partial_config() {
        let toml_str = r#"
[backend]
base_url = "https://flow.example.com/webhook/"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.backend.base_url, "https://flow.example.com/webhook/");
        assert_eq!(config.backend.patient_search_path, "PatientsSearch"); // default
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[backend]\nbase_url = \"https://flow.example.com\"\ntimeout_secs = 5\n").unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.backend.base_url, "https://flow.example.com");
        assert_eq!(loaded.backend.timeout_secs, 5);
        assert!(matches!(
            Config::load_from(&temp_dir.path().join("missing.toml")),
            Err(Error::Io(_))
        ));
    }

    #[test]
    fn test_endpoint_url_joins_slashes() {
        let mut backend = BackendConfig::default();
        backend.base_url = "https://flow.example.com/webhook/".into();

        assert_eq!(
            backend.endpoint_url("/AssignSchedule").unwrap(),
            "https://flow.example.com/webhook/AssignSchedule"
        );
        assert_eq!(
            backend.endpoint_url("Webhook-Vaccine").unwrap(),
            "https://flow.example.com/webhook/Webhook-Vaccine"
        );
    }

    #[test]
    fn test_endpoint_url_requires_base() {
        let backend = BackendConfig::default();
        assert!(matches!(backend.endpoint_url("x"), Err(Error::Config(_))));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("VAXSCHED_BASE_URL", "https://n8n.local"),
            ("VAXSCHED_PATIENT_SEARCH_ENDPOINT", "/FindPatients"),
            ("VAXSCHED_ASSIGN_SCHEDULE_ENDPOINT", "  "),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_env_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.backend.base_url, "https://n8n.local");
        assert_eq!(config.backend.patient_search_path, "/FindPatients");
        assert_eq!(config.backend.assign_schedule_path, "AssignSchedule");
        assert_eq!(
            config.backend.endpoint_url(&config.backend.patient_search_path).unwrap(),
            "https://n8n.local/FindPatients"
        );
    }
}
