//! Service configuration
//!
//! TOML file with the sysfs root, socket location, worker count and the
//! charge limits used until a client sets its own.

use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(PathBuf),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

/// Standard configuration location
pub const CONFIG_PATH: &str = "/vendor/etc/benzene_battery/config.toml";

/// Environment variable overriding [`CONFIG_PATH`]
pub const CONFIG_ENV: &str = "BENZENE_BATTERY_CONFIG";

/// Charge limits applied before any client calls `setChargeLimit`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChargeLimitConfig {
    #[serde(default = "default_stop")]
    pub stop: i32,
    #[serde(default = "default_start")]
    pub start: i32,
}

fn default_stop() -> i32 {
    80
}

fn default_start() -> i32 {
    70
}

impl Default for ChargeLimitConfig {
    fn default() -> Self {
        Self {
            stop: default_stop(),
            start: default_start(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Root of the sysfs tree
    #[serde(default = "default_sysfs_root")]
    pub sysfs_root: PathBuf,

    /// Unix socket the service listens on
    #[serde(default = "default_socket_path")]
    pub socket_path: PathBuf,

    /// Instance name announced in logs
    #[serde(default = "default_instance")]
    pub instance: String,

    /// Number of threads serving connections
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Log filter used when `RUST_LOG` is not set
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub charge_limit: ChargeLimitConfig,
}

fn default_sysfs_root() -> PathBuf {
    PathBuf::from("/sys")
}

fn default_socket_path() -> PathBuf {
    PathBuf::from("/dev/socket/vendor.benzeneos.battery")
}

fn default_instance() -> String {
    benzene_battery_aidl::DEFAULT_INSTANCE.to_string()
}

fn default_workers() -> usize {
    1
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            sysfs_root: default_sysfs_root(),
            socket_path: default_socket_path(),
            instance: default_instance(),
            workers: default_workers(),
            log_level: default_log_level(),
            charge_limit: ChargeLimitConfig::default(),
        }
    }
}

impl ServiceConfig {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Find the configuration file: the environment override, then the
    /// standard location if it exists
    pub fn locate() -> Option<PathBuf> {
        locate_in(std::env::var_os(CONFIG_ENV), Path::new(CONFIG_PATH))
    }

    /// Load the configuration [`locate`](Self::locate) finds, falling back to
    /// defaults
    pub fn load_default() -> Result<Self, ConfigError> {
        match Self::locate() {
            Some(path) => Self::load(&path),
            None => {
                tracing::warn!("No configuration file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(self)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, contents)?;
        tracing::info!("Configuration saved to {}", path.display());
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.workers == 0 {
            return Err(ConfigError::Invalid("workers must be at least 1".into()));
        }
        let ChargeLimitConfig { stop, start } = self.charge_limit;
        crate::service::check_charge_limit(stop, start)
            .map_err(|reason| ConfigError::Invalid(format!("charge_limit: {reason}")))
    }
}

fn locate_in(env_override: Option<OsString>, system_config: &Path) -> Option<PathBuf> {
    if let Some(path) = env_override {
        return Some(PathBuf::from(path));
    }
    system_config
        .exists()
        .then(|| system_config.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = ServiceConfig::default();
        assert_eq!(config.sysfs_root, PathBuf::from("/sys"));
        assert_eq!(config.workers, 1);
        assert_eq!(config.charge_limit, ChargeLimitConfig { stop: 80, start: 70 });
        assert_eq!(config.instance, "vendor.benzeneos.battery.IBattery/default");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: ServiceConfig = toml::from_str(
            r#"
            sysfs_root = "/tmp/fake-sys"

            [charge_limit]
            stop = 90
            "#,
        )
        .unwrap();
        assert_eq!(config.sysfs_root, PathBuf::from("/tmp/fake-sys"));
        assert_eq!(config.charge_limit, ChargeLimitConfig { stop: 90, start: 70 });
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("etc/config.toml");

        let config = ServiceConfig {
            workers: 4,
            log_level: "debug".into(),
            ..Default::default()
        };
        config.save(&path).unwrap();

        assert_eq!(ServiceConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");

        std::fs::write(&path, "workers = 0\n").unwrap();
        assert!(matches!(
            ServiceConfig::load(&path),
            Err(ConfigError::Invalid(_))
        ));

        std::fs::write(&path, "[charge_limit]\nstop = 80\nstart = 78\n").unwrap();
        assert!(matches!(
            ServiceConfig::load(&path),
            Err(ConfigError::Invalid(_))
        ));

        std::fs::write(&path, "workers = \"many\"\n").unwrap();
        assert!(matches!(
            ServiceConfig::load(&path),
            Err(ConfigError::TomlParse(_))
        ));
    }

    #[test]
    fn test_locate_order() {
        let dir = TempDir::new().unwrap();
        let system = dir.path().join("vendor/config.toml");

        assert_eq!(locate_in(None, &system), None);

        std::fs::create_dir_all(system.parent().unwrap()).unwrap();
        std::fs::write(&system, "workers = 2\n").unwrap();
        assert_eq!(locate_in(None, &system), Some(system.clone()));

        // The override wins even when it does not exist yet
        let custom = dir.path().join("custom.toml");
        assert_eq!(
            locate_in(Some(custom.clone().into_os_string()), &system),
            Some(custom)
        );
    }

    #[test]
    fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            ServiceConfig::load(&dir.path().join("absent.toml")),
            Err(ConfigError::NotFound(_))
        ));
    }
}
