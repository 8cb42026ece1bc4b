use crate::dedupe::DuplicateHandling;
use config::{Config, ConfigError, Environment, File as ConfigFile};
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AppConfig {
    /// Rejected at load time unless `block` or `allow`.
    #[serde(default)]
    pub duplicate_handling: DuplicateHandling,
    #[serde(default = "default_user")]
    pub user: String,
    #[serde(default = "default_db_path")]
    pub db_path: String,
    /// Cadence at which the host is expected to feed detections. Not used by the core.
    #[serde(default = "default_scan_interval_ms")]
    pub scan_interval_ms: u64,
    #[serde(default = "default_recent_limit")]
    pub recent_limit: usize,
}

fn default_user() -> String {
    "default".to_string()
}

fn default_db_path() -> String {
    "scan_intake.db".to_string()
}

fn default_scan_interval_ms() -> u64 {
    500
}

fn default_recent_limit() -> usize {
    10
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            duplicate_handling: DuplicateHandling::default(),
            user: default_user(),
            db_path: default_db_path(),
            scan_interval_ms: default_scan_interval_ms(),
            recent_limit: default_recent_limit(),
        }
    }
}

/// Load `Config.toml` (optional) overlaid with `SCAN_INTAKE_*` environment variables.
pub fn load_configuration() -> Result<AppConfig, ConfigError> {
    let builder = Config::builder()
        .add_source(ConfigFile::with_name("Config").required(false))
        .add_source(Environment::with_prefix("SCAN_INTAKE"))
        .build()?;
    builder.try_deserialize::<AppConfig>()
}

/// Load from an explicit file, e.g. one passed on the command line.
pub fn load_configuration_from(path: &str) -> Result<AppConfig, ConfigError> {
    let builder = Config::builder()
        .add_source(ConfigFile::with_name(path).required(true))
        .add_source(Environment::with_prefix("SCAN_INTAKE"))
        .build()?;
    builder.try_deserialize::<AppConfig>()
}
