use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::broker::{BrokerMode, LastOperationState, VolumeMount};

/// Default configuration file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "fake-broker.toml";

/// Main configuration structure for the fake broker
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct FakeBrokerConfig {
    /// Engine profile and canned response fields
    pub broker: BrokerSettings,
    /// Logging settings
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct BrokerSettings {
    /// Behavioral profile: synchronous, async-capable or async-only
    pub mode: BrokerMode,
    /// Maximum provisioned instances (unset means unlimited)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance_limit: Option<usize>,
    /// Reject re-binds with different details instead of overwriting
    pub reject_rebind: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dashboard_url: Option<String>,
    /// Operation token returned with async provision, update and deprovision results
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation_data: Option<String>,
    /// Answer provisions asynchronously (async-capable mode only)
    pub provision_async: bool,
    /// Answer updates asynchronously
    pub update_async: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub syslog_drain_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route_service_url: Option<String>,
    /// Binds return only this URL when set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup_agent_url: Option<String>,
    /// Service ID reported by instance fetches (defaults to the catalog service)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_id: Option<String>,
    /// Plan ID reported by instance fetches (defaults to the first catalog plan)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan_id: Option<String>,
    /// State reported by last-operation polls
    pub last_operation_state: LastOperationState,
    pub last_operation_description: String,
    /// Volume mounts returned with binds and binding fetches
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub volume_mounts: Vec<VolumeMount>,
}

impl Default for BrokerSettings {
    fn default() -> Self {
        Self {
            mode: BrokerMode::Synchronous,
            instance_limit: None,
            reject_rebind: false,
            dashboard_url: None,
            operation_data: None,
            provision_async: false,
            update_async: false,
            syslog_drain_url: None,
            route_service_url: None,
            backup_agent_url: None,
            service_id: None,
            plan_id: None,
            last_operation_state: LastOperationState::Succeeded,
            last_operation_description: String::new(),
            volume_mounts: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level used when RUST_LOG is not set
    pub log_level: String,
    /// Emit JSON log lines instead of plain text
    pub json_logs: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}

impl FakeBrokerConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. Default values
    /// 2. Configuration file (`path`, or fake-broker.toml when present)
    /// 3. Environment variables (prefixed with FAKE_BROKER, `__` between levels)
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let defaults =
            Config::try_from(&Self::default()).context("Failed to serialize default configuration")?;
        let mut builder = Config::builder().add_source(defaults);

        match path {
            Some(path) => {
                builder = builder.add_source(File::from(path).required(true));
            }
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                builder = builder.add_source(File::with_name(DEFAULT_CONFIG_FILE));
            }
            None => {}
        }

        builder = builder.add_source(
            Environment::with_prefix("FAKE_BROKER")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().context("Failed to read configuration sources")?;
        let loaded: FakeBrokerConfig = config
            .try_deserialize()
            .context("Configuration has invalid values")?;
        Ok(loaded)
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let toml_content = self.to_toml()?;
        std::fs::write(path.as_ref(), toml_content)
            .with_context(|| format!("Failed to write {}", path.as_ref().display()))?;
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to encode configuration as TOML")
    }

    /// Load .env file if it exists. Returns whether one was loaded.
    ///
    /// Runs before telemetry is installed, so callers log the outcome themselves.
    pub fn load_env_file() -> Result<bool> {
        if !Path::new(".env").exists() {
            return Ok(false);
        }
        dotenvy::dotenv().context("Failed to read .env file")?;
        Ok(true)
    }
}
