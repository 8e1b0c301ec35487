use std::collections::HashMap;
use std::path::PathBuf;

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;

// Defaults used when the configuration file omits a value.
const LOG_LEVEL: &str = "info";
const NETWORK: &str = "devnet";
const DEPLOYMENTS_DIR: &str = "deployments";
const ARTIFACTS_DIR: &str = "target/dev";
const CONFIRMATION_POLL_MS: u64 = 2_000;
const CONFIRMATION_ATTEMPTS: u32 = 90;

const ENV_PREFIX: &str = "DEPLOYER";

pub fn default_log_level() -> String {
    LOG_LEVEL.to_owned()
}

pub fn default_network() -> String {
    NETWORK.to_owned()
}

pub fn default_deployments_dir() -> String {
    DEPLOYMENTS_DIR.to_owned()
}

pub fn default_artifacts_dir() -> String {
    ARTIFACTS_DIR.to_owned()
}

pub fn default_confirmation_poll_ms() -> u64 {
    CONFIRMATION_POLL_MS
}

pub fn default_confirmation_attempts() -> u32 {
    CONFIRMATION_ATTEMPTS
}

#[derive(Debug, Deserialize, Clone)]
pub struct AccountConfig {
    pub address: String,
    #[serde(default)]
    pub private_key: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    pub rpc_provider: String,
    #[serde(default = "default_network")]
    pub network: String,
    #[serde(default = "default_deployments_dir")]
    pub deployments_dir: String,
    #[serde(default = "default_artifacts_dir")]
    pub artifacts_dir: String,
    /// Scarb prefixes artifacts with the package name, e.g. `confidential_tokens_`.
    #[serde(default)]
    pub artifact_prefix: String,
    #[serde(default)]
    pub accounts: HashMap<String, AccountConfig>,
    #[serde(default = "default_confirmation_poll_ms")]
    pub confirmation_poll_ms: u64,
    #[serde(default = "default_confirmation_attempts")]
    pub confirmation_attempts: u32,
}

impl AppConfig {
    pub fn load_from_file(config_path: &str) -> Result<Self, ConfigError> {
        Self::from_builder(
            Config::builder().add_source(File::new(config_path, FileFormat::Yaml)),
        )
    }

    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        Self::from_builder(Config::builder().add_source(File::from_str(content, FileFormat::Yaml)))
    }

    /// Environment variables win over the file,
    /// e.g. `DEPLOYER__ACCOUNTS__DEPLOYER__PRIVATE_KEY`.
    fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        Self::from_sources(builder, Self::environment())
    }

    fn environment() -> Environment {
        Environment::with_prefix(ENV_PREFIX).separator("__")
    }

    fn from_sources(
        builder: ConfigBuilder<DefaultState>,
        environment: Environment,
    ) -> Result<Self, ConfigError> {
        let settings = builder.add_source(environment).build()?;
        let config: AppConfig = settings.try_deserialize()?;

        Ok(config)
    }

    /// Path of the JSON file holding the deployment state of the configured network.
    pub fn state_path(&self) -> PathBuf {
        PathBuf::from(&self.deployments_dir).join(format!("{}.json", self.network))
    }
}
