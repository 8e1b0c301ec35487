use std::collections::BTreeMap;
use std::fs;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::interfaces::deployment::{format_address, DeployedContractRecord};
use crate::interfaces::error::DeployError;

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct DeploymentState {
    /// Script id mapped to the time it completed.
    #[serde(default)]
    pub executed_scripts: BTreeMap<String, DateTime<Utc>>,
    #[serde(default)]
    pub contracts: BTreeMap<String, DeployedContractRecord>,
}

/// Deployment state of one network, optionally backed by a JSON file.
#[derive(Debug, Default)]
pub struct DeploymentStore {
    path: Option<PathBuf>,
    state: DeploymentState,
}

impl DeploymentStore {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, DeployError> {
        let path = path.into();
        let state = if path.exists() {
            let file = fs::File::open(&path)?;
            let reader = BufReader::new(file);
            serde_json::from_reader(reader)?
        } else {
            debug!("No deployment state at {:?}, starting empty", path);
            DeploymentState::default()
        };

        Ok(Self {
            path: Some(path),
            state,
        })
    }

    pub fn in_memory() -> Self {
        Self::default()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn is_executed(&self, script_id: &str) -> bool {
        self.state.executed_scripts.contains_key(script_id)
    }

    pub fn mark_executed(&mut self, script_id: &str) {
        self.state
            .executed_scripts
            .insert(script_id.to_owned(), Utc::now());
    }

    pub fn record(&self, contract_name: &str) -> Option<&DeployedContractRecord> {
        self.state.contracts.get(contract_name)
    }

    pub fn save_record(&mut self, record: DeployedContractRecord) {
        self.state
            .contracts
            .insert(record.contract_name.clone(), record);
    }

    pub fn records(&self) -> impl Iterator<Item = &DeployedContractRecord> {
        self.state.contracts.values()
    }

    pub fn persist(&self) -> Result<(), DeployError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = fs::File::create(path)?;
        serde_json::to_writer_pretty(file, &self.state)?;
        Ok(())
    }

    /// Writes a `{ contract name: address }` map for frontends.
    pub fn export(&self, path: impl AsRef<Path>) -> Result<(), DeployError> {
        let addresses: BTreeMap<&str, String> = self
            .records()
            .map(|record| (record.contract_name.as_str(), format_address(record.address)))
            .collect();
        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)?;
        }
        let file = fs::File::create(path)?;
        serde_json::to_writer_pretty(file, &addresses)?;
        Ok(())
    }
}
