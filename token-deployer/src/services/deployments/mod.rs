//! Deployment framework: the environment scripts publish through, the runner
//! that executes scripts once per id, and the Starknet-backed environment.

pub mod artifacts;
pub mod runner;
pub mod starknet_deployments;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::interfaces::deployment::{DeployOptions, DeployedContractRecord, NamedAccounts};
use crate::interfaces::error::DeployError;

/// What a deploy script sees of the network it runs against.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait DeploymentEnvironment: Send + Sync {
    async fn get_named_accounts(&self) -> Result<NamedAccounts, DeployError>;

    /// Publishes `contract_name` and returns its record. An existing record for
    /// an unchanged artifact is returned as-is.
    async fn deploy(
        &self,
        contract_name: &str,
        options: DeployOptions,
    ) -> Result<DeployedContractRecord, DeployError>;
}
