use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use starknet::accounts::{Account, ExecutionEncoding, SingleOwnerAccount};
use starknet::contract::ContractFactory;
use starknet::core::types::{BlockId, BlockTag, ExecutionResult, Felt, StarknetError};
use starknet::providers::{
    jsonrpc::{HttpTransport, JsonRpcClient},
    Provider, ProviderError, Url,
};
use starknet::signers::{LocalWallet, SigningKey};
use tokio::sync::Mutex;
use tokio::time::{sleep, Duration};
use tracing::{debug, info};

use super::artifacts::{ArtifactLocator, ContractArtifact};
use super::DeploymentEnvironment;
use crate::helpers::app_config::AppConfig;
use crate::interfaces::deployment::{
    format_address, DeployOptions, DeployedContractRecord, NamedAccounts,
};
use crate::interfaces::error::DeployError;
use crate::services::state::DeploymentStore;

type RpcAccount = SingleOwnerAccount<JsonRpcClient<HttpTransport>, LocalWallet>;

#[derive(Debug, Clone, Copy)]
struct NamedSigner {
    address: Felt,
    private_key: Option<Felt>,
}

/// Publishes Scarb artifacts to a Starknet node through the Universal Deployer
/// and keeps one record per contract name in the shared store.
pub struct StarknetDeployments {
    rpc_url: Url,
    accounts: HashMap<String, NamedSigner>,
    artifacts: ArtifactLocator,
    poll_interval: Duration,
    confirmation_attempts: u32,
    store: Arc<Mutex<DeploymentStore>>,
}

impl StarknetDeployments {
    pub fn new(config: &AppConfig, store: Arc<Mutex<DeploymentStore>>) -> Result<Self, DeployError> {
        let rpc_url = Url::parse(&config.rpc_provider)
            .map_err(|e| DeployError::Config(format!("rpc_provider: {}", e)))?;

        let accounts = config
            .accounts
            .iter()
            .map(|(role, account)| {
                let address = parse_felt(&account.address, role)?;
                let private_key = account
                    .private_key
                    .as_deref()
                    .map(|key| parse_felt(key, role))
                    .transpose()?;
                Ok((
                    role.clone(),
                    NamedSigner {
                        address,
                        private_key,
                    },
                ))
            })
            .collect::<Result<HashMap<_, _>, DeployError>>()?;

        Ok(Self {
            rpc_url,
            accounts,
            artifacts: ArtifactLocator::new(&config.artifacts_dir, config.artifact_prefix.as_str()),
            poll_interval: Duration::from_millis(config.confirmation_poll_ms),
            confirmation_attempts: config.confirmation_attempts,
            store,
        })
    }

    fn provider(&self) -> JsonRpcClient<HttpTransport> {
        JsonRpcClient::new(HttpTransport::new(self.rpc_url.clone()))
    }

    async fn account(&self, from: Felt) -> Result<RpcAccount, DeployError> {
        let private_key = self
            .accounts
            .values()
            .find(|signer| signer.address == from)
            .and_then(|signer| signer.private_key)
            .ok_or(DeployError::UnknownSigner(from))?;

        let provider = self.provider();
        let chain_id = provider.chain_id().await?;
        let signer = LocalWallet::from(SigningKey::from_secret_scalar(private_key));

        let mut account =
            SingleOwnerAccount::new(provider, signer, from, chain_id, ExecutionEncoding::New);
        account.set_block_id(BlockId::Tag(BlockTag::Pending));
        Ok(account)
    }

    async fn is_declared(&self, class_hash: Felt) -> Result<bool, DeployError> {
        match self
            .provider()
            .get_class(BlockId::Tag(BlockTag::Pending), class_hash)
            .await
        {
            Ok(_) => Ok(true),
            Err(ProviderError::StarknetError(StarknetError::ClassHashNotFound)) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn wait_for_transaction(&self, transaction_hash: Felt) -> Result<(), DeployError> {
        let provider = self.provider();
        for _ in 0..self.confirmation_attempts {
            match provider.get_transaction_receipt(transaction_hash).await {
                Ok(receipt) => {
                    return match receipt.receipt.execution_result() {
                        ExecutionResult::Succeeded => Ok(()),
                        ExecutionResult::Reverted { reason } => {
                            Err(DeployError::Reverted(transaction_hash, reason.clone()))
                        }
                    };
                }
                Err(ProviderError::StarknetError(StarknetError::TransactionHashNotFound)) => {
                    debug!("Waiting for transaction {:#064x}", transaction_hash);
                    sleep(self.poll_interval).await;
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(DeployError::ConfirmationTimeout(
            transaction_hash,
            self.confirmation_attempts,
        ))
    }

    /// Declares the class when the node does not know it yet, then deploys an
    /// instance. Returns the contract address and the deploy transaction hash.
    async fn publish(
        &self,
        contract_name: &str,
        artifact: ContractArtifact,
        from: Felt,
    ) -> Result<(Felt, Felt), DeployError> {
        let account = self.account(from).await?;
        let class_hash = artifact.class_hash;

        if !self.is_declared(class_hash).await? {
            let declared = account
                .declare_v2(Arc::new(artifact.class), artifact.compiled_class_hash)
                .send()
                .await
                .map_err(|e| DeployError::Account(e.to_string()))?;
            info!(
                "declaring \"{}\" (tx: {:#064x}) class hash {:#064x}",
                contract_name, declared.transaction_hash, class_hash
            );
            self.wait_for_transaction(declared.transaction_hash).await?;
        }

        let factory = ContractFactory::new(class_hash, account);
        let salt = Felt::from(Utc::now().timestamp_millis() as u64);
        let deployment = factory.deploy_v1(Vec::new(), salt, true);
        let address = deployment.deployed_address();
        let result = deployment
            .send()
            .await
            .map_err(|e| DeployError::Account(e.to_string()))?;
        self.wait_for_transaction(result.transaction_hash).await?;

        Ok((address, result.transaction_hash))
    }

    /// Returns the stored record when its class hash matches the artifact,
    /// otherwise publishes the artifact and stores the new record.
    async fn deploy_artifact(
        &self,
        contract_name: &str,
        artifact: ContractArtifact,
        options: DeployOptions,
    ) -> Result<DeployedContractRecord, DeployError> {
        let reusable = {
            let store = self.store.lock().await;
            store
                .record(contract_name)
                .filter(|record| record.class_hash == artifact.class_hash)
                .cloned()
        };
        if let Some(mut record) = reusable {
            if options.log {
                info!(
                    "reusing \"{}\" at {}",
                    contract_name,
                    format_address(record.address)
                );
            }
            record.newly_deployed = false;
            return Ok(record);
        }

        let class_hash = artifact.class_hash;
        let (address, transaction_hash) =
            self.publish(contract_name, artifact, options.from).await?;
        if options.log {
            info!(
                "deploying \"{}\" (tx: {:#064x})...: deployed at {}",
                contract_name,
                transaction_hash,
                format_address(address)
            );
        }

        let record = DeployedContractRecord {
            contract_name: contract_name.to_owned(),
            address,
            class_hash,
            deployer: options.from,
            transaction_hash: Some(transaction_hash),
            deployed_at: Utc::now(),
            newly_deployed: true,
        };

        let mut store = self.store.lock().await;
        store.save_record(record.clone());
        store.persist()?;

        Ok(record)
    }
}

fn parse_felt(value: &str, role: &str) -> Result<Felt, DeployError> {
    Felt::from_hex(value)
        .map_err(|_| DeployError::Config(format!("account {}: invalid hex value", role)))
}

#[async_trait]
impl DeploymentEnvironment for StarknetDeployments {
    async fn get_named_accounts(&self) -> Result<NamedAccounts, DeployError> {
        Ok(self
            .accounts
            .iter()
            .map(|(role, signer)| (role.clone(), signer.address))
            .collect())
    }

    async fn deploy(
        &self,
        contract_name: &str,
        options: DeployOptions,
    ) -> Result<DeployedContractRecord, DeployError> {
        let artifact = self.artifacts.load(contract_name)?;
        self.deploy_artifact(contract_name, artifact, options).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use starknet::core::types::{EntryPointsByType, FlattenedSierraClass};

    fn config(yaml: &str) -> AppConfig {
        AppConfig::from_yaml_str(yaml).unwrap()
    }

    fn store() -> Arc<Mutex<DeploymentStore>> {
        Arc::new(Mutex::new(DeploymentStore::in_memory()))
    }

    #[tokio::test]
    async fn test_resolve_named_accounts_from_config() {
        let deployments = StarknetDeployments::new(
            &config(
                r#"
rpc_provider: http://localhost:5050/rpc
accounts:
  deployer:
    address: "0x64b48806902a367c8598f4f95c305e8c1a1acba5f082d294a43793113115691"
    private_key: "0x71d7bb07b9a64f6f78ac4c816aff4da9"
"#,
            ),
            store(),
        )
        .unwrap();

        let accounts = deployments.get_named_accounts().await.unwrap();

        assert_eq!(accounts.len(), 1);
        assert_eq!(
            accounts["deployer"],
            Felt::from_hex("0x64b48806902a367c8598f4f95c305e8c1a1acba5f082d294a43793113115691")
                .unwrap()
        );
    }

    #[test]
    fn test_reject_invalid_account_address() {
        let result = StarknetDeployments::new(
            &config(
                r#"
rpc_provider: http://localhost:5050/rpc
accounts:
  deployer:
    address: "not-hex"
"#,
            ),
            store(),
        );

        assert!(matches!(result, Err(DeployError::Config(_))));
    }

    #[test]
    fn test_reject_invalid_rpc_url() {
        let result = StarknetDeployments::new(&config("rpc_provider: not a url"), store());

        assert!(matches!(result, Err(DeployError::Config(_))));
    }

    #[tokio::test]
    async fn test_require_signer_for_sender() {
        let deployments = StarknetDeployments::new(
            &config(
                r#"
rpc_provider: http://localhost:5050/rpc
accounts:
  deployer:
    address: "0x1234"
"#,
            ),
            store(),
        )
        .unwrap();

        let from = Felt::from_hex("0x1234").unwrap();
        match deployments.account(from).await {
            Err(DeployError::UnknownSigner(address)) => assert_eq!(address, from),
            Err(e) => panic!("Unexpected error type returned: {}", e),
            Ok(_) => panic!("Expected an error but got a success result"),
        }
    }

    #[tokio::test]
    async fn test_fail_deploy_when_artifact_is_missing() {
        let deployments = StarknetDeployments::new(
            &config(
                r#"
rpc_provider: http://localhost:5050/rpc
artifacts_dir: /nonexistent/artifacts
"#,
            ),
            store(),
        )
        .unwrap();

        let options = DeployOptions {
            from: Felt::ONE,
            log: true,
        };
        let result = deployments.deploy("ConfidentialETH", options).await;

        assert!(matches!(result, Err(DeployError::Artifact { .. })));
    }

    // Nothing listens on port 1, so any network call fails fast.
    const UNREACHABLE_NODE: &str = r#"
rpc_provider: http://127.0.0.1:1/rpc
accounts:
  deployer:
    address: "0x1234"
    private_key: "0x71d7bb07b9a64f6f78ac4c816aff4da9"
"#;

    fn artifact(program: &[u64]) -> ContractArtifact {
        let class = FlattenedSierraClass {
            sierra_program: program.iter().map(|word| Felt::from(*word)).collect(),
            contract_class_version: "0.1.0".to_string(),
            entry_points_by_type: EntryPointsByType {
                constructor: Vec::new(),
                external: Vec::new(),
                l1_handler: Vec::new(),
            },
            abi: "[]".to_string(),
        };
        let class_hash = class.class_hash();
        ContractArtifact {
            class,
            class_hash,
            compiled_class_hash: Felt::from_hex("0xc0de").unwrap(),
        }
    }

    fn stored_record(class_hash: Felt) -> DeployedContractRecord {
        DeployedContractRecord {
            contract_name: "ConfidentialETH".to_string(),
            address: Felt::from_hex("0xe7").unwrap(),
            class_hash,
            deployer: Felt::from_hex("0x1234").unwrap(),
            transaction_hash: Some(Felt::from_hex("0x42").unwrap()),
            deployed_at: Utc::now(),
            newly_deployed: true,
        }
    }

    fn options() -> DeployOptions {
        DeployOptions {
            from: Felt::from_hex("0x1234").unwrap(),
            log: true,
        }
    }

    #[tokio::test]
    async fn test_reuses_record_for_unchanged_class() {
        let artifact = artifact(&[1, 2, 3]);
        let shared = store();
        shared
            .lock()
            .await
            .save_record(stored_record(artifact.class_hash));
        let deployments =
            StarknetDeployments::new(&config(UNREACHABLE_NODE), Arc::clone(&shared)).unwrap();

        let record = deployments
            .deploy_artifact("ConfidentialETH", artifact, options())
            .await
            .unwrap();

        assert!(!record.newly_deployed);
        assert_eq!(record.address, Felt::from_hex("0xe7").unwrap());
        assert_eq!(record.transaction_hash, Some(Felt::from_hex("0x42").unwrap()));
        assert_eq!(shared.lock().await.records().count(), 1);
    }

    #[tokio::test]
    async fn test_publishes_again_when_class_changed() {
        let previous = artifact(&[1, 2, 3]);
        let changed = artifact(&[1, 2, 3, 4]);
        assert_ne!(previous.class_hash, changed.class_hash);

        let shared = store();
        shared
            .lock()
            .await
            .save_record(stored_record(previous.class_hash));
        let deployments =
            StarknetDeployments::new(&config(UNREACHABLE_NODE), Arc::clone(&shared)).unwrap();

        let result = deployments
            .deploy_artifact("ConfidentialETH", changed, options())
            .await;

        assert!(matches!(result, Err(DeployError::Provider(_))));
        let store = shared.lock().await;
        let kept = store.record("ConfidentialETH").unwrap();
        assert_eq!(kept.class_hash, previous.class_hash);
    }
}
