use starknet::core::types::Felt;
use starknet::providers::ProviderError;

/// Errors raised while resolving accounts or publishing contracts.
#[derive(Debug, thiserror::Error)]
pub enum DeployError {
    #[error("Named account not found: {0}")]
    MissingNamedAccount(String),
    #[error("No signer configured for account {0:#x}")]
    UnknownSigner(Felt),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Artifact error for {name}: {reason}")]
    Artifact { name: String, reason: String },
    #[error("Starknet-rs provider error: {0}")]
    Provider(#[from] ProviderError),
    #[error("Account error: {0}")]
    Account(String),
    #[error("Transaction {0:#x} reverted: {1}")]
    Reverted(Felt, String),
    #[error("Transaction {0:#x} not confirmed after {1} attempts")]
    ConfirmationTimeout(Felt, u32),
    #[error("Deployment state error: {0}")]
    State(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for DeployError {
    fn from(e: serde_json::Error) -> Self {
        DeployError::State(e.to_string())
    }
}
