use std::fs;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use starknet::core::types::contract::{CompiledClass, SierraClass};
use starknet::core::types::{Felt, FlattenedSierraClass};

use crate::interfaces::error::DeployError;

const SIERRA_SUFFIX: &str = ".contract_class.json";
const CASM_SUFFIX: &str = ".compiled_contract_class.json";

/// Compiled contract ready to be declared.
pub struct ContractArtifact {
    pub class: FlattenedSierraClass,
    pub class_hash: Felt,
    pub compiled_class_hash: Felt,
}

/// Finds Scarb build outputs for a contract name.
#[derive(Debug, Clone)]
pub struct ArtifactLocator {
    dir: PathBuf,
    prefix: String,
}

impl ArtifactLocator {
    pub fn new(dir: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            prefix: prefix.into(),
        }
    }

    pub fn sierra_path(&self, contract_name: &str) -> PathBuf {
        self.dir
            .join(format!("{}{}{}", self.prefix, contract_name, SIERRA_SUFFIX))
    }

    pub fn casm_path(&self, contract_name: &str) -> PathBuf {
        self.dir
            .join(format!("{}{}{}", self.prefix, contract_name, CASM_SUFFIX))
    }

    pub fn load(&self, contract_name: &str) -> Result<ContractArtifact, DeployError> {
        let artifact_error = |reason: String| DeployError::Artifact {
            name: contract_name.to_owned(),
            reason,
        };

        let sierra: SierraClass = read_json(&self.sierra_path(contract_name)).map_err(artifact_error)?;
        let casm: CompiledClass = read_json(&self.casm_path(contract_name)).map_err(artifact_error)?;

        let class = sierra
            .flatten()
            .map_err(|e| artifact_error(format!("cannot flatten sierra class: {}", e)))?;
        let compiled_class_hash = casm
            .class_hash()
            .map_err(|e| artifact_error(format!("cannot hash compiled class: {}", e)))?;
        let class_hash = class.class_hash();

        Ok(ContractArtifact {
            class,
            class_hash,
            compiled_class_hash,
        })
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, String> {
    let file = fs::File::open(path).map_err(|e| format!("{}: {}", path.display(), e))?;
    serde_json::from_reader(BufReader::new(file)).map_err(|e| format!("{}: {}", path.display(), e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compose_scarb_artifact_paths() {
        let locator = ArtifactLocator::new("target/dev", "confidential_tokens_");

        assert_eq!(
            locator.sierra_path("ConfidentialETH"),
            PathBuf::from("target/dev/confidential_tokens_ConfidentialETH.contract_class.json")
        );
        assert_eq!(
            locator.casm_path("ConfidentialETH"),
            PathBuf::from(
                "target/dev/confidential_tokens_ConfidentialETH.compiled_contract_class.json"
            )
        );
    }

    #[test]
    fn test_report_missing_artifact() {
        let locator = ArtifactLocator::new("/nonexistent/artifacts", "");

        match locator.load("ConfidentialDAI") {
            Err(DeployError::Artifact { name, reason }) => {
                assert_eq!(name, "ConfidentialDAI");
                assert!(reason.contains("ConfidentialDAI.contract_class.json"));
            }
            Err(e) => panic!("Unexpected error type returned: {}", e),
            Ok(_) => panic!("Expected an error but got a success result"),
        }
    }
}
