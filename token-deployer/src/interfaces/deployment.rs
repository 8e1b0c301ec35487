use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use starknet::core::types::Felt;

/// Role name (e.g. `deployer`) mapped to the account address.
pub type NamedAccounts = HashMap<String, Felt>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeployOptions {
    pub from: Felt,
    pub log: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DeployedContractRecord {
    pub contract_name: String,
    pub address: Felt,
    pub class_hash: Felt,
    pub deployer: Felt,
    pub transaction_hash: Option<Felt>,
    pub deployed_at: DateTime<Utc>,
    /// False when an existing record was reused instead of publishing.
    #[serde(skip)]
    pub newly_deployed: bool,
}

/// Formats an address as `0x` followed by 64 hex digits.
pub fn format_address(address: Felt) -> String {
    format!("{:#066x}", address)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pad_address_to_full_width() {
        let formatted = format_address(Felt::from_hex("0x1234").unwrap());
        assert_eq!(formatted.len(), 66);
        assert!(formatted.starts_with("0x0000"));
        assert!(formatted.ends_with("1234"));
    }

    #[test]
    fn test_not_persist_newly_deployed_flag() {
        let record = DeployedContractRecord {
            contract_name: "ConfidentialETH".to_string(),
            address: Felt::from_hex("0xabc").unwrap(),
            class_hash: Felt::from_hex("0xdef").unwrap(),
            deployer: Felt::from_hex("0x1").unwrap(),
            transaction_hash: None,
            deployed_at: Utc::now(),
            newly_deployed: true,
        };

        let json = serde_json::to_string(&record).unwrap();
        let restored: DeployedContractRecord = serde_json::from_str(&json).unwrap();

        assert!(!restored.newly_deployed);
        assert_eq!(restored.address, record.address);
        assert_eq!(restored.contract_name, "ConfidentialETH");
    }
}
