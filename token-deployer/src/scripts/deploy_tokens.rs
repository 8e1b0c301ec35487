use std::io::{self, Write};

use async_trait::async_trait;

use super::DeployScript;
use crate::interfaces::deployment::{format_address, DeployOptions, DeployedContractRecord};
use crate::interfaces::error::DeployError;
use crate::services::deployments::DeploymentEnvironment;

pub const SCRIPT_ID: &str = "deploy_tokens_only";
pub const TAGS: &[&str] = &["Tokens"];

const DEPLOYER: &str = "deployer";

/// Report symbol and contract name, in deployment order.
pub const TOKEN_CONTRACTS: [(&str, &str); 4] = [
    ("cETH", "ConfidentialETH"),
    ("cBTC", "ConfidentialBTC"),
    ("cUSDC", "ConfidentialUSDC"),
    ("cDAI", "ConfidentialDAI"),
];

#[derive(Debug, Clone)]
pub struct DeployedToken {
    pub symbol: &'static str,
    pub record: DeployedContractRecord,
}

/// Deploys the four confidential tokens from the `deployer` account, one after
/// another. The first failure aborts the remaining deployments.
pub async fn deploy_tokens<E>(env: &E) -> Result<Vec<DeployedToken>, DeployError>
where
    E: DeploymentEnvironment + ?Sized,
{
    let accounts = env.get_named_accounts().await?;
    let deployer = *accounts
        .get(DEPLOYER)
        .ok_or_else(|| DeployError::MissingNamedAccount(DEPLOYER.to_owned()))?;

    let mut deployed = Vec::with_capacity(TOKEN_CONTRACTS.len());
    for (symbol, contract_name) in TOKEN_CONTRACTS {
        let record = env
            .deploy(
                contract_name,
                DeployOptions {
                    from: deployer,
                    log: true,
                },
            )
            .await?;
        deployed.push(DeployedToken { symbol, record });
    }

    Ok(deployed)
}

/// Writes one `<symbol>: <address>` line per token.
pub fn write_report<W: Write>(out: &mut W, deployed: &[DeployedToken]) -> io::Result<()> {
    for token in deployed {
        writeln!(out, "{}: {}", token.symbol, format_address(token.record.address))?;
    }
    Ok(())
}

pub struct DeployTokens;

#[async_trait]
impl DeployScript for DeployTokens {
    fn id(&self) -> &str {
        SCRIPT_ID
    }

    fn tags(&self) -> &[&str] {
        TAGS
    }

    async fn run(&self, env: &dyn DeploymentEnvironment) -> Result<(), DeployError> {
        let deployed = deploy_tokens(env).await?;
        write_report(&mut io::stdout().lock(), &deployed)?;
        Ok(())
    }
}
