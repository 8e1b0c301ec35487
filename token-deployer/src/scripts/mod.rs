pub mod deploy_tokens;

use async_trait::async_trait;

use crate::interfaces::error::DeployError;
use crate::services::deployments::DeploymentEnvironment;

/// A unit of deployment work. The runner executes it at most once per `id`
/// and only when one of its `tags` is selected.
#[async_trait]
pub trait DeployScript: Send + Sync {
    fn id(&self) -> &str;

    fn tags(&self) -> &[&str];

    async fn run(&self, env: &dyn DeploymentEnvironment) -> Result<(), DeployError>;
}

/// Every script shipped with the deployer, in execution order.
pub fn all() -> Vec<Box<dyn DeployScript>> {
    vec![Box::new(deploy_tokens::DeployTokens)]
}
