use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info};

use super::DeploymentEnvironment;
use crate::interfaces::error::DeployError;
use crate::scripts::DeployScript;
use crate::services::state::DeploymentStore;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub executed: Vec<String>,
    pub skipped: Vec<String>,
}

/// Runs deploy scripts in order, at most once per script id.
pub struct ScriptRunner {
    store: Arc<Mutex<DeploymentStore>>,
}

impl ScriptRunner {
    pub fn new(store: Arc<Mutex<DeploymentStore>>) -> Self {
        Self { store }
    }

    /// Executes every script selected by `tags` (all of them when empty).
    /// Stops at the first failing script, which is left unmarked.
    pub async fn run(
        &self,
        env: &dyn DeploymentEnvironment,
        scripts: &[Box<dyn DeployScript>],
        tags: &[String],
    ) -> Result<RunSummary, DeployError> {
        let mut summary = RunSummary::default();

        for script in scripts {
            let id = script.id();

            let selected = tags.is_empty()
                || script
                    .tags()
                    .iter()
                    .any(|t| tags.iter().any(|s| s.as_str() == *t));
            if !selected {
                debug!("Skipping {}: no matching tag in {:?}", id, tags);
                summary.skipped.push(id.to_owned());
                continue;
            }

            if self.store.lock().await.is_executed(id) {
                info!("Script {} already executed, skipping", id);
                summary.skipped.push(id.to_owned());
                continue;
            }

            info!("Running script {}", id);
            script.run(env).await?;

            let mut store = self.store.lock().await;
            store.mark_executed(id);
            store.persist()?;
            summary.executed.push(id.to_owned());
        }

        Ok(summary)
    }
}
