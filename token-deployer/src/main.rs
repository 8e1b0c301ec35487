use std::sync::Arc;

use anyhow::Result;
use clap::{App, Arg};
use tokio::sync::Mutex;
use tracing::info;

use token_deployer::helpers::app_config::AppConfig;
use token_deployer::helpers::logging::init_logging;
use token_deployer::scripts;
use token_deployer::services::deployments::runner::ScriptRunner;
use token_deployer::services::deployments::starknet_deployments::StarknetDeployments;
use token_deployer::services::state::DeploymentStore;

// Default allocator change
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

const DEFAULT_CONFIG_PATH: &str = "config/deployer.yaml";

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let matches = App::new("token-deployer")
        .about("Deploys the confidential token contracts")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .takes_value(true)
                .default_value(DEFAULT_CONFIG_PATH)
                .help("Path to the YAML configuration file"),
        )
        .arg(
            Arg::new("tags")
                .short('t')
                .long("tags")
                .takes_value(true)
                .help("Comma separated list of script tags to run"),
        )
        .arg(
            Arg::new("export")
                .long("export")
                .takes_value(true)
                .help("Writes deployed addresses as JSON to this path"),
        )
        .get_matches();

    let config_path = matches.value_of("config").unwrap_or(DEFAULT_CONFIG_PATH);
    let config = AppConfig::load_from_file(config_path)?;
    init_logging(&config.log_level);

    let tags: Vec<String> = matches
        .value_of("tags")
        .map(|tags| {
            tags.split(',')
                .map(str::trim)
                .filter(|tag| !tag.is_empty())
                .map(str::to_owned)
                .collect()
        })
        .unwrap_or_default();

    info!(
        "Deploying to {} ({}) with tags {:?}",
        config.network, config.rpc_provider, tags
    );

    let store = Arc::new(Mutex::new(DeploymentStore::open(config.state_path())?));
    let deployments = StarknetDeployments::new(&config, Arc::clone(&store))?;
    let runner = ScriptRunner::new(Arc::clone(&store));

    let summary = runner.run(&deployments, &scripts::all(), &tags).await?;
    info!(
        "Deployment finished: {} executed, {} skipped",
        summary.executed.len(),
        summary.skipped.len()
    );

    if let Some(export_path) = matches.value_of("export") {
        store.lock().await.export(export_path)?;
        info!("Addresses exported to {}", export_path);
    }

    Ok(())
}
