pub mod cli;
pub mod core;
pub mod providers;
pub mod store;

use crate::core::config::AppConfig;
use crate::providers::EastmoneyClient;
use anyhow::Result;
use tracing::{debug, info};

/// Command line overrides of the `collect` section of the config.
#[derive(Debug, Clone, Default)]
pub struct CollectOptions {
    pub category: Option<String>,
    pub page_size: Option<usize>,
    pub period: Option<String>,
}

pub enum AppCommand {
    Collect(CollectOptions),
    Analysis { top_n: Option<usize> },
}

/// Loads the config at `config_path`, or the default one.
pub fn load_config(config_path: Option<&str>) -> Result<AppConfig> {
    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");
    Ok(config)
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("Fund ranking starting...");
    let mut config = load_config(config_path)?;
    let data_dir = config.default_data_path()?;

    match command {
        AppCommand::Collect(options) => {
            if let Some(category) = options.category {
                config.collect.category = category;
            }
            if let Some(page_size) = options.page_size {
                config.collect.page_size = page_size;
            }
            if let Some(period) = options.period {
                config.collect.period = period;
            }
            let client = EastmoneyClient::new(&config.providers.eastmoney.base_url)?;
            cli::collect::run(&config.collect, &client, &data_dir).await
        }
        AppCommand::Analysis { top_n } => {
            let top_n = top_n.or(config.report.top_n);
            cli::analysis::run(&data_dir, top_n).map(|_| ())
        }
    }
}
