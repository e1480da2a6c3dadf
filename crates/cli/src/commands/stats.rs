//! Stats command handler.
//!
//! Only reads the reactor dataset; no index or model is needed.

use clap::Args;
use pris_core::{config::AppConfig, AppResult};
use pris_stats::{Dataset, StatisticsSummarizer};
use std::sync::Arc;

/// Show reactor statistics for a country
#[derive(Args, Debug)]
pub struct StatsCommand {
    /// Country name as it appears in the dataset
    #[arg(long)]
    pub country: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl StatsCommand {
    pub fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing stats command");
        tracing::debug!("Stats options: {:?}", self);

        let dataset = Dataset::load(&config.dataset_path())?;
        let summary = StatisticsSummarizer::new(Arc::new(dataset)).summarize(&self.country);

        if self.json {
            let value = serde_json::to_value(&summary)?;
            return super::print_json(&value);
        }

        println!("{}", summary);
        Ok(())
    }
}
