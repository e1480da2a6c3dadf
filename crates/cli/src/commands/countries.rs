//! Countries command handler.

use super::load_catalog;
use clap::Args;
use pris_core::{config::AppConfig, AppResult};

/// List countries with guided questions
#[derive(Args, Debug)]
pub struct CountriesCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl CountriesCommand {
    pub fn execute(&self, config: &AppConfig) -> AppResult<()> {
        let catalog = load_catalog(config)?;
        let countries: Vec<&str> = catalog.countries().collect();

        if self.json {
            return super::print_json(&serde_json::json!(countries));
        }

        for country in countries {
            println!("{}", country);
        }
        Ok(())
    }
}
