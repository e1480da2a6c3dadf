//! Topics command handler.
//!
//! Prints guided topics with `TOPIC.QUESTION` ids usable by `analyze --pick`.

use super::load_catalog;
use clap::Args;
use pris_core::{config::AppConfig, AppError, AppResult};

/// List guided topics and questions for a country
#[derive(Args, Debug)]
pub struct TopicsCommand {
    /// Country name as listed by `pris countries`
    #[arg(long)]
    pub country: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl TopicsCommand {
    pub fn execute(&self, config: &AppConfig) -> AppResult<()> {
        let catalog = load_catalog(config)?;
        let topics = catalog.topics(&self.country).ok_or_else(|| {
            AppError::Config(format!(
                "No guided topics for '{}'. Available: {}",
                self.country,
                catalog.countries().collect::<Vec<_>>().join("; ")
            ))
        })?;

        if self.json {
            return super::print_json(&serde_json::json!({
                "country": self.country,
                "topics": topics,
            }));
        }

        println!("Guided questions for {}", self.country);
        for (t, (topic, questions)) in topics.iter().enumerate() {
            println!();
            println!("{}. {}", t + 1, topic);
            for (q, question) in questions.iter().enumerate() {
                println!("   {}.{}  {}", t + 1, q + 1, question);
            }
        }
        Ok(())
    }
}
