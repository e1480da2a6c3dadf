//! Analyze command handler.
//!
//! Builds a selection from guided picks and free-text questions, then asks
//! the engine for one integrated report.

use super::{build_engine, print_json, report_synthesis_failure, warn_unlisted_country};
use clap::Args;
use pris_core::{config::AppConfig, AppError, AppResult};
use pris_engine::{ReportRequest, MAX_SELECTED};

const SOURCES_FOOTER: &str = "**Sources:**\n\
- Statistical data from PRIS Database\n\
- Policy documents from Country Nuclear Power Profiles (CNPP)\n\
- Analysis generated using retrieved context from the knowledge base";

/// Generate an analytical report for up to three questions
#[derive(Args, Debug)]
pub struct AnalyzeCommand {
    /// Country name as listed by `pris countries`
    #[arg(long)]
    pub country: String,

    /// Guided question id (TOPIC.QUESTION, see `pris topics`); repeatable
    #[arg(long = "pick", value_name = "ID")]
    pub picks: Vec<String>,

    /// Free-text question; repeatable
    #[arg(long = "question", value_name = "TEXT")]
    pub questions: Vec<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl AnalyzeCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing analyze command");
        tracing::debug!("Analyze options: {:?}", self);

        let engine = build_engine(config)?;
        warn_unlisted_country(engine.catalog(), &self.country);

        let mut wanted = Vec::with_capacity(self.picks.len() + self.questions.len());
        for id in &self.picks {
            wanted.push(engine.catalog().pick(&self.country, id)?.to_string());
        }
        wanted.extend(self.questions.iter().cloned());

        let mut session = engine.new_session(self.country.as_str());
        for question in &wanted {
            let outcome = session.selection.toggle(question);
            if outcome.warning_raised {
                eprintln!(
                    "Maximum {} questions can be selected at once; dropped: {}",
                    MAX_SELECTED,
                    outcome.evicted.join(" | ")
                );
            }
        }

        if session.selection.is_empty() {
            return Err(AppError::Config(format!(
                "Select up to {} guided questions with --pick or --question to run the analysis.",
                MAX_SELECTED
            )));
        }

        let request = ReportRequest {
            country: session.country.clone(),
            questions: session.selection.questions(),
        };

        let response = match engine.generate_report(&request).await {
            Ok(response) => response,
            Err(e) => {
                report_synthesis_failure(&e);
                return Err(e);
            }
        };

        if self.json {
            return print_json(&serde_json::json!({
                "country": request.country,
                "questions": request.questions,
                "statistics": engine.summarize(&request.country),
                "report": response.text,
            }));
        }

        println!("## Comprehensive Analytical Report");
        println!();
        println!("{}", response.text);
        println!();
        println!("---");
        println!("{}", SOURCES_FOOTER);
        Ok(())
    }
}
