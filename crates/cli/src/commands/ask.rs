//! Ask command handler.

use super::{build_engine, print_json, report_synthesis_failure, warn_unlisted_country};
use clap::Args;
use pris_core::{config::AppConfig, AppError, AppResult};
use pris_engine::QuestionRequest;

/// Ask a single question
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask
    pub question: Option<String>,

    /// Read the question from a file
    #[arg(short, long, conflicts_with = "question")]
    pub file: Option<std::path::PathBuf>,

    /// Country the question is about
    #[arg(long)]
    pub country: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ask command");
        tracing::debug!("Ask options: {:?}", self);

        let question = self.get_question()?;
        if question.trim().is_empty() {
            return Err(AppError::Config("No question provided".to_string()));
        }

        let engine = build_engine(config)?;
        warn_unlisted_country(engine.catalog(), &self.country);

        let request = QuestionRequest {
            country: self.country.clone(),
            question,
        };

        let response = match engine.answer(&request).await {
            Ok(response) => response,
            Err(e) => {
                report_synthesis_failure(&e);
                return Err(e);
            }
        };

        if self.json {
            return print_json(&serde_json::json!({
                "country": request.country,
                "question": request.question,
                "answer": response.text,
                "provider": config.provider,
                "model": config.model,
            }));
        }

        println!("{}", response.text);
        Ok(())
    }

    fn get_question(&self) -> AppResult<String> {
        if let Some(question) = &self.question {
            return Ok(question.clone());
        }
        match &self.file {
            Some(path) => Ok(std::fs::read_to_string(path)?.trim().to_string()),
            None => Err(AppError::Config("No question provided".to_string())),
        }
    }
}
