//! Command handlers for the PRIS CLI.

pub mod analyze;
pub mod ask;
pub mod chat;
pub mod countries;
pub mod stats;
pub mod topics;

pub use analyze::AnalyzeCommand;
pub use ask::AskCommand;
pub use chat::ChatCommand;
pub use countries::CountriesCommand;
pub use stats::StatsCommand;
pub use topics::TopicsCommand;

use pris_core::{config::AppConfig, AppError, AppResult};
use pris_engine::{Engine, QuestionCatalog};

/// Catalog override from config, or the built-in one.
pub(crate) fn load_catalog(config: &AppConfig) -> AppResult<QuestionCatalog> {
    match config.catalog_path() {
        Some(path) => QuestionCatalog::load(&path),
        None => Ok(QuestionCatalog::builtin()),
    }
}

/// Validate provider settings, then build the engine.
pub(crate) fn build_engine(config: &AppConfig) -> AppResult<Engine> {
    config.validate()?;
    Engine::from_config(config)
}

pub(crate) fn warn_unlisted_country(catalog: &QuestionCatalog, country: &str) {
    if !catalog.contains_country(country) {
        tracing::warn!("'{}' has no guided questions; answers may lack policy context", country);
    }
}

pub(crate) fn print_json(value: &serde_json::Value) -> AppResult<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| AppError::Serialization(e.to_string()))?;
    println!("{}", json);
    Ok(())
}

/// Failure notice shown instead of a partial answer.
pub(crate) fn report_synthesis_failure(error: &AppError) {
    if let AppError::SynthesisFailure(reason) = error {
        eprintln!("Analysis could not be generated: {}", reason);
        eprintln!("No report was produced. Check the model provider and try again.");
    }
}
