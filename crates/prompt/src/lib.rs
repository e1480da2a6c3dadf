//! Prompt composition for the PRIS engine.
//!
//! This crate provides:
//! - Built-in report and answer templates
//! - Optional YAML overrides loaded from `.pris/prompts/`
//! - Handlebars rendering into a [`BuiltPrompt`]

pub mod composer;
pub mod loader;
pub mod templates;
pub mod types;

// Re-export main types
pub use composer::PromptComposer;
pub use loader::load_override;
pub use types::{BuiltPrompt, BuiltPromptMetadata, PromptDefinition, PromptKind};
