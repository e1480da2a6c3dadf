//! Prompt composer for rendering report and answer templates.

use crate::loader::{load_override, validate_prompt};
use crate::templates::builtin;
use crate::types::{BuiltPrompt, PromptDefinition, PromptKind};
use handlebars::Handlebars;
use pris_core::{AppError, AppResult};
use std::collections::HashMap;
use std::path::Path;

/// Renders the final model instruction from statistics, evidence and questions.
///
/// Templates are registered once at construction, so composition itself
/// cannot fail on a bad template.
pub struct PromptComposer {
    registry: Handlebars<'static>,
    systems: HashMap<PromptKind, String>,
}

impl PromptComposer {
    /// Composer with the built-in templates only.
    pub fn new() -> AppResult<Self> {
        Self::with_definitions(builtin(PromptKind::Report), builtin(PromptKind::Answer))
    }

    /// Composer using overrides from `prompts_dir` where present.
    pub fn from_dir(prompts_dir: &Path) -> AppResult<Self> {
        let report = load_override(prompts_dir, PromptKind::Report)?
            .unwrap_or_else(|| builtin(PromptKind::Report));
        let answer = load_override(prompts_dir, PromptKind::Answer)?
            .unwrap_or_else(|| builtin(PromptKind::Answer));

        Self::with_definitions(report, answer)
    }

    fn with_definitions(report: PromptDefinition, answer: PromptDefinition) -> AppResult<Self> {
        let mut registry = Handlebars::new();
        // Plain text, not HTML
        registry.register_escape_fn(handlebars::no_escape);
        let mut systems = HashMap::new();

        for (kind, def) in [(PromptKind::Report, report), (PromptKind::Answer, answer)] {
            validate_prompt(&def, kind)?;
            registry
                .register_template_string(kind.id(), &def.template)
                .map_err(|e| AppError::Prompt(format!("Failed to register template: {}", e)))?;
            tracing::debug!("Registered prompt template: {} ({})", def.id, def.title);
            if let Some(system) = def.system {
                systems.insert(kind, system);
            }
        }

        Ok(Self { registry, systems })
    }

    /// Compose the multi-topic report prompt. Questions are rendered one per line.
    pub fn compose_report(
        &self,
        data_summary: &str,
        evidence_block: &str,
        questions: &[String],
    ) -> BuiltPrompt {
        let mut vars = HashMap::new();
        vars.insert("questions".to_string(), questions.join("\n"));
        vars.insert("data_summary".to_string(), data_summary.to_string());
        vars.insert("context".to_string(), evidence_block.to_string());

        self.render(PromptKind::Report, vars)
    }

    /// Compose the single-question answer prompt.
    pub fn compose_answer(&self, data_summary: &str, evidence_block: &str, question: &str) -> BuiltPrompt {
        let mut vars = HashMap::new();
        vars.insert("question".to_string(), question.to_string());
        vars.insert("data_summary".to_string(), data_summary.to_string());
        vars.insert("context".to_string(), evidence_block.to_string());

        self.render(PromptKind::Answer, vars)
    }

    fn render(&self, kind: PromptKind, vars: HashMap<String, String>) -> BuiltPrompt {
        let user = match self.registry.render(kind.id(), &vars) {
            Ok(rendered) => rendered,
            Err(e) => {
                tracing::error!("Failed to render {} template, using plain layout: {}", kind, e);
                plain_layout(kind, &vars)
            }
        };

        tracing::debug!("Composed {} prompt ({} chars)", kind, user.len());

        let system = self.systems.get(&kind).cloned();
        BuiltPrompt::new(system, user, kind.id().to_string(), kind, vars)
    }
}

fn plain_layout(kind: PromptKind, vars: &HashMap<String, String>) -> String {
    kind.variables()
        .iter()
        .filter_map(|name| vars.get(*name))
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const SUMMARY: &str = "Nuclear Power Statistics for Canada:\n- Total Units: 25";

    fn questions() -> Vec<String> {
        vec![
            "What is the role of CANDU reactors?".to_string(),
            "How are SMRs being deployed?".to_string(),
        ]
    }

    #[test]
    fn test_report_prompt_contents() {
        let composer = PromptComposer::new().unwrap();
        let built = composer.compose_report(SUMMARY, "[CNPP] Canada Policy Document: text", &questions());

        assert!(built.user.contains("expert nuclear policy analyst"));
        assert!(built.user.contains(
            "What is the role of CANDU reactors?\nHow are SMRs being deployed?"
        ));
        assert!(built.user.contains(SUMMARY));
        assert!(built.user.contains("[CNPP] Canada Policy Document: text"));
        assert!(built.user.contains("Uses clear headings and professional tone"));
        assert!(built.user.contains("Provides strategic implications and future outlook"));
        assert!(built.user.contains("markdown"));
        assert_eq!(built.metadata.kind, PromptKind::Report);
        assert_eq!(built.system, None);
    }

    #[test]
    fn test_answer_prompt_contents() {
        let composer = PromptComposer::new().unwrap();
        let built = composer.compose_answer(SUMMARY, "Error: index offline", "How many units?");

        assert!(built.user.contains("nuclear industry expert"));
        assert!(built.user.contains("User Question: How many units?"));
        assert!(built.user.contains("Indicates if information is limited or uncertain"));
        assert!(built.user.contains("Error: index offline"));
        assert_eq!(built.metadata.source_prompt_id, "analysis.answer");
    }

    #[test]
    fn test_evidence_is_not_html_escaped() {
        let composer = PromptComposer::new().unwrap();
        let built = composer.compose_answer(SUMMARY, "[PRIS]: <b>Bruce</b> & Pickering", "Q?");
        assert!(built.user.contains("[PRIS]: <b>Bruce</b> & Pickering"));
    }

    #[test]
    fn test_from_dir_without_overrides_uses_builtins() {
        let temp_dir = TempDir::new().unwrap();
        let composer = PromptComposer::from_dir(temp_dir.path()).unwrap();
        let built = composer.compose_answer(SUMMARY, "", "Q?");
        assert!(built.user.contains("nuclear industry expert"));
    }

    #[test]
    fn test_from_dir_applies_override() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join("analysis.answer.yml"),
            r#"
id: analysis.answer
title: Terse
apiVersion: "1.0"
system: "Reply in one sentence."
template: "Answer briefly: {{question}} | {{context}}"
"#,
        )
        .unwrap();

        let composer = PromptComposer::from_dir(temp_dir.path()).unwrap();
        let built = composer.compose_answer(SUMMARY, "docs", "Why?");
        assert_eq!(built.user, "Answer briefly: Why? | docs");
        assert_eq!(built.system.as_deref(), Some("Reply in one sentence."));

        // Report still falls back to the built-in
        let report = composer.compose_report(SUMMARY, "docs", &questions());
        assert!(report.user.contains("expert nuclear policy analyst"));
        assert_eq!(report.system, None);
    }

    #[test]
    fn test_from_dir_rejects_bad_override() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("analysis.report.yml"), "id: [").unwrap();
        assert!(PromptComposer::from_dir(temp_dir.path()).is_err());
    }

    #[test]
    fn test_plain_layout_orders_variables() {
        let mut vars = HashMap::new();
        vars.insert("question".to_string(), "Q".to_string());
        vars.insert("data_summary".to_string(), "S".to_string());
        vars.insert("context".to_string(), "C".to_string());
        assert_eq!(plain_layout(PromptKind::Answer, &vars), "Q\n\nS\n\nC");
    }
}
