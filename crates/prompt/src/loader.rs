//! Loader for YAML prompt overrides.

use crate::types::{PromptDefinition, PromptKind};
use handlebars::Handlebars;
use pris_core::{AppError, AppResult};
use std::path::Path;

/// Load the override for `kind` from a prompts directory, if one exists.
///
/// The file is `<prompts_dir>/<kind id>.yml`, e.g.
/// `.pris/prompts/analysis.report.yml`. A missing file is not an error and
/// yields `Ok(None)`; a present but invalid file fails with
/// `AppError::Prompt`.
///
/// # Example
/// ```no_run
/// use pris_prompt::{load_override, PromptKind};
/// use std::path::Path;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// if let Some(def) = load_override(Path::new(".pris/prompts"), PromptKind::Report)? {
///     println!("Using report prompt: {}", def.title);
/// }
/// # Ok(())
/// # }
/// ```
pub fn load_override(prompts_dir: &Path, kind: PromptKind) -> AppResult<Option<PromptDefinition>> {
    let prompt_file = prompts_dir.join(format!("{}.yml", kind.id()));

    tracing::debug!("Looking for prompt override at: {:?}", prompt_file);

    if !prompt_file.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&prompt_file).map_err(|e| {
        AppError::Prompt(format!(
            "Failed to read prompt file {:?}: {}",
            prompt_file, e
        ))
    })?;

    let definition: PromptDefinition = serde_yaml::from_str(&contents).map_err(|e| {
        AppError::Prompt(format!(
            "Failed to parse prompt YAML {:?}: {}",
            prompt_file, e
        ))
    })?;

    validate_prompt(&definition, kind)?;

    tracing::info!("Loaded prompt override: {} ({})", definition.id, definition.title);

    Ok(Some(definition))
}

/// Validate a prompt definition against the kind it is meant to serve.
pub(crate) fn validate_prompt(def: &PromptDefinition, kind: PromptKind) -> AppResult<()> {
    if def.id != kind.id() {
        return Err(AppError::Prompt(format!(
            "Prompt ID '{}' does not match expected '{}'",
            def.id,
            kind.id()
        )));
    }

    if def.title.is_empty() {
        return Err(AppError::Prompt("Prompt title cannot be empty".to_string()));
    }

    if def.api_version.is_empty() {
        return Err(AppError::Prompt(
            "Prompt apiVersion cannot be empty".to_string(),
        ));
    }

    if def.template.trim().is_empty() {
        return Err(AppError::Prompt(
            "Prompt template cannot be empty".to_string(),
        ));
    }

    if def.system.as_deref().is_some_and(|s| s.trim().is_empty()) {
        return Err(AppError::Prompt(format!(
            "Prompt '{}' has an empty system message",
            def.id
        )));
    }

    // Simple check
    if !def.api_version.contains('.') {
        return Err(AppError::Prompt(format!(
            "Invalid apiVersion format: {}. Expected format: 'x.y'",
            def.api_version
        )));
    }

    Handlebars::new()
        .register_template_string(&def.id, &def.template)
        .map_err(|e| AppError::Prompt(format!("Invalid template in '{}': {}", def.id, e)))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_prompt(dir: &Path, file_stem: &str, id: &str, template: &str) {
        let content = format!(
            r#"
id: {}
title: "Custom Prompt"
apiVersion: "1.0"
template: "{}"
"#,
            id, template
        );
        fs::write(dir.join(format!("{}.yml", file_stem)), content).unwrap();
    }

    #[test]
    fn test_missing_override_is_none() {
        let temp_dir = TempDir::new().unwrap();
        let result = load_override(temp_dir.path(), PromptKind::Report).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_load_valid_override() {
        let temp_dir = TempDir::new().unwrap();
        write_prompt(
            temp_dir.path(),
            "analysis.answer",
            "analysis.answer",
            "Q: {{question}}",
        );

        let def = load_override(temp_dir.path(), PromptKind::Answer)
            .unwrap()
            .unwrap();
        assert_eq!(def.title, "Custom Prompt");
        assert_eq!(def.template, "Q: {{question}}");
    }

    #[test]
    fn test_mismatched_id_rejected() {
        let temp_dir = TempDir::new().unwrap();
        write_prompt(
            temp_dir.path(),
            "analysis.report",
            "analysis.answer",
            "{{questions}}",
        );

        let result = load_override(temp_dir.path(), PromptKind::Report);
        assert!(matches!(result, Err(AppError::Prompt(_))));
    }

    #[test]
    fn test_broken_template_rejected() {
        let temp_dir = TempDir::new().unwrap();
        write_prompt(
            temp_dir.path(),
            "analysis.report",
            "analysis.report",
            "{{#if questions}}unclosed",
        );

        let result = load_override(temp_dir.path(), PromptKind::Report);
        assert!(matches!(result, Err(AppError::Prompt(_))));
    }

    #[test]
    fn test_blank_system_rejected() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join("analysis.answer.yml"),
            "id: analysis.answer\ntitle: T\napiVersion: \"1.0\"\nsystem: \"  \"\ntemplate: \"{{question}}\"\n",
        )
        .unwrap();

        let result = load_override(temp_dir.path(), PromptKind::Answer);
        assert!(matches!(result, Err(AppError::Prompt(_))));
    }

    #[test]
    fn test_invalid_yaml_rejected() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join("analysis.answer.yml"),
            "invalid: yaml: content:",
        )
        .unwrap();

        assert!(load_override(temp_dir.path(), PromptKind::Answer).is_err());
    }
}
