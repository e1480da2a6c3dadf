//! Built-in prompt templates.

use crate::types::{PromptDefinition, PromptKind};

pub const REPORT_TEMPLATE: &str = "[SYSTEM ROLE]
You are an expert nuclear policy analyst providing comprehensive analysis of nuclear power programs.
Synthesize the provided information into a professional analytical report.

[ANALYSIS CONTEXT]
Selected Analysis Topics:
{{questions}}

Statistical Context:
{{data_summary}}

Reference Documents:
{{context}}

[VISUALIZATION CONTEXT]
The user is viewing a dashboard showing:
- Nuclear capacity trends
- Reactor type distribution
- Operational performance metrics

[OUTPUT INSTRUCTIONS]
Generate a comprehensive analytical report that:
1. Addresses each selected topic with evidence-based analysis
2. Integrates statistical insights from the data summary
3. References relevant policy documents and regulations
4. Provides strategic implications and future outlook
5. Uses clear headings and professional tone

Format the response in markdown with appropriate sections and bullet points.
";

pub const ANSWER_TEMPLATE: &str = "[SYSTEM ROLE]
You are a nuclear industry expert providing accurate, data-driven answers.

[CONTEXT]
User Question: {{question}}

Statistical Context:
{{data_summary}}

Reference Information:
{{context}}

[TASK]
Provide a clear, concise answer that:
1. Directly addresses the question
2. Cites specific data points and sources
3. Maintains professional tone
4. Indicates if information is limited or uncertain
";

/// Built-in definition for a prompt kind.
pub fn builtin(kind: PromptKind) -> PromptDefinition {
    let (title, template) = match kind {
        PromptKind::Report => ("Comprehensive Analytical Report", REPORT_TEMPLATE),
        PromptKind::Answer => ("Direct Answer", ANSWER_TEMPLATE),
    };

    PromptDefinition {
        id: kind.id().to_string(),
        title: title.to_string(),
        api_version: "1.0".to_string(),
        // The role text lives inside the template
        system: None,
        template: template.to_string(),
    }
}
