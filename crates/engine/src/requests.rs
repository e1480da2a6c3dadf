//! Request and response types at the presentation boundary.

use serde::{Deserialize, Serialize};

/// Multi-question report for one country.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRequest {
    pub country: String,
    pub questions: Vec<String>,
}

/// Single free-form question for one country.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionRequest {
    pub country: String,
    pub question: String,
}

/// Raw model output, passed through unmodified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynthesisResponse {
    pub text: String,
}
