//! Retrieval type definitions.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Source label that gets the country-qualified policy-document rendering.
pub const CNPP_SOURCE: &str = "CNPP";

/// Number of passages requested per query.
pub const DEFAULT_TOP_K: usize = 5;

/// Metadata stored alongside each indexed passage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    /// Collection the passage came from (e.g. "CNPP", "WNA")
    pub source: String,

    /// Country the passage is about, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,

    /// Anything else the index builder recorded
    #[serde(default, flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl DocumentMetadata {
    pub fn new(source: impl Into<String>, country: Option<&str>) -> Self {
        Self {
            source: source.into(),
            country: country.map(str::to_string),
            extra: serde_json::Map::new(),
        }
    }
}

/// Exact-equality restriction on passage metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataFilter {
    pub country: String,
}

impl MetadataFilter {
    pub fn country(country: impl Into<String>) -> Self {
        Self {
            country: country.into(),
        }
    }

    pub fn matches(&self, metadata: &DocumentMetadata) -> bool {
        metadata.country.as_deref() == Some(self.country.as_str())
    }
}

/// One nearest-neighbour result from a vector index.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub content: String,
    pub metadata: DocumentMetadata,
    pub score: f32,
}

/// A single similarity query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetrievalQuery {
    pub query_text: String,
    pub country_filter: Option<String>,
    pub top_k: usize,
}

impl RetrievalQuery {
    /// An empty country means "no filter".
    pub fn new(query_text: impl Into<String>, country: &str) -> Self {
        let country = country.trim();
        Self {
            query_text: query_text.into(),
            country_filter: (!country.is_empty()).then(|| country.to_string()),
            top_k: DEFAULT_TOP_K,
        }
    }

    pub fn filter(&self) -> Option<MetadataFilter> {
        self.country_filter.as_deref().map(MetadataFilter::country)
    }
}

/// One unit of evidence handed to the prompt composer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EvidenceDocument {
    Passage {
        source_label: String,
        country: Option<String>,
        content: String,
    },
    RetrievalError {
        message: String,
    },
}

impl EvidenceDocument {
    pub fn from_hit(hit: &SearchHit) -> Self {
        EvidenceDocument::Passage {
            source_label: hit.metadata.source.clone(),
            country: hit.metadata.country.clone(),
            content: hit.content.clone(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        EvidenceDocument::RetrievalError {
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, EvidenceDocument::RetrievalError { .. })
    }

    /// The line as it appears in the prompt.
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for EvidenceDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvidenceDocument::Passage {
                source_label,
                country,
                content,
            } => match country {
                Some(country) if source_label == CNPP_SOURCE => {
                    write!(f, "[{}] {} Policy Document: {}", source_label, country, content)
                }
                _ => write!(f, "[{}]: {}", source_label, content),
            },
            EvidenceDocument::RetrievalError { message } => write!(f, "Error: {}", message),
        }
    }
}
