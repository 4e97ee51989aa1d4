pub mod arxiv;
pub mod crossref;
pub mod openalex;
pub mod pubmed;
pub mod semantic_scholar;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Normalized bibliographic record produced by every source adapter.
///
/// Fields a provider cannot supply are filled with defaults (empty string,
/// 0, empty vec, `None`) rather than omitted, so downstream stages never
/// see a partially-mapped record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paper {
    /// Provider-prefixed identifier (`arxiv:…`, `doi:…`, `pmid:…`, `s2:…`,
    /// `openalex:…`). Empty only when the provider returned no usable id.
    pub id: String,
    pub title: String,
    /// Author names in publication order; formatting is source-dependent.
    pub authors: Vec<String>,
    /// Publication year, 0 if unknown or unparsed.
    pub year: i32,
    pub doi: Option<String>,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    pub journal: String,
    pub url: String,
    pub citation_count: u32,
    /// Empty through retrieval; populated later by downstream
    /// summarization. Consumers treat it as a set.
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Provenance tag naming the adapter that produced this record.
    pub source: String,
    /// Unset until the relevance scorer has run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relevance_score: Option<f64>,
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("API error: {0}")]
    Api(String),
}

/// A single academic search provider.
///
/// `search` maps the provider's native response into [`Paper`] records.
/// Errors are returned, never panicked; the fan-out retriever contains
/// them at the join boundary so one failing provider cannot affect its
/// siblings.
#[async_trait]
pub trait PaperSource: Send + Sync {
    fn name(&self) -> &str;
    async fn search(&self, topic: &str, max_results: u32) -> Result<Vec<Paper>, SourceError>;
}
