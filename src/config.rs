use std::sync::Arc;

use crate::sources::{self, PaperSource};

/// Pipeline configuration loaded from environment variables.
///
/// Every provider works without credentials; keys and polite-pool emails
/// only raise rate limits.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub semantic_scholar_api_key: Option<String>,
    pub pubmed_api_key: Option<String>,
    pub openalex_email: Option<String>,
    pub crossref_mailto: Option<String>,
    /// Source-name filter from `PAPER_SOURCES`; empty means all.
    pub enabled_source_names: Vec<String>,
}

impl Config {
    pub fn from_env() -> Self {
        let enabled_source_names = std::env::var("PAPER_SOURCES")
            .map(|s| s.split(',').map(|s| s.trim().to_lowercase()).collect())
            .unwrap_or_default();

        Self {
            semantic_scholar_api_key: std::env::var("SEMANTIC_SCHOLAR_API_KEY").ok(),
            pubmed_api_key: std::env::var("PUBMED_API_KEY").ok(),
            openalex_email: std::env::var("OPENALEX_EMAIL").ok(),
            crossref_mailto: std::env::var("CROSSREF_MAILTO").ok(),
            enabled_source_names,
        }
    }

    /// Build the capability table of enabled source adapters.
    ///
    /// Constructed once at startup and passed by reference into the
    /// retriever; there is no global registry.
    pub fn build_sources(&self) -> Vec<Arc<dyn PaperSource>> {
        let filter = &self.enabled_source_names;
        let filter_active = !filter.is_empty();
        let should_enable =
            |name: &str| -> bool { !filter_active || filter.contains(&name.to_lowercase()) };

        let mut table: Vec<Arc<dyn PaperSource>> = Vec::new();
        if should_enable("semantic_scholar") {
            table.push(Arc::new(
                sources::semantic_scholar::SemanticScholarClient::new(
                    self.semantic_scholar_api_key.clone(),
                ),
            ));
        }
        if should_enable("crossref") {
            table.push(Arc::new(sources::crossref::CrossRefClient::new(
                self.crossref_mailto.clone(),
            )));
        }
        if should_enable("openalex") {
            table.push(Arc::new(sources::openalex::OpenAlexClient::new(
                self.openalex_email.clone(),
            )));
        }
        if should_enable("pubmed") {
            table.push(Arc::new(sources::pubmed::PubMedClient::new(
                self.pubmed_api_key.clone(),
            )));
        }
        if should_enable("arxiv") {
            table.push(Arc::new(sources::arxiv::ArxivClient::new()));
        }

        if table.is_empty() {
            tracing::warn!("source filter matched no known sources");
        }
        table
    }

    /// Describe each known source and whether the filter enables it.
    pub fn source_status(&self) -> Vec<SourceStatus> {
        let mut statuses = vec![
            SourceStatus {
                name: "semantic_scholar".into(),
                enabled: true,
                note: if self.semantic_scholar_api_key.is_some() {
                    "API key set".into()
                } else {
                    "No API key (rate limited)".into()
                },
            },
            SourceStatus {
                name: "crossref".into(),
                enabled: true,
                note: if self.crossref_mailto.is_some() {
                    "Polite pool email set".into()
                } else {
                    "No email (limited rate)".into()
                },
            },
            SourceStatus {
                name: "openalex".into(),
                enabled: true,
                note: if self.openalex_email.is_some() {
                    "Polite pool email set".into()
                } else {
                    "No email (limited rate)".into()
                },
            },
            SourceStatus {
                name: "pubmed".into(),
                enabled: true,
                note: if self.pubmed_api_key.is_some() {
                    "API key set".into()
                } else {
                    "No API key (rate limited)".into()
                },
            },
            SourceStatus {
                name: "arxiv".into(),
                enabled: true,
                note: "No API key required".into(),
            },
        ];

        if !self.enabled_source_names.is_empty() {
            for s in &mut statuses {
                if !self.enabled_source_names.contains(&s.name) {
                    s.enabled = false;
                    s.note = "Disabled by PAPER_SOURCES filter".into();
                }
            }
        }

        statuses
    }
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct SourceStatus {
    pub name: String,
    pub enabled: bool,
    pub note: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_filter_enables_all_sources() {
        let config = Config::default();
        let table = config.build_sources();
        let names: Vec<&str> = table.iter().map(|s| s.name()).collect();
        assert_eq!(
            names,
            vec!["semantic_scholar", "crossref", "openalex", "pubmed", "arxiv"]
        );
    }

    #[test]
    fn filter_limits_table_and_status() {
        let config = Config {
            enabled_source_names: vec!["arxiv".into(), "pubmed".into()],
            ..Default::default()
        };
        let names: Vec<String> = config
            .build_sources()
            .iter()
            .map(|s| s.name().to_string())
            .collect();
        assert_eq!(names, vec!["pubmed", "arxiv"]);

        let disabled: Vec<String> = config
            .source_status()
            .into_iter()
            .filter(|s| !s.enabled)
            .map(|s| s.name)
            .collect();
        assert_eq!(disabled, vec!["semantic_scholar", "crossref", "openalex"]);
    }
}
