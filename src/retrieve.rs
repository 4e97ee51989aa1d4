use std::sync::Arc;

use serde::Deserialize;

use crate::dedupe::dedupe;
use crate::score::score;
use crate::sources::{Paper, PaperSource};

pub const DEFAULT_MAX_PAPERS: usize = 50;

/// Caller requirements for one retrieval invocation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Requirements {
    /// Restrict the search to these source names (case-insensitive).
    /// `None` selects every registered source.
    pub sources: Option<Vec<String>>,
    /// Cap on the final ranked result, default 50.
    pub max_papers: Option<usize>,
}

impl Requirements {
    pub fn max_papers(&self) -> usize {
        self.max_papers.unwrap_or(DEFAULT_MAX_PAPERS)
    }
}

/// Fan out the topic query to all selected sources concurrently and
/// concatenate their partial results in selection order.
///
/// Each source runs as an independent task; a failing or panicking source
/// contributes zero records and is logged, never propagated. The barrier
/// waits for every task, so the slowest source determines total latency.
/// Zero selected sources or all sources failing yields an empty vec.
pub async fn retrieve(
    sources: &[Arc<dyn PaperSource>],
    topic: &str,
    requirements: &Requirements,
) -> Vec<Paper> {
    let selected: Vec<Arc<dyn PaperSource>> = sources
        .iter()
        .filter(|s| {
            requirements
                .sources
                .as_ref()
                .map(|f| f.iter().any(|name| name.eq_ignore_ascii_case(s.name())))
                .unwrap_or(true)
        })
        .cloned()
        .collect();

    if selected.is_empty() {
        return Vec::new();
    }

    // Integer division can under-request when the source count does not
    // divide the cap; downstream truncation makes that benign.
    let per_source = (requirements.max_papers() / selected.len()) as u32;

    let handles: Vec<_> = selected
        .into_iter()
        .map(|source| {
            let topic = topic.to_string();
            tokio::spawn(async move {
                let name = source.name().to_string();
                (name, source.search(&topic, per_source).await)
            })
        })
        .collect();

    let mut pool = Vec::new();
    for handle in handles {
        match handle.await {
            Ok((name, Ok(papers))) => {
                tracing::debug!(source = %name, count = papers.len(), "source returned records");
                pool.extend(papers);
            }
            Ok((name, Err(e))) => {
                tracing::warn!(source = %name, error = %e, "source search failed");
            }
            Err(e) => {
                tracing::warn!(error = %e, "source task panicked");
            }
        }
    }
    pool
}

/// The combined pipeline: retrieve, dedupe, score, rank, truncate.
///
/// Sorting is stable and descending on relevance, so records with equal
/// scores keep their pool order.
pub async fn retrieve_and_rank(
    sources: &[Arc<dyn PaperSource>],
    topic: &str,
    requirements: &Requirements,
) -> Vec<Paper> {
    let pool = retrieve(sources, topic, requirements).await;
    let unique = dedupe(pool);
    let mut ranked = score(unique, topic);
    ranked.sort_by(|a, b| {
        relevance(b)
            .partial_cmp(&relevance(a))
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    ranked.truncate(requirements.max_papers());
    tracing::info!(count = ranked.len(), topic = %topic, "retrieval pipeline finished");
    ranked
}

fn relevance(paper: &Paper) -> f64 {
    paper.relevance_score.unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::SourceError;
    use async_trait::async_trait;

    fn paper(id: &str, title: &str, author: &str) -> Paper {
        Paper {
            id: id.to_string(),
            title: title.to_string(),
            authors: vec![author.to_string()],
            year: 2024,
            doi: None,
            abstract_text: String::new(),
            journal: String::new(),
            url: String::new(),
            citation_count: 0,
            keywords: Vec::new(),
            source: "stub".to_string(),
            relevance_score: None,
        }
    }

    /// Returns one record per requested slot, so tests can observe the
    /// per-source budget from the output size.
    struct StubSource {
        name: String,
        titles: Vec<String>,
    }

    #[async_trait]
    impl PaperSource for StubSource {
        fn name(&self) -> &str {
            &self.name
        }

        async fn search(&self, _topic: &str, max_results: u32) -> Result<Vec<Paper>, SourceError> {
            Ok(self
                .titles
                .iter()
                .take(max_results as usize)
                .enumerate()
                .map(|(i, t)| paper(&format!("{}:{}", self.name, i), t, "Stub Author"))
                .collect())
        }
    }

    struct FailingSource;

    #[async_trait]
    impl PaperSource for FailingSource {
        fn name(&self) -> &str {
            "broken"
        }

        async fn search(&self, _topic: &str, _max_results: u32) -> Result<Vec<Paper>, SourceError> {
            Err(SourceError::Api("simulated outage".into()))
        }
    }

    struct PanickingSource;

    #[async_trait]
    impl PaperSource for PanickingSource {
        fn name(&self) -> &str {
            "panicky"
        }

        async fn search(&self, _topic: &str, _max_results: u32) -> Result<Vec<Paper>, SourceError> {
            panic!("adapter bug");
        }
    }

    fn stub(name: &str, titles: &[&str]) -> Arc<dyn PaperSource> {
        Arc::new(StubSource {
            name: name.to_string(),
            titles: titles.iter().map(|t| t.to_string()).collect(),
        })
    }

    #[tokio::test]
    async fn failing_source_does_not_affect_siblings() {
        let sources: Vec<Arc<dyn PaperSource>> = vec![
            stub("alpha", &["A1", "A2"]),
            Arc::new(FailingSource),
            stub("beta", &["B1"]),
        ];
        let req = Requirements {
            max_papers: Some(30),
            ..Default::default()
        };
        let pool = retrieve(&sources, "anything", &req).await;
        let titles: Vec<&str> = pool.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["A1", "A2", "B1"]);
    }

    #[tokio::test]
    async fn panicking_source_is_contained() {
        let sources: Vec<Arc<dyn PaperSource>> =
            vec![Arc::new(PanickingSource), stub("alpha", &["A1"])];
        let req = Requirements::default();
        let pool = retrieve(&sources, "anything", &req).await;
        assert_eq!(pool.len(), 1);
        assert_eq!(pool[0].title, "A1");
    }

    #[tokio::test]
    async fn zero_selected_sources_yields_empty() {
        let sources: Vec<Arc<dyn PaperSource>> = vec![stub("alpha", &["A1"])];
        let req = Requirements {
            sources: Some(vec!["nonexistent".to_string()]),
            ..Default::default()
        };
        assert!(retrieve(&sources, "anything", &req).await.is_empty());
        assert!(retrieve(&[], "anything", &Requirements::default())
            .await
            .is_empty());
    }

    #[tokio::test]
    async fn budget_is_split_by_integer_division() {
        let many: Vec<String> = (0..10).map(|i| format!("T{}", i)).collect();
        let many: Vec<&str> = many.iter().map(String::as_str).collect();
        let sources: Vec<Arc<dyn PaperSource>> = (0..5)
            .map(|i| stub(&format!("s{}", i), &many))
            .collect();
        let req = Requirements {
            max_papers: Some(10),
            ..Default::default()
        };
        // 10 / 5 sources = 2 requested from each.
        let pool = retrieve(&sources, "anything", &req).await;
        assert_eq!(pool.len(), 10);
        assert!(pool.iter().filter(|p| p.id.starts_with("s0:")).count() == 2);
    }

    #[tokio::test]
    async fn source_filter_is_case_insensitive() {
        let sources: Vec<Arc<dyn PaperSource>> =
            vec![stub("alpha", &["A1"]), stub("beta", &["B1"])];
        let req = Requirements {
            sources: Some(vec!["ALPHA".to_string()]),
            max_papers: Some(10),
        };
        let pool = retrieve(&sources, "anything", &req).await;
        assert_eq!(pool.len(), 1);
        assert_eq!(pool[0].title, "A1");
    }

    #[tokio::test]
    async fn retrieve_and_rank_dedupes_scores_and_ranks() {
        let sources: Vec<Arc<dyn PaperSource>> = vec![
            stub(
                "alpha",
                &["Graph Neural Networks Survey", "Unrelated Paper"],
            ),
            // Same title and author as alpha's first record: collapses.
            stub("beta", &["Graph Neural Networks Survey", "Another Topic"]),
        ];
        let req = Requirements {
            max_papers: Some(4),
            ..Default::default()
        };
        let ranked = retrieve_and_rank(&sources, "graph neural networks", &req).await;
        assert_eq!(ranked.len(), 3);
        // The full-title match ranks first with 0.4 from the title field.
        assert_eq!(ranked[0].title, "Graph Neural Networks Survey");
        assert_eq!(ranked[0].id, "alpha:0");
        assert!((ranked[0].relevance_score.unwrap() - 0.4).abs() < 1e-9);
        // Every survivor carries a populated score.
        assert!(ranked.iter().all(|p| p.relevance_score.is_some()));
        // Ties keep pool order: alpha's leftover precedes beta's.
        assert_eq!(ranked[1].id, "alpha:1");
        assert_eq!(ranked[2].id, "beta:1");
    }

    /// A source that ignores its budget and over-returns.
    struct GreedySource;

    #[async_trait]
    impl PaperSource for GreedySource {
        fn name(&self) -> &str {
            "greedy"
        }

        async fn search(&self, _topic: &str, _max_results: u32) -> Result<Vec<Paper>, SourceError> {
            Ok((0..8)
                .map(|i| paper(&format!("greedy:{}", i), &format!("Paper {}", i), "G Author"))
                .collect())
        }
    }

    #[tokio::test]
    async fn final_cap_truncates_overeager_sources() {
        let sources: Vec<Arc<dyn PaperSource>> = vec![Arc::new(GreedySource)];
        let req = Requirements {
            max_papers: Some(5),
            ..Default::default()
        };
        let ranked = retrieve_and_rank(&sources, "anything", &req).await;
        assert_eq!(ranked.len(), 5);
    }
}
