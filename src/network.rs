//! Co-citation-style network over a ranked paper set.
//!
//! Edges connect papers that share enough descriptive keywords, not papers
//! that formally cite each other. Keywords are supplied by a downstream
//! summarization step, so an unannotated set legitimately produces a
//! network with nodes and no edges.

use std::collections::HashSet;

use serde::Serialize;
use thiserror::Error;

use crate::sources::Paper;

/// Shortlist size for the most central papers.
const CENTRAL_PAPERS: usize = 5;
/// Minimum shared keywords for an edge.
const MIN_SHARED_KEYWORDS: usize = 2;

#[derive(Debug, Clone, Serialize)]
pub struct NetworkNode {
    pub id: String,
    pub title: String,
    pub authors: Vec<String>,
    pub year: i32,
    pub relevance_score: f64,
    pub citation_count: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct NetworkEdge {
    pub source_id: String,
    pub target_id: String,
    /// Size of the keyword-set intersection, always >= 2.
    pub weight: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct NetworkStats {
    pub total_papers: usize,
    pub total_connections: usize,
    pub average_connections_per_paper: f64,
    /// Node id with the highest degree; `None` when there are no edges.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub most_connected_paper: Option<String>,
    pub network_density: f64,
}

/// Derived, ephemeral view over one pipeline invocation's final paper set.
#[derive(Debug, Clone, Serialize)]
pub struct CitationNetwork {
    pub nodes: Vec<NetworkNode>,
    pub edges: Vec<NetworkEdge>,
    pub central_papers: Vec<Paper>,
    pub network_stats: NetworkStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("edge references unknown node id: {0}")]
    UnknownNode(String),
}

/// Build the citation network for a final record set.
///
/// Never fails outward: a stage error is logged and returned as a network
/// with the `error` field set and empty nodes/edges.
pub fn build_network(papers: &[Paper]) -> CitationNetwork {
    match try_build(papers) {
        Ok(network) => network,
        Err(e) => {
            tracing::error!(error = %e, "citation network construction failed");
            CitationNetwork {
                nodes: Vec::new(),
                edges: Vec::new(),
                central_papers: Vec::new(),
                network_stats: NetworkStats::default(),
                error: Some(e.to_string()),
            }
        }
    }
}

fn try_build(papers: &[Paper]) -> Result<CitationNetwork, NetworkError> {
    let nodes: Vec<NetworkNode> = papers.iter().map(node_for).collect();
    let edges = keyword_edges(papers);
    let central_papers = central_papers(papers);
    let network_stats = compute_stats(&nodes, &edges)?;
    Ok(CitationNetwork {
        nodes,
        edges,
        central_papers,
        network_stats,
        error: None,
    })
}

fn node_for(paper: &Paper) -> NetworkNode {
    NetworkNode {
        id: paper.id.clone(),
        title: paper.title.clone(),
        authors: paper.authors.clone(),
        year: paper.year,
        relevance_score: paper.relevance_score.unwrap_or(0.0),
        citation_count: paper.citation_count,
    }
}

/// One edge per unordered pair (i < j) sharing at least
/// [`MIN_SHARED_KEYWORDS`] keywords. Quadratic in the record count, which
/// stays small because the upstream pipeline caps the final set.
fn keyword_edges(papers: &[Paper]) -> Vec<NetworkEdge> {
    let keyword_sets: Vec<HashSet<&str>> = papers
        .iter()
        .map(|p| p.keywords.iter().map(String::as_str).collect())
        .collect();

    let mut edges = Vec::new();
    for i in 0..papers.len() {
        for j in (i + 1)..papers.len() {
            let weight = keyword_sets[i].intersection(&keyword_sets[j]).count();
            if weight >= MIN_SHARED_KEYWORDS {
                edges.push(NetworkEdge {
                    source_id: papers[i].id.clone(),
                    target_id: papers[j].id.clone(),
                    weight,
                });
            }
        }
    }
    edges
}

/// Top records by (relevance, citation count), both descending, relevance
/// primary. The sort is stable, so exact ties keep input order.
fn central_papers(papers: &[Paper]) -> Vec<Paper> {
    let mut ranked: Vec<&Paper> = papers.iter().collect();
    ranked.sort_by(|a, b| {
        let ra = a.relevance_score.unwrap_or(0.0);
        let rb = b.relevance_score.unwrap_or(0.0);
        rb.partial_cmp(&ra)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| b.citation_count.cmp(&a.citation_count))
    });
    ranked.into_iter().take(CENTRAL_PAPERS).cloned().collect()
}

fn compute_stats(nodes: &[NetworkNode], edges: &[NetworkEdge]) -> Result<NetworkStats, NetworkError> {
    let total_papers = nodes.len();
    let total_connections = edges.len();
    let average_connections_per_paper = if total_papers == 0 {
        0.0
    } else {
        total_connections as f64 / total_papers as f64
    };

    // Degree per node id, ids ordered by first appearance in the edge
    // list. Linear scan per id is fine at the capped set size.
    let mut degrees: Vec<(String, usize)> = Vec::new();
    for edge in edges {
        for id in [&edge.source_id, &edge.target_id] {
            match degrees.iter_mut().find(|(seen, _)| seen == id) {
                Some((_, count)) => *count += 1,
                None => degrees.push((id.clone(), 1)),
            }
        }
    }

    // Tie-break: the first id to reach the maximum degree wins.
    let mut best: Option<(&str, usize)> = None;
    for (id, count) in &degrees {
        if best.map_or(true, |(_, best_count)| *count > best_count) {
            best = Some((id.as_str(), *count));
        }
    }
    let most_connected_paper = match best {
        Some((id, _)) => {
            if !nodes.iter().any(|n| n.id == id) {
                return Err(NetworkError::UnknownNode(id.to_string()));
            }
            Some(id.to_string())
        }
        None => None,
    };

    let network_density = if total_papers < 2 {
        0.0
    } else {
        let possible = (total_papers * (total_papers - 1) / 2) as f64;
        total_connections as f64 / possible
    };

    Ok(NetworkStats {
        total_papers,
        total_connections,
        average_connections_per_paper,
        most_connected_paper,
        network_density,
    })
}
