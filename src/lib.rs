//! Federated academic paper retrieval, ranking, and citation network
//! construction.
//!
//! The pipeline fans a topic query out to all configured [`PaperSource`]
//! adapters concurrently, concatenates their partial results, collapses
//! duplicate records, scores each survivor for lexical relevance to the
//! topic, and truncates to the caller's cap. A keyword-overlap citation
//! network with summary statistics can then be derived over the final set.
//!
//! Any source may be slow, down, or malformed without affecting its
//! siblings: per-source failures are logged and contribute zero records.
//!
//! ```no_run
//! use paper_aggregator::{build_network, retrieve_and_rank, Config, Requirements};
//!
//! # async fn run() {
//! let sources = Config::from_env().build_sources();
//! let requirements = Requirements {
//!     max_papers: Some(25),
//!     ..Default::default()
//! };
//! let papers = retrieve_and_rank(&sources, "graph neural networks", &requirements).await;
//! let network = build_network(&papers);
//! # }
//! ```

pub mod config;
pub mod dedupe;
pub mod network;
pub mod retrieve;
pub mod score;
pub mod sources;

pub use config::Config;
pub use dedupe::dedupe;
pub use network::{build_network, CitationNetwork, NetworkEdge, NetworkNode, NetworkStats};
pub use retrieve::{retrieve, retrieve_and_rank, Requirements, DEFAULT_MAX_PAPERS};
pub use score::score;
pub use sources::{Paper, PaperSource, SourceError};
