//! Lexical relevance scoring against a free-text topic.
//!
//! Three weighted components, each a fraction of matched topic words:
//!
//! ```text
//! score = min(0.4 * title + 0.3 * abstract + 0.3 * keyword, 1.0)
//! title    = |topic words found in title|    / |topic words|
//! abstract = |topic words found in abstract| / |topic words|
//! keyword  = |keywords containing any topic word| / max(|keywords|, 1)
//! ```
//!
//! Topic words are the lower-cased whitespace-split tokens of the topic
//! with duplicates collapsed. An empty topic scores every record 0.

use std::collections::HashSet;

use crate::sources::Paper;

const TITLE_WEIGHT: f64 = 0.4;
const ABSTRACT_WEIGHT: f64 = 0.3;
const KEYWORD_WEIGHT: f64 = 0.3;

/// Populate `relevance_score` on every record. Order is untouched;
/// ranking is the caller's responsibility.
pub fn score(mut papers: Vec<Paper>, topic: &str) -> Vec<Paper> {
    let topic_words: HashSet<String> = topic
        .split_whitespace()
        .map(|w| w.to_lowercase())
        .collect();
    for paper in &mut papers {
        paper.relevance_score = Some(relevance(paper, &topic_words));
    }
    papers
}

fn relevance(paper: &Paper, topic_words: &HashSet<String>) -> f64 {
    if topic_words.is_empty() {
        return 0.0;
    }
    let word_count = topic_words.len() as f64;

    let title = paper.title.to_lowercase();
    let title_matches = topic_words
        .iter()
        .filter(|w| title.contains(w.as_str()))
        .count() as f64;

    let abstract_lower = paper.abstract_text.to_lowercase();
    let abstract_matches = topic_words
        .iter()
        .filter(|w| abstract_lower.contains(w.as_str()))
        .count() as f64;

    let keyword_matches = paper
        .keywords
        .iter()
        .filter(|k| {
            let k = k.to_lowercase();
            topic_words.iter().any(|w| k.contains(w.as_str()))
        })
        .count() as f64;
    // max(len, 1) so records without keywords divide by one, not zero.
    let keyword_total = paper.keywords.len().max(1) as f64;

    let score = TITLE_WEIGHT * (title_matches / word_count)
        + ABSTRACT_WEIGHT * (abstract_matches / word_count)
        + KEYWORD_WEIGHT * (keyword_matches / keyword_total);
    score.min(1.0)
}
