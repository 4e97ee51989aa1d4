use std::collections::HashSet;

use crate::sources::Paper;

/// Collapse records that describe the same work, keeping the first
/// occurrence and preserving input order.
///
/// Identity is the lower-cased, trimmed title joined with the lower-cased,
/// trimmed first author (empty when the record has no authors). The key is
/// intentionally coarse: near-duplicate titles (OCR noise, subtitle
/// variants) and author-name variants do NOT collide. Single pass over a
/// seen-key set, linear in the input.
pub fn dedupe(papers: Vec<Paper>) -> Vec<Paper> {
    let mut seen: HashSet<String> = HashSet::new();
    papers
        .into_iter()
        .filter(|p| seen.insert(identity_key(p)))
        .collect()
}

fn identity_key(paper: &Paper) -> String {
    let title = paper.title.trim().to_lowercase();
    let first_author = paper
        .authors
        .first()
        .map(|a| a.trim().to_lowercase())
        .unwrap_or_default();
    format!("{}_{}", title, first_author)
}
