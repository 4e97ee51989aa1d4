use super::{Paper, PaperSource, SourceError};
use async_trait::async_trait;
use serde::Deserialize;

const BASE_URL: &str = "https://api.openalex.org";

pub struct OpenAlexClient {
    client: reqwest::Client,
}

impl OpenAlexClient {
    pub fn new(email: Option<String>) -> Self {
        let ua = match email {
            Some(ref e) => format!("paper-aggregator/0.1 (mailto:{})", e),
            None => "paper-aggregator/0.1".to_string(),
        };
        Self {
            client: reqwest::Client::builder().user_agent(ua).build().unwrap(),
        }
    }
}

#[derive(Deserialize)]
struct OAResponse {
    results: Vec<OAWork>,
}

#[derive(Deserialize)]
struct OAWork {
    id: Option<String>,
    title: Option<String>,
    authorships: Option<Vec<OAAuthorship>>,
    publication_year: Option<i32>,
    doi: Option<String>,
    primary_location: Option<OALocation>,
    cited_by_count: Option<u32>,
}

#[derive(Deserialize)]
struct OAAuthorship {
    author: OAAuthor,
}
#[derive(Deserialize)]
struct OAAuthor {
    display_name: Option<String>,
}
#[derive(Deserialize)]
struct OALocation {
    source: Option<OALocationSource>,
}
#[derive(Deserialize)]
struct OALocationSource {
    display_name: Option<String>,
}

fn work_to_paper(w: &OAWork) -> Paper {
    let doi = w.doi.as_ref().map(|d| d.replace("https://doi.org/", ""));
    Paper {
        id: format!("openalex:{}", w.id.as_deref().unwrap_or("")),
        title: w.title.clone().unwrap_or_default(),
        authors: w
            .authorships
            .as_ref()
            .map(|a| {
                a.iter()
                    .filter_map(|a| a.author.display_name.clone())
                    .collect()
            })
            .unwrap_or_default(),
        year: w.publication_year.unwrap_or(0),
        doi,
        // Abstracts are not part of the works search projection.
        abstract_text: String::new(),
        journal: w
            .primary_location
            .as_ref()
            .and_then(|l| l.source.as_ref())
            .and_then(|s| s.display_name.clone())
            .unwrap_or_default(),
        url: w.id.clone().unwrap_or_default(),
        citation_count: w.cited_by_count.unwrap_or(0),
        keywords: Vec::new(),
        source: "openalex".to_string(),
        relevance_score: None,
    }
}

#[async_trait]
impl PaperSource for OpenAlexClient {
    fn name(&self) -> &str {
        "openalex"
    }

    async fn search(&self, topic: &str, max_results: u32) -> Result<Vec<Paper>, SourceError> {
        let per_page = max_results.min(200).to_string();
        let resp: OAResponse = self
            .client
            .get(format!("{}/works", BASE_URL))
            .query(&[
                ("search", topic),
                ("per_page", per_page.as_str()),
                (
                    "select",
                    "id,title,authorships,publication_year,doi,primary_location,cited_by_count",
                ),
            ])
            .send()
            .await?
            .json()
            .await?;
        Ok(resp.results.iter().map(work_to_paper).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RESPONSE: &str = r#"{
        "results": [{
            "id": "https://openalex.org/W2741809807",
            "title": "The state of OA",
            "publication_year": 2018,
            "doi": "https://doi.org/10.7717/peerj.4375",
            "cited_by_count": 801,
            "primary_location": {
                "source": {"display_name": "PeerJ"}
            },
            "authorships": [
                {"author": {"display_name": "Heather Piwowar"}},
                {"author": {"display_name": null}}
            ]
        }]
    }"#;

    #[test]
    fn maps_works_and_strips_doi_prefix() {
        let resp: OAResponse = serde_json::from_str(SAMPLE_RESPONSE).unwrap();
        let p = work_to_paper(&resp.results[0]);
        assert_eq!(p.id, "openalex:https://openalex.org/W2741809807");
        assert_eq!(p.title, "The state of OA");
        assert_eq!(p.authors, vec!["Heather Piwowar"]);
        assert_eq!(p.year, 2018);
        assert_eq!(p.doi.as_deref(), Some("10.7717/peerj.4375"));
        assert_eq!(p.journal, "PeerJ");
        assert_eq!(p.citation_count, 801);
        assert_eq!(p.source, "openalex");
    }
}
