use super::{Paper, PaperSource, SourceError};
use async_trait::async_trait;
use serde::Deserialize;

const BASE_URL: &str = "https://api.semanticscholar.org/graph/v1";

const FIELDS: &str = "paperId,title,authors,abstract,year,venue,externalIds,citationCount,url";

pub struct SemanticScholarClient {
    client: reqwest::Client,
    api_key: Option<String>,
}

impl SemanticScholarClient {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent("paper-aggregator/0.1")
                .build()
                .unwrap(),
            api_key,
        }
    }

    fn add_auth(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => req.header("x-api-key", key),
            None => req,
        }
    }
}

#[derive(Deserialize)]
struct S2SearchResponse {
    data: Option<Vec<S2Paper>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct S2Paper {
    paper_id: Option<String>,
    title: Option<String>,
    authors: Option<Vec<S2Author>>,
    #[serde(rename = "abstract")]
    abstract_text: Option<String>,
    year: Option<i32>,
    venue: Option<String>,
    external_ids: Option<S2ExternalIds>,
    citation_count: Option<u32>,
    url: Option<String>,
}

#[derive(Deserialize)]
struct S2Author {
    name: Option<String>,
}

#[derive(Deserialize)]
struct S2ExternalIds {
    #[serde(rename = "DOI")]
    doi: Option<String>,
}

fn s2_to_paper(p: &S2Paper) -> Paper {
    Paper {
        id: format!("s2:{}", p.paper_id.as_deref().unwrap_or("")),
        title: p.title.clone().unwrap_or_default(),
        authors: p
            .authors
            .as_ref()
            .map(|a| a.iter().filter_map(|a| a.name.clone()).collect())
            .unwrap_or_default(),
        year: p.year.unwrap_or(0),
        doi: p.external_ids.as_ref().and_then(|e| e.doi.clone()),
        abstract_text: p.abstract_text.clone().unwrap_or_default(),
        journal: p.venue.clone().unwrap_or_default(),
        url: p.url.clone().unwrap_or_default(),
        citation_count: p.citation_count.unwrap_or(0),
        keywords: Vec::new(),
        source: "semantic_scholar".to_string(),
        relevance_score: None,
    }
}

#[async_trait]
impl PaperSource for SemanticScholarClient {
    fn name(&self) -> &str {
        "semantic_scholar"
    }

    async fn search(&self, topic: &str, max_results: u32) -> Result<Vec<Paper>, SourceError> {
        let url = format!("{}/paper/search", BASE_URL);
        let limit = max_results.min(100).to_string();
        let resp: S2SearchResponse = self
            .add_auth(self.client.get(&url).query(&[
                ("query", topic),
                ("limit", limit.as_str()),
                ("fields", FIELDS),
            ]))
            .send()
            .await?
            .json()
            .await?;
        Ok(resp.data.unwrap_or_default().iter().map(s2_to_paper).collect())
    }
}
