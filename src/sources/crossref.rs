use super::{Paper, PaperSource, SourceError};
use async_trait::async_trait;
use serde::Deserialize;

const BASE_URL: &str = "https://api.crossref.org/works";

pub struct CrossRefClient {
    client: reqwest::Client,
}

impl CrossRefClient {
    pub fn new(mailto: Option<String>) -> Self {
        let ua = match mailto {
            Some(ref m) => format!("paper-aggregator/0.1 (mailto:{})", m),
            None => "paper-aggregator/0.1".to_string(),
        };
        Self {
            client: reqwest::Client::builder().user_agent(ua).build().unwrap(),
        }
    }
}

#[derive(Deserialize)]
struct CRResponse {
    message: CRMessage,
}
#[derive(Deserialize)]
struct CRMessage {
    items: Option<Vec<CRItem>>,
}
#[derive(Deserialize)]
struct CRItem {
    #[serde(rename = "DOI")]
    doi: Option<String>,
    title: Option<Vec<String>>,
    author: Option<Vec<CRAuthor>>,
    #[serde(rename = "container-title")]
    container_title: Option<Vec<String>>,
    #[serde(rename = "is-referenced-by-count")]
    citation_count: Option<u32>,
    published: Option<CRDate>,
}
#[derive(Deserialize)]
struct CRAuthor {
    given: Option<String>,
    family: Option<String>,
}
#[derive(Deserialize)]
struct CRDate {
    #[serde(rename = "date-parts")]
    date_parts: Option<Vec<Vec<i32>>>,
}

fn item_to_paper(item: &CRItem) -> Paper {
    let doi = item.doi.clone();
    let title = item
        .title
        .as_ref()
        .and_then(|t| t.first())
        .cloned()
        .unwrap_or_default();
    let authors = item
        .author
        .as_ref()
        .map(|a| {
            a.iter()
                .map(|a| {
                    format!(
                        "{} {}",
                        a.given.as_deref().unwrap_or(""),
                        a.family.as_deref().unwrap_or("")
                    )
                    .trim()
                    .to_string()
                })
                .collect()
        })
        .unwrap_or_default();
    let year = item
        .published
        .as_ref()
        .and_then(|d| d.date_parts.as_ref())
        .and_then(|p| p.first())
        .and_then(|p| p.first())
        .copied()
        .unwrap_or(0);
    let journal = item
        .container_title
        .as_ref()
        .and_then(|t| t.first())
        .cloned()
        .unwrap_or_default();

    Paper {
        id: format!("doi:{}", doi.as_deref().unwrap_or("")),
        title,
        authors,
        year,
        url: format!("https://doi.org/{}", doi.as_deref().unwrap_or("")),
        doi,
        // CrossRef does not return abstracts on the works search.
        abstract_text: String::new(),
        journal,
        citation_count: item.citation_count.unwrap_or(0),
        keywords: Vec::new(),
        source: "crossref".to_string(),
        relevance_score: None,
    }
}

#[async_trait]
impl PaperSource for CrossRefClient {
    fn name(&self) -> &str {
        "crossref"
    }

    async fn search(&self, topic: &str, max_results: u32) -> Result<Vec<Paper>, SourceError> {
        let rows = max_results.min(100).to_string();
        let resp: CRResponse = self
            .client
            .get(BASE_URL)
            .query(&[
                ("query", topic),
                ("rows", rows.as_str()),
                (
                    "select",
                    "DOI,title,author,container-title,published,is-referenced-by-count",
                ),
            ])
            .send()
            .await?
            .json()
            .await?;
        Ok(resp
            .message
            .items
            .unwrap_or_default()
            .iter()
            .map(item_to_paper)
            .collect())
    }
}
