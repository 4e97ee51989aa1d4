use super::{Paper, PaperSource, SourceError};
use async_trait::async_trait;
use quick_xml::events::Event;
use quick_xml::Reader;
use serde::Deserialize;

const ESEARCH_URL: &str = "https://eutils.ncbi.nlm.nih.gov/entrez/eutils/esearch.fcgi";
const EFETCH_URL: &str = "https://eutils.ncbi.nlm.nih.gov/entrez/eutils/efetch.fcgi";

pub struct PubMedClient {
    client: reqwest::Client,
    api_key: Option<String>,
}

impl PubMedClient {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent("paper-aggregator/0.1")
                .build()
                .unwrap(),
            api_key,
        }
    }
}

#[derive(Deserialize)]
struct EsearchResponse {
    esearchresult: EsearchResult,
}
#[derive(Deserialize)]
struct EsearchResult {
    #[serde(default)]
    idlist: Vec<String>,
}

#[async_trait]
impl PaperSource for PubMedClient {
    fn name(&self) -> &str {
        "pubmed"
    }

    /// Two-step E-utilities flow: esearch for PMIDs, efetch for metadata.
    async fn search(&self, topic: &str, max_results: u32) -> Result<Vec<Paper>, SourceError> {
        let retmax = max_results.min(100).to_string();
        let mut query = vec![
            ("db", "pubmed"),
            ("term", topic),
            ("retmax", retmax.as_str()),
            ("retmode", "json"),
            ("sort", "relevance"),
        ];
        if let Some(ref key) = self.api_key {
            query.push(("api_key", key));
        }
        let resp: EsearchResponse = self
            .client
            .get(ESEARCH_URL)
            .query(&query)
            .send()
            .await?
            .json()
            .await?;

        let pmids = resp.esearchresult.idlist;
        if pmids.is_empty() {
            return Ok(Vec::new());
        }

        let ids = pmids.join(",");
        let mut fetch_query = vec![("db", "pubmed"), ("id", ids.as_str()), ("retmode", "xml")];
        if let Some(ref key) = self.api_key {
            fetch_query.push(("api_key", key));
        }
        let xml = self
            .client
            .get(EFETCH_URL)
            .query(&fetch_query)
            .send()
            .await?
            .text()
            .await?;
        parse_pubmed_xml(&xml)
    }
}

fn parse_pubmed_xml(xml: &str) -> Result<Vec<Paper>, SourceError> {
    let mut reader = Reader::from_str(xml);
    let mut papers = Vec::new();
    let mut in_article = false;
    let mut in_author = false;
    let mut in_journal = false;
    let mut in_pubdate = false;
    let mut current_tag = String::new();
    let mut pmid = String::new();
    let mut title = String::new();
    let mut abstract_text = String::new();
    let mut journal = String::new();
    let mut year = 0i32;
    let mut last_name = String::new();
    let mut fore_name = String::new();
    let mut authors: Vec<String> = Vec::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                let tag = String::from_utf8_lossy(e.name().as_ref()).to_string();
                match tag.as_str() {
                    "PubmedArticle" => {
                        in_article = true;
                        pmid.clear();
                        title.clear();
                        abstract_text.clear();
                        journal.clear();
                        year = 0;
                        authors.clear();
                    }
                    "Author" if in_article => {
                        in_author = true;
                        last_name.clear();
                        fore_name.clear();
                    }
                    "Journal" if in_article => in_journal = true,
                    "PubDate" if in_article => in_pubdate = true,
                    _ => {}
                }
                current_tag = tag;
            }
            Ok(Event::Text(e)) if in_article => {
                let text = e.unescape().unwrap_or_default().to_string();
                match current_tag.as_str() {
                    // The citation's own PMID precedes any referenced ones.
                    "PMID" if pmid.is_empty() => pmid = text,
                    "ArticleTitle" => title.push_str(&text),
                    "AbstractText" => {
                        if !abstract_text.is_empty() {
                            abstract_text.push(' ');
                        }
                        abstract_text.push_str(&text);
                    }
                    "Title" if in_journal => journal.push_str(&text),
                    "Year" if in_pubdate => year = text.trim().parse().unwrap_or(0),
                    "LastName" if in_author => last_name.push_str(&text),
                    "ForeName" if in_author => fore_name.push_str(&text),
                    _ => {}
                }
            }
            Ok(Event::End(e)) => {
                let tag = String::from_utf8_lossy(e.name().as_ref()).to_string();
                match tag.as_str() {
                    "PubmedArticle" if in_article => {
                        in_article = false;
                        if !pmid.is_empty() {
                            papers.push(Paper {
                                id: format!("pmid:{}", pmid),
                                title: title.trim().to_string(),
                                authors: authors.clone(),
                                year,
                                doi: None,
                                abstract_text: abstract_text.trim().to_string(),
                                journal: journal.trim().to_string(),
                                url: format!("https://pubmed.ncbi.nlm.nih.gov/{}/", pmid),
                                // Citation counts need a separate service.
                                citation_count: 0,
                                keywords: Vec::new(),
                                source: "pubmed".to_string(),
                                relevance_score: None,
                            });
                        }
                    }
                    "Author" if in_author => {
                        in_author = false;
                        let name = match (fore_name.trim(), last_name.trim()) {
                            ("", "") => String::new(),
                            ("", last) => last.to_string(),
                            (fore, last) => format!("{} {}", fore, last).trim().to_string(),
                        };
                        if !name.is_empty() {
                            authors.push(name);
                        }
                    }
                    "Journal" => in_journal = false,
                    "PubDate" => in_pubdate = false,
                    _ => {}
                }
                if tag == current_tag {
                    current_tag.clear();
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(SourceError::Parse(format!("XML parse error: {}", e))),
            _ => {}
        }
        buf.clear();
    }
    Ok(papers)
}
