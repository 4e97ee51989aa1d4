use super::{Paper, PaperSource, SourceError};
use async_trait::async_trait;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

const BASE_URL: &str = "https://export.arxiv.org/api/query";

pub struct ArxivClient {
    client: reqwest::Client,
}

impl ArxivClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent("paper-aggregator/0.1")
                .build()
                .unwrap(),
        }
    }
}

#[async_trait]
impl PaperSource for ArxivClient {
    fn name(&self) -> &str {
        "arxiv"
    }

    async fn search(&self, topic: &str, max_results: u32) -> Result<Vec<Paper>, SourceError> {
        let url = format!(
            "{}?search_query=all:{}&start=0&max_results={}&sortBy=relevance&sortOrder=descending",
            BASE_URL,
            urlencoded(topic),
            max_results.min(100)
        );
        let body = self.client.get(&url).send().await?.text().await?;
        // Respect rate limit: 1 req / 3s
        tokio::time::sleep(std::time::Duration::from_secs(3)).await;
        parse_atom_feed(&body)
    }
}

fn urlencoded(s: &str) -> String {
    s.replace(' ', "+").replace(':', "%3A").replace('/', "%2F")
}

/// Pull the abstract-page link out of a `<link>` element.
fn alternate_href(e: &BytesStart) -> Option<String> {
    let mut href = None;
    let mut rel = None;
    for attr in e.attributes().flatten() {
        let val = String::from_utf8_lossy(&attr.value).to_string();
        match attr.key.as_ref() {
            b"href" => href = Some(val),
            b"rel" => rel = Some(val),
            _ => {}
        }
    }
    if rel.as_deref() == Some("alternate") {
        href
    } else {
        None
    }
}

fn parse_atom_feed(xml: &str) -> Result<Vec<Paper>, SourceError> {
    let mut reader = Reader::from_str(xml);
    let mut papers = Vec::new();
    let mut in_entry = false;
    let mut in_author = false;
    let mut current_tag = String::new();
    let mut title = String::new();
    let mut summary = String::new();
    let mut entry_id = String::new();
    let mut published = String::new();
    let mut abs_url = String::new();
    let mut author_name = String::new();
    let mut authors: Vec<String> = Vec::new();
    let mut doi: Option<String> = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                let tag = String::from_utf8_lossy(e.name().as_ref()).to_string();
                if tag == "entry" {
                    in_entry = true;
                    title.clear();
                    summary.clear();
                    entry_id.clear();
                    published.clear();
                    abs_url.clear();
                    authors.clear();
                    doi = None;
                } else if in_entry {
                    if tag == "author" {
                        in_author = true;
                        author_name.clear();
                    } else if tag == "link" {
                        if let Some(href) = alternate_href(&e) {
                            abs_url = href;
                        }
                    }
                    current_tag = tag;
                }
            }
            Ok(Event::Empty(e)) if in_entry => {
                if e.name().as_ref() == b"link" {
                    if let Some(href) = alternate_href(&e) {
                        abs_url = href;
                    }
                }
            }
            Ok(Event::Text(e)) if in_entry => {
                let text = e.unescape().unwrap_or_default().to_string();
                match current_tag.as_str() {
                    "title" => title.push_str(&text),
                    "summary" => summary.push_str(&text),
                    "id" if entry_id.is_empty() => entry_id = text,
                    "published" => published.push_str(&text),
                    "name" if in_author => author_name.push_str(&text),
                    t if t.ends_with("doi") => doi = Some(text),
                    _ => {}
                }
            }
            Ok(Event::End(e)) => {
                let tag = String::from_utf8_lossy(e.name().as_ref()).to_string();
                if tag == "entry" && in_entry {
                    in_entry = false;
                    // The short arXiv id is the last path segment of the entry URL.
                    let short_id = entry_id.rsplit('/').next().unwrap_or(&entry_id);
                    if !short_id.is_empty() && !title.trim().is_empty() {
                        let year = published
                            .get(..4)
                            .and_then(|y| y.parse::<i32>().ok())
                            .unwrap_or(0);
                        papers.push(Paper {
                            id: format!("arxiv:{}", short_id),
                            title: title.trim().replace('\n', " "),
                            authors: authors.clone(),
                            year,
                            doi: doi.clone(),
                            abstract_text: summary.trim().replace('\n', " "),
                            journal: "arXiv".to_string(),
                            url: if abs_url.is_empty() {
                                entry_id.clone()
                            } else {
                                abs_url.clone()
                            },
                            citation_count: 0,
                            keywords: Vec::new(),
                            source: "arxiv".to_string(),
                            relevance_score: None,
                        });
                    }
                } else if tag == "author" && in_author {
                    in_author = false;
                    if !author_name.trim().is_empty() {
                        authors.push(author_name.trim().to_string());
                    }
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
