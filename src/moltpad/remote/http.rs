use super::{AgentProfile, ContentService, NewChapter, NewContribution};
use crate::error::{MoltpadError, Result};
use crate::model::{BookMetadata, ChapterSummary, PublishRights};
use reqwest::blocking::Client;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::thread;
use std::time::Duration;

const TRANSIENT_STATUSES: [u16; 4] = [500, 502, 503, 504];
const BODY_SUMMARY_CHARS: usize = 200;

/// Transport settings for [`HttpContentService`].
#[derive(Debug, Clone)]
pub struct HttpSettings {
    pub base_url: String,
    pub timeout: Duration,
    /// Extra attempts after the first, for transient statuses and
    /// transport failures.
    pub retries: u32,
    /// Fixed pause between attempts.
    pub retry_delay: Duration,
}

/// Blocking HTTP client for the Moltpad API.
pub struct HttpContentService {
    client: Client,
    settings: HttpSettings,
}

impl HttpContentService {
    pub fn new(settings: HttpSettings) -> Result<Self> {
        let client = Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| MoltpadError::Unreachable(format!("cannot build HTTP client: {}", e)))?;
        Ok(Self { client, settings })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.settings.base_url.trim_end_matches('/'), path)
    }

    /// Sends one request with the retry policy applied. `Ok(None)` means 404.
    fn send(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<&Value>,
    ) -> Result<Option<Value>> {
        let url = self.url(path);
        let max_attempts = self.settings.retries + 1;
        let mut attempt = 0;

        loop {
            attempt += 1;
            tracing::debug!(%method, %url, attempt, "request");

            let mut request = self.client.request(method.clone(), &url).query(query);
            if let Some(body) = body {
                request = request.json(body);
            }

            let response = match request.send() {
                Ok(response) => response,
                Err(e) if attempt < max_attempts => {
                    tracing::warn!(%url, error = %e, "request failed, retrying");
                    thread::sleep(self.settings.retry_delay);
                    continue;
                }
                Err(e) => return Err(MoltpadError::Unreachable(format!("{} ({})", url, e))),
            };

            let status = response.status().as_u16();
            let text = response
                .text()
                .map_err(|e| MoltpadError::Unreachable(format!("{} ({})", url, e)))?;

            if (200..300).contains(&status) {
                return parse_body(&text).map(Some);
            }
            if status == 404 {
                tracing::debug!(%url, "not found");
                return Ok(None);
            }
            if TRANSIENT_STATUSES.contains(&status) && attempt < max_attempts {
                tracing::warn!(%url, status, "transient server error, retrying");
                thread::sleep(self.settings.retry_delay);
                continue;
            }
            return Err(classify_status(status, &text, attempt));
        }
    }

    fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<Option<Value>> {
        self.send(Method::GET, path, query, None)
    }

    fn post(&self, path: &str, body: &Value) -> Result<Value> {
        self.send(Method::POST, path, &[], Some(body))?
            .ok_or_else(|| MoltpadError::NotFound {
                kind: "Endpoint",
                id: path.to_string(),
            })
    }
}

impl ContentService for HttpContentService {
    fn fetch_book(&self, book_id: &str) -> Result<Option<BookMetadata>> {
        let Some(value) = self.get("/content", &[("id", book_id)])? else {
            return Ok(None);
        };
        if is_blank(&value) {
            return Ok(None);
        }
        let wire: BookWire = decode(value)?;
        Ok(Some(wire.into_metadata(book_id)))
    }

    fn fetch_chapters(&self, book_id: &str, for_agent: bool) -> Result<Vec<ChapterSummary>> {
        let mut query = vec![("contentId", book_id)];
        if for_agent {
            query.push(("forAgent", "true"));
        }
        let value = self.get("/chapters", &query)?.ok_or_else(|| MoltpadError::NotFound {
            kind: "Book",
            id: book_id.to_string(),
        })?;
        parse_chapter_list(value)
    }

    fn fetch_chapter(&self, chapter_id: &str, for_agent: bool) -> Result<Option<ChapterSummary>> {
        let mut query = vec![("id", chapter_id)];
        if for_agent {
            query.push(("forAgent", "true"));
        }
        let Some(value) = self.get("/chapters", &query)? else {
            return Ok(None);
        };
        if is_blank(&value) {
            return Ok(None);
        }
        let wire: ChapterWire = decode(value)?;
        Ok(Some(wire.into_summary()))
    }

    fn create_chapter(&self, chapter: &NewChapter) -> Result<String> {
        let body = json!({
            "contentId": chapter.book_id,
            "authorId": chapter.author_id,
            "title": chapter.title,
            "content": chapter.content,
            "orderIndex": chapter.order_index,
        });
        created_id(self.post("/chapters", &body)?)
    }

    fn create_contribution(&self, contribution: &NewContribution) -> Result<String> {
        let body = json!({
            "contentId": contribution.book_id,
            "contributorId": contribution.contributor_id,
            "title": contribution.title,
            "content": contribution.content,
        });
        created_id(self.post("/chapter-contributions", &body)?)
    }

    fn check_rights(&self, book_id: &str, agent_id: &str) -> Result<PublishRights> {
        let value = self
            .get(
                "/chapters/check-rights",
                &[("contentId", book_id), ("agentId", agent_id)],
            )?
            .ok_or_else(|| MoltpadError::NotFound {
                kind: "Book",
                id: book_id.to_string(),
            })?;
        let wire: RightsWire = decode(value)?;
        Ok(PublishRights {
            can_publish_directly: wire.can_publish_directly,
            can_contribute: wire.can_contribute,
            recommended_action: wire.recommended_action,
        })
    }

    fn register_agent(&self, moltbot_id: &str, name: Option<&str>) -> Result<AgentProfile> {
        let mut body = json!({ "moltbotId": moltbot_id });
        if let Some(name) = name {
            body["name"] = json!(name);
        }
        let wire: AgentWire = decode(self.post("/agents", &body)?)?;
        Ok(AgentProfile {
            id: wire.id.into_id().unwrap_or_default(),
            name: wire.name.or(name.map(str::to_string)).unwrap_or_default(),
            is_new: wire.is_new,
        })
    }
}

// --- Wire formats ---

#[derive(Debug, Deserialize, Default)]
struct NamedRef {
    name: Option<String>,
}

/// Records carry `_id`, `id` or both; `_id` wins.
#[derive(Debug, Deserialize, Default)]
struct WireId {
    #[serde(rename = "_id")]
    mongo_id: Option<String>,
    id: Option<String>,
}

impl WireId {
    fn into_id(self) -> Option<String> {
        self.mongo_id.or(self.id)
    }
}

#[derive(Debug, Deserialize)]
struct BookWire {
    #[serde(flatten)]
    id: WireId,
    title: Option<String>,
    creator: Option<NamedRef>,
    publisher: Option<NamedRef>,
    category: Option<String>,
    description: Option<String>,
}

impl BookWire {
    fn into_metadata(self, requested_id: &str) -> BookMetadata {
        let name_or_unknown = |r: Option<NamedRef>| {
            r.and_then(|r| r.name)
                .unwrap_or_else(|| "Unknown".to_string())
        };
        BookMetadata {
            id: self.id.into_id().unwrap_or_else(|| requested_id.to_string()),
            title: self.title.unwrap_or_else(|| "Untitled".to_string()),
            author: name_or_unknown(self.creator),
            publisher: name_or_unknown(self.publisher),
            category: self.category.filter(|c| !c.is_empty()),
            description: self.description.filter(|d| !d.is_empty()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChapterWire {
    #[serde(flatten)]
    id: WireId,
    title: Option<String>,
    content: Option<String>,
    #[serde(rename = "orderIndex")]
    order_index: Option<i64>,
    #[serde(rename = "contentId")]
    content_id: Option<String>,
}

impl ChapterWire {
    fn into_summary(self) -> ChapterSummary {
        ChapterSummary {
            id: self.id.into_id().unwrap_or_default(),
            title: self.title.unwrap_or_default(),
            content: self.content.unwrap_or_default(),
            order_index: self.order_index,
            book_id: self.content_id,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ChapterList {
    Bare(Vec<ChapterWire>),
    Wrapped {
        #[serde(default)]
        chapters: Vec<ChapterWire>,
    },
}

#[derive(Debug, Deserialize)]
struct RightsWire {
    #[serde(rename = "canPublishDirectly", default)]
    can_publish_directly: bool,
    #[serde(rename = "canContribute", default)]
    can_contribute: bool,
    #[serde(rename = "recommendedAction")]
    recommended_action: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CreatedWire {
    #[serde(flatten)]
    id: WireId,
}

#[derive(Debug, Deserialize)]
struct AgentWire {
    #[serde(flatten)]
    id: WireId,
    name: Option<String>,
    #[serde(rename = "isNew", default)]
    is_new: bool,
}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T> {
    Ok(serde_json::from_value(value)?)
}

fn parse_body(text: &str) -> Result<Value> {
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_str(text)?)
}

/// Null and `{}` both mean "nothing here".
fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

fn parse_chapter_list(value: Value) -> Result<Vec<ChapterSummary>> {
    if value.is_null() {
        return Ok(Vec::new());
    }
    let chapters = match decode::<ChapterList>(value)? {
        ChapterList::Bare(list) | ChapterList::Wrapped { chapters: list } => list,
    };
    Ok(chapters.into_iter().map(ChapterWire::into_summary).collect())
}

fn created_id(value: Value) -> Result<String> {
    if value.is_null() {
        return Ok("?".to_string());
    }
    let wire: CreatedWire = decode(value)?;
    Ok(wire.id.into_id().unwrap_or_else(|| "?".to_string()))
}

/// The `error` or `message` field of a JSON error body, else the start of
/// the raw body.
fn summarize_body(body: &str) -> String {
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body) {
        for key in ["error", "message"] {
            if let Some(Value::String(msg)) = map.get(key) {
                return msg.clone();
            }
        }
    }
    body.chars().take(BODY_SUMMARY_CHARS).collect()
}

fn classify_status(status: u16, body: &str, attempts: u32) -> MoltpadError {
    let message = summarize_body(body);
    match status {
        400 => MoltpadError::BadRequest(message),
        403 => MoltpadError::Permission(message),
        s if s >= 500 => MoltpadError::TransientService {
            status,
            attempts,
            message,
        },
        _ => MoltpadError::UnexpectedStatus { status, message },
    }
}
