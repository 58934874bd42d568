//! Notion API adapter.
//!
//! The translator talks to Notion only through [`RecordStore`], and a store is
//! always obtained through a [`StoreConnector`] with the credential supplied
//! by the caller of the current request. Nothing is cached across requests.

use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::warn;

use crate::{Config, Error, Result};

/// Arguments for creating one check-in page.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateRecord {
    pub database_id: String,
    pub title_property: String,
    pub title: String,
    pub date_property: String,
    pub date: String,
}

/// Arguments for a half-open date range query, sorted ascending.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordQuery {
    pub database_id: String,
    pub date_property: String,
    /// Inclusive lower bound (ISO instant)
    pub on_or_after: String,
    /// Exclusive upper bound (ISO instant)
    pub before: String,
}

/// A page returned by a database query.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Record {
    #[serde(default)]
    pub properties: serde_json::Map<String, Value>,
}

impl Record {
    /// `start` value of the named date property, if the page has one.
    pub fn date_start(&self, property: &str) -> Option<&str> {
        self.properties
            .get(property)?
            .get("date")?
            .get("start")?
            .as_str()
    }
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    results: Vec<Record>,
    #[serde(default)]
    has_more: bool,
}

/// Notion's error object, e.g. `{"object":"error","code":"unauthorized","message":"..."}`.
#[derive(Debug, Deserialize)]
struct NotionErrorBody {
    code: Option<String>,
    message: Option<String>,
}

/// Operations the translator needs from the document database.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Create a page and return Notion's raw page object.
    async fn create_record(&self, args: CreateRecord) -> Result<Value>;

    /// Query pages whose date property falls in `[on_or_after, before)`.
    async fn query_records(&self, args: RecordQuery) -> Result<Vec<Record>>;
}

/// Builds a [`RecordStore`] scoped to a single caller credential.
pub trait StoreConnector: Send + Sync {
    type Store: RecordStore;

    fn connect(&self, credential: &str) -> Result<Self::Store>;
}

/// Connector producing [`NotionClient`]s.
#[derive(Debug, Clone)]
pub struct NotionConnector {
    api_base: String,
    notion_version: String,
    timeout: Option<Duration>,
}

impl NotionConnector {
    pub fn new(config: &Config) -> Self {
        Self {
            api_base: config.notion_api_base.clone(),
            notion_version: config.notion_version.clone(),
            timeout: config.request_timeout,
        }
    }
}

impl StoreConnector for NotionConnector {
    type Store = NotionClient;

    fn connect(&self, credential: &str) -> Result<NotionClient> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(NotionClient {
            http,
            api_base: self.api_base.clone(),
            notion_version: self.notion_version.clone(),
            api_key: credential.to_string(),
        })
    }
}

/// Notion REST client bound to one integration token.
pub struct NotionClient {
    http: reqwest::Client,
    api_base: String,
    notion_version: String,
    api_key: String,
}

impl std::fmt::Debug for NotionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotionClient")
            .field("api_base", &self.api_base)
            .field("notion_version", &self.notion_version)
            .finish_non_exhaustive()
    }
}

impl NotionClient {
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.api_base)
            .map_err(|e| Error::Config(format!("Invalid Notion API base URL: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| Error::Config("Notion API base URL cannot take a path".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn post(&self, url: Url, payload: &Value) -> Result<Value> {
        let response = self
            .http
            .post(url)
            .bearer_auth(&self.api_key)
            .header("Notion-Version", &self.notion_version)
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let err = match serde_json::from_str::<NotionErrorBody>(&text) {
                Ok(NotionErrorBody {
                    code: Some(code),
                    message: Some(message),
                }) => format!("{}: {}", code, message),
                Ok(NotionErrorBody {
                    message: Some(message),
                    ..
                }) => message,
                _ => format!("Notion returned status {}", status.as_u16()),
            };
            return Err(Error::Upstream(err));
        }

        serde_json::from_str(&text)
            .map_err(|e| Error::Upstream(format!("Malformed Notion response: {}", e)))
    }
}

#[async_trait]
impl RecordStore for NotionClient {
    async fn create_record(&self, args: CreateRecord) -> Result<Value> {
        let payload = json!({
            "parent": { "database_id": args.database_id },
            "properties": {
                args.date_property: {
                    "type": "date",
                    "date": { "start": args.date },
                },
                args.title_property: {
                    "title": [
                        { "text": { "content": args.title } }
                    ],
                },
            },
        });

        self.post(self.endpoint(&["pages"])?, &payload).await
    }

    async fn query_records(&self, args: RecordQuery) -> Result<Vec<Record>> {
        let payload = json!({
            "filter": {
                "and": [
                    {
                        "property": args.date_property,
                        "date": { "on_or_after": args.on_or_after },
                    },
                    {
                        "property": args.date_property,
                        "date": { "before": args.before },
                    },
                ],
            },
            "sorts": [
                { "property": args.date_property, "direction": "ascending" }
            ],
            "page_size": 100,
        });

        let url = self.endpoint(&["databases", &args.database_id, "query"])?;
        let body = self.post(url, &payload).await?;
        let response: QueryResponse = serde_json::from_value(body)
            .map_err(|e| Error::Upstream(format!("Malformed Notion query response: {}", e)))?;

        if response.has_more {
            warn!(
                "Query returned more than one page of results; only the first {} are used",
                response.results.len()
            );
        }

        Ok(response.results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn connector_for(server: &mockito::Server) -> NotionConnector {
        let config = Config {
            notion_api_base: format!("{}/v1", server.url()),
            ..Config::default()
        };
        NotionConnector::new(&config)
    }

    #[tokio::test]
    async fn test_create_record_payload() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/pages")
            .match_header("authorization", "Bearer secret_abc")
            .match_header("notion-version", "2022-06-28")
            .match_body(Matcher::PartialJson(json!({
                "parent": { "database_id": "db-1" },
                "properties": {
                    "날짜": { "type": "date", "date": { "start": "2025-03-14" } },
                    "이름": { "title": [ { "text": { "content": "2025-03-14 - 캘린더 기록" } } ] },
                },
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"object":"page","id":"page-1"}"#)
            .create_async()
            .await;

        let client = connector_for(&server).connect("secret_abc").unwrap();
        let page = client
            .create_record(CreateRecord {
                database_id: "db-1".to_string(),
                title_property: "이름".to_string(),
                title: "2025-03-14 - 캘린더 기록".to_string(),
                date_property: "날짜".to_string(),
                date: "2025-03-14".to_string(),
            })
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(page["id"], "page-1");
    }

    #[tokio::test]
    async fn test_query_records_filter_and_results() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/databases/db-1/query")
            .match_body(Matcher::PartialJson(json!({
                "filter": {
                    "and": [
                        { "property": "날짜", "date": { "on_or_after": "2025-03-01T00:00:00.000+09:00" } },
                        { "property": "날짜", "date": { "before": "2025-04-01T00:00:00.000+09:00" } },
                    ],
                },
                "sorts": [ { "property": "날짜", "direction": "ascending" } ],
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{
                    "object": "list",
                    "results": [
                        {"object": "page", "properties": {"날짜": {"type": "date", "date": {"start": "2025-03-02"}}}},
                        {"object": "page", "properties": {}}
                    ],
                    "has_more": false
                }"#,
            )
            .create_async()
            .await;

        let client = connector_for(&server).connect("secret_abc").unwrap();
        let records = client
            .query_records(RecordQuery {
                database_id: "db-1".to_string(),
                date_property: "날짜".to_string(),
                on_or_after: "2025-03-01T00:00:00.000+09:00".to_string(),
                before: "2025-04-01T00:00:00.000+09:00".to_string(),
            })
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].date_start("날짜"), Some("2025-03-02"));
        assert_eq!(records[1].date_start("날짜"), None);
    }

    #[tokio::test]
    async fn test_notion_error_is_upstream() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1/pages")
            .with_status(401)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"object":"error","status":401,"code":"unauthorized","message":"API token is invalid."}"#,
            )
            .create_async()
            .await;

        let client = connector_for(&server).connect("secret_bad").unwrap();
        let err = client
            .create_record(CreateRecord {
                database_id: "db-1".to_string(),
                title_property: "이름".to_string(),
                title: "t".to_string(),
                date_property: "날짜".to_string(),
                date: "2025-03-14".to_string(),
            })
            .await
            .unwrap_err();

        match err {
            Error::Upstream(msg) => assert_eq!(msg, "unauthorized: API token is invalid."),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_non_json_error_body() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1/databases/db-1/query")
            .with_status(502)
            .with_body("Bad Gateway")
            .create_async()
            .await;

        let client = connector_for(&server).connect("secret_abc").unwrap();
        let err = client
            .query_records(RecordQuery {
                database_id: "db-1".to_string(),
                date_property: "날짜".to_string(),
                on_or_after: "a".to_string(),
                before: "b".to_string(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Upstream(ref msg) if msg == "Notion returned status 502"));
    }

    #[test]
    fn test_debug_hides_credential() {
        let client = NotionConnector::new(&Config::default())
            .connect("secret_do_not_print")
            .unwrap();
        assert!(!format!("{:?}", client).contains("secret_do_not_print"));
    }
}
