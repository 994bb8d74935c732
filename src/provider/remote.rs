//! HTTP client for a remote transcript service.
//!
//! Wire contract:
//! - `GET /transcript/{video_id}?lang={language}&format=both`
//! - `POST /transcript` with `{video_ids, lang, format: "both"}`, answered by a
//!   `results` array aligned with the request's `video_ids`
//! - optional `X-API-Key` header

use super::{BatchResult, ItemError, TranscriptProvider};
use crate::error::{ErrorKind, Result, TranscriptError};
use crate::transcript::{Segment, TranscriptResult};
use async_trait::async_trait;
use parking_lot::RwLock;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Default per-request timeout.
const DEFAULT_TIMEOUT_SECS: u64 = 60;

const API_KEY_HEADER: HeaderName = HeaderName::from_static("x-api-key");

/// Provider backed by a remote transcript service.
pub struct RemoteServiceProvider {
    base_url: String,
    /// `None` once the provider has been closed.
    client: RwLock<Option<reqwest::Client>>,
}

#[derive(Debug, Deserialize)]
struct WireTranscript {
    video_id: String,
    #[serde(default)]
    language: Option<String>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    segments: Vec<Segment>,
    #[serde(default)]
    metadata: WireMetadata,
    #[serde(default)]
    method: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct WireMetadata {
    #[serde(default)]
    is_generated: bool,
}

impl WireTranscript {
    fn into_result(self, requested_language: &str) -> TranscriptResult {
        TranscriptResult {
            video_id: self.video_id,
            language: self
                .language
                .unwrap_or_else(|| requested_language.to_string()),
            is_generated: self.metadata.is_generated,
            segments: self.segments,
            text: self.text.unwrap_or_default(),
            method: self.method.unwrap_or_else(|| "backend".to_string()),
        }
    }
}

#[derive(Debug, Serialize)]
struct BatchRequest<'a> {
    video_ids: &'a [String],
    lang: &'a str,
    format: &'static str,
}

#[derive(Debug, Deserialize)]
struct BatchResponse {
    #[serde(default)]
    results: Vec<Value>,
}

impl RemoteServiceProvider {
    /// Create a provider with the default timeout and no API key.
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_config(base_url, None, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a provider with an optional API key and a per-request timeout.
    pub fn with_config(base_url: &str, api_key: Option<&str>, timeout: Duration) -> Result<Self> {
        url::Url::parse(base_url).map_err(|e| {
            TranscriptError::Config(format!("Invalid backend URL '{}': {}", base_url, e))
        })?;

        let mut headers = HeaderMap::new();
        if let Some(key) = api_key.filter(|k| !k.is_empty()) {
            let value = HeaderValue::from_str(key)
                .map_err(|e| TranscriptError::Config(format!("Invalid API key: {}", e)))?;
            headers.insert(API_KEY_HEADER, value);
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: RwLock::new(Some(client)),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn client(&self) -> Result<reqwest::Client> {
        self.client
            .read()
            .clone()
            .ok_or_else(|| TranscriptError::Upstream("client closed".to_string()))
    }
}

/// Interpret one element of a batch `results` array.
fn parse_batch_item(item: Option<Value>, requested_id: &str, language: &str) -> BatchResult {
    let Some(item) = item else {
        return Err(ItemError::new(
            requested_id,
            ErrorKind::UpstreamTransport,
            "missing from backend response",
        ));
    };

    if let Some(error) = item.get("error") {
        let video_id = item
            .get("video_id")
            .and_then(Value::as_str)
            .unwrap_or(requested_id);
        let message = match error {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        return Err(ItemError::new(video_id, ErrorKind::Unavailable, message));
    }

    serde_json::from_value::<WireTranscript>(item)
        .map(|wire| wire.into_result(language))
        .map_err(|e| {
            ItemError::new(
                requested_id,
                ErrorKind::UpstreamTransport,
                format!("malformed backend result: {}", e),
            )
        })
}

#[async_trait]
impl TranscriptProvider for RemoteServiceProvider {
    fn name(&self) -> &'static str {
        "remote"
    }

    #[instrument(skip(self))]
    async fn fetch_one(&self, video_id: &str, language: &str) -> Result<TranscriptResult> {
        let url = format!("{}/transcript/{}", self.base_url, video_id);

        let response = self
            .client()?
            .get(&url)
            .query(&[("lang", language), ("format", "both")])
            .send()
            .await?
            .error_for_status()?;

        let wire: WireTranscript = response.json().await?;
        debug!(segments = wire.segments.len(), "Fetched transcript from backend");

        Ok(wire.into_result(language))
    }

    #[instrument(skip(self, video_ids), fields(count = video_ids.len()))]
    async fn fetch_batch(&self, video_ids: &[String], language: &str) -> Result<Vec<BatchResult>> {
        if video_ids.is_empty() {
            return Ok(Vec::new());
        }

        let url = format!("{}/transcript", self.base_url);
        let request = BatchRequest {
            video_ids,
            lang: language,
            format: "both",
        };

        let response = self
            .client()?
            .post(&url)
            .json(&request)
            .send()
            .await?
            .error_for_status()?;

        let body: BatchResponse = response.json().await?;
        let mut items = body.results.into_iter();

        Ok(video_ids
            .iter()
            .map(|id| parse_batch_item(items.next(), id, language))
            .collect())
    }

    async fn close(&self) {
        if self.client.write().take().is_some() {
            info!("Closed backend client for {}", self.base_url);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        extract::{Path, Query},
        http::{HeaderMap as AxumHeaders, StatusCode},
        response::IntoResponse,
        routing::get,
        Json, Router,
    };
    use serde_json::json;
    use std::collections::HashMap;

    async fn spawn_backend(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    async fn get_transcript(
        Path(video_id): Path<String>,
        Query(params): Query<HashMap<String, String>>,
        headers: AxumHeaders,
    ) -> impl IntoResponse {
        if headers.get("x-api-key").and_then(|v| v.to_str().ok()) != Some("test-key") {
            return (StatusCode::UNAUTHORIZED, Json(json!({"detail": "bad key"})));
        }
        if video_id == "missing____" {
            return (StatusCode::NOT_FOUND, Json(json!({"detail": "not found"})));
        }
        (
            StatusCode::OK,
            Json(json!({
                "video_id": video_id,
                "method": "cookie_transcript",
                "language": params.get("lang"),
                "text": "Hello world",
                "segments": [
                    {"text": "Hello", "start": 0.0, "duration": 2.0},
                    {"text": "world", "start": 2.0, "duration": 2.0}
                ],
                "metadata": {"is_generated": true, "processing_time": 0.5, "cached": false},
                "format": params.get("format"),
            })),
        )
    }

    async fn post_batch(Json(body): Json<Value>) -> Json<Value> {
        assert_eq!(body["lang"], "en");
        assert_eq!(body["format"], "both");
        assert_eq!(body["video_ids"].as_array().map(Vec::len), Some(3));
        Json(json!({
            "results": [
                {
                    "video_id": "vid1_______",
                    "method": "ytdlp",
                    "language": "en",
                    "text": "First video",
                    "segments": [{"text": "First video", "start": 0.0, "duration": 3.0}],
                    "metadata": {"is_generated": false}
                },
                {"video_id": "vid2_______", "error": "Not found"}
            ]
        }))
    }

    async fn backend() -> RemoteServiceProvider {
        let router = Router::new()
            .route("/transcript/{video_id}", get(get_transcript))
            .route("/transcript", axum::routing::post(post_batch));
        let base = spawn_backend(router).await;
        RemoteServiceProvider::with_config(&format!("{}/", base), Some("test-key"), Duration::from_secs(5))
            .unwrap()
    }

    #[tokio::test]
    async fn test_fetch_one_success() {
        let provider = backend().await;

        let result = provider.fetch_one("dQw4w9WgXcQ", "en").await.unwrap();

        assert_eq!(result.video_id, "dQw4w9WgXcQ");
        assert_eq!(result.language, "en");
        assert!(result.is_generated);
        assert_eq!(result.method, "cookie_transcript");
        assert_eq!(result.text, "Hello world");
        assert_eq!(result.segments.len(), 2);
        provider.close().await;
    }

    #[tokio::test]
    async fn test_non_success_status_is_upstream_error() {
        let provider = backend().await;

        let err = provider.fetch_one("missing____", "en").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UpstreamTransport);
    }

    #[tokio::test]
    async fn test_missing_api_key_is_rejected() {
        let router = Router::new().route("/transcript/{video_id}", get(get_transcript));
        let base = spawn_backend(router).await;
        let provider = RemoteServiceProvider::new(&base).unwrap();

        let err = provider.fetch_one("dQw4w9WgXcQ", "en").await.unwrap_err();
        assert!(matches!(err, TranscriptError::Http(_)));
    }

    #[tokio::test]
    async fn test_timeout_is_upstream_error() {
        let router = Router::new().route(
            "/transcript/{video_id}",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                "late"
            }),
        );
        let base = spawn_backend(router).await;
        let provider =
            RemoteServiceProvider::with_config(&base, None, Duration::from_millis(100)).unwrap();

        let err = provider.fetch_one("dQw4w9WgXcQ", "en").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UpstreamTransport);
    }

    #[tokio::test]
    async fn test_batch_aligns_results_and_isolates_errors() {
        let provider = backend().await;
        let ids = vec![
            "vid1_______".to_string(),
            "vid2_______".to_string(),
            "vid3_______".to_string(),
        ];

        let results = provider.fetch_batch(&ids, "en").await.unwrap();

        assert_eq!(results.len(), 3);
        let first = results[0].as_ref().unwrap();
        assert_eq!(first.video_id, "vid1_______");
        assert_eq!(first.method, "ytdlp");

        let second = results[1].as_ref().unwrap_err();
        assert_eq!(second.video_id, "vid2_______");
        assert_eq!(second.message, "Not found");

        let third = results[2].as_ref().unwrap_err();
        assert_eq!(third.video_id, "vid3_______");
        assert!(third.message.contains("missing"));
    }

    #[tokio::test]
    async fn test_close_is_idempotent_and_final() {
        let provider = backend().await;
        provider.close().await;
        provider.close().await;

        let err = provider.fetch_one("dQw4w9WgXcQ", "en").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UpstreamTransport);
    }

    #[test]
    fn test_defaults_for_sparse_payload() {
        let item = json!({"video_id": "abcdefghijk"});
        let result = parse_batch_item(Some(item), "abcdefghijk", "de").unwrap();
        assert_eq!(result.language, "de");
        assert_eq!(result.method, "backend");
        assert_eq!(result.text, "");
        assert!(!result.is_generated);
        assert!(result.segments.is_empty());
    }

    #[test]
    fn test_invalid_base_url() {
        let err = RemoteServiceProvider::new("not a url").err().unwrap();
        assert!(matches!(err, TranscriptError::Config(_)));
    }
}
