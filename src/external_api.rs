pub mod convertkit_api;

use async_trait::async_trait;
use log::warn;
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE},
    Client, Method, Url,
};
use std::time::Duration;
use thiserror::Error;

const APPLICATION_JSON: &str = "application/json";

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Reqwest(#[from] reqwest::Error),
    #[error("Error {0}: {1}")]
    UnexpectedStatus(String, u16),
    #[error("Deserialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("URL parse error: {0}")]
    Parse(String),
    #[error("The URL <{0}> cannot be sent without changing its path")]
    RewrittenUrl(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("The {0} must not be empty")]
    EmptyLabel(&'static str),
    #[error("At least one field label is required")]
    NoFieldLabels,
    #[error("Invalid properties for action {0}: {1}")]
    InvalidProps(String, String),
    #[error("Unknown action: {0}")]
    UnknownAction(String),
    #[error("Failed to retrieve the user's directories")]
    NotFoundUserDir,
    #[error("The string entered must be a URL")]
    InvalidUrl,
    #[error("The API secret must be non-empty and contain no whitespace")]
    InvalidApiSecret,
    #[error("Config not found at <{0}>. Run `kitfields init` or set CONVERTKIT_API_SECRET")]
    MissingConfig(String),
    #[error("Deletion cancelled by user")]
    DeleteCancelledByUser,
}

impl ApiError {
    /// HTTP status of the response that caused the error, if there was one
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::UnexpectedStatus(_, status) => Some(*status),
            ApiError::Reqwest(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Raw response: numeric status and undecoded body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Decode the body as JSON. An empty body decodes to `null`
    pub fn json(&self) -> Result<serde_json::Value, ApiError> {
        if self.body.trim().is_empty() {
            return Ok(serde_json::Value::Null);
        }
        Ok(serde_json::from_str(&self.body)?)
    }

    /// Like [`HttpResponse::json`], but a body that is not JSON comes back as a string
    pub fn json_or_text(&self) -> serde_json::Value {
        self.json()
            .unwrap_or_else(|_| serde_json::Value::String(self.body.clone()))
    }
}

// Path of a raw URL string up to the query or fragment, `/` when it has none
fn raw_path(url: &str) -> &str {
    let rest = url.split_once("://").map_or(url, |(_, rest)| rest);
    let rest = rest.find(['?', '#']).map_or(rest, |end| &rest[..end]);
    rest.find('/').map_or("/", |start| &rest[start..])
}

fn is_dot_segment(segment: &str) -> bool {
    let segment = segment.to_ascii_lowercase().replace("%2e", ".");
    segment == "." || segment == ".."
}

/// True when parsing kept the request target of `raw`: same path segments, no query or fragment.
///
/// URL parsing treats `?` and `#` as delimiters, resolves dot segments, turns `\` into `/`
/// and drops surrounding whitespace and inner tabs or newlines.
fn target_is_preserved(raw: &str, parsed: &Url) -> bool {
    if parsed.query().is_some() || parsed.fragment().is_some() {
        return false;
    }
    if raw.trim_matches(|c: char| c <= ' ') != raw
        || raw.contains(['\\', '\t', '\n', '\r'])
    {
        return false;
    }
    let path = raw_path(raw);
    let segments: Vec<&str> = path.strip_prefix('/').unwrap_or(path).split('/').collect();
    if segments.iter().any(|segment| is_dot_segment(segment)) {
        return false;
    }
    parsed
        .path_segments()
        .is_some_and(|parsed_segments| parsed_segments.count() == segments.len())
}

/// Everything an action needs from the network: send one request, get back status and body.
///
/// Non-2xx statuses are NOT errors at this level; callers decide what counts as success.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(
        &self,
        method: Method,
        url: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<HttpResponse, ApiError>;
}

/// Basic api client
pub struct BaseApiClient {
    client: Client,
}

impl BaseApiClient {
    fn get_default_headers() -> HeaderMap {
        let mut headers = HeaderMap::with_capacity(2);
        headers.insert(ACCEPT, HeaderValue::from_static(APPLICATION_JSON));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(APPLICATION_JSON));
        headers
    }

    pub fn new(timeout: Duration) -> Result<Self, ApiError> {
        let client = Client::builder()
            .default_headers(Self::get_default_headers())
            .timeout(timeout)
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for BaseApiClient {
    async fn send(
        &self,
        method: Method,
        url: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<HttpResponse, ApiError> {
        let parsed = Url::parse(url).map_err(|e| ApiError::Parse(e.to_string()))?;
        if !target_is_preserved(url, &parsed) {
            warn!("[BaseApiClient] refusing to send {} as {}", url, parsed);
            return Err(ApiError::RewrittenUrl(url.to_string()));
        }
        let mut request = self.client.request(method, parsed);
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(HttpResponse { status, body })
    }
}
