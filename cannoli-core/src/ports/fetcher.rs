//! The fetcher interface: outbound HTTP for `http` content nodes. The real
//! implementation wraps a `reqwest::Client`.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::CannoliError;

#[derive(Clone, Debug)]
pub struct HttpRequest {
    pub method: String,
    pub url: String,
    pub headers: HashMap<String, String>,
    pub body: Option<Value>,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self { method: "GET".to_string(), url: url.into(), headers: HashMap::new(), body: None }
    }
}

#[derive(Clone, Debug)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, request: HttpRequest) -> Result<HttpResponse, CannoliError>;
}

/// `reqwest`-backed fetcher used outside of tests.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self { client: reqwest::Client::new() }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, request: HttpRequest) -> Result<HttpResponse, CannoliError> {
        let method = request
            .method
            .parse::<reqwest::Method>()
            .map_err(|e| CannoliError::HttpFailed(format!("invalid method {}: {e}", request.method)))?;

        let mut builder = self.client.request(method, &request.url);
        for (key, value) in &request.headers {
            builder = builder.header(key, value);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| CannoliError::HttpFailed(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| CannoliError::HttpFailed(e.to_string()))?;
        Ok(HttpResponse { status, body })
    }
}

/// Scripted responses keyed by URL, for tests and sub-cannoli dry runs.
pub struct MockFetcher {
    responses: Mutex<HashMap<String, HttpResponse>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self { responses: Mutex::new(HashMap::new()) }
    }

    pub fn with_response(self, url: impl Into<String>, status: u16, body: impl Into<String>) -> Self {
        self.responses
            .lock()
            .expect("mock fetcher lock poisoned")
            .insert(url.into(), HttpResponse { status, body: body.into() });
        self
    }
}

impl Default for MockFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Fetcher for MockFetcher {
    async fn fetch(&self, request: HttpRequest) -> Result<HttpResponse, CannoliError> {
        self.responses
            .lock()
            .expect("mock fetcher lock poisoned")
            .get(&request.url)
            .cloned()
            .ok_or_else(|| CannoliError::HttpFailed(format!("no mock response for {}", request.url)))
    }
}
