use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use std::sync::Mutex;
use url::Url;

#[derive(Debug, Clone)]
pub struct FetchError {
  pub status: Option<u16>,
  pub message: String,
}

impl std::fmt::Display for FetchError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self.status {
      Some(status) => write!(f, "{status}: {}", self.message),
      None => write!(f, "{}", self.message),
    }
  }
}

impl std::error::Error for FetchError {}

/// The injected fetch adapter the teacher's design notes ask for (§4.C:
/// "The CDN Model only constructs URLs; it does not fetch. A separate fetch
/// adapter is injected for testability."). Implemented by `ReqwestFetcher`
/// in production and `MockFetcher` in tests.
#[async_trait]
pub trait HttpFetcher: Send + Sync + std::fmt::Debug {
  async fn fetch(&self, url: &Url) -> Result<Bytes, FetchError>;
}

/// Production adapter backed by `reqwest`.
#[derive(Debug, Clone, Default)]
pub struct ReqwestFetcher {
  client: reqwest::Client,
}

impl ReqwestFetcher {
  pub fn new() -> Self {
    Self { client: reqwest::Client::new() }
  }
}

#[async_trait]
impl HttpFetcher for ReqwestFetcher {
  async fn fetch(&self, url: &Url) -> Result<Bytes, FetchError> {
    let response = self
      .client
      .get(url.clone())
      .send()
      .await
      .map_err(|e| FetchError { status: e.status().map(|s| s.as_u16()), message: e.to_string() })?;
    let status = response.status();
    if !status.is_success() {
      return Err(FetchError { status: Some(status.as_u16()), message: format!("GET {url} failed") });
    }
    response
      .bytes()
      .await
      .map_err(|e| FetchError { status: None, message: e.to_string() })
  }
}

/// In-memory double standing in for a mock CDN/registry/tarball server —
/// scaled down from the teacher's `tests/util/server/src/npm_registry.rs`
/// real mock registry process to what this crate's own test scenarios need:
/// a fixed map of URL -> response bytes, with an optional per-URL failure
/// injection.
#[derive(Debug, Default)]
pub struct MockFetcher {
  responses: Mutex<HashMap<String, Bytes>>,
  failures: Mutex<HashMap<String, u16>>,
  call_count: Mutex<HashMap<String, u32>>,
}

impl MockFetcher {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn serve(&self, url: impl Into<String>, body: impl Into<Bytes>) -> &Self {
    self.responses.lock().unwrap().insert(url.into(), body.into());
    self
  }

  pub fn fail(&self, url: impl Into<String>, status: u16) -> &Self {
    self.failures.lock().unwrap().insert(url.into(), status);
    self
  }

  pub fn call_count(&self, url: &str) -> u32 {
    *self.call_count.lock().unwrap().get(url).unwrap_or(&0)
  }
}

#[async_trait]
impl HttpFetcher for MockFetcher {
  async fn fetch(&self, url: &Url) -> Result<Bytes, FetchError> {
    let key = url.as_str().to_string();
    *self.call_count.lock().unwrap().entry(key.clone()).or_insert(0) += 1;
    if let Some(status) = self.failures.lock().unwrap().get(&key) {
      return Err(FetchError { status: Some(*status), message: format!("mock failure for {key}") });
    }
    self
      .responses
      .lock()
      .unwrap()
      .get(&key)
      .cloned()
      .ok_or_else(|| FetchError { status: Some(404), message: format!("no mock response for {key}") })
  }
}
