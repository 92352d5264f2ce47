//! FetchClient port (§6: `Fetch({url, useCache, mode}) -> FetchResult | error`).

use crate::errors::CoreResult;
use async_trait::async_trait;
use std::fmt::Debug;

/// Requested fetch mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMode {
    /// Plain HTTP GET.
    Http,
    /// Render via a headless browser before returning the body.
    Rendered,
}

/// Request shape for `FetchClient::fetch` (§6).
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub url: String,
    pub use_cache: bool,
    pub mode: FetchMode,
}

impl FetchRequest {
    pub fn http(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            use_cache: true,
            mode: FetchMode::Http,
        }
    }

    pub fn bypass_cache(mut self) -> Self {
        self.use_cache = false;
        self
    }
}

/// `{body, finalURL, status, fromCache, etag?, lastModified?}` (§3).
///
/// Invariant: `final_url` is absolute and canonicalized by the
/// implementation before this struct is constructed.
#[derive(Debug, Clone)]
pub struct FetchResult {
    pub body: Vec<u8>,
    pub final_url: String,
    pub status: u16,
    pub from_cache: bool,
    pub etag: Option<String>,
    pub last_modified: Option<String>,
}

impl FetchResult {
    pub fn body_as_str(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}

/// HTTP GET with optional JS rendering; an external collaborator the core
/// only consumes (§6, component A).
#[async_trait]
pub trait FetchClient: Debug + Send + Sync {
    async fn fetch(&self, request: FetchRequest) -> CoreResult<FetchResult>;
}
