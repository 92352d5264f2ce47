//! Browser Page port (§6): the capability set the AgenticExtractor and
//! WorkflowEngine drive a live browser page through.

use async_trait::async_trait;
use std::fmt::Debug;
use std::time::Duration;

/// `waitUntil` condition for `Goto` (§6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitUntil {
    Load,
    DomContentLoaded,
    NetworkIdle,
}

/// A DOM locator obtained via `Page::locator` (§6).
#[async_trait]
pub trait Locator: Debug + Send + Sync {
    async fn is_visible(&self, timeout: Duration) -> anyhow::Result<bool>;
    async fn click(&self) -> anyhow::Result<()>;
    async fn fill(&self, text: &str) -> anyhow::Result<()>;
    async fn type_text(&self, text: &str) -> anyhow::Result<()>;
}

/// A live, stateful browser page (§6).
///
/// Implementations are not concurrency-safe: the underlying browser page
/// is single-threaded per §5 ("AgenticExtractor is single-threaded per
/// page"), so callers must serialize access.
#[async_trait]
pub trait BrowserPage: Debug + Send + Sync {
    fn url(&self) -> String;
    async fn content(&self) -> anyhow::Result<String>;
    async fn goto(&self, url: &str, wait_until: WaitUntil) -> anyhow::Result<()>;
    async fn evaluate(&self, expr: &str) -> anyhow::Result<serde_json::Value>;
    async fn wait_for_timeout(&self, duration: Duration) -> anyhow::Result<()>;
    async fn wait_for_selector(
        &self,
        selector: &str,
        present: bool,
        timeout: Duration,
    ) -> anyhow::Result<bool>;
    fn locator(&self, selector: &str) -> Box<dyn Locator>;
    /// Release any resources (CDP session, tab) held by this page. Must be
    /// callable on every exit path (§5 "Browser sessions ... must be
    /// released deterministically on all exit paths").
    async fn close(&self) -> anyhow::Result<()>;
}
