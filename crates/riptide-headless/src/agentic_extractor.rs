//! Agentic, browser-driven extraction: repeatedly tries to improve a
//! page's extracted content quality through a fixed ladder of DOM
//! interventions before giving up and returning the best result seen
//! (§4.4, component F).

use riptide_extraction::Distiller;
use riptide_types::model::{DistillationResult, ExtractionMethod};
use riptide_types::ports::BrowserPage;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Tunables for one `extract` run. Defaults match the documented
/// defaults exactly.
#[derive(Debug, Clone, Copy)]
pub struct AgenticExtractorOptions {
    pub confidence_threshold: f64,
    pub min_content_length: usize,
    pub max_attempts: u32,
    pub timeout: Duration,
    pub enable_scrolling: bool,
    pub enable_interaction: bool,
    pub enable_alternate_extraction: bool,
}

impl Default for AgenticExtractorOptions {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.7,
            min_content_length: 200,
            max_attempts: 3,
            timeout: Duration::from_secs(30),
            enable_scrolling: true,
            enable_interaction: true,
            enable_alternate_extraction: true,
        }
    }
}

/// The six ordered improvement strategies, each tried at most once per
/// run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Strategy {
    IncrementalScroll,
    DismissOverlays,
    ClickShowMore,
    WaitForLoadingIndicators,
    StripInterferenceElements,
    AlternateExtraction,
}

impl Strategy {
    fn name(self) -> &'static str {
        match self {
            Strategy::IncrementalScroll => "incremental-scroll",
            Strategy::DismissOverlays => "dismiss-overlays",
            Strategy::ClickShowMore => "click-show-more",
            Strategy::WaitForLoadingIndicators => "wait-for-loading-indicators",
            Strategy::StripInterferenceElements => "strip-interference-elements",
            Strategy::AlternateExtraction => "alternate-extraction",
        }
    }
}

fn ordered_strategies(options: &AgenticExtractorOptions) -> Vec<Strategy> {
    let mut strategies = Vec::new();
    if options.enable_scrolling {
        strategies.push(Strategy::IncrementalScroll);
    }
    if options.enable_interaction {
        strategies.push(Strategy::DismissOverlays);
        strategies.push(Strategy::ClickShowMore);
    }
    strategies.push(Strategy::WaitForLoadingIndicators);
    strategies.push(Strategy::StripInterferenceElements);
    if options.enable_alternate_extraction {
        strategies.push(Strategy::AlternateExtraction);
    }
    strategies
}

/// Curated selectors for dialogs/overlays whose dismiss button text
/// usually reads "accept", "close", "dismiss", or similar.
const OVERLAY_SELECTORS: &[&str] = &[
    "[aria-label='Close']",
    ".modal-close",
    ".overlay-close",
    ".cookie-consent button",
    "#onetrust-accept-btn-handler",
];

const SHOW_MORE_SELECTORS: &[&str] = &[
    "button.show-more",
    "a.read-more",
    "[data-action='load-more']",
    ".load-more-button",
];

const LOADING_INDICATOR_SELECTOR: &str = ".loading, .spinner, [aria-busy='true']";

const STRIP_INTERFERENCE_SCRIPT: &str = r#"
(() => {
  const selectors = ['header.fixed', '.sticky-nav', '.ad-container', '.ad-slot', '[id*="sticky"]'];
  let removed = 0;
  for (const selector of selectors) {
    document.querySelectorAll(selector).forEach((el) => { el.remove(); removed += 1; });
  }
  return removed;
})()
"#;

const ALTERNATE_EXTRACTION_SCRIPT: &str = r#"
(() => {
  const el = document.querySelector('article') || document.querySelector('main') || document.querySelector('[role="main"]');
  return el ? el.innerHTML : null;
})()
"#;

/// One EXTRACT+EVALUATE cycle's outcome.
#[derive(Debug, Clone)]
pub struct AttemptRecord {
    pub attempt: u32,
    pub strategy_applied: Option<String>,
    pub confidence: f64,
    pub content_length: usize,
    pub method: ExtractionMethod,
}

/// Full output of an `extract` run (§4.4).
#[derive(Debug, Clone)]
pub struct AgenticResult {
    pub best: DistillationResult,
    pub attempts: Vec<AttemptRecord>,
    pub applied_improvements: Vec<String>,
    pub final_method: ExtractionMethod,
    pub total_duration: Duration,
}

#[derive(Debug, Default)]
pub struct AgenticExtractor;

impl AgenticExtractor {
    pub fn new() -> Self {
        Self
    }

    fn meets_quality_bar(result: &DistillationResult, options: &AgenticExtractorOptions) -> bool {
        result.extraction_confidence >= options.confidence_threshold
            && result.content_length >= options.min_content_length
    }

    /// `(confidence, contentLength)` lexicographic max, per §4.4.
    fn is_better(candidate: &DistillationResult, current_best: &DistillationResult) -> bool {
        (candidate.extraction_confidence, candidate.content_length)
            > (current_best.extraction_confidence, current_best.content_length)
    }

    async fn read_page_html(
        page: &dyn BrowserPage,
        alternate_extraction_mode: bool,
    ) -> anyhow::Result<String> {
        if alternate_extraction_mode {
            if let Ok(value) = page.evaluate(ALTERNATE_EXTRACTION_SCRIPT).await {
                if let Some(html) = value.as_str() {
                    return Ok(html.to_string());
                }
            }
        }
        page.content().await
    }

    /// Applies one strategy against the live page, returning whether it
    /// produced any observable change. Never propagates an error —
    /// interaction failures (missing selector, navigation mid-click) are
    /// treated as "no change, try the next strategy" (§4.4 "never
    /// throws").
    async fn apply_strategy(
        page: &dyn BrowserPage,
        strategy: Strategy,
        remaining: Duration,
    ) -> bool {
        match strategy {
            Strategy::IncrementalScroll => {
                let before = Self::scroll_height(page).await;
                if page
                    .evaluate("window.scrollTo(0, document.body.scrollHeight)")
                    .await
                    .is_err()
                {
                    return false;
                }
                let _ = page.wait_for_timeout(Duration::from_millis(300)).await;
                let after = Self::scroll_height(page).await;
                matches!((before, after), (Some(b), Some(a)) if a > b)
            }
            Strategy::DismissOverlays => {
                for selector in OVERLAY_SELECTORS {
                    let locator = page.locator(selector);
                    match locator.is_visible(Duration::from_millis(500)).await {
                        Ok(true) => {
                            if locator.click().await.is_ok() {
                                return true;
                            }
                        }
                        _ => continue,
                    }
                }
                false
            }
            Strategy::ClickShowMore => {
                for selector in SHOW_MORE_SELECTORS {
                    let locator = page.locator(selector);
                    match locator.is_visible(Duration::from_millis(500)).await {
                        Ok(true) => {
                            if locator.click().await.is_ok() {
                                return true;
                            }
                        }
                        _ => continue,
                    }
                }
                false
            }
            Strategy::WaitForLoadingIndicators => {
                let cap = Duration::from_secs(5).min(remaining);
                let was_present = page
                    .wait_for_selector(LOADING_INDICATOR_SELECTOR, true, Duration::from_millis(200))
                    .await
                    .unwrap_or(false);
                if !was_present {
                    return false;
                }
                page.wait_for_selector(LOADING_INDICATOR_SELECTOR, false, cap)
                    .await
                    .unwrap_or(false)
            }
            Strategy::StripInterferenceElements => {
                match page.evaluate(STRIP_INTERFERENCE_SCRIPT).await {
                    Ok(value) => value.as_u64().unwrap_or(0) > 0,
                    Err(_) => false,
                }
            }
            Strategy::AlternateExtraction => true,
        }
    }

    async fn scroll_height(page: &dyn BrowserPage) -> Option<u64> {
        page.evaluate("document.body.scrollHeight")
            .await
            .ok()
            .and_then(|v| v.as_u64())
    }

    /// `extract(page, options) -> AgenticResult` (§4.4). Never fails:
    /// unrecoverable errors simply stop the attempt loop and return the
    /// best result accumulated so far.
    pub async fn extract(
        &self,
        page: &dyn BrowserPage,
        distiller: &Distiller,
        options: AgenticExtractorOptions,
    ) -> AgenticResult {
        let started = Instant::now();
        let deadline = started + options.timeout;

        let mut strategy_queue = ordered_strategies(&options);
        let mut alternate_extraction_mode = false;
        let mut attempts = Vec::new();
        let mut applied_improvements = Vec::new();
        let mut pending_strategy_name: Option<String> = None;
        let mut best: Option<DistillationResult> = None;

        for attempt_num in 1..=options.max_attempts {
            if Instant::now() >= deadline {
                debug!(attempt = attempt_num, "agentic extractor deadline reached before attempt");
                break;
            }

            let html = match Self::read_page_html(page, alternate_extraction_mode).await {
                Ok(html) => html,
                Err(err) => {
                    warn!(attempt = attempt_num, error = %err, "failed to read page content");
                    break;
                }
            };

            let url = page.url();
            let result = match distiller.distill(&html, &url, None).await {
                Ok(result) => result,
                Err(err) => {
                    warn!(attempt = attempt_num, error = %err, "distill failed unexpectedly");
                    break;
                }
            };

            attempts.push(AttemptRecord {
                attempt: attempt_num,
                strategy_applied: pending_strategy_name.take(),
                confidence: result.extraction_confidence,
                content_length: result.content_length,
                method: result.extraction_method,
            });

            let is_first_or_better = match &best {
                Some(current) => Self::is_better(&result, current),
                None => true,
            };
            if is_first_or_better {
                best = Some(result.clone());
            }

            if Self::meets_quality_bar(&result, &options) {
                debug!(attempt = attempt_num, "quality bar met, stopping");
                break;
            }

            if attempt_num == options.max_attempts || Instant::now() >= deadline {
                break;
            }

            let remaining = deadline.saturating_duration_since(Instant::now());
            let mut improved = false;
            while let Some(strategy) = strategy_queue.first().copied() {
                strategy_queue.remove(0);
                if strategy == Strategy::AlternateExtraction {
                    alternate_extraction_mode = true;
                    applied_improvements.push(strategy.name().to_string());
                    pending_strategy_name = Some(strategy.name().to_string());
                    improved = true;
                    break;
                }
                if Self::apply_strategy(page, strategy, remaining).await {
                    applied_improvements.push(strategy.name().to_string());
                    pending_strategy_name = Some(strategy.name().to_string());
                    improved = true;
                    break;
                }
                if Instant::now() >= deadline {
                    break;
                }
            }

            if !improved {
                debug!(attempt = attempt_num, "no remaining strategy improved the page, stopping");
                break;
            }
        }

        let best = best.unwrap_or_else(|| {
            DistillationResult::new(
                Vec::new(),
                String::new(),
                String::new(),
                true,
                ExtractionMethod::Fallback,
                0.0,
                None,
                None,
                None,
                None,
            )
        });

        AgenticResult {
            final_method: best.extraction_method,
            attempts,
            applied_improvements,
            best,
            total_duration: started.elapsed(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use riptide_extraction::extractors::FallbackExtractor;
    use riptide_types::ports::{Locator, WaitUntil};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Debug)]
    struct StaticLocator;

    #[async_trait]
    impl Locator for StaticLocator {
        async fn is_visible(&self, _timeout: Duration) -> anyhow::Result<bool> {
            Ok(false)
        }
        async fn click(&self) -> anyhow::Result<()> {
            Ok(())
        }
        async fn fill(&self, _text: &str) -> anyhow::Result<()> {
            Ok(())
        }
        async fn type_text(&self, _text: &str) -> anyhow::Result<()> {
            Ok(())
        }
    }

    /// A fake page that returns richer content on its second `content()`
    /// call than on its first, to exercise the retry loop.
    #[derive(Debug)]
    struct ImprovingPage {
        call_count: AtomicUsize,
    }

    #[async_trait]
    impl BrowserPage for ImprovingPage {
        fn url(&self) -> String {
            "https://example.com".to_string()
        }

        async fn content(&self) -> anyhow::Result<String> {
            let n = self.call_count.fetch_add(1, Ordering::SeqCst);
            if n == 0 {
                Ok("<html><body><p>short</p></body></html>".to_string())
            } else {
                Ok(format!(
                    "<html><body><article><p>{}</p><p>{}</p><p>{}</p></article></body></html>",
                    "word ".repeat(100),
                    "word ".repeat(100),
                    "word ".repeat(100)
                ))
            }
        }

        async fn goto(&self, _url: &str, _wait_until: WaitUntil) -> anyhow::Result<()> {
            Ok(())
        }

        async fn evaluate(&self, _expr: &str) -> anyhow::Result<serde_json::Value> {
            Ok(serde_json::Value::Null)
        }

        async fn wait_for_timeout(&self, _duration: Duration) -> anyhow::Result<()> {
            Ok(())
        }

        async fn wait_for_selector(
            &self,
            _selector: &str,
            _present: bool,
            _timeout: Duration,
        ) -> anyhow::Result<bool> {
            Ok(false)
        }

        fn locator(&self, _selector: &str) -> Box<dyn Locator> {
            Box::new(StaticLocator)
        }

        async fn close(&self) -> anyhow::Result<()> {
            Ok(())
        }
    }

    fn test_distiller() -> Distiller {
        Distiller::new(vec![Arc::new(FallbackExtractor::new())])
    }

    #[tokio::test]
    async fn retries_until_quality_bar_is_met() {
        let page = ImprovingPage {
            call_count: AtomicUsize::new(0),
        };
        let extractor = AgenticExtractor::new();
        let distiller = test_distiller();
        let options = AgenticExtractorOptions {
            confidence_threshold: 0.0,
            min_content_length: 100,
            ..Default::default()
        };

        let result = extractor.extract(&page, &distiller, options).await;
        assert!(result.attempts.len() >= 2);
        assert!(result.best.content_length >= 100);
    }

    #[tokio::test]
    async fn never_panics_when_quality_never_improves() {
        let page = ImprovingPage {
            call_count: AtomicUsize::new(100),
        };
        let extractor = AgenticExtractor::new();
        let distiller = test_distiller();
        let options = AgenticExtractorOptions {
            confidence_threshold: 0.99,
            min_content_length: 1_000_000,
            max_attempts: 2,
            timeout: Duration::from_millis(500),
            ..Default::default()
        };
        let result = extractor.extract(&page, &distiller, options).await;
        assert!(!result.attempts.is_empty());
    }
}
