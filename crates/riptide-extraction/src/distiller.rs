//! Orchestrates extraction end to end: hash, policy, extractors, ensemble,
//! confidence, structured metadata and tables (§4.3, component E).

use crate::confidence::ConfidenceScorer;
use crate::ensemble::ExtractionEnsemble;
use crate::metadata::MetadataExtractor;
use crate::tables::TableExtractor;
use futures::future::join_all;
use riptide_types::model::{
    DistillationResult, DistilledNode, ExtractionCandidate, ExtractionMethod, NodeType,
};
use riptide_types::ports::{Extractor, PolicyEngine};
use scraper::{Html, Selector};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tracing::{debug, warn};

/// Confidence assigned to the last-resort DOM-paragraph fallback result
/// when every configured extractor failed or produced nothing usable.
const FALLBACK_CONFIDENCE: f64 = 0.2;

/// One marketplace-style adapter: if it recognizes the URL and produces
/// a candidate, its result is used directly and the rest of the
/// pipeline (ensemble, generic extractors) is skipped (§4.3 step 3).
#[async_trait::async_trait]
pub trait MarketplaceAdapter: std::fmt::Debug + Send + Sync {
    fn can_handle(&self, base_url: &str) -> bool;
    async fn extract(&self, html: &str, base_url: &str) -> anyhow::Result<Option<ExtractionCandidate>>;
}

/// Runs the full `distill` pipeline over a set of extractors, an
/// optional ordered list of marketplace adapters, and an optional
/// policy engine.
pub struct Distiller {
    extractors: Vec<Arc<dyn Extractor>>,
    adapters: Vec<Arc<dyn MarketplaceAdapter>>,
    policy: Option<Arc<dyn PolicyEngine>>,
    ensemble: ExtractionEnsemble,
    confidence: ConfidenceScorer,
}

impl Distiller {
    pub fn new(extractors: Vec<Arc<dyn Extractor>>) -> Self {
        Self {
            extractors,
            adapters: Vec::new(),
            policy: None,
            ensemble: ExtractionEnsemble::new(),
            confidence: ConfidenceScorer::new(),
        }
    }

    pub fn with_adapters(mut self, adapters: Vec<Arc<dyn MarketplaceAdapter>>) -> Self {
        self.adapters = adapters;
        self
    }

    pub fn with_policy_engine(mut self, policy: Arc<dyn PolicyEngine>) -> Self {
        self.policy = Some(policy);
        self
    }

    fn content_hash(html: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(html.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Step 6: build ordered `DistilledNode`s from the winning
    /// candidate, attaching a best-effort `SourceSpan` when the node's
    /// text can be located verbatim in the raw HTML.
    fn build_nodes(candidate: &ExtractionCandidate, raw_html: &str) -> Vec<DistilledNode> {
        let mut order = 0u32;
        let mut nodes = Vec::new();

        if !candidate.title.trim().is_empty() {
            nodes.push(DistilledNode {
                id: uuid::Uuid::new_v4().to_string(),
                order,
                node_type: NodeType::Heading,
                text: candidate.title.clone(),
                source_spans: Self::locate(&candidate.title, raw_html),
            });
            order += 1;
        }

        for paragraph in candidate.content.split("\n\n").filter(|p| !p.trim().is_empty()) {
            nodes.push(DistilledNode {
                id: uuid::Uuid::new_v4().to_string(),
                order,
                node_type: NodeType::Paragraph,
                text: paragraph.to_string(),
                source_spans: Self::locate(paragraph, raw_html),
            });
            order += 1;
        }

        nodes
    }

    /// Locate `text` verbatim inside `raw_html`, returning a single
    /// byte-offset `SourceSpan` when found. Best-effort only: markup
    /// stripping and whitespace normalization mean most paragraphs
    /// will not appear byte-for-byte in the source (§4.3 step 6,
    /// SPEC_FULL "source span location").
    fn locate(text: &str, raw_html: &str) -> Option<Vec<riptide_types::model::SourceSpan>> {
        let start = raw_html.find(text)?;
        Some(vec![riptide_types::model::SourceSpan {
            url: String::new(),
            timestamp: chrono::Utc::now(),
            content_hash: Self::content_hash(raw_html),
            byte_start: start,
            byte_end: start + text.len(),
            selector: None,
        }])
    }

    /// Appends raw `<p>` text from `raw_html` to `candidate` until it
    /// clears the completeness guard's threshold (§4.1 "If none does,
    /// paragraphs from a DOM fallback are appended until the threshold
    /// is met"). Paragraphs already present verbatim in the candidate's
    /// content are skipped to avoid duplication.
    fn append_dom_fallback_paragraphs(candidate: &mut ExtractionCandidate, raw_html: &str) {
        let document = Html::parse_document(raw_html);
        let Ok(selector) = Selector::parse("p") else {
            return;
        };

        for element in document.select(&selector) {
            if ExtractionEnsemble::is_below_threshold(candidate) {
                let text = element.text().collect::<String>().trim().to_string();
                if text.is_empty() || candidate.content.contains(&text) {
                    continue;
                }
                if !candidate.content.is_empty() {
                    candidate.content.push_str("\n\n");
                }
                candidate.content.push_str(&text);
                candidate.paragraph_count += 1;
            } else {
                break;
            }
        }
    }

    /// Builds a fallback `DistillationResult` from raw `<p>` text when
    /// no extractor produced a usable candidate (§4.3 step 5).
    fn fallback_result(raw_html: &str, content_hash: &str) -> DistillationResult {
        let document = Html::parse_document(raw_html);
        let paragraphs: Vec<String> = Selector::parse("p")
            .ok()
            .map(|selector| {
                document
                    .select(&selector)
                    .map(|el| el.text().collect::<String>().trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let content_text = paragraphs.join("\n\n");
        let nodes = paragraphs
            .iter()
            .enumerate()
            .map(|(i, text)| DistilledNode {
                id: uuid::Uuid::new_v4().to_string(),
                order: i as u32,
                node_type: NodeType::Paragraph,
                text: text.clone(),
                source_spans: None,
            })
            .collect();

        DistillationResult::new(
            nodes,
            content_text,
            content_hash.to_string(),
            true,
            ExtractionMethod::Fallback,
            FALLBACK_CONFIDENCE,
            None,
            None,
            None,
            None,
        )
    }

    /// `distill(html, baseURL, policyHint?) -> DistillationResult`
    /// (§4.3). Never fails except on a programmer error in the HTML
    /// parser itself; all domain-level failures degrade to a
    /// well-formed low-confidence result.
    pub async fn distill(
        &self,
        html: &str,
        base_url: &str,
        policy_hint: Option<&str>,
    ) -> anyhow::Result<DistillationResult> {
        // Step 1.
        let content_hash = Self::content_hash(html);

        // Step 2: policy transforms, non-fatal on failure.
        let (working_html, policy_metadata) = match &self.policy {
            Some(policy) => match policy.apply_policy(html, base_url, policy_hint).await {
                Ok(result) => (
                    result.transformed_html,
                    Some(serde_json::json!({
                        "policyApplied": result.policy_applied,
                        "rulesMatched": result.rules_matched,
                        "fieldsValidated": result.fields_validated,
                    })),
                ),
                Err(err) => {
                    warn!(error = %err, "policy transform failed, proceeding with raw html");
                    (html.to_string(), None)
                }
            },
            None => (html.to_string(), None),
        };

        // Step 3: marketplace adapters, first match wins outright.
        for adapter in &self.adapters {
            if !adapter.can_handle(base_url) {
                continue;
            }
            match adapter.extract(&working_html, base_url).await {
                Ok(Some(candidate)) => {
                    debug!(adapter = %candidate.method, "marketplace adapter matched");
                    let nodes = Self::build_nodes(&candidate, &working_html);
                    let confidence_breakdown = self.confidence.compute_full(
                        &candidate,
                        &ExtractionEnsemble::new().select_best(vec![candidate.clone()]).score,
                        std::slice::from_ref(&candidate),
                        base_url,
                    );
                    return Ok(DistillationResult::new(
                        nodes,
                        candidate.content.clone(),
                        content_hash,
                        false,
                        candidate.method,
                        confidence_breakdown.overall,
                        Some(confidence_breakdown),
                        policy_metadata,
                        None,
                        None,
                    ));
                }
                Ok(None) => {}
                Err(err) => warn!(error = %err, "marketplace adapter failed, trying next"),
            }
        }

        // Step 4: run every extractor concurrently, tolerate failure.
        let futures = self
            .extractors
            .iter()
            .map(|extractor| {
                let extractor = Arc::clone(extractor);
                let html = working_html.clone();
                let base_url = base_url.to_string();
                async move {
                    match extractor.extract(&html, &base_url).await {
                        Ok(candidate) => candidate,
                        Err(err) => {
                            warn!(extractor = extractor.name(), error = %err, "extractor failed");
                            None
                        }
                    }
                }
            })
            .collect::<Vec<_>>();

        let candidates: Vec<ExtractionCandidate> =
            join_all(futures).await.into_iter().flatten().collect();

        // Step 5: nothing survived, fall back to raw DOM paragraphs.
        if candidates.is_empty() {
            debug!("no extractor candidates, using fallback path");
            return Ok(Self::fallback_result(&working_html, &content_hash));
        }

        // Step 6: ensemble-select (the ensemble itself applies the
        // completeness guard). If no candidate cleared the threshold,
        // append raw DOM paragraphs to the winner until it does (§4.1
        // "paragraphs from a DOM fallback are appended until the
        // threshold is met").
        let mut selection = self.ensemble.select_best(candidates.clone());
        if selection.needs_dom_fallback {
            Self::append_dom_fallback_paragraphs(&mut selection.selected, &working_html);
        }
        let nodes = Self::build_nodes(&selection.selected, &working_html);

        // Step 7: confidence breakdown plus structured metadata/tables
        // from a fresh DOM parse, never fatal on failure.
        let confidence_breakdown = self.confidence.compute_full(
            &selection.selected,
            &selection.score,
            &candidates,
            base_url,
        );

        let fresh_document = Html::parse_document(&working_html);
        let structured_metadata = {
            let extracted = MetadataExtractor::extract_structured_metadata(&fresh_document);
            if extracted.is_empty() {
                None
            } else {
                Some(extracted)
            }
        };
        let tables = {
            let extracted = TableExtractor::extract_tables(&fresh_document);
            if extracted.is_empty() {
                None
            } else {
                Some(extracted)
            }
        };

        Ok(DistillationResult::new(
            nodes,
            selection.selected.content.clone(),
            content_hash,
            false,
            selection.selected.method,
            confidence_breakdown.overall,
            Some(confidence_breakdown),
            policy_metadata,
            structured_metadata,
            tables,
        ))
    }
}

impl std::fmt::Debug for Distiller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Distiller")
            .field("extractors", &self.extractors.len())
            .field("adapters", &self.adapters.len())
            .field("has_policy_engine", &self.policy.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::{DomHeuristicExtractor, FallbackExtractor, ReadabilityExtractor};

    fn default_distiller() -> Distiller {
        Distiller::new(vec![
            Arc::new(ReadabilityExtractor::new()),
            Arc::new(DomHeuristicExtractor::new()),
            Arc::new(FallbackExtractor::new()),
        ])
    }

    #[tokio::test]
    async fn content_hash_is_deterministic() {
        let html = "<html><body><article><p>a paragraph.</p></article></body></html>";
        let distiller = default_distiller();
        let a = distiller.distill(html, "https://example.com", None).await.unwrap();
        let b = distiller.distill(html, "https://example.com", None).await.unwrap();
        assert_eq!(a.content_hash, b.content_hash);
    }

    #[tokio::test]
    async fn no_extractors_configured_uses_fallback_path() {
        let distiller = Distiller::new(vec![]);
        let html = "<html><body><p>Just some raw paragraph text here.</p></body></html>";
        let result = distiller.distill(html, "https://example.com", None).await.unwrap();
        assert!(result.fallback_used);
        assert_eq!(result.extraction_method, ExtractionMethod::Fallback);
        assert!((result.extraction_confidence - FALLBACK_CONFIDENCE).abs() < 1e-9);
    }

    #[tokio::test]
    async fn structured_content_produces_high_confidence_result() {
        let html = r#"
            <html><head>
                <title>Headline</title>
                <meta name="author" content="Jane Doe">
                <meta name="description" content="A short summary of the piece.">
            </head><body>
                <article>
                    <h1>Headline</h1>
                    <p>This article has a meaningful first paragraph of real prose content.</p>
                    <p>It continues with a second paragraph that keeps developing the idea.</p>
                    <p>And wraps up with a third paragraph to clear the completeness guard.</p>
                </article>
            </body></html>
        "#;
        let distiller = default_distiller();
        let result = distiller.distill(html, "https://example.com", None).await.unwrap();
        assert!(!result.fallback_used);
        assert!(result.extraction_confidence > FALLBACK_CONFIDENCE);
        assert_eq!(result.content_length, result.content_text.chars().count());
    }

    #[tokio::test]
    async fn completeness_guard_appends_dom_paragraphs_when_no_candidate_qualifies() {
        // No FallbackExtractor here: both remaining extractors only look
        // inside content containers, so the stray paragraphs sitting
        // directly under <body> are invisible to every candidate. The
        // winning candidate alone is below threshold (2 paragraphs,
        // well under 300 chars), so the DOM-fallback append must kick in.
        let distiller = Distiller::new(vec![
            Arc::new(ReadabilityExtractor::new()),
            Arc::new(DomHeuristicExtractor::new()),
        ]);
        let html = r#"
            <html><body>
                <article>
                    <p>Short first line in the article.</p>
                    <p>Short second line in the article.</p>
                </article>
                <p>A stray paragraph sitting outside the article container entirely.</p>
                <p>Another stray paragraph outside the article, also invisible to both extractors.</p>
                <p>A third stray paragraph, long enough on its own to push the total length well past the three hundred character completeness threshold once combined with the others above.</p>
            </body></html>
        "#;

        let result = distiller.distill(html, "https://example.com", None).await.unwrap();

        assert!(!result.fallback_used);
        assert!(result.content_length >= 300);
        assert!(result.content_text.contains("stray paragraph"));
    }

    #[tokio::test]
    async fn node_order_is_dense_and_sequential() {
        let html = r#"
            <html><body><article>
                <h1>Title</h1>
                <p>One.</p>
                <p>Two.</p>
            </article></body></html>
        "#;
        let distiller = default_distiller();
        let result = distiller.distill(html, "https://example.com", None).await.unwrap();
        let orders: Vec<u32> = result.nodes.iter().map(|n| n.order).collect();
        let expected: Vec<u32> = (0..orders.len() as u32).collect();
        assert_eq!(orders, expected);
    }
}
