//! DOM-heuristic extractor: picks the densest content container by a
//! simple text/tag-count heuristic, the "no ML, no network, always
//! available" baseline extractor.

use crate::metadata::MetadataExtractor;
use async_trait::async_trait;
use riptide_types::model::{ExtractionCandidate, ExtractionMethod};
use riptide_types::ports::Extractor;
use scraper::{ElementRef, Html, Selector};

const CONTENT_CONTAINER_SELECTORS: &[&str] = &[
    "article",
    "main",
    "[role='main']",
    ".article-content",
    ".post-content",
    "#content",
];

#[derive(Debug, Default)]
pub struct DomHeuristicExtractor;

impl DomHeuristicExtractor {
    pub fn new() -> Self {
        Self
    }

    fn pick_container<'a>(document: &'a Html) -> Option<ElementRef<'a>> {
        for selector_str in CONTENT_CONTAINER_SELECTORS {
            if let Ok(selector) = Selector::parse(selector_str) {
                if let Some(el) = document.select(&selector).next() {
                    return Some(el);
                }
            }
        }
        None
    }

    fn extract_title(document: &Html) -> String {
        if let Ok(selector) = Selector::parse("h1") {
            if let Some(el) = document.select(&selector).next() {
                let text: String = el.text().collect::<String>().trim().to_string();
                if !text.is_empty() {
                    return text;
                }
            }
        }
        if let Ok(selector) = Selector::parse("title") {
            if let Some(el) = document.select(&selector).next() {
                return el.text().collect::<String>().trim().to_string();
            }
        }
        String::new()
    }

    fn paragraphs_in(container: ElementRef) -> Vec<String> {
        let Ok(selector) = Selector::parse("p") else {
            return Vec::new();
        };
        container
            .select(&selector)
            .map(|el| el.text().collect::<String>().trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

#[async_trait]
impl Extractor for DomHeuristicExtractor {
    fn name(&self) -> &str {
        "dom-heuristic"
    }

    async fn extract(
        &self,
        html: &str,
        _base_url: &str,
    ) -> anyhow::Result<Option<ExtractionCandidate>> {
        let document = Html::parse_document(html);

        let Some(container) = Self::pick_container(&document) else {
            return Ok(None);
        };

        let paragraphs = Self::paragraphs_in(container);
        if paragraphs.is_empty() {
            return Ok(None);
        }

        let content = paragraphs.join("\n\n");
        let title = Self::extract_title(&document);
        let metadata = MetadataExtractor::extract_extraction_metadata(&document);

        Ok(Some(ExtractionCandidate {
            method: ExtractionMethod::DomHeuristic,
            title,
            content,
            paragraph_count: paragraphs.len(),
            confidence: 0.0,
            metadata,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn extracts_paragraphs_from_article_tag() {
        let html = r#"
            <html><body>
                <article>
                    <h1>Headline</h1>
                    <p>First paragraph with enough words to matter here.</p>
                    <p>Second paragraph continuing the story along nicely.</p>
                </article>
            </body></html>
        "#;
        let extractor = DomHeuristicExtractor::new();
        let candidate = extractor.extract(html, "https://example.com").await.unwrap().unwrap();
        assert_eq!(candidate.method, ExtractionMethod::DomHeuristic);
        assert_eq!(candidate.paragraph_count, 2);
        assert_eq!(candidate.title, "Headline");
    }

    #[tokio::test]
    async fn returns_none_when_no_container_found() {
        let html = "<html><body><div>no structure here</div></body></html>";
        let extractor = DomHeuristicExtractor::new();
        let candidate = extractor.extract(html, "https://example.com").await.unwrap();
        assert!(candidate.is_none());
    }
}
