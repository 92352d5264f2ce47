//! Fallback extractor: strips all markup and returns the raw body text.
//! Always succeeds (barring a totally empty document), guaranteeing the
//! ensemble never has to run with zero candidates.

use async_trait::async_trait;
use riptide_types::model::{ExtractionCandidate, ExtractionMetadata, ExtractionMethod};
use riptide_types::ports::Extractor;
use scraper::{Html, Selector};

#[derive(Debug, Default)]
pub struct FallbackExtractor;

impl FallbackExtractor {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Extractor for FallbackExtractor {
    fn name(&self) -> &str {
        "fallback"
    }

    async fn extract(
        &self,
        html: &str,
        _base_url: &str,
    ) -> anyhow::Result<Option<ExtractionCandidate>> {
        let document = Html::parse_document(html);

        let body_selector = Selector::parse("body").map_err(|e| anyhow::anyhow!("{e:?}"))?;
        let text: String = match document.select(&body_selector).next() {
            Some(body) => body.text().collect::<Vec<_>>().join(" "),
            None => document.root_element().text().collect::<Vec<_>>().join(" "),
        };

        let normalized = text.split_whitespace().collect::<Vec<_>>().join(" ");
        if normalized.is_empty() {
            return Ok(None);
        }

        let title_selector = Selector::parse("title").map_err(|e| anyhow::anyhow!("{e:?}"))?;
        let title = document
            .select(&title_selector)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
            .unwrap_or_default();

        // The fallback extractor has no paragraph structure to count;
        // a single "paragraph" stands in for the whole body text.
        Ok(Some(ExtractionCandidate {
            method: ExtractionMethod::Fallback,
            title,
            content: normalized,
            paragraph_count: 1,
            confidence: 0.0,
            metadata: ExtractionMetadata::default(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn extracts_raw_body_text() {
        let html = "<html><head><title>T</title></head><body><div>hello <b>world</b></div></body></html>";
        let extractor = FallbackExtractor::new();
        let candidate = extractor.extract(html, "https://example.com").await.unwrap().unwrap();
        assert_eq!(candidate.content, "hello world");
        assert_eq!(candidate.title, "T");
        assert_eq!(candidate.method, ExtractionMethod::Fallback);
    }

    #[tokio::test]
    async fn empty_body_yields_no_candidate() {
        let extractor = FallbackExtractor::new();
        let candidate = extractor.extract("<html><body></body></html>", "https://example.com").await.unwrap();
        assert!(candidate.is_none());
    }
}
