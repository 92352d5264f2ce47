//! Readability-style extractor: scores every block-level element by a
//! text-density heuristic (paragraph tags, comma count, link density)
//! and keeps the highest-scoring subtree, in the spirit of Mozilla's
//! Readability algorithm without depending on a DOM-mutation library.

use crate::metadata::MetadataExtractor;
use async_trait::async_trait;
use riptide_types::model::{ExtractionCandidate, ExtractionMethod};
use riptide_types::ports::Extractor;
use scraper::{ElementRef, Html, Selector};

const NEGATIVE_CLASS_HINTS: &[&str] = &[
    "comment", "footer", "nav", "sidebar", "ad", "promo", "share", "related", "popup",
];

#[derive(Debug, Default)]
pub struct ReadabilityExtractor;

impl ReadabilityExtractor {
    pub fn new() -> Self {
        Self
    }

    fn is_boilerplate(el: &ElementRef) -> bool {
        let class = el.value().attr("class").unwrap_or("").to_lowercase();
        let id = el.value().attr("id").unwrap_or("").to_lowercase();
        NEGATIVE_CLASS_HINTS
            .iter()
            .any(|hint| class.contains(hint) || id.contains(hint))
    }

    /// Score a candidate block: paragraph count weighted up, link text
    /// weighted down (high link density usually means navigation).
    fn score_block(el: &ElementRef) -> f64 {
        if Self::is_boilerplate(el) {
            return f64::MIN;
        }

        let text: String = el.text().collect();
        let text_len = text.trim().chars().count() as f64;
        if text_len < 25.0 {
            return f64::MIN;
        }

        let link_selector = Selector::parse("a").unwrap();
        let link_text_len: usize = el
            .select(&link_selector)
            .map(|a| a.text().collect::<String>().chars().count())
            .sum();
        let link_density = if text_len > 0.0 {
            link_text_len as f64 / text_len
        } else {
            1.0
        };

        let comma_count = text.matches(',').count() as f64;
        let paragraph_selector = Selector::parse("p").unwrap();
        let paragraph_count = el.select(&paragraph_selector).count() as f64;

        let density_score = text_len.ln().max(0.0) + comma_count * 0.5 + paragraph_count * 3.0;
        density_score * (1.0 - link_density).max(0.05)
    }

    fn best_block<'a>(document: &'a Html) -> Option<ElementRef<'a>> {
        let selector = Selector::parse("div, section, article, main").ok()?;
        document
            .select(&selector)
            .map(|el| (Self::score_block(&el), el))
            .filter(|(score, _)| score.is_finite() && *score > f64::MIN)
            .max_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, el)| el)
    }

    fn extract_title(document: &Html) -> String {
        for selector_str in ["h1", "title"] {
            if let Ok(selector) = Selector::parse(selector_str) {
                if let Some(el) = document.select(&selector).next() {
                    let text = el.text().collect::<String>().trim().to_string();
                    if !text.is_empty() {
                        return text;
                    }
                }
            }
        }
        String::new()
    }
}

#[async_trait]
impl Extractor for ReadabilityExtractor {
    fn name(&self) -> &str {
        "readability"
    }

    async fn extract(
        &self,
        html: &str,
        _base_url: &str,
    ) -> anyhow::Result<Option<ExtractionCandidate>> {
        let document = Html::parse_document(html);

        let Some(block) = Self::best_block(&document) else {
            return Ok(None);
        };

        let paragraph_selector = Selector::parse("p").unwrap();
        let paragraphs: Vec<String> = block
            .select(&paragraph_selector)
            .map(|el| el.text().collect::<String>().trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let content = if paragraphs.is_empty() {
            block.text().collect::<String>().trim().to_string()
        } else {
            paragraphs.join("\n\n")
        };

        if content.is_empty() {
            return Ok(None);
        }

        let metadata = MetadataExtractor::extract_extraction_metadata(&document);

        Ok(Some(ExtractionCandidate {
            method: ExtractionMethod::Readability,
            title: Self::extract_title(&document),
            content,
            paragraph_count: paragraphs.len().max(1),
            confidence: 0.0,
            metadata,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn prefers_dense_article_over_navigation() {
        let html = r#"
            <html><body>
                <div class="nav"><a href="/a">A</a><a href="/b">B</a><a href="/c">C</a></div>
                <div class="article-body">
                    <p>This is the first substantive paragraph of the article, with real prose.</p>
                    <p>And a second paragraph that continues developing the same idea further.</p>
                </div>
            </body></html>
        "#;
        let extractor = ReadabilityExtractor::new();
        let candidate = extractor.extract(html, "https://example.com").await.unwrap().unwrap();
        assert!(candidate.content.contains("substantive paragraph"));
    }

    #[tokio::test]
    async fn boilerplate_only_page_yields_no_candidate() {
        let html = r#"<html><body><div class="footer">copyright 2020</div></body></html>"#;
        let extractor = ReadabilityExtractor::new();
        let candidate = extractor.extract(html, "https://example.com").await.unwrap();
        assert!(candidate.is_none());
    }
}
