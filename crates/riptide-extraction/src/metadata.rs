//! Structured metadata extraction: JSON-LD, Open Graph, Twitter Card and
//! microdata blocks, plus the simpler byline/date/description helpers the
//! extractors use to populate `ExtractionMetadata`.

use riptide_types::model::{ExtractionMetadata, StructuredMetadata};
use scraper::{Html, Selector};
use serde_json::Value;
use std::collections::HashMap;

pub struct MetadataExtractor;

impl MetadataExtractor {
    pub fn extract_byline(document: &Html) -> Option<String> {
        if let Some(author) = Self::extract_meta_author(document) {
            return Some(author);
        }
        if let Some(author) = Self::extract_schema_author(document) {
            return Some(author);
        }
        Self::extract_byline_from_selectors(document)
    }

    pub fn extract_published_date(document: &Html) -> Option<String> {
        if let Some(date) = Self::extract_meta_date(document) {
            return Some(date);
        }
        if let Some(date) = Self::extract_schema_date(document) {
            return Some(date);
        }
        Self::extract_time_element(document)
    }

    pub fn extract_description(document: &Html) -> Option<String> {
        if let Some(desc) = Self::extract_og_description(document) {
            return Some(desc);
        }
        if let Some(desc) = Self::extract_twitter_description(document) {
            return Some(desc);
        }
        Self::extract_meta_description(document)
    }

    pub fn extract_extraction_metadata(document: &Html) -> ExtractionMetadata {
        ExtractionMetadata {
            author: Self::extract_byline(document),
            publish_date: Self::extract_published_date(document),
            excerpt: Self::extract_description(document),
        }
    }

    fn extract_meta_author(document: &Html) -> Option<String> {
        let selectors = [
            "meta[name='author']",
            "meta[property='article:author']",
            "meta[name='twitter:creator']",
        ];
        Self::first_meta_content(document, &selectors)
    }

    fn extract_schema_author(document: &Html) -> Option<String> {
        let selector = Selector::parse("[itemprop='author']").ok()?;
        let author: String = document.select(&selector).next()?.text().collect();
        clean(author)
    }

    fn extract_byline_from_selectors(document: &Html) -> Option<String> {
        let selectors = [".author", ".byline", "[rel='author']", ".author-name", ".post-author"];
        for selector_str in &selectors {
            if let Ok(selector) = Selector::parse(selector_str) {
                if let Some(element) = document.select(&selector).next() {
                    let text: String = element.text().collect();
                    if let Some(cleaned) = clean(text) {
                        return Some(cleaned);
                    }
                }
            }
        }
        None
    }

    fn extract_meta_date(document: &Html) -> Option<String> {
        let selectors = [
            "meta[property='article:published_time']",
            "meta[name='date']",
            "meta[name='publication_date']",
            "meta[property='og:published_time']",
        ];
        Self::first_meta_content(document, &selectors)
    }

    fn extract_schema_date(document: &Html) -> Option<String> {
        let selector = Selector::parse("[itemprop='datePublished']").ok()?;
        let element = document.select(&selector).next()?;
        if let Some(datetime) = element.value().attr("datetime") {
            return clean(datetime.to_string());
        }
        let date: String = element.text().collect();
        clean(date)
    }

    fn extract_time_element(document: &Html) -> Option<String> {
        let selector = Selector::parse("time[datetime]").ok()?;
        document
            .select(&selector)
            .next()?
            .value()
            .attr("datetime")
            .and_then(|s| clean(s.to_string()))
    }

    fn extract_og_description(document: &Html) -> Option<String> {
        Self::first_meta_content(document, &["meta[property='og:description']"])
    }

    fn extract_twitter_description(document: &Html) -> Option<String> {
        Self::first_meta_content(document, &["meta[name='twitter:description']"])
    }

    fn extract_meta_description(document: &Html) -> Option<String> {
        Self::first_meta_content(document, &["meta[name='description']"])
    }

    fn first_meta_content(document: &Html, selectors: &[&str]) -> Option<String> {
        for selector_str in selectors {
            if let Ok(selector) = Selector::parse(selector_str) {
                if let Some(element) = document.select(&selector).next() {
                    if let Some(content) = element.value().attr("content") {
                        if let Some(cleaned) = clean(content.to_string()) {
                            return Some(cleaned);
                        }
                    }
                }
            }
        }
        None
    }

    /// Open Graph `og:*` meta properties, keyed without the `og:` prefix.
    pub fn extract_open_graph(document: &Html) -> HashMap<String, String> {
        let mut out = HashMap::new();
        if let Ok(selector) = Selector::parse("meta[property^='og:']") {
            for el in document.select(&selector) {
                let (Some(property), Some(content)) =
                    (el.value().attr("property"), el.value().attr("content"))
                else {
                    continue;
                };
                if let Some(key) = property.strip_prefix("og:") {
                    out.insert(key.to_string(), content.to_string());
                }
            }
        }
        out
    }

    /// Twitter Card `twitter:*` meta tags, keyed without the prefix.
    pub fn extract_twitter_card(document: &Html) -> HashMap<String, String> {
        let mut out = HashMap::new();
        if let Ok(selector) = Selector::parse("meta[name^='twitter:']") {
            for el in document.select(&selector) {
                let (Some(name), Some(content)) =
                    (el.value().attr("name"), el.value().attr("content"))
                else {
                    continue;
                };
                if let Some(key) = name.strip_prefix("twitter:") {
                    out.insert(key.to_string(), content.to_string());
                }
            }
        }
        out
    }

    /// `<script type="application/ld+json">` blocks, parsed as JSON.
    /// Malformed blocks are skipped rather than failing the whole
    /// extraction.
    pub fn extract_json_ld(document: &Html) -> Vec<Value> {
        let Ok(selector) = Selector::parse("script[type='application/ld+json']") else {
            return Vec::new();
        };
        document
            .select(&selector)
            .filter_map(|el| {
                let text: String = el.text().collect();
                serde_json::from_str::<Value>(text.trim()).ok()
            })
            .collect()
    }

    /// Top-level `itemprop`/`itemtype` microdata pairs, flattened into a
    /// single map (nested `itemscope` blocks are not recursed into,
    /// matching the extractor's "best effort, not a full RDFa parser"
    /// scope).
    pub fn extract_microdata(document: &Html) -> HashMap<String, String> {
        let mut out = HashMap::new();
        if let Ok(selector) = Selector::parse("[itemprop]") {
            for el in document.select(&selector) {
                let Some(prop) = el.value().attr("itemprop") else {
                    continue;
                };
                let value = el
                    .value()
                    .attr("content")
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| el.text().collect::<String>());
                if let Some(cleaned) = clean(value) {
                    out.insert(prop.to_string(), cleaned);
                }
            }
        }
        out
    }

    pub fn extract_structured_metadata(document: &Html) -> StructuredMetadata {
        let microdata = Self::extract_microdata(document)
            .into_iter()
            .map(|(prop, value)| serde_json::json!({ "itemprop": prop, "value": value }))
            .collect();

        StructuredMetadata {
            json_ld: Self::extract_json_ld(document),
            open_graph: Self::extract_open_graph(document),
            twitter_card: Self::extract_twitter_card(document),
            microdata,
        }
    }
}

fn clean(s: String) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_og_and_twitter_metadata() {
        let html = r#"
            <html><head>
                <meta property="og:title" content="Hello">
                <meta property="og:site_name" content="Example">
                <meta name="twitter:description" content="A tweet-sized summary">
            </head><body></body></html>
        "#;
        let document = Html::parse_document(html);
        let og = MetadataExtractor::extract_open_graph(&document);
        assert_eq!(og.get("title").map(String::as_str), Some("Hello"));
        assert_eq!(
            MetadataExtractor::extract_description(&document).as_deref(),
            Some("A tweet-sized summary")
        );
    }

    #[test]
    fn extracts_json_ld_block() {
        let html = r#"
            <html><head>
                <script type="application/ld+json">{"@type":"Article","headline":"X"}</script>
            </head><body></body></html>
        "#;
        let document = Html::parse_document(html);
        let blocks = MetadataExtractor::extract_json_ld(&document);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0]["headline"], "X");
    }

    #[test]
    fn malformed_json_ld_is_skipped_not_fatal() {
        let html = r#"<script type="application/ld+json">{not valid json</script>"#;
        let document = Html::parse_document(html);
        assert!(MetadataExtractor::extract_json_ld(&document).is_empty());
    }

    #[test]
    fn byline_falls_back_to_selector_when_no_meta_present() {
        let html = r#"<html><body><span class="author">Jane Doe</span></body></html>"#;
        let document = Html::parse_document(html);
        assert_eq!(
            MetadataExtractor::extract_byline(&document).as_deref(),
            Some("Jane Doe")
        );
    }
}
