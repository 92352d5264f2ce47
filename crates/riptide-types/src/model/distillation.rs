//! Distilled document types (§3).

use super::extraction::{ConfidenceBreakdown, ExtractionMethod};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Discriminator for a `DistilledNode`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    Paragraph,
    Heading,
}

/// A byte-range + URL + hash locating a piece of distilled text in the
/// original HTML (§3, GLOSSARY).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceSpan {
    pub url: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub content_hash: String,
    pub byte_start: usize,
    pub byte_end: usize,
    pub selector: Option<String>,
}

/// One ordered unit of distilled content (§3). Orders are dense and start
/// at 0 within a single `DistillationResult`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistilledNode {
    pub id: String,
    pub order: u32,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    pub text: String,
    pub source_spans: Option<Vec<SourceSpan>>,
}

/// Structured metadata recovered from JSON-LD, OpenGraph, Twitter Card and
/// microdata markup (§3 supplement, SPEC_FULL §3).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StructuredMetadata {
    pub json_ld: Vec<serde_json::Value>,
    pub open_graph: HashMap<String, String>,
    pub twitter_card: HashMap<String, String>,
    pub microdata: Vec<serde_json::Value>,
}

impl StructuredMetadata {
    pub fn is_empty(&self) -> bool {
        self.json_ld.is_empty()
            && self.open_graph.is_empty()
            && self.twitter_card.is_empty()
            && self.microdata.is_empty()
    }
}

/// A table extracted from the document (SPEC_FULL §3 supplement).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub caption: Option<String>,
}

/// The result of distilling one HTML document (§3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistillationResult {
    pub nodes: Vec<DistilledNode>,
    pub content_text: String,
    pub content_length: usize,
    /// Hex-encoded SHA-256 of the raw HTML bytes. Deterministic given
    /// identical input.
    pub content_hash: String,
    pub fallback_used: bool,
    pub extraction_method: ExtractionMethod,
    pub extraction_confidence: f64,
    pub confidence_breakdown: Option<ConfidenceBreakdown>,
    pub policy_metadata: Option<serde_json::Value>,
    pub structured_metadata: Option<StructuredMetadata>,
    pub tables: Option<Vec<ExtractedTable>>,
}

impl DistillationResult {
    /// Build from raw parts, enforcing the `contentLength == contentText.length`
    /// invariant (§8) at construction time so it can never drift.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        nodes: Vec<DistilledNode>,
        content_text: String,
        content_hash: String,
        fallback_used: bool,
        extraction_method: ExtractionMethod,
        extraction_confidence: f64,
        confidence_breakdown: Option<ConfidenceBreakdown>,
        policy_metadata: Option<serde_json::Value>,
        structured_metadata: Option<StructuredMetadata>,
        tables: Option<Vec<ExtractedTable>>,
    ) -> Self {
        let content_length = content_text.chars().count();
        Self {
            nodes,
            content_text,
            content_length,
            content_hash,
            fallback_used,
            extraction_method,
            extraction_confidence: extraction_confidence.clamp(0.0, 1.0),
            confidence_breakdown,
            policy_metadata,
            structured_metadata,
            tables,
        }
    }
}
