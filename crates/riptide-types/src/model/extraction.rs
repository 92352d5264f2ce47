//! Extraction candidate, scoring and confidence types (§3, §4.1, §4.2).

use serde::{Deserialize, Serialize};

/// Discriminator for the extraction method that produced a candidate.
///
/// `Ollama` and `Trafilatura` name extractors the core treats as external
/// collaborators; only `DomHeuristic`, `Readability` and `Fallback` ship
/// concrete implementations in this crate (see `riptide-extraction`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExtractionMethod {
    Ollama,
    Readability,
    DomHeuristic,
    Trafilatura,
    EbayAdapter,
    EbaySearchAdapter,
    Fallback,
}

impl ExtractionMethod {
    /// Fixed prior used as a tie-break and as the `methodPrior` subscore
    /// (§4.1). Higher is preferred. Readability is the most trusted,
    /// fallback the least.
    pub fn prior(self) -> f64 {
        match self {
            ExtractionMethod::Readability => 1.0,
            ExtractionMethod::Trafilatura => 0.9,
            ExtractionMethod::Ollama => 0.8,
            ExtractionMethod::EbayAdapter => 0.75,
            ExtractionMethod::EbaySearchAdapter => 0.7,
            ExtractionMethod::DomHeuristic => 0.6,
            ExtractionMethod::Fallback => 0.2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ExtractionMethod::Ollama => "ollama",
            ExtractionMethod::Readability => "readability",
            ExtractionMethod::DomHeuristic => "dom-heuristic",
            ExtractionMethod::Trafilatura => "trafilatura",
            ExtractionMethod::EbayAdapter => "ebay-adapter",
            ExtractionMethod::EbaySearchAdapter => "ebay-search-adapter",
            ExtractionMethod::Fallback => "fallback",
        }
    }
}

impl std::fmt::Display for ExtractionMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Optional metadata an extractor may have been able to infer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractionMetadata {
    pub author: Option<String>,
    pub publish_date: Option<String>,
    pub excerpt: Option<String>,
}

impl ExtractionMetadata {
    /// Fraction of {author, publishDate, excerpt} present, in [0,1].
    pub fn completeness(&self) -> f64 {
        let present = [
            self.author.is_some(),
            self.publish_date.is_some(),
            self.excerpt.is_some(),
        ]
        .into_iter()
        .filter(|p| *p)
        .count();
        present as f64 / 3.0
    }
}

/// One extractor's proposal for the distilled content (§3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionCandidate {
    pub method: ExtractionMethod,
    pub title: String,
    pub content: String,
    pub paragraph_count: usize,
    /// Confidence the extractor itself reports, in [0,1].
    pub confidence: f64,
    pub metadata: ExtractionMetadata,
}

impl ExtractionCandidate {
    pub fn content_length(&self) -> usize {
        self.content.chars().count()
    }

    /// Rough word count used by the completeness guard (§4.1).
    pub fn word_count(&self) -> usize {
        self.content.split_whitespace().count()
    }
}

/// Per-dimension subscores computed by the ensemble (§4.1).
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Subscores {
    pub length: f64,
    pub paragraphs: f64,
    pub title: f64,
    pub metadata: f64,
    pub method_prior: f64,
}

/// The ensemble's composite score for one candidate (§3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionScore {
    pub composite_score: f64,
    pub subscores: Subscores,
}

/// Multi-dimensional confidence breakdown (§3, §4.2). Every field is in
/// [0,1]; `overall` is a fixed-weight linear combination of the other five.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ConfidenceBreakdown {
    pub extraction: f64,
    pub content_quality: f64,
    pub metadata: f64,
    pub source_credibility: f64,
    pub consensus: f64,
    pub overall: f64,
}

impl ConfidenceBreakdown {
    /// Documented, fixed weights for `overall` (§4.2). Sum to 1.0.
    pub const WEIGHT_EXTRACTION: f64 = 0.35;
    pub const WEIGHT_CONTENT_QUALITY: f64 = 0.25;
    pub const WEIGHT_METADATA: f64 = 0.15;
    pub const WEIGHT_SOURCE_CREDIBILITY: f64 = 0.15;
    pub const WEIGHT_CONSENSUS: f64 = 0.10;

    pub fn compute(
        extraction: f64,
        content_quality: f64,
        metadata: f64,
        source_credibility: f64,
        consensus: f64,
    ) -> Self {
        let clamp = |v: f64| v.clamp(0.0, 1.0);
        let extraction = clamp(extraction);
        let content_quality = clamp(content_quality);
        let metadata = clamp(metadata);
        let source_credibility = clamp(source_credibility);
        let consensus = clamp(consensus);

        let overall = clamp(
            Self::WEIGHT_EXTRACTION * extraction
                + Self::WEIGHT_CONTENT_QUALITY * content_quality
                + Self::WEIGHT_METADATA * metadata
                + Self::WEIGHT_SOURCE_CREDIBILITY * source_credibility
                + Self::WEIGHT_CONSENSUS * consensus,
        );

        Self {
            extraction,
            content_quality,
            metadata,
            source_credibility,
            consensus,
            overall,
        }
    }
}
