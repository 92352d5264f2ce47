//! Confidence scoring: combines the ensemble's extraction subscore with
//! content-quality, metadata, source-credibility and consensus signals
//! into a single overall confidence value (component D).

use riptide_types::model::{ConfidenceBreakdown, ExtractionCandidate, ExtractionScore};

/// Domains considered credible by default. A deployment without
/// deeper reputation data falls back to this allowlist plus a
/// scheme check (https scores higher than http).
const TRUSTED_TLDS: &[&str] = &[".gov", ".edu"];

/// Computes `ConfidenceBreakdown` values from an ensemble selection,
/// the raw HTML length, and (optionally) how many extractors agreed
/// on roughly the same content.
#[derive(Debug, Default)]
pub struct ConfidenceScorer;

impl ConfidenceScorer {
    pub fn new() -> Self {
        Self
    }

    /// Content-quality subscore: rewards paragraph density and
    /// penalizes a candidate that is mostly boilerplate (very short
    /// paragraphs, or a handful of very long ones with no structure).
    pub fn compute_content_quality(candidate: &ExtractionCandidate) -> f64 {
        if candidate.paragraph_count == 0 {
            return 0.0;
        }
        let avg_paragraph_len =
            candidate.content_length() as f64 / candidate.paragraph_count as f64;

        // Comfortable paragraph length is ~40-600 chars; outside that
        // range quality tapers off in both directions.
        let length_quality = if avg_paragraph_len < 40.0 {
            (avg_paragraph_len / 40.0).clamp(0.0, 1.0)
        } else if avg_paragraph_len > 600.0 {
            (600.0 / avg_paragraph_len).clamp(0.0, 1.0)
        } else {
            1.0
        };

        let density_quality = (candidate.paragraph_count as f64 / 6.0).min(1.0);

        (0.6 * length_quality + 0.4 * density_quality).clamp(0.0, 1.0)
    }

    /// Source-credibility subscore from the URL alone: scheme and a
    /// small trusted-TLD allowlist.
    pub fn compute_source_credibility(source_url: &str) -> f64 {
        let mut score: f64 = 0.5;
        if source_url.starts_with("https://") {
            score += 0.3;
        }
        if TRUSTED_TLDS.iter().any(|tld| source_url.contains(tld)) {
            score += 0.2;
        }
        score.clamp(0.0, 1.0)
    }

    /// Consensus subscore: the fraction of extractors (out of the
    /// total that ran) whose output the ensemble judged "roughly
    /// similar" to the winner, approximated here by paragraph-count
    /// agreement within a 20% band.
    pub fn compute_consensus(winner: &ExtractionCandidate, all: &[ExtractionCandidate]) -> f64 {
        if all.len() <= 1 {
            return 0.5;
        }
        let winner_paragraphs = winner.paragraph_count.max(1) as f64;
        let agreeing = all
            .iter()
            .filter(|c| {
                let ratio = c.paragraph_count.max(1) as f64 / winner_paragraphs;
                (0.8..=1.25).contains(&ratio)
            })
            .count();
        (agreeing as f64 / all.len() as f64).clamp(0.0, 1.0)
    }

    /// Full `ConfidenceBreakdown` for the winning candidate, given its
    /// ensemble score, the whole candidate set (for consensus), and
    /// the URL the content came from.
    pub fn compute_full(
        &self,
        winner: &ExtractionCandidate,
        ensemble_score: &ExtractionScore,
        all_candidates: &[ExtractionCandidate],
        source_url: &str,
    ) -> ConfidenceBreakdown {
        let content_quality = Self::compute_content_quality(winner);
        let source_credibility = Self::compute_source_credibility(source_url);
        let consensus = Self::compute_consensus(winner, all_candidates);
        let metadata = winner.metadata.completeness();

        ConfidenceBreakdown::compute(
            ensemble_score.composite_score,
            content_quality,
            metadata,
            source_credibility,
            consensus,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use riptide_types::model::{ExtractionCandidate, ExtractionMetadata, ExtractionMethod};

    fn candidate(paragraph_count: usize, content: &str) -> ExtractionCandidate {
        ExtractionCandidate {
            method: ExtractionMethod::Readability,
            title: "T".to_string(),
            content: content.to_string(),
            paragraph_count,
            confidence: 0.0,
            metadata: ExtractionMetadata::default(),
        }
    }

    #[test]
    fn zero_paragraphs_yields_zero_content_quality() {
        let c = candidate(0, "");
        assert_eq!(ConfidenceScorer::compute_content_quality(&c), 0.0);
    }

    #[test]
    fn https_gov_url_scores_above_plain_http() {
        let https = ConfidenceScorer::compute_source_credibility("https://example.gov/a");
        let http = ConfidenceScorer::compute_source_credibility("http://example.com/a");
        assert!(https > http);
    }

    #[test]
    fn single_candidate_consensus_is_neutral() {
        let winner = candidate(4, &"word ".repeat(80));
        let all = vec![winner.clone()];
        assert_eq!(ConfidenceScorer::compute_consensus(&winner, &all), 0.5);
    }

    #[test]
    fn agreeing_candidates_raise_consensus() {
        let winner = candidate(5, &"word ".repeat(100));
        let agree = candidate(5, &"word ".repeat(100));
        let disagree = candidate(1, "short");
        let all = vec![winner.clone(), agree, disagree];
        let consensus = ConfidenceScorer::compute_consensus(&winner, &all);
        assert!((consensus - 2.0 / 3.0).abs() < 1e-9);
    }
}
