//! Extraction ensemble: score candidates, pick the best, explain the pick
//! (§4.1, component C).

use riptide_types::model::{ExtractionCandidate, ExtractionScore, Subscores};

/// Target content length (chars) at which the length subscore saturates
/// at 1.0 (§4.1).
const LENGTH_SATURATION_CHARS: f64 = 2000.0;
/// Target paragraph count at which the paragraph subscore saturates.
const PARAGRAPH_SATURATION_COUNT: f64 = 8.0;

/// Fixed weights for the composite score (§4.1: "Scoring is a weighted
/// sum over normalized subscores").
const WEIGHT_LENGTH: f64 = 0.30;
const WEIGHT_PARAGRAPHS: f64 = 0.25;
const WEIGHT_TITLE: f64 = 0.15;
const WEIGHT_METADATA: f64 = 0.10;
const WEIGHT_METHOD_PRIOR: f64 = 0.20;

/// Completeness-guard thresholds (§4.1).
const MIN_PARAGRAPHS: usize = 3;
const MIN_CONTENT_LENGTH: usize = 300;
const MIN_WORD_COUNT: usize = 80;

/// Result of `selectBest` (§4.1).
#[derive(Debug, Clone)]
pub struct EnsembleSelection {
    pub selected: ExtractionCandidate,
    pub score: ExtractionScore,
    pub explanation: String,
    /// True when, even after the completeness guard ran, `selected` still
    /// fails the `paragraphCount < 3 OR contentLength < 300 OR wordCount <
    /// 80` threshold — the caller (Distiller) must then append DOM
    /// fallback paragraphs itself, since the ensemble has no access to
    /// the raw HTML (§4.1 "If none does, paragraphs from a DOM fallback
    /// are appended until the threshold is met").
    pub needs_dom_fallback: bool,
}

/// Scores and ranks extraction candidates, applying the completeness
/// guard after the initial pick (§4.1, component C).
#[derive(Debug, Default)]
pub struct ExtractionEnsemble;

impl ExtractionEnsemble {
    pub fn new() -> Self {
        Self
    }

    fn score_one(candidate: &ExtractionCandidate) -> ExtractionScore {
        let length = (candidate.content_length() as f64 / LENGTH_SATURATION_CHARS).min(1.0);
        let paragraphs =
            (candidate.paragraph_count as f64 / PARAGRAPH_SATURATION_COUNT).min(1.0);
        let title = if !candidate.title.trim().is_empty() && candidate.title != candidate.content
        {
            1.0
        } else {
            0.0
        };
        let metadata = candidate.metadata.completeness();
        let method_prior = candidate.method.prior();

        let subscores = Subscores {
            length,
            paragraphs,
            title,
            metadata,
            method_prior,
        };

        let composite_score = WEIGHT_LENGTH * length
            + WEIGHT_PARAGRAPHS * paragraphs
            + WEIGHT_TITLE * title
            + WEIGHT_METADATA * metadata
            + WEIGHT_METHOD_PRIOR * method_prior;

        ExtractionScore {
            composite_score: composite_score.clamp(0.0, 1.0),
            subscores,
        }
    }

    /// Compares two (candidate, score) pairs using the documented
    /// tie-break order: composite score, then paragraph count, then
    /// content length, then method prior (§4.1).
    fn better(
        a: &(ExtractionCandidate, ExtractionScore),
        b: &(ExtractionCandidate, ExtractionScore),
    ) -> std::cmp::Ordering {
        a.1.composite_score
            .total_cmp(&b.1.composite_score)
            .then_with(|| a.0.paragraph_count.cmp(&b.0.paragraph_count))
            .then_with(|| a.0.content_length().cmp(&b.0.content_length()))
            .then_with(|| a.0.method.prior().total_cmp(&b.0.method.prior()))
    }

    /// Whether a candidate is "complete enough" per the completeness
    /// guard's threshold (§4.1).
    fn meets_completeness(candidate: &ExtractionCandidate) -> bool {
        candidate.paragraph_count >= MIN_PARAGRAPHS
            || candidate.content_length() >= MIN_CONTENT_LENGTH
    }

    pub(crate) fn is_below_threshold(candidate: &ExtractionCandidate) -> bool {
        candidate.paragraph_count < MIN_PARAGRAPHS
            || candidate.content_length() < MIN_CONTENT_LENGTH
            || candidate.word_count() < MIN_WORD_COUNT
    }

    /// Select the best candidate, then apply the completeness guard
    /// (§4.1). `candidates` must be nonempty; this is checked by the
    /// caller (Distiller), never throws internally.
    pub fn select_best(&self, candidates: Vec<ExtractionCandidate>) -> EnsembleSelection {
        debug_assert!(!candidates.is_empty(), "selectBest requires >=1 candidate");

        let mut scored: Vec<(ExtractionCandidate, ExtractionScore)> = candidates
            .into_iter()
            .map(|c| {
                let score = Self::score_one(&c);
                (c, score)
            })
            .collect();

        scored.sort_by(|a, b| Self::better(a, b).reverse());

        let mut explanation_lines = vec![format!(
            "ranked {} candidate(s) by composite score",
            scored.len()
        )];
        for (candidate, score) in &scored {
            explanation_lines.push(format!(
                "  {} -> composite={:.3} (length={:.2} paragraphs={:.2} title={:.2} metadata={:.2} prior={:.2}), paragraphs={}, chars={}",
                candidate.method,
                score.composite_score,
                score.subscores.length,
                score.subscores.paragraphs,
                score.subscores.title,
                score.subscores.metadata,
                score.subscores.method_prior,
                candidate.paragraph_count,
                candidate.content_length(),
            ));
        }

        let (mut winner, mut winner_score) = scored.remove(0);
        let mut needs_dom_fallback = false;

        if Self::is_below_threshold(&winner) {
            if let Some(pos) = scored.iter().position(|(c, _)| Self::meets_completeness(c)) {
                let (replacement, replacement_score) = scored.remove(pos);
                explanation_lines.push(format!(
                    "completeness guard: replaced {} (below threshold) with {}",
                    winner.method, replacement.method
                ));
                winner = replacement;
                winner_score = replacement_score;
            } else {
                needs_dom_fallback = true;
                explanation_lines.push(
                    "completeness guard: no candidate met the threshold, appending DOM fallback paragraphs"
                        .to_string(),
                );
            }
        }

        EnsembleSelection {
            selected: winner,
            score: winner_score,
            explanation: explanation_lines.join("\n"),
            needs_dom_fallback,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use riptide_types::model::{ExtractionCandidate, ExtractionMetadata, ExtractionMethod};

    fn candidate(
        method: ExtractionMethod,
        content: &str,
        paragraph_count: usize,
        confidence: f64,
    ) -> ExtractionCandidate {
        ExtractionCandidate {
            method,
            title: "Some Title".to_string(),
            content: content.to_string(),
            paragraph_count,
            confidence,
            metadata: ExtractionMetadata::default(),
        }
    }

    #[test]
    fn completeness_guard_prefers_longer_structured_candidate() {
        // §8 scenario 3.
        let a = candidate(ExtractionMethod::Readability, "short", 1, 0.9);
        let b = candidate(
            ExtractionMethod::DomHeuristic,
            &"word ".repeat(100),
            5,
            0.6,
        );

        let ensemble = ExtractionEnsemble::new();
        let selection = ensemble.select_best(vec![a, b]);

        assert_eq!(selection.selected.method, ExtractionMethod::DomHeuristic);
    }

    #[test]
    fn single_candidate_is_always_selected() {
        let a = candidate(ExtractionMethod::Fallback, "x", 0, 0.2);
        let ensemble = ExtractionEnsemble::new();
        let selection = ensemble.select_best(vec![a]);
        assert_eq!(selection.selected.method, ExtractionMethod::Fallback);
    }

    #[test]
    fn ties_break_by_paragraph_count_then_length_then_prior() {
        let long_text = "word ".repeat(500);
        let a = candidate(ExtractionMethod::DomHeuristic, &long_text, 10, 0.5);
        let b = candidate(ExtractionMethod::Readability, &long_text, 12, 0.5);

        let ensemble = ExtractionEnsemble::new();
        let selection = ensemble.select_best(vec![a, b]);
        assert_eq!(selection.selected.method, ExtractionMethod::Readability);
    }
}
