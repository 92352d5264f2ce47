//! Extractor port (§6: `Extract(html, baseURL) -> ExtractionCandidate?`).

use crate::model::ExtractionCandidate;
use async_trait::async_trait;
use std::fmt::Debug;

/// One extraction strategy over an HTML document. Implementations may
/// fail; the Distiller logs and skips on error (§4.3 step 4, §7
/// "Extractor internal failure").
#[async_trait]
pub trait Extractor: Debug + Send + Sync {
    /// Human-readable name, used in logs and in the ensemble explanation.
    fn name(&self) -> &str;

    async fn extract(
        &self,
        html: &str,
        base_url: &str,
    ) -> anyhow::Result<Option<ExtractionCandidate>>;
}
