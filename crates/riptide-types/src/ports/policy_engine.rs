//! Policy Engine port (§6: `ApplyPolicy(html, url, hint?) -> ...`).

use async_trait::async_trait;
use std::fmt::Debug;

/// Result of applying a content policy transform to raw HTML (§6).
#[derive(Debug, Clone)]
pub struct PolicyResult {
    pub transformed_html: String,
    pub policy_applied: Option<String>,
    pub rules_matched: Vec<String>,
    pub fields_validated: Vec<String>,
}

/// Content policy transforms applied before extraction (§4.3 step 2,
/// §6, component "Policy Engine").
#[async_trait]
pub trait PolicyEngine: Debug + Send + Sync {
    async fn apply_policy(
        &self,
        html: &str,
        url: &str,
        hint: Option<&str>,
    ) -> anyhow::Result<PolicyResult>;
}
