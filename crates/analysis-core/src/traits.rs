use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::AnalysisError;

/// Opaque language-model capability. Returns free-form text that is expected
/// to contain a JSON object somewhere inside it.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, AnalysisError>;
}

/// Authoritative market-data source keyed by ticker.
///
/// Snapshots use the same keys as the metrics record (`eps`, `pe_ratio`, ...)
/// plus the four 0-100 risk sub-scores (`liquidity_risk`, `market_risk`,
/// `credit_risk`, `governance_risk`).
#[async_trait]
pub trait LiveDataSource: Send + Sync {
    async fn snapshot(&self, ticker: &str) -> Result<Map<String, Value>, AnalysisError>;
}
