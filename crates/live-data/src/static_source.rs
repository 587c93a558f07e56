use analysis_core::{AnalysisError, LiveDataSource};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::path::Path;

/// Live source backed by a recorded snapshot (a JSON object on disk or in memory).
/// Every ticker receives the same snapshot.
#[derive(Debug, Clone)]
pub struct StaticSnapshotSource {
    snapshot: Map<String, Value>,
}

impl StaticSnapshotSource {
    pub fn new(snapshot: Map<String, Value>) -> Self {
        Self { snapshot }
    }

    pub fn from_json_str(raw: &str) -> Result<Self> {
        match serde_json::from_str::<Value>(raw).context("Snapshot is not valid JSON")? {
            Value::Object(snapshot) => Ok(Self::new(snapshot)),
            other => anyhow::bail!("Snapshot must be a JSON object, got {}", other),
        }
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read snapshot {}", path.display()))?;
        Self::from_json_str(&raw)
    }

    /// Ticker recorded in the snapshot, if any
    pub fn ticker(&self) -> Option<&str> {
        self.snapshot.get("ticker").and_then(|v| v.as_str())
    }
}

#[async_trait]
impl LiveDataSource for StaticSnapshotSource {
    async fn snapshot(&self, ticker: &str) -> Result<Map<String, Value>, AnalysisError> {
        tracing::debug!("Serving recorded snapshot for {}", ticker);
        Ok(self.snapshot.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_recorded_snapshot() {
        let source = StaticSnapshotSource::from_json_str(r#"{"pe_ratio": 22.4, "beta": "N/A"}"#).unwrap();
        let snapshot = source.snapshot("ACME").await.unwrap();
        assert_eq!(snapshot["pe_ratio"], json!(22.4));
        assert_eq!(snapshot["beta"], json!("N/A"));
        assert_eq!(source.ticker(), None);

        let source = StaticSnapshotSource::from_json_str(r#"{"ticker": "ACME"}"#).unwrap();
        assert_eq!(source.ticker(), Some("ACME"));
    }

    #[test]
    fn test_rejects_non_object() {
        assert!(StaticSnapshotSource::from_json_str("[1, 2]").is_err());
        assert!(StaticSnapshotSource::from_json_str("not json").is_err());
    }
}
