use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Derived metrics that can be recomputed from raw document text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    Eps,
    Roe,
    DebtEquity,
    ProfitMargin,
    MarketCap,
    PeRatio,
}

impl MetricKind {
    pub const ALL: [MetricKind; 6] = [
        MetricKind::Eps,
        MetricKind::Roe,
        MetricKind::DebtEquity,
        MetricKind::ProfitMargin,
        MetricKind::MarketCap,
        MetricKind::PeRatio,
    ];

    /// Key used in the metrics record
    pub fn key(&self) -> &'static str {
        match self {
            MetricKind::Eps => "eps",
            MetricKind::Roe => "roe",
            MetricKind::DebtEquity => "debt_equity",
            MetricKind::ProfitMargin => "profit_margin",
            MetricKind::MarketCap => "market_cap",
            MetricKind::PeRatio => "pe_ratio",
        }
    }

    /// Human-readable label for the metric
    pub fn display_name(&self) -> &'static str {
        match self {
            MetricKind::Eps => "EPS",
            MetricKind::Roe => "ROE",
            MetricKind::DebtEquity => "Debt/Equity",
            MetricKind::ProfitMargin => "Profit Margin",
            MetricKind::MarketCap => "Market Cap",
            MetricKind::PeRatio => "P/E Ratio",
        }
    }

    /// Acceptable relative difference before a value stops counting as verified.
    /// Tuned to each metric's typical estimation noise.
    pub fn threshold(&self) -> f64 {
        match self {
            MetricKind::Eps => 0.15,
            MetricKind::Roe => 0.10,
            MetricKind::DebtEquity => 0.15,
            MetricKind::ProfitMargin => 0.10,
            MetricKind::MarketCap => 0.20,
            MetricKind::PeRatio => 0.20,
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.key() == key)
    }
}

/// Qualitative trust label for a single verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Confidence {
    High,
    Medium,
    Low,
    Unknown,
}

impl Confidence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Confidence::High => "HIGH",
            Confidence::Medium => "MEDIUM",
            Confidence::Low => "LOW",
            Confidence::Unknown => "UNKNOWN",
        }
    }
}

/// Outcome of comparing a model value against its recomputed counterpart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationStatus {
    Verified,
    Close,
    Mismatch,
    Unchecked,
    Error,
}

impl ValidationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationStatus::Verified => "VERIFIED",
            ValidationStatus::Close => "CLOSE",
            ValidationStatus::Mismatch => "MISMATCH",
            ValidationStatus::Unchecked => "UNCHECKED",
            ValidationStatus::Error => "ERROR",
        }
    }
}

/// Verdict for one metric in one validation pass
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    pub metric: String,
    /// Value exactly as the model supplied it
    pub ai_value: Value,
    pub calculated_value: Option<f64>,
    pub confidence: Confidence,
    pub status: ValidationStatus,
    pub message: String,
    #[serde(default)]
    pub calculation_details: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationSummary {
    pub verified: usize,
    pub close: usize,
    pub mismatch: usize,
    pub unchecked: usize,
    /// Values that could not be parsed at all (also counted in `unchecked`)
    #[serde(default)]
    pub error: usize,
}

impl ValidationSummary {
    /// Verdicts backed by an actual comparison
    pub fn checked(&self) -> usize {
        self.verified + self.close + self.mismatch
    }
}

/// Document-level roll-up of every per-metric verdict
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    pub overall_confidence: Confidence,
    pub validations: BTreeMap<String, ValidationResult>,
    pub summary: ValidationSummary,
    pub generated_at: DateTime<Utc>,
}

/// Fixed risk categories shown on the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskCategory {
    Liquidity,
    Market,
    Credit,
    Governance,
}

impl RiskCategory {
    pub const ALL: [RiskCategory; 4] = [
        RiskCategory::Liquidity,
        RiskCategory::Market,
        RiskCategory::Credit,
        RiskCategory::Governance,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            RiskCategory::Liquidity => "liquidity",
            RiskCategory::Market => "market",
            RiskCategory::Credit => "credit",
            RiskCategory::Governance => "governance",
        }
    }

    /// Top-level record key holding the 0-100 score
    pub fn risk_key(&self) -> &'static str {
        match self {
            RiskCategory::Liquidity => "liquidity_risk",
            RiskCategory::Market => "market_risk",
            RiskCategory::Credit => "credit_risk",
            RiskCategory::Governance => "governance_risk",
        }
    }
}

/// Normalized detail for one risk category. `score` always mirrors the
/// top-level `<category>_risk` field of the record it lives in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskCategoryDetail {
    pub score: i64,
    pub factors: Vec<String>,
    pub summary: String,
    pub industry_avg: Value,
    pub trend: String,
    pub critical_red_flags: Option<Value>,
}

/// Reference scores used for the comparison radar chart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectorBenchmarks {
    pub liquidity: i64,
    pub market: i64,
    pub credit: i64,
    pub governance: i64,
}

impl Default for SectorBenchmarks {
    fn default() -> Self {
        Self {
            liquidity: 30,
            market: 45,
            credit: 25,
            governance: 40,
        }
    }
}

/// Merged metrics output: metric values keyed by name plus `<key>_status` /
/// `<key>_confidence` sidecars, `risk_details`, `sector_benchmarks` and
/// `_validation`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetricsRecord(pub Map<String, Value>);

impl MetricsRecord {
    pub fn new() -> Self {
        Self(Map::new())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(key.into(), value)
    }

    pub fn status_of(&self, key: &str) -> Option<&str> {
        self.0.get(&status_key(key)).and_then(|v| v.as_str())
    }

    /// Record a provenance verdict for `key` in its sidecar fields
    pub fn set_provenance(&mut self, key: &str, status: ValidationStatus, confidence: Confidence) {
        self.0.insert(status_key(key), Value::from(status.as_str()));
        self.0.insert(confidence_key(key), Value::from(confidence.as_str()));
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for MetricsRecord {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

pub fn status_key(key: &str) -> String {
    format!("{}_status", key)
}

pub fn confidence_key(key: &str) -> String {
    format!("{}_confidence", key)
}
