//! Risk-shape normalization.
//!
//! Models and APIs describe the four risk categories in whatever shape they
//! like: `{"Liquidity Risk": {"Score": "45%"}}`, `{"market": 60}`, flat
//! `credit_risk` fields on the record. Everything is folded into one schema:
//! an integer `<category>_risk` on the record plus a `risk_details` entry whose
//! `score` mirrors it.

use analysis_core::{
    parse_plain_number, MetricsRecord, RiskCategory, RiskCategoryDetail, SectorBenchmarks,
    NOT_AVAILABLE,
};
use serde_json::{Map, Value};

const SCORE_KEYS: [&str; 4] = ["score", "Score", "value", "ratio"];
const DEFAULT_FACTOR: &str = "No details provided";
const DEFAULT_SUMMARY: &str = "AI assessment unavailable.";
const DEFAULT_TREND: &str = "neutral";

/// A risk entry as found in the source: a detailed mapping or a bare value.
#[derive(Debug, Clone, Copy)]
pub enum RiskItem<'a> {
    Detailed(&'a Map<String, Value>),
    Scalar(&'a Value),
}

impl<'a> RiskItem<'a> {
    pub fn resolve(value: &'a Value) -> Self {
        match value {
            Value::Object(map) => RiskItem::Detailed(map),
            other => RiskItem::Scalar(other),
        }
    }

    /// Raw score, 0 when nothing usable is present
    pub fn score(&self) -> f64 {
        let raw = match self {
            RiskItem::Detailed(map) => first_truthy(map, &SCORE_KEYS),
            RiskItem::Scalar(value) => Some(*value),
        };
        raw.and_then(parse_plain_number).unwrap_or(0.0)
    }

    fn detail(&self, score: i64) -> RiskCategoryDetail {
        let RiskItem::Detailed(map) = self else {
            return default_detail(score);
        };

        let factors = first_truthy(map, &["factors", "Factors"])
            .map(string_list)
            .filter(|f| !f.is_empty())
            .unwrap_or_else(|| vec![DEFAULT_FACTOR.to_string()]);

        let summary = first_truthy(map, &["summary", "Summary", "alarming_details"])
            .map(display_string)
            .unwrap_or_else(|| DEFAULT_SUMMARY.to_string());

        RiskCategoryDetail {
            score,
            factors,
            summary,
            industry_avg: first_truthy(map, &["industry_avg", "Industry_Avg", "Benchmark"])
                .cloned()
                .unwrap_or_else(|| Value::from(NOT_AVAILABLE)),
            trend: first_truthy(map, &["trend", "Trend"])
                .map(display_string)
                .unwrap_or_else(|| DEFAULT_TREND.to_string()),
            critical_red_flags: first_truthy(map, &["critical_red_flags", "Critical_Red_Flags"])
                .cloned(),
        }
    }
}

fn default_detail(score: i64) -> RiskCategoryDetail {
    RiskCategoryDetail {
        score,
        factors: vec![DEFAULT_FACTOR.to_string()],
        summary: DEFAULT_SUMMARY.to_string(),
        industry_avg: Value::from(NOT_AVAILABLE),
        trend: DEFAULT_TREND.to_string(),
        critical_red_flags: None,
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|v| v != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

fn first_truthy<'a>(map: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|k| map.get(*k))
        .find(|v| is_truthy(v))
}

fn display_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn string_list(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items
            .iter()
            .filter(|v| is_truthy(v))
            .map(display_string)
            .collect(),
        other => vec![display_string(other)],
    }
}

fn clean_key(key: &str) -> String {
    key.to_lowercase().replace(" risk", "").trim().to_string()
}

/// Best source entry for a category: an exact key (`market`, `market_risk`,
/// `Market Risk`) beats a key that merely contains the category name.
pub fn find_risk_item(category: RiskCategory, source: &Map<String, Value>) -> Option<&Value> {
    let target = category.name();
    find_exact_risk_item(category, source).or_else(|| {
        source
            .iter()
            .find(|(k, _)| clean_key(k).contains(target))
            .map(|(_, v)| v)
    })
}

/// Exact-key lookup only. Used when the record itself is the source, where
/// keys like `market_cap` would otherwise match by containment.
pub fn find_exact_risk_item(category: RiskCategory, source: &Map<String, Value>) -> Option<&Value> {
    let exact_keys = [category.name().to_string(), category.risk_key().to_string()];
    source
        .iter()
        .find(|(k, _)| exact_keys.contains(&clean_key(k)))
        .map(|(_, v)| v)
}

/// Normalize a record's risk data in place.
///
/// The source is the record's `risk_details` object, or the record itself when
/// there is none; a flat record only supplies exact category keys. A positive existing `<category>_risk` (usually live data) wins
/// over whatever the source says. Scores land in 0-100 as integers, and running
/// this twice leaves the scores unchanged.
pub fn normalize_risk(record: &mut MetricsRecord) {
    let (source, flat) = match record.get("risk_details") {
        Some(Value::Object(details)) => (details.clone(), false),
        _ => (record.as_map().clone(), true),
    };

    let mut details = Map::new();
    for category in RiskCategory::ALL {
        let item = if flat {
            find_exact_risk_item(category, &source)
        } else {
            find_risk_item(category, &source)
        }
        .map(RiskItem::resolve);
        let extracted = item.map_or(0.0, |i| i.score());
        let existing = record
            .get(category.risk_key())
            .and_then(parse_plain_number)
            .unwrap_or(0.0);

        let final_score = if existing > 0.0 {
            existing
        } else if extracted > 0.0 {
            extracted
        } else {
            0.0
        };
        let score = final_score.clamp(0.0, 100.0) as i64;

        record.insert(category.risk_key(), Value::from(score));

        let detail = match item {
            Some(item) => item.detail(score),
            None => default_detail(score),
        };
        match serde_json::to_value(&detail) {
            Ok(value) => {
                details.insert(category.name().to_string(), value);
            }
            Err(e) => tracing::warn!("Failed to serialize {} risk detail: {}", category.name(), e),
        }
    }

    record.insert("risk_details", Value::Object(details));
    record.insert("sector_benchmarks", sector_benchmarks());
}

pub fn sector_benchmarks() -> Value {
    let b = SectorBenchmarks::default();
    serde_json::json!({
        "liquidity": b.liquidity,
        "market": b.market,
        "credit": b.credit,
        "governance": b.governance,
    })
}
