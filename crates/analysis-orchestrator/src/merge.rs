use analysis_core::{
    is_missing, parse_plain_number, Confidence, MetricsRecord, RiskCategory, ValidationReport,
    ValidationStatus,
};
use serde_json::{Map, Value};

/// Overwrite record values with live data and tag them `VERIFIED`/`HIGH`.
///
/// Absent, null and `"N/A"` live values are skipped. When the snapshot carries
/// risk sub-scores (0-100), `risk_score` becomes their mean on a 0-10 scale.
/// Returns the number of merged keys.
pub fn merge_live_data(record: &mut MetricsRecord, live: &Map<String, Value>) -> usize {
    let mut merged = 0;
    for (key, value) in live {
        if is_missing(value) {
            continue;
        }
        record.insert(key.clone(), value.clone());
        record.set_provenance(key, ValidationStatus::Verified, Confidence::High);
        merged += 1;
    }

    let sub_scores: Vec<f64> = RiskCategory::ALL
        .iter()
        .filter_map(|c| live.get(c.risk_key()))
        .filter_map(parse_plain_number)
        .collect();
    if !sub_scores.is_empty() {
        let mean = sub_scores.iter().sum::<f64>() / sub_scores.len() as f64;
        record.insert("risk_score", Value::from(mean / 10.0));
    }

    tracing::debug!("Merged {} live fields", merged);
    merged
}

/// Write validation verdicts into the record's sidecars and attach the report
/// under `_validation`. Fields already `VERIFIED` (live data) keep their tags.
pub fn apply_validation(record: &mut MetricsRecord, report: &ValidationReport) {
    for (key, result) in &report.validations {
        if record.status_of(key) == Some(ValidationStatus::Verified.as_str()) {
            continue;
        }
        record.set_provenance(key, result.status, result.confidence);
    }

    match serde_json::to_value(report) {
        Ok(value) => {
            record.insert("_validation", value);
        }
        Err(e) => tracing::warn!("Failed to attach validation report: {}", e),
    }
}
