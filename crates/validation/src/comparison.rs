use analysis_core::{parse_metric_value, Confidence, ValidationResult, ValidationStatus};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Ratio above which two values are treated as an order-of-magnitude disagreement
const GROSS_MISMATCH_RATIO: f64 = 10.0;

/// Scale factor tried by the unit rescue (billions reported vs raw units)
const RESCUE_SCALE: f64 = 1e9;

/// Floor for the relative-difference denominator
const MIN_DENOMINATOR: f64 = 0.01;

/// How far an AI value is from the recomputed one
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueDifference {
    pub ai_value: f64,
    pub calculated_value: f64,
    pub absolute_difference: f64,
    pub diff_ratio: f64,
    /// Factor applied to the AI value before comparing (1.0 when no rescue happened)
    pub applied_scale: f64,
}

impl ValueDifference {
    fn between(ai_value: f64, calculated_value: f64, applied_scale: f64) -> Self {
        let scaled = ai_value * applied_scale;
        let absolute_difference = (scaled - calculated_value).abs();
        Self {
            ai_value,
            calculated_value,
            absolute_difference,
            diff_ratio: absolute_difference / calculated_value.abs().max(MIN_DENOMINATOR),
            applied_scale,
        }
    }
}

/// Compares model-supplied metric values against deterministic recomputations.
#[derive(Debug, Clone, Copy, Default)]
pub struct ToleranceComparator;

impl ToleranceComparator {
    pub fn new() -> Self {
        Self
    }

    /// Compare `ai_value` with `calculated_value` and produce a verdict.
    ///
    /// A missing calculated value is not a mismatch: it yields `UNCHECKED`.
    /// Values that cannot be parsed yield `ERROR` for this metric only.
    pub fn validate_metric(
        &self,
        metric_name: &str,
        ai_value: &Value,
        calculated_value: Option<f64>,
        threshold: f64,
    ) -> ValidationResult {
        let mut result = ValidationResult {
            metric: metric_name.to_string(),
            ai_value: ai_value.clone(),
            calculated_value,
            confidence: Confidence::Unknown,
            status: ValidationStatus::Unchecked,
            message: String::new(),
            calculation_details: None,
        };

        let Some(calculated) = calculated_value else {
            result.confidence = Confidence::Medium;
            result.status = ValidationStatus::Unchecked;
            result.message = "Could not calculate - insufficient data in document".to_string();
            return result;
        };

        let ai_numeric = match parse_metric_value(ai_value) {
            Ok(v) => v,
            Err(e) => {
                result.confidence = Confidence::Low;
                result.status = ValidationStatus::Error;
                result.message = format!("Error comparing values: {}", e);
                return result;
            }
        };

        let diff = Self::compare(ai_numeric, calculated, threshold);
        if diff.applied_scale != 1.0 {
            tracing::debug!(
                "{}: unit rescue applied (x{:e}), ratio {:.4}",
                metric_name,
                diff.applied_scale,
                diff.diff_ratio
            );
        }

        let (status, confidence) = Self::verdict(diff.diff_ratio, threshold);
        result.status = status;
        result.confidence = confidence;
        result.message = match status {
            ValidationStatus::Verified => format!(
                "Values match (difference: {:.1}%)",
                diff.diff_ratio * 100.0
            ),
            ValidationStatus::Close => format!(
                "Close but not exact (difference: {:.1}%)",
                diff.diff_ratio * 100.0
            ),
            _ => format!(
                "Significant difference (AI: {:.2e}, Calc: {:.2e})",
                ai_numeric, calculated
            ),
        };

        result
    }

    /// Relative difference with the billions-vs-units rescue applied when the
    /// raw comparison is off by more than an order of magnitude.
    pub fn compare(ai_value: f64, calculated_value: f64, threshold: f64) -> ValueDifference {
        let direct = ValueDifference::between(ai_value, calculated_value, 1.0);
        if direct.diff_ratio <= GROSS_MISMATCH_RATIO {
            return direct;
        }

        // Only the 1e9 factor is tried; 1e6/1e3 confusions are left as mismatches.
        // For positive values only the 1/1e9 direction can fire: `ai * 1e9 ≈ calc`
        // means a direct ratio near 1, which never passes the gross-mismatch gate.
        [1.0 / RESCUE_SCALE, RESCUE_SCALE]
            .into_iter()
            .map(|scale| ValueDifference::between(ai_value, calculated_value, scale))
            .find(|rescaled| rescaled.diff_ratio <= threshold)
            .unwrap_or(direct)
    }

    /// Map a difference ratio onto status/confidence. Monotonic in `diff_ratio`.
    pub fn verdict(diff_ratio: f64, threshold: f64) -> (ValidationStatus, Confidence) {
        if diff_ratio <= threshold {
            (ValidationStatus::Verified, Confidence::High)
        } else if diff_ratio <= threshold * 3.0 {
            (ValidationStatus::Close, Confidence::Medium)
        } else {
            (ValidationStatus::Mismatch, Confidence::Low)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn check(ai: Value, calc: Option<f64>, threshold: f64) -> ValidationResult {
        ToleranceComparator::new().validate_metric("Test", &ai, calc, threshold)
    }

    #[test]
    fn test_verdicts_are_monotonic() {
        let r = check(json!(1.05), Some(1.0), 0.1);
        assert_eq!(r.status, ValidationStatus::Verified);
        assert_eq!(r.confidence, Confidence::High);

        let r = check(json!(1.25), Some(1.0), 0.1);
        assert_eq!(r.status, ValidationStatus::Close);
        assert_eq!(r.confidence, Confidence::Medium);

        let r = check(json!(1.5), Some(1.0), 0.1);
        assert_eq!(r.status, ValidationStatus::Mismatch);
        assert_eq!(r.confidence, Confidence::Low);
    }

    #[test]
    fn test_verdict_boundaries() {
        assert_eq!(ToleranceComparator::verdict(0.1, 0.1).0, ValidationStatus::Verified);
        assert_eq!(ToleranceComparator::verdict(0.3, 0.1).0, ValidationStatus::Close);
        assert_eq!(ToleranceComparator::verdict(0.31, 0.1).0, ValidationStatus::Mismatch);
    }

    #[test]
    fn test_unit_rescue_billions() {
        let r = check(json!("150B"), Some(150.2), 0.2);
        assert_eq!(r.status, ValidationStatus::Verified);
        assert!(r.message.starts_with("Values match"));
    }

    #[test]
    fn test_small_ai_value_is_not_rescued() {
        // AI below the calculation never exceeds the gross-mismatch ratio
        let diff = ToleranceComparator::compare(2.5, 2.5e9, 0.15);
        assert_eq!(diff.applied_scale, 1.0);
        assert_eq!(
            ToleranceComparator::verdict(diff.diff_ratio, 0.15).0,
            ValidationStatus::Mismatch
        );
    }

    #[test]
    fn test_no_rescue_for_millions() {
        let r = check(json!("150M"), Some(150.0), 0.2);
        assert_eq!(r.status, ValidationStatus::Mismatch);
        assert!(r.message.contains("Significant difference"));
    }

    #[test]
    fn test_missing_calculation_is_unchecked() {
        let r = check(json!("N/A"), None, 0.15);
        assert_eq!(r.status, ValidationStatus::Unchecked);
        assert_eq!(r.confidence, Confidence::Medium);
        assert!(r.message.contains("insufficient data"));
    }

    #[test]
    fn test_unparseable_value_is_error() {
        let r = check(json!("roughly twelve"), Some(12.0), 0.1);
        assert_eq!(r.status, ValidationStatus::Error);
        assert_eq!(r.confidence, Confidence::Low);
        assert_eq!(r.ai_value, json!("roughly twelve"));
    }

    #[test]
    fn test_percent_string_against_calculation() {
        let r = check(json!("20.5%"), Some(20.0), 0.1);
        assert_eq!(r.status, ValidationStatus::Verified);
        assert_eq!(r.calculated_value, Some(20.0));
    }

    #[test]
    fn test_zero_calculated_uses_floor() {
        let diff = ToleranceComparator::compare(0.001, 0.0, 0.1);
        assert!((diff.diff_ratio - 0.1).abs() < 1e-12);
    }
}
