use analysis_core::{
    Confidence, MetricKind, MetricsRecord, ValidationReport, ValidationResult, ValidationStatus,
    ValidationSummary,
};
use chrono::Utc;
use std::collections::BTreeMap;

use crate::calculator::MetricCalculator;
use crate::comparison::ToleranceComparator;
use crate::extractor::{NumericExtractor, ScanSettings};

/// Validates model-extracted metrics against values recomputed from the
/// document text.
pub struct MetricsValidator {
    extractor: NumericExtractor,
    comparator: ToleranceComparator,
}

impl MetricsValidator {
    pub fn new(document_text: &str) -> Self {
        Self::with_settings(document_text, ScanSettings::default())
    }

    pub fn with_settings(document_text: &str, settings: ScanSettings) -> Self {
        Self {
            extractor: NumericExtractor::new(document_text, settings),
            comparator: ToleranceComparator::new(),
        }
    }

    pub fn calculator(&self) -> MetricCalculator<'_> {
        MetricCalculator::new(&self.extractor)
    }

    /// Validate a single metric kind against the value the model gave for it
    pub fn validate(&self, kind: MetricKind, ai_value: &serde_json::Value) -> ValidationResult {
        let (calculated, details) = self.calculator().calculate(kind);
        let mut result = self.comparator.validate_metric(
            kind.display_name(),
            ai_value,
            calculated,
            kind.threshold(),
        );
        result.calculation_details = Some(details);
        result
    }

    /// Validate every metric present in the record that has a calculator.
    pub fn validate_all(&self, ai_metrics: &MetricsRecord) -> ValidationReport {
        let mut validations = BTreeMap::new();

        for kind in MetricKind::ALL {
            let Some(ai_value) = ai_metrics.get(kind.key()) else {
                continue;
            };
            let result = self.validate(kind, ai_value);
            tracing::debug!(
                "Validated {}: {} ({})",
                kind.key(),
                result.status.as_str(),
                result.message
            );
            validations.insert(kind.key().to_string(), result);
        }

        let summary = summarize(validations.values());
        let overall_confidence = overall_confidence(&summary);

        tracing::info!(
            "Validation complete: {} verified, {} close, {} mismatch, {} unchecked, {} error -> {}",
            summary.verified,
            summary.close,
            summary.mismatch,
            summary.unchecked,
            summary.error,
            overall_confidence.as_str()
        );

        ValidationReport {
            overall_confidence,
            validations,
            summary,
            generated_at: Utc::now(),
        }
    }
}

pub fn summarize<'a>(results: impl IntoIterator<Item = &'a ValidationResult>) -> ValidationSummary {
    let mut summary = ValidationSummary::default();
    for result in results {
        match result.status {
            ValidationStatus::Verified => summary.verified += 1,
            ValidationStatus::Close => summary.close += 1,
            ValidationStatus::Mismatch => summary.mismatch += 1,
            ValidationStatus::Unchecked => summary.unchecked += 1,
            // Errors are unchecked; `error` breaks out how many of them there were.
            ValidationStatus::Error => {
                summary.unchecked += 1;
                summary.error += 1;
            }
        }
    }
    summary
}

/// Document-level confidence over the checked subset. With nothing checked
/// there is no evidence either way, so the answer is `MEDIUM`.
pub fn overall_confidence(summary: &ValidationSummary) -> Confidence {
    let checked = summary.checked();
    if checked == 0 {
        return Confidence::Medium;
    }

    let verified_ratio = summary.verified as f64 / checked as f64;
    let mismatch_ratio = summary.mismatch as f64 / checked as f64;

    if verified_ratio >= 0.7 && summary.mismatch == 0 {
        Confidence::High
    } else if verified_ratio >= 0.5 || mismatch_ratio <= 0.3 {
        Confidence::Medium
    } else {
        Confidence::Low
    }
}
