//! Tolerant numeric parsing for metric values coming from models and APIs.
//!
//! Values arrive as JSON numbers, percent strings (`"12.3%"`), currency strings
//! (`"$1,234.50"`) or unit-suffixed strings (`"1.5B"`, `"250K"`). Everything is
//! canonicalized to an `f64` in base units.

use serde_json::Value;

use crate::AnalysisError;

/// Sentinel used by upstream sources for "no value".
pub const NOT_AVAILABLE: &str = "N/A";

/// Unit suffixes, longest first so `MM` is not read as `M`.
const UNIT_SUFFIXES: [(&str, f64); 5] = [
    ("T", 1e12),
    ("B", 1e9),
    ("MM", 1e6),
    ("M", 1e6),
    ("K", 1e3),
];

/// Parse a heterogeneous metric value into base units.
pub fn parse_metric_value(value: &Value) -> Result<f64, AnalysisError> {
    match value {
        Value::Number(n) => n
            .as_f64()
            .filter(|v| v.is_finite())
            .ok_or_else(|| AnalysisError::InvalidValue(format!("non-finite number {}", n))),
        Value::String(s) => parse_metric_str(s),
        other => Err(AnalysisError::InvalidValue(format!(
            "expected number or string, got {}",
            other
        ))),
    }
}

/// Parse a metric string: strips `%`, `$` and `,`, then applies `T|B|MM|M|K`
/// multipliers.
pub fn parse_metric_str(raw: &str) -> Result<f64, AnalysisError> {
    let cleaned = strip_decorations(raw).to_uppercase();

    let (digits, multiplier) = UNIT_SUFFIXES
        .iter()
        .find_map(|(suffix, mult)| cleaned.strip_suffix(*suffix).map(|rest| (rest, *mult)))
        .unwrap_or((cleaned.as_str(), 1.0));

    let base: f64 = digits
        .trim()
        .parse()
        .map_err(|_| AnalysisError::InvalidValue(format!("could not parse {:?}", raw)))?;

    if !base.is_finite() {
        return Err(AnalysisError::InvalidValue(format!("non-finite value {:?}", raw)));
    }

    Ok(base * multiplier)
}

/// Plain number reading without unit suffixes: numbers pass through, strings are
/// stripped of `%`, `$` and `,`. Anything else (including `"N/A"`) is `None`.
pub fn parse_plain_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        Value::String(s) => {
            let cleaned = strip_decorations(s);
            if cleaned.is_empty() || cleaned.eq_ignore_ascii_case("n/a") {
                return None;
            }
            cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
        }
        _ => None,
    }
}

/// True for values upstream sources use to mean "nothing here".
pub fn is_missing(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim() == NOT_AVAILABLE,
        _ => false,
    }
}

fn strip_decorations(raw: &str) -> String {
    raw.replace(['%', '$', ','], "").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6 * b.abs().max(1.0)
    }

    #[test]
    fn test_suffixes() {
        assert!(close(parse_metric_str("1.5B").unwrap(), 1.5e9));
        assert!(close(parse_metric_str("250K").unwrap(), 250_000.0));
        assert!(close(parse_metric_str("2.1T").unwrap(), 2.1e12));
        assert!(close(parse_metric_str("3MM").unwrap(), 3e6));
        assert!(close(parse_metric_str("$4.2m").unwrap(), 4.2e6));
    }

    #[test]
    fn test_percent_and_currency() {
        assert!(close(parse_metric_str("12.3%").unwrap(), 12.3));
        assert!(close(parse_metric_str("$1,234.50").unwrap(), 1234.5));
        assert!(close(parse_metric_str("  -5.5% ").unwrap(), -5.5));
    }

    #[test]
    fn test_json_values() {
        assert!(close(parse_metric_value(&json!(22.4)).unwrap(), 22.4));
        assert!(close(parse_metric_value(&json!("150B")).unwrap(), 1.5e11));
        assert!(parse_metric_value(&json!(true)).is_err());
        assert!(parse_metric_value(&Value::Null).is_err());
    }

    #[test]
    fn test_garbage_is_error() {
        assert!(parse_metric_str("N/A").is_err());
        assert!(parse_metric_str("").is_err());
        assert!(parse_metric_str("B").is_err());
        assert!(parse_metric_str("about ten").is_err());
        assert!(parse_metric_str("inf").is_err());
    }

    #[test]
    fn test_plain_number() {
        assert_eq!(parse_plain_number(&json!("45%")), Some(45.0));
        assert_eq!(parse_plain_number(&json!(30)), Some(30.0));
        assert_eq!(parse_plain_number(&json!("n/a")), None);
        assert_eq!(parse_plain_number(&json!("1.5B")), None);
        assert_eq!(parse_plain_number(&json!({"score": 1})), None);
    }

    #[test]
    fn test_is_missing() {
        assert!(is_missing(&Value::Null));
        assert!(is_missing(&json!("N/A")));
        assert!(!is_missing(&json!(0)));
        assert!(!is_missing(&json!("12%")));
    }
}
