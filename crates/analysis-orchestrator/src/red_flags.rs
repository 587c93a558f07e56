use analysis_core::{parse_plain_number, MetricsRecord, NOT_AVAILABLE};
use serde_json::Value;

const NO_FLAGS: &str = "No critical quantitative risks detected.";

/// Red flags inferred from the numbers alone, for records where the model
/// found none in the text.
pub fn implied_red_flags(record: &MetricsRecord) -> Vec<String> {
    let number = |key: &str| record.get(key).and_then(parse_plain_number);
    let mut flags = Vec::new();

    if let Some(pe) = number("pe_ratio").filter(|pe| *pe > 45.0) {
        flags.push(format!("Extremely High Valuation (P/E: {})", pe));
    }
    if let Some(cr) = number("current_ratio").filter(|cr| *cr > 0.0 && *cr < 0.8) {
        flags.push(format!("Liquidity Concern (Current Ratio: {})", cr));
    }
    if let Some(de) = number("debt_equity").filter(|de| *de > 2.5) {
        flags.push(format!("High Leverage (Debt/Equity: {})", de));
    }
    if number("profit_margin").is_some_and(|pm| pm < 0.0) {
        flags.push("Negative Profit Margin".to_string());
    }
    if record.get("volatility").and_then(Value::as_str) == Some("High") {
        flags.push("High Stock Volatility".to_string());
    }

    if flags.is_empty() {
        flags.push(NO_FLAGS.to_string());
    }
    flags
}

fn has_red_flags(record: &MetricsRecord) -> bool {
    match record.get("red_flags") {
        Some(Value::Array(flags)) => !flags.is_empty(),
        Some(Value::String(s)) => !s.trim().is_empty() && s.trim() != NOT_AVAILABLE,
        Some(Value::Null) | None => false,
        Some(_) => true,
    }
}

/// Fill `red_flags` from the numbers when the record has none. Returns whether
/// anything was written.
pub fn apply_red_flag_safety_net(record: &mut MetricsRecord) -> bool {
    if has_red_flags(record) {
        return false;
    }

    let flags = implied_red_flags(record);
    tracing::info!("No red flags in model output, derived {} from metrics", flags.len());
    record.insert("red_flags", Value::from(flags));
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(pairs: &[(&str, Value)]) -> MetricsRecord {
        let mut r = MetricsRecord::new();
        for (k, v) in pairs {
            r.insert(*k, v.clone());
        }
        r
    }

    #[test]
    fn test_all_quantitative_flags() {
        let r = record(&[
            ("pe_ratio", json!(52.5)),
            ("current_ratio", json!("0.6")),
            ("debt_equity", json!(3.1)),
            ("profit_margin", json!("-4.2%")),
            ("volatility", json!("High")),
        ]);
        assert_eq!(
            implied_red_flags(&r),
            vec![
                "Extremely High Valuation (P/E: 52.5)",
                "Liquidity Concern (Current Ratio: 0.6)",
                "High Leverage (Debt/Equity: 3.1)",
                "Negative Profit Margin",
                "High Stock Volatility",
            ]
        );
    }

    #[test]
    fn test_healthy_metrics_fallback() {
        let r = record(&[
            ("pe_ratio", json!(18.0)),
            ("current_ratio", json!(0.0)),
            ("profit_margin", json!("N/A")),
        ]);
        assert_eq!(implied_red_flags(&r), vec![NO_FLAGS]);
    }

    #[test]
    fn test_safety_net_keeps_model_flags() {
        let mut r = record(&[("red_flags", json!(["Customer concentration"]))]);
        assert!(!apply_red_flag_safety_net(&mut r));
        assert_eq!(r.get("red_flags"), Some(&json!(["Customer concentration"])));

        let mut r = record(&[("red_flags", json!([])), ("debt_equity", json!(4))]);
        assert!(apply_red_flag_safety_net(&mut r));
        assert_eq!(r.get("red_flags"), Some(&json!(["High Leverage (Debt/Equity: 4)"])));

        let mut r = record(&[("red_flags", json!("N/A"))]);
        assert!(apply_red_flag_safety_net(&mut r));
        assert_eq!(r.get("red_flags"), Some(&json!([NO_FLAGS])));
    }
}
