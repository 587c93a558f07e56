//! Live snapshot construction from an Alpha Vantage company overview.
//!
//! Ratios pass through as numbers, display metrics are pre-formatted the way the
//! dashboard shows them, and four 0-100 risk sub-scores are derived from the
//! balance-sheet ratios. Quarterly statements, when available, add history,
//! trends, free cash flow and a D/E fallback.

use analysis_core::NOT_AVAILABLE;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::alpha_vantage::CompanyOverview;
use crate::statements::{fmt_cash, FinancialStatements, QuarterlyHistory};

const DEFAULT_CURRENT_RATIO: f64 = 1.5;
const DEFAULT_BETA: f64 = 1.1;
const DEFAULT_DEBT_EQUITY: f64 = 0.5;
const DEFAULT_INSIDER_PCT: f64 = 10.0;

/// 0-100 risk sub-scores derived from quantitative ratios
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskSubScores {
    pub liquidity_risk: i64,
    pub market_risk: i64,
    pub credit_risk: i64,
    pub governance_risk: i64,
}

impl RiskSubScores {
    /// Missing inputs fall back to typical large-cap values.
    pub fn from_ratios(
        current_ratio: Option<f64>,
        beta: Option<f64>,
        debt_equity: Option<f64>,
        insider_pct: Option<f64>,
    ) -> Self {
        let cr = current_ratio.unwrap_or(DEFAULT_CURRENT_RATIO);
        let beta = beta.unwrap_or(DEFAULT_BETA);
        let de = debt_equity.unwrap_or(DEFAULT_DEBT_EQUITY);
        let own = insider_pct.unwrap_or(DEFAULT_INSIDER_PCT);

        Self {
            liquidity_risk: risk_score((2.0 - cr) * 50.0),
            market_risk: risk_score(beta / 2.0 * 100.0),
            credit_risk: risk_score(de / 3.0 * 100.0),
            governance_risk: risk_score((1.0 - own / 50.0) * 100.0),
        }
    }
}

/// Truncate to an integer score after absorbing float noise (0.9 * 50 = 44.999...).
fn risk_score(raw: f64) -> i64 {
    (raw + 1e-9).clamp(0.0, 100.0) as i64
}

/// Live data for one ticker, ready to merge into a metrics record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveSnapshot {
    pub ticker: String,
    pub eps: Value,
    pub pe_ratio: Value,
    pub beta: Value,
    pub current_ratio: Value,
    pub debt_equity: Value,
    pub price_to_book: Value,
    pub market_cap: String,
    pub roe: String,
    pub profit_margin: String,
    pub dividend_yield: String,
    pub ownership: String,
    pub revenue_growth: String,
    pub revenue_cagr: String,
    pub revenue_growth_trend: String,
    pub profit_trend: String,
    pub free_cash_flow: String,
    #[serde(flatten)]
    pub risk: RiskSubScores,
    pub history: QuarterlyHistory,
}

impl LiveSnapshot {
    pub fn from_overview(overview: &CompanyOverview) -> Self {
        Self::from_parts(overview, &FinancialStatements::default())
    }

    /// Risk sub-scores come from the overview alone; statements only fill in
    /// what the overview leaves out.
    pub fn from_parts(overview: &CompanyOverview, statements: &FinancialStatements) -> Self {
        let current_ratio = positive(overview_number(&overview.current_ratio));
        let beta = overview_number(&overview.beta);
        let debt_equity = positive(overview_number(&overview.debt_equity));
        let insider_pct = overview_number(&overview.percent_insiders);
        let growth = overview_number(&overview.quarterly_revenue_growth);
        let history = statements.history();
        let display_debt_equity = debt_equity.or_else(|| {
            statements
                .latest_debt_equity()
                .filter(|v| *v > 0.0)
                .map(|v| (v * 100.0).round() / 100.0)
        });

        Self {
            ticker: overview.symbol.clone(),
            eps: number_or_na(overview_number(&overview.eps)),
            pe_ratio: number_or_na(overview_number(&overview.pe_ratio)),
            beta: number_or_na(beta),
            current_ratio: number_or_na(current_ratio),
            debt_equity: number_or_na(display_debt_equity),
            price_to_book: number_or_na(overview_number(&overview.price_to_book)),
            market_cap: overview_number(&overview.market_cap)
                .map(fmt_large)
                .unwrap_or_else(na),
            roe: overview_number(&overview.roe)
                .map(|v| fmt_pct(v, false))
                .unwrap_or_else(na),
            profit_margin: overview_number(&overview.profit_margin)
                .map(|v| fmt_pct(v, false))
                .unwrap_or_else(na),
            dividend_yield: overview_number(&overview.dividend_yield)
                .map(|v| fmt_pct(v, false))
                .unwrap_or_else(na),
            ownership: insider_pct.map(|v| fmt_pct(v, false)).unwrap_or_else(na),
            revenue_growth: growth.map(|v| fmt_pct(v, true)).unwrap_or_else(na),
            revenue_cagr: growth.map(|v| fmt_pct(v, true)).unwrap_or_else(na),
            revenue_growth_trend: history.revenue_trend().to_string(),
            profit_trend: history.profit_trend().to_string(),
            free_cash_flow: statements.free_cash_flow().map(fmt_cash).unwrap_or_else(na),
            risk: RiskSubScores::from_ratios(current_ratio, beta, debt_equity, insider_pct),
            history,
        }
    }

    pub fn into_map(self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }
}

fn na() -> String {
    NOT_AVAILABLE.to_string()
}

/// Alpha Vantage numbers are strings; `"None"`, `"-"` and blanks mean absent.
fn overview_number(raw: &Option<String>) -> Option<f64> {
    raw.as_deref()
        .map(str::trim)
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

fn positive(value: Option<f64>) -> Option<f64> {
    value.filter(|v| *v > 0.0)
}

pub fn number_or_na(value: Option<f64>) -> Value {
    value
        .and_then(serde_json::Number::from_f64)
        .map(Value::Number)
        .unwrap_or_else(|| Value::from(NOT_AVAILABLE))
}

/// `2.87T`, `150.20B`, `12.00M`, or a grouped integer below a million.
pub fn fmt_large(value: f64) -> String {
    let magnitude = value.abs();
    if magnitude >= 1e12 {
        format!("{:.2}T", value / 1e12)
    } else if magnitude >= 1e9 {
        format!("{:.2}B", value / 1e9)
    } else if magnitude >= 1e6 {
        format!("{:.2}M", value / 1e6)
    } else {
        group_thousands(value.round() as i64)
    }
}

/// Percent with one decimal. Fractions (|v| < 2) are scaled by 100 first.
pub fn fmt_pct(value: f64, signed: bool) -> String {
    let pct = if value.abs() < 2.0 { value * 100.0 } else { value };
    if signed && pct > 0.0 {
        format!("+{:.1}%", pct)
    } else {
        format!("{:.1}%", pct)
    }
}

fn group_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    if value < 0 {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::statements::{BalanceQuarter, CashFlowQuarter, IncomeQuarter};
    use serde_json::json;

    fn overview() -> CompanyOverview {
        serde_json::from_value(json!({
            "Symbol": "ACME",
            "MarketCapitalization": "150200000000",
            "PERatio": "22.4",
            "EPS": "6.13",
            "ReturnOnEquityTTM": "0.245",
            "ProfitMargin": "0.12",
            "DividendYield": "None",
            "Beta": "1.3",
            "QuarterlyRevenueGrowthYOY": "0.081",
            "PercentInsiders": "5",
            "PriceToBookRatio": "-",
            "CurrentRatio": "1.1",
            "DebtEquityRatio": "0.0"
        }))
        .unwrap()
    }

    #[test]
    fn test_fmt_large() {
        assert_eq!(fmt_large(2.87e12), "2.87T");
        assert_eq!(fmt_large(150_200_000_000.0), "150.20B");
        assert_eq!(fmt_large(12_000_000.0), "12.00M");
        assert_eq!(fmt_large(950_123.0), "950,123");
        assert_eq!(fmt_large(999.0), "999");
        assert_eq!(fmt_large(-4_500.0), "-4,500");
    }

    #[test]
    fn test_fmt_pct() {
        assert_eq!(fmt_pct(0.245, false), "24.5%");
        assert_eq!(fmt_pct(12.0, false), "12.0%");
        assert_eq!(fmt_pct(0.081, true), "+8.1%");
        assert_eq!(fmt_pct(-0.05, true), "-5.0%");
    }

    #[test]
    fn test_risk_defaults() {
        let scores = RiskSubScores::from_ratios(None, None, None, None);
        assert_eq!(scores.liquidity_risk, 25);
        assert_eq!(scores.market_risk, 55);
        assert_eq!(scores.credit_risk, 16);
        assert_eq!(scores.governance_risk, 80);
    }

    #[test]
    fn test_risk_scores_are_clamped() {
        let scores = RiskSubScores::from_ratios(Some(3.0), Some(2.5), Some(6.0), Some(80.0));
        assert_eq!(scores.liquidity_risk, 0);
        assert_eq!(scores.market_risk, 100);
        assert_eq!(scores.credit_risk, 100);
        assert_eq!(scores.governance_risk, 0);
    }

    #[test]
    fn test_snapshot_from_overview() {
        let snapshot = LiveSnapshot::from_overview(&overview());

        assert_eq!(snapshot.pe_ratio, json!(22.4));
        assert_eq!(snapshot.price_to_book, json!("N/A"));
        assert_eq!(snapshot.debt_equity, json!("N/A"));
        assert_eq!(snapshot.market_cap, "150.20B");
        assert_eq!(snapshot.roe, "24.5%");
        assert_eq!(snapshot.dividend_yield, "N/A");
        assert_eq!(snapshot.revenue_growth, "+8.1%");
        assert_eq!(snapshot.ownership, "5.0%");

        // cr 1.1 -> 45, beta 1.3 -> 65, zero D/E uses default -> 16, insiders 5% -> 90
        assert_eq!(snapshot.risk.liquidity_risk, 45);
        assert_eq!(snapshot.risk.market_risk, 65);
        assert_eq!(snapshot.risk.credit_risk, 16);
        assert_eq!(snapshot.risk.governance_risk, 90);
    }

    #[test]
    fn test_statements_fill_gaps() {
        let statements = FinancialStatements {
            income: vec![
                IncomeQuarter { net_income: Some("90".into()), total_revenue: Some("1100".into()), ..Default::default() },
                IncomeQuarter { net_income: Some("100".into()), total_revenue: Some("1000".into()), ..Default::default() },
            ],
            balance: vec![BalanceQuarter {
                total_shareholder_equity: Some("3000".into()),
                long_term_debt: Some("1234".into()),
                ..Default::default()
            }],
            cash_flow: vec![CashFlowQuarter {
                operating_cashflow: Some("2000000000".into()),
                capital_expenditures: Some("-500000000".into()),
                ..Default::default()
            }],
        };
        let snapshot = LiveSnapshot::from_parts(&overview(), &statements);

        // overview D/E of 0 is absent, so the balance sheet supplies it
        assert_eq!(snapshot.debt_equity, json!(0.41));
        assert_eq!(snapshot.risk.credit_risk, 16);
        assert_eq!(snapshot.free_cash_flow, "$1.50B");
        assert_eq!(snapshot.revenue_growth_trend, "positive");
        assert_eq!(snapshot.profit_trend, "negative");
        assert_eq!(snapshot.history.net_income, vec![100.0, 90.0]);
    }

    #[test]
    fn test_without_statements_defaults() {
        let snapshot = LiveSnapshot::from_overview(&overview());
        assert_eq!(snapshot.free_cash_flow, "N/A");
        assert_eq!(snapshot.revenue_growth_trend, "positive");
        assert_eq!(snapshot.profit_trend, "positive");
        assert_eq!(snapshot.history, QuarterlyHistory::default());
    }

    #[test]
    fn test_into_map_is_flat() {
        let map = LiveSnapshot::from_overview(&overview()).into_map();
        assert_eq!(map["ticker"], json!("ACME"));
        assert_eq!(map["market_risk"], json!(65));
        assert!(!map.contains_key("risk"));
    }
}
