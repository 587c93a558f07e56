//! Quarterly statements (INCOME_STATEMENT, BALANCE_SHEET, CASH_FLOW) that
//! enrich a live snapshot with history, trends, free cash flow and a
//! balance-sheet D/E fallback.

use serde::{Deserialize, Serialize};

/// Quarters kept for history series
const HISTORY_QUARTERS: usize = 5;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct StatementReports<T> {
    #[serde(rename = "quarterlyReports", default)]
    pub quarterly_reports: Vec<T>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct IncomeQuarter {
    pub fiscal_date_ending: Option<String>,
    pub diluted_earnings_per_share: Option<String>,
    pub total_revenue: Option<String>,
    pub net_income: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BalanceQuarter {
    pub fiscal_date_ending: Option<String>,
    pub total_shareholder_equity: Option<String>,
    pub short_term_debt: Option<String>,
    pub long_term_debt: Option<String>,
    pub total_current_assets: Option<String>,
    pub total_current_liabilities: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CashFlowQuarter {
    pub fiscal_date_ending: Option<String>,
    pub operating_cashflow: Option<String>,
    pub capital_expenditures: Option<String>,
}

/// Quarterly reports as Alpha Vantage returns them, newest first. Any of the
/// three may be empty when its fetch failed or was skipped.
#[derive(Debug, Clone, Default)]
pub struct FinancialStatements {
    pub income: Vec<IncomeQuarter>,
    pub balance: Vec<BalanceQuarter>,
    pub cash_flow: Vec<CashFlowQuarter>,
}

/// Per-quarter series, oldest first
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuarterlyHistory {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub eps: Vec<f64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub revenue: Vec<f64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub net_income: Vec<f64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub debt_equity: Vec<f64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub current_ratio: Vec<f64>,
}

impl FinancialStatements {
    pub fn is_empty(&self) -> bool {
        self.income.is_empty() && self.balance.is_empty() && self.cash_flow.is_empty()
    }

    pub fn history(&self) -> QuarterlyHistory {
        let income: Vec<&IncomeQuarter> = oldest_first(&self.income);
        let balance: Vec<&BalanceQuarter> = oldest_first(&self.balance);

        QuarterlyHistory {
            eps: income
                .iter()
                .map(|q| statement_number(&q.diluted_earnings_per_share))
                .collect(),
            revenue: income.iter().map(|q| statement_number(&q.total_revenue)).collect(),
            net_income: income.iter().map(|q| statement_number(&q.net_income)).collect(),
            debt_equity: balance.iter().map(|q| round3(quarter_debt_equity(q))).collect(),
            current_ratio: balance
                .iter()
                .map(|q| {
                    let assets = statement_number(&q.total_current_assets);
                    round3(assets / non_zero(statement_number(&q.total_current_liabilities)))
                })
                .collect(),
        }
    }

    /// Debt over equity from the latest balance sheet
    pub fn latest_debt_equity(&self) -> Option<f64> {
        self.balance.first().map(|q| round3(quarter_debt_equity(q)))
    }

    /// Operating cash flow minus capital expenditures for the latest quarter.
    /// Capex is usually reported negative, so its magnitude is subtracted.
    pub fn free_cash_flow(&self) -> Option<f64> {
        self.cash_flow.first().map(|q| {
            statement_number(&q.operating_cashflow) - statement_number(&q.capital_expenditures).abs()
        })
    }
}

impl QuarterlyHistory {
    pub fn revenue_trend(&self) -> &'static str {
        trend(&self.revenue)
    }

    pub fn profit_trend(&self) -> &'static str {
        trend(&self.net_income)
    }
}

/// `"negative"` only when the latest quarter is below the one before it.
pub fn trend(series: &[f64]) -> &'static str {
    match series {
        [.., previous, latest] if latest < previous => "negative",
        _ => "positive",
    }
}

/// `$1.25B`, `$340.00M`, `$12.50K`
pub fn fmt_cash(value: f64) -> String {
    let magnitude = value.abs();
    if magnitude >= 1e9 {
        format!("${:.2}B", value / 1e9)
    } else if magnitude >= 1e6 {
        format!("${:.2}M", value / 1e6)
    } else {
        format!("${:.2}K", value / 1e3)
    }
}

fn oldest_first<T>(reports: &[T]) -> Vec<&T> {
    reports.iter().take(HISTORY_QUARTERS).rev().collect()
}

fn quarter_debt_equity(q: &BalanceQuarter) -> f64 {
    let debt = statement_number(&q.short_term_debt) + statement_number(&q.long_term_debt);
    debt / non_zero(statement_number(&q.total_shareholder_equity))
}

/// Statement figures are strings; `"None"` and blanks count as zero.
fn statement_number(raw: &Option<String>) -> f64 {
    raw.as_deref()
        .and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

fn non_zero(value: f64) -> f64 {
    if value == 0.0 {
        1.0
    } else {
        value
    }
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn statements() -> FinancialStatements {
        let income: StatementReports<IncomeQuarter> = serde_json::from_value(json!({
            "symbol": "ACME",
            "quarterlyReports": [
                {"fiscalDateEnding": "2024-06-30", "dilutedEarningsPerShare": "1.60", "totalRevenue": "900", "netIncome": "120"},
                {"fiscalDateEnding": "2024-03-31", "dilutedEarningsPerShare": "1.50", "totalRevenue": "1000", "netIncome": "110"},
                {"fiscalDateEnding": "2023-12-31", "dilutedEarningsPerShare": "None", "totalRevenue": "950", "netIncome": "100"}
            ]
        }))
        .unwrap();
        let balance: StatementReports<BalanceQuarter> = serde_json::from_value(json!({
            "quarterlyReports": [
                {"totalShareholderEquity": "2000", "shortTermDebt": "300", "longTermDebt": "700",
                 "totalCurrentAssets": "1500", "totalCurrentLiabilities": "1000"},
                {"totalShareholderEquity": "0", "shortTermDebt": "50", "longTermDebt": "None",
                 "totalCurrentAssets": "800", "totalCurrentLiabilities": "None"}
            ]
        }))
        .unwrap();
        let cash_flow: StatementReports<CashFlowQuarter> = serde_json::from_value(json!({
            "quarterlyReports": [
                {"operatingCashflow": "1500000000", "capitalExpenditures": "-250000000"}
            ]
        }))
        .unwrap();

        FinancialStatements {
            income: income.quarterly_reports,
            balance: balance.quarterly_reports,
            cash_flow: cash_flow.quarterly_reports,
        }
    }

    #[test]
    fn test_history_is_oldest_first() {
        let history = statements().history();
        assert_eq!(history.eps, vec![0.0, 1.5, 1.6]);
        assert_eq!(history.revenue, vec![950.0, 1000.0, 900.0]);
        // zero equity and missing liabilities fall back to a divisor of 1
        assert_eq!(history.debt_equity, vec![50.0, 0.5]);
        assert_eq!(history.current_ratio, vec![800.0, 1.5]);
    }

    #[test]
    fn test_trends_compare_last_two_quarters() {
        let history = statements().history();
        assert_eq!(history.revenue_trend(), "negative");
        assert_eq!(history.profit_trend(), "positive");
        assert_eq!(trend(&[]), "positive");
        assert_eq!(trend(&[5.0]), "positive");
    }

    #[test]
    fn test_free_cash_flow_and_latest_debt_equity() {
        let s = statements();
        assert_eq!(s.free_cash_flow(), Some(1_250_000_000.0));
        assert_eq!(s.latest_debt_equity(), Some(0.5));
        assert_eq!(FinancialStatements::default().free_cash_flow(), None);
    }

    #[test]
    fn test_fmt_cash() {
        assert_eq!(fmt_cash(1_250_000_000.0), "$1.25B");
        assert_eq!(fmt_cash(-340_000_000.0), "$-340.00M");
        assert_eq!(fmt_cash(12_500.0), "$12.50K");
    }

    #[test]
    fn test_history_keeps_five_quarters() {
        let income = (0..8)
            .map(|i| IncomeQuarter {
                total_revenue: Some(format!("{}", 100 - i)),
                ..IncomeQuarter::default()
            })
            .collect();
        let s = FinancialStatements { income, ..FinancialStatements::default() };
        assert_eq!(s.history().revenue, vec![96.0, 97.0, 98.0, 99.0, 100.0]);
    }
}
