use analysis_core::MetricKind;

use crate::extractor::NumericExtractor;

/// Value derived from raw text (absent when an anchor is missing) plus a
/// derivation trace citing the source numbers.
pub type Derivation = (Option<f64>, String);

// Synonym lists, most specific first.
const NET_INCOME_PATTERNS: &[&str] = &[
    r"net\s+income",
    r"net\s+profit",
    r"profit\s+for\s+the\s+year",
    r"earnings\s+attributable",
];

const SHARES_PATTERNS: &[&str] = &[
    r"shares\s+outstanding",
    r"weighted\s+average\s+shares",
    r"number\s+of\s+shares",
    r"common\s+shares",
];

const EQUITY_PATTERNS: &[&str] = &[
    r"shareholders?\s*'?\s*equity",
    r"total\s+equity",
    r"stockholders?\s*'?\s*equity",
];

const DEBT_PATTERNS: &[&str] = &[
    r"total\s+debt",
    r"total\s+liabilities",
    r"borrowings",
    r"long[- ]term\s+debt",
];

const REVENUE_PATTERNS: &[&str] = &[
    r"total\s+revenue",
    r"net\s+revenue",
    r"sales",
    r"turnover",
];

const PRICE_PATTERNS: &[&str] = &[r"stock\s+price|market\s+price|share\s+price"];

/// EPS below this is assumed to come from a thousands/millions unit mismatch
const EPS_RESCALE_FLOOR: f64 = 0.01;

/// Recomputes derived metrics from numbers found in the document text.
pub struct MetricCalculator<'a> {
    extractor: &'a NumericExtractor,
}

impl<'a> MetricCalculator<'a> {
    pub fn new(extractor: &'a NumericExtractor) -> Self {
        Self { extractor }
    }

    pub fn calculate(&self, kind: MetricKind) -> Derivation {
        match kind {
            MetricKind::Eps => self.calculate_eps(),
            MetricKind::Roe => self.calculate_roe(),
            MetricKind::DebtEquity => self.calculate_debt_equity_ratio(),
            MetricKind::ProfitMargin => self.calculate_profit_margin(),
            MetricKind::MarketCap => self.calculate_market_cap(),
            MetricKind::PeRatio => self.calculate_pe_ratio(),
        }
    }

    /// Try each pattern in order until one yields a non-zero number.
    fn first_match(&self, patterns: &[&str]) -> Option<f64> {
        patterns
            .iter()
            .filter_map(|p| self.extractor.extract_number(p))
            .find(|v| *v != 0.0)
    }

    /// EPS = Net Income / Shares Outstanding
    pub fn calculate_eps(&self) -> Derivation {
        let net_income = self.first_match(NET_INCOME_PATTERNS);
        let shares = self.first_match(SHARES_PATTERNS);

        if let (Some(net_income), Some(shares)) = (net_income, shares) {
            if shares > 0.0 {
                let mut eps = net_income / shares;
                if eps < EPS_RESCALE_FLOOR {
                    eps = (net_income * 1000.0) / shares;
                }
                return (
                    Some(eps),
                    format!(
                        "Calculated: ${:.2} (Net Income: {}, Shares: {})",
                        eps, net_income, shares
                    ),
                );
            }
        }

        (None, "Could not find Net Income or Shares Outstanding".to_string())
    }

    /// ROE = (Net Income / Shareholders' Equity) x 100
    pub fn calculate_roe(&self) -> Derivation {
        let net_income = self.first_match(NET_INCOME_PATTERNS);
        let equity = self.first_match(EQUITY_PATTERNS);

        match (net_income, equity) {
            (Some(net_income), Some(equity)) if equity > 0.0 => {
                let roe = (net_income / equity) * 100.0;
                (
                    Some(roe),
                    format!(
                        "Calculated: {:.1}% (Net Income: {}, Equity: {})",
                        roe, net_income, equity
                    ),
                )
            }
            _ => (None, "Could not find Net Income or Equity".to_string()),
        }
    }

    /// D/E = Total Debt / Total Equity
    pub fn calculate_debt_equity_ratio(&self) -> Derivation {
        let debt = self.first_match(DEBT_PATTERNS);
        let equity = self.first_match(EQUITY_PATTERNS);

        match (debt, equity) {
            (Some(debt), Some(equity)) if equity > 0.0 => {
                let ratio = debt / equity;
                (
                    Some(ratio),
                    format!("Calculated: {:.2} (Debt: {}, Equity: {})", ratio, debt, equity),
                )
            }
            _ => (None, "Could not find Total Debt or Equity".to_string()),
        }
    }

    /// Profit Margin = (Net Income / Revenue) x 100
    pub fn calculate_profit_margin(&self) -> Derivation {
        let net_income = self.first_match(NET_INCOME_PATTERNS);
        let revenue = self.first_match(REVENUE_PATTERNS);

        match (net_income, revenue) {
            (Some(net_income), Some(revenue)) if revenue > 0.0 => {
                let margin = (net_income / revenue) * 100.0;
                (
                    Some(margin),
                    format!(
                        "Calculated: {:.1}% (Net Income: {}, Revenue: {})",
                        margin, net_income, revenue
                    ),
                )
            }
            _ => (None, "Could not find Net Income or Revenue".to_string()),
        }
    }

    /// Market Cap ~ Shares Outstanding x Stock Price
    pub fn calculate_market_cap(&self) -> Derivation {
        let shares = self.first_match(SHARES_PATTERNS);
        let price = self.first_match(PRICE_PATTERNS);

        match (shares, price) {
            (Some(shares), Some(price)) if shares > 0.0 && price > 0.0 => {
                let cap = shares * price;
                (
                    Some(cap),
                    format!("Calculated: ${:.2} (Shares: {}, Price: {})", cap, shares, price),
                )
            }
            _ => (None, "Price or Shares not found".to_string()),
        }
    }

    /// P/E = Price / EPS, with EPS recomputed from the same text
    pub fn calculate_pe_ratio(&self) -> Derivation {
        let price = self.first_match(PRICE_PATTERNS);
        let (eps, _) = self.calculate_eps();

        match (price, eps) {
            (Some(price), Some(eps)) if price > 0.0 && eps > 0.0 => {
                let pe = price / eps;
                (
                    Some(pe),
                    format!("Calculated: {:.2} (Price: {}, EPS: {:.2})", pe, price, eps),
                )
            }
            _ => (None, "Price or EPS not found".to_string()),
        }
    }
}
