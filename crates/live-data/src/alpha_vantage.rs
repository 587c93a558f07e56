use analysis_core::{AnalysisError, LiveDataSource};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::snapshot::LiveSnapshot;
use crate::statements::{FinancialStatements, StatementReports};

const BASE_URL: &str = "https://www.alphavantage.co/query";

#[derive(Clone)]
pub struct AlphaVantageClient {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

/// Subset of the `OVERVIEW` payload used to build live snapshots.
/// Alpha Vantage reports every number as a string (`"None"` or `"-"` when absent).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CompanyOverview {
    #[serde(rename = "Symbol")]
    pub symbol: String,
    #[serde(rename = "Name")]
    pub name: Option<String>,
    #[serde(rename = "Sector")]
    pub sector: Option<String>,
    #[serde(rename = "Industry")]
    pub industry: Option<String>,
    #[serde(rename = "FiscalYearEnd")]
    pub fiscal_year_end: Option<String>,
    #[serde(rename = "MarketCapitalization")]
    pub market_cap: Option<String>,
    #[serde(rename = "PERatio")]
    pub pe_ratio: Option<String>,
    #[serde(rename = "EPS")]
    pub eps: Option<String>,
    #[serde(rename = "ReturnOnEquityTTM")]
    pub roe: Option<String>,
    #[serde(rename = "ProfitMargin")]
    pub profit_margin: Option<String>,
    #[serde(rename = "DividendYield")]
    pub dividend_yield: Option<String>,
    #[serde(rename = "Beta")]
    pub beta: Option<String>,
    #[serde(rename = "QuarterlyRevenueGrowthYOY")]
    pub quarterly_revenue_growth: Option<String>,
    #[serde(rename = "PercentInsiders")]
    pub percent_insiders: Option<String>,
    #[serde(rename = "PriceToBookRatio")]
    pub price_to_book: Option<String>,
    #[serde(rename = "CurrentRatio")]
    pub current_ratio: Option<String>,
    #[serde(rename = "DebtEquityRatio")]
    pub debt_equity: Option<String>,
}

impl AlphaVantageClient {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            base_url: BASE_URL.to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Point the client at a different endpoint (proxies, recorded fixtures)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn query(&self, function: &str, symbol: &str) -> Result<Value> {
        let url = format!(
            "{}?function={}&symbol={}&apikey={}",
            self.base_url, function, symbol, self.api_key
        );

        let response = self.client.get(&url).send().await?;
        Ok(response.json().await?)
    }

    /// Get company fundamentals overview
    pub async fn get_company_overview(&self, symbol: &str) -> Result<CompanyOverview> {
        let json = self.query("OVERVIEW", symbol).await?;
        parse_overview(json)
    }

    /// Quarterly reports for one statement function (`INCOME_STATEMENT`, ...), newest first
    pub async fn get_statement<T>(&self, function: &str, symbol: &str) -> Result<Vec<T>>
    where
        T: DeserializeOwned,
    {
        let json = self.query(function, symbol).await?;
        parse_statement(json)
    }

    /// Best-effort fetch of the three quarterly statements. A failed statement
    /// is left empty; a rate-limit response stops the remaining calls.
    pub async fn get_financial_statements(&self, symbol: &str) -> FinancialStatements {
        let mut statements = FinancialStatements::default();

        match settle(self.get_statement("INCOME_STATEMENT", symbol).await, "INCOME_STATEMENT") {
            Some(reports) => statements.income = reports,
            None => return statements,
        }
        match settle(self.get_statement("BALANCE_SHEET", symbol).await, "BALANCE_SHEET") {
            Some(reports) => statements.balance = reports,
            None => return statements,
        }
        if let Some(reports) = settle(self.get_statement("CASH_FLOW", symbol).await, "CASH_FLOW") {
            statements.cash_flow = reports;
        }

        statements
    }
}

/// `None` means rate limited; other failures degrade to an empty statement.
fn settle<T>(result: Result<Vec<T>>, function: &str) -> Option<Vec<T>> {
    match result {
        Ok(reports) => Some(reports),
        Err(e) if is_rate_limited(&e) => {
            tracing::warn!("{} skipped: {}", function, e);
            None
        }
        Err(e) => {
            tracing::warn!("{} fetch failed: {}", function, e);
            Some(Vec::new())
        }
    }
}

fn is_rate_limited(error: &anyhow::Error) -> bool {
    matches!(
        error.downcast_ref::<AnalysisError>(),
        Some(AnalysisError::RateLimited(_))
    )
}

/// Check a statement response for errors and rate limiting, then decode it.
pub fn parse_statement<T>(json: Value) -> Result<Vec<T>>
where
    T: DeserializeOwned,
{
    check_response(&json)?;
    let reports: StatementReports<T> = serde_json::from_value(json)?;
    Ok(reports.quarterly_reports)
}

/// Check an `OVERVIEW` response for errors and rate limiting, then decode it.
pub fn parse_overview(json: Value) -> Result<CompanyOverview> {
    check_response(&json)?;

    let overview: CompanyOverview = serde_json::from_value(json)?;
    if overview.symbol.is_empty() {
        return Err(anyhow!(AnalysisError::InsufficientData(
            "No data found for this symbol".to_string()
        )));
    }
    Ok(overview)
}

fn check_response(json: &Value) -> Result<()> {
    if let Some(error) = json.get("Error Message") {
        return Err(anyhow!(AnalysisError::ApiError(format!(
            "Alpha Vantage error: {}",
            error
        ))));
    }

    if let Some(note) = json.get("Note").or_else(|| json.get("Information")) {
        return Err(anyhow!(AnalysisError::RateLimited(format!(
            "Alpha Vantage rate limit: {}",
            note
        ))));
    }

    Ok(())
}

#[async_trait]
impl LiveDataSource for AlphaVantageClient {
    async fn snapshot(&self, ticker: &str) -> Result<Map<String, Value>, AnalysisError> {
        let overview = self.get_company_overview(ticker).await.map_err(|e| {
            match e.downcast::<AnalysisError>() {
                Ok(analysis_error) => analysis_error,
                Err(other) => AnalysisError::ApiError(other.to_string()),
            }
        })?;

        tracing::info!("Fetched live overview for {}", overview.symbol);

        let statements = self.get_financial_statements(ticker).await;
        if statements.is_empty() {
            tracing::debug!("No quarterly statements for {}", overview.symbol);
        }
        Ok(LiveSnapshot::from_parts(&overview, &statements).into_map())
    }
}
