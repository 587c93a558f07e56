use serde_json::{Map, Value};

/// Keys the model is asked to return
const REQUESTED_KEYS: &str = "\
- company_name, company_description, fiscal_year, revenue, net_income
- revenue_growth, profit_margin, risk_score (0-10)
- volatility (Low/Med/High), eps, pe_ratio, roe, revenue_cagr
- debt_equity, current_ratio, ownership, beta, market_cap
- dividend_yield, free_cash_flow, price_to_book
- red_flags (at least 2 strings)
- risk_details: {\"liquidity\": {\"score\": 0-100, \"summary\": \"...\", \"factors\": [], \"critical_red_flags\": \"...\"}, \"market\": {...}, \"credit\": {...}, \"governance\": {...}}";

/// Metrics extraction prompt: live data first, then the document context.
pub fn metrics_prompt(ticker: Option<&str>, live: Option<&Map<String, Value>>, context: &str) -> String {
    let live_block = match live {
        Some(snapshot) if !snapshot.is_empty() => {
            serde_json::to_string(snapshot).unwrap_or_else(|_| "No live data available.".to_string())
        }
        _ => "No live data available.".to_string(),
    };

    format!(
        "Analyze the following financial context and extract metrics.\n\n\
         RULES:\n\
         1. LIVE API DATA is the source of truth for numeric metrics when it conflicts with the text.\n\
         2. Output strict JSON only: no comments, no markdown fences, no prose.\n\
         3. Ticker identified: {ticker}\n\n\
         LIVE API DATA:\n{live_block}\n\n\
         CONTEXT:\n{context}\n\n\
         Return JSON with these keys:\n{REQUESTED_KEYS}\n",
        ticker = ticker.unwrap_or("Unknown"),
    )
}
