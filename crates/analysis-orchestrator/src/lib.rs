use analysis_core::{
    AnalysisError, LiveDataSource, MetricsRecord, TextGenerator, ValidationReport,
};
use serde_json::{Map, Value};
use validation::MetricsValidator;

pub mod config;
pub mod merge;
pub mod payload;
pub mod prompt;
pub mod red_flags;
pub mod risk;
pub mod session;

pub use config::EngineConfig;
pub use merge::{apply_validation, merge_live_data};
pub use payload::extract_json_payload;
pub use red_flags::{apply_red_flag_safety_net, implied_red_flags};
pub use risk::{normalize_risk, sector_benchmarks, RiskItem};
pub use session::DocumentSession;

/// Runs the metrics pipeline for one document: model extraction, live-data
/// override, risk normalization, red-flag safety net and deterministic
/// validation.
pub struct MetricsOrchestrator {
    generator: Box<dyn TextGenerator>,
    /// Optional authoritative market data keyed by ticker
    live_source: Option<Box<dyn LiveDataSource>>,
    config: EngineConfig,
}

impl MetricsOrchestrator {
    pub fn new(generator: Box<dyn TextGenerator>, config: EngineConfig) -> Self {
        Self {
            generator,
            live_source: None,
            config,
        }
    }

    pub fn with_live_source(mut self, source: Box<dyn LiveDataSource>) -> Self {
        self.live_source = Some(source);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Extract, merge and validate metrics for the session's document.
    pub async fn extract_metrics(
        &self,
        session: &DocumentSession,
        ticker: Option<&str>,
    ) -> Result<MetricsRecord, AnalysisError> {
        if session.is_empty() {
            return Err(AnalysisError::InsufficientData(
                "no document loaded".to_string(),
            ));
        }

        let ticker = ticker
            .map(|t| t.trim().to_uppercase())
            .filter(|t| !t.is_empty() && t != "UNKNOWN");

        tracing::info!(
            "Extracting metrics (document: {} chars, ticker: {})",
            session.text().chars().count(),
            ticker.as_deref().unwrap_or("none")
        );

        let live = match ticker.as_deref() {
            Some(t) => self.fetch_live(t).await,
            None => None,
        };

        let prompt = prompt::metrics_prompt(
            ticker.as_deref(),
            live.as_ref(),
            session.prompt_context(self.config.prompt_char_budget),
        );
        let raw = self.generator.generate(&prompt).await?;
        tracing::debug!("Model response received ({} chars)", raw.len());

        let mut record = MetricsRecord::from(extract_json_payload(&raw)?);

        if let Some(live) = &live {
            merge_live_data(&mut record, live);
        }

        normalize_risk(&mut record);
        apply_red_flag_safety_net(&mut record);

        let report = self.validate(session, &record);
        apply_validation(&mut record, &report);

        tracing::info!(
            "Metrics extraction complete: {} keys, overall confidence {}",
            record.as_map().len(),
            report.overall_confidence.as_str()
        );

        Ok(record)
    }

    /// Validate a record against the session's document without touching it.
    pub fn validate(&self, session: &DocumentSession, record: &MetricsRecord) -> ValidationReport {
        MetricsValidator::with_settings(session.text(), self.config.scan_settings())
            .validate_all(record)
    }

    /// A failed live fetch degrades to "no live data".
    async fn fetch_live(&self, ticker: &str) -> Option<Map<String, Value>> {
        let source = self.live_source.as_ref()?;
        match source.snapshot(ticker).await {
            Ok(snapshot) => {
                tracing::info!("Live data for {}: {} fields", ticker, snapshot.len());
                Some(snapshot)
            }
            Err(e) => {
                tracing::warn!("Live data fetch failed for {}: {}", ticker, e);
                None
            }
        }
    }
}
