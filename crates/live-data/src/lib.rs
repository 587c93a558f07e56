//! Live market data sources that feed the metrics merger.

pub mod alpha_vantage;
pub mod snapshot;
pub mod static_source;
pub mod statements;

pub use alpha_vantage::{parse_overview, AlphaVantageClient, CompanyOverview};
pub use snapshot::{fmt_large, fmt_pct, number_or_na, LiveSnapshot, RiskSubScores};
pub use static_source::StaticSnapshotSource;
pub use statements::{FinancialStatements, QuarterlyHistory};
