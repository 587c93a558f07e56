//! Deterministic recomputation and tolerance checking of model-extracted
//! financial metrics.

pub mod calculator;
pub mod comparison;
pub mod extractor;
pub mod report;

pub use calculator::{Derivation, MetricCalculator};
pub use comparison::{ToleranceComparator, ValueDifference};
pub use extractor::{NumericExtractor, ScanSettings, DEFAULT_CONTEXT_WINDOW, DEFAULT_SCAN_CHAR_BUDGET};
pub use report::{overall_confidence, summarize, MetricsValidator};
