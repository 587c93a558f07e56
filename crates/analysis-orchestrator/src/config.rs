use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use validation::{ScanSettings, DEFAULT_CONTEXT_WINDOW, DEFAULT_SCAN_CHAR_BUDGET};

pub const DEFAULT_PROMPT_CHAR_BUDGET: usize = 10_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    // Extraction
    pub context_window: usize,      // characters either side of a keyword
    pub scan_char_budget: usize,    // document prefix scanned by the extractor
    pub prompt_char_budget: usize,  // document prefix handed to the model

    // External APIs
    pub alpha_vantage_api_key: Option<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            context_window: DEFAULT_CONTEXT_WINDOW,
            scan_char_budget: DEFAULT_SCAN_CHAR_BUDGET,
            prompt_char_budget: DEFAULT_PROMPT_CHAR_BUDGET,
            alpha_vantage_api_key: None,
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Build the config from any variable lookup (the process environment in production).
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let config = Self {
            context_window: read_usize(&lookup, "EXTRACTION_CONTEXT_WINDOW", DEFAULT_CONTEXT_WINDOW)?,
            scan_char_budget: read_usize(&lookup, "SCAN_CHAR_BUDGET", DEFAULT_SCAN_CHAR_BUDGET)?,
            prompt_char_budget: read_usize(&lookup, "PROMPT_CHAR_BUDGET", DEFAULT_PROMPT_CHAR_BUDGET)?,
            alpha_vantage_api_key: lookup("ALPHA_VANTAGE_API_KEY").filter(|k| !k.trim().is_empty()),
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.context_window == 0 {
            bail!("EXTRACTION_CONTEXT_WINDOW must be greater than zero");
        }
        if self.scan_char_budget == 0 {
            bail!("SCAN_CHAR_BUDGET must be greater than zero");
        }
        if self.prompt_char_budget == 0 {
            bail!("PROMPT_CHAR_BUDGET must be greater than zero");
        }
        Ok(())
    }

    pub fn scan_settings(&self) -> ScanSettings {
        ScanSettings {
            context_window: self.context_window,
            max_chars: self.scan_char_budget,
        }
    }
}

fn read_usize(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: usize) -> Result<usize> {
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} must be a non-negative integer, got {:?}", key, raw)),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = EngineConfig::from_vars(vars(&[])).unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.scan_settings(), ScanSettings::default());
        assert_eq!(config.prompt_char_budget, 10_000);
    }

    #[test]
    fn test_overrides() {
        let config = EngineConfig::from_vars(vars(&[
            ("EXTRACTION_CONTEXT_WINDOW", "80"),
            ("SCAN_CHAR_BUDGET", " 5000 "),
            ("ALPHA_VANTAGE_API_KEY", "demo"),
        ]))
        .unwrap();
        assert_eq!(config.context_window, 80);
        assert_eq!(config.scan_char_budget, 5000);
        assert_eq!(config.alpha_vantage_api_key.as_deref(), Some("demo"));
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(EngineConfig::from_vars(vars(&[("SCAN_CHAR_BUDGET", "lots")])).is_err());
        assert!(EngineConfig::from_vars(vars(&[("PROMPT_CHAR_BUDGET", "0")])).is_err());
        assert!(EngineConfig::from_vars(vars(&[("EXTRACTION_CONTEXT_WINDOW", "-5")])).is_err());
    }

    #[test]
    fn test_blank_api_key_is_none() {
        let config = EngineConfig::from_vars(vars(&[("ALPHA_VANTAGE_API_KEY", "  ")])).unwrap();
        assert!(config.alpha_vantage_api_key.is_none());
    }
}
