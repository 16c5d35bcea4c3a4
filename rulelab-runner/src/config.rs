//! Serializable backtest configuration.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use rulelab_core::domain::RiskConfig;

/// Unique identifier for a backtest run (content-addressable hash).
pub type RunId = String;

/// Errors raised while loading or validating a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("initial capital must be positive, got {0}")]
    NonPositiveCapital(f64),
}

/// Configuration for a single backtest run.
///
/// Captures everything needed to reproduce the run: policy id and parameters,
/// instrument, timeframe label, capital, and optional risk/cost settings.
/// Created once per run and read-only thereafter.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BacktestConfig {
    /// Policy id resolved by the policy factory (e.g. "ma_crossover").
    pub policy: String,
    pub symbol: String,
    /// Timeframe label carried through to the result (e.g. "1d", "5m").
    pub timeframe: String,
    pub initial_capital: f64,
    /// Policy parameters (window lengths, band multiplier, stop distances...).
    #[serde(default)]
    pub params: BTreeMap<String, f64>,
    #[serde(default)]
    pub risk: Option<RiskConfig>,
    #[serde(default)]
    pub cost: Option<CostConfig>,
}

/// Cost-model metadata attached to trade records, never touching pnl.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CostConfig {
    /// Broker product label stamped onto trades (e.g. "MIS", "CNC").
    #[serde(default)]
    pub product: Option<String>,
}

impl BacktestConfig {
    /// Computes a deterministic hash ID for this configuration.
    ///
    /// Two runs with identical configs share the same RunId, which downstream
    /// persistence layers can use for dedup/cache lookups.
    pub fn run_id(&self) -> RunId {
        let json = serde_json::to_string(self).expect("BacktestConfig serialization failed");
        let hash = blake3::hash(json.as_bytes());
        hash.to_hex().to_string()
    }

    /// Parse a config from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check invariants that must hold before any bar is processed.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.initial_capital <= 0.0 {
            return Err(ConfigError::NonPositiveCapital(self.initial_capital));
        }
        Ok(())
    }

    /// Effective risk configuration (defaults when the section is omitted).
    pub fn risk_config(&self) -> RiskConfig {
        self.risk.clone().unwrap_or_default()
    }
}
