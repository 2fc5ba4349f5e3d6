//! TOML-based configuration and preset definitions.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::forecast::{ForecastMethod, ForecastParams, Forecaster};
use crate::period::Period;
use crate::tariff::{Tariff, TariffTable};

/// Top-level configuration parsed from TOML.
///
/// All fields have defaults. Load from TOML with
/// [`AppConfig::from_toml_file`] or use [`AppConfig::default`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Forecast method and thresholds.
    #[serde(default)]
    pub forecast: ForecastConfig,
    /// Pricing used for bills entered without an amount and for sample data.
    #[serde(default)]
    pub tariffs: TariffTable,
    /// Demo history generation.
    #[serde(default)]
    pub sample: SampleConfig,
}

/// Forecast method and thresholds.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ForecastConfig {
    /// Method used when none is given on the command line.
    pub method: ForecastMethod,
    /// Observation count from which confidence is `Medium`.
    pub medium_confidence_min: usize,
    /// Observation count from which confidence is `High`.
    pub high_confidence_min: usize,
    /// Observation count before seasonal skew is looked for.
    pub seasonal_min_observations: usize,
    /// Peak/trough usage ratio treated as seasonal.
    pub seasonal_skew_ratio: f64,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        let params = ForecastParams::default();
        Self {
            method: ForecastMethod::default(),
            medium_confidence_min: params.medium_confidence_min,
            high_confidence_min: params.high_confidence_min,
            seasonal_min_observations: params.seasonal_min_observations,
            seasonal_skew_ratio: params.seasonal_skew_ratio,
        }
    }
}

impl ForecastConfig {
    pub fn params(&self) -> ForecastParams {
        ForecastParams {
            medium_confidence_min: self.medium_confidence_min,
            high_confidence_min: self.high_confidence_min,
            seasonal_min_observations: self.seasonal_min_observations,
            seasonal_skew_ratio: self.seasonal_skew_ratio,
        }
    }

    pub fn forecaster(&self) -> Forecaster {
        Forecaster::new(self.params())
    }
}

/// Demo history generation parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SampleConfig {
    /// First generated billing period.
    pub start: Period,
    /// Number of monthly bills per category (must be > 0).
    pub months: usize,
    /// Random seed.
    pub seed: u64,
}

impl Default for SampleConfig {
    fn default() -> Self {
        Self {
            start: Period::january(2024),
            months: 12,
            seed: 42,
        }
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug, Clone, Error)]
#[error("config error: {field} - {message}")]
pub struct ConfigError {
    /// Dotted field path (e.g., `"forecast.seasonal_skew_ratio"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl ConfigError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl AppConfig {
    /// Returns the cautious preset: more history needed for each confidence step
    /// and a lower bar for flagging seasonal usage.
    pub fn cautious() -> Self {
        Self {
            forecast: ForecastConfig {
                method: ForecastMethod::Average,
                medium_confidence_min: 3,
                high_confidence_min: 6,
                seasonal_min_observations: 6,
                seasonal_skew_ratio: 1.2,
            },
            ..Self::default()
        }
    }

    /// Returns the trend preset: linear extrapolation with default thresholds.
    pub fn trend() -> Self {
        Self {
            forecast: ForecastConfig {
                method: ForecastMethod::LinearTrend,
                ..ForecastConfig::default()
            },
            ..Self::default()
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["default", "cautious", "trend"];

    /// Loads configuration from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "default" => Ok(Self::default()),
            "cautious" => Ok(Self::cautious()),
            "trend" => Ok(Self::trend()),
            _ => Err(ConfigError::new(
                "preset",
                format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            )),
        }
    }

    /// Parses configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| {
            ConfigError::new("config", format!("cannot read \"{}\": {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::new("toml", e.to_string()))
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        let fc = &self.forecast;

        if fc.medium_confidence_min == 0 {
            errors.push(ConfigError::new(
                "forecast.medium_confidence_min",
                "must be > 0",
            ));
        }
        if fc.medium_confidence_min > fc.high_confidence_min {
            errors.push(ConfigError::new(
                "forecast.medium_confidence_min",
                "must be <= forecast.high_confidence_min",
            ));
        }
        if fc.seasonal_min_observations < 2 {
            errors.push(ConfigError::new(
                "forecast.seasonal_min_observations",
                "must be >= 2",
            ));
        }
        if !fc.seasonal_skew_ratio.is_finite() || fc.seasonal_skew_ratio < 1.0 {
            errors.push(ConfigError::new(
                "forecast.seasonal_skew_ratio",
                format!("must be a finite value >= 1.0, got {}", fc.seasonal_skew_ratio),
            ));
        }

        validate_tariff(&mut errors, "tariffs.electricity", &self.tariffs.electricity);
        validate_tariff(&mut errors, "tariffs.water", &self.tariffs.water);

        if self.sample.months == 0 {
            errors.push(ConfigError::new("sample.months", "must be > 0"));
        }

        errors
    }
}

fn validate_tariff(errors: &mut Vec<ConfigError>, prefix: &str, tariff: &Tariff) {
    if !tariff.rate_per_unit.is_finite() || tariff.rate_per_unit < 0.0 {
        errors.push(ConfigError::new(
            format!("{prefix}.rate_per_unit"),
            "must be a finite value >= 0",
        ));
    }
    if !tariff.fixed_charge.is_finite() || tariff.fixed_charge < 0.0 {
        errors.push(ConfigError::new(
            format!("{prefix}.fixed_charge"),
            "must be a finite value >= 0",
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_valid() {
        let cfg = AppConfig::default();
        let errors = cfg.validate();
        assert!(errors.is_empty(), "default should be valid: {errors:?}");
    }

    #[test]
    fn default_matches_engine_defaults() {
        assert_eq!(AppConfig::default().forecast.params(), ForecastParams::default());
    }

    #[test]
    fn from_preset_unknown() {
        let err = AppConfig::from_preset("nonexistent");
        assert!(err.is_err());
        let e = err.unwrap_err();
        assert!(e.message.contains("unknown preset"));
    }

    #[test]
    fn all_presets_are_valid() {
        for name in AppConfig::PRESETS {
            let cfg = AppConfig::from_preset(name);
            assert!(cfg.is_ok(), "preset \"{name}\" should load");
            let errors = cfg.as_ref().map(|c| c.validate()).unwrap_or_default();
            assert!(
                errors.is_empty(),
                "preset \"{name}\" should be valid: {errors:?}"
            );
        }
    }

    #[test]
    fn valid_toml_parses() {
        let toml = r#"
[forecast]
method = "linear_trend"
medium_confidence_min = 3
high_confidence_min = 5
seasonal_min_observations = 8
seasonal_skew_ratio = 1.5

[tariffs.electricity]
rate_per_unit = 0.31
fixed_charge = 7.5

[tariffs.water]
rate_per_unit = 1.8
fixed_charge = 2.0

[sample]
start = "March 2023"
months = 24
seed = 7
"#;
        let cfg = AppConfig::from_toml_str(toml);
        assert!(cfg.is_ok(), "valid TOML should parse: {:?}", cfg.err());
        let cfg = cfg.ok();
        assert_eq!(
            cfg.as_ref().map(|c| c.forecast.method),
            Some(ForecastMethod::LinearTrend)
        );
        assert_eq!(cfg.as_ref().map(|c| c.forecast.high_confidence_min), Some(5));
        assert_eq!(
            cfg.as_ref().map(|c| c.tariffs.electricity.rate_per_unit),
            Some(0.31)
        );
        assert_eq!(cfg.as_ref().map(|c| c.sample.start), Period::new(2023, 3).ok());
        assert_eq!(cfg.as_ref().map(|c| c.sample.months), Some(24));
    }

    #[test]
    fn invalid_toml_unknown_field() {
        let toml = r#"
[forecast]
method = "average"
bogus_field = true
"#;
        assert!(AppConfig::from_toml_str(toml).is_err());
    }

    #[test]
    fn unknown_method_rejected() {
        let toml = r#"
[forecast]
method = "median"
"#;
        assert!(AppConfig::from_toml_str(toml).is_err());
    }

    #[test]
    fn partial_toml_uses_defaults() {
        let toml = r#"
[tariffs.water]
rate_per_unit = 4.0
fixed_charge = 0.0
"#;
        let cfg = AppConfig::from_toml_str(toml);
        assert!(cfg.is_ok());
        let cfg = cfg.ok();
        assert_eq!(cfg.as_ref().map(|c| c.tariffs.water.rate_per_unit), Some(4.0));
        // electricity tariff kept default
        assert_eq!(
            cfg.as_ref().map(|c| c.tariffs.electricity.rate_per_unit),
            Some(0.25)
        );
        assert_eq!(
            cfg.as_ref().map(|c| c.forecast.method),
            Some(ForecastMethod::WeightedAverage)
        );
    }

    #[test]
    fn validation_catches_inverted_breakpoints() {
        let mut cfg = AppConfig::default();
        cfg.forecast.medium_confidence_min = 5;
        cfg.forecast.high_confidence_min = 3;
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "forecast.medium_confidence_min"));
    }

    #[test]
    fn validation_catches_bad_ratio() {
        let mut cfg = AppConfig::default();
        cfg.forecast.seasonal_skew_ratio = 0.5;
        assert!(
            cfg.validate()
                .iter()
                .any(|e| e.field == "forecast.seasonal_skew_ratio")
        );
        cfg.forecast.seasonal_skew_ratio = f64::NAN;
        assert!(
            cfg.validate()
                .iter()
                .any(|e| e.field == "forecast.seasonal_skew_ratio")
        );
    }

    #[test]
    fn validation_catches_negative_tariff() {
        let mut cfg = AppConfig::default();
        cfg.tariffs.water.fixed_charge = -1.0;
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "tariffs.water.fixed_charge"));
    }

    #[test]
    fn validation_catches_zero_months() {
        let mut cfg = AppConfig::default();
        cfg.sample.months = 0;
        assert!(cfg.validate().iter().any(|e| e.field == "sample.months"));
    }

    #[test]
    fn cautious_requires_more_history() {
        let base = AppConfig::default();
        let cautious = AppConfig::cautious();
        assert!(cautious.forecast.high_confidence_min > base.forecast.high_confidence_min);
    }
}
