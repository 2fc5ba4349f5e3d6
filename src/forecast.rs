//! Next-period usage and cost forecasting.
//!
//! The engine is a pure function over a single-category, chronologically
//! ordered slice of [`BillingObservation`]s. It never re-sorts or
//! re-filters its input; use [`BillingHistory::series`] to prepare it.
//!
//! [`BillingHistory::series`]: crate::history::BillingHistory::series

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::observation::BillingObservation;
use crate::period::Period;

/// Strategy used to project the next period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForecastMethod {
    /// Plain mean of all observations.
    Average,
    /// Mean weighted `1..=n` from oldest to newest.
    #[default]
    WeightedAverage,
    /// Least-squares line over the observation index, evaluated one step ahead.
    LinearTrend,
}

impl ForecastMethod {
    pub const ALL: [ForecastMethod; 3] = [
        ForecastMethod::Average,
        ForecastMethod::WeightedAverage,
        ForecastMethod::LinearTrend,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ForecastMethod::Average => "average",
            ForecastMethod::WeightedAverage => "weighted_average",
            ForecastMethod::LinearTrend => "linear_trend",
        }
    }

    fn describe(&self, n: usize) -> String {
        let periods = if n == 1 { "period" } else { "periods" };
        match self {
            ForecastMethod::Average => {
                format!("Prediction is based on the average of the last {n} {periods}.")
            }
            ForecastMethod::WeightedAverage => format!(
                "Prediction is based on a weighted average of the last {n} {periods}, \
                 giving more weight to recent months."
            ),
            ForecastMethod::LinearTrend => {
                format!("Prediction extends the linear trend of the last {n} {periods}.")
            }
        }
    }
}

impl fmt::Display for ForecastMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ForecastMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "average" | "avg" | "simple" => Ok(ForecastMethod::Average),
            "weighted_average" | "weighted" => Ok(ForecastMethod::WeightedAverage),
            "linear_trend" | "linear" | "trend" => Ok(ForecastMethod::LinearTrend),
            other => Err(format!(
                "unknown forecast method \"{other}\" (expected average, weighted_average or linear_trend)"
            )),
        }
    }
}

/// Coarse reliability indicator derived from the sample count alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceLevel {
    Low,
    Medium,
    High,
}

impl fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ConfidenceLevel::Low => "low",
            ConfidenceLevel::Medium => "medium",
            ConfidenceLevel::High => "high",
        })
    }
}

/// Tunable thresholds for confidence grading and seasonal-skew detection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForecastParams {
    /// Observation count from which confidence is at least `Medium`.
    pub medium_confidence_min: usize,
    /// Observation count from which confidence is `High`.
    pub high_confidence_min: usize,
    /// Minimum observation count before skew detection runs.
    pub seasonal_min_observations: usize,
    /// Peak-to-trough usage ratio above which usage is considered seasonal.
    pub seasonal_skew_ratio: f64,
}

impl Default for ForecastParams {
    fn default() -> Self {
        Self {
            medium_confidence_min: 2,
            high_confidence_min: 4,
            seasonal_min_observations: 6,
            seasonal_skew_ratio: 1.3,
        }
    }
}

impl ForecastParams {
    pub fn confidence_for(&self, n: usize) -> ConfidenceLevel {
        if n < self.medium_confidence_min {
            ConfidenceLevel::Low
        } else if n < self.high_confidence_min {
            ConfidenceLevel::Medium
        } else {
            ConfidenceLevel::High
        }
    }
}

/// Outcome of a single forecast call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    /// Method the caller asked for.
    pub method: ForecastMethod,
    /// Method actually used after fallbacks.
    pub applied_method: ForecastMethod,
    pub observation_count: usize,
    /// Period being predicted, `None` without history.
    pub target_period: Option<Period>,
    pub predicted_units: u64,
    pub predicted_amount: u64,
    pub percent_change_from_last_period: i64,
    pub confidence_level: ConfidenceLevel,
    /// Peak-usage period when seasonal skew was detected.
    pub seasonal_peak: Option<Period>,
    pub explanation: String,
}

impl fmt::Display for ForecastResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Forecast ---")?;
        if let Some(target) = self.target_period {
            writeln!(f, "Target period:     {target}")?;
        }
        writeln!(f, "Method:            {}", self.applied_method)?;
        writeln!(f, "Predicted units:   {}", self.predicted_units)?;
        writeln!(f, "Predicted amount:  {}", self.predicted_amount)?;
        writeln!(
            f,
            "Change vs last:    {:+}%",
            self.percent_change_from_last_period
        )?;
        writeln!(f, "Confidence:        {}", self.confidence_level)?;
        write!(f, "{}", self.explanation)
    }
}

/// Forecast engine bound to a set of [`ForecastParams`].
///
/// # Examples
///
/// ```
/// use utility_forecast::forecast::{ForecastMethod, Forecaster};
/// use utility_forecast::observation::{BillingObservation, UtilityCategory};
/// use utility_forecast::period::Period;
///
/// let start = Period::new(2025, 1).unwrap();
/// let history: Vec<_> = [100.0, 200.0, 300.0]
///     .iter()
///     .enumerate()
///     .map(|(i, &u)| BillingObservation::new(start.advance(i), UtilityCategory::Water, u, u / 10.0))
///     .collect();
///
/// let result = Forecaster::default().forecast(&history, ForecastMethod::LinearTrend);
/// assert_eq!(result.predicted_units, 400);
/// assert_eq!(result.predicted_amount, 40);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Forecaster {
    params: ForecastParams,
}

impl Forecaster {
    pub fn new(params: ForecastParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &ForecastParams {
        &self.params
    }

    /// Predicts the period following the last observation.
    ///
    /// `observations` must hold a single category in ascending period order.
    /// Empty input yields an all-zero, low-confidence result.
    pub fn forecast(
        &self,
        observations: &[BillingObservation],
        method: ForecastMethod,
    ) -> ForecastResult {
        let Some(last) = observations.last() else {
            return ForecastResult {
                method,
                applied_method: method,
                observation_count: 0,
                target_period: None,
                predicted_units: 0,
                predicted_amount: 0,
                percent_change_from_last_period: 0,
                confidence_level: ConfidenceLevel::Low,
                seasonal_peak: None,
                explanation: "Not enough data to make a prediction.".to_string(),
            };
        };

        let n = observations.len();
        let units: Vec<f64> = observations.iter().map(|o| o.units_consumed).collect();
        let amounts: Vec<f64> = observations.iter().map(|o| o.billed_amount).collect();

        let (applied_method, raw_units, raw_amount) = match method {
            ForecastMethod::Average => (method, mean(&units), mean(&amounts)),
            ForecastMethod::WeightedAverage => {
                (method, weighted_mean(&units), weighted_mean(&amounts))
            }
            ForecastMethod::LinearTrend => {
                match (linear_projection(&units), linear_projection(&amounts)) {
                    (Some(u), Some(a)) => (method, u, a),
                    _ => {
                        debug!(n, "linear trend needs two or more points, using average");
                        (ForecastMethod::Average, mean(&units), mean(&amounts))
                    }
                }
            }
        };

        let predicted_units = to_non_negative_integer(raw_units);
        let predicted_amount = to_non_negative_integer(raw_amount);
        let percent_change_from_last_period =
            percent_change(predicted_units as f64, last.units_consumed);

        let mut explanation = applied_method.describe(n);
        let seasonal_peak = self.seasonal_peak(observations);
        if let Some(peak) = seasonal_peak {
            explanation.push_str(&format!(
                " Usage peaks around {peak}, so expect seasonal swings at that time of year."
            ));
        }

        ForecastResult {
            method,
            applied_method,
            observation_count: n,
            target_period: Some(last.period.next()),
            predicted_units,
            predicted_amount,
            percent_change_from_last_period,
            confidence_level: self.params.confidence_for(n),
            seasonal_peak,
            explanation,
        }
    }

    /// Returns the peak-usage period when the usage swing exceeds the skew ratio.
    ///
    /// A zero-usage trough counts as skewed whenever the peak is above zero.
    fn seasonal_peak(&self, observations: &[BillingObservation]) -> Option<Period> {
        if observations.len() < self.params.seasonal_min_observations {
            return None;
        }

        let mut peak = observations.first()?;
        let mut trough = peak;
        for o in observations {
            if o.units_consumed > peak.units_consumed {
                peak = o;
            }
            if o.units_consumed < trough.units_consumed {
                trough = o;
            }
        }

        let skewed = if trough.units_consumed > 0.0 {
            peak.units_consumed / trough.units_consumed > self.params.seasonal_skew_ratio
        } else {
            peak.units_consumed > 0.0
        };

        if skewed {
            debug!(peak = %peak.period, trough = %trough.period, "seasonal skew detected");
            Some(peak.period)
        } else {
            None
        }
    }
}

/// Forecasts with default parameters.
pub fn forecast(observations: &[BillingObservation], method: ForecastMethod) -> ForecastResult {
    Forecaster::default().forecast(observations, method)
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Weighted mean with weight `i + 1` for the i-th value.
fn weighted_mean(values: &[f64]) -> f64 {
    let mut weighted_sum = 0.0;
    let mut weight_total = 0.0;
    for (i, v) in values.iter().enumerate() {
        let w = (i + 1) as f64;
        weighted_sum += v * w;
        weight_total += w;
    }
    if weight_total == 0.0 {
        0.0
    } else {
        weighted_sum / weight_total
    }
}

/// Ordinary least squares over `x = 0..n`, evaluated at `x = n`.
///
/// `None` for fewer than two points or a degenerate fit.
fn linear_projection(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }

    let n = values.len() as f64;
    let mut sum_x = 0.0;
    let mut sum_y = 0.0;
    let mut sum_xy = 0.0;
    let mut sum_xx = 0.0;
    for (i, &y) in values.iter().enumerate() {
        let x = i as f64;
        sum_x += x;
        sum_y += y;
        sum_xy += x * y;
        sum_xx += x * x;
    }

    let denominator = n * sum_xx - sum_x * sum_x;
    if denominator == 0.0 {
        return None;
    }

    let slope = (n * sum_xy - sum_x * sum_y) / denominator;
    let intercept = (sum_y - slope * sum_x) / n;
    Some(slope * n + intercept)
}

/// Rounds half up, matching how bills are presented.
fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

fn to_non_negative_integer(value: f64) -> u64 {
    if !value.is_finite() || value <= 0.0 {
        return 0;
    }
    round_half_up(value) as u64
}

/// Percent change against `last`, 0 when `last` is zero.
///
/// The float-to-int cast saturates, so extreme ratios clamp to the `i64` range.
fn percent_change(predicted: f64, last: f64) -> i64 {
    if last == 0.0 || !last.is_finite() {
        return 0;
    }
    let pct = round_half_up((predicted - last) / last * 100.0);
    if pct.is_finite() { pct as i64 } else { 0 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observation::UtilityCategory;

    fn series(units: &[f64]) -> Vec<BillingObservation> {
        let start = Period::new(2024, 1).expect("valid period");
        units
            .iter()
            .enumerate()
            .map(|(i, &u)| {
                BillingObservation::new(start.advance(i), UtilityCategory::Electricity, u, u * 0.5)
            })
            .collect()
    }

    #[test]
    fn weighted_mean_favours_recent_values() {
        assert!((weighted_mean(&[100.0, 200.0, 300.0]) - 1400.0 / 6.0).abs() < 1e-9);
    }

    #[test]
    fn linear_projection_on_exact_line() {
        assert_eq!(linear_projection(&[100.0, 200.0, 300.0]), Some(400.0));
        assert_eq!(linear_projection(&[5.0]), None);
    }

    #[test]
    fn linear_projection_flat_series_stays_flat() {
        let projected = linear_projection(&[42.0, 42.0, 42.0, 42.0]);
        assert!(projected.is_some_and(|p| (p - 42.0).abs() < 1e-9));
    }

    #[test]
    fn round_half_up_behaviour() {
        assert_eq!(round_half_up(2.5), 3.0);
        assert_eq!(round_half_up(-2.5), -2.0);
        assert_eq!(round_half_up(233.33), 233.0);
    }

    #[test]
    fn falling_trend_is_clamped_at_zero() {
        let result = Forecaster::default().forecast(
            &series(&[300.0, 150.0, 10.0]),
            ForecastMethod::LinearTrend,
        );
        assert_eq!(result.predicted_units, 0);
        assert_eq!(result.predicted_amount, 0);
        assert_eq!(result.percent_change_from_last_period, -100);
    }

    #[test]
    fn linear_trend_with_one_point_reports_average() {
        let result = Forecaster::default().forecast(&series(&[120.0]), ForecastMethod::LinearTrend);
        assert_eq!(result.method, ForecastMethod::LinearTrend);
        assert_eq!(result.applied_method, ForecastMethod::Average);
        assert!(result.explanation.contains("average of the last 1 period."));
    }

    #[test]
    fn percent_change_against_last_period() {
        // average 150 vs last 200 → -25%
        let result = forecast(&series(&[100.0, 200.0]), ForecastMethod::Average);
        assert_eq!(result.percent_change_from_last_period, -25);
    }

    #[test]
    fn seasonal_peak_named_in_explanation() {
        let result = forecast(
            &series(&[100.0, 110.0, 180.0, 120.0, 100.0, 105.0]),
            ForecastMethod::Average,
        );
        let peak = Period::new(2024, 3).ok();
        assert_eq!(result.seasonal_peak, peak);
        assert!(result.explanation.contains("March 2024"));
    }

    #[test]
    fn no_seasonal_check_below_minimum_count() {
        let result = forecast(&series(&[100.0, 300.0, 100.0, 300.0, 100.0]), ForecastMethod::Average);
        assert_eq!(result.seasonal_peak, None);
    }

    #[test]
    fn mild_variation_is_not_seasonal() {
        let result = forecast(
            &series(&[100.0, 110.0, 120.0, 125.0, 115.0, 105.0]),
            ForecastMethod::Average,
        );
        assert_eq!(result.seasonal_peak, None);
    }

    #[test]
    fn zero_trough_with_usage_counts_as_seasonal() {
        let result = forecast(
            &series(&[0.0, 10.0, 10.0, 10.0, 10.0, 10.0]),
            ForecastMethod::Average,
        );
        assert!(result.seasonal_peak.is_some());

        let flat_zero = forecast(&series(&[0.0; 6]), ForecastMethod::Average);
        assert_eq!(flat_zero.seasonal_peak, None);
    }

    #[test]
    fn custom_params_shift_confidence_and_skew() {
        let params = ForecastParams {
            medium_confidence_min: 3,
            high_confidence_min: 10,
            seasonal_min_observations: 3,
            seasonal_skew_ratio: 2.5,
        };
        let engine = Forecaster::new(params);

        let two = engine.forecast(&series(&[100.0, 120.0]), ForecastMethod::Average);
        assert_eq!(two.confidence_level, ConfidenceLevel::Low);

        let three = engine.forecast(&series(&[100.0, 300.0, 100.0]), ForecastMethod::Average);
        assert_eq!(three.confidence_level, ConfidenceLevel::Medium);
        assert_eq!(three.seasonal_peak, Period::new(2024, 2).ok());

        let under_ratio = engine.forecast(&series(&[100.0, 200.0, 100.0]), ForecastMethod::Average);
        assert_eq!(under_ratio.seasonal_peak, None);
    }

    #[test]
    fn target_period_follows_last_observation() {
        let result = forecast(&series(&[1.0, 2.0, 3.0]), ForecastMethod::Average);
        assert_eq!(result.target_period, Period::new(2024, 4).ok());
    }

    #[test]
    fn method_names_parse() {
        for method in ForecastMethod::ALL {
            assert_eq!(method.as_str().parse::<ForecastMethod>(), Ok(method));
        }
        assert_eq!("Linear".parse::<ForecastMethod>(), Ok(ForecastMethod::LinearTrend));
        assert_eq!(
            "weighted-average".parse::<ForecastMethod>(),
            Ok(ForecastMethod::WeightedAverage)
        );
        assert!("median".parse::<ForecastMethod>().is_err());
    }
}
