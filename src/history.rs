//! Mixed-category billing history and per-category summaries.

use std::fmt;

use serde::Serialize;
use tracing::warn;

use crate::forecast::{ForecastMethod, ForecastResult, Forecaster};
use crate::observation::{BillingObservation, UtilityCategory};
use crate::period::Period;

/// All recorded bills, in entry order, across categories.
#[derive(Debug, Clone, Default)]
pub struct BillingHistory {
    observations: Vec<BillingObservation>,
}

impl BillingHistory {
    pub fn new(observations: Vec<BillingObservation>) -> Self {
        Self { observations }
    }

    pub fn push(&mut self, observation: BillingObservation) {
        self.observations.push(observation);
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn observations(&self) -> &[BillingObservation] {
        &self.observations
    }

    /// Distinct categories in order of first appearance.
    pub fn categories(&self) -> Vec<UtilityCategory> {
        let mut seen = Vec::new();
        for o in &self.observations {
            if !seen.contains(&o.category) {
                seen.push(o.category);
            }
        }
        seen
    }

    /// Observations of one category, oldest first.
    ///
    /// Sorting is stable, so repeated periods keep their entry order.
    pub fn series(&self, category: UtilityCategory) -> Vec<BillingObservation> {
        let mut series: Vec<BillingObservation> = self
            .observations
            .iter()
            .filter(|o| o.category == category)
            .copied()
            .collect();
        series.sort_by_key(|o| o.period);
        series
    }

    /// Periods billed more than once for `category`, oldest first.
    pub fn duplicate_periods(&self, category: UtilityCategory) -> Vec<Period> {
        repeated_periods(&self.series(category))
    }

    pub fn summary(&self, category: UtilityCategory) -> UsageSummary {
        UsageSummary::from_series(category, &self.series(category))
    }

    /// Runs `forecaster` over the prepared series for `category`.
    pub fn forecast(
        &self,
        category: UtilityCategory,
        method: ForecastMethod,
        forecaster: &Forecaster,
    ) -> ForecastResult {
        forecast_series(category, &self.series(category), method, forecaster)
    }
}

/// Repeated periods in a chronologically ordered series, each listed once.
pub fn repeated_periods(series: &[BillingObservation]) -> Vec<Period> {
    let mut duplicates: Vec<Period> = series
        .windows(2)
        .filter(|pair| pair[0].period == pair[1].period)
        .map(|pair| pair[0].period)
        .collect();
    duplicates.dedup();
    duplicates
}

/// Forecasts an already prepared series, warning about repeated periods.
///
/// `series` must come from [`BillingHistory::series`] for `category`.
pub fn forecast_series(
    category: UtilityCategory,
    series: &[BillingObservation],
    method: ForecastMethod,
    forecaster: &Forecaster,
) -> ForecastResult {
    let duplicates = repeated_periods(series);
    if !duplicates.is_empty() {
        warn!(
            %category,
            count = duplicates.len(),
            "history has repeated billing periods; each is counted separately"
        );
    }
    forecaster.forecast(series, method)
}

impl FromIterator<BillingObservation> for BillingHistory {
    fn from_iter<I: IntoIterator<Item = BillingObservation>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Aggregate figures for one category's history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UsageSummary {
    pub category: UtilityCategory,
    pub periods: usize,
    pub first_period: Option<Period>,
    pub last_period: Option<Period>,
    pub total_units: f64,
    pub total_amount: f64,
    pub average_units: f64,
    pub average_amount: f64,
    /// Total amount divided by total units, 0 without consumption.
    pub average_unit_cost: f64,
    pub peak_period: Option<Period>,
}

impl UsageSummary {
    /// Summarizes an already filtered, chronologically ordered series.
    pub fn from_series(category: UtilityCategory, series: &[BillingObservation]) -> Self {
        let periods = series.len();
        let total_units: f64 = series.iter().map(|o| o.units_consumed).sum();
        let total_amount: f64 = series.iter().map(|o| o.billed_amount).sum();
        let (average_units, average_amount) = if periods > 0 {
            (total_units / periods as f64, total_amount / periods as f64)
        } else {
            (0.0, 0.0)
        };
        let average_unit_cost = if total_units > 0.0 {
            total_amount / total_units
        } else {
            0.0
        };

        let peak_period = series
            .iter()
            .fold(None::<&BillingObservation>, |best, o| match best {
                Some(b) if b.units_consumed >= o.units_consumed => Some(b),
                _ => Some(o),
            })
            .map(|o| o.period);

        Self {
            category,
            periods,
            first_period: series.first().map(|o| o.period),
            last_period: series.last().map(|o| o.period),
            total_units,
            total_amount,
            average_units,
            average_amount,
            average_unit_cost,
            peak_period,
        }
    }
}

impl fmt::Display for UsageSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let unit = self.category.unit();
        writeln!(f, "--- {} usage ---", self.category)?;
        match (self.first_period, self.last_period) {
            (Some(first), Some(last)) => {
                writeln!(f, "Periods:           {} ({first} to {last})", self.periods)?;
            }
            _ => writeln!(f, "Periods:           0")?,
        }
        writeln!(f, "Total usage:       {:.1} {unit}", self.total_units)?;
        writeln!(f, "Total billed:      {:.2}", self.total_amount)?;
        writeln!(f, "Average usage:     {:.1} {unit}", self.average_units)?;
        writeln!(f, "Average bill:      {:.2}", self.average_amount)?;
        write!(f, "Cost per unit:     {:.3} / {unit}", self.average_unit_cost)?;
        if let Some(peak) = self.peak_period {
            write!(f, "\nPeak usage:        {peak}")?;
        }
        Ok(())
    }
}
