//! Per-category report: history summary plus forecast.

use std::fmt;

use serde::Serialize;

use crate::forecast::{ForecastMethod, ForecastResult, Forecaster};
use crate::history::{BillingHistory, UsageSummary, forecast_series};
use crate::observation::{BillingObservation, UtilityCategory};

/// Everything shown for one utility category.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryReport {
    pub category: UtilityCategory,
    pub summary: UsageSummary,
    pub forecast: ForecastResult,
    /// Chronological series the forecast was computed from.
    pub series: Vec<BillingObservation>,
}

impl CategoryReport {
    pub fn build(
        history: &BillingHistory,
        category: UtilityCategory,
        method: ForecastMethod,
        forecaster: &Forecaster,
    ) -> Self {
        let series = history.series(category);
        Self {
            category,
            summary: UsageSummary::from_series(category, &series),
            forecast: forecast_series(category, &series, method, forecaster),
            series,
        }
    }

    /// Builds one report per category, in the given order.
    pub fn build_all(
        history: &BillingHistory,
        categories: &[UtilityCategory],
        method: ForecastMethod,
        forecaster: &Forecaster,
    ) -> Vec<Self> {
        categories
            .iter()
            .map(|&category| Self::build(history, category, method, forecaster))
            .collect()
    }
}

impl fmt::Display for CategoryReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.summary)?;
        writeln!(f)?;
        write!(f, "{}", self.forecast)
    }
}
