//! Shared test fixtures for integration tests.

#![allow(dead_code)]

use utility_forecast::observation::{BillingObservation, UtilityCategory};
use utility_forecast::period::Period;

/// First period used by every fixture series (January 2025).
pub fn start_period() -> Period {
    Period::january(2025)
}

/// Electricity series with the given monthly units, billed at 0.25 per unit.
///
/// Observations are consecutive months starting at [`start_period`].
pub fn electricity(units: &[f64]) -> Vec<BillingObservation> {
    series(UtilityCategory::Electricity, units, 0.25)
}

/// Water series with the given monthly units, billed at 2.0 per unit.
pub fn water(units: &[f64]) -> Vec<BillingObservation> {
    series(UtilityCategory::Water, units, 2.0)
}

fn series(category: UtilityCategory, units: &[f64], rate: f64) -> Vec<BillingObservation> {
    units
        .iter()
        .enumerate()
        .map(|(i, &u)| BillingObservation::new(start_period().advance(i), category, u, u * rate))
        .collect()
}

/// CSV history mixing both categories, deliberately out of order.
pub const MIXED_HISTORY_CSV: &str = "\
period,category,units_consumed,billed_amount
March 2025,electricity,300,80
January 2025,electricity,100,30
2025-02,water,12,27
February 2025,electricity,200,55
2025-01,water,10,
2025-03,water,14,31
";
