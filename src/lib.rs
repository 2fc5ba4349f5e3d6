//! Household utility bill tracking and next-month forecasting.

pub mod cli;
pub mod config;
pub mod error;
/// Next-period usage and cost forecasting engine.
pub mod forecast;
pub mod history;
pub mod io;
pub mod observation;
/// Structured monthly billing periods.
pub mod period;
pub mod report;
pub mod sample;
pub mod tariff;

pub use error::{Error, Result};
pub use forecast::{
    ConfidenceLevel, ForecastMethod, ForecastParams, ForecastResult, Forecaster, forecast,
};
pub use observation::{BillingObservation, UtilityCategory};
pub use period::Period;
