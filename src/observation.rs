//! Billing observations and the enums that classify them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::period::Period;

/// Kind of metered service a bill belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UtilityCategory {
    Electricity,
    Water,
}

impl UtilityCategory {
    pub const ALL: [UtilityCategory; 2] = [UtilityCategory::Electricity, UtilityCategory::Water];

    /// Unit the meter reads in.
    pub fn unit(&self) -> &'static str {
        match self {
            UtilityCategory::Electricity => "kWh",
            UtilityCategory::Water => "m3",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UtilityCategory::Electricity => "electricity",
            UtilityCategory::Water => "water",
        }
    }
}

impl fmt::Display for UtilityCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UtilityCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "electricity" | "electric" | "power" => Ok(UtilityCategory::Electricity),
            "water" => Ok(UtilityCategory::Water),
            other => Err(format!(
                "unknown utility category \"{other}\" (expected \"electricity\" or \"water\")"
            )),
        }
    }
}

/// One historical bill: what was consumed in a period and what it cost.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BillingObservation {
    pub period: Period,
    pub category: UtilityCategory,
    /// Metered consumption in [`UtilityCategory::unit`] (non-negative).
    pub units_consumed: f64,
    /// Amount billed for the period (non-negative).
    pub billed_amount: f64,
}

impl BillingObservation {
    pub fn new(
        period: Period,
        category: UtilityCategory,
        units_consumed: f64,
        billed_amount: f64,
    ) -> Self {
        Self {
            period,
            category,
            units_consumed,
            billed_amount,
        }
    }
}
