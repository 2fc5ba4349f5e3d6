//! Per-category tariffs used to price consumption.

use serde::{Deserialize, Serialize};

use crate::observation::UtilityCategory;

/// Linear tariff: a fixed monthly charge plus a per-unit rate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Tariff {
    /// Price per metered unit.
    pub rate_per_unit: f64,
    /// Standing charge added to every bill.
    pub fixed_charge: f64,
}

impl Tariff {
    pub fn new(rate_per_unit: f64, fixed_charge: f64) -> Self {
        Self {
            rate_per_unit,
            fixed_charge,
        }
    }

    /// Bill for `units` of consumption.
    pub fn amount_for(&self, units: f64) -> f64 {
        self.fixed_charge + self.rate_per_unit * units.max(0.0)
    }
}

/// Tariffs for every supported category.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TariffTable {
    pub electricity: Tariff,
    pub water: Tariff,
}

impl Default for TariffTable {
    fn default() -> Self {
        Self {
            electricity: Tariff::new(0.25, 5.0),
            water: Tariff::new(2.0, 3.0),
        }
    }
}

impl TariffTable {
    pub fn for_category(&self, category: UtilityCategory) -> &Tariff {
        match category {
            UtilityCategory::Electricity => &self.electricity,
            UtilityCategory::Water => &self.water,
        }
    }
}
