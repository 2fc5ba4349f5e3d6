//! Calendar billing periods.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PeriodError;

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// A monthly billing cycle.
///
/// Ordering is chronological: year first, then month.
///
/// # Examples
///
/// ```
/// use utility_forecast::period::Period;
///
/// let nov: Period = "November 2025".parse().unwrap();
/// let dec: Period = "2025-12".parse().unwrap();
/// assert!(nov < dec);
/// assert_eq!(nov.next(), dec);
/// assert_eq!(dec.next().to_string(), "January 2026");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Period {
    year: i32,
    month: u8,
}

impl Period {
    /// Earliest accepted year.
    pub const MIN_YEAR: i32 = 1;
    /// Latest accepted year.
    pub const MAX_YEAR: i32 = 9999;

    /// Creates a period, rejecting months outside `1..=12` and years outside
    /// [`MIN_YEAR`](Self::MIN_YEAR)..=[`MAX_YEAR`](Self::MAX_YEAR).
    pub fn new(year: i32, month: u8) -> Result<Self, PeriodError> {
        if !(Self::MIN_YEAR..=Self::MAX_YEAR).contains(&year) {
            return Err(PeriodError::YearOutOfRange(year));
        }
        if !(1..=12).contains(&month) {
            return Err(PeriodError::InvalidMonth(month));
        }
        Ok(Self { year, month })
    }

    /// January of `year`, without the range check applied by [`new`](Self::new).
    pub const fn january(year: i32) -> Self {
        Self { year, month: 1 }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    /// Month number, 1 = January.
    pub fn month(&self) -> u8 {
        self.month
    }

    pub fn month_name(&self) -> &'static str {
        MONTH_NAMES[usize::from(self.month - 1)]
    }

    /// The billing period immediately after this one.
    ///
    /// Saturates at December of `i32::MAX` instead of overflowing.
    pub fn next(&self) -> Self {
        if self.month == 12 {
            match self.year.checked_add(1) {
                Some(year) => Self { year, month: 1 },
                None => *self,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    /// Steps forward `months` periods, saturating like [`next`](Self::next).
    pub fn advance(&self, months: usize) -> Self {
        let months = i64::try_from(months).unwrap_or(i64::MAX);
        let zero_based =
            (i64::from(self.year) * 12 + i64::from(self.month - 1)).saturating_add(months);
        match i32::try_from(zero_based.div_euclid(12)) {
            Ok(year) => Self {
                year,
                month: (zero_based.rem_euclid(12) + 1) as u8,
            },
            Err(_) => Self {
                year: i32::MAX,
                month: 12,
            },
        }
    }
}

fn month_from_name(name: &str) -> Option<u8> {
    let lower = name.to_ascii_lowercase();
    if lower.len() < 3 {
        return None;
    }
    MONTH_NAMES
        .iter()
        .position(|m| m.to_ascii_lowercase().starts_with(&lower))
        .map(|idx| idx as u8 + 1)
}

impl FromStr for Period {
    type Err = PeriodError;

    /// Accepts `"November 2025"`, `"Nov 2025"` and `"2025-11"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let unparsable = || PeriodError::Unparsable(trimmed.to_string());

        if let Some((year, month)) = trimmed.split_once('-') {
            let year = year.trim().parse::<i32>().map_err(|_| unparsable())?;
            let month = month.trim().parse::<u8>().map_err(|_| unparsable())?;
            return Self::new(year, month);
        }

        let mut parts = trimmed.split_whitespace();
        let (Some(name), Some(year), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(unparsable());
        };
        let month = month_from_name(name).ok_or_else(unparsable)?;
        let year = year.parse::<i32>().map_err(|_| unparsable())?;
        Self::new(year, month)
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.month_name(), self.year)
    }
}

impl TryFrom<String> for Period {
    type Error = PeriodError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Period> for String {
    fn from(period: Period) -> Self {
        period.to_string()
    }
}
