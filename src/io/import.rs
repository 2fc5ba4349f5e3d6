//! CSV import of billing history.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use serde::Deserialize;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::history::BillingHistory;
use crate::observation::{BillingObservation, UtilityCategory};
use crate::period::Period;
use crate::tariff::TariffTable;

/// Expected column header for history import.
pub const HISTORY_HEADER: &str = "period,category,units_consumed,billed_amount";

/// One raw CSV row before validation.
#[derive(Debug, Deserialize)]
struct BillRecord {
    period: String,
    category: String,
    units_consumed: f64,
    /// Empty cells are priced with the category tariff.
    billed_amount: Option<f64>,
}

/// Reads billing history from a CSV file at the given path.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or any row is invalid.
pub fn import_csv(path: &Path, tariffs: &TariffTable) -> Result<BillingHistory> {
    let file = File::open(path)?;
    let history = read_csv(io::BufReader::new(file), tariffs)?;
    info!(path = %path.display(), bills = history.len(), "loaded billing history");
    Ok(history)
}

/// Reads billing history from any CSV source.
///
/// Columns follow [`HISTORY_HEADER`]; surrounding whitespace is ignored.
///
/// # Errors
///
/// Returns [`Error::Csv`] for malformed CSV or non-numeric values and
/// [`Error::InvalidRecord`] for rows with an unknown category, an
/// unparsable period, or negative / non-finite numbers.
pub fn read_csv(reader: impl Read, tariffs: &TariffTable) -> Result<BillingHistory> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers = rdr.headers()?.clone();

    let mut history = BillingHistory::default();
    for record in rdr.records() {
        let record = record?;
        let line = record.position().map_or(0, csv::Position::line);
        let raw: BillRecord = record.deserialize(Some(&headers))?;
        history.push(validate(raw, line, tariffs)?);
    }
    Ok(history)
}

fn validate(raw: BillRecord, line: u64, tariffs: &TariffTable) -> Result<BillingObservation> {
    let invalid = |message: String| Error::InvalidRecord { line, message };

    let period: Period = raw.period.parse().map_err(|e| invalid(format!("{e}")))?;
    let category: UtilityCategory = raw.category.parse().map_err(invalid)?;

    if !raw.units_consumed.is_finite() || raw.units_consumed < 0.0 {
        return Err(invalid(format!(
            "units_consumed must be a non-negative number, got {}",
            raw.units_consumed
        )));
    }

    let billed_amount = match raw.billed_amount {
        Some(amount) if !amount.is_finite() || amount < 0.0 => {
            return Err(invalid(format!(
                "billed_amount must be a non-negative number, got {amount}"
            )));
        }
        Some(amount) => amount,
        None => {
            let priced = tariffs.for_category(category).amount_for(raw.units_consumed);
            debug!(line, %period, %category, priced, "billed_amount missing, priced from tariff");
            priced
        }
    };

    Ok(BillingObservation::new(
        period,
        category,
        raw.units_consumed,
        billed_amount,
    ))
}
