//! CSV export of billing history together with its forecast.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::report::CategoryReport;

/// Column header for report export.
const HEADER: &str = "period,category,kind,units,amount";

/// Exports category reports to a CSV file at the given path.
///
/// # Arguments
///
/// * `reports` - One report per exported category
/// * `path` - Output file path
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_report_csv(reports: &[CategoryReport], path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    let buf = io::BufWriter::new(file);
    write_report_csv(reports, buf)
}

/// Writes category reports as CSV to any writer.
///
/// Each report contributes one `actual` row per observation followed by a
/// `forecast` row. The forecast row is omitted when the forecast has no
/// target period, which only happens for an empty series. Produces
/// deterministic output for identical inputs.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_report_csv(reports: &[CategoryReport], writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    wtr.write_record(HEADER.split(','))?;

    for report in reports {
        for o in &report.series {
            wtr.write_record(&[
                o.period.to_string(),
                o.category.to_string(),
                "actual".to_string(),
                format!("{:.2}", o.units_consumed),
                format!("{:.2}", o.billed_amount),
            ])?;
        }

        let forecast = &report.forecast;
        if let Some(target) = forecast.target_period {
            wtr.write_record(&[
                target.to_string(),
                report.category.to_string(),
                "forecast".to_string(),
                forecast.predicted_units.to_string(),
                forecast.predicted_amount.to_string(),
            ])?;
        }
    }

    wtr.flush()?;
    Ok(())
}
