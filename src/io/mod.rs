//! CSV import and export.

pub mod export;
pub mod import;

pub use export::{export_report_csv, write_report_csv};
pub use import::{import_csv, read_csv};
