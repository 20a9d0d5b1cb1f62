//! Rendering of ranked batches

pub mod formatter;

pub use formatter::{save_report_to_file, suggest_filename, ReportGenerator};
