//! Dated CSV export of approved records.

use std::io;
use std::path::PathBuf;

use chrono::{Datelike, NaiveDate};
use specmon_core::SpecRecord;
use tracing::info;

pub const CSV_HEADER: &str = "Title,Author,Revision,Date,Area,Purpose,Description";

/// Writes the approved-records CSV consumed by a downstream service.
pub struct CsvExporter {
    out_dir: PathBuf,
}

impl CsvExporter {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
        }
    }

    /// Write today's export file and return its path.
    pub fn export(&self, records: &[SpecRecord]) -> io::Result<PathBuf> {
        let path = self
            .out_dir
            .join(file_name_for(chrono::Local::now().date_naive()));
        std::fs::write(&path, render(records))?;
        info!(path = %path.display(), count = records.len(), "CSV file created");
        Ok(path)
    }
}

/// `bvlib_` plus the date with unpadded month and day (`yyyyMd`). The
/// downstream consumer requires this exact naming convention.
pub fn file_name_for(date: NaiveDate) -> String {
    format!("bvlib_{}{}{}.csv", date.year(), date.month(), date.day())
}

/// Header row plus one comma-joined row per record. Fields are not quoted or
/// escaped; an embedded comma shifts columns. The consuming service expects
/// the format exactly as-is.
pub fn render(records: &[SpecRecord]) -> String {
    let mut out = String::from(CSV_HEADER);
    out.push('\n');
    for record in records {
        out.push_str(&format!(
            "{},{},{},{},{},{},{}\n",
            record.title,
            record.author,
            record.revision,
            record.date,
            record.area,
            record.purpose,
            record.description
        ));
    }
    out
}
