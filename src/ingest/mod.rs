use crate::error::PipelineError;
use crate::models::{TimeSeriesPoint, ValidatedSeries};
use chrono::NaiveDate;
use tracing::debug;

/// Column names the upload must carry, case-sensitive.
pub const DATE_COLUMN: &str = "Date";
pub const REVENUE_COLUMN: &str = "Revenue";

/// Date formats accepted in the `Date` column. ISO first since that is what
/// spreadsheet exports usually emit.
const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

/// Turn uploaded CSV bytes into a validated series.
///
/// Rules:
/// - The header must contain both `Date` and `Revenue`; extra columns are
///   ignored.
/// - A blank cell in either column drops that row. A non-blank revenue that
///   is not numeric is treated the same as a blank (dropped).
/// - A non-blank date that matches none of the accepted formats aborts the
///   whole validation. Dropping those silently would hide a systematically
///   wrong export, so it is fatal rather than lossy.
/// - Zero surviving rows is `EmptyDataset`.
///
/// Row order is preserved; the input is never mutated.
pub fn validate(raw: &[u8]) -> Result<ValidatedSeries, PipelineError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(raw);

    let headers = reader.headers()?.clone();

    let date_idx = headers.iter().position(|h| h == DATE_COLUMN);
    let revenue_idx = headers.iter().position(|h| h == REVENUE_COLUMN);

    let (date_idx, revenue_idx) = match (date_idx, revenue_idx) {
        (Some(d), Some(r)) => (d, r),
        (d, r) => {
            let mut missing = Vec::new();
            if d.is_none() {
                missing.push(DATE_COLUMN.to_string());
            }
            if r.is_none() {
                missing.push(REVENUE_COLUMN.to_string());
            }
            return Err(PipelineError::MissingColumns { missing });
        }
    };

    let mut points = Vec::new();
    let mut dropped = 0usize;

    for (i, record) in reader.records().enumerate() {
        let record = record?;
        // 1-based file line, counting the header.
        let line = i + 2;

        // Short rows read as blanks in the projected columns.
        let date_cell = record.get(date_idx).unwrap_or("").trim();
        let revenue_cell = record.get(revenue_idx).unwrap_or("").trim();

        if date_cell.is_empty() || revenue_cell.is_empty() {
            dropped += 1;
            continue;
        }

        let timestamp = parse_date(date_cell).ok_or_else(|| PipelineError::DateParse {
            row: line,
            value: date_cell.to_string(),
        })?;

        // Non-numeric revenue counts as missing.
        let value = match revenue_cell.parse::<f64>() {
            Ok(v) => v,
            Err(_) => {
                dropped += 1;
                continue;
            }
        };

        points.push(TimeSeriesPoint { timestamp, value });
    }

    debug!(kept = points.len(), dropped, "upload validated");

    ValidatedSeries::new(points)
}

fn parse_date(cell: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(cell, fmt).ok())
}
