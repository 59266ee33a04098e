//! Summary statistics and export encodings over raw fare records.

use std::collections::HashSet;

use csv::{QuoteStyle, Terminator, WriterBuilder};
use thiserror::Error;

use crate::{config::ExportConfig, models::FareRecord};

/// Header row of the CSV export.
pub const CSV_HEADER: [&str; 5] = ["Date", "Origin", "Destination", "Price", "Bookings"];

/// Aggregate statistics shown in the summary panel.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Summary {
    pub total_records: usize,
    pub total_bookings: u64,
    /// Booking-weighted average price; 0 when there are no bookings.
    pub avg_price: f64,
    pub unique_routes: usize,
}

/// Compute summary statistics. Empty input yields all zeros.
pub fn summarize(records: &[FareRecord]) -> Summary {
    let total_bookings: u64 = records.iter().map(|r| u64::from(r.bookings)).sum();
    let weighted_total: f64 = records
        .iter()
        .map(|r| r.price * f64::from(r.bookings))
        .sum();

    let avg_price = if total_bookings > 0 {
        weighted_total / total_bookings as f64
    } else {
        0.0
    };

    let unique_routes = records
        .iter()
        .map(FareRecord::route_key)
        .collect::<HashSet<_>>()
        .len();

    Summary {
        total_records: records.len(),
        total_bookings,
        avg_price,
        unique_routes,
    }
}

#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("CSV encoding failed: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON encoding failed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("IO error while encoding: {0}")]
    Io(#[from] std::io::Error),
    #[error("encoded output is not UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Encode records as CSV. Fields are written verbatim, without quoting.
pub fn encode_csv(records: &[FareRecord]) -> Result<String, EncodeError> {
    let mut wtr = WriterBuilder::new()
        .quote_style(QuoteStyle::Never)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    wtr.write_record(CSV_HEADER)?;
    for record in records {
        wtr.write_record([
            record.date.format("%Y-%m-%d").to_string(),
            record.origin.clone(),
            record.destination.clone(),
            record.price.to_string(),
            record.bookings.to_string(),
        ])?;
    }

    let bytes = wtr.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8(bytes)?)
}

/// Encode records as a pretty-printed JSON array.
pub fn encode_json(records: &[FareRecord]) -> Result<String, EncodeError> {
    Ok(serde_json::to_string_pretty(records)?)
}

/// Download format chosen by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    pub fn mime_type(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv",
            ExportFormat::Json => "application/json",
        }
    }

    pub fn default_filename(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "airline_data.csv",
            ExportFormat::Json => "airline_data.json",
        }
    }

    /// Filename from configuration, falling back to the default.
    pub fn filename<'a>(&self, config: &'a ExportConfig) -> &'a str {
        let configured = match self {
            ExportFormat::Csv => config.csv_filename.as_str(),
            ExportFormat::Json => config.json_filename.as_str(),
        };
        if configured.is_empty() {
            self.default_filename()
        } else {
            configured
        }
    }

    pub fn encode(&self, records: &[FareRecord]) -> Result<Vec<u8>, EncodeError> {
        let text = match self {
            ExportFormat::Csv => encode_csv(records)?,
            ExportFormat::Json => encode_json(records)?,
        };
        Ok(text.into_bytes())
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            other => Err(format!("unknown export format: {other}")),
        }
    }
}
