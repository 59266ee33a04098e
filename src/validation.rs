use chrono::{NaiveDate, TimeDelta};
use thiserror::Error;

use crate::models::FilterCriteria;

/// Longest permitted span between start and end date, in days.
pub const MAX_RANGE_DAYS: i64 = 730;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("start after end")]
    StartAfterEnd,
    #[error("range too long ({days} days, maximum is {max})")]
    RangeTooLong { days: i64, max: i64 },
    #[error("invalid {field} date: {value:?}")]
    InvalidDate { field: &'static str, value: String },
    #[error("cannot go back {0} days")]
    InvalidQuickRange(i64),
}

/// Check the date range using the default span limit.
pub fn validate(criteria: &FilterCriteria) -> Result<(), ValidationError> {
    validate_with_limit(criteria, MAX_RANGE_DAYS)
}

/// Check the date range. Rules apply only when both dates are present.
pub fn validate_with_limit(criteria: &FilterCriteria, max_days: i64) -> Result<(), ValidationError> {
    let (Some(start), Some(end)) = (criteria.start_date, criteria.end_date) else {
        return Ok(());
    };

    if start > end {
        return Err(ValidationError::StartAfterEnd);
    }

    let days = (end - start).num_days();
    if days > max_days {
        return Err(ValidationError::RangeTooLong {
            days,
            max: max_days,
        });
    }

    Ok(())
}

/// Start of the range covering the `days` days before `end`.
pub fn range_start(end: NaiveDate, days: i64) -> Result<NaiveDate, ValidationError> {
    TimeDelta::try_days(days)
        .and_then(|delta| end.checked_sub_signed(delta))
        .ok_or(ValidationError::InvalidQuickRange(days))
}

/// Build criteria from raw field values. Empty or whitespace-only values are absent.
pub fn criteria_from_fields(
    start: &str,
    end: &str,
    origin: &str,
    destination: &str,
) -> Result<FilterCriteria, ValidationError> {
    Ok(FilterCriteria {
        start_date: parse_date_field("start", start)?,
        end_date: parse_date_field("end", end)?,
        origin: non_empty(origin),
        destination: non_empty(destination),
    })
}

fn parse_date_field(field: &'static str, value: &str) -> Result<Option<NaiveDate>, ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| ValidationError::InvalidDate {
            field,
            value: value.to_string(),
        })
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}
