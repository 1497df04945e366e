use chrono::{Local, NaiveDate};

/// Parses a `YYYY-MM-DD` run date, defaulting to today's local date.
pub fn parse_run_date(value: Option<&str>) -> Result<NaiveDate, chrono::ParseError> {
    match value {
        Some(v) => NaiveDate::parse_from_str(v.trim(), "%Y-%m-%d"),
        None => Ok(Local::now().date_naive()),
    }
}
