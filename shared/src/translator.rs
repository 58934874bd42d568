//! Maps validated check-in requests onto Notion calls and shapes the results.

use chrono::{FixedOffset, NaiveDate, TimeZone};
use tracing::info;

use crate::models::{CreatedResponse, FetchedResponse};
use crate::notion::{CreateRecord, Record, RecordQuery, RecordStore};
use crate::{Config, Error, Result};

/// Month boundaries are computed in KST (UTC+9).
const RANGE_OFFSET_SECS: i32 = 9 * 3600;

const RANGE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f%:z";

/// A validated month: `year` is four digits, `month` in 1..=12.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Month {
    pub year: i32,
    pub month: u32,
}

impl Month {
    /// Parse the raw query values. `month` may be one or two digits.
    pub fn parse(year: &str, month: &str) -> Result<Self> {
        let year = year.trim();
        let month = month.trim();

        if year.len() != 4 || !year.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::Validation(format!("Invalid year: {}", year)));
        }
        if month.is_empty() || month.len() > 2 || !month.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::Validation(format!("Invalid month: {}", month)));
        }

        let parsed_year: i32 = year
            .parse()
            .map_err(|_| Error::Validation(format!("Invalid year: {}", year)))?;
        let parsed_month: u32 = month
            .parse()
            .map_err(|_| Error::Validation(format!("Invalid month: {}", month)))?;

        if !(1..=12).contains(&parsed_month) {
            return Err(Error::Validation(format!("Invalid month: {}", month)));
        }

        Ok(Self {
            year: parsed_year,
            month: parsed_month,
        })
    }

    /// The month after this one, rolling December over into January.
    pub fn next(self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    /// First instant of the month at UTC+9, e.g. `2025-03-01T00:00:00.000+09:00`.
    fn first_instant(self) -> Result<String> {
        let offset = FixedOffset::east_opt(RANGE_OFFSET_SECS)
            .ok_or_else(|| Error::Config("Invalid range offset".to_string()))?;
        let start = NaiveDate::from_ymd_opt(self.year, self.month, 1)
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .ok_or_else(|| {
                Error::Validation(format!("Invalid month: {}-{:02}", self.year, self.month))
            })?;
        let instant = offset
            .from_local_datetime(&start)
            .single()
            .ok_or_else(|| Error::Validation("Ambiguous month start".to_string()))?;
        Ok(instant.format(RANGE_FORMAT).to_string())
    }
}

/// Half-open range `[start, end)` covering the month, as ISO instants.
pub fn month_range(month: Month) -> Result<(String, String)> {
    Ok((month.first_instant()?, month.next().first_instant()?))
}

/// Pull the calendar date out of each record, in order, dropping records without one.
pub fn extract_recorded_dates(date_property: &str, records: &[Record]) -> Vec<String> {
    records
        .iter()
        .filter_map(|record| record.date_start(date_property))
        .filter_map(|start| start.split('T').next())
        .filter(|date| !date.is_empty())
        .map(str::to_string)
        .collect()
}

/// Validate a `YYYY-MM-DD` date string.
pub fn parse_date(date: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
        .map_err(|_| Error::Validation(format!("Invalid date (expected YYYY-MM-DD): {}", date)))
}

/// Create one check-in page for `date` in `database_id`.
///
/// Always appends; posting the same date twice creates two pages.
pub async fn create_check_in<S: RecordStore + ?Sized>(
    store: &S,
    config: &Config,
    database_id: &str,
    date: &str,
) -> Result<CreatedResponse> {
    let date = parse_date(date)?.format("%Y-%m-%d").to_string();

    let page = store
        .create_record(CreateRecord {
            database_id: database_id.to_string(),
            title_property: config.title_property.clone(),
            title: config.record_title(&date),
            date_property: config.date_property.clone(),
            date: date.clone(),
        })
        .await?;

    info!("Created check-in for {}", date);

    Ok(CreatedResponse::new(page))
}

/// Fetch the calendar dates recorded in `database_id` during `month`.
pub async fn fetch_month<S: RecordStore + ?Sized>(
    store: &S,
    config: &Config,
    database_id: &str,
    month: Month,
) -> Result<FetchedResponse> {
    let (on_or_after, before) = month_range(month)?;

    let records = store
        .query_records(RecordQuery {
            database_id: database_id.to_string(),
            date_property: config.date_property.clone(),
            on_or_after,
            before,
        })
        .await?;

    let dates = extract_recorded_dates(&config.date_property, &records);

    info!(
        "Fetched {} check-ins for {}-{:02} ({} records)",
        dates.len(),
        month.year,
        month.month,
        records.len()
    );

    Ok(FetchedResponse::new(dates))
}
