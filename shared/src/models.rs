//! Wire models for the check-in endpoint.

use serde::{Deserialize, Serialize};
use std::fmt;

pub const ACTION_CREATED: &str = "created";
pub const ACTION_FETCHED: &str = "fetched";

/// POST body sent by the calendar embed.
///
/// Every field is optional at parse time so that a missing field produces a
/// validation error rather than a deserialization error.
#[derive(Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckInRequest {
    pub date: Option<String>,
    pub api_key: Option<String>,
    pub db_id: Option<String>,
}

/// GET query parameters for a month lookup.
#[derive(Default)]
pub struct MonthQuery {
    pub year: Option<String>,
    pub month: Option<String>,
    pub api_key: Option<String>,
    pub db_id: Option<String>,
}

// The API key is reported only as present or absent.

impl fmt::Debug for CheckInRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CheckInRequest")
            .field("date", &self.date)
            .field("has_api_key", &self.api_key.is_some())
            .field("db_id", &self.db_id)
            .finish()
    }
}

impl fmt::Debug for MonthQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MonthQuery")
            .field("year", &self.year)
            .field("month", &self.month)
            .field("has_api_key", &self.api_key.is_some())
            .field("db_id", &self.db_id)
            .finish()
    }
}

/// Credential and target database pulled from a request.
///
/// Deliberately not `Debug`: the API key must never end up in logs.
pub struct Target {
    pub api_key: String,
    pub db_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedResponse {
    pub success: bool,
    pub action: &'static str,
    pub notion_response: serde_json::Value,
}

impl CreatedResponse {
    pub fn new(notion_response: serde_json::Value) -> Self {
        Self {
            success: true,
            action: ACTION_CREATED,
            notion_response,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchedResponse {
    pub success: bool,
    pub action: &'static str,
    pub recorded_dates: Vec<String>,
}

impl FetchedResponse {
    pub fn new(recorded_dates: Vec<String>) -> Self {
        Self {
            success: true,
            action: ACTION_FETCHED,
            recorded_dates,
        }
    }
}
