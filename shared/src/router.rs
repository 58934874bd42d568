//! Verb-multiplexed handler for the `/api/add-entry` endpoint.
//!
//! - OPTIONS: CORS pre-flight, empty 200
//! - POST: record a check-in (`date`, `apiKey`, `dbId` in the JSON body)
//! - GET: list a month's check-ins (`year`, `month`, `apiKey`, `dbId` in the query)
//!
//! Host-agnostic: the Lambda function and the local dev server both call [`handle`].

use lambda_http::http::Method;
use lambda_http::{Body, Request, RequestExt, Response};
use tracing::{error, info, warn};

use crate::http::{error_response, json_response, preflight_response};
use crate::models::{CheckInRequest, MonthQuery, Target};
use crate::notion::StoreConnector;
use crate::translator::{self, Month};
use crate::{Config, Error};

const MISSING_CREATE_PARAMS: &str = "Missing required parameters (date, apiKey, or dbId).";
const MISSING_FETCH_PARAMS: &str = "Missing required parameters (year, month, apiKey, or dbId).";

const REDACTED: &str = "[redacted]";

/// Handle one request end to end. Never returns `Err` for caller mistakes or
/// upstream failures; those become 4xx/5xx responses.
pub async fn handle<C: StoreConnector>(
    connector: &C,
    config: &Config,
    event: Request,
) -> Result<Response<Body>, lambda_http::Error> {
    let method = event.method().clone();

    match method {
        Method::OPTIONS => preflight_response(),
        Method::POST => create_entry(connector, config, &event).await,
        Method::GET => fetch_entries(connector, config, &event).await,
        other => {
            warn!("Rejected {} request", other);
            error_response(&Error::MethodNotAllowed(other.to_string()), None)
        }
    }
}

async fn create_entry<C: StoreConnector>(
    connector: &C,
    config: &Config,
    event: &Request,
) -> Result<Response<Body>, lambda_http::Error> {
    // An empty body is a request with nothing in it; a malformed one is rejected.
    let body = event.body().as_ref();
    let request: CheckInRequest = if body.iter().all(u8::is_ascii_whitespace) {
        CheckInRequest::default()
    } else {
        match serde_json::from_slice(body) {
            Ok(request) => request,
            Err(e) => return rejected(Error::Validation(format!("Invalid request body: {}", e))),
        }
    };

    let (target, date) = match (
        target(request.api_key, request.db_id),
        non_empty(request.date),
    ) {
        (Some(target), Some(date)) => (target, date),
        _ => return rejected(Error::Validation(MISSING_CREATE_PARAMS.to_string())),
    };

    if let Err(err) = translator::parse_date(&date) {
        return rejected(err);
    }

    info!("Recording check-in for {}", date);

    let result = match connector.connect(&target.api_key) {
        Ok(store) => translator::create_check_in(&store, config, &target.db_id, &date).await,
        Err(err) => Err(err),
    };

    match result {
        Ok(created) => json_response(200, &created),
        Err(err) => failed(err, &target),
    }
}

async fn fetch_entries<C: StoreConnector>(
    connector: &C,
    config: &Config,
    event: &Request,
) -> Result<Response<Body>, lambda_http::Error> {
    let params = event.query_string_parameters();
    let query = MonthQuery {
        year: params.first("year").map(str::to_string),
        month: params.first("month").map(str::to_string),
        api_key: params.first("apiKey").map(str::to_string),
        db_id: params.first("dbId").map(str::to_string),
    };

    let (target, year, month) = match (
        target(query.api_key, query.db_id),
        non_empty(query.year),
        non_empty(query.month),
    ) {
        (Some(target), Some(year), Some(month)) => (target, year, month),
        _ => return rejected(Error::Validation(MISSING_FETCH_PARAMS.to_string())),
    };

    let month = match Month::parse(&year, &month) {
        Ok(month) => month,
        Err(err) => return rejected(err),
    };

    info!("Fetching check-ins for {}-{:02}", month.year, month.month);

    let result = match connector.connect(&target.api_key) {
        Ok(store) => translator::fetch_month(&store, config, &target.db_id, month).await,
        Err(err) => Err(err),
    };

    match result {
        Ok(fetched) => json_response(200, &fetched),
        Err(err) => failed(err, &target),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn target(api_key: Option<String>, db_id: Option<String>) -> Option<Target> {
    Some(Target {
        api_key: non_empty(api_key)?,
        db_id: non_empty(db_id)?,
    })
}

fn rejected(err: Error) -> Result<Response<Body>, lambda_http::Error> {
    warn!("Rejected request: {}", err);
    error_response(&err, None)
}

fn failed(err: Error, target: &Target) -> Result<Response<Body>, lambda_http::Error> {
    if err.status_code() < 500 {
        return rejected(err);
    }

    let detail = redact(&err.to_string(), &target.api_key);
    error!("Notion call failed: {}", detail);
    error_response(&err, Some(detail))
}

/// Remove every occurrence of `secret` from `message`.
fn redact(message: &str, secret: &str) -> String {
    if secret.is_empty() {
        return message.to_string();
    }
    message.replace(secret, REDACTED)
}
