//! HTTP helpers shared by the check-in functions.

use lambda_http::http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
    CONTENT_TYPE,
};
use lambda_http::{Body, Response};
use serde::Serialize;

use crate::Error;

/// The calendar embed is served from another origin, so every response is permissive.
pub const CORS_ALLOW_ORIGIN: &str = "*";
pub const CORS_ALLOW_METHODS: &str = "GET, POST, OPTIONS";
pub const CORS_ALLOW_HEADERS: &str = "Content-Type";

/// Error envelope returned for every non-2xx response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>, detail: Option<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            error: detail,
        }
    }
}

fn with_cors(builder: lambda_http::http::response::Builder) -> lambda_http::http::response::Builder {
    builder
        .header(ACCESS_CONTROL_ALLOW_ORIGIN, CORS_ALLOW_ORIGIN)
        .header(ACCESS_CONTROL_ALLOW_METHODS, CORS_ALLOW_METHODS)
        .header(ACCESS_CONTROL_ALLOW_HEADERS, CORS_ALLOW_HEADERS)
}

/// Create a JSON response with the given status code and data.
pub fn json_response<T: Serialize>(
    status: u16,
    data: &T,
) -> Result<Response<Body>, lambda_http::Error> {
    Ok(with_cors(Response::builder())
        .status(status)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_string(data)?))?)
}

/// Empty 200 answer to a CORS pre-flight request.
pub fn preflight_response() -> Result<Response<Body>, lambda_http::Error> {
    Ok(with_cors(Response::builder()).status(200).body(Body::Empty)?)
}

/// Create an error response for the given error.
///
/// `detail` is written to the `error` field as-is; callers scrub secrets first.
pub fn error_response(
    err: &Error,
    detail: Option<String>,
) -> Result<Response<Body>, lambda_http::Error> {
    json_response(
        err.status_code(),
        &ErrorResponse::new(err.public_message(), detail),
    )
}
