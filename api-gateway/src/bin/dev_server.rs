//! Local development server.
//!
//! Serves the calendar page from `STATIC_DIR` and routes `/api/add-entry`
//! through the same handler the Lambda function uses.

use axum::body::{to_bytes, Body as AxumBody};
use axum::extract::{Query, Request, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::any;
use axum::Router;
use lambda_http::{Body, RequestExt};
use shared::http::error_response;
use shared::{Config, Error, NotionConnector};
use std::collections::HashMap;
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Largest request body accepted on `/api/add-entry`.
const MAX_BODY_BYTES: usize = 64 * 1024;

struct AppState {
    config: Config,
    connector: NotionConnector,
}

/// Convert a handler response into an axum response.
fn into_axum(response: Result<lambda_http::Response<Body>, lambda_http::Error>) -> Response {
    match response {
        Ok(response) => {
            let (parts, body) = response.into_parts();
            Response::from_parts(parts, AxumBody::from(body.as_ref().to_vec()))
        }
        Err(e) => {
            error!("Failed to build response: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

fn rejected(err: Error) -> Response {
    warn!("Rejected request: {}", err);
    into_axum(error_response(&err, None))
}

async fn add_entry(State(state): State<Arc<AppState>>, request: Request) -> Response {
    let (parts, body) = request.into_parts();

    let params = match Query::<HashMap<String, String>>::try_from_uri(&parts.uri) {
        Ok(Query(params)) => params,
        Err(e) => return rejected(Error::Validation(format!("Invalid query string: {}", e))),
    };

    let bytes = match to_bytes(body, MAX_BODY_BYTES).await {
        Ok(bytes) => bytes,
        Err(e) => return rejected(Error::Validation(format!("Invalid request body: {}", e))),
    };

    let event = lambda_http::Request::from_parts(parts, Body::from(bytes.to_vec()))
        .with_query_string_parameters(params);

    into_axum(shared::handle(&state.connector, &state.config, event).await)
}

fn app(state: Arc<AppState>, static_dir: &str) -> Router {
    Router::new()
        .route("/api/add-entry", any(add_entry))
        .fallback_service(ServeDir::new(static_dir))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    let config = Config::from_env()?;
    let state = Arc::new(AppState {
        connector: NotionConnector::new(&config),
        config,
    });

    let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let static_dir = std::env::var("STATIC_DIR").unwrap_or_else(|_| ".".to_string());

    let listener = tokio::net::TcpListener::bind(format!("{}:{}", host, port)).await?;
    info!("Server listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app(state, &static_dir)).await?;

    Ok(())
}
