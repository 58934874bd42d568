//! Add Entry Lambda - Handles /api/add-entry endpoint.
//!
//! Records calendar check-ins in a Notion database (POST) and lists the
//! check-ins of a month (GET). The caller supplies the Notion integration
//! token and database ID with every request.

use lambda_http::{run, service_fn, Body, Error, Request, Response};
use shared::{Config, NotionConnector};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Application state shared across requests.
struct AppState {
    config: Config,
    connector: NotionConnector,
}

impl AppState {
    fn new() -> Result<Self, Error> {
        let config = Config::from_env()?;
        let connector = NotionConnector::new(&config);

        info!(
            "Using Notion schema title={:?} date={:?}",
            config.title_property, config.date_property
        );

        Ok(Self { config, connector })
    }
}

async fn handler(state: Arc<AppState>, event: Request) -> Result<Response<Body>, Error> {
    shared::handle(&state.connector, &state.config, event).await
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    let state = Arc::new(AppState::new()?);

    run(service_fn(move |event| {
        let state = Arc::clone(&state);
        async move { handler(state, event).await }
    }))
    .await
}
