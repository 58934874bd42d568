//! Shared library for the check-in calendar functions.
//!
//! Everything needed to serve `/api/add-entry` lives here so the Lambda
//! function and the local dev server stay thin.

pub mod config;
pub mod error;
pub mod http;
pub mod models;
pub mod notion;
pub mod router;
pub mod translator;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::Config;
pub use error::{Error, Result};
pub use models::{CheckInRequest, CreatedResponse, FetchedResponse, MonthQuery};
pub use notion::{NotionClient, NotionConnector, RecordStore, StoreConnector};
pub use router::handle;
