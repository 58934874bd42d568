//! In-memory stand-ins for the Notion adapter.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

use crate::notion::{CreateRecord, Record, RecordQuery, RecordStore, StoreConnector};
use crate::{Error, Result};

/// Records every call; optionally fails each one with an upstream error.
#[derive(Default)]
pub struct FakeStore {
    records: Vec<Record>,
    failure: Option<String>,
    created: Mutex<Vec<CreateRecord>>,
    queries: Mutex<Vec<RecordQuery>>,
}

impl FakeStore {
    pub fn with_records(records: Vec<Record>) -> Self {
        Self {
            records,
            ..Self::default()
        }
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn created(&self) -> Vec<CreateRecord> {
        self.created.lock().unwrap().clone()
    }

    pub fn queries(&self) -> Vec<RecordQuery> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl RecordStore for FakeStore {
    async fn create_record(&self, args: CreateRecord) -> Result<Value> {
        self.created.lock().unwrap().push(args.clone());
        if let Some(message) = &self.failure {
            return Err(Error::Upstream(message.clone()));
        }
        Ok(json!({
            "object": "page",
            "id": "page-1",
            "properties": { args.date_property: { "date": { "start": args.date } } },
        }))
    }

    async fn query_records(&self, args: RecordQuery) -> Result<Vec<Record>> {
        self.queries.lock().unwrap().push(args);
        if let Some(message) = &self.failure {
            return Err(Error::Upstream(message.clone()));
        }
        Ok(self.records.clone())
    }
}

/// Handle to a shared [`FakeStore`], so tests can inspect it after a request.
pub struct SharedStore(pub Arc<FakeStore>);

#[async_trait]
impl RecordStore for SharedStore {
    async fn create_record(&self, args: CreateRecord) -> Result<Value> {
        self.0.create_record(args).await
    }

    async fn query_records(&self, args: RecordQuery) -> Result<Vec<Record>> {
        self.0.query_records(args).await
    }
}

/// Hands out the same [`FakeStore`] and remembers each credential it saw.
pub struct FakeConnector {
    pub store: Arc<FakeStore>,
    credentials: Mutex<Vec<String>>,
}

impl FakeConnector {
    pub fn new(store: FakeStore) -> Self {
        Self {
            store: Arc::new(store),
            credentials: Mutex::new(Vec::new()),
        }
    }

    pub fn connections(&self) -> Vec<String> {
        self.credentials.lock().unwrap().clone()
    }
}

impl StoreConnector for FakeConnector {
    type Store = SharedStore;

    fn connect(&self, credential: &str) -> Result<SharedStore> {
        self.credentials.lock().unwrap().push(credential.to_string());
        Ok(SharedStore(Arc::clone(&self.store)))
    }
}
