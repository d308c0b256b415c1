//! In-memory `DataAccess` backend.
//!
//! # Example
//!
//! ```rust,ignore
//! use live_class_test_utils::InMemoryDataAccess;
//!
//! let data = InMemoryDataAccess::new()
//!     .with_record(Collection::LiveSessions, live_session_record("ls-1", "room"));
//! ```

use async_trait::async_trait;
use common::data_access::{Collection, DataAccess, Record};
use common::error::DataAccessError;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[derive(Debug, Default)]
struct Inner {
    collections: HashMap<Collection, Vec<Record>>,
    failure: Option<DataAccessError>,
}

/// In-memory record store. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDataAccess {
    inner: Arc<Mutex<Inner>>,
}

impl InMemoryDataAccess {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a record.
    #[must_use]
    pub fn with_record(self, collection: Collection, record: Record) -> Self {
        self.inner
            .lock()
            .unwrap()
            .collections
            .entry(collection)
            .or_default()
            .push(record);
        self
    }

    /// Make every call fail with `err`.
    pub fn fail_with(&self, err: DataAccessError) {
        self.inner.lock().unwrap().failure = Some(err);
    }

    /// Current records of a collection.
    pub fn records(&self, collection: Collection) -> Vec<Record> {
        self.inner
            .lock()
            .unwrap()
            .collections
            .get(&collection)
            .cloned()
            .unwrap_or_default()
    }

    pub fn record(&self, collection: Collection, id: &str) -> Option<Record> {
        self.records(collection).into_iter().find(|r| r.id == id)
    }

    fn check(&self) -> Result<(), DataAccessError> {
        match &self.inner.lock().unwrap().failure {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

fn not_found(collection: Collection, id: &str) -> DataAccessError {
    DataAccessError::NotFound {
        collection: collection.as_str().to_string(),
        id: id.to_string(),
    }
}

#[async_trait]
impl DataAccess for InMemoryDataAccess {
    async fn list(&self, collection: Collection) -> Result<Vec<Record>, DataAccessError> {
        self.check()?;
        Ok(self.records(collection))
    }

    async fn get(&self, collection: Collection, id: &str) -> Result<Record, DataAccessError> {
        self.check()?;
        self.record(collection, id)
            .ok_or_else(|| not_found(collection, id))
    }

    async fn insert(&self, collection: Collection, fields: Value) -> Result<Record, DataAccessError> {
        self.check()?;
        let record = Record::new(uuid::Uuid::new_v4().to_string(), fields);
        self.inner
            .lock()
            .unwrap()
            .collections
            .entry(collection)
            .or_default()
            .push(record.clone());
        Ok(record)
    }

    async fn update(
        &self,
        collection: Collection,
        id: &str,
        fields: Value,
    ) -> Result<Record, DataAccessError> {
        self.check()?;
        let mut inner = self.inner.lock().unwrap();
        let record = inner
            .collections
            .get_mut(&collection)
            .and_then(|records| records.iter_mut().find(|r| r.id == id))
            .ok_or_else(|| not_found(collection, id))?;

        match (&mut record.fields, fields) {
            (Value::Object(existing), Value::Object(patch)) => existing.extend(patch),
            (slot, replacement) => *slot = replacement,
        }
        Ok(record.clone())
    }

    async fn delete(&self, collection: Collection, id: &str) -> Result<(), DataAccessError> {
        self.check()?;
        let mut inner = self.inner.lock().unwrap();
        let records = inner.collections.entry(collection).or_default();
        let before = records.len();
        records.retain(|r| r.id != id);
        if records.len() == before {
            return Err(not_found(collection, id));
        }
        Ok(())
    }
}
