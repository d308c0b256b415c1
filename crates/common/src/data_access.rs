//! Generic record-collection data-access contract.
//!
//! Every admin manager in the academy site talks to the backend-as-a-service
//! through these five operations against a named collection. The live-class
//! core only uses it for live-session records and announcements; the rest of
//! the collections are listed so callers share one vocabulary.

use crate::error::DataAccessError;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Remote record collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    Announcements,
    Banners,
    Courses,
    Enrollments,
    NavigationItems,
    Settings,
    TimetableEntries,
    Products,
    Classes,
    Subjects,
    Topics,
    LiveSessions,
}

impl Collection {
    /// Remote table name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Collection::Announcements => "announcements",
            Collection::Banners => "banners",
            Collection::Courses => "courses",
            Collection::Enrollments => "enrollments",
            Collection::NavigationItems => "navigation_items",
            Collection::Settings => "settings",
            Collection::TimetableEntries => "timetable_entries",
            Collection::Products => "products",
            Collection::Classes => "classes",
            Collection::Subjects => "subjects",
            Collection::Topics => "topics",
            Collection::LiveSessions => "live_sessions",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One stored record: its backend id plus a JSON object of fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    pub fields: serde_json::Value,
}

impl Record {
    #[must_use]
    pub fn new(id: impl Into<String>, fields: serde_json::Value) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    /// Decode the fields into a typed row.
    ///
    /// # Errors
    ///
    /// Returns `DataAccessError::Serialization` if the fields do not match `T`.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, DataAccessError> {
        Ok(serde_json::from_value(self.fields.clone())?)
    }
}

/// CRUD operations against named collections.
///
/// Implementations wrap the remote backend; tests use an in-memory one.
#[async_trait]
pub trait DataAccess: Send + Sync {
    /// List every record in a collection.
    async fn list(&self, collection: Collection) -> Result<Vec<Record>, DataAccessError>;

    /// Fetch one record by id.
    async fn get(&self, collection: Collection, id: &str) -> Result<Record, DataAccessError>;

    /// Insert a new record; the backend assigns the id.
    async fn insert(
        &self,
        collection: Collection,
        fields: serde_json::Value,
    ) -> Result<Record, DataAccessError>;

    /// Merge `fields` into an existing record.
    async fn update(
        &self,
        collection: Collection,
        id: &str,
        fields: serde_json::Value,
    ) -> Result<Record, DataAccessError>;

    /// Delete a record.
    async fn delete(&self, collection: Collection, id: &str) -> Result<(), DataAccessError>;
}
