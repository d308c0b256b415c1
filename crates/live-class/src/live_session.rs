//! Live-session record and announcement side calls.
//!
//! The scheduled class lives in the `live_sessions` collection. When a
//! teacher starts it, the record is stamped and a "class started"
//! announcement is posted; leaving stamps the end. These calls are opaque to
//! the reconciliation core and never decide whether a join succeeds.

use crate::actors::messages::JoinRequest;
use crate::errors::LiveClassError;

use chrono::{DateTime, Utc};
use common::data_access::{Collection, DataAccess, Record};
use common::types::{ChannelName, ParticipantId};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Row of the `live_sessions` collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiveSessionRecord {
    pub channel_name: ChannelName,
    #[serde(default)]
    pub title: String,
    pub scheduled_start: DateTime<Utc>,
    pub scheduled_end: DateTime<Utc>,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub ended_at: Option<DateTime<Utc>>,
}

/// Row of the `announcements` collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Announcement {
    pub title: String,
    pub content: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Announcement {
    #[must_use]
    pub fn class_started(record: &LiveSessionRecord, at: DateTime<Utc>) -> Self {
        let title = if record.title.is_empty() {
            "Live class started".to_string()
        } else {
            format!("{} is live", record.title)
        };
        Self {
            title,
            content: format!(
                "The live class on channel {} has started. Join now from your timetable.",
                record.channel_name
            ),
            is_active: true,
            created_at: at,
        }
    }
}

/// Side calls against the live-session and announcement collections.
#[derive(Clone)]
pub struct LiveSessions {
    data: Arc<dyn DataAccess>,
}

impl LiveSessions {
    #[must_use]
    pub fn new(data: Arc<dyn DataAccess>) -> Self {
        Self { data }
    }

    /// Load one live-session record.
    ///
    /// # Errors
    ///
    /// Propagates data-access failures, including undecodable rows.
    #[instrument(skip_all, name = "lc.live_session.fetch", fields(live_session_id = %id))]
    pub async fn fetch(&self, id: &str) -> Result<LiveSessionRecord, LiveClassError> {
        let record = self.data.get(Collection::LiveSessions, id).await?;
        Ok(record.decode()?)
    }

    /// Build a join request for the channel a live session is scheduled on.
    ///
    /// # Errors
    ///
    /// Propagates data-access failures.
    pub async fn resolve_join_request(&self, id: &str) -> Result<JoinRequest, LiveClassError> {
        let record = self.fetch(id).await?;
        Ok(JoinRequest::new(record.channel_name).with_live_session(id))
    }

    /// Stamp the actual start time.
    ///
    /// # Errors
    ///
    /// Propagates data-access failures.
    #[instrument(skip_all, name = "lc.live_session.mark_started", fields(live_session_id = %id))]
    pub async fn mark_started(&self, id: &str, at: DateTime<Utc>) -> Result<(), LiveClassError> {
        self.data
            .update(
                Collection::LiveSessions,
                id,
                json!({ "started_at": at, "ended_at": null }),
            )
            .await?;
        debug!(target: "lc.live_session", live_session_id = %id, "Live session marked started");
        Ok(())
    }

    /// Stamp the actual end time.
    ///
    /// # Errors
    ///
    /// Propagates data-access failures.
    #[instrument(skip_all, name = "lc.live_session.mark_ended", fields(live_session_id = %id))]
    pub async fn mark_ended(&self, id: &str, at: DateTime<Utc>) -> Result<(), LiveClassError> {
        self.data
            .update(Collection::LiveSessions, id, json!({ "ended_at": at }))
            .await?;
        debug!(target: "lc.live_session", live_session_id = %id, "Live session marked ended");
        Ok(())
    }

    /// Post the "class started" announcement.
    ///
    /// # Errors
    ///
    /// Propagates data-access failures.
    #[instrument(skip_all, name = "lc.live_session.announce", fields(teacher_id = %teacher_id))]
    pub async fn announce_class_started(
        &self,
        record: &LiveSessionRecord,
        teacher_id: &ParticipantId,
        at: DateTime<Utc>,
    ) -> Result<Record, LiveClassError> {
        let announcement = Announcement::class_started(record, at);
        let fields = serde_json::to_value(&announcement)
            .map_err(|e| LiveClassError::Internal(format!("announcement encode failed: {e}")))?;
        let stored = self.data.insert(Collection::Announcements, fields).await?;
        debug!(
            target: "lc.live_session",
            announcement_id = %stored.id,
            channel = %record.channel_name,
            "Class started announcement posted"
        );
        Ok(stored)
    }
}
