//! Pre-configured test data: configs, transport events, live-session rows.

use chrono::{DateTime, Duration, Utc};
use common::data_access::Record;
use common::types::ParticipantId;
use live_class::config::Config;
use live_class::participant::{MediaKind, TrackHandle};
use live_class::transport::TransportEvent;
use serde_json::json;
use std::collections::HashMap;

/// Config for a local student with the given id.
#[must_use]
pub fn student_config(local_id: &str) -> Config {
    config_with(local_id, "student", &[])
}

/// Config for a local teacher with the given id.
#[must_use]
pub fn teacher_config(local_id: &str) -> Config {
    config_with(local_id, "teacher", &[])
}

/// Config with extra environment overrides.
#[must_use]
pub fn config_with(local_id: &str, role: &str, extra: &[(&str, &str)]) -> Config {
    let mut vars = HashMap::from([
        ("LIVE_CLASS_APP_ID".to_string(), "test-app".to_string()),
        ("LIVE_CLASS_TOKEN".to_string(), "test-token".to_string()),
        ("LIVE_CLASS_LOCAL_ID".to_string(), local_id.to_string()),
        ("LIVE_CLASS_ROLE".to_string(), role.to_string()),
    ]);
    for (key, value) in extra {
        vars.insert((*key).to_string(), (*value).to_string());
    }
    Config::from_vars(&vars).expect("test config should load")
}

/// Track handle for a remote party, id `"{remote_id}-{kind}"`.
#[must_use]
pub fn remote_track(remote_id: &str, kind: MediaKind) -> TrackHandle {
    TrackHandle::new(format!("{remote_id}-{}", kind.as_str()), kind)
}

#[must_use]
pub fn published(remote_id: &str, kind: MediaKind) -> TransportEvent {
    TransportEvent::Published {
        remote_id: ParticipantId::from(remote_id),
        kind,
        track: remote_track(remote_id, kind),
    }
}

/// Published event carrying an explicit track id, for republish tests.
#[must_use]
pub fn published_with_track(remote_id: &str, kind: MediaKind, track_id: &str) -> TransportEvent {
    TransportEvent::Published {
        remote_id: ParticipantId::from(remote_id),
        kind,
        track: TrackHandle::new(track_id, kind),
    }
}

#[must_use]
pub fn unpublished(remote_id: &str, kind: MediaKind) -> TransportEvent {
    TransportEvent::Unpublished {
        remote_id: ParticipantId::from(remote_id),
        kind,
    }
}

#[must_use]
pub fn left(remote_id: &str) -> TransportEvent {
    TransportEvent::Left {
        remote_id: ParticipantId::from(remote_id),
    }
}

/// `live_sessions` row scheduled to start now and last an hour.
#[must_use]
pub fn live_session_record(id: &str, channel: &str, title: &str) -> Record {
    let start: DateTime<Utc> = Utc::now();
    Record::new(
        id,
        json!({
            "channel_name": channel,
            "title": title,
            "scheduled_start": start,
            "scheduled_end": start + Duration::hours(1),
            "started_at": null,
            "ended_at": null,
        }),
    )
}
