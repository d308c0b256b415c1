//! Registry and layout reconciliation driven through the session actor.
//!
//! Remote events are pushed through `MockTransport`; queries on the handle
//! are answered after every event already queued, so each assertion sees the
//! state right after the events emitted before it.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]

use common::types::{ChannelName, ParticipantId};
use live_class::actors::{JoinRequest, SessionActor, SessionActorHandle};
use live_class::config::Config;
use live_class::participant::{MediaKind, Role};
use live_class_test_utils::{
    init_test_tracing, left, published, published_with_track, remote_track, student_config,
    teacher_config, unpublished, MockPermissions, MockTransport,
};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

async fn joined(config: Config) -> anyhow::Result<(SessionActorHandle, Arc<MockTransport>)> {
    init_test_tracing();
    let transport = MockTransport::new();
    let (handle, _task) = SessionActor::spawn(
        config,
        transport.clone(),
        MockPermissions::granted(),
        None,
        CancellationToken::new(),
    );
    handle
        .join(JoinRequest::new(ChannelName::from("figure-drawing")))
        .await?;
    Ok((handle, transport))
}

fn ids<'a>(entries: impl Iterator<Item = &'a ParticipantId>) -> Vec<&'a str> {
    entries.map(ParticipantId::as_str).collect()
}

#[tokio::test]
async fn test_scenarios_a_b_c_publish_unpublish_leave() -> Result<(), anyhow::Error> {
    let (handle, transport) = joined(student_config("student-me")).await?;

    // A: video then audio for the same teacher
    transport.emit(published("teacher-1", MediaKind::Video)).await;
    transport.emit(published("teacher-1", MediaKind::Audio)).await;

    let snapshot = handle.snapshot().await?;
    assert_eq!(snapshot.len(), 1);
    let teacher = snapshot.get(&ParticipantId::from("teacher-1")).unwrap();
    assert_eq!(teacher.role, Role::Teacher);
    assert!(!teacher.is_local);
    assert_eq!(
        teacher.video_track,
        Some(remote_track("teacher-1", MediaKind::Video))
    );
    assert_eq!(
        teacher.audio_track,
        Some(remote_track("teacher-1", MediaKind::Audio))
    );

    // B: video unpublished, audio kept
    transport.emit(unpublished("teacher-1", MediaKind::Video)).await;
    let snapshot = handle.snapshot().await?;
    let teacher = snapshot.get(&ParticipantId::from("teacher-1")).unwrap();
    assert!(teacher.video_track.is_none());
    assert_eq!(
        teacher.audio_track,
        Some(remote_track("teacher-1", MediaKind::Audio))
    );
    assert_eq!(transport.stopped_tracks(), vec!["teacher-1-video"]);

    // C: left
    transport.emit(left("teacher-1")).await;
    assert!(handle.snapshot().await?.is_empty());
    assert_eq!(
        transport.stopped_tracks(),
        vec!["teacher-1-video", "teacher-1-audio"]
    );

    handle.cancel();
    Ok(())
}

#[tokio::test]
async fn test_scenario_d_student_sees_remote_teacher_main() -> Result<(), anyhow::Error> {
    let (handle, transport) = joined(student_config("student-me")).await?;

    transport.emit(published("teacher-1", MediaKind::Video)).await;
    transport.emit(published("student-2", MediaKind::Video)).await;

    let view = handle.view_model().await?.unwrap();
    assert_eq!(view.main.id.as_str(), "teacher-1");
    assert!(view.main.is_teacher);
    assert_eq!(
        ids(view.thumbnails.iter().map(|t| &t.id)),
        vec!["student-me", "student-2"]
    );
    assert!(view.thumbnails[0].is_local);

    handle.cancel();
    Ok(())
}

#[tokio::test]
async fn test_scenario_e_local_teacher_stays_main() -> Result<(), anyhow::Error> {
    let (handle, transport) = joined(teacher_config("teacher-me")).await?;

    transport.emit(published("student-2", MediaKind::Audio)).await;

    let view = handle.view_model().await?.unwrap();
    assert!(view.main.is_local);
    assert!(view.main.is_teacher);
    assert_eq!(ids(view.thumbnails.iter().map(|t| &t.id)), vec!["student-2"]);

    handle.cancel();
    Ok(())
}

#[tokio::test]
async fn test_local_teacher_keeps_main_against_remote_teacher_claim() -> Result<(), anyhow::Error> {
    let (handle, transport) = joined(teacher_config("teacher-me")).await?;

    transport.emit(published("teacher-impostor", MediaKind::Video)).await;
    transport.emit(published("student-2", MediaKind::Video)).await;

    let view = handle.view_model().await?.unwrap();
    assert!(view.main.is_local);
    assert_eq!(
        ids(view.thumbnails.iter().map(|t| &t.id)),
        vec!["teacher-impostor", "student-2"]
    );

    handle.cancel();
    Ok(())
}

#[tokio::test]
async fn test_no_teacher_means_local_main_and_all_remotes_thumbnails() -> Result<(), anyhow::Error>
{
    let (handle, transport) = joined(student_config("student-me")).await?;

    for id in ["student-2", "student-3", "student-4"] {
        transport.emit(published(id, MediaKind::Video)).await;
    }

    let view = handle.view_model().await?.unwrap();
    assert!(view.main.is_local);
    assert_eq!(
        ids(view.thumbnails.iter().map(|t| &t.id)),
        vec!["student-2", "student-3", "student-4"]
    );

    handle.cancel();
    Ok(())
}

#[tokio::test]
async fn test_repeated_left_is_idempotent() -> Result<(), anyhow::Error> {
    let (handle, transport) = joined(student_config("student-me")).await?;

    transport.emit(published("student-2", MediaKind::Video)).await;
    transport.emit(left("student-2")).await;
    let after_first = handle.snapshot().await?;

    transport.emit(left("student-2")).await;
    let after_second = handle.snapshot().await?;

    assert!(after_first.is_empty());
    assert_eq!(after_first, after_second);
    assert_eq!(handle.metrics().stale_events, 1);

    handle.cancel();
    Ok(())
}

#[tokio::test]
async fn test_unknown_id_events_create_nothing() -> Result<(), anyhow::Error> {
    let (handle, transport) = joined(student_config("student-me")).await?;

    transport.emit(unpublished("ghost", MediaKind::Audio)).await;
    transport.emit(left("ghost")).await;

    assert!(handle.snapshot().await?.is_empty());
    let metrics = handle.metrics();
    assert_eq!(metrics.stale_events, 2);
    assert_eq!(metrics.events_applied, 0);
    assert!(transport.stopped_tracks().is_empty());

    handle.cancel();
    Ok(())
}

#[tokio::test]
async fn test_republish_replaces_and_releases_old_track() -> Result<(), anyhow::Error> {
    let (handle, transport) = joined(student_config("student-me")).await?;

    transport
        .emit(published_with_track("student-2", MediaKind::Video, "cam-a"))
        .await;
    transport
        .emit(published_with_track("student-2", MediaKind::Video, "cam-b"))
        .await;

    let snapshot = handle.snapshot().await?;
    let remote = snapshot.get(&ParticipantId::from("student-2")).unwrap();
    assert_eq!(remote.video_track.as_ref().map(|t| t.track_id()), Some("cam-b"));
    assert_eq!(transport.stopped_tracks(), vec!["cam-a"]);

    handle.cancel();
    Ok(())
}

#[tokio::test]
async fn test_duplicate_publish_keeps_track_alive() -> Result<(), anyhow::Error> {
    let (handle, transport) = joined(student_config("student-me")).await?;

    transport.emit(published("student-2", MediaKind::Audio)).await;
    transport.emit(published("student-2", MediaKind::Audio)).await;

    assert_eq!(handle.snapshot().await?.len(), 1);
    assert!(transport.stopped_tracks().is_empty());

    handle.cancel();
    Ok(())
}

#[tokio::test]
async fn test_events_for_local_id_are_ignored() -> Result<(), anyhow::Error> {
    let (handle, transport) = joined(student_config("student-me")).await?;

    transport.emit(published("student-me", MediaKind::Video)).await;
    transport.emit(left("student-me")).await;

    assert!(handle.snapshot().await?.is_empty());
    let view = handle.view_model().await?.unwrap();
    assert!(view.main.is_local);
    assert!(view.main.is_video_enabled);

    handle.cancel();
    Ok(())
}

#[tokio::test]
async fn test_first_seen_order_survives_churn() -> Result<(), anyhow::Error> {
    let (handle, transport) = joined(student_config("student-me")).await?;

    for id in ["student-2", "student-3", "student-4"] {
        transport.emit(published(id, MediaKind::Audio)).await;
    }
    transport.emit(left("student-3")).await;
    transport.emit(published("student-2", MediaKind::Video)).await;
    transport.emit(published("student-3", MediaKind::Video)).await;

    let snapshot = handle.snapshot().await?;
    assert_eq!(
        ids(snapshot.iter().map(|p| &p.id)),
        vec!["student-2", "student-4", "student-3"]
    );

    handle.cancel();
    Ok(())
}

#[tokio::test]
async fn test_view_flags_follow_track_presence() -> Result<(), anyhow::Error> {
    let (handle, transport) = joined(student_config("student-me")).await?;

    transport.emit(published("student-2", MediaKind::Audio)).await;
    let view = handle.view_model().await?.unwrap();
    let remote = view.find(&ParticipantId::from("student-2")).unwrap();
    assert!(remote.is_audio_enabled);
    assert!(!remote.is_video_enabled);

    for entry in view.entries() {
        assert_eq!(entry.is_video_enabled, entry.video_track.is_some());
        assert_eq!(entry.is_audio_enabled, entry.audio_track.is_some());
    }

    handle.cancel();
    Ok(())
}

#[tokio::test]
async fn test_teacher_leaving_returns_local_to_main() -> Result<(), anyhow::Error> {
    let (handle, transport) = joined(student_config("student-me")).await?;

    transport.emit(published("teacher-1", MediaKind::Video)).await;
    transport.emit(published("student-2", MediaKind::Video)).await;
    assert_eq!(
        handle.view_model().await?.unwrap().main.id.as_str(),
        "teacher-1"
    );

    transport.emit(left("teacher-1")).await;
    let view = handle.view_model().await?.unwrap();
    assert!(view.main.is_local);
    assert_eq!(ids(view.thumbnails.iter().map(|t| &t.id)), vec!["student-2"]);
    assert_eq!(handle.metrics().remote_participants, 1);

    handle.cancel();
    Ok(())
}
