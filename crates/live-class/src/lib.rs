//! Live Class Core Library
//!
//! Client-side core of the academy's live classes: joins a real-time media
//! channel, tracks who else is in it, and decides what the screen shows.
//!
//! - Camera and microphone permission gate, checked before any session state
//! - Session lifecycle (join, publish, leave) with full rollback on failure
//! - Remote participant registry fed by transport events
//! - View model: the teacher is always on the main tile
//! - Render surface bindings derived from the view model
//!
//! # Architecture
//!
//! ```text
//! UI ──► SessionActorHandle ──► SessionActor (single writer)
//!                                ├── PermissionGate ──► PermissionProvider
//!                                ├── MediaTransport (join/publish/leave)
//!                                │     └── TransportEvent channel ──┐
//!                                ├── ParticipantRegistry ◄──────────┘
//!                                ├── LiveSessions ──► DataAccess
//!                                └── watch<ViewModel> ──► render task ──► RenderSurface
//! ```
//!
//! # Key Design Decisions
//!
//! - **Explicit roles**: a remote party's role is read from its id prefix once,
//!   when it is first seen; the local role comes from configuration
//! - **Derived presentation**: video/audio flags and render bindings are
//!   computed from track presence, never stored separately
//! - **Leave never blocks on the network**: local resources are released
//!   before the transport is told
//!
//! # Modules
//!
//! - [`actors`] - Session actor and its messages
//! - [`config`] - Configuration from environment
//! - [`errors`] - Error types and UI failure classes
//! - [`live_session`] - Live-session record and announcement side calls
//! - [`observability`] - Metrics
//! - [`participant`] - Participant, role and track types
//! - [`permissions`] - Camera/microphone permission gate
//! - [`registry`] - Remote participant registry
//! - [`render`] - Render surface reconciliation
//! - [`transport`] - Media transport contract
//! - [`view_model`] - Layout derivation

pub mod actors;
pub mod config;
pub mod errors;
pub mod live_session;
pub mod observability;
pub mod participant;
pub mod permissions;
pub mod registry;
pub mod render;
pub mod transport;
pub mod view_model;

pub use actors::{JoinOutcome, JoinRequest, SessionActor, SessionActorHandle, SessionStatus};
pub use config::Config;
pub use errors::{FailureKind, LiveClassError};
pub use participant::{MediaKind, Participant, Role, TrackHandle};
pub use view_model::{build_view_model, ParticipantView, ViewModel};
