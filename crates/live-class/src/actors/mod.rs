//! Actor model implementation for the live-class session.
//!
//! ```text
//! SessionActor (one per local party)
//! ├── owns PermissionGate, ParticipantRegistry, local participant
//! ├── drains the transport's remote event channel
//! └── publishes SessionStatus and ViewModel on watch channels
//!     └── render task (reconciles the render surface)
//! ```
//!
//! # Key Design Decisions
//!
//! - **Single writer**: join, leave, toggles and remote events are applied by
//!   one task, one at a time
//! - **Derived view**: the view model is rebuilt after every mutation and
//!   published, never patched in place
//! - **CancellationToken shutdown**: cancelling the actor leaves the channel
//!
//! # Modules
//!
//! - [`session`] - `SessionActor` and its handle
//! - [`messages`] - Request and state types
//! - [`metrics`] - Mailbox monitoring and session counters

pub mod messages;
pub mod metrics;
pub mod session;

// Re-export primary types
pub use messages::*;
pub use metrics::{MailboxMonitor, SessionMetrics, SessionMetricsSnapshot};
pub use session::{SessionActor, SessionActorHandle};
