//! # Live Class Test Utilities
//!
//! Mocks and fixtures for testing the live-class core without a real media
//! SDK, browser permission API or backend.
//!
//! ## Modules
//!
//! - `mock_transport` - Scriptable `MediaTransport` with failure injection
//! - `mock_permissions` - `PermissionProvider` with fixed answers
//! - `mock_data_access` - In-memory `DataAccess` backend
//! - `mock_surface` - Render surface that records calls
//! - `fixtures` - Configs, transport events and live-session rows
//!
//! ## Usage
//!
//! ```rust,ignore
//! use live_class_test_utils::*;
//!
//! #[tokio::test]
//! async fn test_example() {
//!     let transport = MockTransport::new();
//!     let (handle, _task) = SessionActor::spawn(
//!         student_config("student-1"),
//!         transport.clone(),
//!         MockPermissions::granted(),
//!         None,
//!         CancellationToken::new(),
//!     );
//!
//!     handle.join(JoinRequest::new(ChannelName::from("room"))).await.unwrap();
//!     transport.emit(published("teacher-1", MediaKind::Video)).await;
//! }
//! ```

pub mod fixtures;
pub mod mock_data_access;
pub mod mock_permissions;
pub mod mock_surface;
pub mod mock_transport;

pub use fixtures::*;
pub use mock_data_access::InMemoryDataAccess;
pub use mock_permissions::MockPermissions;
pub use mock_surface::{RecordingSurface, SurfaceCall};
pub use mock_transport::{MockTransport, MockTransportBuilder, TransportCall};

use tracing_subscriber::EnvFilter;

/// Install a test log subscriber honouring `RUST_LOG`. Safe to call repeatedly.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
