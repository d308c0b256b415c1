//! Permission gate for camera and microphone access.
//!
//! Checked once per session attempt, before any session state exists. Devices
//! that are already granted are not prompted for; devices the user has never
//! been asked about are prompted together. Denial is reported with an
//! actionable message and is never retried automatically.

use crate::errors::LiveClassError;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Devices a live class needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaDevice {
    Camera,
    Microphone,
}

impl MediaDevice {
    /// Both devices, in prompt order.
    pub const ALL: [MediaDevice; 2] = [MediaDevice::Camera, MediaDevice::Microphone];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            MediaDevice::Camera => "camera",
            MediaDevice::Microphone => "microphone",
        }
    }
}

impl fmt::Display for MediaDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Permission status reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionStatus {
    /// Permission granted
    Granted,
    /// Permission denied
    Denied,
    /// Permission not determined (user hasn't been asked yet)
    NotDetermined,
    /// Permission restricted by policy
    Restricted,
}

impl fmt::Display for PermissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PermissionStatus::Granted => write!(f, "granted"),
            PermissionStatus::Denied => write!(f, "denied"),
            PermissionStatus::NotDetermined => write!(f, "not_determined"),
            PermissionStatus::Restricted => write!(f, "restricted"),
        }
    }
}

/// Platform permission API (browser permissions, OS privacy settings).
#[async_trait]
pub trait PermissionProvider: Send + Sync {
    /// Current status for one device, without prompting.
    async fn query(&self, device: MediaDevice) -> PermissionStatus;

    /// Prompt the user for `devices`. Returns the combined outcome.
    async fn request(&self, devices: &[MediaDevice]) -> PermissionStatus;
}

/// Proof that camera and microphone access was obtained for this attempt.
///
/// Only the gate can mint one; the session actor requires it before joining.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionGrant {
    prompted: bool,
}

impl PermissionGrant {
    /// Whether the user had to answer a prompt for this grant.
    #[must_use]
    pub fn was_prompted(&self) -> bool {
        self.prompted
    }
}

/// Once-per-attempt camera/microphone check.
pub struct PermissionGate {
    provider: Arc<dyn PermissionProvider>,
    grant: Option<PermissionGrant>,
}

impl PermissionGate {
    #[must_use]
    pub fn new(provider: Arc<dyn PermissionProvider>) -> Self {
        Self {
            provider,
            grant: None,
        }
    }

    /// Obtain access, prompting if needed.
    ///
    /// A cached grant is returned without consulting the provider again until
    /// [`reset`](Self::reset) is called for a new session attempt.
    ///
    /// # Errors
    ///
    /// Returns `LiveClassError::PermissionDenied` when either device is denied,
    /// restricted, or the prompt is refused.
    pub async fn ensure_access(&mut self) -> Result<PermissionGrant, LiveClassError> {
        if let Some(grant) = &self.grant {
            return Ok(grant.clone());
        }

        let mut pending = Vec::new();
        for device in MediaDevice::ALL {
            let status = self.provider.query(device).await;
            debug!(
                target: "lc.permissions",
                device = %device,
                status = %status,
                "Queried media permission"
            );
            match status {
                PermissionStatus::Granted => {}
                PermissionStatus::NotDetermined => pending.push(device),
                PermissionStatus::Denied | PermissionStatus::Restricted => {
                    warn!(
                        target: "lc.permissions",
                        device = %device,
                        status = %status,
                        "Media permission unavailable"
                    );
                    return Err(denied(device, status));
                }
            }
        }

        let prompted = !pending.is_empty();
        if prompted {
            info!(
                target: "lc.permissions",
                devices = ?pending,
                "Prompting for media permission"
            );
            let outcome = self.provider.request(&pending).await;
            if outcome != PermissionStatus::Granted {
                warn!(
                    target: "lc.permissions",
                    status = %outcome,
                    "Media permission prompt refused"
                );
                let device = pending.first().copied().unwrap_or(MediaDevice::Camera);
                return Err(denied(device, outcome));
            }
        }

        let grant = PermissionGrant { prompted };
        self.grant = Some(grant.clone());
        Ok(grant)
    }

    /// Forget the cached grant so the next attempt checks again.
    pub fn reset(&mut self) {
        self.grant = None;
    }

    #[must_use]
    pub fn is_granted(&self) -> bool {
        self.grant.is_some()
    }
}

fn denied(device: MediaDevice, status: PermissionStatus) -> LiveClassError {
    let message = match status {
        PermissionStatus::Restricted => format!(
            "Access to the {device} is blocked by a system policy. Ask your administrator to allow it, then try again."
        ),
        _ => format!(
            "Access to the {device} was denied. Allow camera and microphone access in your browser settings, then try again."
        ),
    };
    LiveClassError::PermissionDenied(message)
}
