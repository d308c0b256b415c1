//! Mock platform permission API.

use async_trait::async_trait;
use live_class::permissions::{MediaDevice, PermissionProvider, PermissionStatus};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Mock `PermissionProvider` with fixed per-device answers.
///
/// A granted prompt flips the prompted devices to `Granted`, like a browser
/// remembering the user's choice.
#[derive(Debug)]
pub struct MockPermissions {
    camera: Mutex<PermissionStatus>,
    microphone: Mutex<PermissionStatus>,
    prompt_outcome: PermissionStatus,
    queries: AtomicUsize,
    prompts: Mutex<Vec<Vec<MediaDevice>>>,
}

impl MockPermissions {
    #[must_use]
    pub fn new(
        camera: PermissionStatus,
        microphone: PermissionStatus,
        prompt_outcome: PermissionStatus,
    ) -> Arc<Self> {
        Arc::new(Self {
            camera: Mutex::new(camera),
            microphone: Mutex::new(microphone),
            prompt_outcome,
            queries: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        })
    }

    /// Both devices already granted.
    #[must_use]
    pub fn granted() -> Arc<Self> {
        Self::new(
            PermissionStatus::Granted,
            PermissionStatus::Granted,
            PermissionStatus::Granted,
        )
    }

    /// Never asked before; the user accepts the prompt.
    #[must_use]
    pub fn accepts_prompt() -> Arc<Self> {
        Self::new(
            PermissionStatus::NotDetermined,
            PermissionStatus::NotDetermined,
            PermissionStatus::Granted,
        )
    }

    /// Never asked before; the user refuses the prompt.
    #[must_use]
    pub fn refuses_prompt() -> Arc<Self> {
        Self::new(
            PermissionStatus::NotDetermined,
            PermissionStatus::NotDetermined,
            PermissionStatus::Denied,
        )
    }

    /// Camera previously denied in browser settings.
    #[must_use]
    pub fn camera_denied() -> Arc<Self> {
        Self::new(
            PermissionStatus::Denied,
            PermissionStatus::Granted,
            PermissionStatus::Granted,
        )
    }

    /// Change a device's status, e.g. the user fixing browser settings.
    pub fn set_status(&self, device: MediaDevice, status: PermissionStatus) {
        *self.slot(device).lock().unwrap() = status;
    }

    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    /// Devices passed to each prompt, in order.
    pub fn prompts(&self) -> Vec<Vec<MediaDevice>> {
        self.prompts.lock().unwrap().clone()
    }

    fn slot(&self, device: MediaDevice) -> &Mutex<PermissionStatus> {
        match device {
            MediaDevice::Camera => &self.camera,
            MediaDevice::Microphone => &self.microphone,
        }
    }
}

#[async_trait]
impl PermissionProvider for MockPermissions {
    async fn query(&self, device: MediaDevice) -> PermissionStatus {
        self.queries.fetch_add(1, Ordering::SeqCst);
        *self.slot(device).lock().unwrap()
    }

    async fn request(&self, devices: &[MediaDevice]) -> PermissionStatus {
        self.prompts.lock().unwrap().push(devices.to_vec());
        if self.prompt_outcome == PermissionStatus::Granted {
            for device in devices {
                self.set_status(*device, PermissionStatus::Granted);
            }
        }
        self.prompt_outcome
    }
}
