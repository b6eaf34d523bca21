// Copyright 2025 HEM Sp. z o.o.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use async_trait::async_trait;

use crate::definitions::{Authorization, CameraId, DeviceOrientation, PreviewTransform};
use crate::errors::CaptureError;

/// Physical cameras discovered on the device. Absence of a side means
/// the hardware does not exist (single-camera devices, emulators).
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub struct CameraInventory {
    pub back: Option<CameraId>,
    pub front: Option<CameraId>,
}

/// Seam to the platform capture stack: camera hardware, the permission
/// dialog, the preview surface and the torch. The session controller is
/// the only caller; decode results do not flow through this trait but
/// through the decode event channel.
///
/// Methods default to "not supported" where a platform may genuinely
/// lack the feature, mirroring how optional player features are handled
/// elsewhere in this codebase.
#[async_trait]
pub trait CaptureBackend: Send + Sync + 'static {
    /// Current camera authorization without prompting the user.
    fn authorization(&self) -> Authorization;

    /// Shows the permission prompt and resolves once the user answered.
    async fn request_access(&self) -> Authorization;

    /// Enumerates the physical cameras. Called once per controller.
    async fn enumerate_cameras(&self) -> Result<CameraInventory, CaptureError>;

    /// Binds the capture pipeline to the given camera.
    async fn bind_camera(&self, camera: CameraId) -> Result<(), CaptureError>;

    /// Creates the preview surface with the given rotation pair.
    async fn attach_preview(&self, transform: PreviewTransform) -> Result<(), CaptureError>;

    /// Releases the preview surface.
    async fn detach_preview(&self);

    async fn start_capture(&self) -> Result<(), CaptureError>;

    async fn stop_capture(&self);

    /// Whether the bound camera carries a torch.
    fn has_torch(&self, camera: CameraId) -> bool;

    fn torch_active(&self) -> bool;

    async fn set_torch(&self, enabled: bool) -> Result<(), CaptureError>;

    /// Most recent capture frame, already resized and encoded as PNG by
    /// the platform image utilities.
    async fn last_frame(&self) -> Result<Vec<u8>, CaptureError>;

    /// Orientation at this instant; sampled by the controller when the
    /// preview is attached.
    fn current_orientation(&self) -> DeviceOrientation;

    fn can_open_settings(&self) -> bool {
        false
    }

    async fn open_settings(&self) -> Result<(), CaptureError> {
        Err(CaptureError::Device("settings screen not supported".into()))
    }
}
