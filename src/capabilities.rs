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

use log::debug;

use crate::capture::CameraInventory;
use crate::definitions::CameraId;
use crate::errors::ScannerError;

/// Index of the back camera on the command surface.
pub const BACK_CAMERA_INDEX: u32 = 0;
/// Index of the front camera on the command surface.
pub const FRONT_CAMERA_INDEX: u32 = 1;

/// Tracks which physical cameras exist and which one is active, and
/// gates camera-switch requests on that knowledge.
///
/// The inventory is recorded once, at first prepare; it survives
/// destroy so that a later prepare does not re-enumerate.
#[derive(Debug, Default)]
pub struct DeviceCapabilities {
    inventory: Option<CameraInventory>,
    active_index: u32,
}

impl DeviceCapabilities {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the enumeration result. Only the first call takes
    /// effect.
    pub fn record_inventory(&mut self, inventory: CameraInventory) {
        if self.inventory.is_none() {
            debug!("camera inventory recorded: {:?}", inventory);
            self.inventory = Some(inventory);
        }
    }

    pub fn inventory_known(&self) -> bool {
        self.inventory.is_some()
    }

    pub fn active_index(&self) -> u32 {
        self.active_index
    }

    /// Switching is only possible when both cameras exist.
    pub fn can_change_camera(&self) -> bool {
        matches!(
            self.inventory,
            Some(CameraInventory {
                back: Some(_),
                front: Some(_),
            })
        )
    }

    /// The camera the active index refers to. Falls back to whichever
    /// side exists when the indexed one is missing, so single-camera
    /// devices still bind something.
    pub fn active_camera(&self) -> Option<CameraId> {
        let inventory = self.inventory?;
        if self.active_index == BACK_CAMERA_INDEX {
            inventory.back.or(inventory.front)
        } else {
            inventory.front.or(inventory.back)
        }
    }

    /// Validates a switch to `index` and returns the camera to bind.
    /// Does not mutate; callers commit with [`set_active`] after the
    /// backend rebind succeeded.
    ///
    /// [`set_active`]: DeviceCapabilities::set_active
    pub fn camera_for_switch(&self, index: u32) -> Result<CameraId, ScannerError> {
        let inventory = self.inventory.unwrap_or_default();
        match (inventory.back, inventory.front) {
            (Some(back), Some(front)) => Ok(if index == BACK_CAMERA_INDEX {
                back
            } else {
                front
            }),
            // report the missing side, back first, as the bridge always has
            (None, _) => Err(ScannerError::BackCameraUnavailable),
            (_, None) => Err(ScannerError::FrontCameraUnavailable),
        }
    }

    pub fn set_active(&mut self, index: u32) {
        self.active_index = index;
    }

    /// Destroy resets the selection to the back camera.
    pub fn reset_active(&mut self) {
        self.active_index = BACK_CAMERA_INDEX;
    }
}
