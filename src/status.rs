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

use std::collections::HashMap;

use crate::capabilities::DeviceCapabilities;
use crate::definitions::Authorization;

/// Read-only view of the whole controller, computed on demand and never
/// persisted. Internal representation is plain booleans; the legacy
/// `"0"/"1"` string encoding exists only at the wire boundary.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub struct StatusSnapshot {
    pub authorized: bool,
    pub denied: bool,
    pub restricted: bool,
    pub prepared: bool,
    pub scanning: bool,
    pub showing: bool,
    pub light_enabled: bool,
    pub can_open_settings: bool,
    pub can_enable_light: bool,
    pub can_change_camera: bool,
    pub current_camera: u32,
}

impl StatusSnapshot {
    /// Encodes the snapshot for the command bridge: every boolean as a
    /// `"0"/"1"` string, `currentCamera` as a decimal index string.
    pub fn to_wire(&self) -> HashMap<&'static str, String> {
        let mut wire = HashMap::new();
        wire.insert("authorized", flag(self.authorized));
        wire.insert("denied", flag(self.denied));
        wire.insert("restricted", flag(self.restricted));
        wire.insert("prepared", flag(self.prepared));
        wire.insert("scanning", flag(self.scanning));
        wire.insert("showing", flag(self.showing));
        wire.insert("lightEnabled", flag(self.light_enabled));
        wire.insert("canOpenSettings", flag(self.can_open_settings));
        wire.insert("canEnableLight", flag(self.can_enable_light));
        wire.insert("canChangeCamera", flag(self.can_change_camera));
        wire.insert("currentCamera", self.current_camera.to_string());
        wire
    }
}

fn flag(value: bool) -> String {
    if value { "1" } else { "0" }.to_string()
}

/// Raw component state gathered under the session lock. Torch fields
/// must already be gated on the session actually holding a capture
/// pipeline; the projection itself performs no device calls.
pub(crate) struct ProjectionInputs<'a> {
    pub authorization: Authorization,
    pub capture_running: bool,
    pub scanning: bool,
    pub showing: bool,
    pub light_enabled: bool,
    pub can_enable_light: bool,
    pub can_open_settings: bool,
    pub capabilities: &'a DeviceCapabilities,
}

/// Pure projection; no side effects, callable in any session state.
pub(crate) fn project(inputs: ProjectionInputs<'_>) -> StatusSnapshot {
    StatusSnapshot {
        authorized: inputs.authorization == Authorization::Authorized,
        denied: inputs.authorization == Authorization::Denied,
        restricted: inputs.authorization == Authorization::Restricted,
        prepared: inputs.capture_running,
        scanning: inputs.scanning,
        showing: inputs.showing,
        light_enabled: inputs.light_enabled,
        can_open_settings: inputs.can_open_settings,
        can_enable_light: inputs.can_enable_light,
        can_change_camera: inputs.capabilities.can_change_camera(),
        current_camera: inputs.capabilities.active_index(),
    }
}
