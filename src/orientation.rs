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

use crate::definitions::{DeviceOrientation, PreviewTransform};

/// Computes the rotation pair that aligns the camera preview and the
/// scan rectangle with the device orientation.
///
/// Sampled once when the preview surface is attached; later rotation
/// notifications do not re-evaluate it.
pub fn preview_transform(orientation: DeviceOrientation) -> PreviewTransform {
    let (preview_rotation, scan_rect_rotation) = match orientation {
        DeviceOrientation::Portrait => (0, 90),
        DeviceOrientation::LandscapeLeft => (90, 180),
        DeviceOrientation::LandscapeRight => (270, 0),
        DeviceOrientation::PortraitUpsideDown => (180, 270),
        DeviceOrientation::Unknown => (0, 90),
    };
    PreviewTransform {
        preview_rotation,
        scan_rect_rotation,
    }
}
