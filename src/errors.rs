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

use thiserror::Error;

/// Errors reported to the command caller. Each maps to a stable numeric
/// code understood by the bridge clients; the codes must never change.
#[derive(Error, Debug, Clone, Copy, Eq, PartialEq)]
pub enum ScannerError {
    #[error("unexpected device-layer failure")]
    Unexpected,

    #[error("camera access denied by the user")]
    CameraAccessDenied,

    #[error("camera access restricted by device policy")]
    CameraAccessRestricted,

    #[error("back camera unavailable")]
    BackCameraUnavailable,

    #[error("front camera unavailable")]
    FrontCameraUnavailable,

    #[error("no camera available")]
    CameraUnavailable,

    #[error("scan canceled")]
    ScanCanceled,

    #[error("light unavailable on the active camera")]
    LightUnavailable,

    #[error("settings screen unavailable")]
    OpenSettingsUnavailable,
}

impl ScannerError {
    /// Stable numeric code sent over the command bridge.
    pub fn code(&self) -> u8 {
        match self {
            Self::Unexpected => 0,
            Self::CameraAccessDenied => 1,
            Self::CameraAccessRestricted => 2,
            Self::BackCameraUnavailable => 3,
            Self::FrontCameraUnavailable => 4,
            Self::CameraUnavailable => 5,
            Self::ScanCanceled => 6,
            Self::LightUnavailable => 7,
            Self::OpenSettingsUnavailable => 8,
        }
    }
}

/// Failures surfaced by the capture backend. These are folded into the
/// numeric [`ScannerError`] space at the command boundary.
#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("no usable camera on this device")]
    NoCamera,

    #[error("torch not available on the bound camera")]
    TorchUnavailable,

    #[error("capture device failure: {0}")]
    Device(String),
}

impl From<CaptureError> for ScannerError {
    fn from(error: CaptureError) -> Self {
        match error {
            CaptureError::NoCamera => ScannerError::CameraUnavailable,
            CaptureError::TorchUnavailable => ScannerError::LightUnavailable,
            CaptureError::Device(_) => ScannerError::Unexpected,
        }
    }
}

impl From<String> for CaptureError {
    fn from(other: String) -> Self {
        CaptureError::Device(other)
    }
}
