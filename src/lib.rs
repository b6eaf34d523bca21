pub mod capabilities;
pub mod capture;
pub mod definitions;
pub mod errors;
pub mod events;
pub mod filter;
pub mod orientation;
pub mod session;
pub mod status;

pub use capabilities::DeviceCapabilities;
pub use capture::{CameraInventory, CaptureBackend};
pub use definitions::{
    Authorization, BarcodeFormat, CameraId, DeviceOrientation, PreviewTransform,
};
pub use errors::{CaptureError, ScannerError};
pub use events::{DecodeEvent, DecodeEventSender};
pub use filter::{FilterVerdict, ResultFilter};
pub use orientation::preview_transform;
pub use session::{
    DeliveryHandle, ScanOptions, ScanSubscription, SessionController, SessionState,
};
pub use status::StatusSnapshot;
