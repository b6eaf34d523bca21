use std::time::SystemTime;

use crate::definitions::BarcodeFormat;

/// A raw detection emitted by the decode engine. Immutable, consumed at
/// most once by the delivery loop.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodeEvent {
    pub text: String,
    pub format: BarcodeFormat,
    pub timestamp: SystemTime,
}

impl DecodeEvent {
    pub fn new(text: impl Into<String>, format: BarcodeFormat) -> Self {
        Self {
            text: text.into(),
            format,
            timestamp: SystemTime::now(),
        }
    }
}

/// Handle the decode engine pushes detections into.
pub type DecodeEventSender = futures::channel::mpsc::Sender<DecodeEvent>;
pub(crate) type DecodeEventReceiver = futures::channel::mpsc::Receiver<DecodeEvent>;

pub(crate) const DECODE_CHANNEL_CAPACITY: usize = 30;

pub(crate) fn decode_channel() -> (DecodeEventSender, DecodeEventReceiver) {
    futures::channel::mpsc::channel(DECODE_CHANNEL_CAPACITY)
}
