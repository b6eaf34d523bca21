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

use crate::definitions::BarcodeFormat;
use crate::events::DecodeEvent;
use crate::session::SessionState;

/// What the delivery loop should do with a decode event.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum FilterVerdict {
    /// Drop the event; no callback, no state change.
    Discard,
    /// Deliver `event.text` to the pending request. `finish` is set for
    /// single-shot sessions: the request is cleared and the session
    /// moves to Stopped atomically with the delivery.
    Deliver { finish: bool },
}

/// Accept/reject policy for one scan request: the optional format
/// constraint and the single-vs-continuous mode chosen at `scan` time.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct ResultFilter {
    format: Option<BarcodeFormat>,
    continuous: bool,
}

impl ResultFilter {
    pub fn new(format: Option<BarcodeFormat>, continuous: bool) -> Self {
        Self { format, continuous }
    }

    pub fn format(&self) -> Option<BarcodeFormat> {
        self.format
    }

    pub fn continuous(&self) -> bool {
        self.continuous
    }

    pub fn evaluate(&self, state: SessionState, event: &DecodeEvent) -> FilterVerdict {
        if state != SessionState::Scanning {
            return FilterVerdict::Discard;
        }
        if let Some(wanted) = self.format {
            if event.format != wanted {
                return FilterVerdict::Discard;
            }
        }
        FilterVerdict::Deliver {
            finish: !self.continuous,
        }
    }
}
