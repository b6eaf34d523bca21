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

//! Console walkthrough of a scan session against a scripted backend.
//! Handy for eyeballing log output and the wire status encoding:
//! `RUST_LOG=debug cargo run --bin console`

use std::sync::Mutex;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use bbscanner_core::{
    Authorization, BarcodeFormat, CameraId, CameraInventory, CaptureBackend, CaptureError,
    DecodeEvent, DeviceOrientation, PreviewTransform, ScanOptions, SessionController,
};
use futures::SinkExt;
use std::sync::Arc;

struct ScriptedBackend {
    torch_on: Mutex<bool>,
}

#[async_trait]
impl CaptureBackend for ScriptedBackend {
    fn authorization(&self) -> Authorization {
        Authorization::Authorized
    }

    async fn request_access(&self) -> Authorization {
        Authorization::Authorized
    }

    async fn enumerate_cameras(&self) -> Result<CameraInventory, CaptureError> {
        Ok(CameraInventory {
            back: Some(0),
            front: Some(1),
        })
    }

    async fn bind_camera(&self, camera: CameraId) -> Result<(), CaptureError> {
        println!("backend: bound camera {camera}");
        Ok(())
    }

    async fn attach_preview(&self, transform: PreviewTransform) -> Result<(), CaptureError> {
        println!("backend: preview attached with {transform:?}");
        Ok(())
    }

    async fn detach_preview(&self) {
        println!("backend: preview detached");
    }

    async fn start_capture(&self) -> Result<(), CaptureError> {
        println!("backend: capture started");
        Ok(())
    }

    async fn stop_capture(&self) {
        println!("backend: capture stopped");
    }

    fn has_torch(&self, camera: CameraId) -> bool {
        camera == 0
    }

    fn torch_active(&self) -> bool {
        *self.torch_on.lock().unwrap()
    }

    async fn set_torch(&self, enabled: bool) -> Result<(), CaptureError> {
        *self.torch_on.lock().unwrap() = enabled;
        Ok(())
    }

    async fn last_frame(&self) -> Result<Vec<u8>, CaptureError> {
        Ok(b"not actually a png".to_vec())
    }

    fn current_orientation(&self) -> DeviceOrientation {
        DeviceOrientation::Portrait
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let backend = Arc::new(ScriptedBackend {
        torch_on: Mutex::new(false),
    });
    let (controller, delivery) = SessionController::start(backend);
    let mut decode_tx = controller.decode_sender();

    println!("prepare -> {:?}", controller.prepare().await?.to_wire());

    let mut subscription = controller
        .scan(ScanOptions {
            format: Some("QR_CODE".into()),
            multiple_scan: false,
        })
        .await?;

    // the "decode engine": one mismatch, then a hit
    decode_tx
        .send(DecodeEvent::new("4006381333931", BarcodeFormat::Ean13))
        .await?;
    decode_tx
        .send(DecodeEvent::new("https://example.com", BarcodeFormat::QrCode))
        .await?;

    match subscription.next().await {
        Some(Ok(text)) => println!("scan result: {text}"),
        Some(Err(error)) => println!("scan failed: {error} (code {})", error.code()),
        None => println!("scan ended without a result"),
    }

    println!("light -> {:?}", controller.enable_light().await?.to_wire());
    tokio::time::sleep(Duration::from_millis(50)).await;
    println!("destroy -> {:?}", controller.destroy().await?.to_wire());

    delivery.shutdown().await?;
    Ok(())
}
