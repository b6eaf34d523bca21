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

use std::sync::Arc;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use futures::StreamExt;
use log::{debug, info, warn};
use tokio::select;
use tokio::sync::{mpsc, oneshot, Mutex};
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::capabilities::DeviceCapabilities;
use crate::capture::CaptureBackend;
use crate::definitions::{Authorization, BarcodeFormat, PreviewTransform};
use crate::errors::ScannerError;
use crate::events::{decode_channel, DecodeEvent, DecodeEventReceiver, DecodeEventSender};
use crate::filter::{FilterVerdict, ResultFilter};
use crate::orientation::preview_transform;
use crate::status::{self, ProjectionInputs, StatusSnapshot};

/// Lifecycle of the scan session owned by a [`SessionController`].
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub enum SessionState {
    #[default]
    Uninitialized,
    Prepared,
    Scanning,
    Paused,
    Stopped,
    Destroyed,
}

/// Options accepted by [`SessionController::scan`].
#[derive(Debug, Clone, Default)]
pub struct ScanOptions {
    /// Wire name of the only format to deliver; anything else is
    /// silently dropped. `None` accepts every format.
    pub format: Option<String>,
    /// Keep delivering results until `stop`; otherwise the first
    /// accepted result ends the session.
    pub multiple_scan: bool,
}

/// The in-flight scan request: results and the cancellation outcome are
/// pushed through `results`.
struct ScanRequest {
    id: Uuid,
    results: mpsc::UnboundedSender<Result<String, ScannerError>>,
}

impl ScanRequest {
    fn resolve_canceled(self) {
        debug!("scan request {} resolved with scan_canceled", self.id);
        let _ = self.results.send(Err(ScannerError::ScanCanceled));
    }
}

/// Caller-side end of a scan request. Yields one result for single-shot
/// sessions, a stream of results in continuous mode, and
/// `Err(ScanCanceled)` when `stop`/`destroy` cut the request short.
pub struct ScanSubscription {
    rx: mpsc::UnboundedReceiver<Result<String, ScannerError>>,
}

impl ScanSubscription {
    pub async fn next(&mut self) -> Option<Result<String, ScannerError>> {
        self.rx.recv().await
    }

    /// Non-blocking poll; `None` when nothing has been delivered yet.
    pub fn try_next(&mut self) -> Option<Result<String, ScannerError>> {
        self.rx.try_recv().ok()
    }
}

/// Everything mutated by commands or the delivery loop. Guarded by one
/// async mutex so that session transitions, camera selection and decode
/// delivery serialize against each other; holding the lock across the
/// permission prompt is what queues concurrent `prepare` calls.
#[derive(Default)]
struct Inner {
    state: SessionState,
    capabilities: DeviceCapabilities,
    transform: Option<PreviewTransform>,
    filter: Option<ResultFilter>,
    pending: Option<ScanRequest>,
    capture_running: bool,
    showing: bool,
}

impl Inner {
    fn has_capture(&self) -> bool {
        !matches!(
            self.state,
            SessionState::Uninitialized | SessionState::Destroyed
        )
    }
}

/// Handle to the decode delivery task.
pub struct DeliveryHandle {
    join: JoinHandle<()>,
    shutdown_tx: oneshot::Sender<()>,
}

impl DeliveryHandle {
    pub async fn shutdown(self) -> Result<(), tokio::task::JoinError> {
        let _ = self.shutdown_tx.send(());
        self.join.await
    }

    pub fn abort(self) {
        self.join.abort();
    }
}

/// Owns the scan session state machine and the preview/capture
/// resource, arbitrates camera and torch access, and feeds accepted
/// decode results to the caller.
///
/// Commands serialize on the session lock. Decode events arrive through
/// the channel returned by [`decode_sender`] and are filtered by the
/// delivery task under the same lock, so a `stop` that has already
/// moved the session out of Scanning wins any race with an in-flight
/// event: the event is discarded.
///
/// [`decode_sender`]: SessionController::decode_sender
pub struct SessionController {
    backend: Arc<dyn CaptureBackend>,
    inner: Mutex<Inner>,
    decode_tx: DecodeEventSender,
}

impl SessionController {
    /// Creates the controller and spawns its decode delivery task.
    pub fn start(backend: Arc<dyn CaptureBackend>) -> (Arc<Self>, DeliveryHandle) {
        let (decode_tx, decode_rx) = decode_channel();
        let controller = Arc::new(Self {
            backend,
            inner: Mutex::new(Inner::default()),
            decode_tx,
        });
        let handle = controller.clone().spawn_delivery(decode_rx);
        (controller, handle)
    }

    /// Channel the decode engine pushes raw detections into.
    pub fn decode_sender(&self) -> DecodeEventSender {
        self.decode_tx.clone()
    }

    fn spawn_delivery(self: Arc<Self>, mut decode_rx: DecodeEventReceiver) -> DeliveryHandle {
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();
        let join = tokio::spawn(async move {
            loop {
                select! {
                    biased;
                    _ = &mut shutdown_rx => {
                        info!("decode delivery shutdown requested");
                        break;
                    }
                    event = decode_rx.next() => {
                        match event {
                            Some(event) => self.on_decode_event(event).await,
                            None => {
                                info!("decode channel closed; stopping delivery");
                                break;
                            }
                        }
                    }
                }
            }
        });
        DeliveryHandle { join, shutdown_tx }
    }

    async fn on_decode_event(&self, event: DecodeEvent) {
        let mut inner = self.inner.lock().await;
        let verdict = match inner.filter {
            Some(filter) => filter.evaluate(inner.state, &event),
            None => FilterVerdict::Discard,
        };
        match verdict {
            FilterVerdict::Discard => {
                debug!(
                    "decode event discarded (state {:?}, format {:?})",
                    inner.state, event.format
                );
            }
            FilterVerdict::Deliver { finish } => {
                if let Some(request) = inner.pending.as_ref() {
                    debug!("delivering result to scan request {}", request.id);
                    let _ = request.results.send(Ok(event.text));
                } else {
                    warn!("accepted decode event without a pending request; dropping");
                    return;
                }
                if finish {
                    inner.pending = None;
                    inner.filter = None;
                    inner.state = SessionState::Stopped;
                    if inner.capture_running {
                        self.backend.stop_capture().await;
                        inner.capture_running = false;
                    }
                }
            }
        }
    }

    /// Acquires camera access and the preview/capture resources.
    /// Idempotent: an already prepared (or later) session succeeds
    /// immediately without re-acquiring anything.
    pub async fn prepare(&self) -> Result<StatusSnapshot, ScannerError> {
        let mut inner = self.inner.lock().await;
        self.ensure_prepared(&mut inner).await?;
        Ok(self.project(&inner))
    }

    async fn ensure_prepared(&self, inner: &mut Inner) -> Result<(), ScannerError> {
        let mut authorization = self.backend.authorization();
        if authorization == Authorization::NotDetermined {
            // Prompt and wait; the session lock is held, so any command
            // issued meanwhile queues behind this completion.
            info!("camera permission undetermined; prompting");
            authorization = self.backend.request_access().await;
        }
        match authorization {
            Authorization::Restricted => return Err(ScannerError::CameraAccessRestricted),
            Authorization::Denied => return Err(ScannerError::CameraAccessDenied),
            _ => {}
        }

        if inner.has_capture() {
            return Ok(());
        }

        if !inner.capabilities.inventory_known() {
            let inventory = self.backend.enumerate_cameras().await?;
            inner.capabilities.record_inventory(inventory);
        }
        let camera = inner
            .capabilities
            .active_camera()
            .ok_or(ScannerError::CameraUnavailable)?;
        self.backend.bind_camera(camera).await?;

        // Orientation is sampled here, once; rotations while the
        // session lives do not refresh the transform.
        let transform = preview_transform(self.backend.current_orientation());
        self.backend.attach_preview(transform).await?;
        inner.transform = Some(transform);
        inner.state = SessionState::Prepared;
        info!("scan session prepared (camera {})", camera);
        Ok(())
    }

    /// Starts scanning. Results arrive on the returned subscription;
    /// one result unless `multiple_scan` was set. A request already in
    /// flight is resolved with `scan_canceled` first.
    pub async fn scan(&self, options: ScanOptions) -> Result<ScanSubscription, ScannerError> {
        let mut inner = self.inner.lock().await;
        self.ensure_prepared(&mut inner).await?;

        if !inner.capture_running {
            self.backend.start_capture().await?;
            inner.capture_running = true;
        }

        if let Some(previous) = inner.pending.take() {
            warn!("scan requested while request {} was pending", previous.id);
            previous.resolve_canceled();
        }

        let format = options.format.as_deref().map(BarcodeFormat::from_wire);
        inner.filter = Some(ResultFilter::new(format, options.multiple_scan));

        let (tx, rx) = mpsc::unbounded_channel();
        let request = ScanRequest {
            id: Uuid::new_v4(),
            results: tx,
        };
        debug!(
            "scan request {} started (format {:?}, continuous {})",
            request.id, format, options.multiple_scan
        );
        inner.pending = Some(request);
        inner.state = SessionState::Scanning;
        inner.showing = true;
        Ok(ScanSubscription { rx })
    }

    /// Suspends delivery; capture keeps running.
    pub async fn pause(&self) {
        let mut inner = self.inner.lock().await;
        if inner.state == SessionState::Scanning {
            inner.state = SessionState::Paused;
            debug!("scan session paused");
        }
    }

    pub async fn resume(&self) {
        let mut inner = self.inner.lock().await;
        if inner.state == SessionState::Paused {
            inner.state = SessionState::Scanning;
            debug!("scan session resumed");
        }
    }

    /// Halts capture and hides the preview. A pending request is
    /// resolved with `scan_canceled`, never left dangling.
    pub async fn stop(&self) -> Result<StatusSnapshot, ScannerError> {
        let mut inner = self.inner.lock().await;
        self.ensure_prepared(&mut inner).await?;
        if matches!(inner.state, SessionState::Scanning | SessionState::Paused) {
            inner.state = SessionState::Stopped;
        }
        inner.showing = false;
        inner.filter = None;
        if inner.capture_running {
            self.backend.stop_capture().await;
            inner.capture_running = false;
        }
        if let Some(request) = inner.pending.take() {
            request.resolve_canceled();
        }
        Ok(self.project(&inner))
    }

    /// Base64 of the most recent capture frame.
    pub async fn snap(&self) -> Result<String, ScannerError> {
        let mut inner = self.inner.lock().await;
        self.ensure_prepared(&mut inner).await?;
        let frame = self.backend.last_frame().await?;
        Ok(BASE64.encode(frame))
    }

    /// Switches the active camera. Index 0 is the back camera, anything
    /// else the front one. A no-op when the index is already active;
    /// otherwise both cameras must exist.
    pub async fn use_camera(&self, index: u32) -> Result<StatusSnapshot, ScannerError> {
        let mut inner = self.inner.lock().await;
        if index == inner.capabilities.active_index() {
            return Ok(self.project(&inner));
        }
        let camera = inner.capabilities.camera_for_switch(index)?;
        self.ensure_prepared(&mut inner).await?;
        self.backend.bind_camera(camera).await?;
        inner.capabilities.set_active(index);
        info!("active camera switched to index {} ({})", index, camera);
        Ok(self.project(&inner))
    }

    pub async fn enable_light(&self) -> Result<StatusSnapshot, ScannerError> {
        self.configure_light(true).await
    }

    pub async fn disable_light(&self) -> Result<StatusSnapshot, ScannerError> {
        self.configure_light(false).await
    }

    async fn configure_light(&self, enabled: bool) -> Result<StatusSnapshot, ScannerError> {
        let mut inner = self.inner.lock().await;
        self.ensure_prepared(&mut inner).await?;
        let camera = inner
            .capabilities
            .active_camera()
            .ok_or(ScannerError::LightUnavailable)?;
        if !self.backend.has_torch(camera) {
            return Err(ScannerError::LightUnavailable);
        }
        // Toggling to the current state is a no-op success.
        if self.backend.torch_active() != enabled {
            self.backend.set_torch(enabled).await?;
        }
        Ok(self.project(&inner))
    }

    /// Releases the preview and capture resources. The controller stays
    /// queryable; any command other than status requires a new
    /// `prepare`.
    pub async fn destroy(&self) -> Result<StatusSnapshot, ScannerError> {
        let mut inner = self.inner.lock().await;
        if inner.has_capture() {
            if inner.capture_running {
                self.backend.stop_capture().await;
                inner.capture_running = false;
            }
            self.backend.detach_preview().await;
        }
        if let Some(request) = inner.pending.take() {
            request.resolve_canceled();
        }
        inner.filter = None;
        inner.transform = None;
        inner.showing = false;
        inner.capabilities.reset_active();
        inner.state = SessionState::Destroyed;
        info!("scan session destroyed");
        Ok(self.project(&inner))
    }

    /// Rotation pair applied when the preview was attached; `None`
    /// until `prepare` succeeds and again after `destroy`.
    pub async fn preview_transform(&self) -> Option<PreviewTransform> {
        self.inner.lock().await.transform
    }

    /// Side-effect-free status snapshot, valid in every state.
    pub async fn get_status(&self) -> StatusSnapshot {
        let inner = self.inner.lock().await;
        self.project(&inner)
    }

    /// Opens the platform settings screen so the user can change a
    /// denied permission.
    pub async fn open_settings(&self) -> Result<StatusSnapshot, ScannerError> {
        let inner = self.inner.lock().await;
        if !self.backend.can_open_settings() {
            return Err(ScannerError::OpenSettingsUnavailable);
        }
        self.backend
            .open_settings()
            .await
            .map_err(|_| ScannerError::OpenSettingsUnavailable)?;
        Ok(self.project(&inner))
    }

    fn project(&self, inner: &Inner) -> StatusSnapshot {
        let has_capture = inner.has_capture();
        let can_enable_light = has_capture
            && inner
                .capabilities
                .active_camera()
                .map(|camera| self.backend.has_torch(camera))
                .unwrap_or(false);
        status::project(ProjectionInputs {
            authorization: self.backend.authorization(),
            capture_running: has_capture && inner.capture_running,
            scanning: inner.state == SessionState::Scanning,
            showing: inner.showing,
            light_enabled: has_capture && self.backend.torch_active(),
            can_enable_light,
            can_open_settings: self.backend.can_open_settings(),
            capabilities: &inner.capabilities,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::CameraInventory;
    use crate::definitions::{CameraId, DeviceOrientation};
    use crate::errors::CaptureError;
    use async_trait::async_trait;
    use futures::SinkExt;
    use std::sync::Mutex as StdMutex;
    use std::time::Duration;
    use tokio::time::sleep;

    const BACK: CameraId = 1;
    const FRONT: CameraId = 2;

    struct MockState {
        authorization: Authorization,
        grant_on_request: Authorization,
        inventory: CameraInventory,
        torch_cameras: Vec<CameraId>,
        torch_on: bool,
        running: bool,
        orientation: DeviceOrientation,
        frame: Vec<u8>,
        can_open_settings: bool,
        enumerate_calls: usize,
        request_access_calls: usize,
        bind_calls: Vec<CameraId>,
        attached_transform: Option<PreviewTransform>,
        attach_calls: usize,
        detach_calls: usize,
        set_torch_calls: usize,
    }

    impl Default for MockState {
        fn default() -> Self {
            Self {
                authorization: Authorization::Authorized,
                grant_on_request: Authorization::Authorized,
                inventory: CameraInventory {
                    back: Some(BACK),
                    front: Some(FRONT),
                },
                torch_cameras: vec![BACK],
                torch_on: false,
                running: false,
                orientation: DeviceOrientation::Portrait,
                frame: vec![0xDE, 0xAD, 0xBE, 0xEF],
                can_open_settings: false,
                enumerate_calls: 0,
                request_access_calls: 0,
                bind_calls: Vec::new(),
                attached_transform: None,
                attach_calls: 0,
                detach_calls: 0,
                set_torch_calls: 0,
            }
        }
    }

    struct MockBackend {
        state: StdMutex<MockState>,
    }

    impl MockBackend {
        fn with(configure: impl FnOnce(&mut MockState)) -> Arc<Self> {
            let mut state = MockState::default();
            configure(&mut state);
            Arc::new(Self {
                state: StdMutex::new(state),
            })
        }

        fn default_device() -> Arc<Self> {
            Self::with(|_| {})
        }

        fn snapshot<T>(&self, read: impl FnOnce(&MockState) -> T) -> T {
            read(&self.state.lock().unwrap())
        }
    }

    #[async_trait]
    impl CaptureBackend for MockBackend {
        fn authorization(&self) -> Authorization {
            self.state.lock().unwrap().authorization
        }

        async fn request_access(&self) -> Authorization {
            // the prompt takes a moment, like a real dialog
            sleep(Duration::from_millis(10)).await;
            let mut state = self.state.lock().unwrap();
            state.request_access_calls += 1;
            state.authorization = state.grant_on_request;
            state.authorization
        }

        async fn enumerate_cameras(&self) -> Result<CameraInventory, CaptureError> {
            let mut state = self.state.lock().unwrap();
            state.enumerate_calls += 1;
            Ok(state.inventory)
        }

        async fn bind_camera(&self, camera: CameraId) -> Result<(), CaptureError> {
            self.state.lock().unwrap().bind_calls.push(camera);
            Ok(())
        }

        async fn attach_preview(&self, transform: PreviewTransform) -> Result<(), CaptureError> {
            let mut state = self.state.lock().unwrap();
            state.attached_transform = Some(transform);
            state.attach_calls += 1;
            Ok(())
        }

        async fn detach_preview(&self) {
            let mut state = self.state.lock().unwrap();
            state.attached_transform = None;
            state.detach_calls += 1;
        }

        async fn start_capture(&self) -> Result<(), CaptureError> {
            self.state.lock().unwrap().running = true;
            Ok(())
        }

        async fn stop_capture(&self) {
            self.state.lock().unwrap().running = false;
        }

        fn has_torch(&self, camera: CameraId) -> bool {
            self.state.lock().unwrap().torch_cameras.contains(&camera)
        }

        fn torch_active(&self) -> bool {
            self.state.lock().unwrap().torch_on
        }

        async fn set_torch(&self, enabled: bool) -> Result<(), CaptureError> {
            let mut state = self.state.lock().unwrap();
            state.set_torch_calls += 1;
            state.torch_on = enabled;
            Ok(())
        }

        async fn last_frame(&self) -> Result<Vec<u8>, CaptureError> {
            Ok(self.state.lock().unwrap().frame.clone())
        }

        fn current_orientation(&self) -> DeviceOrientation {
            self.state.lock().unwrap().orientation
        }

        fn can_open_settings(&self) -> bool {
            self.state.lock().unwrap().can_open_settings
        }

        async fn open_settings(&self) -> Result<(), CaptureError> {
            if self.state.lock().unwrap().can_open_settings {
                Ok(())
            } else {
                Err(CaptureError::Device("no settings screen".into()))
            }
        }
    }

    fn start(
        backend: Arc<MockBackend>,
    ) -> (Arc<SessionController>, DeliveryHandle, DecodeEventSender) {
        let (controller, handle) = SessionController::start(backend);
        let sender = controller.decode_sender();
        (controller, handle, sender)
    }

    async fn short_wait() {
        sleep(Duration::from_millis(20)).await
    }

    async fn push(sender: &mut DecodeEventSender, text: &str, format: BarcodeFormat) {
        sender
            .send(DecodeEvent::new(text, format))
            .await
            .expect("decode channel open");
    }

    #[tokio::test]
    async fn prepare_reports_status_without_starting_capture() {
        let backend = MockBackend::default_device();
        let (controller, handle, _sender) = start(backend.clone());

        let snapshot = controller.prepare().await.unwrap();
        assert!(snapshot.authorized);
        assert!(!snapshot.prepared); // capture not running until scan
        assert!(!snapshot.scanning);
        assert!(snapshot.can_change_camera);
        assert_eq!(snapshot.current_camera, 0);
        assert_eq!(backend.snapshot(|s| s.bind_calls.clone()), vec![BACK]);

        let _ = handle.shutdown().await;
    }

    #[tokio::test]
    async fn prepare_fails_on_denied_or_restricted_without_transition() {
        for (authorization, expected) in [
            (Authorization::Denied, ScannerError::CameraAccessDenied),
            (Authorization::Restricted, ScannerError::CameraAccessRestricted),
        ] {
            let backend = MockBackend::with(|s| s.authorization = authorization);
            let (controller, handle, _sender) = start(backend.clone());

            assert_eq!(controller.prepare().await.unwrap_err(), expected);
            let snapshot = controller.get_status().await;
            assert!(!snapshot.prepared);
            assert!(!snapshot.scanning);
            assert_eq!(backend.snapshot(|s| s.enumerate_calls), 0);

            let _ = handle.shutdown().await;
        }
    }

    #[tokio::test]
    async fn prepare_is_idempotent() {
        let backend = MockBackend::default_device();
        let (controller, handle, _sender) = start(backend.clone());

        controller.prepare().await.unwrap();
        controller.prepare().await.unwrap();
        assert_eq!(backend.snapshot(|s| s.enumerate_calls), 1);
        assert_eq!(backend.snapshot(|s| s.attach_calls), 1);

        let _ = handle.shutdown().await;
    }

    #[tokio::test]
    async fn queued_prepares_share_one_permission_prompt() {
        let backend = MockBackend::with(|s| {
            s.authorization = Authorization::NotDetermined;
        });
        let (controller, handle, _sender) = start(backend.clone());

        let (first, second) = tokio::join!(controller.prepare(), controller.prepare());
        assert!(first.is_ok());
        assert!(second.is_ok());
        assert_eq!(backend.snapshot(|s| s.request_access_calls), 1);
        assert_eq!(backend.snapshot(|s| s.enumerate_calls), 1);

        let _ = handle.shutdown().await;
    }

    #[tokio::test]
    async fn prompt_answered_with_denial_fails_prepare() {
        let backend = MockBackend::with(|s| {
            s.authorization = Authorization::NotDetermined;
            s.grant_on_request = Authorization::Denied;
        });
        let (controller, handle, _sender) = start(backend);

        assert_eq!(
            controller.prepare().await.unwrap_err(),
            ScannerError::CameraAccessDenied
        );

        let _ = handle.shutdown().await;
    }

    #[tokio::test]
    async fn prepare_without_any_camera_fails() {
        let backend = MockBackend::with(|s| s.inventory = CameraInventory::default());
        let (controller, handle, _sender) = start(backend);

        assert_eq!(
            controller.prepare().await.unwrap_err(),
            ScannerError::CameraUnavailable
        );
        assert!(!controller.get_status().await.prepared);

        let _ = handle.shutdown().await;
    }

    #[tokio::test]
    async fn single_shot_scan_delivers_once_then_stops() {
        let backend = MockBackend::default_device();
        let (controller, handle, mut sender) = start(backend.clone());

        let mut subscription = controller.scan(ScanOptions::default()).await.unwrap();
        assert!(controller.get_status().await.scanning);

        push(&mut sender, "123456", BarcodeFormat::Ean13).await;
        assert_eq!(subscription.next().await, Some(Ok("123456".into())));

        let snapshot = controller.get_status().await;
        assert!(!snapshot.scanning);
        assert!(!snapshot.prepared); // capture halted with the delivery
        assert!(!backend.snapshot(|s| s.running));

        // no further callbacks without a new scan
        push(&mut sender, "789", BarcodeFormat::Ean13).await;
        assert_eq!(subscription.next().await, None);

        let _ = handle.shutdown().await;
    }

    #[tokio::test]
    async fn format_filter_drops_mismatched_events() {
        let backend = MockBackend::default_device();
        let (controller, handle, mut sender) = start(backend);

        let mut subscription = controller
            .scan(ScanOptions {
                format: Some("QR_CODE".into()),
                multiple_scan: false,
            })
            .await
            .unwrap();

        push(&mut sender, "123456", BarcodeFormat::Ean13).await;
        short_wait().await;
        assert_eq!(subscription.try_next(), None);
        assert!(controller.get_status().await.scanning); // mismatch changed nothing

        push(&mut sender, "abc", BarcodeFormat::QrCode).await;
        assert_eq!(subscription.next().await, Some(Ok("abc".into())));

        let _ = handle.shutdown().await;
    }

    #[tokio::test]
    async fn continuous_scan_keeps_delivering() {
        let backend = MockBackend::default_device();
        let (controller, handle, mut sender) = start(backend);

        let mut subscription = controller
            .scan(ScanOptions {
                format: None,
                multiple_scan: true,
            })
            .await
            .unwrap();

        push(&mut sender, "first", BarcodeFormat::Code128).await;
        push(&mut sender, "second", BarcodeFormat::Ean8).await;
        assert_eq!(subscription.next().await, Some(Ok("first".into())));
        assert_eq!(subscription.next().await, Some(Ok("second".into())));
        assert!(controller.get_status().await.scanning);

        let _ = handle.shutdown().await;
    }

    #[tokio::test]
    async fn stop_cancels_the_pending_request() {
        let backend = MockBackend::default_device();
        let (controller, handle, _sender) = start(backend.clone());

        let mut subscription = controller.scan(ScanOptions::default()).await.unwrap();
        let snapshot = controller.stop().await.unwrap();
        assert!(!snapshot.scanning);
        assert!(!snapshot.showing);
        assert!(!backend.snapshot(|s| s.running));
        assert_eq!(
            subscription.next().await,
            Some(Err(ScannerError::ScanCanceled))
        );

        let _ = handle.shutdown().await;
    }

    #[tokio::test]
    async fn event_arriving_after_stop_is_discarded() {
        let backend = MockBackend::default_device();
        let (controller, handle, mut sender) = start(backend);

        let mut subscription = controller.scan(ScanOptions::default()).await.unwrap();
        controller.stop().await.unwrap();
        push(&mut sender, "late", BarcodeFormat::Ean13).await;
        short_wait().await;

        assert_eq!(
            subscription.next().await,
            Some(Err(ScannerError::ScanCanceled))
        );
        assert_eq!(subscription.next().await, None);
        assert!(!controller.get_status().await.scanning);

        let _ = handle.shutdown().await;
    }

    #[tokio::test]
    async fn pause_suspends_delivery_and_resume_restores_it() {
        let backend = MockBackend::default_device();
        let (controller, handle, mut sender) = start(backend.clone());

        let mut subscription = controller
            .scan(ScanOptions {
                format: None,
                multiple_scan: true,
            })
            .await
            .unwrap();

        controller.pause().await;
        push(&mut sender, "ignored", BarcodeFormat::Ean13).await;
        short_wait().await;
        assert_eq!(subscription.try_next(), None);
        assert!(backend.snapshot(|s| s.running)); // capture keeps running

        controller.resume().await;
        push(&mut sender, "seen", BarcodeFormat::Ean13).await;
        assert_eq!(subscription.next().await, Some(Ok("seen".into())));

        let _ = handle.shutdown().await;
    }

    #[tokio::test]
    async fn pause_and_resume_outside_a_scan_change_nothing() {
        let backend = MockBackend::default_device();
        let (controller, handle, _sender) = start(backend.clone());

        controller.prepare().await.unwrap();
        let before = controller.get_status().await;

        controller.pause().await;
        assert_eq!(controller.get_status().await, before);
        controller.resume().await;
        assert_eq!(controller.get_status().await, before);
        assert!(!backend.snapshot(|s| s.running));

        let _ = handle.shutdown().await;
    }

    #[tokio::test]
    async fn rescan_cancels_the_previous_request() {
        let backend = MockBackend::default_device();
        let (controller, handle, mut sender) = start(backend);

        let mut first = controller.scan(ScanOptions::default()).await.unwrap();
        let mut second = controller.scan(ScanOptions::default()).await.unwrap();

        assert_eq!(first.next().await, Some(Err(ScannerError::ScanCanceled)));
        push(&mut sender, "123", BarcodeFormat::Ean13).await;
        assert_eq!(second.next().await, Some(Ok("123".into())));

        let _ = handle.shutdown().await;
    }

    #[tokio::test]
    async fn use_camera_reports_the_missing_side() {
        let backend = MockBackend::with(|s| s.inventory.front = None);
        let (controller, handle, _sender) = start(backend);
        controller.prepare().await.unwrap();

        assert_eq!(
            controller.use_camera(1).await.unwrap_err(),
            ScannerError::FrontCameraUnavailable
        );
        assert_eq!(controller.get_status().await.current_camera, 0);

        let _ = handle.shutdown().await;
    }

    #[tokio::test]
    async fn use_camera_switches_and_rebinds() {
        let backend = MockBackend::default_device();
        let (controller, handle, _sender) = start(backend.clone());
        controller.prepare().await.unwrap();

        let snapshot = controller.use_camera(1).await.unwrap();
        assert_eq!(snapshot.current_camera, 1);
        assert_eq!(
            backend.snapshot(|s| s.bind_calls.clone()),
            vec![BACK, FRONT]
        );

        let _ = handle.shutdown().await;
    }

    #[tokio::test]
    async fn use_camera_with_active_index_is_a_no_op() {
        let backend = MockBackend::default_device();
        let (controller, handle, _sender) = start(backend.clone());

        let snapshot = controller.use_camera(0).await.unwrap();
        assert_eq!(snapshot.current_camera, 0);
        assert_eq!(backend.snapshot(|s| s.enumerate_calls), 0);
        assert!(backend.snapshot(|s| s.bind_calls.is_empty()));

        let _ = handle.shutdown().await;
    }

    #[tokio::test]
    async fn light_requires_torch_on_the_active_camera() {
        let backend = MockBackend::with(|s| s.torch_cameras.clear());
        let (controller, handle, _sender) = start(backend.clone());

        assert_eq!(
            controller.enable_light().await.unwrap_err(),
            ScannerError::LightUnavailable
        );
        assert!(!controller.get_status().await.light_enabled);
        assert_eq!(backend.snapshot(|s| s.set_torch_calls), 0);

        let _ = handle.shutdown().await;
    }

    #[tokio::test]
    async fn light_toggles_and_repeated_enable_is_a_no_op() {
        let backend = MockBackend::default_device();
        let (controller, handle, _sender) = start(backend.clone());

        let snapshot = controller.enable_light().await.unwrap();
        assert!(snapshot.light_enabled);
        assert!(snapshot.can_enable_light);

        controller.enable_light().await.unwrap();
        assert_eq!(backend.snapshot(|s| s.set_torch_calls), 1);

        let snapshot = controller.disable_light().await.unwrap();
        assert!(!snapshot.light_enabled);

        let _ = handle.shutdown().await;
    }

    #[tokio::test]
    async fn snap_returns_the_frame_as_base64() {
        let backend = MockBackend::default_device();
        let (controller, handle, _sender) = start(backend.clone());

        let payload = controller.snap().await.unwrap();
        let frame = backend.snapshot(|s| s.frame.clone());
        assert_eq!(payload, BASE64.encode(frame));

        let _ = handle.shutdown().await;
    }

    #[tokio::test]
    async fn destroy_releases_resources_and_cancels_the_request() {
        let backend = MockBackend::default_device();
        let (controller, handle, _sender) = start(backend.clone());

        let mut subscription = controller
            .scan(ScanOptions {
                format: None,
                multiple_scan: true,
            })
            .await
            .unwrap();
        controller.use_camera(1).await.unwrap();

        let snapshot = controller.destroy().await.unwrap();
        assert!(!snapshot.prepared);
        assert!(!snapshot.scanning);
        assert!(!snapshot.showing);
        assert!(!snapshot.light_enabled);
        assert!(!snapshot.can_enable_light);
        assert_eq!(snapshot.current_camera, 0); // selection reset to back
        assert_eq!(backend.snapshot(|s| s.detach_calls), 1);
        assert!(!backend.snapshot(|s| s.running));
        assert_eq!(
            subscription.next().await,
            Some(Err(ScannerError::ScanCanceled))
        );

        let _ = handle.shutdown().await;
    }

    #[tokio::test]
    async fn prepare_after_destroy_reacquires_without_re_enumerating() {
        let backend = MockBackend::default_device();
        let (controller, handle, _sender) = start(backend.clone());

        controller.prepare().await.unwrap();
        controller.destroy().await.unwrap();
        let snapshot = controller.prepare().await.unwrap();
        assert!(snapshot.can_change_camera);
        assert_eq!(backend.snapshot(|s| s.enumerate_calls), 1);
        assert_eq!(backend.snapshot(|s| s.attach_calls), 2);

        let _ = handle.shutdown().await;
    }

    #[tokio::test]
    async fn preview_transform_is_sampled_at_attach_time() {
        let backend = MockBackend::with(|s| s.orientation = DeviceOrientation::LandscapeLeft);
        let (controller, handle, _sender) = start(backend.clone());

        controller.prepare().await.unwrap();
        assert_eq!(
            backend.snapshot(|s| s.attached_transform),
            Some(PreviewTransform {
                preview_rotation: 90,
                scan_rect_rotation: 180,
            })
        );

        // a later rotation does not refresh the attached transform
        backend.state.lock().unwrap().orientation = DeviceOrientation::Portrait;
        controller.prepare().await.unwrap();
        assert_eq!(
            backend.snapshot(|s| s.attached_transform),
            Some(PreviewTransform {
                preview_rotation: 90,
                scan_rect_rotation: 180,
            })
        );
        assert_eq!(
            controller.preview_transform().await,
            Some(PreviewTransform {
                preview_rotation: 90,
                scan_rect_rotation: 180,
            })
        );

        controller.destroy().await.unwrap();
        assert_eq!(controller.preview_transform().await, None);

        let _ = handle.shutdown().await;
    }

    #[tokio::test]
    async fn status_is_stable_between_commands() {
        let backend = MockBackend::default_device();
        let (controller, handle, _sender) = start(backend);

        controller.prepare().await.unwrap();
        let first = controller.get_status().await;
        let second = controller.get_status().await;
        assert_eq!(first, second);

        let _ = handle.shutdown().await;
    }

    #[tokio::test]
    async fn open_settings_is_capability_gated() {
        let backend = MockBackend::default_device();
        let (controller, handle, _sender) = start(backend);
        assert_eq!(
            controller.open_settings().await.unwrap_err(),
            ScannerError::OpenSettingsUnavailable
        );
        let _ = handle.shutdown().await;

        let backend = MockBackend::with(|s| s.can_open_settings = true);
        let (controller, handle, _sender) = start(backend);
        let snapshot = controller.open_settings().await.unwrap();
        assert!(snapshot.can_open_settings);
        let _ = handle.shutdown().await;
    }
}
