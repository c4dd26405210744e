//! Headless test harness for viewport sessions and chat.
//!
//! Provides a resource-tracking render surface, an asset fetcher whose
//! requests are resolved by hand, a scripted text generator and a
//! [`ViewerHarness`] tying them to a live [`ViewportSession`].

use std::cell::{Cell, RefCell};
use std::collections::{BTreeSet, VecDeque};
use std::rc::Rc;
use std::time::Duration;

use crate::ai::{PendingReply, ReplyResult, ReplySender, TextGenerator};
use crate::asset::fetch::{AssetResult, AssetSender};
use crate::asset::model::MaterialData;
use crate::asset::{AssetFetcher, ModelAsset, ModelSource, PendingAsset};
use crate::viewport::host::{HostSignals, Liveness};
use crate::viewport::mesh::MeshData;
use crate::viewport::session::{MountError, TickOutcome, ViewportConfig, ViewportSession};
use crate::viewport::surface::{
    FrameDescription, GeometryHandle, MaterialHandle, MountRegion, RenderSurface, SurfaceError,
};

// ── Tracking surface ──────────────────────────────────────────

/// Teardown-relevant calls, in the order the surface received them
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceEvent {
    Attach,
    /// Host state seen when the surface was disposed
    Dispose {
        frame_requested: bool,
        resize_subscribers: usize,
    },
    ReleaseGeometry(GeometryHandle),
    ReleaseMaterial(MaterialHandle),
    Detach,
}

/// Everything a [`TrackingSurface`] has done, shared with the test
#[derive(Debug, Default)]
pub struct SurfaceLedger {
    next_handle: u64,
    pub live_geometries: BTreeSet<GeometryHandle>,
    pub live_materials: BTreeSet<MaterialHandle>,
    pub geometry_uploads: usize,
    pub material_uploads: usize,
    pub geometry_releases: Vec<GeometryHandle>,
    pub material_releases: Vec<MaterialHandle>,
    /// Releases of handles that were not live
    pub bad_releases: usize,
    pub attached: bool,
    pub backing_live: bool,
    pub dispose_calls: usize,
    pub detach_calls: usize,
    pub backing_size: (u32, u32),
    pub resize_calls: Vec<(u32, u32)>,
    pub draw_count: usize,
    pub last_frame: Option<FrameDescription>,
    pub events: Vec<SurfaceEvent>,
    /// Fail the upload after this many successful geometry uploads
    pub fail_geometry_after: Option<usize>,
}

impl SurfaceLedger {
    /// No geometry, material or backing buffer is still held
    pub fn all_released(&self) -> bool {
        self.live_geometries.is_empty() && self.live_materials.is_empty() && !self.backing_live
    }

    /// Every release hit a live handle exactly once
    pub fn releases_unique(&self) -> bool {
        let g: BTreeSet<_> = self.geometry_releases.iter().collect();
        let m: BTreeSet<_> = self.material_releases.iter().collect();
        self.bad_releases == 0
            && g.len() == self.geometry_releases.len()
            && m.len() == self.material_releases.len()
    }
}

pub type SharedLedger = Rc<RefCell<SurfaceLedger>>;

/// Render surface double that records resource traffic instead of drawing
pub struct TrackingSurface {
    ledger: SharedLedger,
    host: Option<HostSignals>,
}

impl TrackingSurface {
    pub fn new(ledger: SharedLedger) -> Self {
        Self { ledger, host: None }
    }

    /// Also snapshot `host` when disposed
    pub fn observing(ledger: SharedLedger, host: HostSignals) -> Self {
        Self {
            ledger,
            host: Some(host),
        }
    }

    fn next_handle(&self) -> u64 {
        let mut l = self.ledger.borrow_mut();
        l.next_handle += 1;
        l.next_handle
    }
}

impl RenderSurface for TrackingSurface {
    fn attach(&mut self, region: MountRegion) -> Result<(), SurfaceError> {
        let mut l = self.ledger.borrow_mut();
        l.attached = true;
        l.backing_live = true;
        l.backing_size = (region.width, region.height);
        l.events.push(SurfaceEvent::Attach);
        Ok(())
    }

    fn is_attached(&self) -> bool {
        self.ledger.borrow().attached
    }

    fn detach(&mut self) {
        let mut l = self.ledger.borrow_mut();
        l.attached = false;
        l.detach_calls += 1;
        l.events.push(SurfaceEvent::Detach);
    }

    fn resize(&mut self, width: u32, height: u32) {
        let mut l = self.ledger.borrow_mut();
        l.backing_size = (width, height);
        l.resize_calls.push((width, height));
    }

    fn backing_size(&self) -> (u32, u32) {
        self.ledger.borrow().backing_size
    }

    fn upload_geometry(&mut self, _mesh: &MeshData) -> Result<GeometryHandle, SurfaceError> {
        {
            let l = self.ledger.borrow();
            if !l.attached {
                return Err(SurfaceError::Detached);
            }
            if l.fail_geometry_after.is_some_and(|n| l.geometry_uploads >= n) {
                return Err(SurfaceError::Upload("out of memory".into()));
            }
        }
        let handle = GeometryHandle(self.next_handle());
        let mut l = self.ledger.borrow_mut();
        l.geometry_uploads += 1;
        l.live_geometries.insert(handle);
        Ok(handle)
    }

    fn upload_material(&mut self, _material: &MaterialData) -> Result<MaterialHandle, SurfaceError> {
        if !self.ledger.borrow().attached {
            return Err(SurfaceError::Detached);
        }
        let handle = MaterialHandle(self.next_handle());
        let mut l = self.ledger.borrow_mut();
        l.material_uploads += 1;
        l.live_materials.insert(handle);
        Ok(handle)
    }

    fn release_geometry(&mut self, handle: GeometryHandle) {
        let mut l = self.ledger.borrow_mut();
        if !l.live_geometries.remove(&handle) {
            l.bad_releases += 1;
        }
        l.geometry_releases.push(handle);
        l.events.push(SurfaceEvent::ReleaseGeometry(handle));
    }

    fn release_material(&mut self, handle: MaterialHandle) {
        let mut l = self.ledger.borrow_mut();
        if !l.live_materials.remove(&handle) {
            l.bad_releases += 1;
        }
        l.material_releases.push(handle);
        l.events.push(SurfaceEvent::ReleaseMaterial(handle));
    }

    fn draw(&mut self, frame: &FrameDescription) {
        let mut l = self.ledger.borrow_mut();
        l.draw_count += 1;
        l.last_frame = Some(frame.clone());
    }

    fn dispose(&mut self) {
        let (frame_requested, resize_subscribers) = match &self.host {
            Some(host) => (host.pending_frame_count() > 0, host.resize_subscriber_count()),
            None => (false, 0),
        };
        let mut l = self.ledger.borrow_mut();
        l.backing_live = false;
        l.dispose_calls += 1;
        l.events.push(SurfaceEvent::Dispose {
            frame_requested,
            resize_subscribers,
        });
    }
}

// ── Manual fetcher ────────────────────────────────────────────

/// Fetcher whose requests stay open until the test resolves them
#[derive(Default)]
pub struct ManualFetcher {
    requests: RefCell<Vec<(ModelSource, AssetSender, Liveness)>>,
    fetch_count: Cell<usize>,
}

impl ManualFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fetch_count(&self) -> usize {
        self.fetch_count.get()
    }

    pub fn outstanding(&self) -> usize {
        self.requests.borrow().len()
    }

    pub fn requested_sources(&self) -> Vec<ModelSource> {
        self.requests.borrow().iter().map(|(s, _, _)| s.clone()).collect()
    }

    /// Deliver `result` to the oldest open request, ignoring liveness.
    /// Returns whether the receiving session still existed.
    pub fn resolve_next(&self, result: AssetResult) -> bool {
        let mut requests = self.requests.borrow_mut();
        if requests.is_empty() {
            return false;
        }
        let (_, tx, _) = requests.remove(0);
        tx.send(result)
    }

    /// Liveness of the oldest open request
    pub fn next_liveness(&self) -> Option<Liveness> {
        self.requests.borrow().first().map(|(_, _, l)| l.clone())
    }
}

impl AssetFetcher for ManualFetcher {
    fn fetch(&self, source: &ModelSource, liveness: Liveness) -> PendingAsset {
        let (tx, pending) = PendingAsset::channel();
        self.fetch_count.set(self.fetch_count.get() + 1);
        self.requests.borrow_mut().push((source.clone(), tx, liveness));
        pending
    }
}

// ── Scripted generator ────────────────────────────────────────

/// Text generator returning queued results; prompts are recorded.
/// With `hold` set, replies stay pending until [`ScriptedGenerator::release`].
#[derive(Default)]
pub struct ScriptedGenerator {
    replies: RefCell<VecDeque<ReplyResult>>,
    held: RefCell<Vec<ReplySender>>,
    pub prompts: RefCell<Vec<String>>,
    pub hold: bool,
}

impl ScriptedGenerator {
    pub fn new(replies: impl IntoIterator<Item = ReplyResult>) -> Self {
        Self {
            replies: RefCell::new(replies.into_iter().collect()),
            ..Self::default()
        }
    }

    pub fn holding() -> Self {
        Self {
            hold: true,
            ..Self::default()
        }
    }

    pub fn request_count(&self) -> usize {
        self.prompts.borrow().len()
    }

    /// Answer the oldest held request
    pub fn release(&self, result: ReplyResult) -> bool {
        let mut held = self.held.borrow_mut();
        if held.is_empty() {
            return false;
        }
        held.remove(0).send(result)
    }
}

impl TextGenerator for ScriptedGenerator {
    fn generate(&self, prompt: String) -> PendingReply {
        self.prompts.borrow_mut().push(prompt);
        if self.hold {
            let (tx, pending) = PendingReply::channel();
            self.held.borrow_mut().push(tx);
            return pending;
        }
        let result = self
            .replies
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Ok(String::new()));
        PendingReply::ready(result)
    }
}

// ── Viewer harness ────────────────────────────────────────────

/// One mounted session on a tracking surface with a manual fetcher
pub struct ViewerHarness {
    pub host: HostSignals,
    pub fetcher: ManualFetcher,
    pub ledger: SharedLedger,
    pub session: Option<ViewportSession<TrackingSurface>>,
}

impl ViewerHarness {
    /// Mount a standard (centered, auto-rotating) viewer
    pub fn mount(source: &str, width: u32, height: u32) -> Result<Self, MountError> {
        Self::mount_with(ViewportConfig::new(ModelSource::parse(source), true), width, height)
    }

    pub fn mount_with(config: ViewportConfig, width: u32, height: u32) -> Result<Self, MountError> {
        let host = HostSignals::new();
        let fetcher = ManualFetcher::new();
        let ledger = SharedLedger::default();
        let surface = TrackingSurface::observing(ledger.clone(), host.clone());
        let session = ViewportSession::mount(
            config,
            MountRegion::new(width, height),
            surface,
            &fetcher,
            &host,
        )?;
        Ok(Self {
            host,
            fetcher,
            ledger,
            session: Some(session),
        })
    }

    /// Live session; panics after [`ViewerHarness::unmount`]
    pub fn session(&mut self) -> &mut ViewportSession<TrackingSurface> {
        self.session.as_mut().expect("session already unmounted")
    }

    /// Resolve the outstanding fetch and run one tick so the result is applied
    pub fn load(&mut self, asset: ModelAsset) -> TickOutcome {
        self.fetcher.resolve_next(Ok(asset));
        self.tick(Duration::ZERO)
    }

    /// Tick the session if the host has a frame request for it
    pub fn tick(&mut self, dt: Duration) -> TickOutcome {
        let Some(session) = self.session.as_mut() else {
            return TickOutcome::Stopped;
        };
        if !self.host.take_frame_request(session.loop_id()) {
            return TickOutcome::Stopped;
        }
        session.tick(dt)
    }

    /// Run `n` ticks of `dt` each
    pub fn run_frames(&mut self, n: usize, dt: Duration) {
        for _ in 0..n {
            self.tick(dt);
        }
    }

    /// Dispose and drop the session
    pub fn unmount(&mut self) {
        if let Some(mut session) = self.session.take() {
            session.dispose();
        }
    }
}
