//! Lifecycle of one mounted model viewer: mount, asynchronous load,
//! per-frame update, resize and teardown.
//!
//! A session exclusively owns its surface and every resource uploaded to
//! it. Teardown runs exactly once, either through [`ViewportSession::dispose`]
//! or on drop, and releases resources in a fixed order:
//!
//! 1. stop the render loop (cancel frame requests, clear liveness)
//! 2. unsubscribe from resize notifications
//! 3. dispose the interaction controller
//! 4. dispose the surface's backing resources
//! 5. detach the model and release all of its geometry and materials
//! 6. detach the surface output from the mount region

use std::time::Duration;

use super::animation::AnimationDriver;
use super::camera::PerspectiveCamera;
use super::controls::{ControlInput, ControlSettings, OrbitControls};
use super::host::{FrameClock, HostSignals, Liveness, SubscriptionId};
use super::scene::{self, AttachedModel, Light, SceneGraph, SceneNode};
use super::surface::{FrameDescription, MountRegion, RenderSurface, SurfaceError};
use crate::asset::{AssetError, AssetFetcher, ModelAsset, ModelSource, PendingAsset};

/// `#f8f9fa`
pub const DEFAULT_BACKGROUND: [f32; 3] = [0.973, 0.976, 0.980];

/// Uniform scale applied to every loaded model
pub const DEFAULT_MODEL_SCALE: f32 = 1.5;

#[derive(Debug, Clone, PartialEq)]
pub struct ViewportConfig {
    pub source: ModelSource,
    pub auto_rotate: bool,
    /// Move the bounding-box center to the origin
    pub center_model: bool,
    pub model_scale: f32,
    pub lights: Vec<Light>,
    /// Clear color; `None` draws over whatever the page painted
    pub background: Option<[f32; 3]>,
    pub controls: ControlSettings,
}

impl ViewportConfig {
    pub fn new(source: ModelSource, auto_rotate: bool) -> Self {
        Self {
            source,
            auto_rotate,
            center_model: true,
            model_scale: DEFAULT_MODEL_SCALE,
            lights: scene::standard_lights(),
            background: Some(DEFAULT_BACKGROUND),
            controls: ControlSettings::default(),
        }
    }

    /// Landing-page preset: authored origin kept, ambient light only
    pub fn hero(source: ModelSource) -> Self {
        Self {
            center_model: false,
            lights: scene::hero_lights(),
            background: None,
            ..Self::new(source, false)
        }
    }

    pub fn with_controls(mut self, controls: ControlSettings) -> Self {
        self.controls = controls;
        self
    }

    /// Two configs with equal keys can share a session
    pub fn same_session(&self, other: &ViewportConfig) -> bool {
        self.source == other.source && self.auto_rotate == other.auto_rotate
    }
}

#[derive(Debug, thiserror::Error)]
pub enum MountError {
    #[error("mount region is not laid out yet ({width}x{height})")]
    NotLaidOut { width: u32, height: u32 },
    #[error(transparent)]
    Surface(#[from] SurfaceError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStatus {
    Pending,
    Loaded,
    Failed,
    /// Completion arrived after teardown began
    Discarded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Drawn,
    Stopped,
}

pub struct ViewportSession<S: RenderSurface> {
    config: ViewportConfig,
    surface: S,
    region: MountRegion,
    camera: PerspectiveCamera,
    controls: OrbitControls,
    scene: SceneGraph,
    animation: Option<AnimationDriver>,
    pending: Option<PendingAsset>,
    status: LoadStatus,
    host: HostSignals,
    loop_id: SubscriptionId,
    resize_sub: Option<SubscriptionId>,
    alive: Liveness,
    clock: FrameClock,
    disposed: bool,
}

impl<S: RenderSurface> ViewportSession<S> {
    /// Mount into `region`, issue the single asset fetch and request the first tick.
    ///
    /// Returns `MountError::NotLaidOut` for a zero-sized region; the caller
    /// retries once layout has happened.
    pub fn mount(
        config: ViewportConfig,
        region: MountRegion,
        mut surface: S,
        fetcher: &dyn AssetFetcher,
        host: &HostSignals,
    ) -> Result<Self, MountError> {
        if !region.is_laid_out() {
            return Err(MountError::NotLaidOut {
                width: region.width,
                height: region.height,
            });
        }

        surface.attach(region)?;
        surface.resize(region.width, region.height);

        let mut camera = PerspectiveCamera::default();
        camera.set_aspect(region.width, region.height);

        let mut controls = OrbitControls::new(config.controls.clone(), config.auto_rotate);
        controls.set_element_height(region.height);

        let scene = SceneGraph::new(config.lights.clone(), config.background);

        let alive = Liveness::new();
        let pending = fetcher.fetch(&config.source, alive.clone());
        tracing::debug!("Viewport mounted for {} ({}x{})", config.source, region.width, region.height);

        let loop_id = host.allocate_id();
        let resize_sub = host.subscribe_resize();
        host.request_frame(loop_id);

        Ok(Self {
            config,
            surface,
            region,
            camera,
            controls,
            scene,
            animation: None,
            pending: Some(pending),
            status: LoadStatus::Pending,
            host: host.clone(),
            loop_id,
            resize_sub: Some(resize_sub),
            alive,
            clock: FrameClock::new(),
            disposed: false,
        })
    }

    // ── Accessors ────────────────────────────────────────────

    pub fn config(&self) -> &ViewportConfig {
        &self.config
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn camera(&self) -> &PerspectiveCamera {
        &self.camera
    }

    pub fn scene(&self) -> &SceneGraph {
        &self.scene
    }

    pub fn animation(&self) -> Option<&AnimationDriver> {
        self.animation.as_ref()
    }

    pub fn status(&self) -> LoadStatus {
        self.status
    }

    pub fn region(&self) -> MountRegion {
        self.region
    }

    pub fn loop_id(&self) -> SubscriptionId {
        self.loop_id
    }

    pub fn resize_subscription(&self) -> Option<SubscriptionId> {
        self.resize_sub
    }

    pub fn is_alive(&self) -> bool {
        !self.disposed && self.alive.is_alive()
    }

    pub fn controls_disposed(&self) -> bool {
        self.controls.is_disposed()
    }

    pub fn is_loading(&self) -> bool {
        self.status == LoadStatus::Pending
    }

    // ── Render loop ──────────────────────────────────────────

    /// Tick using wall-clock time since the previous tick
    pub fn tick_now(&mut self) -> TickOutcome {
        let dt = self.clock.delta();
        self.tick(dt)
    }

    /// One render-loop iteration. A disposed session does nothing.
    pub fn tick(&mut self, dt: Duration) -> TickOutcome {
        if !self.is_alive() {
            return TickOutcome::Stopped;
        }

        self.poll_load();

        if let (Some(driver), Some(model)) = (&mut self.animation, self.scene.model_mut()) {
            driver.advance(dt, &mut model.transforms);
        }

        self.controls.update(&mut self.camera, dt);

        let frame = FrameDescription {
            view: self.camera.view_matrix(),
            projection: self.camera.projection_matrix(),
            camera_position: self.camera.position,
            background: self.scene.background,
            lights: self.scene.lights().to_vec(),
            items: self.scene.draw_list(),
        };
        self.surface.draw(&frame);

        self.host.request_frame(self.loop_id);
        TickOutcome::Drawn
    }

    /// Check the outstanding fetch and apply its result if it has arrived
    pub fn poll_load(&mut self) {
        let Some(pending) = self.pending.as_mut() else {
            return;
        };
        if let Some(result) = pending.try_take() {
            self.pending = None;
            self.complete_load(result);
        }
    }

    /// Continuation of the asset fetch. Ignored once teardown has begun.
    pub fn complete_load(&mut self, result: Result<ModelAsset, AssetError>) {
        if !self.is_alive() {
            self.status = LoadStatus::Discarded;
            tracing::debug!("Ignoring late load result for {}", self.config.source);
            return;
        }
        if self.status != LoadStatus::Pending {
            tracing::warn!("Unexpected second load result for {}", self.config.source);
            return;
        }

        let outcome = match result {
            Ok(asset) => self.attach_asset(&asset),
            Err(e) => Err(e.to_string()),
        };

        match outcome {
            Ok(()) => {
                self.status = LoadStatus::Loaded;
                tracing::info!("Loaded model {}", self.config.source);
            }
            Err(e) => {
                self.status = LoadStatus::Failed;
                tracing::error!("Failed to load model {}: {e}", self.config.source);
            }
        }
    }

    fn attach_asset(&mut self, asset: &ModelAsset) -> Result<(), String> {
        let wrapper = scene::normalization(
            &asset.bounds(),
            self.config.model_scale,
            self.config.center_model,
        );
        let model = upload_model(&mut self.surface, asset, wrapper).map_err(|e| e.to_string())?;

        if let Some(old) = self.scene.attach(model) {
            release_model(&mut self.surface, &old);
        }
        self.animation = AnimationDriver::play_first(&asset.clips);
        if asset.clips.len() > 1 {
            tracing::debug!(
                "Model {} has {} clips; playing the first only",
                self.config.source,
                asset.clips.len()
            );
        }
        Ok(())
    }

    // ── Host events ──────────────────────────────────────────

    /// Apply new mount-region dimensions synchronously
    pub fn handle_resize(&mut self, region: MountRegion) {
        if !self.is_alive() || !region.is_laid_out() {
            return;
        }
        self.region = region;
        self.camera.set_aspect(region.width, region.height);
        self.controls.set_element_height(region.height);
        self.surface.resize(region.width, region.height);
    }

    pub fn handle_input(&mut self, input: ControlInput) {
        if self.is_alive() {
            self.controls.handle_input(&self.camera, input);
        }
    }

    // ── Teardown ─────────────────────────────────────────────

    /// Release everything this session owns. Safe to call more than once.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;

        self.alive.kill();
        self.host.cancel_frame(self.loop_id);
        self.pending = None;

        if let Some(sub) = self.resize_sub.take() {
            self.host.unsubscribe_resize(sub);
        }

        self.controls.dispose();
        self.surface.dispose();

        self.animation = None;
        if let Some(model) = self.scene.detach() {
            release_model(&mut self.surface, &model);
        }

        if self.surface.is_attached() {
            self.surface.detach();
        }
        tracing::debug!("Viewport for {} disposed", self.config.source);
    }
}

impl<S: RenderSurface> Drop for ViewportSession<S> {
    fn drop(&mut self) {
        self.dispose();
    }
}

/// Upload the meshes and materials of every node in the scene. Nodes the
/// roots never reach stay empty. On failure, whatever was already uploaded
/// is released before returning the error.
fn upload_model<S: RenderSurface>(
    surface: &mut S,
    asset: &ModelAsset,
    wrapper: crate::asset::model::NodeTransform,
) -> Result<AttachedModel, SurfaceError> {
    let mut geometries = vec![None; asset.meshes.len()];
    let mut materials = vec![None; asset.materials.len()];

    let reachable = asset.reachable_nodes();

    let result: Result<Vec<SceneNode>, SurfaceError> = (|| {
        let mut nodes = Vec::with_capacity(asset.nodes.len());
        for (node, &reached) in asset.nodes.iter().zip(&reachable) {
            let mut parts = Vec::with_capacity(node.primitives.len());
            let primitives = if reached { node.primitives.as_slice() } else { &[] };
            for prim in primitives {
                let (Some(mesh), Some(material)) =
                    (asset.meshes.get(prim.mesh), asset.materials.get(prim.material))
                else {
                    continue;
                };
                let g = match geometries[prim.mesh] {
                    Some(g) => g,
                    None => *geometries[prim.mesh].insert(surface.upload_geometry(mesh)?),
                };
                let m = match materials[prim.material] {
                    Some(m) => m,
                    None => *materials[prim.material].insert(surface.upload_material(material)?),
                };
                parts.push((g, m));
            }
            nodes.push(SceneNode {
                children: node.children.clone(),
                parts,
            });
        }
        Ok(nodes)
    })();

    match result {
        Ok(nodes) => Ok(AttachedModel {
            wrapper,
            nodes,
            roots: asset.roots.clone(),
            transforms: asset.rest_transforms(),
        }),
        Err(e) => {
            for g in geometries.into_iter().flatten() {
                surface.release_geometry(g);
            }
            for m in materials.into_iter().flatten() {
                surface.release_material(m);
            }
            Err(e)
        }
    }
}

fn release_model<S: RenderSurface>(surface: &mut S, model: &AttachedModel) {
    let (geometries, materials) = model.reachable_resources();
    for g in geometries {
        surface.release_geometry(g);
    }
    for m in materials {
        surface.release_material(m);
    }
}
