// Library crate: exposes testable modules for integration tests.
// Egui panels and the GL surface stay in the binary crate.

pub mod ai;
pub mod asset;
pub mod embed;
pub mod fixtures;
pub mod harness;
pub mod state;

/// Renderer-independent viewport core: camera, controls, scene graph,
/// animation and the session lifecycle.
pub mod viewport {
    pub mod animation;
    pub mod camera;
    pub mod controls;
    pub mod host;
    pub mod mesh;
    pub mod scene;
    pub mod session;
    pub mod surface;
}
