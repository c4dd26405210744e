//! Rendering surface abstraction.
//!
//! A surface owns every GPU-side resource of one viewport: its backing
//! buffer, shader programs and the geometry/material objects uploaded for
//! the loaded model. The GL implementation lives in the binary; tests use a
//! resource-tracking double from [`crate::harness`].

use glam::{Mat4, Vec3};

use super::mesh::MeshData;
use super::scene::Light;
use crate::asset::model::MaterialData;

/// Opaque handle to uploaded vertex/index buffers
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GeometryHandle(pub u64);

/// Opaque handle to an uploaded material (uniforms + optional texture)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MaterialHandle(pub u64);

#[derive(Debug, thiserror::Error)]
pub enum SurfaceError {
    #[error("surface is not attached")]
    Detached,
    #[error("GPU upload failed: {0}")]
    Upload(String),
}

/// Pixel dimensions of the region a surface is mounted into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MountRegion {
    pub width: u32,
    pub height: u32,
}

impl MountRegion {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Both dimensions are non-zero
    pub fn is_laid_out(&self) -> bool {
        self.width > 0 && self.height > 0
    }
}

/// One draw of a mesh with a material at a world transform
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawItem {
    pub world: Mat4,
    pub geometry: GeometryHandle,
    pub material: MaterialHandle,
}

/// Everything a surface needs to draw one frame
#[derive(Debug, Clone, PartialEq)]
pub struct FrameDescription {
    pub view: Mat4,
    pub projection: Mat4,
    pub camera_position: Vec3,
    pub background: Option<[f32; 3]>,
    pub lights: Vec<Light>,
    pub items: Vec<DrawItem>,
}

pub trait RenderSurface {
    /// Allocate backing resources and attach output to the mount region
    fn attach(&mut self, region: MountRegion) -> Result<(), SurfaceError>;
    fn is_attached(&self) -> bool;
    /// Remove the output from the mount region
    fn detach(&mut self);

    /// Resize the backing buffer (pixels)
    fn resize(&mut self, width: u32, height: u32);
    fn backing_size(&self) -> (u32, u32);

    fn upload_geometry(&mut self, mesh: &MeshData) -> Result<GeometryHandle, SurfaceError>;
    fn upload_material(&mut self, material: &MaterialData) -> Result<MaterialHandle, SurfaceError>;
    fn release_geometry(&mut self, handle: GeometryHandle);
    fn release_material(&mut self, handle: MaterialHandle);

    fn draw(&mut self, frame: &FrameDescription);

    /// Release backing buffer and programs. Geometry and materials are
    /// released separately by their owner.
    fn dispose(&mut self);
}
