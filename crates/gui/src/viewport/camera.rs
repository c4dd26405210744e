use glam::{Mat4, Vec3};

/// Perspective camera looking at a target point
#[derive(Debug, Clone)]
pub struct PerspectiveCamera {
    /// Vertical field of view (degrees)
    pub fov: f32,
    /// Width / height of the surface
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    /// Camera position in world space
    pub position: Vec3,
    /// Point the camera looks at
    pub target: Vec3,
    projection: Mat4,
}

impl PerspectiveCamera {
    pub fn new(fov: f32, aspect: f32, near: f32, far: f32) -> Self {
        let mut camera = Self {
            fov,
            aspect,
            near,
            far,
            position: Vec3::new(0.0, 0.0, 5.0),
            target: Vec3::ZERO,
            projection: Mat4::IDENTITY,
        };
        camera.update_projection_matrix();
        camera
    }

    /// Recompute the projection matrix from fov/aspect/near/far.
    /// Must be called after changing any of them.
    pub fn update_projection_matrix(&mut self) {
        self.projection =
            Mat4::perspective_rh_gl(self.fov.to_radians(), self.aspect, self.near, self.far);
    }

    pub fn set_aspect(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.aspect = width as f32 / height as f32;
        self.update_projection_matrix();
    }

    /// Projection matrix (camera -> clip)
    pub fn projection_matrix(&self) -> Mat4 {
        self.projection
    }

    /// View matrix (world -> camera)
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, Vec3::Y)
    }

    /// Combined view-projection matrix
    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view_matrix()
    }
}

impl Default for PerspectiveCamera {
    fn default() -> Self {
        Self::new(45.0, 1.0, 0.1, 1000.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_aspect_updates_projection() {
        let mut cam = PerspectiveCamera::default();
        let before = cam.projection_matrix();
        cam.set_aspect(800, 400);
        assert!((cam.aspect - 2.0).abs() < 1e-6);
        assert_ne!(before, cam.projection_matrix());
        assert_eq!(
            cam.projection_matrix(),
            Mat4::perspective_rh_gl(45f32.to_radians(), 2.0, 0.1, 1000.0)
        );
    }

    #[test]
    fn test_zero_size_keeps_aspect() {
        let mut cam = PerspectiveCamera::default();
        cam.set_aspect(0, 300);
        assert_eq!(cam.aspect, 1.0);
    }

    #[test]
    fn test_origin_projects_to_center() {
        let cam = PerspectiveCamera::default();
        let clip = cam.view_projection() * glam::Vec4::new(0.0, 0.0, 0.0, 1.0);
        let ndc = clip.truncate() / clip.w;
        assert!(ndc.x.abs() < 1e-6 && ndc.y.abs() < 1e-6);
    }
}
