//! # 3D Camera
//!
//! Perspective camera stored as an eye position plus an orthonormal basis.
//! The chase camera controller writes the basis directly during free-look and
//! through [`Camera::look_from`] while following a target.

use crate::foundation::math::{utils, Mat4, Mat4Ext, Vec3};

/// Perspective camera
///
/// # Coordinate System
/// Right-handed, Y-up. `look` points from the scene toward the eye, so the
/// camera views along `-look`, matching the view-space convention of the
/// projection matrix.
#[derive(Debug, Clone)]
pub struct Camera {
    /// Eye position in world space
    pub position: Vec3,

    /// Camera right axis
    pub right: Vec3,

    /// Camera up axis
    pub up: Vec3,

    /// Camera backward axis (eye minus target, normalized)
    pub look: Vec3,

    /// Field of view angle in radians
    pub fov: f32,

    /// Aspect ratio (width / height)
    pub aspect: f32,

    /// Distance to near clipping plane
    pub near: f32,

    /// Distance to far clipping plane
    pub far: f32,
}

impl Camera {
    /// Create a new perspective camera looking down -Z
    ///
    /// # Arguments
    /// * `position` - Eye position in world space
    /// * `fov_degrees` - Vertical field of view in degrees
    /// * `aspect` - Viewport width / height
    /// * `near` - Near clipping plane (must be > 0)
    /// * `far` - Far clipping plane (must be > near)
    pub fn perspective(position: Vec3, fov_degrees: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self {
            position,
            right: Vec3::x(),
            up: Vec3::y(),
            look: Vec3::z(),
            fov: utils::deg_to_rad(fov_degrees),
            aspect,
            near,
            far,
        }
    }

    /// Move the eye without changing orientation
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        log::trace!("Camera position updated to: {:?}", position);
    }

    /// Replace the orientation basis
    pub fn set_basis(&mut self, right: Vec3, up: Vec3, look: Vec3) {
        self.right = right;
        self.up = up;
        self.look = look;
    }

    /// Orient the camera so it looks from its position toward `target`
    ///
    /// Returns false and keeps the previous basis when the eye sits on the
    /// target or looks straight along the world up axis.
    pub fn look_from(&mut self, target: Vec3) -> bool {
        let Some(look) = (self.position - target).try_normalize(f32::EPSILON) else {
            return false;
        };
        let Some(right) = Vec3::y().cross(&look).try_normalize(f32::EPSILON) else {
            return false;
        };
        let up = look.cross(&right);
        self.set_basis(right, up, look);
        true
    }

    /// Update camera aspect ratio for viewport changes
    ///
    /// Only logs when the change is significant (> 0.01) to reduce noise
    /// during interactive window resizes.
    pub fn set_aspect_ratio(&mut self, aspect: f32) {
        if (self.aspect - aspect).abs() > 0.01 {
            log::info!("Camera aspect ratio changed: {:.3} -> {:.3}", self.aspect, aspect);
        }
        self.aspect = aspect;
    }

    /// World-to-view matrix built from the basis and eye position
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::from_basis(self.position, self.right, self.up, self.look)
    }

    /// Perspective projection matrix
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective(self.fov, self.aspect, self.near, self.far)
    }

    /// Combined projection * view matrix
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::perspective(Vec3::new(0.0, 100.0, 200.0), 45.0, 16.0 / 9.0, 1.0, 10_000.0)
    }
}
