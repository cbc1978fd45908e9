//! # Chase Camera Controller
//!
//! Two modes:
//!
//! - **Following**: every frame the eye eases toward an ideal point behind and
//!   above the target at a constant speed. When the target has been moving
//!   fast for several consecutive frames and the camera had already caught up,
//!   the eye snaps straight to the ideal point instead.
//! - **Free**: the follow step is skipped. Mouse drags with the primary button
//!   turn the camera and WASD/E/X fly it along its own axes.
//!
//! `Q` toggles between the two.
//!
//! The target is held as a [`NodeId`]; once the node is removed the handle
//! stops resolving and the controller unbinds itself.

use crate::core::config::CameraSettings;
use crate::foundation::collections::NodeId;
use crate::foundation::math::{utils, Quat, Unit, Vec3};
use crate::input::{KeyCode, MouseButtons, MouseEvent};
use crate::render::Camera;
use crate::scene::SceneGraph;

/// Camera mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraMode {
    /// Driven by mouse and keys only
    Free,
    /// Chasing the bound target
    Following,
}

/// What one follow step did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowOutcome {
    /// No target bound, or the target node is gone
    NoTarget,
    /// Free mode; nothing recomputed
    Skipped,
    /// Jumped straight to the ideal position
    Snapped,
    /// Moved one easing step toward the ideal position
    Eased,
    /// Already within the close-enough distance; not moved
    Settled,
}

/// Chase camera state machine
pub struct CameraController {
    camera: Camera,
    settings: CameraSettings,
    target: Option<NodeId>,
    mode: CameraMode,
    yaw: f32,
    pitch: f32,
    last_mouse: Option<(f32, f32)>,
    last_target_pos: Vec3,
    close_enough: bool,
    full_speed_frames: u32,
}

impl CameraController {
    /// Create a controller with a perspective camera at the configured start position
    pub fn new(settings: CameraSettings) -> Self {
        let camera = Camera::perspective(
            Vec3::from(settings.initial_position),
            settings.fov_degrees,
            16.0 / 9.0,
            settings.near,
            settings.far,
        );
        Self {
            camera,
            settings,
            target: None,
            mode: CameraMode::Following,
            yaw: 0.0,
            pitch: 0.0,
            last_mouse: None,
            last_target_pos: Vec3::zeros(),
            close_enough: false,
            full_speed_frames: 0,
        }
    }

    /// The camera handed to the renderer
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Current eye position
    pub fn position(&self) -> Vec3 {
        self.camera.position
    }

    /// Current mode
    pub fn mode(&self) -> CameraMode {
        self.mode
    }

    /// Accumulated yaw and pitch in radians
    pub fn angles(&self) -> (f32, f32) {
        (self.yaw, self.pitch)
    }

    /// Bound target node, if any
    pub fn target(&self) -> Option<NodeId> {
        self.target
    }

    /// Whether the last follow step ended within the close-enough distance
    pub fn is_close_enough(&self) -> bool {
        self.close_enough
    }

    /// Bind a target and place the eye at its world position
    ///
    /// Returns false, leaving the controller unbound, if the node does not exist.
    pub fn bind_target(&mut self, scene: &SceneGraph, node: NodeId) -> bool {
        let Some(position) = scene.world_position(node) else {
            log::warn!("Camera target {:?} does not exist", node);
            self.target = None;
            return false;
        };
        self.target = Some(node);
        self.last_target_pos = position;
        self.close_enough = false;
        self.full_speed_frames = 0;
        self.camera.set_position(position);
        log::info!("Camera bound to target at {:?}", position);
        true
    }

    /// Drop the target
    pub fn unbind(&mut self) {
        self.target = None;
    }

    /// Switch between free and following modes
    pub fn toggle_mode(&mut self) {
        self.mode = match self.mode {
            CameraMode::Free => {
                self.full_speed_frames = 0;
                self.close_enough = false;
                CameraMode::Following
            }
            CameraMode::Following => CameraMode::Free,
        };
        log::info!("Camera mode: {:?}", self.mode);
    }

    /// Remember the cursor position without turning
    pub fn mouse_over(&mut self, event: &MouseEvent) {
        self.last_mouse = Some((event.x, event.y));
    }

    /// Turn the camera by the cursor motion while only the primary button is held in free mode
    ///
    /// Returns true when the orientation changed.
    pub fn mouse_move(&mut self, event: &MouseEvent) -> bool {
        let (last_x, last_y) = self.last_mouse.unwrap_or((event.x, event.y));
        self.last_mouse = Some((event.x, event.y));

        if self.mode != CameraMode::Free || event.buttons != MouseButtons::LEFT {
            return false;
        }

        self.yaw = utils::wrap_angle(self.yaw - (event.x - last_x) * self.settings.angle_scale);
        self.pitch = utils::wrap_angle(self.pitch - (event.y - last_y) * self.settings.angle_scale);
        self.rebuild_basis();
        true
    }

    /// Handle a key press: `Q` toggles the mode, fly keys move the eye in free mode
    ///
    /// Returns true when the eye moved.
    pub fn key_down(&mut self, key: KeyCode) -> bool {
        let direction = match key {
            KeyCode::Q => {
                self.toggle_mode();
                return false;
            }
            KeyCode::W => Vec3::new(0.0, 0.0, -1.0),
            KeyCode::A => Vec3::new(-1.0, 0.0, 0.0),
            KeyCode::D => Vec3::new(1.0, 0.0, 0.0),
            KeyCode::S => Vec3::new(0.0, 0.0, 1.0),
            KeyCode::E => Vec3::new(0.0, 1.0, 0.0),
            KeyCode::X => Vec3::new(0.0, -1.0, 0.0),
            _ => return false,
        };
        if self.mode != CameraMode::Free {
            return false;
        }

        let step = direction * self.settings.move_scale;
        let offset = self.camera.right * step.x + self.camera.up * step.y + self.camera.look * step.z;
        self.camera.set_position(self.camera.position + offset);
        self.rebuild_basis();
        true
    }

    /// Update the projection for a new viewport size
    pub fn window_resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        #[allow(clippy::cast_precision_loss)]
        let aspect = width as f32 / height as f32;
        self.camera.set_aspect_ratio(aspect);
    }

    /// Run one follow step
    pub fn follow(&mut self, scene: &SceneGraph) -> FollowOutcome {
        if self.mode == CameraMode::Free {
            return FollowOutcome::Skipped;
        }
        let Some(node) = self.target else {
            return FollowOutcome::NoTarget;
        };
        let (Some(target_pos), Some(forward)) = (scene.world_position(node), scene.world_direction(node)) else {
            log::warn!("Camera target {:?} was removed; unbinding", node);
            self.target = None;
            return FollowOutcome::NoTarget;
        };

        let s = &self.settings;
        let look_at = target_pos + Vec3::new(0.0, s.target_offset, 0.0);
        let ideal = -forward * s.distance + look_at + Vec3::new(0.0, s.height, 0.0);

        if (target_pos - self.last_target_pos).norm() > s.max_target_movement {
            self.full_speed_frames += 1;
        } else {
            self.full_speed_frames = 0;
        }
        self.last_target_pos = target_pos;

        let outcome = if self.full_speed_frames > s.max_full_speed_frames && self.close_enough {
            self.camera.set_position(ideal);
            FollowOutcome::Snapped
        } else {
            let velocity = (ideal - self.camera.position)
                .try_normalize(f32::EPSILON)
                .map_or_else(Vec3::zeros, |direction| direction * s.follow_speed);
            let eased = self.camera.position + velocity;
            if (eased - ideal).norm() > s.close_enough {
                self.camera.set_position(eased);
                self.close_enough = false;
                FollowOutcome::Eased
            } else {
                self.close_enough = true;
                FollowOutcome::Settled
            }
        };

        self.camera.look_from(look_at);
        outcome
    }

    fn rebuild_basis(&mut self) {
        let world_up = Vec3::y();
        let look = Quat::from_axis_angle(&Vec3::y_axis(), self.yaw) * Vec3::z();
        let right = Unit::new_normalize(world_up.cross(&look));
        let up = (Quat::from_axis_angle(&right, self.pitch) * world_up).normalize();
        let look = right.cross(&up).normalize();
        self.camera.set_basis(right.into_inner(), up, look);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::constants::TAU;
    use approx::assert_relative_eq;

    fn scene_with_target(position: Vec3) -> (SceneGraph, NodeId) {
        let mut scene = SceneGraph::new();
        let node = scene.create_node("target");
        scene.add_child(scene.root(), node);
        scene.transform_mut(node).unwrap().position = position;
        (scene, node)
    }

    fn drag(camera: &mut CameraController, dx: f32, dy: f32) {
        camera.mouse_over(&MouseEvent::new(0.0, 0.0, MouseButtons::empty()));
        camera.mouse_move(&MouseEvent::new(dx, dy, MouseButtons::LEFT));
    }

    #[test]
    fn test_bind_snaps_to_target_position() {
        let (scene, node) = scene_with_target(Vec3::new(30.0, 0.0, -40.0));
        let mut camera = CameraController::new(CameraSettings::default());
        assert!(camera.bind_target(&scene, node));
        assert_relative_eq!(camera.position(), Vec3::new(30.0, 0.0, -40.0));
        assert_eq!(camera.mode(), CameraMode::Following);
    }

    #[test]
    fn test_follow_eases_at_constant_speed() {
        let (scene, node) = scene_with_target(Vec3::zeros());
        let mut camera = CameraController::new(CameraSettings::default());
        camera.bind_target(&scene, node);

        let before = camera.position();
        assert_eq!(camera.follow(&scene), FollowOutcome::Eased);
        assert_relative_eq!((camera.position() - before).norm(), 5.0, epsilon = 1e-4);
        assert!(!camera.is_close_enough());
    }

    #[test]
    fn test_follow_converges_behind_target() {
        let (scene, node) = scene_with_target(Vec3::zeros());
        let mut camera = CameraController::new(CameraSettings::default());
        camera.bind_target(&scene, node);

        let mut outcome = FollowOutcome::Eased;
        for _ in 0..200 {
            outcome = camera.follow(&scene);
            if outcome == FollowOutcome::Settled {
                break;
            }
        }
        assert_eq!(outcome, FollowOutcome::Settled);
        let ideal = Vec3::new(0.0, 220.0, -360.0);
        assert!((camera.position() - ideal).norm() <= 15.0 + 1e-3);
        assert!(camera.camera().look.z < 0.0);
    }

    #[test]
    fn test_sustained_sprint_snaps_after_convergence() {
        let (mut scene, node) = scene_with_target(Vec3::zeros());
        let settings = CameraSettings {
            close_enough: 1000.0,
            ..CameraSettings::default()
        };
        let mut camera = CameraController::new(settings);
        camera.bind_target(&scene, node);
        assert_eq!(camera.follow(&scene), FollowOutcome::Settled);

        let mut outcomes = Vec::new();
        for step in 1..=6 {
            #[allow(clippy::cast_precision_loss)]
            let z = 5.0 * step as f32;
            scene.transform_mut(node).unwrap().position.z = z;
            outcomes.push(camera.follow(&scene));
        }
        assert!(outcomes[..5].iter().all(|&o| o == FollowOutcome::Settled));
        assert_eq!(outcomes[5], FollowOutcome::Snapped);
        let ideal = Vec3::new(0.0, 220.0, 30.0 - 360.0);
        assert_relative_eq!(camera.position(), ideal, epsilon = 1e-3);
    }

    #[test]
    fn test_free_mode_skips_follow() {
        let (mut scene, node) = scene_with_target(Vec3::zeros());
        let mut camera = CameraController::new(CameraSettings::default());
        camera.bind_target(&scene, node);
        camera.key_down(KeyCode::Q);
        assert_eq!(camera.mode(), CameraMode::Free);

        let before = camera.position();
        scene.transform_mut(node).unwrap().position = Vec3::new(100.0, 0.0, 100.0);
        for _ in 0..10 {
            assert_eq!(camera.follow(&scene), FollowOutcome::Skipped);
        }
        assert_eq!(camera.position(), before);

        camera.key_down(KeyCode::Q);
        assert_eq!(camera.follow(&scene), FollowOutcome::Eased);
    }

    #[test]
    fn test_fly_keys_only_move_in_free_mode() {
        let mut camera = CameraController::new(CameraSettings::default());
        let start = camera.position();
        assert!(!camera.key_down(KeyCode::W));
        assert_eq!(camera.position(), start);

        camera.key_down(KeyCode::Q);
        assert!(camera.key_down(KeyCode::W));
        assert_relative_eq!(camera.position(), start + Vec3::new(0.0, 0.0, -5.0), epsilon = 1e-5);
        assert!(camera.key_down(KeyCode::E));
        assert_relative_eq!(camera.position().y, start.y + 5.0, epsilon = 1e-5);
    }

    #[test]
    fn test_drag_ignored_outside_free_mode_or_without_button() {
        let mut camera = CameraController::new(CameraSettings::default());
        drag(&mut camera, 100.0, 0.0);
        assert_eq!(camera.angles(), (0.0, 0.0));

        camera.toggle_mode();
        camera.mouse_over(&MouseEvent::new(0.0, 0.0, MouseButtons::empty()));
        assert!(!camera.mouse_move(&MouseEvent::new(50.0, 0.0, MouseButtons::RIGHT)));
        assert_eq!(camera.angles(), (0.0, 0.0));
    }

    #[test]
    fn test_drag_with_extra_buttons_held_is_ignored() {
        let mut camera = CameraController::new(CameraSettings::default());
        camera.toggle_mode();
        camera.mouse_over(&MouseEvent::new(0.0, 0.0, MouseButtons::empty()));
        assert!(!camera.mouse_move(&MouseEvent::new(50.0, 0.0, MouseButtons::LEFT | MouseButtons::RIGHT)));
        assert_eq!(camera.angles(), (0.0, 0.0));

        assert!(camera.mouse_move(&MouseEvent::new(80.0, 0.0, MouseButtons::LEFT)));
        assert!(camera.angles().0 != 0.0);
    }

    #[test]
    fn test_drag_angles_stay_wrapped() {
        let mut camera = CameraController::new(CameraSettings::default());
        camera.toggle_mode();
        for i in 0..500 {
            let sign = if i % 3 == 0 { -1.0 } else { 1.0 };
            drag(&mut camera, sign * 997.0, sign * 613.0);
            let (yaw, pitch) = camera.angles();
            assert!((-TAU..=TAU).contains(&yaw));
            assert!((-TAU..=TAU).contains(&pitch));
        }
    }

    #[test]
    fn test_drag_rebuilds_orthonormal_basis() {
        let mut camera = CameraController::new(CameraSettings::default());
        camera.toggle_mode();
        drag(&mut camera, 120.0, -40.0);
        let c = camera.camera();
        assert_relative_eq!(c.right.norm(), 1.0, epsilon = 1e-5);
        assert_relative_eq!(c.look.norm(), 1.0, epsilon = 1e-5);
        assert_relative_eq!(c.right.dot(&c.up), 0.0, epsilon = 1e-5);
        assert_relative_eq!(c.right.dot(&c.look), 0.0, epsilon = 1e-5);
        assert_relative_eq!(c.up.dot(&c.look), 0.0, epsilon = 1e-5);
    }

    #[test]
    fn test_removed_target_unbinds() {
        let (mut scene, node) = scene_with_target(Vec3::zeros());
        let mut camera = CameraController::new(CameraSettings::default());
        camera.bind_target(&scene, node);
        scene.remove(node);
        assert_eq!(camera.follow(&scene), FollowOutcome::NoTarget);
        assert!(camera.target().is_none());
    }

    #[test]
    fn test_resize_updates_aspect_only() {
        let mut camera = CameraController::new(CameraSettings::default());
        let position = camera.position();
        camera.window_resize(1000, 500);
        assert_relative_eq!(camera.camera().aspect, 2.0);
        assert_eq!(camera.position(), position);
        camera.window_resize(0, 500);
        assert_relative_eq!(camera.camera().aspect, 2.0);
    }
}
