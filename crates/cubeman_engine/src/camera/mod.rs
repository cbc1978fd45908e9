//! Chase camera
//!
//! The environment owns one [`CameraController`]. It follows a target node
//! with constant-speed easing, snaps during sustained sprints, and can be
//! switched into a free-fly mode driven purely by input.

pub mod controller;

pub use controller::{CameraController, CameraMode, FollowOutcome};
