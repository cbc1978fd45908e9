//! # Cube-man Engine
//!
//! Gameplay core for a small 3D prototype: a cube-man character walks over a
//! generated terrain, collects power-ups, bumps into walls and is chased by a
//! smoothing camera. Drawing is left to the host; the engine produces a scene
//! graph and a camera every frame.
//!
//! ## Features
//!
//! - **Component Lifecycle**: named components, two-pass initialize/start flush, deferred removal
//! - **Collision**: layered AABB box and point-ray queries with single-axis correction
//! - **Chase Camera**: eased following, sprint snapping, free-fly mode
//! - **Assets**: JSON model and level records, keyframe animation clips
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use cubeman_engine::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut env = Environment::new(GameConfig::default());
//!     cubeman_engine::game::register_default_entities(&mut env)?;
//!
//!     env.load_models_json(&std::fs::read_to_string("assets/models.json")?)?;
//!     env.load_level_json(&std::fs::read_to_string("assets/level.json")?)?;
//!
//!     env.on_key_down(KeyCode::Up);
//!     env.on_update(1.0 / 60.0)?;
//!
//!     let view = env.render_view();
//!     println!("{} nodes to draw", view.scene.visible_nodes().len());
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

// Core engine modules
pub mod core;

pub mod foundation;
pub mod config;
pub mod input;
pub mod scene;
pub mod render;
pub mod animation;
pub mod assets;
pub mod physics;
pub mod ecs;
pub mod camera;
pub mod game;

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        foundation::{
            math::{Vec3, Mat4, Transform},
            time::Timer,
            collections::{ComponentId, NodeId},
        },
        ecs::{
            Component, Component3D, ComponentError, ComponentState, Context, Environment, EnvironmentError,
            FrameStatus, RenderView,
        },
        assets::{AssetError, AssetLibrary, LevelRecord, Model},
        physics::{CollisionHit, CollisionType, HitResult, Ray},
        scene::{SceneGraph, AABB},
        render::Camera,
        camera::{CameraController, CameraMode},
        input::{KeyCode, MouseButtons, MouseEvent},
        core::config::{Config, ConfigError, GameConfig},
    };
}
