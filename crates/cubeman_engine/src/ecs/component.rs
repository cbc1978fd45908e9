//! Component trait and lifecycle state

use std::any::Any;

use super::context::Context;
use crate::assets::AssetError;
use crate::foundation::collections::NodeId;
use crate::foundation::math::Vec3;
use crate::input::{KeyCode, MouseEvent};
use crate::physics::CollisionHit;
use crate::scene::{SceneGraph, AABB};

/// Lifecycle state of a registered component
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentState {
    /// Registered, waiting for the next flush
    Uninitialized,
    /// `initialize()` succeeded; waiting for `start()`
    Initializing,
    /// Receives updates, input and hits
    Started,
    /// `destroy()` has run
    Destroyed,
}

/// Errors a component may return from `initialize()` or `start()`
#[derive(thiserror::Error, Debug)]
pub enum ComponentError {
    /// A model or clip lookup failed
    #[error("asset error: {0}")]
    Asset(#[from] AssetError),

    /// Another component this one relies on is not registered
    #[error("missing dependency: {0}")]
    MissingDependency(String),

    /// Level data was required but has not been delivered
    #[error("level data not loaded")]
    LevelNotLoaded,
}

/// Upcast helper so components can be downcast to their concrete type
pub trait AsAny {
    /// Borrow as `Any`
    fn as_any(&self) -> &dyn Any;
    /// Mutably borrow as `Any`
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// A named unit of behavior driven by the environment
///
/// Every hook has a no-op default. The [`Context`] passed to each hook gives
/// access to the scene, collisions, assets and the other components.
pub trait Component: AsAny {
    /// Called once, before any component of the same flush is started
    fn initialize(&mut self, _ctx: &mut Context<'_>) -> Result<(), ComponentError> {
        Ok(())
    }

    /// Called once after every component of the flush has initialized
    fn start(&mut self, _ctx: &mut Context<'_>) -> Result<(), ComponentError> {
        Ok(())
    }

    /// Called every ready frame after `start()` succeeded
    fn update(&mut self, _ctx: &mut Context<'_>, _delta: f32) {}

    /// Called at most once when the component is removed
    fn destroy(&mut self, _ctx: &mut Context<'_>) {}

    /// Another collidable reported contact with this one
    fn on_hit(&mut self, _ctx: &mut Context<'_>, _other: &CollisionHit) {}

    /// Key pressed (keyboard listeners only)
    fn on_key_down(&mut self, _ctx: &mut Context<'_>, _key: KeyCode) {}

    /// Key released (keyboard listeners only)
    fn on_key_up(&mut self, _ctx: &mut Context<'_>, _key: KeyCode) {}

    /// Cursor entered or hovered (mouse listeners only)
    fn on_mouse_over(&mut self, _ctx: &mut Context<'_>, _event: &MouseEvent) {}

    /// Cursor moved (mouse listeners only)
    fn on_mouse_move(&mut self, _ctx: &mut Context<'_>, _event: &MouseEvent) {}

    /// Viewport resized (resize listeners only)
    fn on_window_resize(&mut self, _ctx: &mut Context<'_>, _width: u32, _height: u32) {}

    /// Scene node owned by this component; removed with it
    fn node(&self) -> Option<NodeId> {
        None
    }
}

/// Scene-node ownership shared by every component with a 3D presence
///
/// The node is created detached when the component is constructed and linked
/// under the scene root by [`Component3D::attach`], normally from `start()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Component3D {
    node: NodeId,
}

impl Component3D {
    /// Create the component's node
    pub fn new(scene: &mut SceneGraph, name: &str) -> Self {
        Self { node: scene.create_node(name) }
    }

    /// Take ownership of an existing node, e.g. a model root
    pub fn from_node(node: NodeId) -> Self {
        Self { node }
    }

    /// The owned node
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Link the node under the scene root
    pub fn attach(&self, scene: &mut SceneGraph) -> bool {
        let root = scene.root();
        scene.add_child(root, self.node)
    }

    /// World position of the node
    pub fn position(&self, scene: &SceneGraph) -> Option<Vec3> {
        scene.world_position(self.node)
    }

    /// Set the node's local position
    pub fn set_position(&self, scene: &mut SceneGraph, position: Vec3) {
        if let Some(transform) = scene.transform_mut(self.node) {
            transform.position = position;
        }
    }

    /// `local` bounds placed by the node's current world transform
    pub fn world_box(&self, scene: &SceneGraph, local: &AABB) -> Option<AABB> {
        scene.world_matrix(self.node).map(|matrix| local.transformed(&matrix))
    }
}
