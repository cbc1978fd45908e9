//! Per-call view of the world handed to component hooks

use std::any::Any;

use rand::rngs::StdRng;

use super::component::{Component, ComponentState};
use super::environment::EnvironmentError;
use super::world::World;
use crate::assets::{AssetError, AssetLibrary, LevelRecord, Model};
use crate::core::config::GameConfig;
use crate::foundation::collections::{ComponentId, NodeId};
use crate::physics::{Collidable, CollisionHit, CollisionManager, CollisionType, HitResult, Ray};
use crate::scene::{SceneGraph, AABB};

/// Access to the world from inside a component hook
///
/// Registrations are deferred to the next flush. Hits and removals requested
/// here are queued and delivered right after the current hook returns.
pub struct Context<'w> {
    id: ComponentId,
    world: &'w mut World,
}

impl<'w> Context<'w> {
    pub(crate) fn new(id: ComponentId, world: &'w mut World) -> Self {
        Self { id, world }
    }

    /// Id of the component whose hook is running
    pub fn id(&self) -> ComponentId {
        self.id
    }

    /// Name of the component whose hook is running
    pub fn name(&self) -> &str {
        self.world.name_of(self.id).unwrap_or_default()
    }

    /// Scene graph
    pub fn scene(&self) -> &SceneGraph {
        &self.world.scene
    }

    /// Mutable scene graph
    pub fn scene_mut(&mut self) -> &mut SceneGraph {
        &mut self.world.scene
    }

    /// Collision registry
    pub fn collisions(&self) -> &CollisionManager {
        &self.world.collisions
    }

    /// Loaded model records
    pub fn assets(&self) -> &AssetLibrary {
        &self.world.assets
    }

    /// Instantiate a model record into detached scene nodes
    pub fn instantiate_model(&mut self, name: &str) -> Result<Model, AssetError> {
        Model::instantiate(&self.world.assets, name, &mut self.world.scene)
    }

    /// Loaded level, if delivered
    pub fn level(&self) -> Option<&LevelRecord> {
        self.world.level.as_ref()
    }

    /// Random generator seeded from the level
    pub fn rng(&mut self) -> &mut StdRng {
        &mut self.world.rng
    }

    /// Game configuration
    pub fn config(&self) -> &GameConfig {
        &self.world.config
    }

    /// Current viewport size
    pub fn viewport(&self) -> (u32, u32) {
        self.world.viewport
    }

    /// Register another component; it is initialized at the next flush
    pub fn register(&mut self, name: &str, component: Box<dyn Component>) -> Result<ComponentId, EnvironmentError> {
        self.world.insert(name, component)
    }

    /// Look up a component by name
    pub fn find(&self, name: &str) -> Option<ComponentId> {
        self.world.find(name)
    }

    /// Lifecycle state of a component by name
    pub fn state_of(&self, name: &str) -> Option<ComponentState> {
        self.world.state(self.world.find(name)?)
    }

    /// Borrow another component as its concrete type
    pub fn get<T: Component + Any>(&self, name: &str) -> Option<&T> {
        self.world.get::<T>(name)
    }

    /// Scene node owned by another component
    pub fn node_of(&self, name: &str) -> Option<NodeId> {
        self.world.component(self.world.find(name)?)?.node()
    }

    /// Receive key events
    pub fn listen_keyboard(&mut self) {
        push_unique(&mut self.world.listeners.keyboard, self.id);
    }

    /// Receive mouse events
    pub fn listen_mouse(&mut self) {
        push_unique(&mut self.world.listeners.mouse, self.id);
    }

    /// Receive viewport resizes
    pub fn listen_resize(&mut self) {
        push_unique(&mut self.world.listeners.resize, self.id);
    }

    /// Register a collidable owned by this component
    pub fn register_collidable(&mut self, node: NodeId, bounds: AABB, kind: CollisionType) {
        let name = self.name().to_string();
        self.world
            .collisions
            .register_collidable(Collidable::new(self.id, name, node, bounds, kind));
    }

    /// Box query that ignores this component's own collidables
    pub fn check_hit_box(&self, query: &AABB, mask: CollisionType) -> HitResult {
        self.world
            .collisions
            .check_hit_box_excluding(&self.world.scene, query, mask, Some(self.id))
    }

    /// Ray probe that ignores this component's own collidables
    pub fn check_hit_ray(&self, ray: &Ray, mask: CollisionType) -> HitResult {
        self.world
            .collisions
            .check_hit_ray_excluding(&self.world.scene, ray, mask, Some(self.id))
    }

    /// Have the next collision refresh recapture this component's boxes
    pub fn mark_dirty(&mut self) {
        self.world.collisions.mark_dirty(self.id);
    }

    /// Queue an `on_hit` notification for `target`
    pub fn post_hit(&mut self, target: ComponentId, hit: CollisionHit) {
        self.world.hits.push_back((target, hit));
    }

    /// Queue removal of a component by name
    pub fn remove_later(&mut self, name: &str) {
        self.world.removals.push_back(name.to_string());
    }
}

fn push_unique(list: &mut Vec<ComponentId>, id: ComponentId) {
    if !list.contains(&id) {
        list.push(id);
    }
}
