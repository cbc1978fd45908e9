//! Component registry and shared per-level state

use std::any::Any;
use std::collections::{HashMap, VecDeque};

use rand::rngs::StdRng;
use rand::SeedableRng;

use super::component::{Component, ComponentState};
use super::context::Context;
use super::environment::EnvironmentError;
use crate::assets::{AssetLibrary, LevelRecord};
use crate::core::config::GameConfig;
use crate::foundation::collections::{ComponentId, SlotMap};
use crate::physics::{CollisionHit, CollisionManager};
use crate::scene::SceneGraph;

pub(crate) struct ComponentSlot {
    pub(crate) name: String,
    pub(crate) state: ComponentState,
    /// `None` while the component's own hook is running
    pub(crate) behavior: Option<Box<dyn Component>>,
}

/// Input listener lists
#[derive(Default)]
pub(crate) struct Listeners {
    pub(crate) keyboard: Vec<ComponentId>,
    pub(crate) mouse: Vec<ComponentId>,
    pub(crate) resize: Vec<ComponentId>,
}

impl Listeners {
    fn forget(&mut self, id: ComponentId) {
        self.keyboard.retain(|&l| l != id);
        self.mouse.retain(|&l| l != id);
        self.resize.retain(|&l| l != id);
    }
}

/// Everything components can reach through a [`Context`]
///
/// Owns the component slots, the name table, the scene graph, the collision
/// registry, the loaded assets and the level-seeded random generator.
pub struct World {
    pub(crate) scene: SceneGraph,
    pub(crate) collisions: CollisionManager,
    pub(crate) assets: AssetLibrary,
    pub(crate) level: Option<LevelRecord>,
    pub(crate) rng: StdRng,
    pub(crate) config: GameConfig,
    pub(crate) viewport: (u32, u32),
    pub(crate) listeners: Listeners,
    pub(crate) pending: Vec<ComponentId>,
    pub(crate) hits: VecDeque<(ComponentId, CollisionHit)>,
    pub(crate) removals: VecDeque<String>,
    slots: SlotMap<ComponentId, ComponentSlot>,
    names: HashMap<String, ComponentId>,
    order: Vec<ComponentId>,
}

impl World {
    /// Create an empty world
    pub fn new(config: GameConfig) -> Self {
        Self {
            scene: SceneGraph::new(),
            collisions: CollisionManager::new(),
            assets: AssetLibrary::new(),
            level: None,
            rng: StdRng::seed_from_u64(0),
            config,
            viewport: (0, 0),
            listeners: Listeners::default(),
            pending: Vec::new(),
            hits: VecDeque::new(),
            removals: VecDeque::new(),
            slots: SlotMap::with_key(),
            names: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Add a component under `name` and queue it for the next flush
    ///
    /// A duplicate name is rejected; the rejected component's node is removed
    /// from the scene so nothing of it remains.
    pub fn insert(&mut self, name: &str, component: Box<dyn Component>) -> Result<ComponentId, EnvironmentError> {
        if self.names.contains_key(name) {
            if let Some(node) = component.node() {
                self.scene.remove(node);
            }
            log::error!("Component name '{}' is already registered", name);
            return Err(EnvironmentError::DuplicateName(name.to_string()));
        }

        let id = self.slots.insert(ComponentSlot {
            name: name.to_string(),
            state: ComponentState::Uninitialized,
            behavior: Some(component),
        });
        self.names.insert(name.to_string(), id);
        self.order.push(id);
        self.pending.push(id);
        log::debug!("Registered component '{}'", name);
        Ok(id)
    }

    /// Look up a component id by name
    pub fn find(&self, name: &str) -> Option<ComponentId> {
        self.names.get(name).copied()
    }

    /// Name of a component
    pub fn name_of(&self, id: ComponentId) -> Option<&str> {
        self.slots.get(id).map(|slot| slot.name.as_str())
    }

    /// Lifecycle state of a component
    pub fn state(&self, id: ComponentId) -> Option<ComponentState> {
        self.slots.get(id).map(|slot| slot.state)
    }

    pub(crate) fn set_state(&mut self, id: ComponentId, state: ComponentState) {
        if let Some(slot) = self.slots.get_mut(id) {
            log::trace!("Component '{}' {:?} -> {:?}", slot.name, slot.state, state);
            slot.state = state;
        }
    }

    /// Borrow a component as its concrete type
    ///
    /// `None` if missing, of another type, or currently running a hook.
    pub fn get<T: Component + Any>(&self, name: &str) -> Option<&T> {
        let id = self.find(name)?;
        self.slots.get(id)?.behavior.as_deref()?.as_any().downcast_ref::<T>()
    }

    /// Mutably borrow a component as its concrete type
    pub fn get_mut<T: Component + Any>(&mut self, name: &str) -> Option<&mut T> {
        let id = self.find(name)?;
        self.slots.get_mut(id)?.behavior.as_deref_mut()?.as_any_mut().downcast_mut::<T>()
    }

    /// Borrow a component as a trait object
    pub fn component(&self, id: ComponentId) -> Option<&dyn Component> {
        self.slots.get(id)?.behavior.as_deref()
    }

    /// Component ids in registration order
    pub fn order(&self) -> &[ComponentId] {
        &self.order
    }

    /// Number of registered components
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether no components are registered
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Scene graph
    pub fn scene(&self) -> &SceneGraph {
        &self.scene
    }

    /// Mutable scene graph
    pub fn scene_mut(&mut self) -> &mut SceneGraph {
        &mut self.scene
    }

    /// Collision registry
    pub fn collisions(&self) -> &CollisionManager {
        &self.collisions
    }

    /// Run `f` on a component's behavior with a context over the rest of the world
    ///
    /// The behavior is taken out of its slot for the duration of the call, so
    /// the component cannot be reached through the context while its own hook
    /// runs.
    pub(crate) fn with_component<R>(
        &mut self,
        id: ComponentId,
        f: impl FnOnce(&mut dyn Component, &mut Context<'_>) -> R,
    ) -> Option<R> {
        let mut behavior = self.slots.get_mut(id)?.behavior.take()?;
        let result = {
            let mut ctx = Context::new(id, self);
            f(&mut *behavior, &mut ctx)
        };
        match self.slots.get_mut(id) {
            Some(slot) => slot.behavior = Some(behavior),
            None => log::warn!("Component slot vanished while its hook was running"),
        }
        Some(result)
    }

    /// Destroy a component once and drop it from every registry
    ///
    /// Returns false if the id is not registered.
    pub(crate) fn destroy(&mut self, id: ComponentId) -> bool {
        let Some(previous) = self.state(id) else {
            return false;
        };
        self.set_state(id, ComponentState::Destroyed);
        if previous != ComponentState::Uninitialized {
            self.with_component(id, |component, ctx| component.destroy(ctx));
        }
        self.purge(id);
        true
    }

    fn purge(&mut self, id: ComponentId) {
        let Some(slot) = self.slots.remove(id) else {
            return;
        };
        if let Some(node) = slot.behavior.as_ref().and_then(|behavior| behavior.node()) {
            self.scene.remove(node);
        }
        self.collisions.remove_component(&slot.name);
        self.collisions.remove_owner(id);
        self.listeners.forget(id);
        self.names.remove(&slot.name);
        self.order.retain(|&o| o != id);
        self.pending.retain(|&p| p != id);
        self.hits.retain(|(target, _)| *target != id);
        log::debug!("Removed component '{}'", slot.name);
    }
}
