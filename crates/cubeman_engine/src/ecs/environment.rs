//! # Environment
//!
//! Orchestrates one running level: owns the [`World`], the chase camera and
//! the readiness gate, and is the only thing the host talks to.
//!
//! ## Frame order
//!
//! Once the gate is open, every [`Environment::on_update`] call:
//!
//! 1. flushes the lifecycle: initializes every pending component, then starts
//!    every one that initialized, repeating while hooks register more;
//! 2. binds the camera to its configured target if it is not bound yet;
//! 3. updates every started component in registration order, delivering
//!    queued hits and removals after each call;
//! 4. refreshes dirty collision boxes;
//! 5. runs the camera follow step.
//!
//! The host then reads [`Environment::render_view`] and draws it.

use rand::rngs::StdRng;
use rand::SeedableRng;

use super::component::{Component, ComponentError, ComponentState};
use super::readiness::{GateStatus, ReadinessGate};
use super::world::World;
use crate::assets::{AssetError, AssetLibrary, LevelRecord};
use crate::camera::CameraController;
use crate::config::ConfigError;
use crate::core::config::GameConfig;
use crate::foundation::collections::ComponentId;
use crate::input::{KeyCode, MouseEvent};
use crate::physics::{CollisionManager, CollisionType};
use crate::render::Camera;
use crate::scene::{SceneGraph, AABB};

/// Environment errors
#[derive(thiserror::Error, Debug)]
pub enum EnvironmentError {
    /// A component with this name is already registered
    #[error("component name '{0}' is already registered")]
    DuplicateName(String),

    /// Level or model data did not arrive within the configured timeout
    #[error("load data did not arrive within {waited:.1}s")]
    LoadTimeout {
        /// Seconds waited
        waited: f32,
    },

    /// Loading level or model data failed
    #[error("asset error: {0}")]
    Asset(#[from] AssetError),

    /// Configuration rejected
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Lifecycle hook that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecyclePhase {
    /// `initialize()`
    Initialize,
    /// `start()`
    Start,
}

/// A component that was dropped because a lifecycle hook failed
#[derive(Debug)]
pub struct ComponentFailure {
    /// Component name
    pub name: String,
    /// Failing hook
    pub phase: LifecyclePhase,
    /// Error returned by the hook
    pub error: ComponentError,
}

/// What a call to [`Environment::on_update`] did
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrameStatus {
    /// The gate is closed; nothing ran
    Waiting {
        /// Seconds waited so far
        waited: f32,
    },
    /// A full frame ran
    Ran {
        /// Number of frames run so far, this one included
        frame: u64,
    },
}

/// What the external renderer draws after a frame
pub struct RenderView<'a> {
    /// Camera to draw from
    pub camera: &'a Camera,
    /// Scene to draw
    pub scene: &'a SceneGraph,
    /// Collision boxes as of the last refresh, for debug overlays
    pub collision_boxes: Vec<(String, CollisionType, AABB)>,
}

/// Orchestrator of one level
pub struct Environment {
    world: World,
    camera: CameraController,
    gate: ReadinessGate,
    failures: Vec<ComponentFailure>,
    frame: u64,
}

impl Environment {
    /// Create an environment waiting for level and model data
    pub fn new(config: GameConfig) -> Self {
        let camera = CameraController::new(config.camera.clone());
        let gate = ReadinessGate::new(config.environment.load_timeout_secs);
        Self {
            world: World::new(config),
            camera,
            gate,
            failures: Vec::new(),
            frame: 0,
        }
    }

    /// Create an environment after validating the configuration
    pub fn with_validated_config(config: GameConfig) -> Result<Self, EnvironmentError> {
        config.validate()?;
        Ok(Self::new(config))
    }

    // ---- registry ----

    /// Register a component; it is initialized and started at the next ready frame
    pub fn register(&mut self, name: &str, component: Box<dyn Component>) -> Result<ComponentId, EnvironmentError> {
        self.world.insert(name, component)
    }

    /// Remove a component, calling `destroy()` once
    ///
    /// Returns false, doing nothing, if the name is not registered.
    pub fn remove(&mut self, name: &str) -> bool {
        let removed = self.remove_now(name);
        self.drain_queues();
        removed
    }

    /// Look up a component id
    pub fn find(&self, name: &str) -> Option<ComponentId> {
        self.world.find(name)
    }

    /// Lifecycle state of a component
    pub fn state(&self, name: &str) -> Option<ComponentState> {
        self.world.state(self.world.find(name)?)
    }

    /// Borrow a component as its concrete type
    pub fn get<T: Component + std::any::Any>(&self, name: &str) -> Option<&T> {
        self.world.get::<T>(name)
    }

    /// Mutably borrow a component as its concrete type
    pub fn get_mut<T: Component + std::any::Any>(&mut self, name: &str) -> Option<&mut T> {
        self.world.get_mut::<T>(name)
    }

    /// Registered component names in registration order
    pub fn component_names(&self) -> Vec<&str> {
        self.world.order().iter().filter_map(|&id| self.world.name_of(id)).collect()
    }

    /// Components dropped because `initialize()` or `start()` failed
    pub fn failures(&self) -> &[ComponentFailure] {
        &self.failures
    }

    // ---- loading ----

    /// Level data arrived: reseed the random generator and mark the level flag
    pub fn on_level_loaded(&mut self, level: LevelRecord) {
        log::info!(
            "Level loaded: seed {}, {}x{} terrain, {} items",
            level.seed,
            level.terrain.rows,
            level.terrain.columns,
            level.item_count
        );
        self.world.rng = StdRng::seed_from_u64(level.seed);
        self.world.level = Some(level);
        self.gate.mark_level_loaded();
    }

    /// Model data arrived: store the library and mark the models flag
    pub fn on_models_loaded(&mut self, assets: AssetLibrary) {
        log::info!("Models loaded: {} records", assets.len());
        self.world.assets = assets;
        self.gate.mark_models_loaded();
    }

    /// Parse level JSON and deliver it
    pub fn load_level_json(&mut self, json: &str) -> Result<(), EnvironmentError> {
        self.on_level_loaded(LevelRecord::from_json(json)?);
        Ok(())
    }

    /// Parse model JSON and deliver it
    pub fn load_models_json(&mut self, json: &str) -> Result<(), EnvironmentError> {
        self.on_models_loaded(AssetLibrary::from_json(json)?);
        Ok(())
    }

    /// Whether both level and model data have arrived
    pub fn is_ready(&self) -> bool {
        self.gate.is_open()
    }

    // ---- frame ----

    /// Run one frame
    ///
    /// While the gate is closed this only accounts waiting time, and fails
    /// with [`EnvironmentError::LoadTimeout`] once the configured limit passes.
    pub fn on_update(&mut self, delta: f32) -> Result<FrameStatus, EnvironmentError> {
        match self.gate.tick(delta) {
            GateStatus::Open => {}
            GateStatus::Waiting { waited } => return Ok(FrameStatus::Waiting { waited }),
            GateStatus::TimedOut { waited } => {
                log::error!("Gave up waiting for load data after {:.1}s", waited);
                return Err(EnvironmentError::LoadTimeout { waited });
            }
        }

        if self.frame == 0 {
            let (width, height) = self.world.viewport;
            self.camera.window_resize(width, height);
        }

        self.flush_lifecycle();
        self.bind_camera_target();
        self.update_components(delta);
        self.world.collisions.refresh(&self.world.scene);
        self.camera.follow(&self.world.scene);

        self.frame += 1;
        Ok(FrameStatus::Ran { frame: self.frame })
    }

    fn flush_lifecycle(&mut self) {
        while !self.world.pending.is_empty() {
            let mut initialized = Vec::new();
            while !self.world.pending.is_empty() {
                let batch = std::mem::take(&mut self.world.pending);
                for id in batch {
                    if self.world.state(id) != Some(ComponentState::Uninitialized) {
                        continue;
                    }
                    self.world.set_state(id, ComponentState::Initializing);
                    match self.world.with_component(id, |component, ctx| component.initialize(ctx)) {
                        Some(Ok(())) => initialized.push(id),
                        Some(Err(error)) => self.fail(id, LifecyclePhase::Initialize, error),
                        None => {}
                    }
                    self.drain_queues();
                }
            }

            for id in initialized {
                if self.world.state(id) != Some(ComponentState::Initializing) {
                    continue;
                }
                match self.world.with_component(id, |component, ctx| component.start(ctx)) {
                    Some(Ok(())) => self.world.set_state(id, ComponentState::Started),
                    Some(Err(error)) => self.fail(id, LifecyclePhase::Start, error),
                    None => {}
                }
                self.drain_queues();
            }
        }
    }

    fn fail(&mut self, id: ComponentId, phase: LifecyclePhase, error: ComponentError) {
        let name = self.world.name_of(id).unwrap_or_default().to_string();
        log::error!("Component '{}' failed to {:?}: {}", name, phase, error);
        self.world.destroy(id);
        self.failures.push(ComponentFailure { name, phase, error });
    }

    fn bind_camera_target(&mut self) {
        if self.camera.target().is_some() {
            return;
        }
        let Some(name) = self.world.config.environment.camera_target.as_deref() else {
            return;
        };
        let Some(id) = self.world.find(name) else {
            return;
        };
        if self.world.state(id) != Some(ComponentState::Started) {
            return;
        }
        if let Some(node) = self.world.component(id).and_then(|component| component.node()) {
            self.camera.bind_target(&self.world.scene, node);
        }
    }

    fn update_components(&mut self, delta: f32) {
        let order = self.world.order().to_vec();
        for id in order {
            if self.world.state(id) != Some(ComponentState::Started) {
                continue;
            }
            self.world.with_component(id, |component, ctx| component.update(ctx, delta));
            self.drain_queues();
        }
    }

    fn drain_queues(&mut self) {
        loop {
            if let Some((target, hit)) = self.world.hits.pop_front() {
                if self.world.state(target) == Some(ComponentState::Started) {
                    self.world.with_component(target, |component, ctx| component.on_hit(ctx, &hit));
                }
                continue;
            }
            if let Some(name) = self.world.removals.pop_front() {
                self.remove_now(&name);
                continue;
            }
            break;
        }
    }

    fn remove_now(&mut self, name: &str) -> bool {
        match self.world.find(name) {
            Some(id) => self.world.destroy(id),
            None => false,
        }
    }

    // ---- input ----

    /// Mouse hovered the view
    pub fn on_mouse_over(&mut self, event: &MouseEvent) {
        if !self.gate.is_open() {
            return;
        }
        self.camera.mouse_over(event);
        self.dispatch(Listener::Mouse, |component, ctx| component.on_mouse_over(ctx, event));
    }

    /// Mouse moved over the view
    pub fn on_mouse_move(&mut self, event: &MouseEvent) {
        if !self.gate.is_open() {
            return;
        }
        self.camera.mouse_move(event);
        self.dispatch(Listener::Mouse, |component, ctx| component.on_mouse_move(ctx, event));
    }

    /// Key pressed
    pub fn on_key_down(&mut self, key: KeyCode) {
        if !self.gate.is_open() {
            return;
        }
        self.camera.key_down(key);
        self.dispatch(Listener::Keyboard, |component, ctx| component.on_key_down(ctx, key));
    }

    /// Key released
    pub fn on_key_up(&mut self, key: KeyCode) {
        if !self.gate.is_open() {
            return;
        }
        self.dispatch(Listener::Keyboard, |component, ctx| component.on_key_up(ctx, key));
    }

    /// Viewport resized; the size is kept even while the gate is closed
    pub fn on_window_resize(&mut self, width: u32, height: u32) {
        self.world.viewport = (width, height);
        if !self.gate.is_open() {
            return;
        }
        self.camera.window_resize(width, height);
        self.dispatch(Listener::Resize, |component, ctx| component.on_window_resize(ctx, width, height));
    }

    fn dispatch(&mut self, kind: Listener, f: impl Fn(&mut dyn Component, &mut super::Context<'_>)) {
        let listeners = match kind {
            Listener::Keyboard => self.world.listeners.keyboard.clone(),
            Listener::Mouse => self.world.listeners.mouse.clone(),
            Listener::Resize => self.world.listeners.resize.clone(),
        };
        for id in listeners {
            if self.world.state(id) == Some(ComponentState::Started) {
                self.world.with_component(id, &f);
                self.drain_queues();
            }
        }
    }

    // ---- accessors ----

    /// Scene graph
    pub fn scene(&self) -> &SceneGraph {
        self.world.scene()
    }

    /// Mutable scene graph, for constructing components before registering them
    pub fn scene_mut(&mut self) -> &mut SceneGraph {
        self.world.scene_mut()
    }

    /// Collision registry
    pub fn collisions(&self) -> &CollisionManager {
        self.world.collisions()
    }

    /// Chase camera
    pub fn camera(&self) -> &CameraController {
        &self.camera
    }

    /// Mutable chase camera
    pub fn camera_mut(&mut self) -> &mut CameraController {
        &mut self.camera
    }

    /// Game configuration
    pub fn config(&self) -> &GameConfig {
        &self.world.config
    }

    /// Last viewport size reported by the host
    pub fn viewport(&self) -> (u32, u32) {
        self.world.viewport
    }

    /// Frames run since the gate opened
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Camera, scene and debug boxes for the renderer
    pub fn render_view(&self) -> RenderView<'_> {
        RenderView {
            camera: self.camera.camera(),
            scene: &self.world.scene,
            collision_boxes: self.world.collisions.debug_boxes(),
        }
    }
}

#[derive(Clone, Copy)]
enum Listener {
    Keyboard,
    Mouse,
    Resize,
}
