//! Collectible power-ups and the manager that scatters them

use rand::Rng;

use crate::animation::{AnimationMixer, LoopMode};
use crate::core::config::PowerUpSettings;
use crate::ecs::{Component, Component3D, ComponentError, Context};
use crate::foundation::collections::NodeId;
use crate::physics::{CollisionHit, CollisionType};
use crate::scene::SceneGraph;

/// A collectible item; removes itself when touched
pub struct PowerUp {
    body: Component3D,
    settings: PowerUpSettings,
    mixer: Option<AnimationMixer>,
}

impl PowerUp {
    /// Create the power-up's node; the model is built in `start()`
    pub fn new(scene: &mut SceneGraph, name: &str, settings: PowerUpSettings) -> Self {
        Self {
            body: Component3D::new(scene, name),
            settings,
            mixer: None,
        }
    }
}

impl Component for PowerUp {
    fn start(&mut self, ctx: &mut Context<'_>) -> Result<(), ComponentError> {
        let model = ctx.instantiate_model(&self.settings.model)?;
        let idle = match self.settings.idle_clip.as_deref().map(|name| model.clip(name)).transpose() {
            Ok(idle) => idle,
            Err(error) => {
                ctx.scene_mut().remove(model.root);
                return Err(error.into());
            }
        };

        let node = self.body.node();
        let scene = ctx.scene_mut();
        scene.add_child(node, model.root);
        self.body.attach(scene);

        let mut mixer = AnimationMixer::new(model.root);
        if let Some(clip) = idle {
            let delay = ctx.rng().gen::<f32>();
            let action = mixer.clip_action(ctx.scene(), clip);
            mixer.set_time_scale(action, self.settings.time_scale);
            mixer.set_start_delay(action, delay);
            mixer.set_loop(action, LoopMode::Repeat);
            mixer.play(action);
        }
        self.mixer = Some(mixer);

        ctx.register_collidable(node, model.bounds, CollisionType::ITEM);
        Ok(())
    }

    fn update(&mut self, ctx: &mut Context<'_>, delta: f32) {
        if let Some(mixer) = &mut self.mixer {
            mixer.update(ctx.scene_mut(), delta);
        }
    }

    fn on_hit(&mut self, ctx: &mut Context<'_>, other: &CollisionHit) {
        let name = ctx.name().to_string();
        log::debug!("Power-up '{}' collected by '{}'", name, other.name);
        ctx.remove_later(&name);
    }

    fn node(&self) -> Option<NodeId> {
        Some(self.body.node())
    }
}

/// Creates `item_count` power-ups for the level and scatters them
#[derive(Default)]
pub struct PowerUpManager {
    items: Vec<String>,
}

impl PowerUpManager {
    /// Create an empty manager
    pub fn new() -> Self {
        Self::default()
    }

    /// Names of power-ups not yet collected
    pub fn items(&self) -> &[String] {
        &self.items
    }

    /// Number of power-ups not yet collected
    pub fn remaining(&self) -> usize {
        self.items.len()
    }
}

impl Component for PowerUpManager {
    fn initialize(&mut self, ctx: &mut Context<'_>) -> Result<(), ComponentError> {
        let count = ctx.level().ok_or(ComponentError::LevelNotLoaded)?.item_count;
        let settings = ctx.config().power_ups.clone();

        for index in 0..count {
            let name = format!("powerup-{index}");
            let item = PowerUp::new(ctx.scene_mut(), &name, settings.clone());
            match ctx.register(&name, Box::new(item)) {
                Ok(_) => self.items.push(name),
                Err(error) => log::warn!("Skipping power-up: {}", error),
            }
        }
        log::info!("Created {} power-ups", self.items.len());
        Ok(())
    }

    fn start(&mut self, ctx: &mut Context<'_>) -> Result<(), ComponentError> {
        let (spread, offset) = (ctx.config().power_ups.spread, ctx.config().power_ups.offset);
        for name in &self.items {
            let x = ctx.rng().gen::<f32>() * spread - offset;
            let z = ctx.rng().gen::<f32>() * spread - offset;
            let Some(node) = ctx.node_of(name) else {
                continue;
            };
            if let Some(transform) = ctx.scene_mut().transform_mut(node) {
                transform.position.x = x;
                transform.position.z = z;
            }
        }
        Ok(())
    }

    fn update(&mut self, ctx: &mut Context<'_>, _delta: f32) {
        self.items.retain(|name| ctx.find(name).is_some());
    }
}
