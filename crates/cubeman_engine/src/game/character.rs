//! # Character
//!
//! The player-controlled cube-man. Arrow keys drive it, space swings an
//! attack. Movement is tested against the collision registry before it is
//! committed:
//!
//! 1. the tentative box is the current world box moved by this frame's
//!    displacement;
//! 2. a hit on an enemy or item notifies both sides and never blocks;
//! 3. a hit on a wall blocks the move unless the character is heading away
//!    from the wall;
//! 4. a committed move flags the character's collision box for refresh.

use std::sync::Arc;

use crate::animation::{ActionId, AnimationClip, AnimationMixer, LoopMode};
use crate::assets::{AssetError, Model};
use crate::core::config::CharacterSettings;
use crate::ecs::{Component, Component3D, ComponentError, Context};
use crate::foundation::collections::NodeId;
use crate::foundation::math::{Quat, Vec3};
use crate::input::KeyCode;
use crate::physics::{CollisionHit, CollisionType};
use crate::scene::{SceneGraph, AABB};

struct Animations {
    mixer: AnimationMixer,
    walk: Option<ActionId>,
    attack: Option<ActionId>,
}

/// Player character component
pub struct Character {
    body: Component3D,
    settings: CharacterSettings,
    bounds: Option<AABB>,
    animations: Option<Animations>,
    move_speed: f32,
    turn_rate: f32,
    attack_ready: bool,
    attacking: bool,
    items_collected: u32,
    blocked_moves: u32,
}

impl Character {
    /// Create the character's node; the model is built in `start()`
    pub fn new(scene: &mut SceneGraph, settings: CharacterSettings) -> Self {
        Self {
            body: Component3D::new(scene, "character"),
            settings,
            bounds: None,
            animations: None,
            move_speed: 0.0,
            turn_rate: 0.0,
            attack_ready: false,
            attacking: false,
            items_collected: 0,
            blocked_moves: 0,
        }
    }

    /// Items picked up so far; enemy contacts are not counted
    pub fn items_collected(&self) -> u32 {
        self.items_collected
    }

    /// Moves discarded because a wall was in the way
    pub fn blocked_moves(&self) -> u32 {
        self.blocked_moves
    }

    /// Whether an attack clip is playing
    pub fn is_attacking(&self) -> bool {
        self.attacking
    }

    /// Current signed move speed
    pub fn move_speed(&self) -> f32 {
        self.move_speed
    }

    /// World position of the character
    pub fn position(&self, scene: &SceneGraph) -> Option<Vec3> {
        self.body.position(scene)
    }

    fn walk(&mut self) {
        if let Some(Animations { mixer, walk: Some(walk), .. }) = &mut self.animations {
            if !mixer.is_running(*walk) {
                mixer.play(*walk);
            }
        }
    }

    fn stop_walking(&mut self) {
        if let Some(Animations { mixer, walk: Some(walk), .. }) = &mut self.animations {
            mixer.stop(*walk);
        }
    }

    fn turn(&mut self, ctx: &mut Context<'_>) {
        if self.turn_rate == 0.0 {
            return;
        }
        if let Some(transform) = ctx.scene_mut().transform_mut(self.body.node()) {
            transform.rotation = transform.rotation * Quat::from_axis_angle(&Vec3::y_axis(), self.turn_rate);
        }
        self.walk();
    }

    fn advance(&mut self, ctx: &mut Context<'_>) {
        if self.move_speed == 0.0 {
            return;
        }
        let Some(bounds) = self.bounds else {
            return;
        };
        let node = self.body.node();
        let (Some(forward), Some(current)) = (
            ctx.scene().world_direction(node),
            self.body.world_box(ctx.scene(), &bounds),
        ) else {
            return;
        };

        let displacement = forward * self.move_speed;
        let tentative = current.translated(displacement);

        let soft = ctx.check_hit_box(&tentative, CollisionType::SOFT);
        if let Some(other) = soft.object {
            let me = CollisionHit {
                owner: ctx.id(),
                name: ctx.name().to_string(),
                kind: CollisionType::CHARACTER,
                bounds: tentative,
            };
            ctx.post_hit(other.owner, me);
            self.on_hit(ctx, &other);
        }

        let wall = ctx.check_hit_box(&tentative, CollisionType::WALL);
        let commit = match wall.object {
            None => true,
            Some(other) => {
                let heading = displacement.try_normalize(f32::EPSILON).unwrap_or_else(Vec3::zeros);
                let to_wall = (other.bounds.center() - current.center())
                    .try_normalize(f32::EPSILON)
                    .unwrap_or_else(Vec3::zeros);
                heading.dot(&to_wall) < 0.0
            }
        };

        if commit {
            if let Some(transform) = ctx.scene_mut().transform_mut(node) {
                transform.position += displacement;
            }
            ctx.mark_dirty();
        } else {
            self.blocked_moves += 1;
            log::trace!("Character move blocked by wall");
        }
        self.walk();
    }

    fn attack(&mut self) {
        let Some(Animations { mixer, attack: Some(attack), .. }) = &mut self.animations else {
            self.attack_ready = false;
            return;
        };
        if self.attack_ready && !self.attacking {
            mixer.set_loop(*attack, LoopMode::Once);
            mixer.set_time_scale(*attack, self.settings.attack_time_scale);
            mixer.reset(*attack);
            mixer.play(*attack);
            self.attacking = true;
            self.attack_ready = false;
        } else if self.attacking && !mixer.is_running(*attack) {
            self.attacking = false;
        }
    }
}

impl Component for Character {
    fn initialize(&mut self, ctx: &mut Context<'_>) -> Result<(), ComponentError> {
        ctx.listen_keyboard();
        Ok(())
    }

    fn start(&mut self, ctx: &mut Context<'_>) -> Result<(), ComponentError> {
        let model = ctx.instantiate_model(&self.settings.model)?;
        let clips = load_clips(&model, &self.settings);
        let (idle, walk, attack) = match clips {
            Ok(clips) => clips,
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
            let action = mixer.clip_action(ctx.scene(), clip);
            mixer.set_loop(action, LoopMode::Repeat);
            mixer.play(action);
        }
        let walk = walk.map(|clip| {
            let action = mixer.clip_action(ctx.scene(), clip);
            mixer.set_time_scale(action, self.settings.walk_time_scale);
            action
        });
        let attack = attack.map(|clip| mixer.clip_action(ctx.scene(), clip));
        self.animations = Some(Animations { mixer, walk, attack });

        ctx.register_collidable(node, model.bounds, CollisionType::CHARACTER);
        self.bounds = Some(model.bounds);
        log::info!("Character ready with bounds {:?}", model.bounds);
        Ok(())
    }

    fn update(&mut self, ctx: &mut Context<'_>, delta: f32) {
        if let Some(animations) = &mut self.animations {
            animations.mixer.update(ctx.scene_mut(), delta);
        }
        self.turn(ctx);
        self.advance(ctx);
        self.attack();
    }

    fn on_hit(&mut self, _ctx: &mut Context<'_>, other: &CollisionHit) {
        if other.kind.contains(CollisionType::ITEM) {
            self.items_collected += 1;
        }
        log::debug!("Character touched '{}' ({:?})", other.name, other.kind);
    }

    fn on_key_down(&mut self, _ctx: &mut Context<'_>, key: KeyCode) {
        match key {
            KeyCode::Up => self.move_speed = self.settings.speed,
            KeyCode::Down => self.move_speed = -self.settings.speed,
            KeyCode::Left => self.turn_rate = self.settings.rotate_speed,
            KeyCode::Right => self.turn_rate = -self.settings.rotate_speed,
            KeyCode::Space if !self.attacking => self.attack_ready = true,
            _ => {}
        }
    }

    fn on_key_up(&mut self, _ctx: &mut Context<'_>, key: KeyCode) {
        match key {
            KeyCode::Up | KeyCode::Down => self.move_speed = 0.0,
            KeyCode::Left | KeyCode::Right => self.turn_rate = 0.0,
            _ => return,
        }
        self.stop_walking();
    }

    fn node(&self) -> Option<NodeId> {
        Some(self.body.node())
    }
}

type Clip = Option<Arc<AnimationClip>>;

/// Idle, walk and attack clips; a configured name that is missing is an error
fn load_clips(model: &Model, settings: &CharacterSettings) -> Result<(Clip, Clip, Clip), AssetError> {
    let lookup = |name: &Option<String>| name.as_deref().map(|name| model.clip(name)).transpose();
    Ok((
        lookup(&settings.idle_clip)?,
        lookup(&settings.walk_clip)?,
        lookup(&settings.attack_clip)?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::GameConfig;
    use crate::ecs::{ComponentState, Environment};
    use approx::assert_relative_eq;

    const MODELS: &str = r#"[
        {
            "name": "character",
            "meshes": [ { "name": "body", "scale": [5, 5, 5] } ],
            "animationClips": [
                { "name": "blink", "duration": 1, "tracks": [] },
                { "name": "walk", "duration": 1, "tracks": [] },
                { "name": "attack", "duration": 0.5, "tracks": [] }
            ]
        }
    ]"#;

    const LEVEL: &str = r#"{ "seed": 1, "terrain": { "rows": 1, "columns": 1, "cellSize": 10 }, "itemCount": 0 }"#;

    fn environment() -> Environment {
        let mut env = Environment::new(GameConfig::default());
        let settings = env.config().character.clone();
        let character = Character::new(env.scene_mut(), settings);
        env.register("character", Box::new(character)).unwrap();
        env.load_models_json(MODELS).unwrap();
        env.load_level_json(LEVEL).unwrap();
        env.on_update(0.016).unwrap();
        env
    }

    #[test]
    fn test_starts_and_attaches() {
        let env = environment();
        assert_eq!(env.state("character"), Some(ComponentState::Started));
        let node = env.get::<Character>("character").unwrap().node().unwrap();
        assert!(env.scene().is_attached(node));
        assert_eq!(env.collisions().len(), 1);
    }

    #[test]
    fn test_moves_forward_while_key_held() {
        let mut env = environment();
        env.on_key_down(KeyCode::Up);
        env.on_update(0.016).unwrap();
        env.on_update(0.016).unwrap();
        let position = env.get::<Character>("character").unwrap().position(env.scene()).unwrap();
        assert_relative_eq!(position.z, 10.0, epsilon = 1e-4);

        env.on_key_up(KeyCode::Up);
        env.on_update(0.016).unwrap();
        let position = env.get::<Character>("character").unwrap().position(env.scene()).unwrap();
        assert_relative_eq!(position.z, 10.0, epsilon = 1e-4);
    }

    #[test]
    fn test_turning_changes_heading() {
        let mut env = environment();
        env.on_key_down(KeyCode::Left);
        for _ in 0..10 {
            env.on_update(0.016).unwrap();
        }
        env.on_key_up(KeyCode::Left);
        env.on_key_down(KeyCode::Up);
        env.on_update(0.016).unwrap();
        let position = env.get::<Character>("character").unwrap().position(env.scene()).unwrap();
        assert!(position.x.abs() > 1.0);
        assert!(position.z < 5.0);
    }

    #[test]
    fn test_attack_does_not_retrigger_while_playing() {
        let mut env = environment();
        env.on_key_down(KeyCode::Space);
        env.on_update(0.016).unwrap();
        assert!(env.get::<Character>("character").unwrap().is_attacking());

        env.on_key_down(KeyCode::Space);
        env.on_update(0.016).unwrap();
        assert!(env.get::<Character>("character").unwrap().is_attacking());

        for _ in 0..20 {
            env.on_update(0.016).unwrap();
        }
        let character = env.get::<Character>("character").unwrap();
        assert!(!character.is_attacking());
    }

    #[test]
    fn test_missing_clip_fails_start() {
        let mut config = GameConfig::default();
        config.character.walk_clip = Some("run".to_string());
        let mut env = Environment::new(config);
        let settings = env.config().character.clone();
        let character = Character::new(env.scene_mut(), settings);
        env.register("character", Box::new(character)).unwrap();
        env.load_models_json(MODELS).unwrap();
        env.load_level_json(LEVEL).unwrap();
        env.on_update(0.016).unwrap();

        assert!(env.find("character").is_none());
        assert_eq!(env.failures().len(), 1);
        assert!(env.collisions().is_empty());
        assert_eq!(env.scene().len(), 1);
    }
}
