//! Character movement, wall gating, pickups and camera binding end to end

use crate::camera::CameraMode;
use crate::core::config::{CharacterSettings, GameConfig};
use crate::ecs::{Component, Environment};
use crate::foundation::math::Vec3;
use crate::game::{Character, Obstacle, PowerUp};
use crate::input::KeyCode;
use crate::physics::CollisionType;

const MODELS: &str = r#"[
    {
        "name": "character",
        "meshes": [ { "name": "body", "scale": [5, 5, 5] } ]
    },
    {
        "name": "powerup",
        "meshes": [ { "name": "gem", "scale": [2, 2, 2] } ],
        "animationClips": [ { "name": "idle", "duration": 1, "tracks": [] } ]
    }
]"#;

const LEVEL: &str = r#"{ "seed": 5, "terrain": { "rows": 1, "columns": 1, "cellSize": 10 }, "itemCount": 0 }"#;

fn config(speed: f32) -> GameConfig {
    GameConfig::default().with_character(CharacterSettings {
        speed,
        idle_clip: None,
        walk_clip: None,
        attack_clip: None,
        ..CharacterSettings::default()
    })
}

/// Character at the origin facing +Z and a wall centred on `wall_z` spanning ±5
fn arena(speed: f32, wall_z: f32) -> Environment {
    let mut env = Environment::new(config(speed));
    let settings = env.config().character.clone();
    let character = Character::new(env.scene_mut(), settings);
    env.register("character", Box::new(character)).unwrap();

    let wall = Obstacle::new(
        env.scene_mut(),
        "wall",
        Vec3::new(0.0, 0.0, wall_z),
        Vec3::repeat(5.0),
        CollisionType::WALL,
    );
    env.register("wall", Box::new(wall)).unwrap();

    env.load_models_json(MODELS).unwrap();
    env.load_level_json(LEVEL).unwrap();
    env.on_update(0.016).unwrap();
    env
}

fn character_z(env: &Environment) -> f32 {
    env.get::<Character>("character").unwrap().position(env.scene()).unwrap().z
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_walk_into_wall_freezes_until_input_reverses() {
        let mut env = arena(5.0, 20.0);
        env.on_key_down(KeyCode::Up);

        let mut track = Vec::new();
        for _ in 0..6 {
            env.on_update(0.016).unwrap();
            track.push(character_z(&env));
        }
        let expected = [5.0, 10.0, 10.0, 10.0, 10.0, 10.0];
        for (actual, expected) in track.iter().zip(expected) {
            assert_relative_eq!(*actual, expected, epsilon = 1e-4);
        }
        assert_eq!(env.get::<Character>("character").unwrap().blocked_moves(), 4);

        env.on_key_up(KeyCode::Up);
        env.on_key_down(KeyCode::Down);
        env.on_update(0.016).unwrap();
        assert_relative_eq!(character_z(&env), 5.0, epsilon = 1e-4);
    }

    #[test]
    fn test_wall_gate_lets_character_back_away() {
        // Wall spans z 1..11 and already overlaps the character's box
        let mut env = arena(1.0, 6.0);

        env.on_key_down(KeyCode::Up);
        env.on_update(0.016).unwrap();
        assert_relative_eq!(character_z(&env), 0.0);

        env.on_key_up(KeyCode::Up);
        env.on_key_down(KeyCode::Down);
        env.on_update(0.016).unwrap();
        assert_relative_eq!(character_z(&env), -1.0, epsilon = 1e-5);
        assert_eq!(env.get::<Character>("character").unwrap().blocked_moves(), 1);
    }

    #[test]
    fn test_collision_box_refreshes_after_committed_move() {
        let mut env = arena(5.0, 100.0);
        env.on_key_down(KeyCode::Up);
        env.on_update(0.016).unwrap();

        let boxes = env.render_view().collision_boxes;
        let (_, _, character_box) = boxes.iter().find(|(name, _, _)| name == "character").unwrap();
        assert_relative_eq!(character_box.center().z, 5.0, epsilon = 1e-4);
    }

    #[test]
    fn test_walking_through_power_up_collects_without_blocking() {
        let mut env = arena(5.0, 100.0);
        let settings = env.config().power_ups.clone();
        let gem = PowerUp::new(env.scene_mut(), "gem", settings);
        let gem_node = gem.node().unwrap();
        env.scene_mut().transform_mut(gem_node).unwrap().position = Vec3::new(0.0, 0.0, 10.0);
        env.register("gem", Box::new(gem)).unwrap();
        env.on_update(0.016).unwrap();
        assert_eq!(env.collisions().len(), 3);

        env.on_key_down(KeyCode::Up);
        env.on_update(0.016).unwrap();
        assert!(env.find("gem").is_some());
        env.on_update(0.016).unwrap();

        assert!(env.find("gem").is_none());
        assert_eq!(env.collisions().len(), 2);
        let character = env.get::<Character>("character").unwrap();
        assert_eq!(character.items_collected(), 1);
        assert_relative_eq!(character_z(&env), 10.0, epsilon = 1e-4);
    }

    #[test]
    fn test_enemy_contact_does_not_count_as_pickup() {
        let mut env = arena(5.0, 100.0);
        let enemy = Obstacle::new(
            env.scene_mut(),
            "enemy",
            Vec3::new(0.0, 0.0, 10.0),
            Vec3::repeat(5.0),
            CollisionType::ENEMY,
        );
        env.register("enemy", Box::new(enemy)).unwrap();
        env.on_update(0.016).unwrap();

        env.on_key_down(KeyCode::Up);
        for _ in 0..3 {
            env.on_update(0.016).unwrap();
        }

        let character = env.get::<Character>("character").unwrap();
        assert_eq!(character.items_collected(), 0);
        assert_eq!(character.blocked_moves(), 0);
        assert_relative_eq!(character_z(&env), 15.0, epsilon = 1e-4);
        assert_eq!(env.get::<Obstacle>("enemy").unwrap().contacts(), 3);
    }

    #[test]
    fn test_camera_binds_to_character_on_first_frame() {
        let env = arena(5.0, 100.0);
        let character = env.get::<Character>("character").unwrap();
        let node = character.node();
        assert_eq!(env.camera().target(), node);

        // Bound at the character, then one easing step toward the ideal point
        let position = character.position(env.scene()).unwrap();
        let distance = (env.camera().position() - position).norm();
        assert!(distance <= env.config().camera.follow_speed + 1e-3);
    }

    #[test]
    fn test_free_camera_ignores_target_motion() {
        let mut env = arena(5.0, 100.0);
        env.on_key_down(KeyCode::Q);
        assert_eq!(env.camera().mode(), CameraMode::Free);
        let parked = env.camera().position();

        env.on_key_down(KeyCode::Up);
        for _ in 0..3 {
            env.on_update(0.016).unwrap();
        }
        assert_relative_eq!(env.camera().position(), parked);
        assert!(character_z(&env) > 0.0);
    }

    #[test]
    fn test_camera_unbinds_when_character_removed() {
        let mut env = arena(5.0, 100.0);
        assert!(env.camera().target().is_some());
        env.remove("character");
        env.on_update(0.016).unwrap();
        assert!(env.camera().target().is_none());
    }
}
