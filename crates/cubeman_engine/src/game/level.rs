//! Level population from the loaded level record

use crate::ecs::{Component, ComponentError, Context};

use super::obstacle::Obstacle;
use super::terrain::Terrain;

/// Registers the terrain and every obstacle listed by the level
#[derive(Default)]
pub struct LevelPopulator {
    spawned: Vec<String>,
}

impl LevelPopulator {
    /// Create a populator
    pub fn new() -> Self {
        Self::default()
    }

    /// Names of the components this populator registered
    pub fn spawned(&self) -> &[String] {
        &self.spawned
    }
}

impl Component for LevelPopulator {
    fn initialize(&mut self, ctx: &mut Context<'_>) -> Result<(), ComponentError> {
        let level = ctx.level().cloned().ok_or(ComponentError::LevelNotLoaded)?;

        let terrain = Terrain::new(ctx.scene_mut(), &level.terrain);
        match ctx.register("terrain", Box::new(terrain)) {
            Ok(_) => self.spawned.push("terrain".to_string()),
            Err(error) => log::warn!("Skipping terrain: {}", error),
        }

        for (index, record) in level.obstacles.iter().enumerate() {
            let name = record.name.clone().unwrap_or_else(|| format!("obstacle-{index}"));
            let obstacle = Obstacle::from_record(ctx.scene_mut(), &name, record);
            match ctx.register(&name, Box::new(obstacle)) {
                Ok(_) => self.spawned.push(name),
                Err(error) => log::warn!("Skipping obstacle: {}", error),
            }
        }

        log::info!("Level populated with {} components", self.spawned.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::GameConfig;
    use crate::ecs::{ComponentState, Environment};
    use crate::physics::CollisionType;

    const LEVEL: &str = r#"{
        "seed": 3,
        "terrain": { "rows": 2, "columns": 2, "cellSize": 100 },
        "itemCount": 0,
        "obstacles": [
            { "name": "north-wall", "center": [0, 0, 500], "halfExtents": [500, 50, 10] },
            { "center": [200, 0, 0], "halfExtents": [20, 20, 20], "kind": "enemy" }
        ]
    }"#;

    #[test]
    fn test_registers_terrain_and_obstacles() {
        let mut env = Environment::new(GameConfig::default());
        env.register("level", Box::new(LevelPopulator::new())).unwrap();
        env.load_models_json("[]").unwrap();
        env.load_level_json(LEVEL).unwrap();
        env.on_update(0.016).unwrap();

        let populator = env.get::<LevelPopulator>("level").unwrap();
        assert_eq!(populator.spawned(), ["terrain", "north-wall", "obstacle-1"]);
        for name in populator.spawned() {
            assert_eq!(env.state(name), Some(ComponentState::Started));
        }

        let kinds: Vec<_> = env.collisions().iter().map(|c| c.kind).collect();
        assert_eq!(kinds, [CollisionType::WALL, CollisionType::ENEMY]);
    }
}
