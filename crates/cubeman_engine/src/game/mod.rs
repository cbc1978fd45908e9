//! Gameplay components
//!
//! The cube-man character, collectible power-ups, static obstacles, the
//! ground grid and the sky box, plus [`register_default_entities`] which
//! wires them into an [`Environment`] the way a level expects.

pub mod character;
pub mod level;
pub mod obstacle;
pub mod power_up;
pub mod skybox;
pub mod terrain;

pub use character::Character;
pub use level::LevelPopulator;
pub use obstacle::Obstacle;
pub use power_up::{PowerUp, PowerUpManager};
pub use skybox::Skybox;
pub use terrain::Terrain;

use crate::ecs::{Environment, EnvironmentError};

/// Component name of the player character
pub const CHARACTER: &str = "character";
/// Component name of the sky box
pub const SKYBOX: &str = "skybox";
/// Component name of the power-up manager
pub const POWER_UPS: &str = "powerups";
/// Component name of the level populator
pub const LEVEL: &str = "level";

/// Register the character, sky box, power-up manager and level populator
///
/// Nothing is initialized until the environment's readiness gate opens.
pub fn register_default_entities(env: &mut Environment) -> Result<(), EnvironmentError> {
    let character_settings = env.config().character.clone();
    let character = Character::new(env.scene_mut(), character_settings);
    env.register(CHARACTER, Box::new(character))?;

    let skybox_settings = env.config().skybox.clone();
    let skybox = Skybox::new(env.scene_mut(), &skybox_settings, CHARACTER);
    env.register(SKYBOX, Box::new(skybox))?;

    env.register(POWER_UPS, Box::new(PowerUpManager::new()))?;
    env.register(LEVEL, Box::new(LevelPopulator::new()))?;
    Ok(())
}
