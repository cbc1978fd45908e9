//! # Game Configuration
//!
//! Tunables for the environment, the chase camera and the gameplay components.
//!
//! ## Design Goals
//!
//! - **Defaulted**: every field has a default, so a partial file is valid
//! - **Serializable**: loads from TOML or RON through the [`Config`] trait
//! - **Validated**: [`GameConfig::validate`] rejects values that would stall the simulation
//!
//! ```toml
//! [environment]
//! load_timeout_secs = 10.0
//!
//! [camera]
//! follow_speed = 8.0
//! ```

use serde::{Deserialize, Serialize};

pub use crate::config::{Config, ConfigError};

/// # Environment Settings
///
/// Controls the readiness gate and which component the camera follows.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvironmentSettings {
    /// Seconds to wait for level and model data before `on_update` reports a
    /// load timeout. `None` waits forever.
    pub load_timeout_secs: Option<f32>,
    /// Name of the component the camera binds to once it has started
    pub camera_target: Option<String>,
}

impl Default for EnvironmentSettings {
    fn default() -> Self {
        Self {
            load_timeout_secs: None,
            camera_target: Some("character".to_string()),
        }
    }
}

/// # Camera Settings
///
/// Free-look sensitivity and chase parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    /// Radians of yaw/pitch per pixel of mouse drag
    pub angle_scale: f32,
    /// World units per free-fly key press
    pub move_scale: f32,
    /// Constant speed at which the camera eases toward its ideal position
    pub follow_speed: f32,
    /// Distance kept behind the target
    pub distance: f32,
    /// Height added above the look-at point
    pub height: f32,
    /// Vertical offset from the target origin to the look-at point
    pub target_offset: f32,
    /// Distance to the ideal position that counts as converged
    pub close_enough: f32,
    /// Per-frame target movement above which a frame counts toward a sprint
    pub max_target_movement: f32,
    /// Consecutive fast frames required before the camera snaps
    pub max_full_speed_frames: u32,
    /// Eye position before any target is bound
    pub initial_position: [f32; 3],
    /// Vertical field of view in degrees
    pub fov_degrees: f32,
    /// Near clipping plane
    pub near: f32,
    /// Far clipping plane
    pub far: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            angle_scale: 0.005,
            move_scale: 5.0,
            follow_speed: 5.0,
            distance: 360.0,
            height: 120.0,
            target_offset: 100.0,
            close_enough: 10.0,
            max_target_movement: 1.0,
            max_full_speed_frames: 5,
            initial_position: [0.0, 100.0, 200.0],
            fov_degrees: 45.0,
            near: 1.0,
            far: 10_000.0,
        }
    }
}

/// # Character Settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CharacterSettings {
    /// Model record used to build the character
    pub model: String,
    /// Distance moved per update while a move key is held
    pub speed: f32,
    /// Radians turned per update while a turn key is held
    pub rotate_speed: f32,
    /// Looping idle clip
    pub idle_clip: Option<String>,
    /// Looping walk clip
    pub walk_clip: Option<String>,
    /// One-shot attack clip
    pub attack_clip: Option<String>,
    /// Playback rate of the walk clip
    pub walk_time_scale: f32,
    /// Playback rate of the attack clip
    pub attack_time_scale: f32,
}

impl Default for CharacterSettings {
    fn default() -> Self {
        Self {
            model: "character".to_string(),
            speed: 5.0,
            rotate_speed: 0.05,
            idle_clip: Some("blink".to_string()),
            walk_clip: Some("walk".to_string()),
            attack_clip: Some("attack".to_string()),
            walk_time_scale: 2.5,
            attack_time_scale: 3.5,
        }
    }
}

/// # Power-Up Settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PowerUpSettings {
    /// Model record used for every power-up
    pub model: String,
    /// Looping idle clip
    pub idle_clip: Option<String>,
    /// Width of the square the power-ups are scattered over
    pub spread: f32,
    /// Subtracted from each scattered coordinate
    pub offset: f32,
    /// Playback rate of the idle clip
    pub time_scale: f32,
}

impl Default for PowerUpSettings {
    fn default() -> Self {
        Self {
            model: "powerup".to_string(),
            idle_clip: Some("idle".to_string()),
            spread: 5000.0,
            offset: 2000.0,
            time_scale: 0.4,
        }
    }
}

/// # Skybox Settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SkyboxSettings {
    /// Scale of the inward-facing cube
    pub scale: [f32; 3],
    /// Height of the cube center above the followed node
    pub height: f32,
}

impl Default for SkyboxSettings {
    fn default() -> Self {
        Self {
            scale: [7000.0, 1000.0, 7000.0],
            height: 400.0,
        }
    }
}

/// # Game Configuration
///
/// Root of the configuration tree handed to [`crate::ecs::Environment::new`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Readiness gate and camera binding
    pub environment: EnvironmentSettings,
    /// Chase camera
    pub camera: CameraSettings,
    /// Player character
    pub character: CharacterSettings,
    /// Collectibles
    pub power_ups: PowerUpSettings,
    /// Sky cube
    pub skybox: SkyboxSettings,
}

impl GameConfig {
    /// Set the readiness watchdog timeout
    pub fn with_load_timeout(mut self, secs: f32) -> Self {
        self.environment.load_timeout_secs = Some(secs);
        self
    }

    /// Set the component the camera follows
    pub fn with_camera_target(mut self, name: impl Into<String>) -> Self {
        self.environment.camera_target = Some(name.into());
        self
    }

    /// Replace the character settings
    pub fn with_character(mut self, character: CharacterSettings) -> Self {
        self.character = character;
        self
    }

    /// Check values that would otherwise stall or explode the simulation
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(timeout) = self.environment.load_timeout_secs {
            if timeout <= 0.0 {
                return Err(ConfigError::Invalid(format!("load timeout must be positive, got {timeout}")));
            }
        }
        if self.camera.follow_speed <= 0.0 {
            return Err(ConfigError::Invalid("camera follow speed must be positive".to_string()));
        }
        if self.camera.close_enough < 0.0 {
            return Err(ConfigError::Invalid("camera close-enough distance must not be negative".to_string()));
        }
        if self.camera.near <= 0.0 || self.camera.far <= self.camera.near {
            return Err(ConfigError::Invalid(format!(
                "camera clip planes out of order: near {} far {}",
                self.camera.near, self.camera.far
            )));
        }
        if self.power_ups.spread < 0.0 {
            return Err(ConfigError::Invalid("power-up spread must not be negative".to_string()));
        }
        Ok(())
    }
}

impl Config for GameConfig {}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_defaults_match_chase_camera_tuning() {
        let config = GameConfig::default();
        assert_relative_eq!(config.camera.distance, 360.0);
        assert_relative_eq!(config.camera.height, 120.0);
        assert_eq!(config.camera.max_full_speed_frames, 5);
        assert_eq!(config.environment.camera_target.as_deref(), Some("character"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: GameConfig = toml::from_str("[camera]\nfollow_speed = 8.0\n").unwrap();
        assert_relative_eq!(config.camera.follow_speed, 8.0);
        assert_relative_eq!(config.camera.angle_scale, 0.005);
        assert_relative_eq!(config.character.speed, 5.0);
    }

    #[test]
    fn test_ron_round_trip_through_file() {
        let path = std::env::temp_dir().join(format!("cubeman_config_{}.ron", std::process::id()));
        let config = GameConfig::default().with_load_timeout(3.0);
        config.save_to_file(&path).unwrap();
        let loaded = GameConfig::load_from_file(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded.environment.load_timeout_secs, Some(3.0));
    }

    #[test]
    fn test_unknown_extension_is_rejected() {
        let result = GameConfig::load_from_file("settings.ini");
        assert!(matches!(result, Err(ConfigError::Io(_)) | Err(ConfigError::UnsupportedFormat(_))));
        assert!(matches!(
            GameConfig::default().save_to_file("settings.ini"),
            Err(ConfigError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_validate_rejects_non_positive_timeout() {
        let config = GameConfig::default().with_load_timeout(0.0);
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }
}
