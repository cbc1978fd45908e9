//! # Core Module
//!
//! Shared configuration types consumed by the environment, the chase camera
//! and the gameplay components.

pub mod config;

pub use config::{
    CameraSettings,
    CharacterSettings,
    Config,
    ConfigError,
    EnvironmentSettings,
    GameConfig,
    PowerUpSettings,
    SkyboxSettings,
};
