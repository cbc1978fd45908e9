//! Serde records for model and level JSON
//!
//! Field names follow the camelCase JSON written by the asset tools.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::AssetError;
use crate::render::geometry::FaceAtlas;

fn unit_scale() -> [f32; 3] {
    [1.0, 1.0, 1.0]
}

fn derived_duration() -> f32 {
    -1.0
}

/// One cube part of a model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeshRecord {
    /// Part name, also the target name for animation tracks
    pub name: String,
    /// Name of another mesh in the same model to parent under
    #[serde(default)]
    pub parent: Option<String>,
    /// Vertex offset applied before the transform
    #[serde(default)]
    pub offset: [f32; 3],
    /// Local position
    #[serde(default)]
    pub position: [f32; 3],
    /// Local scale
    #[serde(default = "unit_scale")]
    pub scale: [f32; 3],
    /// Local rotation as XYZ Euler angles in radians
    #[serde(default)]
    pub rotation: [f32; 3],
    /// Atlas tile per face
    #[serde(flatten)]
    pub faces: FaceAtlas,
}

/// Interpolation as written in records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterpolationMode {
    /// Blend neighbouring keys
    #[default]
    Linear,
    /// Hold the previous key
    Discrete,
}

/// Keyframes for one `node.property` target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackRecord {
    /// `<mesh>.<position|scale|quaternion>`
    #[serde(alias = "name")]
    pub target_property: String,
    /// Key times in seconds
    pub times: Vec<f32>,
    /// Flattened key values
    pub values: Vec<f32>,
    /// Interpolation between keys
    #[serde(default)]
    pub interpolation_mode: InterpolationMode,
}

/// Named animation clip
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClipRecord {
    /// Clip name
    pub name: String,
    /// Length in seconds, derived from the tracks when omitted
    #[serde(default = "derived_duration")]
    pub duration: f32,
    /// Tracks
    pub tracks: Vec<TrackRecord>,
}

/// A complete model: cube parts plus clips
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelRecord {
    /// Lookup name
    pub name: String,
    /// Cube parts
    pub meshes: Vec<MeshRecord>,
    /// Clips playable on this model
    #[serde(default)]
    pub animation_clips: Vec<ClipRecord>,
    /// Atlas texture for every part
    #[serde(default)]
    pub diffuse_texture_path: Option<String>,
}

/// Terrain grid parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TerrainRecord {
    /// Half the number of cell rows
    pub rows: u32,
    /// Half the number of cell columns
    pub columns: u32,
    /// Edge length of one cell
    pub cell_size: f32,
    /// Atlas texture for the ground
    #[serde(default)]
    pub texture_path: Option<String>,
}

/// Collision kind of a static obstacle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObstacleKind {
    /// Blocks movement
    #[default]
    Wall,
    /// Notified on contact, does not block
    Enemy,
}

/// Static box placed by the level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObstacleRecord {
    /// Component name, generated when omitted
    #[serde(default)]
    pub name: Option<String>,
    /// Box center in world space
    pub center: [f32; 3],
    /// Half size along each axis
    pub half_extents: [f32; 3],
    /// Collision kind
    #[serde(default)]
    pub kind: ObstacleKind,
}

/// Level description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelRecord {
    /// Seed for every random choice made while the level is live
    pub seed: u64,
    /// Ground grid
    pub terrain: TerrainRecord,
    /// Number of power-ups to scatter
    pub item_count: u32,
    /// Static boxes
    #[serde(default)]
    pub obstacles: Vec<ObstacleRecord>,
}

impl LevelRecord {
    /// Parse a level from JSON text
    pub fn from_json(json: &str) -> Result<Self, AssetError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a level file
    pub fn load_json_file(path: impl AsRef<Path>) -> Result<Self, AssetError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}
