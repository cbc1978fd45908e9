//! Asset records and lookup
//!
//! Models and levels arrive as JSON produced by external tools. Records are
//! parsed with serde, validated once at load time, and looked up by name.
//! A missing name is always a [`AssetError::NotFound`]; nothing is built from
//! a record that does not exist.

pub mod library;
pub mod model;
pub mod records;

use std::fmt;

pub use library::AssetLibrary;
pub use model::Model;
pub use records::{
    ClipRecord, InterpolationMode, LevelRecord, MeshRecord, ModelRecord, ObstacleKind, ObstacleRecord,
    TerrainRecord, TrackRecord,
};

/// Kind of named asset, used in lookup errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    /// Model record
    Model,
    /// Animation clip inside a model
    Clip,
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Model => f.write_str("model"),
            Self::Clip => f.write_str("animation clip"),
        }
    }
}

/// Asset loading and lookup errors
#[derive(thiserror::Error, Debug)]
pub enum AssetError {
    /// No asset with that name is loaded
    #[error("{kind} '{name}' not found")]
    NotFound {
        /// What was looked up
        kind: AssetKind,
        /// Requested name
        name: String,
    },

    /// JSON did not match the record schema
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A keyframe track is malformed
    #[error("invalid track '{track}': {reason}")]
    InvalidTrack {
        /// Track target as written in the record
        track: String,
        /// What is wrong with it
        reason: String,
    },

    /// A mesh names a parent that is not part of the same model
    #[error("mesh '{mesh}' in model '{model}' has unknown parent '{parent}'")]
    UnknownParent {
        /// Model record name
        model: String,
        /// Mesh naming the parent
        mesh: String,
        /// Missing parent name
        parent: String,
    },

    /// Mesh parents loop back on themselves
    #[error("mesh '{mesh}' in model '{model}' is part of a parent cycle")]
    ParentCycle {
        /// Model record name
        model: String,
        /// Mesh that could not be linked
        mesh: String,
    },
}

impl AssetError {
    /// Shorthand for a missing model
    pub fn model_not_found(name: impl Into<String>) -> Self {
        Self::NotFound { kind: AssetKind::Model, name: name.into() }
    }

    /// Shorthand for a missing clip
    pub fn clip_not_found(name: impl Into<String>) -> Self {
        Self::NotFound { kind: AssetKind::Clip, name: name.into() }
    }
}
