//! Name-keyed model store

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use super::records::{ClipRecord, InterpolationMode, ModelRecord};
use super::AssetError;
use crate::animation::{AnimationClip, Interpolation, KeyframeTrack};

struct LoadedModel {
    record: ModelRecord,
    clips: Vec<Arc<AnimationClip>>,
}

/// Loaded model records with their clips converted and validated
///
/// Owned by the environment for the lifetime of a level; components only read it.
#[derive(Default)]
pub struct AssetLibrary {
    models: HashMap<String, LoadedModel>,
}

impl AssetLibrary {
    /// Empty library
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a library from records, validating every clip
    ///
    /// A later record with the same name replaces an earlier one.
    pub fn from_records(records: Vec<ModelRecord>) -> Result<Self, AssetError> {
        let mut library = Self::new();
        for record in records {
            library.insert(record)?;
        }
        Ok(library)
    }

    /// Parse a JSON array of model records
    pub fn from_json(json: &str) -> Result<Self, AssetError> {
        let records: Vec<ModelRecord> = serde_json::from_str(json)?;
        Self::from_records(records)
    }

    /// Read and parse a JSON file of model records
    pub fn load_json_file(path: impl AsRef<Path>) -> Result<Self, AssetError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Add or replace one model
    pub fn insert(&mut self, record: ModelRecord) -> Result<(), AssetError> {
        let clips = record
            .animation_clips
            .iter()
            .map(|clip| convert_clip(clip).map(Arc::new))
            .collect::<Result<Vec<_>, _>>()?;

        log::debug!("Loaded model '{}' ({} meshes, {} clips)", record.name, record.meshes.len(), clips.len());
        if self.models.insert(record.name.clone(), LoadedModel { record, clips }).is_some() {
            log::warn!("Model record replaced by a later definition");
        }
        Ok(())
    }

    /// Look up a model record
    pub fn model(&self, name: &str) -> Result<&ModelRecord, AssetError> {
        self.models
            .get(name)
            .map(|loaded| &loaded.record)
            .ok_or_else(|| AssetError::model_not_found(name))
    }

    /// All clips of a model
    pub fn clips(&self, model: &str) -> Result<&[Arc<AnimationClip>], AssetError> {
        self.models
            .get(model)
            .map(|loaded| loaded.clips.as_slice())
            .ok_or_else(|| AssetError::model_not_found(model))
    }

    /// Look up one clip of a model
    pub fn clip(&self, model: &str, clip: &str) -> Result<Arc<AnimationClip>, AssetError> {
        self.clips(model)?
            .iter()
            .find(|c| c.name == clip)
            .cloned()
            .ok_or_else(|| AssetError::clip_not_found(format!("{model}/{clip}")))
    }

    /// Number of models
    pub fn len(&self) -> usize {
        self.models.len()
    }

    /// Whether no models are loaded
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

fn convert_clip(record: &ClipRecord) -> Result<AnimationClip, AssetError> {
    let tracks = record
        .tracks
        .iter()
        .map(|track| {
            let interpolation = match track.interpolation_mode {
                InterpolationMode::Linear => Interpolation::Linear,
                InterpolationMode::Discrete => Interpolation::Discrete,
            };
            KeyframeTrack::new(&track.target_property, track.times.clone(), track.values.clone(), interpolation)
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(AnimationClip::new(record.name.clone(), record.duration, tracks))
}
