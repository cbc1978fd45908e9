//! Keyframe animation
//!
//! Clips hold per-node tracks; a mixer binds clip tracks to nodes below a
//! model root and writes sampled values into node transforms each frame.

pub mod clip;
pub mod mixer;

pub use clip::{AnimationClip, Interpolation, KeyframeTrack, TrackProperty};
pub use mixer::{ActionId, AnimationMixer, LoopMode};
