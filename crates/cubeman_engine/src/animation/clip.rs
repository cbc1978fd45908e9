//! Animation clips and keyframe tracks

use crate::assets::AssetError;
use crate::foundation::math::{utils, Quat, Quaternion, Vec3};

/// Transform property animated by a track
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackProperty {
    /// Local position, three values per key
    Position,
    /// Local scale, three values per key
    Scale,
    /// Local rotation as `x, y, z, w`, four values per key
    Quaternion,
}

impl TrackProperty {
    /// Values stored per keyframe
    pub fn stride(self) -> usize {
        match self {
            Self::Position | Self::Scale => 3,
            Self::Quaternion => 4,
        }
    }

    fn parse(name: &str) -> Option<Self> {
        match name {
            "position" => Some(Self::Position),
            "scale" => Some(Self::Scale),
            "quaternion" => Some(Self::Quaternion),
            _ => None,
        }
    }
}

/// How values between keys are computed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Interpolation {
    /// Blend neighbouring keys
    #[default]
    Linear,
    /// Hold the previous key
    Discrete,
}

/// A sampled track value
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TrackValue {
    /// Position or scale
    Vector(Vec3),
    /// Rotation
    Rotation(Quat),
}

/// Keyframes for one property of one named node
#[derive(Debug, Clone)]
pub struct KeyframeTrack {
    /// Name of the node the track drives
    pub node: String,
    /// Driven property
    pub property: TrackProperty,
    /// Interpolation between keys
    pub interpolation: Interpolation,
    times: Vec<f32>,
    values: Vec<f32>,
}

impl KeyframeTrack {
    /// Build a track from a `node.property` target
    ///
    /// Fails when the target cannot be split, the property is unknown, the
    /// key times are empty or decreasing, or the value count does not match.
    pub fn new(
        target: &str,
        times: Vec<f32>,
        values: Vec<f32>,
        interpolation: Interpolation,
    ) -> Result<Self, AssetError> {
        let invalid = |reason: &str| AssetError::InvalidTrack {
            track: target.to_string(),
            reason: reason.to_string(),
        };

        let (node, property) = target.rsplit_once('.').ok_or_else(|| invalid("expected <node>.<property>"))?;
        let property = TrackProperty::parse(property).ok_or_else(|| invalid("unknown property"))?;
        if times.is_empty() {
            return Err(invalid("no keyframes"));
        }
        if times.windows(2).any(|pair| pair[1] < pair[0]) {
            return Err(invalid("key times must not decrease"));
        }
        if values.len() != times.len() * property.stride() {
            return Err(invalid("value count does not match key count"));
        }

        Ok(Self {
            node: node.to_string(),
            property,
            interpolation,
            times,
            values,
        })
    }

    /// Time of the last key
    pub fn end_time(&self) -> f32 {
        self.times.last().copied().unwrap_or(0.0)
    }

    /// Sample the track at `time`, clamping outside the key range
    pub fn sample(&self, time: f32) -> TrackValue {
        let last = self.times.len() - 1;
        let next = self.times.partition_point(|&t| t <= time);

        let (index, blend) = if next == 0 {
            (0, None)
        } else if next > last {
            (last, None)
        } else {
            let (t0, t1) = (self.times[next - 1], self.times[next]);
            let span = t1 - t0;
            let blend = match self.interpolation {
                Interpolation::Discrete => None,
                Interpolation::Linear if span > f32::EPSILON => Some((time - t0) / span),
                Interpolation::Linear => None,
            };
            (next - 1, blend)
        };

        match blend {
            None => self.key(index),
            Some(t) => match (self.key(index), self.key(index + 1)) {
                (TrackValue::Vector(a), TrackValue::Vector(b)) => TrackValue::Vector(Vec3::new(
                    utils::lerp(a.x, b.x, t),
                    utils::lerp(a.y, b.y, t),
                    utils::lerp(a.z, b.z, t),
                )),
                (TrackValue::Rotation(a), TrackValue::Rotation(b)) => TrackValue::Rotation(a.nlerp(&b, t)),
                (a, _) => a,
            },
        }
    }

    fn key(&self, index: usize) -> TrackValue {
        let stride = self.property.stride();
        let v = &self.values[index * stride..(index + 1) * stride];
        match self.property {
            TrackProperty::Position | TrackProperty::Scale => TrackValue::Vector(Vec3::new(v[0], v[1], v[2])),
            TrackProperty::Quaternion => {
                TrackValue::Rotation(Quat::new_normalize(Quaternion::new(v[3], v[0], v[1], v[2])))
            }
        }
    }
}

/// Named set of tracks played together
#[derive(Debug, Clone)]
pub struct AnimationClip {
    /// Clip name used for lookups
    pub name: String,
    /// Playback length in seconds; a negative duration means "last key time"
    pub duration: f32,
    /// Tracks in record order
    pub tracks: Vec<KeyframeTrack>,
}

impl AnimationClip {
    /// Create a clip, deriving the duration from the tracks when it is negative
    pub fn new(name: impl Into<String>, duration: f32, tracks: Vec<KeyframeTrack>) -> Self {
        let duration = if duration < 0.0 {
            tracks.iter().map(KeyframeTrack::end_time).fold(0.0, f32::max)
        } else {
            duration
        };
        Self { name: name.into(), duration, tracks }
    }
}
