use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Original, caller-supplied control point id.
pub type PointId = i64;

/// Zero-based id assigned before the request leaves the service.
pub type DenseId = usize;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlPoint {
    pub id: PointId,
    #[serde(default)]
    pub role: String,
    pub position: [f64; 3],
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnimationRequest {
    #[serde(default)]
    pub control_points: Vec<ControlPoint>,
    #[serde(default)]
    pub prompt: String,
    /// Number of frames; required by the multi-frame modes.
    #[serde(default)]
    pub length: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Deformation {
    pub delta_x: f64,
    pub delta_y: f64,
    pub delta_z: f64,
}

/// Absolute position as emitted by the model in keyframe mode.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Deformations keyed by the ids the model saw.
pub type DenseFrame = BTreeMap<DenseId, Deformation>;

/// Deformations keyed by the caller's ids.
pub type Frame = BTreeMap<PointId, Deformation>;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AnimationOutput {
    Single(Frame),
    Sequence(Vec<Frame>),
}

/// What the model is asked to produce, one per route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// One frame of deltas.
    Pose,
    /// A sequence of delta frames.
    Animation,
    /// A sequence of absolute-position frames, converted to deltas locally.
    Keyframes,
}

impl OutputMode {
    pub fn requires_length(self) -> bool {
        !matches!(self, Self::Pose)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pose => "pose",
            Self::Animation => "animation",
            Self::Keyframes => "keyframes",
        }
    }
}

impl std::fmt::Display for OutputMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Deformation {
    pub fn new(delta_x: f64, delta_y: f64, delta_z: f64) -> Self {
        Self {
            delta_x,
            delta_y,
            delta_z,
        }
    }
}

impl Position {
    /// Per-axis offset from `origin`, rounded to hundredths.
    pub fn delta_from(&self, origin: [f64; 3]) -> Deformation {
        Deformation {
            delta_x: round_hundredths(self.x - origin[0]),
            delta_y: round_hundredths(self.y - origin[1]),
            delta_z: round_hundredths(self.z - origin[2]),
        }
    }
}

/// Rounds half away from zero at the second decimal place.
pub fn round_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

impl AnimationOutput {
    pub fn frame_count(&self) -> usize {
        match self {
            Self::Single(_) => 1,
            Self::Sequence(frames) => frames.len(),
        }
    }
}
