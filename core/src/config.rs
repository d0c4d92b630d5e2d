use serde::{Deserialize, Serialize};

/// Grid dimensions for the fragmented image.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PieceOptions {
    pub rows: u32,
    pub columns: u32,
}

impl Default for PieceOptions {
    fn default() -> Self {
        Self {
            rows: 14,
            columns: 10,
        }
    }
}

/// Bounds for the pointer-driven container tilt, in degrees and pixels.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TiltOptions {
    pub max_rotation_x: f64,
    pub max_rotation_y: f64,
    pub max_translation_x: f64,
    pub max_translation_y: f64,
}

impl Default for TiltOptions {
    fn default() -> Self {
        Self {
            max_rotation_x: -2.0,
            max_rotation_y: 3.0,
            max_translation_x: 6.0,
            max_translation_y: -2.0,
        }
    }
}

/// Timing ranges for the glitch cycle. `start` is the delay before a cycle
/// begins, `state` the hold time of each class state within a cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlitchOptions {
    pub start_min_ms: u32,
    pub start_max_ms: u32,
    pub state_min_ms: u32,
    pub state_max_ms: u32,
    pub total_iterations: u32,
}

impl Default for GlitchOptions {
    fn default() -> Self {
        Self {
            start_min_ms: 500,
            start_max_ms: 4000,
            state_min_ms: 50,
            state_max_ms: 250,
            total_iterations: 6,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    pub pieces: PieceOptions,
    pub tilt: TiltOptions,
    pub glitch: GlitchOptions,
}
