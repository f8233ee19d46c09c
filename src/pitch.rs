//! Pitch Scaling
//!
//! Root pitch and scale selection are accepted as parameters, but scale
//! quantization is not applied yet: [`quantize`] returns the extent-scaled
//! pitch unchanged.

use serde::{Deserialize, Serialize};

/// Highest root pitch (semitones above C)
pub const MAX_ROOT_PITCH: i32 = 11;

/// Scale the pitch output would be quantized to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PitchScale {
    #[default]
    Unscaled,
    Major,
    Minor,
}

impl PitchScale {
    /// Map a parameter index to a scale, saturating out-of-range values
    pub fn from_index(index: i32) -> Self {
        match index {
            i32::MIN..=0 => PitchScale::Unscaled,
            1 => PitchScale::Major,
            _ => PitchScale::Minor,
        }
    }

    pub fn index(&self) -> i32 {
        match self {
            PitchScale::Unscaled => 0,
            PitchScale::Major => 1,
            PitchScale::Minor => 2,
        }
    }
}

/// Quantize a pitch value to `scale` rooted at `root`.
///
/// Pass-through: every scale currently returns `pitch` untouched.
#[inline]
pub fn quantize(pitch: f64, _root: i32, _scale: PitchScale) -> f64 {
    // TODO: snap to scale degrees once the pitch CV's volts-per-semitone mapping is fixed.
    pitch
}
