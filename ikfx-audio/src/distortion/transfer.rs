//! Waveshaping transfer functions

use std::f32::consts::FRAC_PI_2;

/// Fold threshold used by the Foldback shape
const FOLDBACK_THRESHOLD: f32 = 0.5;

/// Distortion curve selected by the `type` parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum DistortionType {
    /// tanh soft clipping
    #[default]
    Soft,
    /// Hard clamp to [-1, 1]
    Hard,
    /// Exponential tube-style saturation
    Tube,
    /// Repeated reflection below a fixed threshold
    Foldback,
    /// Quarter-period sine shaper
    Sine,
}

impl DistortionType {
    /// All types in parameter index order
    pub const ALL: [DistortionType; 5] = [
        DistortionType::Soft,
        DistortionType::Hard,
        DistortionType::Tube,
        DistortionType::Foldback,
        DistortionType::Sine,
    ];

    /// Map a choice index to a type
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Choice index of this type
    pub fn index(self) -> usize {
        self as usize
    }

    /// Get display name
    pub fn display_name(&self) -> &'static str {
        match self {
            DistortionType::Soft => "SOFT",
            DistortionType::Hard => "HARD",
            DistortionType::Tube => "TUBE",
            DistortionType::Foldback => "FOLDBACK",
            DistortionType::Sine => "SINE",
        }
    }

    /// Apply the transfer curve to a pre-gained sample
    #[inline]
    pub fn shape(self, x: f32) -> f32 {
        match self {
            DistortionType::Soft => x.tanh(),
            DistortionType::Hard => x.clamp(-1.0, 1.0),
            DistortionType::Tube => {
                if x >= 0.0 {
                    1.0 - (-x).exp()
                } else {
                    -1.0 + x.exp()
                }
            }
            DistortionType::Foldback => foldback(x, FOLDBACK_THRESHOLD),
            DistortionType::Sine => (x * FRAC_PI_2).sin(),
        }
    }
}

/// Fold `x` back into [-threshold, threshold].
///
/// Closed form of reflecting across the threshold until the sample fits,
/// so large inputs fold many times at constant cost.
#[inline]
pub fn foldback(x: f32, threshold: f32) -> f32 {
    if x > threshold || x < -threshold {
        (((x - threshold) % (threshold * 4.0)).abs() - threshold * 2.0).abs() - threshold
    } else {
        x
    }
}
