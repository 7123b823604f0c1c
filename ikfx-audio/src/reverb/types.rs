//! Reverb type presets and the mapping onto late-reverb parameters

/// Reverb character selected by the `type` parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum ReverbType {
    /// Small room
    #[default]
    Room,
    /// Concert hall
    Hall,
    /// Plate simulation
    Plate,
    /// Spring simulation
    Spring,
    /// Wide, bright shimmer space
    Shimmer,
}

/// Parameters consumed by a late-reverb implementation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReverbParameters {
    /// Decay length/density (0.0 - 1.0)
    pub room_size: f32,
    /// High-frequency absorption (0.0 - 1.0)
    pub damping: f32,
    /// Wet output level (0.0 - 1.0)
    pub wet_level: f32,
    /// Dry output level (0.0 - 1.0)
    pub dry_level: f32,
    /// Stereo spread (0.0 - 1.0)
    pub width: f32,
    /// Infinite hold when >= 0.5
    pub freeze: f32,
}

impl Default for ReverbParameters {
    fn default() -> Self {
        Self {
            room_size: 0.5,
            damping: 0.5,
            wet_level: 0.33,
            dry_level: 0.67,
            width: 1.0,
            freeze: 0.0,
        }
    }
}

/// Room shape derived from a type and the user's size/damping
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReverbShape {
    pub room_size: f32,
    pub damping: f32,
    pub width: f32,
}

impl ReverbType {
    /// All types in parameter index order
    pub const ALL: [ReverbType; 5] = [
        ReverbType::Room,
        ReverbType::Hall,
        ReverbType::Plate,
        ReverbType::Spring,
        ReverbType::Shimmer,
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
            ReverbType::Room => "ROOM",
            ReverbType::Hall => "HALL",
            ReverbType::Plate => "PLATE",
            ReverbType::Spring => "SPRING",
            ReverbType::Shimmer => "SHIMMER",
        }
    }

    /// (size multiplier, damping multiplier, width) per type
    fn multipliers(self) -> (f32, f32, f32) {
        match self {
            ReverbType::Room => (0.4, 0.9, 0.5),
            ReverbType::Hall => (1.0, 0.2, 1.0),
            ReverbType::Plate => (0.6, 0.1, 0.75),
            ReverbType::Spring => (0.3, 0.4, 0.3),
            ReverbType::Shimmer => (0.8, 0.3, 1.0),
        }
    }

    /// Scale the user's size and damping for this type
    pub fn shape(self, size: f32, damping: f32) -> ReverbShape {
        let (size_mul, damping_mul, width) = self.multipliers();
        ReverbShape {
            room_size: size * size_mul,
            damping: damping * damping_mul,
            width,
        }
    }

    /// Full late-reverb parameter set for this type.
    ///
    /// Wet follows `mix`, dry is its complement, freeze is never engaged.
    pub fn parameters(self, size: f32, damping: f32, mix: f32) -> ReverbParameters {
        let shape = self.shape(size, damping);
        ReverbParameters {
            room_size: shape.room_size,
            damping: shape.damping,
            wet_level: mix,
            dry_level: 1.0 - mix,
            width: shape.width,
            freeze: 0.0,
        }
    }
}
