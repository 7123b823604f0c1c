//! Block-rate conversion of stored values into engine parameter snapshots
//!
//! Reads go by layout index so the audio thread never searches by id.

use ikfx_audio::{DistortionParams, DistortionType, ReverbSettings, ReverbType};

use crate::layout::EngineKind;
use crate::store::ParameterStore;

mod distortion_index {
    pub const GHOST_MODE: usize = 0;
    pub const DRIVE: usize = 1;
    pub const OUTPUT: usize = 2;
    pub const TYPE: usize = 3;
    pub const TONE: usize = 4;
    pub const MIX: usize = 5;
    pub const DESTROY: usize = 6;
}

mod reverb_index {
    pub const SIZE: usize = 0;
    pub const DAMPING: usize = 1;
    pub const TYPE: usize = 2;
    pub const PREDELAY: usize = 3;
    pub const MIX: usize = 4;
    pub const MODULATION: usize = 5;
    pub const LOWCUT: usize = 6;
    pub const HIGHCUT: usize = 7;
}

/// Snapshot a distortion store
pub fn distortion_params(store: &ParameterStore) -> DistortionParams {
    use distortion_index::*;
    debug_assert_eq!(store.engine(), EngineKind::Distortion);

    DistortionParams {
        ghost_mode: store.value_at(GHOST_MODE) >= 0.5,
        drive: store.value_at(DRIVE),
        output: store.value_at(OUTPUT),
        shape: DistortionType::from_index(store.value_at(TYPE) as usize).unwrap_or_default(),
        tone: store.value_at(TONE),
        mix: store.value_at(MIX),
        destroy: store.value_at(DESTROY),
    }
}

/// Snapshot a reverb store
pub fn reverb_params(store: &ParameterStore) -> ReverbSettings {
    use reverb_index::*;
    debug_assert_eq!(store.engine(), EngineKind::Reverb);

    ReverbSettings {
        size: store.value_at(SIZE),
        damping: store.value_at(DAMPING),
        reverb_type: ReverbType::from_index(store.value_at(TYPE) as usize).unwrap_or_default(),
        predelay_ms: store.value_at(PREDELAY),
        mix: store.value_at(MIX),
        modulation: store.value_at(MODULATION),
        lowcut: store.value_at(LOWCUT),
        highcut: store.value_at(HIGHCUT),
    }
}
