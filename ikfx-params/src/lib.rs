//! Parameter layer for IKFX - layouts, storage, presets and config

mod config;
mod layout;
mod range;
mod snapshot;
mod state;
mod store;

pub use config::{Config, DEFAULT_BLOCK_SIZE};
pub use layout::{
    EngineKind, ParameterKind, ParameterSpec, DISTORTION_LAYOUT, DISTORTION_TYPES, REVERB_LAYOUT,
    REVERB_TYPES,
};
pub use range::NormalisableRange;
pub use snapshot::{distortion_params, reverb_params};
pub use state::StateError;
pub use store::{ParamError, ParameterStore};
