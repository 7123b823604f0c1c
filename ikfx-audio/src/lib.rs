//! DSP engines for IKFX - distortion and reverb
//!
//! This crate provides the block-based processing pipelines:
//! - Block: Channel-major audio views and preallocated scratch buffers
//! - Processor: Configure/process/reset lifecycle shared by both engines
//! - Distortion: Drive, transfer curves, tone, destroy resonator, ghost pre-stage
//! - Reverb: Cut filters, pre-delay, Freeverb late reverb, shimmer modulation

mod block;
mod processor;
pub mod distortion;
pub mod reverb;

pub use block::{AudioBlock, AudioBuffer};
pub use processor::{
    ConfigureError, PipelineSnapshot, ProcessSpec, Processor, MAX_SAMPLE_RATE, MIN_SAMPLE_RATE,
};
pub use distortion::{DistortionParams, DistortionPipeline, DistortionType};
pub use reverb::{Freeverb, LateReverb, ReverbParameters, ReverbPipeline, ReverbSettings, ReverbType};
