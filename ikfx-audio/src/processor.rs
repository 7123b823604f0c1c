//! Processor trait shared by both engines

use thiserror::Error;

use crate::block::AudioBlock;

/// Highest sample rate the engines are sized for
pub const MAX_SAMPLE_RATE: f32 = 192_000.0;

/// Lowest sample rate whose Nyquist frequency clears every internal filter
/// (ghost sweep tops out at 1.5 kHz, cut filters clamp below Nyquist)
pub const MIN_SAMPLE_RATE: f32 = 8_000.0;

/// Errors that can occur while configuring an engine
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigureError {
    #[error("Invalid sample rate: {0} Hz")]
    InvalidSampleRate(f32),
    #[error("Invalid block size: {0}")]
    InvalidBlockSize(usize),
    #[error("{engine} does not support {channels} channel(s)")]
    UnsupportedChannelCount {
        engine: &'static str,
        channels: usize,
    },
}

/// Host negotiation result handed to `configure`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProcessSpec {
    pub sample_rate: f32,
    pub max_block_size: usize,
    pub num_channels: usize,
}

impl ProcessSpec {
    pub fn new(sample_rate: f32, max_block_size: usize, num_channels: usize) -> Self {
        Self {
            sample_rate,
            max_block_size,
            num_channels,
        }
    }

    /// Reject specs no engine can run with
    pub(crate) fn validate(&self) -> Result<(), ConfigureError> {
        if !self.sample_rate.is_finite()
            || self.sample_rate < MIN_SAMPLE_RATE
            || self.sample_rate > MAX_SAMPLE_RATE
        {
            return Err(ConfigureError::InvalidSampleRate(self.sample_rate));
        }
        if self.max_block_size == 0 {
            return Err(ConfigureError::InvalidBlockSize(self.max_block_size));
        }
        Ok(())
    }
}

/// Read-only view of the last processed block, for meters and visualizers
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PipelineSnapshot {
    /// Peak absolute input level of the last block
    pub input_peak: f32,
    /// Peak absolute output level of the last block
    pub output_peak: f32,
    /// Engine modulation phase in [0, 1)
    pub modulation_phase: f32,
}

/// A block-based audio engine driven by per-block parameter snapshots.
///
/// `configure` must be called before the first `process` call and again
/// whenever the sample rate changes. `process` never allocates, locks or
/// blocks.
pub trait Processor: Send {
    /// Parameter snapshot read once per block
    type Params: Copy;

    /// Allocate and reset all state for the given spec
    fn configure(&mut self, spec: ProcessSpec) -> Result<(), ConfigureError>;

    /// Process a block in place
    fn process(&mut self, block: &mut AudioBlock<'_>, params: &Self::Params);

    /// Clear all signal state without reallocating
    fn reset(&mut self);

    /// Engine name
    fn name(&self) -> &'static str;

    /// Snapshot of the last processed block
    fn snapshot(&self) -> PipelineSnapshot;
}
