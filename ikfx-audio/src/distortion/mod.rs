//! Distortion engine
//!
//! Per block: optional ghost pre-stage over the whole block, then per
//! sample `drive -> transfer curve -> tone -> destroy -> dry/wet -> output`.

mod destroy;
mod ghost;
mod tone;
mod transfer;

pub use destroy::{BandPassCoefficients, DestroyStage};
pub use ghost::{GhostFilterState, GhostStage, GhostState};
pub use tone::ToneStage;
pub use transfer::{foldback, DistortionType};

use tracing::debug;

use crate::block::AudioBlock;
use crate::processor::{ConfigureError, PipelineSnapshot, ProcessSpec, Processor};

/// Parameter snapshot for one distortion block
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistortionParams {
    /// Ghost pre-stage enabled
    pub ghost_mode: bool,
    /// Input drive (1.0 - 25.0)
    pub drive: f32,
    /// Output gain (0.0 - 1.0)
    pub output: f32,
    /// Transfer curve
    pub shape: DistortionType,
    /// Tone smoothing (0.0 - 1.0)
    pub tone: f32,
    /// Dry/wet mix (0.0 = dry, 1.0 = wet)
    pub mix: f32,
    /// Destroy amount (0 - 100)
    pub destroy: f32,
}

impl Default for DistortionParams {
    fn default() -> Self {
        Self {
            ghost_mode: false,
            drive: 1.0,
            output: 0.5,
            shape: DistortionType::Soft,
            tone: 0.5,
            mix: 1.0,
            destroy: 0.0,
        }
    }
}

/// Per-channel signal state
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ChannelState {
    /// Previous tone stage output
    pub last_tone_sample: f32,
    /// Destroy resonator taps `[x1, x2, y1, y2]`
    pub destroy_filter_taps: [f32; 4],
}

/// Distortion/saturation pipeline
pub struct DistortionPipeline {
    spec: Option<ProcessSpec>,
    channels: Vec<ChannelState>,
    ghost_filters: Vec<GhostFilterState>,
    ghost_state: GhostState,
    ghost: GhostStage,
    destroy: DestroyStage,
    snapshot: PipelineSnapshot,
}

impl DistortionPipeline {
    /// Sample rate used before the host configures the pipeline
    const DEFAULT_SAMPLE_RATE: f32 = 44100.0;

    pub fn new() -> Self {
        Self {
            spec: None,
            channels: Vec::new(),
            ghost_filters: Vec::new(),
            ghost_state: GhostState::default(),
            ghost: GhostStage::new(Self::DEFAULT_SAMPLE_RATE),
            destroy: DestroyStage::new(0.0, Self::DEFAULT_SAMPLE_RATE),
            snapshot: PipelineSnapshot::default(),
        }
    }

    /// Negotiated spec, if configured
    pub fn spec(&self) -> Option<ProcessSpec> {
        self.spec
    }

    /// Per-channel state, sized at configure time
    pub fn channel_states(&self) -> &[ChannelState] {
        &self.channels
    }

    /// Shared ghost sweep state
    pub fn ghost_state(&self) -> GhostState {
        self.ghost_state
    }

    fn sample_rate(&self) -> f32 {
        self.spec
            .map(|s| s.sample_rate)
            .unwrap_or(Self::DEFAULT_SAMPLE_RATE)
    }

    /// Rebuild the destroy resonator when the amount moves
    #[inline]
    fn update_destroy(&mut self, amount: f32) {
        if amount != self.destroy.amount() {
            self.destroy = DestroyStage::new(amount, self.sample_rate());
        }
    }
}

impl Default for DistortionPipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl Processor for DistortionPipeline {
    type Params = DistortionParams;

    fn configure(&mut self, spec: ProcessSpec) -> Result<(), ConfigureError> {
        spec.validate()?;
        if spec.num_channels == 0 {
            return Err(ConfigureError::UnsupportedChannelCount {
                engine: self.name(),
                channels: spec.num_channels,
            });
        }

        self.channels = vec![ChannelState::default(); spec.num_channels];
        self.ghost_filters = vec![GhostFilterState::default(); spec.num_channels];
        self.ghost_state.reset();
        self.ghost = GhostStage::new(spec.sample_rate);
        self.destroy = DestroyStage::new(self.destroy.amount(), spec.sample_rate);
        self.snapshot = PipelineSnapshot::default();
        self.spec = Some(spec);

        debug!(
            sample_rate = spec.sample_rate,
            max_block_size = spec.max_block_size,
            channels = spec.num_channels,
            "Distortion configured"
        );
        Ok(())
    }

    fn process(&mut self, block: &mut AudioBlock<'_>, params: &DistortionParams) {
        debug_assert!(self.spec.is_some(), "process called before configure");

        let input_peak = block.peak();

        self.update_destroy(params.destroy / 100.0);

        if params.ghost_mode {
            self.ghost
                .process(block, &mut self.ghost_filters, &mut self.ghost_state);
        }

        let tone = ToneStage::new(params.tone);
        let destroy = self.destroy;
        let drive = params.drive;
        let mix = params.mix;
        let output = params.output;
        let shape = params.shape;

        let channels = block.num_channels().min(self.channels.len());
        for (ch, state) in self.channels.iter_mut().enumerate().take(channels) {
            for sample in block.channel_mut(ch) {
                let clean = *sample;
                let mut x = clean * drive;
                x = shape.shape(x);
                x = tone.process(x, &mut state.last_tone_sample);
                x = destroy.process(x, &mut state.destroy_filter_taps);
                x = clean * (1.0 - mix) + x * mix;
                *sample = x * output;
            }
        }

        self.snapshot = PipelineSnapshot {
            input_peak,
            output_peak: block.peak(),
            modulation_phase: self.ghost_state.modulation_phase,
        };
    }

    fn reset(&mut self) {
        for state in &mut self.channels {
            *state = ChannelState::default();
        }
        for filter in &mut self.ghost_filters {
            filter.reset();
        }
        self.ghost_state.reset();
        self.snapshot = PipelineSnapshot::default();
    }

    fn name(&self) -> &'static str {
        "Distortion"
    }

    fn snapshot(&self) -> PipelineSnapshot {
        self.snapshot
    }
}
