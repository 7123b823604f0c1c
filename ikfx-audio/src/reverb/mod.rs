//! Reverb engine
//!
//! Per block: low cut -> high cut (in place on the dry signal), copy to the
//! wet buffer, pre-delay, late reverb, shimmer modulation, dry/wet mix.

mod filter;
mod freeverb;
mod modulation;
mod predelay;
mod types;

pub use filter::{CutFilter, CutType, FilterCoefficients};
pub use freeverb::{Freeverb, LateReverb};
pub use modulation::ModulationStage;
pub use predelay::PreDelayLine;
pub use types::{ReverbParameters, ReverbShape, ReverbType};

use tracing::debug;

use crate::block::{AudioBlock, AudioBuffer};
use crate::processor::{ConfigureError, PipelineSnapshot, ProcessSpec, Processor};

/// Parameter snapshot for one reverb block
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReverbSettings {
    /// Base room size (0.0 - 1.0)
    pub size: f32,
    /// Base damping (0.0 - 1.0)
    pub damping: f32,
    /// Reverb character
    pub reverb_type: ReverbType,
    /// Pre-delay in milliseconds (0 - 500)
    pub predelay_ms: f32,
    /// Dry/wet mix (0.0 = dry, 1.0 = wet)
    pub mix: f32,
    /// Shimmer depth (0.0 - 1.0)
    pub modulation: f32,
    /// Low cut frequency in Hz (20 - 1000)
    pub lowcut: f32,
    /// High cut frequency in Hz (1000 - 20000)
    pub highcut: f32,
}

impl Default for ReverbSettings {
    fn default() -> Self {
        Self {
            size: 0.5,
            damping: 0.5,
            reverb_type: ReverbType::Room,
            predelay_ms: 0.0,
            mix: 0.3,
            modulation: 0.0,
            lowcut: 20.0,
            highcut: 20000.0,
        }
    }
}

/// Algorithmic reverb pipeline, generic over the late-reverb engine
pub struct ReverbPipeline<R: LateReverb = Freeverb> {
    spec: Option<ProcessSpec>,
    low_cut: CutFilter,
    high_cut: CutFilter,
    predelay: PreDelayLine,
    reverb: R,
    modulation: ModulationStage,
    /// Preallocated wet buffer, sized at configure time
    wet: AudioBuffer,
    snapshot: PipelineSnapshot,
}

impl ReverbPipeline<Freeverb> {
    pub fn new() -> Self {
        Self::with_reverb(Freeverb::new())
    }
}

impl Default for ReverbPipeline<Freeverb> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: LateReverb> ReverbPipeline<R> {
    /// Build a pipeline around a custom late-reverb engine
    pub fn with_reverb(reverb: R) -> Self {
        Self {
            spec: None,
            low_cut: CutFilter::new(CutType::LowCut),
            high_cut: CutFilter::new(CutType::HighCut),
            predelay: PreDelayLine::new(),
            reverb,
            modulation: ModulationStage::new(44100.0),
            wet: AudioBuffer::new(0, 0),
            snapshot: PipelineSnapshot::default(),
        }
    }

    /// Negotiated spec, if configured
    pub fn spec(&self) -> Option<ProcessSpec> {
        self.spec
    }

    /// Late-reverb engine
    pub fn reverb(&self) -> &R {
        &self.reverb
    }

    /// Pre-delay line
    pub fn predelay(&self) -> &PreDelayLine {
        &self.predelay
    }

    /// Capacity of the wet scratch buffer in samples per channel
    pub fn wet_capacity(&self) -> usize {
        self.wet.max_samples()
    }
}

impl<R: LateReverb> Processor for ReverbPipeline<R> {
    type Params = ReverbSettings;

    fn configure(&mut self, spec: ProcessSpec) -> Result<(), ConfigureError> {
        spec.validate()?;
        if !(1..=2).contains(&spec.num_channels) {
            return Err(ConfigureError::UnsupportedChannelCount {
                engine: self.name(),
                channels: spec.num_channels,
            });
        }

        self.low_cut.prepare(spec.sample_rate, spec.num_channels);
        self.high_cut.prepare(spec.sample_rate, spec.num_channels);
        self.predelay.prepare(spec.num_channels);
        self.predelay.set_delay(0);
        self.reverb.prepare(spec.sample_rate, spec.num_channels);
        self.modulation = ModulationStage::new(spec.sample_rate);
        self.wet = AudioBuffer::new(spec.num_channels, spec.max_block_size);
        self.snapshot = PipelineSnapshot::default();
        self.spec = Some(spec);

        debug!(
            sample_rate = spec.sample_rate,
            max_block_size = spec.max_block_size,
            channels = spec.num_channels,
            "Reverb configured"
        );
        Ok(())
    }

    fn process(&mut self, block: &mut AudioBlock<'_>, params: &ReverbSettings) {
        let Some(spec) = self.spec else {
            debug_assert!(false, "process called before configure");
            return;
        };

        let input_peak = block.peak();
        let channels = block.num_channels().min(spec.num_channels);
        let num_samples = block.num_samples();

        // Block-rate updates
        self.low_cut.set_cutoff(params.lowcut);
        self.high_cut.set_cutoff(params.highcut);
        self.reverb.set_parameters(
            &params
                .reverb_type
                .parameters(params.size, params.damping, params.mix),
        );
        let delay_samples = PreDelayLine::ms_to_samples(params.predelay_ms, spec.sample_rate);
        self.predelay.set_delay(delay_samples);

        for ch in 0..channels {
            self.low_cut.process(ch, block.channel_mut(ch));
            self.high_cut.process(ch, block.channel_mut(ch));
        }

        let wet_mix = params.mix;
        let dry_mix = 1.0 - wet_mix;

        // Sub-blocks keep the wet buffer at its configured size
        let mut start = 0;
        while start < num_samples {
            let len = (num_samples - start).min(spec.max_block_size);
            let end = start + len;

            let mut wet = self.wet.block(channels, len);
            for ch in 0..channels {
                wet.channel_mut(ch)
                    .copy_from_slice(&block.channel(ch)[start..end]);
            }

            if delay_samples > 0 {
                for ch in 0..channels {
                    for sample in wet.channel_mut(ch) {
                        *sample = self.predelay.pop_sample(ch, *sample);
                    }
                }
            }

            self.reverb.process(&mut wet);
            self.modulation.process(&mut wet, params.modulation);

            for ch in 0..channels {
                let dry = &mut block.channel_mut(ch)[start..end];
                for (d, w) in dry.iter_mut().zip(wet.channel(ch)) {
                    *d = *d * dry_mix + *w * wet_mix;
                }
            }

            start = end;
        }

        self.snapshot = PipelineSnapshot {
            input_peak,
            output_peak: block.peak(),
            modulation_phase: self.modulation.phase(),
        };
    }

    fn reset(&mut self) {
        self.low_cut.reset();
        self.high_cut.reset();
        self.predelay.reset();
        self.reverb.reset();
        self.modulation.reset();
        self.wet.clear();
        self.snapshot = PipelineSnapshot::default();
    }

    fn name(&self) -> &'static str {
        "Reverb"
    }

    fn snapshot(&self) -> PipelineSnapshot {
        self.snapshot
    }
}
