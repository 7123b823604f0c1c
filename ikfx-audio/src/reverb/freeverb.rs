//! Freeverb-style late reverberation
//!
//! Uses parallel comb filters and series allpass filters for
//! rich, natural-sounding reverberation.

use super::types::ReverbParameters;
use crate::block::AudioBlock;

/// Comb filter delay times in samples at 44.1kHz (from Freeverb)
const COMB_TUNINGS: [usize; 8] = [1116, 1188, 1277, 1356, 1422, 1491, 1557, 1617];

/// Allpass filter delay times in samples at 44.1kHz
const ALLPASS_TUNINGS: [usize; 4] = [556, 441, 341, 225];

/// Stereo spread in samples
const STEREO_SPREAD: usize = 23;

/// Input attenuation ahead of the comb bank
const FIXED_GAIN: f32 = 0.015;
const SCALE_WET: f32 = 3.0;
const SCALE_DRY: f32 = 2.0;
const SCALE_DAMP: f32 = 0.4;
const SCALE_ROOM: f32 = 0.28;
const OFFSET_ROOM: f32 = 0.7;

/// A late-reverberation engine the reverb pipeline can drive.
///
/// Implementations must honor the parameter semantics: `room_size` sets
/// decay length and density, `damping` high-frequency absorption, `width`
/// stereo spread, `wet_level`/`dry_level` the output blend.
pub trait LateReverb: Send {
    /// Allocate state for a sample rate and channel count
    fn prepare(&mut self, sample_rate: f32, num_channels: usize);

    /// Apply a new parameter set.
    ///
    /// The first set after `prepare` or `reset` takes effect at once;
    /// later changes may glide.
    fn set_parameters(&mut self, params: &ReverbParameters);

    /// Reverberate a block in place
    fn process(&mut self, block: &mut AudioBlock<'_>);

    /// Clear all delay lines
    fn reset(&mut self);
}

/// Lowpass-feedback comb filter
struct CombFilter {
    buffer: Vec<f32>,
    index: usize,
    filter_store: f32,
}

impl CombFilter {
    fn new(size: usize) -> Self {
        Self {
            buffer: vec![0.0; size.max(1)],
            index: 0,
            filter_store: 0.0,
        }
    }

    #[inline]
    fn process(&mut self, input: f32, feedback: f32, damping: f32) -> f32 {
        let output = self.buffer[self.index];

        // Lowpass filter in feedback path (damping)
        self.filter_store = output * (1.0 - damping) + self.filter_store * damping;

        self.buffer[self.index] = input + self.filter_store * feedback;

        self.index += 1;
        if self.index >= self.buffer.len() {
            self.index = 0;
        }

        output
    }

    fn reset(&mut self) {
        self.buffer.fill(0.0);
        self.filter_store = 0.0;
        self.index = 0;
    }
}

/// Schroeder allpass filter
struct AllpassFilter {
    buffer: Vec<f32>,
    index: usize,
}

impl AllpassFilter {
    fn new(size: usize) -> Self {
        Self {
            buffer: vec![0.0; size.max(1)],
            index: 0,
        }
    }

    #[inline]
    fn process(&mut self, input: f32) -> f32 {
        let buffered = self.buffer[self.index];
        self.buffer[self.index] = input + buffered * 0.5;

        self.index += 1;
        if self.index >= self.buffer.len() {
            self.index = 0;
        }

        buffered - input
    }

    fn reset(&mut self) {
        self.buffer.fill(0.0);
        self.index = 0;
    }
}

/// One comb bank plus allpass chain
struct Network {
    combs: Vec<CombFilter>,
    allpasses: Vec<AllpassFilter>,
}

impl Network {
    fn new(scale: f32, spread: usize) -> Self {
        Self {
            combs: COMB_TUNINGS
                .iter()
                .map(|&t| CombFilter::new((t as f32 * scale) as usize + spread))
                .collect(),
            allpasses: ALLPASS_TUNINGS
                .iter()
                .map(|&t| AllpassFilter::new((t as f32 * scale) as usize + spread))
                .collect(),
        }
    }

    #[inline]
    fn process(&mut self, input: f32, feedback: f32, damping: f32) -> f32 {
        let mut out = 0.0;
        for comb in &mut self.combs {
            out += comb.process(input, feedback, damping);
        }
        for allpass in &mut self.allpasses {
            out = allpass.process(out);
        }
        out
    }

    fn reset(&mut self) {
        for comb in &mut self.combs {
            comb.reset();
        }
        for allpass in &mut self.allpasses {
            allpass.reset();
        }
    }
}

/// Parameter glide time in seconds
const SMOOTHING_SECS: f32 = 0.01;

/// One-pole glide toward a target value
#[derive(Debug, Clone, Copy, Default)]
struct Smoothed {
    current: f32,
    target: f32,
}

impl Smoothed {
    fn snap(&mut self, value: f32) {
        self.current = value;
        self.target = value;
    }

    #[inline]
    fn next(&mut self, coeff: f32) -> f32 {
        if self.current != self.target {
            self.current = coeff * self.current + (1.0 - coeff) * self.target;
        }
        self.current
    }
}

/// Freeverb late reverb (mono or stereo)
pub struct Freeverb {
    left: Network,
    right: Network,
    params: ReverbParameters,

    // Gains derived from `params`, gliding to avoid zipper noise
    gain: Smoothed,
    feedback: Smoothed,
    damping: Smoothed,
    wet1: Smoothed,
    wet2: Smoothed,
    dry: Smoothed,
    smooth_coeff: f32,
    /// Next parameter set is applied without gliding
    snap_next: bool,
}

impl Freeverb {
    pub fn new() -> Self {
        let mut reverb = Self {
            left: Network::new(1.0, 0),
            right: Network::new(1.0, STEREO_SPREAD),
            params: ReverbParameters::default(),
            gain: Smoothed::default(),
            feedback: Smoothed::default(),
            damping: Smoothed::default(),
            wet1: Smoothed::default(),
            wet2: Smoothed::default(),
            dry: Smoothed::default(),
            smooth_coeff: Self::smoothing_coeff(44100.0),
            snap_next: true,
        };
        reverb.update_targets();
        reverb
    }

    /// Current parameters
    pub fn parameters(&self) -> ReverbParameters {
        self.params
    }

    /// Whether the tail is held indefinitely
    pub fn is_frozen(&self) -> bool {
        self.params.freeze >= 0.5
    }

    fn smoothing_coeff(sample_rate: f32) -> f32 {
        (-1.0 / (SMOOTHING_SECS * sample_rate)).exp()
    }

    /// Recompute gain targets from `params`; snaps them after prepare/reset
    fn update_targets(&mut self) {
        let p = self.params;
        let wet = p.wet_level * SCALE_WET;
        let (gain, feedback, damping) = if self.is_frozen() {
            (0.0, 1.0, 0.0)
        } else {
            (
                FIXED_GAIN,
                p.room_size * SCALE_ROOM + OFFSET_ROOM,
                p.damping * SCALE_DAMP,
            )
        };

        let targets = [
            (&mut self.gain, gain),
            (&mut self.feedback, feedback),
            (&mut self.damping, damping),
            (&mut self.wet1, 0.5 * wet * (1.0 + p.width)),
            (&mut self.wet2, 0.5 * wet * (1.0 - p.width)),
            (&mut self.dry, p.dry_level * SCALE_DRY),
        ];
        for (value, target) in targets {
            if self.snap_next {
                value.snap(target);
            } else {
                value.target = target;
            }
        }
        self.snap_next = false;
    }
}

impl Default for Freeverb {
    fn default() -> Self {
        Self::new()
    }
}

impl LateReverb for Freeverb {
    fn prepare(&mut self, sample_rate: f32, _num_channels: usize) {
        // Scale tunings for sample rate
        let scale = sample_rate / 44100.0;
        let spread = (STEREO_SPREAD as f32 * scale) as usize;
        self.left = Network::new(scale, 0);
        self.right = Network::new(scale, spread);
        self.smooth_coeff = Self::smoothing_coeff(sample_rate);
        self.snap_next = true;
    }

    fn set_parameters(&mut self, params: &ReverbParameters) {
        if self.snap_next || *params != self.params {
            self.params = *params;
            self.update_targets();
        }
    }

    fn process(&mut self, block: &mut AudioBlock<'_>) {
        let coeff = self.smooth_coeff;

        match block.num_channels() {
            0 => {}
            1 => {
                for sample in block.channel_mut(0) {
                    let gain = self.gain.next(coeff);
                    let feedback = self.feedback.next(coeff);
                    let damping = self.damping.next(coeff);
                    let wet1 = self.wet1.next(coeff);
                    self.wet2.next(coeff);
                    let dry = self.dry.next(coeff);

                    let out = self.left.process(*sample * gain, feedback, damping);
                    *sample = out * wet1 + *sample * dry;
                }
            }
            _ => {
                for i in 0..block.num_samples() {
                    let gain = self.gain.next(coeff);
                    let feedback = self.feedback.next(coeff);
                    let damping = self.damping.next(coeff);
                    let wet1 = self.wet1.next(coeff);
                    let wet2 = self.wet2.next(coeff);
                    let dry = self.dry.next(coeff);

                    let left = block.channel(0)[i];
                    let right = block.channel(1)[i];
                    let input = (left + right) * gain;

                    let out_l = self.left.process(input, feedback, damping);
                    let out_r = self.right.process(input, feedback, damping);

                    block.channel_mut(0)[i] = out_l * wet1 + out_r * wet2 + left * dry;
                    block.channel_mut(1)[i] = out_r * wet1 + out_l * wet2 + right * dry;
                }
            }
        }
    }

    fn reset(&mut self) {
        self.left.reset();
        self.right.reset();
        self.snap_next = true;
    }
}
