//! Ghost mode - swept resonant band-pass pre-stage
//!
//! A Cytomic-style state variable filter (trapezoidal integration) whose
//! center frequency drifts slowly around 1 kHz. The band-pass output is
//! saturated and blended 80/20 with the dry signal.

use std::f32::consts::PI;

use crate::block::AudioBlock;

/// Sweep center in Hz
const CENTER_HZ: f32 = 1000.0;
/// Sweep depth in Hz
const SWEEP_HZ: f32 = 500.0;
/// Sweep rate in Hz
const SWEEP_RATE_HZ: f32 = 0.5;
/// Filter resonance
const Q: f32 = 5.0;
/// Share of the filtered signal in the blend
const WET: f32 = 0.8;

/// Per-channel SVF integrator state
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GhostFilterState {
    ic1eq: f32,
    ic2eq: f32,
}

impl GhostFilterState {
    pub fn reset(&mut self) {
        self.ic1eq = 0.0;
        self.ic2eq = 0.0;
    }
}

/// Sweep phase shared by all channels of one pipeline
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GhostState {
    /// Modulation phase in [0, 1)
    pub modulation_phase: f32,
}

impl GhostState {
    pub fn reset(&mut self) {
        self.modulation_phase = 0.0;
    }
}

/// SVF coefficients for one center frequency
#[derive(Debug, Clone, Copy)]
struct SvfCoefficients {
    a1: f32,
    a2: f32,
    a3: f32,
}

impl SvfCoefficients {
    fn band_pass(cutoff: f32, sample_rate: f32) -> Self {
        let g = (PI * cutoff / sample_rate).tan();
        let k = 1.0 / Q;
        let a1 = 1.0 / (1.0 + g * (g + k));
        let a2 = g * a1;
        let a3 = g * a2;
        Self { a1, a2, a3 }
    }

    /// SVF tick returning the band-pass output
    #[inline]
    fn tick(&self, input: f32, state: &mut GhostFilterState) -> f32 {
        let v3 = input - state.ic2eq;
        let v1 = self.a1 * state.ic1eq + self.a2 * v3;
        let v2 = state.ic2eq + self.a2 * state.ic1eq + self.a3 * v3;

        state.ic1eq = 2.0 * v1 - state.ic1eq;
        state.ic2eq = 2.0 * v2 - state.ic2eq;

        v1
    }
}

/// Ghost pre-stage for one sample rate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GhostStage {
    sample_rate: f32,
    phase_inc: f32,
}

impl GhostStage {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            sample_rate,
            phase_inc: SWEEP_RATE_HZ / sample_rate,
        }
    }

    /// Filter center for a sweep phase
    #[inline]
    pub fn center_frequency(phase: f32) -> f32 {
        CENTER_HZ + (2.0 * PI * phase).sin() * SWEEP_HZ
    }

    /// Process a block in place.
    ///
    /// `filters` holds one state per channel; channels beyond its length
    /// are left untouched.
    pub fn process(
        &self,
        block: &mut AudioBlock<'_>,
        filters: &mut [GhostFilterState],
        state: &mut GhostState,
    ) {
        let channels = block.num_channels().min(filters.len());

        for i in 0..block.num_samples() {
            let coeffs = SvfCoefficients::band_pass(
                Self::center_frequency(state.modulation_phase),
                self.sample_rate,
            );

            for (ch, filter) in filters.iter_mut().enumerate().take(channels) {
                let sample = &mut block.channel_mut(ch)[i];
                let dry = *sample;
                let filtered = (coeffs.tick(dry, filter) * 2.0).tanh();
                *sample = filtered * WET + dry * (1.0 - WET);
            }

            state.modulation_phase += self.phase_inc;
            if state.modulation_phase >= 1.0 {
                state.modulation_phase -= 1.0;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: f32 = 48000.0;

    #[test]
    fn test_center_frequency_range() {
        assert_eq!(GhostStage::center_frequency(0.0), 1000.0);
        assert!((GhostStage::center_frequency(0.25) - 1500.0).abs() < 1e-3);
        assert!((GhostStage::center_frequency(0.75) - 500.0).abs() < 1e-3);
    }

    #[test]
    fn test_phase_wraps() {
        let stage = GhostStage::new(SAMPLE_RATE);
        let mut filters = [GhostFilterState::default()];
        let mut state = GhostState {
            modulation_phase: 0.99999,
        };
        let mut data = vec![0.0; 64];
        let mut block = AudioBlock::new(&mut data, 1, 64);
        stage.process(&mut block, &mut filters, &mut state);
        assert!(state.modulation_phase >= 0.0 && state.modulation_phase < 1.0);
        assert!(state.modulation_phase < 0.5);
    }

    #[test]
    fn test_phase_shared_across_channels() {
        let stage = GhostStage::new(SAMPLE_RATE);
        let mut state = GhostState::default();

        let mut mono = [GhostFilterState::default()];
        let mut data = vec![0.0; 128];
        stage.process(&mut AudioBlock::new(&mut data, 1, 128), &mut mono, &mut state);
        let mono_phase = state.modulation_phase;

        state.reset();
        let mut stereo = [GhostFilterState::default(); 2];
        let mut data = vec![0.0; 256];
        stage.process(&mut AudioBlock::new(&mut data, 2, 128), &mut stereo, &mut state);

        // Phase advances per frame, not per channel sample
        assert_eq!(state.modulation_phase, mono_phase);
    }

    #[test]
    fn test_identical_channels_stay_identical() {
        let stage = GhostStage::new(SAMPLE_RATE);
        let mut filters = [GhostFilterState::default(); 2];
        let mut state = GhostState::default();
        let n = 512;
        let mut data: Vec<f32> = (0..n)
            .map(|i| (2.0 * PI * 1000.0 * i as f32 / SAMPLE_RATE).sin() * 0.5)
            .collect();
        let copy = data.clone();
        data.extend_from_slice(&copy);

        let mut block = AudioBlock::new(&mut data, 2, n);
        stage.process(&mut block, &mut filters, &mut state);
        assert_eq!(block.channel(0), block.channel(1));
        assert!(block.channel(0).iter().all(|s| s.is_finite() && s.abs() < 1.5));
    }

    #[test]
    fn test_dry_blend_on_first_sample() {
        let stage = GhostStage::new(SAMPLE_RATE);
        let mut filters = [GhostFilterState::default()];
        let mut state = GhostState::default();
        let mut data = vec![0.5];
        stage.process(&mut AudioBlock::new(&mut data, 1, 1), &mut filters, &mut state);
        // Band-pass output is small on the first sample, so the dry 20% dominates
        assert!(data[0] > 0.1 && data[0] < 0.2, "got {}", data[0]);
    }
}
