//! Low-cut / high-cut biquad stages

use std::f32::consts::{FRAC_1_SQRT_2, PI};

/// Cut filter response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CutType {
    /// Removes content below the cutoff
    LowCut,
    /// Removes content above the cutoff
    HighCut,
}

/// Normalised biquad coefficients
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterCoefficients {
    pub b0: f32,
    pub b1: f32,
    pub b2: f32,
    pub a1: f32,
    pub a2: f32,
}

impl FilterCoefficients {
    /// Identity filter
    pub const PASSTHROUGH: FilterCoefficients = FilterCoefficients {
        b0: 1.0,
        b1: 0.0,
        b2: 0.0,
        a1: 0.0,
        a2: 0.0,
    };

    /// Second-order Butterworth coefficients for `cut_type` at `cutoff`
    pub fn new(cut_type: CutType, cutoff: f32, sample_rate: f32) -> Self {
        // Keep the cutoff inside (0, Nyquist)
        let cutoff = cutoff.clamp(1.0, sample_rate * 0.499);
        let omega = 2.0 * PI * cutoff / sample_rate;
        let sin_omega = omega.sin();
        let cos_omega = omega.cos();
        let alpha = sin_omega / (2.0 * FRAC_1_SQRT_2);

        // a0 >= 1 by construction
        let a0 = 1.0 + alpha;
        let a1 = -2.0 * cos_omega;
        let a2 = 1.0 - alpha;

        let (b0, b1, b2) = match cut_type {
            CutType::LowCut => {
                let b = (1.0 + cos_omega) / 2.0;
                (b, -(1.0 + cos_omega), b)
            }
            CutType::HighCut => {
                let b = (1.0 - cos_omega) / 2.0;
                (b, 1.0 - cos_omega, b)
            }
        };

        Self {
            b0: b0 / a0,
            b1: b1 / a0,
            b2: b2 / a0,
            a1: a1 / a0,
            a2: a2 / a0,
        }
    }
}

/// Delay taps for one channel
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct BiquadState {
    x1: f32,
    x2: f32,
    y1: f32,
    y2: f32,
}

/// Multichannel cut filter with coefficients cached per cutoff
pub struct CutFilter {
    cut_type: CutType,
    sample_rate: f32,
    cutoff: f32,
    coeffs: FilterCoefficients,
    states: Vec<BiquadState>,
}

impl CutFilter {
    /// Create an unconfigured filter that passes audio through
    pub fn new(cut_type: CutType) -> Self {
        Self {
            cut_type,
            sample_rate: 0.0,
            cutoff: f32::NAN,
            coeffs: FilterCoefficients::PASSTHROUGH,
            states: Vec::new(),
        }
    }

    /// Size state for `num_channels` and forget cached coefficients
    pub fn prepare(&mut self, sample_rate: f32, num_channels: usize) {
        self.sample_rate = sample_rate;
        self.cutoff = f32::NAN;
        self.coeffs = FilterCoefficients::PASSTHROUGH;
        self.states = vec![BiquadState::default(); num_channels];
    }

    /// Set cutoff in Hz; coefficients are rebuilt only when it changes
    pub fn set_cutoff(&mut self, cutoff: f32) {
        if cutoff != self.cutoff && self.sample_rate > 0.0 {
            self.cutoff = cutoff;
            self.coeffs = FilterCoefficients::new(self.cut_type, cutoff, self.sample_rate);
        }
    }

    /// Current cutoff in Hz
    pub fn cutoff(&self) -> f32 {
        self.cutoff
    }

    /// Current coefficients
    pub fn coefficients(&self) -> FilterCoefficients {
        self.coeffs
    }

    /// Filter one channel in place
    pub fn process(&mut self, channel: usize, samples: &mut [f32]) {
        let c = self.coeffs;
        let Some(state) = self.states.get_mut(channel) else {
            return;
        };

        for sample in samples {
            let input = *sample;
            let output =
                c.b0 * input + c.b1 * state.x1 + c.b2 * state.x2 - c.a1 * state.y1 - c.a2 * state.y2;

            state.x2 = state.x1;
            state.x1 = input;
            state.y2 = state.y1;
            state.y1 = output;

            *sample = output;
        }
    }

    /// Zero the delay taps
    pub fn reset(&mut self) {
        for state in &mut self.states {
            *state = BiquadState::default();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: f32 = 48000.0;

    /// Steady-state amplitude of a sine after filtering
    fn response(filter: &mut CutFilter, freq: f32) -> f32 {
        filter.reset();
        let n = 48_000;
        let mut samples: Vec<f32> = (0..n)
            .map(|i| (2.0 * PI * freq * i as f32 / SAMPLE_RATE).sin())
            .collect();
        filter.process(0, &mut samples);
        samples[n / 2..].iter().fold(0.0f32, |acc, s| acc.max(s.abs()))
    }

    #[test]
    fn test_a0_normalisation_is_finite() {
        for cutoff in [20.0, 1000.0, 20000.0, 100_000.0] {
            for cut in [CutType::LowCut, CutType::HighCut] {
                let c = FilterCoefficients::new(cut, cutoff, SAMPLE_RATE);
                assert!(c.b0.is_finite() && c.a1.is_finite() && c.a2.is_finite());
            }
        }
    }

    #[test]
    fn test_low_cut_response() {
        let mut filter = CutFilter::new(CutType::LowCut);
        filter.prepare(SAMPLE_RATE, 1);
        filter.set_cutoff(500.0);
        assert!(response(&mut filter, 50.0) < 0.05);
        assert!((response(&mut filter, 5000.0) - 1.0).abs() < 0.02);
        // -3 dB at the cutoff
        assert!((response(&mut filter, 500.0) - FRAC_1_SQRT_2).abs() < 0.02);
    }

    #[test]
    fn test_high_cut_response() {
        let mut filter = CutFilter::new(CutType::HighCut);
        filter.prepare(SAMPLE_RATE, 1);
        filter.set_cutoff(2000.0);
        assert!(response(&mut filter, 15000.0) < 0.05);
        assert!((response(&mut filter, 100.0) - 1.0).abs() < 0.02);
    }

    #[test]
    fn test_coefficients_cached_until_cutoff_changes() {
        let mut filter = CutFilter::new(CutType::HighCut);
        filter.prepare(SAMPLE_RATE, 2);
        filter.set_cutoff(8000.0);
        let first = filter.coefficients();
        filter.set_cutoff(8000.0);
        assert_eq!(filter.coefficients(), first);
        filter.set_cutoff(4000.0);
        assert_ne!(filter.coefficients(), first);
        assert_eq!(filter.cutoff(), 4000.0);
    }

    #[test]
    fn test_unprepared_filter_is_inert() {
        let mut filter = CutFilter::new(CutType::LowCut);
        filter.set_cutoff(300.0);
        let mut samples = vec![0.5, -0.5];
        filter.process(0, &mut samples);
        assert_eq!(samples, vec![0.5, -0.5]);
    }

    #[test]
    fn test_channels_are_independent() {
        let mut filter = CutFilter::new(CutType::HighCut);
        filter.prepare(SAMPLE_RATE, 2);
        filter.set_cutoff(1000.0);
        let mut left = vec![1.0, 0.0, 0.0, 0.0];
        let mut right = vec![0.0; 4];
        filter.process(0, &mut left);
        filter.process(1, &mut right);
        assert!(right.iter().all(|s| *s == 0.0));
        assert!(left[0] > 0.0);
    }
}
