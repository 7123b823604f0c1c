//! Destroy stage - resonant band-pass plus cascaded nonlinear distortion
//!
//! Signal flow for `amount > 0`:
//! - input gain `1 + amount * 12`
//! - low branch: `tanh(x * 0.8)` lifted by `1 + amount * 2.5`
//! - resonant branch: high-Q band-pass (150-350 Hz, Q 15-50), boosted,
//!   then tanh -> sine -> foldback at 0.6
//! - weighted sum of both branches, then a double tanh saturation
//!
//! The constants and their order define the character of the effect.

use std::f32::consts::{FRAC_PI_2, PI};

use super::transfer::foldback;

/// Fold threshold applied to the resonant branch
const RESONANT_FOLD_THRESHOLD: f32 = 0.6;

/// Normalised band-pass biquad coefficients
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandPassCoefficients {
    b0: f32,
    b1: f32,
    b2: f32,
    a1: f32,
    a2: f32,
}

impl BandPassCoefficients {
    /// Constant 0 dB peak band-pass via the bilinear transform
    pub fn new(center_hz: f32, q: f32, sample_rate: f32) -> Self {
        let omega = 2.0 * PI * center_hz / sample_rate;
        let sin_omega = omega.sin();
        let cos_omega = omega.cos();
        let alpha = sin_omega / (2.0 * q);

        // a0 >= 1 for any positive Q below Nyquist
        let a0 = 1.0 + alpha;

        Self {
            b0: alpha / a0,
            b1: 0.0,
            b2: -alpha / a0,
            a1: (-2.0 * cos_omega) / a0,
            a2: (1.0 - alpha) / a0,
        }
    }

    /// Run one sample through the filter.
    ///
    /// `taps` holds `[x1, x2, y1, y2]` for one channel.
    #[inline]
    pub fn process(&self, input: f32, taps: &mut [f32; 4]) -> f32 {
        let [x1, x2, y1, y2] = *taps;
        let output = self.b0 * input + self.b1 * x1 + self.b2 * x2 - self.a1 * y1 - self.a2 * y2;
        *taps = [input, x1, output, y1];
        output
    }
}

/// Destroy stage configured for one `amount` (0.0 - 1.0)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DestroyStage {
    amount: f32,
    resonator: BandPassCoefficients,
}

impl DestroyStage {
    /// Precompute the resonator for `amount` at `sample_rate`
    pub fn new(amount: f32, sample_rate: f32) -> Self {
        Self {
            amount,
            resonator: BandPassCoefficients::new(
                Self::center_frequency(amount),
                Self::resonance(amount),
                sample_rate,
            ),
        }
    }

    /// Resonator center frequency in Hz
    pub fn center_frequency(amount: f32) -> f32 {
        150.0 + amount * amount * 200.0
    }

    /// Resonator Q
    pub fn resonance(amount: f32) -> f32 {
        15.0 + amount * 35.0
    }

    /// Current amount
    pub fn amount(&self) -> f32 {
        self.amount
    }

    /// Process one sample with the channel's filter taps
    #[inline]
    pub fn process(&self, input: f32, taps: &mut [f32; 4]) -> f32 {
        let amount = self.amount;
        if amount <= 0.0 {
            return input;
        }

        let gained = input * (1.0 + amount * 12.0);

        let low_end = (gained * 0.8).tanh() * (1.0 + amount * 2.5);

        let mut resonant = self.resonator.process(gained, taps);
        resonant *= 1.0 + amount * 15.0;
        resonant *= 1.0 + amount * 2.0;
        resonant = (resonant * 2.5).tanh();
        resonant = (resonant * FRAC_PI_2).sin();
        resonant = foldback(resonant, RESONANT_FOLD_THRESHOLD);

        let mut output = low_end * (0.6 + amount * 0.4) + resonant * (amount * 1.5);

        output = (output * (1.0 + amount * 3.0) * 2.0).tanh();
        output *= 1.0 + amount;
        output.tanh()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: f32 = 48000.0;

    #[test]
    fn test_zero_amount_is_passthrough() {
        let stage = DestroyStage::new(0.0, SAMPLE_RATE);
        let mut taps = [0.0; 4];
        for x in [0.0, 0.3, -0.9, 2.5, -17.0] {
            assert_eq!(stage.process(x, &mut taps), x);
        }
        // Taps untouched on the passthrough path
        assert_eq!(taps, [0.0; 4]);
    }

    #[test]
    fn test_resonator_mapping() {
        assert_eq!(DestroyStage::center_frequency(0.0), 150.0);
        assert_eq!(DestroyStage::center_frequency(1.0), 350.0);
        assert_eq!(DestroyStage::resonance(0.0), 15.0);
        assert_eq!(DestroyStage::resonance(1.0), 50.0);
    }

    #[test]
    fn test_output_bounded_and_finite() {
        for amount in [0.01, 0.25, 0.5, 0.75, 1.0] {
            let stage = DestroyStage::new(amount, SAMPLE_RATE);
            let mut taps = [0.0; 4];
            for n in 0..4800 {
                let x = (2.0 * PI * 220.0 * n as f32 / SAMPLE_RATE).sin() * 25.0;
                let y = stage.process(x, &mut taps);
                assert!(y.is_finite());
                assert!(y.abs() < 1.0, "amount {} sample {} -> {}", amount, n, y);
            }
        }
    }

    #[test]
    fn test_band_pass_rejects_dc() {
        let filter = BandPassCoefficients::new(200.0, 20.0, SAMPLE_RATE);
        let mut taps = [0.0; 4];
        let mut out = 0.0;
        for _ in 0..200_000 {
            out = filter.process(1.0, &mut taps);
        }
        assert!(out.abs() < 1e-3, "DC leaked: {}", out);
    }

    #[test]
    fn test_band_pass_unity_at_center() {
        let center = 250.0;
        let filter = BandPassCoefficients::new(center, 15.0, SAMPLE_RATE);
        let mut taps = [0.0; 4];
        let mut peak: f32 = 0.0;
        for n in 0..96_000 {
            let x = (2.0 * PI * center * n as f32 / SAMPLE_RATE).sin();
            let y = filter.process(x, &mut taps);
            if n > 48_000 {
                peak = peak.max(y.abs());
            }
        }
        assert!((peak - 1.0).abs() < 0.05, "peak {}", peak);
    }

    #[test]
    fn test_silence_stays_silent() {
        let stage = DestroyStage::new(1.0, SAMPLE_RATE);
        let mut taps = [0.0; 4];
        for _ in 0..64 {
            assert_eq!(stage.process(0.0, &mut taps), 0.0);
        }
    }
}
