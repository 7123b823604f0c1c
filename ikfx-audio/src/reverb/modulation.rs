//! Shimmer - slow sinusoidal amplitude modulation of the wet signal

use std::f32::consts::PI;

use crate::block::AudioBlock;

/// Modulation rate in Hz
const RATE_HZ: f32 = 3.0;
/// Depth at `modulation = 1.0`
const DEPTH_SCALE: f32 = 0.002;

/// Free-running sine LFO applied multiplicatively
pub struct ModulationStage {
    phase: f32,
    phase_inc: f32,
}

impl ModulationStage {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            phase: 0.0,
            phase_inc: RATE_HZ / sample_rate,
        }
    }

    /// LFO phase in [0, 1)
    pub fn phase(&self) -> f32 {
        self.phase
    }

    /// Modulate a wet block in place; `amount` is 0.0 - 1.0.
    ///
    /// The phase advances once per sample frame and is shared by all
    /// channels. A zero amount leaves the block and the phase untouched.
    pub fn process(&mut self, block: &mut AudioBlock<'_>, amount: f32) {
        if amount <= 0.0 {
            return;
        }

        let depth = amount * DEPTH_SCALE;
        for i in 0..block.num_samples() {
            let gain = 1.0 + (2.0 * PI * self.phase).sin() * depth;
            for ch in 0..block.num_channels() {
                block.channel_mut(ch)[i] *= gain;
            }

            // Once per frame, not per channel-sample: the rate stays 3 Hz at
            // any channel count and every channel sees the same gain. A
            // channel-outer loop would scale the rate by the channel count
            // and start each channel where the previous one ended.
            self.phase += self.phase_inc;
            if self.phase >= 1.0 {
                self.phase -= 1.0;
            }
        }
    }

    pub fn reset(&mut self) {
        self.phase = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_amount_is_noop() {
        let mut stage = ModulationStage::new(48000.0);
        let mut data = vec![0.5; 64];
        stage.process(&mut AudioBlock::new(&mut data, 2, 32), 0.0);
        assert!(data.iter().all(|s| *s == 0.5));
        assert_eq!(stage.phase(), 0.0);
    }

    #[test]
    fn test_gain_stays_near_unity() {
        let mut stage = ModulationStage::new(48000.0);
        let mut data = vec![1.0; 48000];
        stage.process(&mut AudioBlock::new(&mut data, 1, 48000), 1.0);
        for s in &data {
            assert!((s - 1.0).abs() <= 0.002 + 1e-6);
        }
        // Some samples actually move
        assert!(data.iter().any(|s| (s - 1.0).abs() > 0.001));
    }

    #[test]
    fn test_rate_independent_of_channel_count() {
        let mut mono = ModulationStage::new(48000.0);
        let mut stereo = ModulationStage::new(48000.0);
        let mut mono_data = vec![1.0; 4000];
        let mut stereo_data = vec![1.0; 2 * 4000];
        mono.process(&mut AudioBlock::new(&mut mono_data, 1, 4000), 1.0);
        let mut block = AudioBlock::new(&mut stereo_data, 2, 4000);
        stereo.process(&mut block, 1.0);

        assert_eq!(mono.phase(), stereo.phase());
        assert_eq!(block.channel(0), block.channel(1));
        assert_eq!(block.channel(0), &mono_data[..]);
    }

    #[test]
    fn test_phase_wraps_and_advances_per_frame() {
        let mut stage = ModulationStage::new(48000.0);
        let frames = 20_000;
        let mut data = vec![0.0; 2 * frames];
        stage.process(&mut AudioBlock::new(&mut data, 2, frames), 0.5);
        // 20000 frames at 3 Hz / 48 kHz = 1.25 cycles
        assert!((stage.phase() - 0.25).abs() < 5e-3, "phase {}", stage.phase());
        assert!(stage.phase() >= 0.0 && stage.phase() < 1.0);
    }
}
