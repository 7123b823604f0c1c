//! One-pole tone smoothing after the waveshaper

/// Upper bound on the feedback coefficient, keeps the stage short of a pure integrator
const MAX_FEEDBACK: f32 = 0.99;

/// One-pole low-pass: `y[n] = beta * x[n] + alpha * y[n-1]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToneStage {
    alpha: f32,
    beta: f32,
}

impl ToneStage {
    /// Build from the `tone` parameter (0.0 - 1.0)
    pub fn new(tone: f32) -> Self {
        let alpha = tone * MAX_FEEDBACK;
        Self {
            alpha,
            beta: 1.0 - alpha,
        }
    }

    /// Feedback coefficient
    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    /// Filter one sample; `last` is the channel's previous output
    #[inline]
    pub fn process(&self, input: f32, last: &mut f32) -> f32 {
        let output = self.beta * input + self.alpha * *last;
        *last = output;
        output
    }
}

impl Default for ToneStage {
    fn default() -> Self {
        Self::new(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_tone_is_identity() {
        let stage = ToneStage::new(0.0);
        let mut last = 0.0;
        for x in [0.3, -0.7, 1.5, 0.0, -2.0] {
            assert_eq!(stage.process(x, &mut last), x);
        }
    }

    #[test]
    fn test_coefficients() {
        let stage = ToneStage::new(1.0);
        assert!((stage.alpha() - 0.99).abs() < 1e-6);
        let stage = ToneStage::new(0.5);
        assert!((stage.alpha() - 0.495).abs() < 1e-6);
    }

    #[test]
    fn test_smoothing_converges_without_gain() {
        let stage = ToneStage::new(1.0);
        let mut last = 0.0;
        let mut out = 0.0;
        for _ in 0..5000 {
            out = stage.process(1.0, &mut last);
            assert!(out <= 1.0 + 1e-5);
        }
        // DC settles at unity
        assert!((out - 1.0).abs() < 1e-3);
    }

    #[test]
    fn test_state_carries_between_calls() {
        let stage = ToneStage::new(0.5);
        let mut last = 0.0;
        let first = stage.process(1.0, &mut last);
        assert!((first - 0.505).abs() < 1e-6);
        assert_eq!(last, first);
        let second = stage.process(1.0, &mut last);
        assert!(second > first);
    }
}
