//! Value ranges with optional step and skew

/// A parameter's legal range.
///
/// `skew < 1.0` spends more of the normalised travel on the low end of the
/// range, which suits frequency controls.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalisableRange {
    pub start: f32,
    pub end: f32,
    /// Step size, or 0.0 for continuous
    pub interval: f32,
    pub skew: f32,
}

impl NormalisableRange {
    /// Linear range with a step size
    pub const fn new(start: f32, end: f32, interval: f32) -> Self {
        Self {
            start,
            end,
            interval,
            skew: 1.0,
        }
    }

    /// Skewed range with a step size
    pub const fn with_skew(start: f32, end: f32, interval: f32, skew: f32) -> Self {
        Self {
            start,
            end,
            interval,
            skew,
        }
    }

    /// Map a value to 0.0 - 1.0
    pub fn to_normalised(&self, value: f32) -> f32 {
        let span = self.end - self.start;
        if span <= 0.0 {
            return 0.0;
        }
        let proportion = ((value - self.start) / span).clamp(0.0, 1.0);
        if self.skew == 1.0 || proportion == 0.0 {
            proportion
        } else {
            proportion.powf(self.skew)
        }
    }

    /// Map 0.0 - 1.0 back to a snapped value in range
    pub fn from_normalised(&self, normalised: f32) -> f32 {
        let mut proportion = normalised.clamp(0.0, 1.0);
        if self.skew != 1.0 && proportion > 0.0 {
            proportion = (proportion.ln() / self.skew).exp();
        }
        self.snap(self.start + (self.end - self.start) * proportion)
    }

    /// Clamp to the range and round to the nearest step
    pub fn snap(&self, value: f32) -> f32 {
        let mut value = value.clamp(self.start, self.end);
        if self.interval > 0.0 {
            let steps = ((value - self.start) / self.interval).round();
            let snapped = (self.start + steps * self.interval).clamp(self.start, self.end);
            // Values already on the grid keep their exact representation
            if (snapped - value).abs() > self.interval * 1e-3 {
                value = snapped;
            }
        }
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_mapping() {
        let range = NormalisableRange::new(0.0, 500.0, 1.0);
        assert_eq!(range.to_normalised(250.0), 0.5);
        assert_eq!(range.from_normalised(0.5), 250.0);
        assert_eq!(range.from_normalised(2.0), 500.0);
        assert_eq!(range.to_normalised(-10.0), 0.0);
    }

    #[test]
    fn test_snap_to_interval() {
        let drive = NormalisableRange::new(1.0, 25.0, 0.1);
        assert!((drive.snap(3.14159) - 3.1).abs() < 1e-5);
        assert_eq!(drive.snap(100.0), 25.0);
        assert_eq!(drive.snap(-3.0), 1.0);

        let mix = NormalisableRange::new(0.0, 1.0, 0.01);
        assert_eq!(mix.snap(0.3), 0.3);
        assert_eq!(mix.snap(mix.snap(0.337)), mix.snap(0.337));

        let continuous = NormalisableRange::new(0.0, 1.0, 0.0);
        assert_eq!(continuous.snap(0.123_456), 0.123_456);
    }

    #[test]
    fn test_skew_favours_low_end() {
        let cutoff = NormalisableRange::with_skew(20.0, 1000.0, 1.0, 0.3);
        // Halfway along the control sits well below the arithmetic middle
        let mid = cutoff.from_normalised(0.5);
        assert!(mid < 510.0 / 2.0, "mid {}", mid);
        assert_eq!(cutoff.from_normalised(0.0), 20.0);
        assert_eq!(cutoff.from_normalised(1.0), 1000.0);
    }

    #[test]
    fn test_skew_inverse() {
        let cutoff = NormalisableRange::with_skew(1000.0, 20000.0, 0.0, 0.3);
        for value in [1000.0, 2500.0, 8000.0, 19000.0] {
            let back = cutoff.from_normalised(cutoff.to_normalised(value));
            assert!((back - value).abs() / value < 1e-3, "{} -> {}", value, back);
        }
    }
}
