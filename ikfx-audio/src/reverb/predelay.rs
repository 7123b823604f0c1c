//! Integer-sample pre-delay line

use crate::processor::MAX_SAMPLE_RATE;

/// Maximum delay time in seconds
const MAX_DELAY_SECS: f32 = 2.0;

/// Per-channel circular buffers sharing one delay length.
///
/// Each buffer holds two seconds at the maximum supported sample rate
/// plus the sample currently being written, so any delay up to that
/// length can be read back.
pub struct PreDelayLine {
    /// One circular buffer per channel
    buffers: Vec<Vec<f32>>,
    /// Write position per channel
    write_pos: Vec<usize>,
    /// Buffer length in samples
    capacity: usize,
    /// Current delay in samples
    delay: usize,
}

impl PreDelayLine {
    /// Create an unprepared delay line
    pub fn new() -> Self {
        Self {
            buffers: Vec::new(),
            write_pos: Vec::new(),
            capacity: Self::default_capacity(),
            delay: 0,
        }
    }

    /// Samples held per channel
    pub fn default_capacity() -> usize {
        (MAX_SAMPLE_RATE * MAX_DELAY_SECS) as usize + 1
    }

    /// Allocate zeroed buffers for `num_channels`
    pub fn prepare(&mut self, num_channels: usize) {
        self.buffers = vec![vec![0.0; self.capacity]; num_channels];
        self.write_pos = vec![0; num_channels];
    }

    /// Longest settable delay in samples
    pub fn max_delay(&self) -> usize {
        self.capacity - 1
    }

    /// Set the delay in samples, capped at `max_delay`
    pub fn set_delay(&mut self, samples: usize) {
        self.delay = samples.min(self.max_delay());
    }

    /// Current delay in samples
    pub fn delay(&self) -> usize {
        self.delay
    }

    /// Delay in samples for a time in milliseconds
    pub fn ms_to_samples(ms: f32, sample_rate: f32) -> usize {
        ((ms / 1000.0) * sample_rate).max(0.0) as usize
    }

    /// Push `input` into `channel` and return the sample written `delay` samples ago
    #[inline]
    pub fn pop_sample(&mut self, channel: usize, input: f32) -> f32 {
        let (Some(buffer), Some(write_pos)) =
            (self.buffers.get_mut(channel), self.write_pos.get_mut(channel))
        else {
            return input;
        };

        buffer[*write_pos] = input;

        let read_pos = if *write_pos >= self.delay {
            *write_pos - self.delay
        } else {
            self.capacity - (self.delay - *write_pos)
        };
        let output = buffer[read_pos];

        *write_pos = (*write_pos + 1) % self.capacity;

        output
    }

    /// Clear buffers and rewind write positions
    pub fn reset(&mut self) {
        for buffer in &mut self.buffers {
            buffer.fill(0.0);
        }
        self.write_pos.fill(0);
    }
}

impl Default for PreDelayLine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_delay_is_passthrough() {
        let mut line = PreDelayLine::new();
        line.prepare(1);
        line.set_delay(0);
        for x in [0.3, -0.2, 0.9, 0.0] {
            assert_eq!(line.pop_sample(0, x), x);
        }
    }

    #[test]
    fn test_integer_delay() {
        let mut line = PreDelayLine::new();
        line.prepare(2);
        line.set_delay(3);
        let out: Vec<f32> = (1..=6).map(|i| line.pop_sample(0, i as f32)).collect();
        assert_eq!(out, vec![0.0, 0.0, 0.0, 1.0, 2.0, 3.0]);
        // Channel 1 untouched
        assert_eq!(line.pop_sample(1, 9.0), 0.0);
    }

    #[test]
    fn test_capacity_covers_two_seconds_at_max_rate() {
        let line = PreDelayLine::new();
        assert!(line.max_delay() >= 384_000);
    }

    #[test]
    fn test_delay_is_capped() {
        let mut line = PreDelayLine::new();
        line.set_delay(usize::MAX);
        assert_eq!(line.delay(), line.max_delay());
    }

    #[test]
    fn test_wraps_around_buffer() {
        let mut line = PreDelayLine::new();
        line.prepare(1);
        line.set_delay(10);
        let total = PreDelayLine::default_capacity() + 25;
        let mut last = Vec::new();
        for i in 0..total {
            let out = line.pop_sample(0, i as f32);
            if i >= total - 5 {
                last.push((i, out));
            }
        }
        for (i, out) in last {
            assert_eq!(out, (i - 10) as f32);
        }
    }

    #[test]
    fn test_ms_to_samples() {
        assert_eq!(PreDelayLine::ms_to_samples(0.0, 48000.0), 0);
        assert_eq!(PreDelayLine::ms_to_samples(500.0, 48000.0), 24000);
        assert_eq!(PreDelayLine::ms_to_samples(250.0, 44100.0), 11025);
    }

    #[test]
    fn test_unprepared_channel_passes_through() {
        let mut line = PreDelayLine::new();
        line.set_delay(100);
        assert_eq!(line.pop_sample(0, 0.7), 0.7);
    }
}
