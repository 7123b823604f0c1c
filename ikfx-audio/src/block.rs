//! Channel-major audio block views and preallocated scratch storage

/// A mutable, channel-major view over audio samples.
///
/// Channel `i` occupies `data[i * num_samples..(i + 1) * num_samples]`.
/// The view never resizes the underlying storage.
pub struct AudioBlock<'a> {
    data: &'a mut [f32],
    num_channels: usize,
    num_samples: usize,
}

impl<'a> AudioBlock<'a> {
    /// Wrap channel-major data.
    ///
    /// # Panics
    /// If `data` holds fewer than `num_channels * num_samples` samples.
    pub fn new(data: &'a mut [f32], num_channels: usize, num_samples: usize) -> Self {
        assert!(
            data.len() >= num_channels * num_samples,
            "block needs {} samples, got {}",
            num_channels * num_samples,
            data.len()
        );
        Self {
            data,
            num_channels,
            num_samples,
        }
    }

    /// Number of channels in the block
    pub fn num_channels(&self) -> usize {
        self.num_channels
    }

    /// Number of samples per channel
    pub fn num_samples(&self) -> usize {
        self.num_samples
    }

    /// Read access to one channel
    #[inline]
    pub fn channel(&self, channel: usize) -> &[f32] {
        let start = channel * self.num_samples;
        &self.data[start..start + self.num_samples]
    }

    /// Write access to one channel
    #[inline]
    pub fn channel_mut(&mut self, channel: usize) -> &mut [f32] {
        let start = channel * self.num_samples;
        &mut self.data[start..start + self.num_samples]
    }

    /// Largest absolute sample value across all channels
    pub fn peak(&self) -> f32 {
        self.data[..self.num_channels * self.num_samples]
            .iter()
            .fold(0.0f32, |acc, s| acc.max(s.abs()))
    }
}

/// Owned channel-major scratch buffer with a fixed capacity.
///
/// Allocated once at configure time; `block` hands out views over its
/// leading region without reallocating.
pub struct AudioBuffer {
    data: Vec<f32>,
    max_channels: usize,
    max_samples: usize,
}

impl AudioBuffer {
    /// Allocate a zeroed buffer
    pub fn new(max_channels: usize, max_samples: usize) -> Self {
        Self {
            data: vec![0.0; max_channels * max_samples],
            max_channels,
            max_samples,
        }
    }

    /// Channel capacity
    pub fn max_channels(&self) -> usize {
        self.max_channels
    }

    /// Per-channel sample capacity
    pub fn max_samples(&self) -> usize {
        self.max_samples
    }

    /// Borrow a `num_channels` x `num_samples` view.
    ///
    /// Both dimensions are capped at the buffer's capacity.
    pub fn block(&mut self, num_channels: usize, num_samples: usize) -> AudioBlock<'_> {
        let num_channels = num_channels.min(self.max_channels);
        let num_samples = num_samples.min(self.max_samples);
        AudioBlock::new(
            &mut self.data[..num_channels * num_samples],
            num_channels,
            num_samples,
        )
    }

    /// Zero the whole buffer
    pub fn clear(&mut self) {
        self.data.fill(0.0);
    }
}
