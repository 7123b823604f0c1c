//! Engine selection and the interleaved stream adapter

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use ikfx_audio::{
    AudioBlock, AudioBuffer, ConfigureError, DistortionPipeline, PipelineSnapshot, ProcessSpec,
    Processor, ReverbPipeline,
};
use ikfx_params::{distortion_params, reverb_params, EngineKind, ParameterStore};

/// Channels handed to an engine; extra device channels are silenced
pub const MAX_ENGINE_CHANNELS: usize = 2;

/// Events sent from audio callbacks to the main thread
#[derive(Debug, Clone)]
pub enum AudioEvent {
    /// Stream error
    Error(String),
}

/// The running effect engine
pub enum Engine {
    Distortion(DistortionPipeline),
    Reverb(ReverbPipeline),
}

impl Engine {
    pub fn new(kind: EngineKind) -> Self {
        match kind {
            EngineKind::Distortion => Engine::Distortion(DistortionPipeline::new()),
            EngineKind::Reverb => Engine::Reverb(ReverbPipeline::new()),
        }
    }

    pub fn configure(&mut self, spec: ProcessSpec) -> Result<(), ConfigureError> {
        match self {
            Engine::Distortion(p) => p.configure(spec),
            Engine::Reverb(p) => p.configure(spec),
        }
    }

    /// Process one block with a fresh snapshot of `store`
    #[inline]
    pub fn process(&mut self, block: &mut AudioBlock<'_>, store: &ParameterStore) {
        match self {
            Engine::Distortion(p) => p.process(block, &distortion_params(store)),
            Engine::Reverb(p) => p.process(block, &reverb_params(store)),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Engine::Distortion(p) => p.name(),
            Engine::Reverb(p) => p.name(),
        }
    }

    pub fn snapshot(&self) -> PipelineSnapshot {
        match self {
            Engine::Distortion(p) => p.snapshot(),
            Engine::Reverb(p) => p.snapshot(),
        }
    }
}

/// Latest engine snapshot, published by the audio callback
#[derive(Debug, Default)]
pub struct SharedSnapshot {
    input_peak: AtomicU32,
    output_peak: AtomicU32,
    modulation_phase: AtomicU32,
}

impl SharedSnapshot {
    pub fn store(&self, snapshot: &PipelineSnapshot) {
        self.input_peak
            .store(snapshot.input_peak.to_bits(), Ordering::Relaxed);
        self.output_peak
            .store(snapshot.output_peak.to_bits(), Ordering::Relaxed);
        self.modulation_phase
            .store(snapshot.modulation_phase.to_bits(), Ordering::Relaxed);
    }

    pub fn load(&self) -> PipelineSnapshot {
        PipelineSnapshot {
            input_peak: f32::from_bits(self.input_peak.load(Ordering::Relaxed)),
            output_peak: f32::from_bits(self.output_peak.load(Ordering::Relaxed)),
            modulation_phase: f32::from_bits(self.modulation_phase.load(Ordering::Relaxed)),
        }
    }
}

/// Runs an engine over interleaved device buffers.
///
/// All storage is allocated in `new`; `process_interleaved` only copies.
pub struct StreamProcessor {
    engine: Engine,
    params: Arc<ParameterStore>,
    meter: Arc<SharedSnapshot>,
    device_channels: usize,
    engine_channels: usize,
    scratch: AudioBuffer,
}

impl StreamProcessor {
    pub fn new(
        params: Arc<ParameterStore>,
        meter: Arc<SharedSnapshot>,
        sample_rate: f32,
        device_channels: usize,
        max_frames: usize,
    ) -> Result<Self, ConfigureError> {
        let engine_channels = device_channels.min(MAX_ENGINE_CHANNELS);
        let mut engine = Engine::new(params.engine());
        engine.configure(ProcessSpec::new(sample_rate, max_frames, engine_channels))?;

        Ok(Self {
            engine,
            params,
            meter,
            device_channels,
            engine_channels,
            scratch: AudioBuffer::new(engine_channels, max_frames),
        })
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Process interleaved samples in place
    pub fn process_interleaved(&mut self, data: &mut [f32]) {
        let stride = self.device_channels;
        if stride == 0 {
            return;
        }
        let max_frames = self.scratch.max_samples().max(1);

        for chunk in data.chunks_mut(max_frames * stride) {
            let frames = chunk.len() / stride;
            let mut block = self.scratch.block(self.engine_channels, frames);

            // De-interleave
            for ch in 0..self.engine_channels {
                for (frame, sample) in block.channel_mut(ch).iter_mut().enumerate() {
                    *sample = chunk[frame * stride + ch];
                }
            }

            self.engine.process(&mut block, &self.params);

            // Interleave back; channels beyond the engine's are silenced
            for frame in 0..frames {
                for ch in 0..stride {
                    chunk[frame * stride + ch] = if ch < self.engine_channels {
                        block.channel(ch)[frame]
                    } else {
                        0.0
                    };
                }
            }
        }

        self.meter.store(&self.engine.snapshot());
    }
}

/// Map one interleaved input frame onto the output channel layout
#[inline]
pub fn map_frame(input: &[f32], output_channels: usize, mut push: impl FnMut(f32)) {
    if input.is_empty() {
        for _ in 0..output_channels {
            push(0.0);
        }
        return;
    }
    for ch in 0..output_channels {
        push(input[ch.min(input.len() - 1)]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meter() -> Arc<SharedSnapshot> {
        Arc::new(SharedSnapshot::default())
    }

    fn distortion_store() -> Arc<ParameterStore> {
        Arc::new(ParameterStore::new(EngineKind::Distortion))
    }

    #[test]
    fn test_interleaved_matches_block_processing() {
        let store = distortion_store();
        store.set("type", 1.0).unwrap();
        store.set("drive", 4.0).unwrap();
        store.set("tone", 0.0).unwrap();
        store.set("output", 1.0).unwrap();

        let mut stream = StreamProcessor::new(store.clone(), meter(), 48000.0, 2, 64).unwrap();
        // Left ramps up, right is constant
        let mut data: Vec<f32> = (0..128)
            .flat_map(|i| [i as f32 / 256.0, -0.1])
            .collect();
        stream.process_interleaved(&mut data);

        for frame in 0..128 {
            let left = (4.0 * frame as f32 / 256.0).clamp(-1.0, 1.0);
            assert!((data[frame * 2] - left).abs() < 1e-6);
            assert!((data[frame * 2 + 1] - -0.4).abs() < 1e-6);
        }
    }

    #[test]
    fn test_extra_device_channels_silenced() {
        let mut stream = StreamProcessor::new(distortion_store(), meter(), 48000.0, 4, 32).unwrap();
        let mut data = vec![0.5; 4 * 16];
        stream.process_interleaved(&mut data);
        for frame in data.chunks(4) {
            assert_eq!(frame[2], 0.0);
            assert_eq!(frame[3], 0.0);
        }
        assert_eq!(stream.engine().name(), "Distortion");
    }

    #[test]
    fn test_reverb_engine_from_store() {
        let store = Arc::new(ParameterStore::new(EngineKind::Reverb));
        store.set("mix", 0.0).unwrap();
        let mut stream = StreamProcessor::new(store, meter(), 44100.0, 1, 128).unwrap();
        let mut data = vec![0.0; 300];
        stream.process_interleaved(&mut data);
        assert!(data.iter().all(|s| *s == 0.0));
        assert_eq!(stream.engine().name(), "Reverb");
    }

    #[test]
    fn test_meter_follows_callback() {
        let meter = meter();
        let mut stream =
            StreamProcessor::new(distortion_store(), meter.clone(), 48000.0, 2, 64).unwrap();
        let mut data = vec![0.25; 2 * 64];
        stream.process_interleaved(&mut data);
        let snapshot = meter.load();
        assert_eq!(snapshot.input_peak, 0.25);
        assert_eq!(snapshot, stream.engine().snapshot());
    }

    #[test]
    fn test_map_frame() {
        let mut out = Vec::new();
        map_frame(&[0.3], 2, |s| out.push(s));
        assert_eq!(out, vec![0.3, 0.3]);

        out.clear();
        map_frame(&[0.1, 0.2, 0.3], 2, |s| out.push(s));
        assert_eq!(out, vec![0.1, 0.2]);

        out.clear();
        map_frame(&[], 2, |s| out.push(s));
        assert_eq!(out, vec![0.0, 0.0]);
    }
}
