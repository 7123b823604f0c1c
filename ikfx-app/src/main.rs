//! IKFX - live distortion and reverb
//!
//! Runs one engine between the default input and output devices and
//! takes parameter edits from a line-based console.

mod audio;
mod commands;

use std::io::{self, BufRead};
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::{anyhow, bail, Context};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossbeam_channel::{RecvTimeoutError, Sender};
use ringbuf::traits::{Consumer, Producer, Split};
use ringbuf::{HeapProd, HeapRb};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use audio::{map_frame, AudioEvent, SharedSnapshot, StreamProcessor};
use commands::{parse_command, Command, HELP};
use ikfx_params::{Config, EngineKind, ParameterStore};

/// Ring buffer length in host blocks
const RING_BLOCKS: usize = 8;

/// Console poll interval
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Command-line overrides for the config file
#[derive(Debug, Default, PartialEq)]
struct CliArgs {
    engine: Option<EngineKind>,
    preset: Option<PathBuf>,
    block_size: Option<usize>,
}

fn parse_args(args: impl IntoIterator<Item = String>) -> anyhow::Result<CliArgs> {
    let mut cli = CliArgs::default();
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--preset" => {
                let path = args.next().ok_or_else(|| anyhow!("--preset needs a path"))?;
                cli.preset = Some(PathBuf::from(path));
            }
            "--block-size" => {
                let value = args
                    .next()
                    .ok_or_else(|| anyhow!("--block-size needs a frame count"))?;
                let frames: usize = value
                    .parse()
                    .with_context(|| format!("invalid block size '{}'", value))?;
                if frames == 0 {
                    bail!("block size must be at least one frame");
                }
                cli.block_size = Some(frames);
            }
            other => match EngineKind::from_name(other) {
                Some(engine) if cli.engine.is_none() => cli.engine = Some(engine),
                _ => bail!(
                    "unexpected argument '{}'\nusage: ikfx [distortion|reverb] [--preset <path>] [--block-size <frames>]",
                    other
                ),
            },
        }
    }

    Ok(cli)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = parse_args(std::env::args().skip(1))?;

    // Config file first, command line wins
    let mut config = Config::load();
    if let Some(engine) = cli.engine {
        config.engine = engine;
    }
    if let Some(block_size) = cli.block_size {
        config.block_size = block_size;
    }
    let preset = cli.preset.or_else(|| config.last_preset.clone());

    let store = Arc::new(ParameterStore::new(config.engine));
    if let Some(ref path) = preset {
        match store.load_from(path) {
            Ok(()) => config.last_preset = Some(path.clone()),
            Err(e) => warn!(path = %path.display(), error = %e, "Could not load preset"),
        }
    }

    let (evt_tx, evt_rx) = crossbeam_channel::bounded::<AudioEvent>(64);
    let meter = Arc::new(SharedSnapshot::default());

    // Streams stop when dropped, so keep them alive for the session
    let _streams = start_audio(&config, store.clone(), meter.clone(), evt_tx)?;

    // Console reader
    let (line_tx, line_rx) = crossbeam_channel::unbounded::<String>();
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if line_tx.send(line).is_err() {
                break;
            }
        }
    });

    println!(
        "IKFX {} - type 'help' for commands",
        config.engine.name().to_uppercase()
    );

    loop {
        while let Ok(AudioEvent::Error(message)) = evt_rx.try_recv() {
            warn!(%message, "Audio stream error");
        }

        let line = match line_rx.recv_timeout(POLL_INTERVAL) {
            Ok(line) => line,
            Err(RecvTimeoutError::Timeout) => continue,
            // stdin closed
            Err(RecvTimeoutError::Disconnected) => break,
        };
        if line.trim().is_empty() {
            continue;
        }
        match parse_command(&line) {
            Some(Command::Quit) => break,
            Some(command) => run_command(command, &store, &meter, &mut config),
            None => println!("Unknown command: {} (type 'help')", line.trim()),
        }
    }

    config.save().context("saving configuration")?;
    info!("Goodbye");
    Ok(())
}

fn run_command(
    command: Command,
    store: &ParameterStore,
    meter: &SharedSnapshot,
    config: &mut Config,
) {
    match command {
        Command::Set(id, value) => match store.set(&id, value) {
            Ok(stored) => print_parameter(store, &id, stored),
            Err(e) => println!("{}", e),
        },
        Command::Get(id) => match store.get(&id) {
            Ok(value) => print_parameter(store, &id, value),
            Err(e) => println!("{}", e),
        },
        Command::List => {
            for (spec, value) in store.iter() {
                println!("{:<10} {:<12} {}", spec.id, spec.name, spec.display(value));
            }
        }
        Command::Save(path) => match store.save_to(&path) {
            Ok(()) => {
                println!("Saved {}", path.display());
                config.last_preset = Some(path);
            }
            Err(e) => println!("Save failed: {}", e),
        },
        Command::Load(path) => match store.load_from(&path) {
            Ok(()) => {
                println!("Loaded {}", path.display());
                config.last_preset = Some(path);
            }
            Err(e) => println!("Load failed: {}", e),
        },
        Command::Reset => {
            store.reset_to_defaults();
            println!("Parameters reset");
        }
        Command::Status => {
            let snapshot = meter.load();
            println!(
                "in {:.3}  out {:.3}  phase {:.3}",
                snapshot.input_peak, snapshot.output_peak, snapshot.modulation_phase
            );
        }
        Command::Help => println!("{}", HELP),
        Command::Quit => {}
    }
}

fn print_parameter(store: &ParameterStore, id: &str, value: f32) {
    if let Some(spec) = store.layout().iter().find(|spec| spec.id == id) {
        println!("{} = {}", spec.id, spec.display(value));
    }
}

/// Open the default devices and start streaming.
///
/// A missing or unusable input device is not fatal; the engine then
/// processes silence.
fn start_audio(
    config: &Config,
    store: Arc<ParameterStore>,
    meter: Arc<SharedSnapshot>,
    evt_tx: Sender<AudioEvent>,
) -> anyhow::Result<Vec<cpal::Stream>> {
    let host = cpal::default_host();
    let output_device = host
        .default_output_device()
        .context("no audio output device found")?;
    let supported = output_device
        .default_output_config()
        .context("failed to get output config")?;

    let sample_rate = supported.sample_rate();
    let channels = supported.channels() as usize;

    // Honour the preferred buffer size when the device allows it
    let buffer_size = match supported.buffer_size() {
        cpal::SupportedBufferSize::Range { min, max }
            if (*min..=*max).contains(&(config.block_size as u32)) =>
        {
            cpal::BufferSize::Fixed(config.block_size as u32)
        }
        _ => cpal::BufferSize::Default,
    };
    let output_config = cpal::StreamConfig {
        channels: supported.channels(),
        sample_rate,
        buffer_size,
    };

    let mut processor = StreamProcessor::new(
        store,
        meter,
        sample_rate.0 as f32,
        channels,
        config.block_size,
    )
    .context("configuring engine")?;

    info!(
        engine = processor.engine().name(),
        sample_rate = sample_rate.0,
        channels,
        block_size = config.block_size,
        "Starting audio"
    );

    let ring = HeapRb::<f32>::new(config.block_size * channels * RING_BLOCKS);
    let (producer, mut consumer) = ring.split();

    let mut streams = Vec::with_capacity(2);

    match build_input_stream(&host, sample_rate, channels, producer, evt_tx.clone()) {
        Ok(stream) => streams.push(stream),
        Err(e) => warn!(error = %e, "No input stream, processing silence"),
    }

    let output_errors = evt_tx;
    let output = output_device
        .build_output_stream(
            &output_config,
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                let filled = consumer.pop_slice(data);
                data[filled..].fill(0.0);
                processor.process_interleaved(data);
            },
            move |err| {
                let _ = output_errors.try_send(AudioEvent::Error(err.to_string()));
            },
            None,
        )
        .context("failed to create output stream")?;
    streams.push(output);

    for stream in &streams {
        stream.play().context("failed to start audio")?;
    }

    Ok(streams)
}

fn build_input_stream(
    host: &cpal::Host,
    sample_rate: cpal::SampleRate,
    output_channels: usize,
    mut producer: HeapProd<f32>,
    evt_tx: Sender<AudioEvent>,
) -> anyhow::Result<cpal::Stream> {
    let device = host
        .default_input_device()
        .context("no audio input device found")?;
    let supported = device
        .default_input_config()
        .context("failed to get input config")?;
    let input_channels = supported.channels() as usize;

    let input_config = cpal::StreamConfig {
        channels: supported.channels(),
        sample_rate,
        buffer_size: cpal::BufferSize::Default,
    };
    debug!(channels = input_channels, "Opening input");

    let stream = device.build_input_stream(
        &input_config,
        move |data: &[f32], _: &cpal::InputCallbackInfo| {
            // Overflow drops samples rather than blocking
            for frame in data.chunks(input_channels.max(1)) {
                map_frame(frame, output_channels, |sample| {
                    let _ = producer.try_push(sample);
                });
            }
        },
        move |err| {
            let _ = evt_tx.try_send(AudioEvent::Error(err.to_string()));
        },
        None,
    )?;

    Ok(stream)
}
