//! Live playback on the default output device.

use super::common::{ModeArg, build_engine, load_config, parse_notes};
use anyhow::Context;
use clap::Args;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use jovian_synth::{MAX_FRAMES, SynthEngine};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

#[derive(Args)]
pub struct PlayArgs {
    /// Factory preset name or number, or user preset name or path
    #[arg(short, long)]
    preset: Option<String>,

    /// Notes to hold, e.g. "60,64,67" or "C4,E4,G4"
    #[arg(short, long, value_parser = parse_notes, default_value = "48,55,60,64")]
    // Qualified path: clap treats a bare `Vec<T>` as repeated args, this is
    // one parsed list
    notes: ::std::vec::Vec<u8>,

    /// Note-on velocity
    #[arg(long, default_value_t = 100, value_parser = clap::value_parser!(u8).range(1..=127))]
    velocity: u8,

    /// Voice mode override
    #[arg(short, long, value_enum)]
    mode: Option<ModeArg>,

    /// Stop after this many seconds instead of waiting for Ctrl+C
    #[arg(short, long)]
    duration: Option<f32>,
}

pub fn run(args: PlayArgs, config_path: Option<&Path>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;

    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .context("no default output device")?;
    let device_config = device
        .default_output_config()
        .context("querying output config")?;
    let channels = usize::from(device_config.channels());
    let sample_rate = device_config.sample_rate();
    if sample_rate != config.sample_rate {
        tracing::info!(
            requested = config.sample_rate,
            device = sample_rate,
            "using device sample rate"
        );
    }

    let engine = build_engine(&config, sample_rate, args.preset.as_deref(), args.mode)?;
    let engine = Arc::new(Mutex::new(engine));

    let stream_config = cpal::StreamConfig {
        channels: device_config.channels(),
        sample_rate,
        buffer_size: cpal::BufferSize::Fixed(config.buffer_size),
    };

    let cb_engine = Arc::clone(&engine);
    let mut block = [0.0_f32; MAX_FRAMES * 2];
    let stream = device
        .build_output_stream(
            &stream_config,
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                // Never block the audio thread; drop a buffer instead.
                match cb_engine.try_lock() {
                    Ok(mut engine) => fill_interleaved(&mut engine, &mut block, data, channels),
                    Err(_) => data.fill(0.0),
                }
            },
            |err| tracing::error!(%err, "output stream error"),
            None,
        )
        .context("building output stream")?;
    stream.play().context("starting output stream")?;
    tracing::info!(channels, sample_rate, buffer = config.buffer_size, "output stream started");

    let running = Arc::new(AtomicBool::new(true));
    let r = Arc::clone(&running);
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })?;

    with_engine(&engine, |engine| {
        for &note in &args.notes {
            engine.note_on(note, args.velocity);
        }
    });
    println!(
        "Playing {} note(s) at {} Hz... Press Ctrl+C to stop.",
        args.notes.len(),
        sample_rate
    );

    let started = Instant::now();
    let limit = args.duration.map(Duration::from_secs_f32);
    while running.load(Ordering::SeqCst) {
        if limit.is_some_and(|limit| started.elapsed() >= limit) {
            break;
        }
        std::thread::sleep(Duration::from_millis(50));
    }

    // Let the release ring out before tearing down.
    with_engine(&engine, SynthEngine::all_notes_off);
    std::thread::sleep(Duration::from_millis(300));
    with_engine(&engine, SynthEngine::teardown);
    drop(stream);
    println!("Stopped.");
    Ok(())
}

fn with_engine(engine: &Mutex<SynthEngine>, f: impl FnOnce(&mut SynthEngine)) {
    // A poisoned lock still holds a usable engine.
    let mut guard = engine.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
    f(&mut guard);
}

/// Render into a device buffer of `channels` interleaved channels.
///
/// Mono devices get the L/R average; channels past the second are silent.
fn fill_interleaved(engine: &mut SynthEngine, block: &mut [f32], data: &mut [f32], channels: usize) {
    if channels == 0 {
        data.fill(0.0);
        return;
    }
    for chunk in data.chunks_mut(MAX_FRAMES * channels) {
        let frames = chunk.len() / channels;
        engine.render(block, frames);
        for (frame, stereo) in chunk.chunks_mut(channels).zip(block.chunks_exact(2)) {
            match channels {
                1 => frame[0] = (stereo[0] + stereo[1]) * 0.5,
                _ => {
                    frame[0] = stereo[0];
                    frame[1] = stereo[1];
                    frame[2..].fill(0.0);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jovian_config::EngineConfig;

    #[test]
    fn test_fill_interleaved_layouts() {
        for channels in [1, 2, 4] {
            let mut engine = build_engine(&EngineConfig::default(), 48_000, None, None).unwrap();
            engine.note_on(60, 100);
            let mut block = [0.0_f32; MAX_FRAMES * 2];
            let mut data = vec![f32::NAN; 700 * channels];
            for _ in 0..4 {
                fill_interleaved(&mut engine, &mut block, &mut data, channels);
            }
            assert!(data.iter().all(|s| s.is_finite() && s.abs() <= 1.0));
            assert!(data.iter().any(|s| s.abs() > 0.01));
            if channels == 4 {
                assert!(data.chunks(4).all(|f| f[2] == 0.0 && f[3] == 0.0));
            }
        }
    }

    #[test]
    fn test_notes_flag_is_one_list() {
        use clap::Parser;

        #[derive(Parser)]
        struct Cli {
            #[command(flatten)]
            args: PlayArgs,
        }

        let cli = Cli::try_parse_from(["jovian", "--notes", "C4,E4,G4"]).unwrap();
        assert_eq!(cli.args.notes, vec![60, 64, 67]);
        let cli = Cli::try_parse_from(["jovian"]).unwrap();
        assert_eq!(cli.args.notes, vec![48, 55, 60, 64]);
    }
}
