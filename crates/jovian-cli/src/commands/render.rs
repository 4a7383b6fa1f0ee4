//! Offline rendering to WAV.

use super::common::{ModeArg, build_engine, load_config, parse_notes};
use anyhow::Context;
use clap::Args;
use hound::{SampleFormat, WavSpec, WavWriter};
use jovian_synth::{MAX_FRAMES, SynthEngine};
use std::path::{Path, PathBuf};

#[derive(Args)]
pub struct RenderArgs {
    /// Output WAV file
    #[arg(short, long, default_value = "jovian.wav")]
    output: PathBuf,

    /// Factory preset name or number, or user preset name or path
    #[arg(short, long)]
    preset: Option<String>,

    /// Notes to hold, e.g. "60,64,67" or "C4,E4,G4"
    #[arg(short, long, value_parser = parse_notes, default_value = "60")]
    // Qualified path: clap treats a bare `Vec<T>` as repeated args, this is
    // one parsed list
    notes: ::std::vec::Vec<u8>,

    /// Seconds the notes are held
    #[arg(short, long, default_value_t = 2.0)]
    duration: f32,

    /// Seconds rendered after release
    #[arg(long, default_value_t = 1.0)]
    tail: f32,

    /// Note-on velocity
    #[arg(long, default_value_t = 100, value_parser = clap::value_parser!(u8).range(1..=127))]
    velocity: u8,

    /// Voice mode override
    #[arg(short, long, value_enum)]
    mode: Option<ModeArg>,

    /// Sample rate (defaults to the config)
    #[arg(long)]
    sample_rate: Option<u32>,

    /// Bit depth (16, 24 or 32-bit float)
    #[arg(long, default_value_t = 32, value_parser = parse_bits)]
    bits: u16,
}

pub fn run(args: RenderArgs, config_path: Option<&Path>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let sample_rate = args.sample_rate.unwrap_or(config.sample_rate);
    anyhow::ensure!(args.duration >= 0.0 && args.tail >= 0.0, "durations must not be negative");

    let mut engine = build_engine(&config, sample_rate, args.preset.as_deref(), args.mode)?;
    let held = seconds_to_frames(args.duration, sample_rate);
    let tail = seconds_to_frames(args.tail, sample_rate);

    for &note in &args.notes {
        engine.note_on(note, args.velocity);
    }
    let mut samples = Vec::with_capacity((held + tail) * 2);
    render_frames(&mut engine, held, &mut samples);
    for &note in &args.notes {
        engine.note_off(note);
    }
    render_frames(&mut engine, tail, &mut samples);

    write_wav(&args.output, &samples, sample_rate, args.bits)
        .with_context(|| format!("writing {}", args.output.display()))?;

    let peak = samples.iter().fold(0.0_f32, |m, s| m.max(s.abs()));
    tracing::info!(
        path = %args.output.display(),
        frames = samples.len() / 2,
        sample_rate,
        peak,
        "rendered"
    );
    println!(
        "Rendered {:.2}s ({} notes, {:?} mode) to {}",
        (held + tail) as f32 / sample_rate as f32,
        args.notes.len(),
        engine.mode(),
        args.output.display()
    );
    Ok(())
}

fn parse_bits(s: &str) -> Result<u16, String> {
    match s {
        "16" => Ok(16),
        "24" => Ok(24),
        "32" => Ok(32),
        _ => Err(format!("unsupported bit depth '{s}' (16, 24 or 32)")),
    }
}

fn seconds_to_frames(seconds: f32, sample_rate: u32) -> usize {
    (seconds * sample_rate as f32).round() as usize
}

/// Render `frames` stereo frames, appending interleaved samples to `out`.
pub fn render_frames(engine: &mut SynthEngine, frames: usize, out: &mut Vec<f32>) {
    let mut block = [0.0_f32; MAX_FRAMES * 2];
    let mut remaining = frames;
    while remaining > 0 {
        let n = remaining.min(MAX_FRAMES);
        engine.render(&mut block, n);
        out.extend_from_slice(&block[..n * 2]);
        remaining -= n;
    }
}

fn write_wav(path: &Path, samples: &[f32], sample_rate: u32, bits: u16) -> anyhow::Result<()> {
    let spec = WavSpec {
        channels: 2,
        sample_rate,
        bits_per_sample: bits,
        sample_format: if bits == 32 {
            SampleFormat::Float
        } else {
            SampleFormat::Int
        },
    };
    let mut writer = WavWriter::create(path, spec)?;
    if bits == 32 {
        for &sample in samples {
            writer.write_sample(sample)?;
        }
    } else {
        let max_val = (1i32 << (bits - 1)) as f32;
        for &sample in samples {
            let int_sample = (sample * max_val).clamp(-max_val, max_val - 1.0) as i32;
            writer.write_sample(int_sample)?;
        }
    }
    writer.finalize()?;
    Ok(())
}
