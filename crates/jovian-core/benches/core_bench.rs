//! Criterion benchmarks for jovian-core DSP primitives
//!
//! Run with: cargo bench -p jovian-core
#![allow(missing_docs)]

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use jovian_core::{
    Effect, FilterMode, Lfo, LfoWaveform, OnePoleHighpass, SmoothedParam, StateVariableFilter,
    fast_exp2, fast_tan,
};

const SAMPLE_RATE: f32 = 48000.0;
const BLOCK_SIZES: &[usize] = &[32, 64, 128, 256];

fn generate_test_signal(size: usize) -> Vec<f32> {
    (0..size)
        .map(|i| {
            let t = i as f32 / SAMPLE_RATE;
            (2.0 * std::f32::consts::PI * 440.0 * t).sin() * 0.5
        })
        .collect()
}

fn bench_svf(c: &mut Criterion) {
    let mut group = c.benchmark_group("SVF");

    for mode in [FilterMode::Lowpass12, FilterMode::Lowpass24] {
        for &block_size in BLOCK_SIZES {
            let input = generate_test_signal(block_size);
            group.bench_with_input(
                BenchmarkId::new(format!("{mode:?}"), block_size),
                &block_size,
                |b, _| {
                    let mut svf = StateVariableFilter::new(SAMPLE_RATE);
                    svf.set_cutoff(1200.0);
                    svf.set_resonance(0.6);
                    svf.set_mode(mode);
                    b.iter(|| {
                        for &sample in &input {
                            black_box(svf.process(black_box(sample)));
                        }
                    });
                },
            );
        }
    }

    // Per-sample cutoff modulation, the voice's worst case
    for &block_size in BLOCK_SIZES {
        let input = generate_test_signal(block_size);
        group.bench_with_input(
            BenchmarkId::new("modulated", block_size),
            &block_size,
            |b, _| {
                let mut svf = StateVariableFilter::new(SAMPLE_RATE);
                svf.set_resonance(0.6);
                b.iter(|| {
                    for (i, &sample) in input.iter().enumerate() {
                        svf.set_cutoff(500.0 + i as f32 * 20.0);
                        black_box(svf.process(black_box(sample)));
                    }
                });
            },
        );
    }

    group.finish();
}

fn bench_lfo(c: &mut Criterion) {
    let mut group = c.benchmark_group("LFO");

    for waveform in [LfoWaveform::Triangle, LfoWaveform::SampleAndHold] {
        for &block_size in BLOCK_SIZES {
            group.bench_with_input(
                BenchmarkId::new(format!("{waveform:?}"), block_size),
                &block_size,
                |b, &size| {
                    let mut lfo = Lfo::new(SAMPLE_RATE, 5.0);
                    lfo.set_waveform(waveform);
                    lfo.set_delay(1.0);
                    b.iter(|| {
                        for _ in 0..size {
                            black_box(lfo.advance());
                        }
                    });
                },
            );
        }
    }

    group.finish();
}

fn bench_helpers(c: &mut Criterion) {
    let mut group = c.benchmark_group("Helpers");

    group.bench_function("smoothed_param_256", |b| {
        let mut p = SmoothedParam::with_config(0.0, SAMPLE_RATE, 10.0);
        b.iter(|| {
            p.set_target(black_box(1.0));
            for _ in 0..256 {
                black_box(p.advance());
            }
        });
    });

    group.bench_function("highpass_256", |b| {
        let input = generate_test_signal(256);
        let mut hp = OnePoleHighpass::new(SAMPLE_RATE, 120.0);
        b.iter(|| {
            for &sample in &input {
                black_box(hp.process(black_box(sample)));
            }
        });
    });

    group.bench_function("fast_exp2", |b| {
        b.iter(|| black_box(fast_exp2(black_box(0.37))));
    });

    group.bench_function("fast_tan", |b| {
        b.iter(|| black_box(fast_tan(black_box(0.12))));
    });

    group.finish();
}

criterion_group!(benches, bench_svf, bench_lfo, bench_helpers);
criterion_main!(benches);
