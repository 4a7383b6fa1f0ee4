//! Output stage: saturation, scrubbing and the stereo widener.
//!
//! The engine renders mono; this stage turns it into the interleaved
//! stereo buffer the host receives:
//!
//! ```text
//! mono -> soft_clip -> sanitize -> widener -> + DENORMAL_BIAS -> clamp ±1 -> L/R
//! ```
//!
//! The widener writes the dry signal into a short delay, modulates the tap
//! with a slow LFO and adds it to one side while subtracting it from the
//! other. With `m` the mix:
//!
//! ```text
//! L = (1 - m/2)·dry + (m/2)·wet
//! R = (1 - m/2)·dry - (m/2)·wet
//! ```
//!
//! so each side stays within the peak of its inputs.

use jovian_core::{
    DENORMAL_BIAS, FixedDelayLine, Lfo, LfoWaveform, SmoothedParam, ms_to_samples, sanitize,
    soft_clip,
};

/// Widener delay capacity in samples.
pub const WIDENER_BUFFER: usize = 8192;

/// Widener LFO rate in Hz.
pub const WIDENER_RATE_HZ: f32 = 0.5;

/// Widener setting smoothing time.
const SMOOTHING_MS: f32 = 20.0;

/// EFFECT parameter choices.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum EffectMode {
    /// Short modulated delay (default)
    #[default]
    Chorus,
    /// Longer, deeper delay.
    Space,
    /// Widener bypassed.
    Dry,
    /// Longest and deepest setting.
    Both,
}

/// Delay, depth and mix of one widener setting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WidenerSettings {
    /// Centre delay in milliseconds.
    pub delay_ms: f32,
    /// LFO sweep around the centre in milliseconds.
    pub depth_ms: f32,
    /// Wet amount (0..1).
    pub mix: f32,
}

impl EffectMode {
    /// Mode for a parameter value; out-of-range values clamp.
    pub fn from_index(index: i32) -> Self {
        match index {
            i32::MIN..=0 => Self::Chorus,
            1 => Self::Space,
            2 => Self::Dry,
            _ => Self::Both,
        }
    }

    /// Widener settings for this mode.
    pub fn settings(self) -> WidenerSettings {
        match self {
            Self::Chorus => WidenerSettings {
                delay_ms: 15.0,
                depth_ms: 3.0,
                mix: 0.5,
            },
            Self::Space => WidenerSettings {
                delay_ms: 35.0,
                depth_ms: 6.0,
                mix: 0.7,
            },
            Self::Dry => WidenerSettings {
                delay_ms: 15.0,
                depth_ms: 0.0,
                mix: 0.0,
            },
            Self::Both => WidenerSettings {
                delay_ms: 40.0,
                depth_ms: 8.0,
                mix: 0.8,
            },
        }
    }
}

/// Mono-to-stereo output stage.
///
/// # Example
///
/// ```rust
/// use jovian_synth::{EffectMode, OutputStage};
///
/// let mut stage = OutputStage::new(48000.0);
/// stage.set_mode(EffectMode::Space);
///
/// let mono = [0.25_f32; 64];
/// let mut out = [0.0_f32; 128];
/// stage.process_block(&mono, &mut out);
/// assert!(out.iter().all(|s| s.abs() <= 1.0));
/// ```
#[derive(Debug, Clone)]
pub struct OutputStage {
    delay: FixedDelayLine<WIDENER_BUFFER>,
    lfo: Lfo,
    delay_ms: SmoothedParam,
    depth_ms: SmoothedParam,
    mix: SmoothedParam,
    mode: EffectMode,
    sample_rate: f32,
}

impl OutputStage {
    /// Create a stage in CHORUS mode.
    pub fn new(sample_rate: f32) -> Self {
        let mut lfo = Lfo::new(sample_rate, WIDENER_RATE_HZ);
        lfo.set_waveform(LfoWaveform::Triangle);
        let s = EffectMode::Chorus.settings();
        Self {
            delay: FixedDelayLine::new(),
            lfo,
            delay_ms: SmoothedParam::with_config(s.delay_ms, sample_rate, SMOOTHING_MS),
            depth_ms: SmoothedParam::with_config(s.depth_ms, sample_rate, SMOOTHING_MS),
            mix: SmoothedParam::with_config(s.mix, sample_rate, SMOOTHING_MS),
            mode: EffectMode::Chorus,
            sample_rate,
        }
    }

    /// Select the widener setting. Changes glide in over a few ms.
    pub fn set_mode(&mut self, mode: EffectMode) {
        self.mode = mode;
        let s = mode.settings();
        self.delay_ms.set_target(s.delay_ms);
        self.depth_ms.set_target(s.depth_ms);
        self.mix.set_target(s.mix);
    }

    /// Current widener setting.
    pub fn mode(&self) -> EffectMode {
        self.mode
    }

    /// Update the sample rate.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.lfo.set_sample_rate(sample_rate);
        self.delay_ms.set_sample_rate(sample_rate);
        self.depth_ms.set_sample_rate(sample_rate);
        self.mix.set_sample_rate(sample_rate);
    }

    /// Clear the delay and settle the smoothers on the current mode.
    pub fn reset(&mut self) {
        self.delay.clear();
        self.lfo.reset();
        self.delay_ms.snap_to_target();
        self.depth_ms.snap_to_target();
        self.mix.snap_to_target();
    }

    /// One frame before the final clamp.
    #[inline]
    pub fn process_frame(&mut self, mono: f32) -> (f32, f32) {
        let dry = sanitize(soft_clip(mono));

        let delay_ms = self.delay_ms.advance();
        let depth_ms = self.depth_ms.advance();
        let mix = self.mix.advance();

        let lfo = self.lfo.advance();
        let tap = ms_to_samples(delay_ms + depth_ms * lfo, self.sample_rate);
        self.delay.write(dry);
        let wet = self.delay.read(tap);

        let half = 0.5 * mix;
        let center = (1.0 - half) * dry;
        (
            center + half * wet + DENORMAL_BIAS,
            center - half * wet + DENORMAL_BIAS,
        )
    }

    /// Render `mono` into interleaved stereo `out` (`2 * mono.len()` long).
    #[inline]
    pub fn process_block(&mut self, mono: &[f32], out: &mut [f32]) {
        for (&x, frame) in mono.iter().zip(out.chunks_exact_mut(2)) {
            let (l, r) = self.process_frame(x);
            frame[0] = l.clamp(-1.0, 1.0);
            frame[1] = r.clamp(-1.0, 1.0);
        }
    }
}
